// SPDX-License-Identifier: MIT OR Apache-2.0
//! Play mode clock for the sandbox session.
//!
//! This module handles:
//! - Playing, pausing and stopping the simulation
//! - Converting frame time into a number of fixed steps
//! - Single-stepping while paused

use ordoplay_grab::SimulationSettings;

/// Play mode state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    /// Not simulating
    #[default]
    Stopped,
    /// Simulation is running
    Playing,
    /// Simulation is paused
    Paused,
}

impl PlayState {
    /// Check if we're in any play mode (playing or paused)
    pub fn is_active(&self) -> bool {
        matches!(self, PlayState::Playing | PlayState::Paused)
    }

    /// Check if currently playing (not paused)
    pub fn is_playing(&self) -> bool {
        matches!(self, PlayState::Playing)
    }
}

/// Frame-time accumulator driving the fixed-step loop
#[derive(Debug, Clone)]
pub struct SimulationClock {
    /// Current play state
    pub state: PlayState,
    /// Time scale for simulation (1.0 = normal speed)
    time_scale: f32,
    /// Duration of one fixed step
    fixed_timestep: f64,
    /// Steps allowed per frame before the backlog is dropped
    max_steps_per_frame: u32,
    /// Accumulated delta time for fixed timestep
    accumulated_time: f64,
    /// Frame count since play started
    pub frame_count: u64,
    /// Fixed steps run since play started
    pub step_count: u64,
    /// Simulated time since play started
    pub elapsed_time: f64,
}

impl SimulationClock {
    /// Stopped clock using the simulation settings
    pub fn new(settings: &SimulationSettings) -> Self {
        Self {
            state: PlayState::Stopped,
            time_scale: 1.0,
            fixed_timestep: f64::from(settings.fixed_timestep),
            max_steps_per_frame: settings.max_steps_per_frame.max(1),
            accumulated_time: 0.0,
            frame_count: 0,
            step_count: 0,
            elapsed_time: 0.0,
        }
    }

    /// Start playing, or resume when paused.
    /// Returns true if the state changed
    pub fn play(&mut self) -> bool {
        match self.state {
            PlayState::Stopped => {
                self.reset_counters();
                self.state = PlayState::Playing;
                tracing::info!("Entered play mode");
                true
            }
            PlayState::Paused => {
                self.state = PlayState::Playing;
                tracing::info!("Resumed play mode");
                true
            }
            PlayState::Playing => false,
        }
    }

    /// Pause play mode
    pub fn pause(&mut self) -> bool {
        if self.state == PlayState::Playing {
            self.state = PlayState::Paused;
            tracing::info!("Paused play mode");
            true
        } else {
            false
        }
    }

    /// Toggle pause/resume
    pub fn toggle_pause(&mut self) -> bool {
        match self.state {
            PlayState::Playing => self.pause(),
            PlayState::Paused => self.play(),
            PlayState::Stopped => false,
        }
    }

    /// Stop play mode
    pub fn stop(&mut self) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.state = PlayState::Stopped;
        self.reset_counters();
        tracing::info!("Stopped play mode");
        true
    }

    /// Advance by one rendered frame.
    /// Returns the number of fixed steps to run
    pub fn update(&mut self, delta_time: f64) -> u32 {
        if !self.state.is_playing() {
            return 0;
        }

        let scaled_delta = delta_time * f64::from(self.time_scale);
        self.accumulated_time += scaled_delta;
        self.frame_count += 1;

        let mut steps = 0;
        while self.accumulated_time >= self.fixed_timestep {
            self.accumulated_time -= self.fixed_timestep;
            steps += 1;

            // Limit max steps per frame to prevent spiral of death
            if steps >= self.max_steps_per_frame {
                if self.accumulated_time >= self.fixed_timestep {
                    tracing::warn!(
                        "Dropping {:.3}s of simulation backlog",
                        self.accumulated_time
                    );
                }
                self.accumulated_time = 0.0;
                break;
            }
        }

        self.step_count += u64::from(steps);
        self.elapsed_time += f64::from(steps) * self.fixed_timestep;
        steps
    }

    /// Step forward one fixed step (while paused).
    /// Returns true if the caller should run a step
    pub fn step_frame(&mut self) -> bool {
        if self.state == PlayState::Paused {
            self.step_count += 1;
            self.elapsed_time += self.fixed_timestep;
            self.frame_count += 1;
            true
        } else {
            false
        }
    }

    /// Duration of one fixed step in seconds
    pub fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep as f32
    }

    /// Set time scale (clamped to reasonable range)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.clamp(0.0, 10.0);
    }

    fn reset_counters(&mut self) {
        self.frame_count = 0;
        self.step_count = 0;
        self.elapsed_time = 0.0;
        self.accumulated_time = 0.0;
    }
}
