// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scripted play session.
//!
//! Each rendered frame fires due script actions, turns the look rig, then
//! runs as many fixed steps as the clock hands out. A fixed step is always
//! interaction first, physics second.

use crate::error::{Result, SandboxError};
use crate::looker::LookRig;
use crate::play_mode::SimulationClock;
use crate::scene::DemoScene;
use crate::script::{InputAction, InputScript};
use crate::settings::SandboxSettings;
use glam::Vec3;
use ordoplay_grab::{EntityId, HandAnchors, Interaction, InteractionSettings};

/// Summary of a finished session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionReport {
    /// Rendered frames
    pub frames: u64,
    /// Fixed steps run
    pub steps: u64,
    /// Times a prop was picked up
    pub grabs: u32,
    /// Times a prop was let go, for any reason
    pub releases: u32,
    /// Prop still in hand when the session ended
    pub held_at_end: Option<String>,
}

/// Demo scene driven by an input script
#[derive(Debug)]
pub struct Session {
    scene: DemoScene,
    interaction: Interaction,
    rig: LookRig,
    clock: SimulationClock,
    script: InputScript,
    idle_anchor: Vec3,
    swinging_anchor: Vec3,
    held: Option<EntityId>,
    report: SessionReport,
}

impl Session {
    /// Build the demo scene and register its props
    pub fn new(
        settings: &InteractionSettings,
        sandbox: &SandboxSettings,
        script: InputScript,
    ) -> Result<Self> {
        let player_position = Vec3::from_array(sandbox.player_position);
        let scene = DemoScene::build(
            Vec3::from_array(settings.simulation.gravity),
            player_position,
            settings.hand.holder_layer,
        );
        let rig = LookRig::new(
            player_position,
            sandbox.eye_height,
            sandbox.look_sensitivity,
            sandbox.pitch_limit,
        );

        let idle_anchor = Vec3::from_array(sandbox.idle_anchor);
        let mut interaction =
            Interaction::new(scene.player, settings, rig.view_to_world(idle_anchor));
        scene.register_props(&mut interaction)?;

        Ok(Self {
            scene,
            interaction,
            rig,
            clock: SimulationClock::new(&settings.simulation),
            script,
            idle_anchor,
            swinging_anchor: Vec3::from_array(sandbox.swinging_anchor),
            held: None,
            report: SessionReport::default(),
        })
    }

    /// Scale simulated time against frame time
    pub fn set_time_scale(&mut self, scale: f32) {
        self.clock.set_time_scale(scale);
    }

    /// Run `duration` seconds of frames at `frame_rate`
    pub fn run(mut self, duration: f32, frame_rate: f32) -> Result<SessionReport> {
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(SandboxError::Invalid {
                field: "frame_rate",
                reason: "must be positive",
            });
        }
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(SandboxError::Invalid {
                field: "duration",
                reason: "must be a finite, non-negative number of seconds",
            });
        }

        let delta = 1.0 / frame_rate;
        let frames = (duration * frame_rate).ceil() as u64;
        tracing::info!(
            "Running {frames} frames at {frame_rate} fps with {} scripted actions",
            self.script.remaining()
        );

        self.clock.play();
        for frame in 0..frames {
            self.frame(frame as f32 * delta, delta)?;
        }

        if !self.script.is_finished() {
            tracing::warn!("{} scripted actions never fired", self.script.remaining());
        }

        tracing::debug!(
            "Clock played {} frames, simulated {:.2}s; final gaze yaw {:.1} pitch {:.1}",
            self.clock.frame_count,
            self.clock.elapsed_time,
            self.rig.yaw(),
            self.rig.pitch()
        );

        self.report.frames = frames;
        self.report.steps = self.clock.step_count;
        self.report.held_at_end = self
            .held
            .map(|entity| self.scene.name_of(entity).to_string());
        self.clock.stop();
        Ok(self.report)
    }

    /// Process one rendered frame starting at session time `time`
    pub fn frame(&mut self, time: f32, delta: f32) -> Result<()> {
        let due = self.script.due(time).to_vec();
        for timed in due {
            self.handle_action(timed.action)?;
        }

        self.rig.update(delta);
        let steps = self.clock.update(f64::from(delta));
        for _ in 0..steps {
            self.fixed_step()?;
        }
        Ok(())
    }

    fn handle_action(&mut self, action: InputAction) -> Result<()> {
        tracing::debug!("Input {:?}", action);
        if let Some(intent) = action.intent() {
            self.interaction.submit(intent);
            return Ok(());
        }

        match action {
            InputAction::Look(..) => {
                if let Some(input) = action.look_input() {
                    self.rig.look_input = input;
                }
            }
            InputAction::TogglePause => {
                self.clock.toggle_pause();
            }
            InputAction::Step => {
                if self.clock.step_frame() {
                    self.fixed_step()?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn fixed_step(&mut self) -> Result<()> {
        let anchors = HandAnchors {
            idle: self.rig.view_to_world(self.idle_anchor),
            swinging: self.rig.view_to_world(self.swinging_anchor),
        };
        self.interaction
            .fixed_update(&mut self.scene.world, &self.rig, anchors)?;
        self.scene.world.step(self.clock.fixed_timestep());
        self.observe_hand();
        Ok(())
    }

    fn observe_hand(&mut self) {
        let now = self.interaction.hand().grabbable();
        if now == self.held {
            return;
        }

        if let Some(previous) = self.held {
            self.report.releases += 1;
            tracing::info!("Let go of {}", self.scene.name_of(previous));
        }
        if let Some(current) = now {
            self.report.grabs += 1;
            tracing::info!("Picked up {}", self.scene.name_of(current));
        }
        self.held = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::TimedAction;

    fn session(script: InputScript) -> Session {
        Session::new(
            &InteractionSettings::default(),
            &SandboxSettings::default(),
            script,
        )
        .unwrap()
    }

    #[test]
    fn test_demo_script_grabs_and_releases() {
        let report = session(InputScript::demo()).run(6.0, 60.0).unwrap();
        assert_eq!(report.frames, 360);
        assert!(report.steps >= 295, "{} steps", report.steps);
        assert!(report.grabs >= 1);
        assert!(report.releases >= 1);
    }

    #[test]
    fn test_grab_then_hold() {
        let script = InputScript::new(vec![TimedAction {
            time: 0.1,
            action: InputAction::Grab,
        }]);
        let report = session(script).run(1.0, 50.0).unwrap();
        assert_eq!(report.grabs, 1);
        assert_eq!(report.releases, 0);
        assert_eq!(report.held_at_end.as_deref(), Some("crate"));
    }

    #[test]
    fn test_paused_session_only_single_steps() {
        let script = InputScript::new(vec![
            TimedAction {
                time: 0.0,
                action: InputAction::TogglePause,
            },
            TimedAction {
                time: 0.1,
                action: InputAction::Step,
            },
        ]);
        let report = session(script).run(0.5, 50.0).unwrap();
        assert_eq!(report.steps, 1);
    }

    #[test]
    fn test_invalid_frame_rate_rejected() {
        let result = session(InputScript::default()).run(1.0, 0.0);
        assert!(matches!(
            result,
            Err(SandboxError::Invalid {
                field: "frame_rate",
                ..
            })
        ));
    }
}
