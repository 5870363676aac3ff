// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timed input scripts standing in for a player.
//!
//! A script is a RON list of actions, each tagged with the session time at
//! which it fires. Actions map one-to-one onto player input callbacks.

use crate::error::Result;
use glam::Vec2;
use ordoplay_grab::Intent;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One player input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputAction {
    /// Set the held look input (x turns right, y looks up)
    Look(f32, f32),
    /// Press grab
    Grab,
    /// Press release
    Release,
    /// Start swinging
    Swing,
    /// Move the hand vertically while swinging
    SwingDelta(f32),
    /// Stop swinging; lets go if the object is moving fast
    EndSwing,
    /// Throw the held object
    Throw,
    /// Pause or resume the simulation
    TogglePause,
    /// Run one fixed step while paused
    Step,
}

impl InputAction {
    /// The interaction intent this input produces, if any
    pub fn intent(&self) -> Option<Intent> {
        match *self {
            InputAction::Grab => Some(Intent::Grab),
            InputAction::Release => Some(Intent::ReleaseFully),
            InputAction::Swing => Some(Intent::BeginSwing),
            InputAction::SwingDelta(delta) => Some(Intent::UpdateSwing(delta)),
            InputAction::EndSwing => Some(Intent::EndSwingOrRelease),
            InputAction::Throw => Some(Intent::Throw),
            InputAction::Look(..) | InputAction::TogglePause | InputAction::Step => None,
        }
    }

    /// Look input carried by a [`InputAction::Look`]
    pub fn look_input(&self) -> Option<Vec2> {
        match *self {
            InputAction::Look(x, y) => Some(Vec2::new(x, y)),
            _ => None,
        }
    }
}

/// Action firing at `time` seconds into the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedAction {
    /// Session time in seconds
    pub time: f32,
    /// Input to fire
    pub action: InputAction,
}

/// Ordered list of timed actions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputScript {
    /// Actions sorted by time
    pub actions: Vec<TimedAction>,
    #[serde(skip)]
    cursor: usize,
}

impl InputScript {
    /// Build a script; actions are sorted by time, keeping the order of ties
    pub fn new(mut actions: Vec<TimedAction>) -> Self {
        actions.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { actions, cursor: 0 }
    }

    /// Parse a script from RON text
    pub fn from_ron(content: &str) -> Result<Self> {
        let parsed: InputScript = ron::from_str(content)?;
        Ok(Self::new(parsed.actions))
    }

    /// Load a script from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let script = Self::from_ron(&content)?;
        tracing::debug!(
            "Loaded {} scripted actions from {}",
            script.actions.len(),
            path.display()
        );
        Ok(script)
    }

    /// Grab, carry, swing and throw the crate in front of the player
    pub fn demo() -> Self {
        let at = |time: f32, action: InputAction| TimedAction { time, action };
        Self::new(vec![
            at(0.5, InputAction::Grab),
            at(1.0, InputAction::Look(0.5, 0.0)),
            at(1.5, InputAction::Look(0.0, 0.0)),
            at(2.0, InputAction::Swing),
            at(2.1, InputAction::SwingDelta(-0.5)),
            at(2.2, InputAction::SwingDelta(-0.5)),
            at(2.8, InputAction::EndSwing),
            at(3.5, InputAction::Swing),
            at(3.6, InputAction::SwingDelta(-1.5)),
            at(4.0, InputAction::Throw),
            at(4.5, InputAction::Look(-0.5, 0.0)),
            at(5.0, InputAction::Look(0.0, 0.0)),
            at(5.2, InputAction::Grab),
            at(5.8, InputAction::Release),
        ])
    }

    /// Take every action due at or before `time`
    pub fn due(&mut self, time: f32) -> &[TimedAction] {
        let start = self.cursor;
        while self
            .actions
            .get(self.cursor)
            .is_some_and(|action| action.time <= time)
        {
            self.cursor += 1;
        }
        &self.actions[start..self.cursor]
    }

    /// Check if every action has fired
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.actions.len()
    }

    /// Number of actions not yet fired
    pub fn remaining(&self) -> usize {
        self.actions.len().saturating_sub(self.cursor)
    }
}
