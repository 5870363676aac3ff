// SPDX-License-Identifier: MIT OR Apache-2.0
//! First-person look rig.

use glam::{EulerRot, Quat, Vec2, Vec3};
use ordoplay_grab::Looker;

/// Yaw/pitch camera standing at a fixed position
#[derive(Debug, Clone)]
pub struct LookRig {
    /// Feet position
    pub position: Vec3,
    /// Eye height above `position`
    pub eye_height: f32,
    /// Degrees turned per second for a unit look input
    pub sensitivity: f32,
    /// Pitch limit in degrees, applied both ways
    pub pitch_limit: f32,
    /// Current look input, held until changed
    pub look_input: Vec2,
    yaw: f32,
    pitch: f32,
}

impl LookRig {
    /// Rig at `position` looking down -Z
    pub fn new(position: Vec3, eye_height: f32, sensitivity: f32, pitch_limit: f32) -> Self {
        Self {
            position,
            eye_height,
            sensitivity,
            pitch_limit,
            look_input: Vec2::ZERO,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Turn by the held look input over one frame
    pub fn update(&mut self, delta_time: f32) {
        let turn = self.look_input * self.sensitivity * delta_time;
        // Positive x turns right, positive y looks up
        self.yaw -= turn.x;
        self.pitch = (self.pitch + turn.y).clamp(-self.pitch_limit, self.pitch_limit);
    }

    /// Yaw in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Transform a view-space offset into world space
    pub fn view_to_world(&self, offset: Vec3) -> Vec3 {
        self.look_origin() + self.look_rotation() * offset
    }
}

impl Looker for LookRig {
    fn look_origin(&self) -> Vec3 {
        self.position + Vec3::Y * self.eye_height
    }

    fn look_direction(&self) -> Vec3 {
        self.look_rotation() * Vec3::NEG_Z
    }

    fn look_rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            0.0,
        )
    }
}
