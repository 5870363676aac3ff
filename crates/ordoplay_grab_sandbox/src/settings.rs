// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player rig settings for the sandbox.

use crate::error::{Result, SandboxError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current sandbox settings format version
pub const SANDBOX_FORMAT_VERSION: u32 = 1;

/// Player rig settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSettings {
    /// Format version
    pub version: u32,
    /// Player feet position
    pub player_position: [f32; 3],
    /// Eye height above the feet
    pub eye_height: f32,
    /// Degrees turned per second for a unit look input
    pub look_sensitivity: f32,
    /// Pitch limit in degrees
    pub pitch_limit: f32,
    /// Hand rest position, in view space
    pub idle_anchor: [f32; 3],
    /// Fully swung hand position, in view space
    pub swinging_anchor: [f32; 3],
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            version: SANDBOX_FORMAT_VERSION,
            player_position: [0.0, 0.0, 0.0],
            eye_height: 1.6,
            look_sensitivity: 90.0,
            pitch_limit: 60.0,
            idle_anchor: [0.0, -0.1, -1.2],
            swinging_anchor: [0.0, -0.9, -0.4],
        }
    }
}

impl SandboxSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_ron(&content)?;
        tracing::debug!("Loaded sandbox settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from RON text
    pub fn from_ron(content: &str) -> Result<Self> {
        let settings: SandboxSettings = ron::from_str(content)?;
        if settings.version > SANDBOX_FORMAT_VERSION {
            return Err(SandboxError::Invalid {
                field: "version",
                reason: "written by a newer sandbox",
            });
        }
        if !(0.0..=90.0).contains(&settings.pitch_limit) {
            return Err(SandboxError::Invalid {
                field: "pitch_limit",
                reason: "must lie in [0, 90] degrees",
            });
        }
        if !settings.look_sensitivity.is_finite() {
            return Err(SandboxError::Invalid {
                field: "look_sensitivity",
                reason: "must be finite",
            });
        }
        Ok(settings)
    }
}
