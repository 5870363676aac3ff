// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tunable settings for the grab interaction.
//!
//! This module manages:
//! - Hand settings (grab reach, swing range, release thresholds)
//! - Grabbable settings (release speed cap, held damping)
//! - Controller gains
//! - Simulation settings (fixed step, gravity)
//!
//! Settings are stored as RON and versioned like project files.

use crate::pid::PidGains;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "interaction.ron";

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading or writing the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON for these settings
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },

    /// A value is out of range
    #[error("Invalid setting `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Result type for settings operations
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Holder settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandSettings {
    /// Reach of the grab ray
    pub max_grabbing_distance: f32,
    /// Upper bound of the swing distance
    pub max_swing_distance: f32,
    /// Observed speed above which an unengaged swing lets go
    pub auto_release_velocity_threshold: f32,
    /// Speed below which ending a swing settles back into holding
    pub settle_velocity_threshold: f32,
    /// Per-step lerp factor towards the idle anchor
    pub idle_follow_factor: f32,
    /// Collision layer of the holder; held objects ignore it
    pub holder_layer: u8,
}

impl Default for HandSettings {
    fn default() -> Self {
        Self {
            max_grabbing_distance: 3.0,
            max_swing_distance: 5.0,
            auto_release_velocity_threshold: 8.0,
            settle_velocity_threshold: 4.0,
            idle_follow_factor: 0.5,
            holder_layer: 3,
        }
    }
}

/// Grabbable object settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabbableSettings {
    /// Cap on the speed a released object departs with
    pub max_release_velocity: f32,
    /// Linear damping applied while held
    pub grabbed_linear_damping: f32,
}

impl Default for GrabbableSettings {
    fn default() -> Self {
        Self {
            max_release_velocity: 15.0,
            grabbed_linear_damping: 10.0,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Duration of one fixed step in seconds
    pub fixed_timestep: f32,
    /// Gravity vector
    pub gravity: [f32; 3],
    /// Fixed steps allowed per frame before time is dropped
    pub max_steps_per_frame: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            fixed_timestep: 0.02,
            gravity: [0.0, -9.81, 0.0],
            max_steps_per_frame: 8,
        }
    }
}

/// All grab interaction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Format version
    pub version: u32,
    /// Holder settings
    pub hand: HandSettings,
    /// Grabbable object settings
    pub grabbable: GrabbableSettings,
    /// Velocity controller gains
    pub pid: PidGains,
    /// Simulation settings
    pub simulation: SimulationSettings,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            hand: HandSettings::default(),
            grabbable: GrabbableSettings::default(),
            pid: PidGains::default(),
            simulation: SimulationSettings::default(),
        }
    }
}

impl InteractionSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: InteractionSettings = ron::from_str(&content)?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        settings.validate()?;
        tracing::debug!("Loaded interaction settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check every value is in range
    pub fn validate(&self) -> Result<()> {
        fn non_negative(field: &'static str, value: f32) -> Result<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid {
                    field,
                    reason: "must be a finite, non-negative number",
                })
            }
        }

        non_negative("hand.max_grabbing_distance", self.hand.max_grabbing_distance)?;
        non_negative("hand.max_swing_distance", self.hand.max_swing_distance)?;
        non_negative(
            "hand.auto_release_velocity_threshold",
            self.hand.auto_release_velocity_threshold,
        )?;
        non_negative(
            "hand.settle_velocity_threshold",
            self.hand.settle_velocity_threshold,
        )?;
        if !(0.0..=1.0).contains(&self.hand.idle_follow_factor) {
            return Err(SettingsError::Invalid {
                field: "hand.idle_follow_factor",
                reason: "must lie in [0, 1]",
            });
        }
        if self.hand.holder_layer > 31 {
            return Err(SettingsError::Invalid {
                field: "hand.holder_layer",
                reason: "must be a layer index in 0..=31",
            });
        }

        non_negative(
            "grabbable.max_release_velocity",
            self.grabbable.max_release_velocity,
        )?;
        non_negative(
            "grabbable.grabbed_linear_damping",
            self.grabbable.grabbed_linear_damping,
        )?;

        if let Some(clamp) = self.pid.output_clamp {
            non_negative("pid.output_clamp", clamp)?;
        }

        if !(self.simulation.fixed_timestep.is_finite() && self.simulation.fixed_timestep > 0.0) {
            return Err(SettingsError::Invalid {
                field: "simulation.fixed_timestep",
                reason: "must be positive",
            });
        }
        if self.simulation.max_steps_per_frame == 0 {
            return Err(SettingsError::Invalid {
                field: "simulation.max_steps_per_frame",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Get the settings file path for a project directory
    pub fn settings_file_path(project_dir: &Path) -> std::path::PathBuf {
        project_dir.join(SETTINGS_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings() {
        let settings = InteractionSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert_eq!(settings.hand.max_grabbing_distance, 3.0);
        assert_eq!(settings.grabbable.max_release_velocity, 15.0);
        assert_eq!(settings.pid.output_clamp, Some(3.0));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("interaction.ron");
        let mut settings = InteractionSettings::default();
        settings.hand.max_swing_distance = 2.5;
        settings.pid.kp = 7.0;

        settings.save(&path).unwrap();
        let loaded = InteractionSettings::load(&path).unwrap();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: InteractionSettings =
            ron::from_str("(hand: (max_swing_distance: 1.5))").unwrap();
        assert_eq!(settings.hand.max_swing_distance, 1.5);
        assert_eq!(settings.hand.max_grabbing_distance, 3.0);
        assert_eq!(settings.simulation, SimulationSettings::default());
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("newer.ron");
        std::fs::write(&path, "(version: 99)").unwrap();
        let result = InteractionSettings::load(&path);

        assert!(matches!(
            result,
            Err(SettingsError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut settings = InteractionSettings::default();
        settings.hand.max_swing_distance = -1.0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid {
                field: "hand.max_swing_distance",
                ..
            })
        ));

        let mut settings = InteractionSettings::default();
        settings.simulation.fixed_timestep = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = InteractionSettings::default();
        settings.pid.output_clamp = Some(-3.0);
        assert!(settings.validate().is_err());
    }
}
