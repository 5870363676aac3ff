// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sandbox errors.

use ordoplay_grab::{GrabError, SettingsError};
use thiserror::Error;

/// Sandbox errors
#[derive(Debug, Error)]
pub enum SandboxError {
    /// Interaction settings could not be loaded
    #[error("Interaction settings: {0}")]
    Settings(#[from] SettingsError),

    /// The interaction rejected an operation
    #[error("Interaction error: {0}")]
    Grab(#[from] GrabError),

    /// Reading a sandbox file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A sandbox file is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// A command line or sandbox setting is out of range
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid {
        /// Offending option
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Result type for sandbox operations
pub type Result<T> = std::result::Result<T, SandboxError>;
