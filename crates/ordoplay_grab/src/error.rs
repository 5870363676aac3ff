// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the grab interaction.
//!
//! Invalid transitions (grabbing with nothing in range, swinging while
//! idle, ...) are silent no-ops and never reach this type. What does reach
//! it are contract violations: ids the physics port or the grabbable
//! registry has never heard of.

use crate::body::EntityId;
use thiserror::Error;

/// Grab interaction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrabError {
    /// The physics port has no rigidbody for this entity
    #[error("No rigidbody registered for entity {0:?}")]
    UnknownBody(EntityId),

    /// The physics port has no collider for this entity
    #[error("No collider registered for entity {0:?}")]
    UnknownCollider(EntityId),

    /// The entity was never registered as grabbable
    #[error("Entity {0:?} is not registered as grabbable")]
    NotGrabbable(EntityId),

    /// The entity is already registered as grabbable
    #[error("Entity {0:?} is already registered as grabbable")]
    AlreadyRegistered(EntityId),

    /// No hand belongs to this holder
    #[error("No hand registered for holder {0:?}")]
    UnknownHolder(EntityId),

    /// The holder already has a hand
    #[error("Holder {0:?} already has a hand")]
    DuplicateHolder(EntityId),
}

/// Result type for grab operations
pub type Result<T> = std::result::Result<T, GrabError>;
