// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rigidbody and collider surface consumed from the physics engine.
//!
//! This module defines:
//! - The property types a grab overrides (gravity, damping, constraints,
//!   interpolation, collision detection, layer masks)
//! - The port traits through which the interaction reads and writes them
//!
//! The interaction never creates or destroys bodies; it only talks to the
//! engine through [`RigidbodyPort`], [`ColliderPort`] and [`RaycastPort`].

use crate::error::Result;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a simulated entity.
///
/// A rigidbody and its collision volume share the id of their entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Interpolation mode for smooth rendering
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RigidbodyInterpolation {
    /// No interpolation
    #[default]
    None,
    /// Interpolate between previous and current position
    Interpolate,
    /// Extrapolate based on velocity
    Extrapolate,
}

/// Collision detection mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CollisionDetection {
    /// Discrete collision detection (default, faster)
    #[default]
    Discrete,
    /// Continuous collision detection (better for fast objects)
    Continuous,
    /// Continuous dynamic (best quality, slowest)
    ContinuousDynamic,
}

/// Axis constraints for freezing position/rotation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RigidbodyConstraints {
    /// Freeze position on X axis
    pub freeze_position_x: bool,
    /// Freeze position on Y axis
    pub freeze_position_y: bool,
    /// Freeze position on Z axis
    pub freeze_position_z: bool,
    /// Freeze rotation on X axis
    pub freeze_rotation_x: bool,
    /// Freeze rotation on Y axis
    pub freeze_rotation_y: bool,
    /// Freeze rotation on Z axis
    pub freeze_rotation_z: bool,
}

impl RigidbodyConstraints {
    /// No axis frozen
    pub const NONE: Self = Self {
        freeze_position_x: false,
        freeze_position_y: false,
        freeze_position_z: false,
        freeze_rotation_x: false,
        freeze_rotation_y: false,
        freeze_rotation_z: false,
    };

    /// All rotation axes frozen, position free
    pub const FREEZE_ROTATION: Self = Self {
        freeze_rotation_x: true,
        freeze_rotation_y: true,
        freeze_rotation_z: true,
        ..Self::NONE
    };

    /// Position freeze flags as an array
    pub fn position_axes(&self) -> [bool; 3] {
        [
            self.freeze_position_x,
            self.freeze_position_y,
            self.freeze_position_z,
        ]
    }

    /// Rotation freeze flags as an array
    pub fn rotation_axes(&self) -> [bool; 3] {
        [
            self.freeze_rotation_x,
            self.freeze_rotation_y,
            self.freeze_rotation_z,
        ]
    }
}

/// Bit set of collision layers (0..=31)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Mask with no layer set
    pub const NONE: Self = Self(0);
    /// Mask with every layer set
    pub const ALL: Self = Self(u32::MAX);

    /// Mask containing a single layer
    pub fn layer(layer: u8) -> Self {
        Self(1u32.checked_shl(u32::from(layer)).unwrap_or(0))
    }

    /// Check if a layer is set
    pub fn contains(&self, layer: u8) -> bool {
        self.0 & Self::layer(layer).0 != 0
    }

    /// Copy of this mask with `layer` added
    #[must_use]
    pub fn with(self, layer: u8) -> Self {
        self.union(Self::layer(layer))
    }

    /// Union of two masks
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if no layer is set
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// The five rigidbody fields a grab overrides
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyProperties {
    /// Whether gravity acts on the body
    pub use_gravity: bool,
    /// Linear damping coefficient
    pub linear_damping: f32,
    /// Rotational and positional freedom
    pub constraints: RigidbodyConstraints,
    /// Render interpolation mode
    pub interpolation: RigidbodyInterpolation,
    /// Collision detection fidelity
    pub collision_detection: CollisionDetection,
}

impl BodyProperties {
    /// Read all five fields of a body
    pub fn read<P: RigidbodyPort + ?Sized>(port: &P, entity: EntityId) -> Result<Self> {
        Ok(Self {
            use_gravity: port.use_gravity(entity)?,
            linear_damping: port.linear_damping(entity)?,
            constraints: port.constraints(entity)?,
            interpolation: port.interpolation(entity)?,
            collision_detection: port.collision_detection(entity)?,
        })
    }

    /// Write all five fields to a body
    pub fn write<P: RigidbodyPort + ?Sized>(&self, port: &mut P, entity: EntityId) -> Result<()> {
        port.set_use_gravity(entity, self.use_gravity)?;
        port.set_linear_damping(entity, self.linear_damping)?;
        port.set_constraints(entity, self.constraints)?;
        port.set_interpolation(entity, self.interpolation)?;
        port.set_collision_detection(entity, self.collision_detection)?;
        Ok(())
    }
}

/// Include and exclude masks of a collision volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColliderLayers {
    /// Layers this volume is forced to collide with
    pub include: LayerMask,
    /// Layers this volume never collides with
    pub exclude: LayerMask,
}

impl ColliderLayers {
    /// Read both masks of a collision volume
    pub fn read<P: ColliderPort + ?Sized>(port: &P, entity: EntityId) -> Result<Self> {
        Ok(Self {
            include: port.include_layers(entity)?,
            exclude: port.exclude_layers(entity)?,
        })
    }

    /// Write both masks to a collision volume
    pub fn write<P: ColliderPort + ?Sized>(&self, port: &mut P, entity: EntityId) -> Result<()> {
        port.set_include_layers(entity, self.include)?;
        port.set_exclude_layers(entity, self.exclude)?;
        Ok(())
    }
}

/// Result of a ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Hit point in world space
    pub point: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
    /// Entity owning the hit collider
    pub entity: EntityId,
}

/// Read/write access to rigidbodies.
///
/// Every accessor fails with [`GrabError::UnknownBody`](crate::GrabError::UnknownBody)
/// when the entity has no body.
pub trait RigidbodyPort {
    /// Whether gravity acts on the body
    fn use_gravity(&self, entity: EntityId) -> Result<bool>;
    /// Enable or disable gravity
    fn set_use_gravity(&mut self, entity: EntityId, enabled: bool) -> Result<()>;
    /// Linear damping coefficient
    fn linear_damping(&self, entity: EntityId) -> Result<f32>;
    /// Set the linear damping coefficient
    fn set_linear_damping(&mut self, entity: EntityId, damping: f32) -> Result<()>;
    /// Axis constraints
    fn constraints(&self, entity: EntityId) -> Result<RigidbodyConstraints>;
    /// Set the axis constraints
    fn set_constraints(&mut self, entity: EntityId, constraints: RigidbodyConstraints) -> Result<()>;
    /// Interpolation mode
    fn interpolation(&self, entity: EntityId) -> Result<RigidbodyInterpolation>;
    /// Set the interpolation mode
    fn set_interpolation(&mut self, entity: EntityId, mode: RigidbodyInterpolation) -> Result<()>;
    /// Collision detection mode
    fn collision_detection(&self, entity: EntityId) -> Result<CollisionDetection>;
    /// Set the collision detection mode
    fn set_collision_detection(&mut self, entity: EntityId, mode: CollisionDetection) -> Result<()>;
    /// Instantaneous linear velocity
    fn linear_velocity(&self, entity: EntityId) -> Result<Vec3>;
    /// Overwrite the linear velocity
    fn set_linear_velocity(&mut self, entity: EntityId, velocity: Vec3) -> Result<()>;
    /// Apply an instantaneous velocity change, ignoring mass
    fn apply_velocity_change(&mut self, entity: EntityId, delta: Vec3) -> Result<()>;
    /// World-space position
    fn position(&self, entity: EntityId) -> Result<Vec3>;
    /// World-space rotation
    fn rotation(&self, entity: EntityId) -> Result<Quat>;
    /// Overwrite the world-space rotation
    fn set_rotation(&mut self, entity: EntityId, rotation: Quat) -> Result<()>;
}

/// Read/write access to collision volume layer masks.
///
/// Every accessor fails with [`GrabError::UnknownCollider`](crate::GrabError::UnknownCollider)
/// when the entity has no collider.
pub trait ColliderPort {
    /// Include-layer mask
    fn include_layers(&self, entity: EntityId) -> Result<LayerMask>;
    /// Set the include-layer mask
    fn set_include_layers(&mut self, entity: EntityId, mask: LayerMask) -> Result<()>;
    /// Exclude-layer mask
    fn exclude_layers(&self, entity: EntityId) -> Result<LayerMask>;
    /// Set the exclude-layer mask
    fn set_exclude_layers(&mut self, entity: EntityId, mask: LayerMask) -> Result<()>;
}

/// Scene ray queries
pub trait RaycastPort {
    /// Cast a ray and return the nearest hit within `max_distance`
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit>;
}

/// Everything the interaction needs from a physics engine
pub trait PhysicsPort: RigidbodyPort + ColliderPort + RaycastPort {}

impl<T: RigidbodyPort + ColliderPort + RaycastPort + ?Sized> PhysicsPort for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_mask_bits() {
        let mask = LayerMask::NONE.with(3).with(0);
        assert!(mask.contains(3));
        assert!(mask.contains(0));
        assert!(!mask.contains(1));
        assert_eq!(mask.0, 0b1001);

        // Out of range layers never set a bit
        assert!(LayerMask::layer(40).is_empty());
        assert!(!LayerMask::ALL.contains(40));
    }

    #[test]
    fn test_freeze_rotation_leaves_position_free() {
        let constraints = RigidbodyConstraints::FREEZE_ROTATION;
        assert_eq!(constraints.rotation_axes(), [true; 3]);
        assert_eq!(constraints.position_axes(), [false; 3]);
    }
}
