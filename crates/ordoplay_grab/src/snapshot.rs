// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property snapshot taken before a grab overrides a body.
//!
//! A [`PropertySnapshot`] is an undo token: [`capture`](PropertySnapshot::capture)
//! produces it, [`restore`](PropertySnapshot::restore) consumes it. Restoring
//! twice does not compile; dropping a token without restoring it is logged
//! and, in debug builds, panics.

use crate::body::{BodyProperties, ColliderLayers, ColliderPort, EntityId, RigidbodyPort};
use crate::error::Result;

/// Body and collider state captured at grab time
#[derive(Debug)]
#[must_use = "a snapshot must be restored to undo the grab overrides"]
pub struct PropertySnapshot {
    body: BodyProperties,
    collider: ColliderLayers,
    armed: bool,
}

impl PropertySnapshot {
    /// Capture all overridable fields of `entity`
    pub fn capture<P>(port: &P, entity: EntityId) -> Result<Self>
    where
        P: RigidbodyPort + ColliderPort + ?Sized,
    {
        Ok(Self {
            body: BodyProperties::read(port, entity)?,
            collider: ColliderLayers::read(port, entity)?,
            armed: true,
        })
    }

    /// Write every captured field back to `entity`, consuming the snapshot
    pub fn restore<P>(mut self, port: &mut P, entity: EntityId) -> Result<()>
    where
        P: RigidbodyPort + ColliderPort + ?Sized,
    {
        self.armed = false;
        self.body.write(port, entity)?;
        self.collider.write(port, entity)
    }

    /// Give up on restoring, leaving the overrides applied
    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }

    /// Captured body fields
    pub fn body(&self) -> &BodyProperties {
        &self.body
    }

    /// Captured collider masks
    pub fn collider(&self) -> &ColliderLayers {
        &self.collider
    }
}

impl Drop for PropertySnapshot {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!(
                "Property snapshot dropped without restore; body overrides are still applied"
            );
            debug_assert!(
                std::thread::panicking(),
                "property snapshot dropped without restore"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{CollisionDetection, LayerMask, RigidbodyConstraints, RigidbodyInterpolation};
    use crate::world::{BodyDesc, ColliderDesc, PhysicsWorld};
    use glam::Vec3;

    fn world_with_crate() -> (PhysicsWorld, EntityId) {
        let mut world = PhysicsWorld::new();
        let id = EntityId::new();
        world.add_body(
            id,
            BodyDesc {
                linear_damping: 0.3,
                interpolation: RigidbodyInterpolation::Interpolate,
                ..BodyDesc::dynamic(Vec3::ZERO)
            },
        );
        world.add_collider(
            id,
            ColliderDesc {
                include: LayerMask::layer(5),
                ..ColliderDesc::sphere(0.5)
            },
        );
        (world, id)
    }

    #[test]
    fn test_restore_is_exact() {
        let (mut world, id) = world_with_crate();
        let before_body = BodyProperties::read(&world, id).unwrap();
        let before_layers = ColliderLayers::read(&world, id).unwrap();

        let snapshot = PropertySnapshot::capture(&world, id).unwrap();
        assert_eq!(*snapshot.body(), before_body);

        world.set_use_gravity(id, false).unwrap();
        world.set_linear_damping(id, 10.0).unwrap();
        world.set_constraints(id, RigidbodyConstraints::FREEZE_ROTATION).unwrap();
        world.set_interpolation(id, RigidbodyInterpolation::Extrapolate).unwrap();
        world.set_collision_detection(id, CollisionDetection::Continuous).unwrap();
        world.set_exclude_layers(id, LayerMask::layer(3)).unwrap();

        snapshot.restore(&mut world, id).unwrap();
        assert_eq!(BodyProperties::read(&world, id).unwrap(), before_body);
        assert_eq!(ColliderLayers::read(&world, id).unwrap(), before_layers);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "dropped without restore")]
    fn test_skipped_restore_fails_fast() {
        let (world, id) = world_with_crate();
        let snapshot = PropertySnapshot::capture(&world, id).unwrap();
        drop(snapshot);
    }

    #[test]
    fn test_disarmed_snapshot_drops_quietly() {
        let (world, id) = world_with_crate();
        let mut snapshot = PropertySnapshot::capture(&world, id).unwrap();
        snapshot.disarm();
        drop(snapshot);
    }

    #[test]
    fn test_capture_unknown_entity_fails() {
        let (world, _) = world_with_crate();
        assert!(PropertySnapshot::capture(&world, EntityId::new()).is_err());
    }
}
