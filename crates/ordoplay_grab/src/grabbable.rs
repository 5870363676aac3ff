// SPDX-License-Identifier: MIT OR Apache-2.0
//! Grabbable objects.
//!
//! This module handles:
//! - Overriding a body's physical behaviour while it is held
//! - Restoring the pre-grab behaviour on release
//! - Sampling the velocity the body is observed to move at
//!
//! The sampled velocity is the displacement over one fixed step, not the
//! engine's internal velocity: a held body is driven by velocity changes and
//! heavy damping, so its observed motion is what matters when it departs.

use crate::body::{
    CollisionDetection, EntityId, PhysicsPort, RigidbodyConstraints, RigidbodyInterpolation,
};
use crate::error::{GrabError, Result};
use crate::settings::GrabbableSettings;
use crate::snapshot::PropertySnapshot;
use glam::Vec3;
use indexmap::IndexMap;

/// Fields that only exist while an object is held
#[derive(Debug)]
pub struct GrabbedState {
    holder: EntityId,
    snapshot: PropertySnapshot,
    previous_position: Vec3,
    interpolated_velocity: Vec3,
}

impl GrabbedState {
    /// Holder that owns the grab
    pub fn holder(&self) -> EntityId {
        self.holder
    }

    /// Properties captured when the grab began
    pub fn snapshot(&self) -> &PropertySnapshot {
        &self.snapshot
    }

    /// Position sampled at the previous fixed step
    pub fn previous_position(&self) -> Vec3 {
        self.previous_position
    }

    /// Velocity observed over the previous fixed step
    pub fn interpolated_velocity(&self) -> Vec3 {
        self.interpolated_velocity
    }
}

/// Grabbable state
#[derive(Debug, Default)]
pub enum GrabbableState {
    /// Resting, nobody holds it
    #[default]
    Idle,
    /// Held by a holder, with its overrides applied
    Grabbed(GrabbedState),
}

/// A dynamic body that can be picked up
#[derive(Debug)]
pub struct Grabbable {
    entity: EntityId,
    settings: GrabbableSettings,
    state: GrabbableState,
}

impl Grabbable {
    /// Wrap the body and collider of `entity`
    pub fn new(entity: EntityId, settings: GrabbableSettings) -> Self {
        Self {
            entity,
            settings,
            state: GrabbableState::Idle,
        }
    }

    /// Grab on behalf of `holder`, ignoring collisions with `holder_layer`.
    ///
    /// Does nothing if already grabbed.
    pub fn grab<P: PhysicsPort + ?Sized>(
        &mut self,
        holder: EntityId,
        holder_layer: u8,
        port: &mut P,
    ) -> Result<()> {
        if self.is_grabbed() {
            return Ok(());
        }

        let position = port.position(self.entity)?;
        let snapshot = PropertySnapshot::capture(port, self.entity)?;
        if let Err(err) = self.apply_overrides(&snapshot, holder_layer, port) {
            snapshot.restore(port, self.entity)?;
            return Err(err);
        }

        self.state = GrabbableState::Grabbed(GrabbedState {
            holder,
            snapshot,
            previous_position: position,
            interpolated_velocity: Vec3::ZERO,
        });
        tracing::debug!("Grabbable {:?} grabbed by {:?}", self.entity, holder);
        Ok(())
    }

    fn apply_overrides<P: PhysicsPort + ?Sized>(
        &self,
        snapshot: &PropertySnapshot,
        holder_layer: u8,
        port: &mut P,
    ) -> Result<()> {
        let excluded = snapshot.collider().exclude.with(holder_layer);
        port.set_use_gravity(self.entity, false)?;
        port.set_linear_damping(self.entity, self.settings.grabbed_linear_damping)?;
        port.set_constraints(self.entity, RigidbodyConstraints::FREEZE_ROTATION)?;
        port.set_interpolation(self.entity, RigidbodyInterpolation::Extrapolate)?;
        port.set_collision_detection(self.entity, CollisionDetection::Continuous)?;
        port.set_exclude_layers(self.entity, excluded)
    }

    /// Restore the pre-grab properties. Does nothing if not grabbed.
    ///
    /// The body keeps whatever velocity the simulation gave it.
    pub fn release<P: PhysicsPort + ?Sized>(&mut self, port: &mut P) -> Result<()> {
        let GrabbableState::Grabbed(grabbed) = std::mem::take(&mut self.state) else {
            return Ok(());
        };

        grabbed.snapshot.restore(port, self.entity)?;
        tracing::debug!("Grabbable {:?} released by {:?}", self.entity, grabbed.holder);
        Ok(())
    }

    /// Release and set the body's velocity to `velocity`.
    ///
    /// Does nothing if not grabbed.
    pub fn release_with_velocity<P: PhysicsPort + ?Sized>(
        &mut self,
        velocity: Vec3,
        port: &mut P,
    ) -> Result<()> {
        if !self.is_grabbed() {
            return Ok(());
        }
        self.release(port)?;
        port.set_linear_velocity(self.entity, velocity)
    }

    /// Sample the observed velocity; called once per fixed step
    pub fn fixed_step<P: PhysicsPort + ?Sized>(&mut self, port: &P, dt: f32) -> Result<()> {
        let GrabbableState::Grabbed(grabbed) = &mut self.state else {
            return Ok(());
        };

        let position = port.position(self.entity)?;
        grabbed.interpolated_velocity = if dt > 0.0 {
            (position - grabbed.previous_position) / dt
        } else {
            Vec3::ZERO
        };
        grabbed.previous_position = position;
        Ok(())
    }

    /// Velocity observed over the last fixed step (zero when idle)
    pub fn interpolated_velocity(&self) -> Vec3 {
        match &self.state {
            GrabbableState::Grabbed(grabbed) => grabbed.interpolated_velocity,
            GrabbableState::Idle => Vec3::ZERO,
        }
    }

    /// Observed velocity, rescaled to at most `max_release_velocity`
    pub fn clamped_interpolated_velocity(&self) -> Vec3 {
        let velocity = self.interpolated_velocity();
        let max = self.settings.max_release_velocity;
        if velocity.length_squared() > max * max {
            velocity.normalize_or_zero() * max
        } else {
            velocity
        }
    }

    /// Check if a holder currently owns this object
    pub fn is_grabbed(&self) -> bool {
        matches!(self.state, GrabbableState::Grabbed(_))
    }

    /// Holder owning the grab, if any
    pub fn holder(&self) -> Option<EntityId> {
        match &self.state {
            GrabbableState::Grabbed(grabbed) => Some(grabbed.holder),
            GrabbableState::Idle => None,
        }
    }

    /// Entity whose body and collider this object drives
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Current state
    pub fn state(&self) -> &GrabbableState {
        &self.state
    }

    /// Settings this object was created with
    pub fn settings(&self) -> &GrabbableSettings {
        &self.settings
    }
}

impl Drop for Grabbable {
    fn drop(&mut self) {
        // Tearing down a held object leaves its overrides in place
        if let GrabbableState::Grabbed(grabbed) = &mut self.state {
            tracing::debug!(
                "Grabbable {:?} dropped while held by {:?}",
                self.entity,
                grabbed.holder
            );
            grabbed.snapshot.disarm();
        }
    }
}

/// Every grabbable known to the interaction, keyed by entity.
///
/// Hands and grabbables refer to each other by [`EntityId`] only; this
/// registry is where those ids resolve.
#[derive(Debug, Default)]
pub struct GrabbableRegistry {
    grabbables: IndexMap<EntityId, Grabbable>,
}

impl GrabbableRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grabbable; fails if its entity is already present
    pub fn insert(&mut self, grabbable: Grabbable) -> Result<()> {
        let entity = grabbable.entity();
        if self.grabbables.contains_key(&entity) {
            return Err(GrabError::AlreadyRegistered(entity));
        }
        self.grabbables.insert(entity, grabbable);
        Ok(())
    }

    /// Remove a grabbable
    pub fn remove(&mut self, entity: EntityId) -> Option<Grabbable> {
        self.grabbables.shift_remove(&entity)
    }

    /// Check if an entity carries the grabbable capability
    pub fn contains(&self, entity: EntityId) -> bool {
        self.grabbables.contains_key(&entity)
    }

    /// Look up a grabbable
    pub fn get(&self, entity: EntityId) -> Option<&Grabbable> {
        self.grabbables.get(&entity)
    }

    /// Look up a grabbable mutably
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut Grabbable> {
        self.grabbables.get_mut(&entity)
    }

    /// Look up a grabbable that must exist
    pub fn require(&self, entity: EntityId) -> Result<&Grabbable> {
        self.get(entity).ok_or(GrabError::NotGrabbable(entity))
    }

    /// Look up a grabbable that must exist, mutably
    pub fn require_mut(&mut self, entity: EntityId) -> Result<&mut Grabbable> {
        self.get_mut(entity).ok_or(GrabError::NotGrabbable(entity))
    }

    /// Sample the velocity of every grabbed object
    pub fn fixed_step<P: PhysicsPort + ?Sized>(&mut self, port: &P, dt: f32) -> Result<()> {
        for grabbable in self.grabbables.values_mut() {
            grabbable.fixed_step(port, dt)?;
        }
        Ok(())
    }

    /// Iterate over registered grabbables in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Grabbable> {
        self.grabbables.values()
    }

    /// Number of registered grabbables
    pub fn len(&self) -> usize {
        self.grabbables.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.grabbables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyProperties, ColliderLayers, ColliderPort, RigidbodyPort};
    use crate::world::{BodyDesc, ColliderDesc, PhysicsWorld};

    const HOLDER_LAYER: u8 = 3;

    fn setup() -> (PhysicsWorld, Grabbable, EntityId) {
        let mut world = PhysicsWorld::new();
        let id = EntityId::new();
        world.add_body(id, BodyDesc::dynamic(Vec3::new(0.0, 1.0, 0.0)));
        world.add_collider(id, ColliderDesc::cuboid(Vec3::ONE));
        (world, Grabbable::new(id, GrabbableSettings::default()), id)
    }

    #[test]
    fn test_grab_overrides_properties() {
        let (mut world, mut grabbable, id) = setup();
        grabbable.grab(EntityId::new(), HOLDER_LAYER, &mut world).unwrap();

        assert!(grabbable.is_grabbed());
        assert!(!world.use_gravity(id).unwrap());
        assert_eq!(world.linear_damping(id).unwrap(), 10.0);
        assert_eq!(world.constraints(id).unwrap(), RigidbodyConstraints::FREEZE_ROTATION);
        assert_eq!(world.interpolation(id).unwrap(), RigidbodyInterpolation::Extrapolate);
        assert_eq!(world.collision_detection(id).unwrap(), CollisionDetection::Continuous);
        assert!(world.exclude_layers(id).unwrap().contains(HOLDER_LAYER));
        assert_eq!(grabbable.interpolated_velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_grab_twice_keeps_first_holder_and_snapshot() {
        let (mut world, mut grabbable, id) = setup();
        let before = BodyProperties::read(&world, id).unwrap();
        let first = EntityId::new();

        grabbable.grab(first, HOLDER_LAYER, &mut world).unwrap();
        grabbable.grab(EntityId::new(), HOLDER_LAYER, &mut world).unwrap();

        assert_eq!(grabbable.holder(), Some(first));
        let GrabbableState::Grabbed(grabbed) = grabbable.state() else {
            panic!("expected grabbed state");
        };
        // The snapshot still holds the pre-grab values, not the overrides
        assert_eq!(*grabbed.snapshot().body(), before);
    }

    #[test]
    fn test_release_round_trip() {
        let (mut world, mut grabbable, id) = setup();
        let body = BodyProperties::read(&world, id).unwrap();
        let layers = ColliderLayers::read(&world, id).unwrap();

        grabbable.grab(EntityId::new(), HOLDER_LAYER, &mut world).unwrap();
        grabbable.release(&mut world).unwrap();

        assert!(!grabbable.is_grabbed());
        assert_eq!(BodyProperties::read(&world, id).unwrap(), body);
        assert_eq!(ColliderLayers::read(&world, id).unwrap(), layers);
    }

    #[test]
    fn test_release_while_idle_is_noop() {
        let (mut world, mut grabbable, id) = setup();
        let body = BodyProperties::read(&world, id).unwrap();

        grabbable.release(&mut world).unwrap();
        grabbable
            .release_with_velocity(Vec3::X * 5.0, &mut world)
            .unwrap();

        assert_eq!(BodyProperties::read(&world, id).unwrap(), body);
        assert_eq!(world.linear_velocity(id).unwrap(), Vec3::ZERO);
    }

    #[test]
    fn test_release_with_velocity_sets_velocity() {
        let (mut world, mut grabbable, id) = setup();
        grabbable.grab(EntityId::new(), HOLDER_LAYER, &mut world).unwrap();
        grabbable
            .release_with_velocity(Vec3::new(1.0, 2.0, 3.0), &mut world)
            .unwrap();

        assert_eq!(world.linear_velocity(id).unwrap(), Vec3::new(1.0, 2.0, 3.0));
        assert!(world.use_gravity(id).unwrap());
    }

    #[test]
    fn test_velocity_sampled_from_displacement() {
        let (mut world, mut grabbable, id) = setup();
        grabbable.grab(EntityId::new(), HOLDER_LAYER, &mut world).unwrap();

        world.teleport(id, Vec3::new(0.1, 1.0, 0.0)).unwrap();
        grabbable.fixed_step(&world, 0.02).unwrap();
        assert!((grabbable.interpolated_velocity().x - 5.0).abs() < 1e-3);

        // No movement over the next step
        grabbable.fixed_step(&world, 0.02).unwrap();
        assert_eq!(grabbable.interpolated_velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_idle_does_not_sample() {
        let (mut world, mut grabbable, id) = setup();
        world.teleport(id, Vec3::new(5.0, 1.0, 0.0)).unwrap();
        grabbable.fixed_step(&world, 0.02).unwrap();
        assert_eq!(grabbable.interpolated_velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_clamped_velocity() {
        let (mut world, mut grabbable, id) = setup();
        grabbable.grab(EntityId::new(), HOLDER_LAYER, &mut world).unwrap();

        // 2 units over 0.02s = 100 u/s, well above the 15 u/s cap
        world.teleport(id, Vec3::new(0.0, 1.0, 2.0)).unwrap();
        grabbable.fixed_step(&world, 0.02).unwrap();

        let clamped = grabbable.clamped_interpolated_velocity();
        assert!((clamped.length() - 15.0).abs() < 1e-3);
        assert!(clamped.normalize().abs_diff_eq(Vec3::Z, 1e-5));

        // Below the cap the velocity passes through unchanged
        world.teleport(id, Vec3::new(0.0, 1.0, 2.1)).unwrap();
        grabbable.fixed_step(&world, 0.02).unwrap();
        assert_eq!(
            grabbable.clamped_interpolated_velocity(),
            grabbable.interpolated_velocity()
        );
    }

    #[test]
    fn test_dropping_held_grabbable_is_quiet() {
        let (mut world, mut grabbable, id) = setup();
        grabbable.grab(EntityId::new(), HOLDER_LAYER, &mut world).unwrap();
        drop(grabbable);

        // Overrides stay applied; nothing restored them
        assert!(!world.use_gravity(id).unwrap());
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = GrabbableRegistry::new();
        let id = EntityId::new();
        registry
            .insert(Grabbable::new(id, GrabbableSettings::default()))
            .unwrap();

        assert_eq!(
            registry.insert(Grabbable::new(id, GrabbableSettings::default())),
            Err(GrabError::AlreadyRegistered(id))
        );
        assert_eq!(registry.len(), 1);
        assert!(matches!(
            registry.require(EntityId::new()),
            Err(GrabError::NotGrabbable(_))
        ));
    }
}
