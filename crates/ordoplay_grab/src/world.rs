// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reference physics world implementing the interaction ports.
//!
//! This module provides a simple physics simulation including:
//! - Rigidbody dynamics (gravity, damping, velocity changes)
//! - Collision detection (sphere-sphere, box-box, sphere-box)
//! - Collision response with bounciness
//! - Layer filtering with per-collider include/exclude masks
//! - Ray casts against spheres and boxes
//!
//! Boxes are axis aligned regardless of body rotation. Interpolation and
//! collision detection modes are stored for the ports but do not change how
//! this world integrates.

use crate::body::{
    ColliderPort, CollisionDetection, EntityId, LayerMask, RaycastHit, RaycastPort,
    RigidbodyConstraints, RigidbodyInterpolation, RigidbodyPort,
};
use crate::error::{GrabError, Result};
use glam::{Quat, Vec3};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Rigidbody type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BodyType {
    /// Dynamic body - fully simulated
    #[default]
    Dynamic,
    /// Kinematic body - moved by code, affects dynamic bodies
    Kinematic,
    /// Static body - never moves
    Static,
}

/// Initial state of a body added to the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyDesc {
    /// Body type
    pub body_type: BodyType,
    /// Initial position
    pub position: Vec3,
    /// Initial rotation
    pub rotation: Quat,
    /// Initial linear velocity
    pub velocity: Vec3,
    /// Initial angular velocity (radians/sec)
    pub angular_velocity: Vec3,
    /// Mass in kilograms
    pub mass: f32,
    /// Linear damping
    pub linear_damping: f32,
    /// Angular damping
    pub angular_damping: f32,
    /// Whether to use gravity
    pub use_gravity: bool,
    /// Axis constraints
    pub constraints: RigidbodyConstraints,
    /// Interpolation mode
    pub interpolation: RigidbodyInterpolation,
    /// Collision detection mode
    pub collision_detection: CollisionDetection,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.05,
            use_gravity: true,
            constraints: RigidbodyConstraints::NONE,
            interpolation: RigidbodyInterpolation::None,
            collision_detection: CollisionDetection::Discrete,
        }
    }
}

impl BodyDesc {
    /// Dynamic body at `position`
    pub fn dynamic(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Kinematic body at `position`
    pub fn kinematic(position: Vec3) -> Self {
        Self {
            body_type: BodyType::Kinematic,
            position,
            use_gravity: false,
            ..Self::default()
        }
    }

    /// Static body at `position`
    pub fn fixed(position: Vec3) -> Self {
        Self {
            body_type: BodyType::Static,
            position,
            use_gravity: false,
            ..Self::default()
        }
    }
}

/// Physics body state during simulation
#[derive(Debug, Clone)]
pub struct PhysicsBody {
    /// Entity this body belongs to
    pub entity_id: EntityId,
    /// Body type
    pub body_type: BodyType,
    /// Current position
    pub position: Vec3,
    /// Current rotation
    pub rotation: Quat,
    /// Linear velocity
    pub velocity: Vec3,
    /// Angular velocity (radians/sec)
    pub angular_velocity: Vec3,
    /// Mass
    pub mass: f32,
    /// Inverse mass (0 for static/kinematic)
    pub inv_mass: f32,
    /// Linear damping
    pub linear_damping: f32,
    /// Angular damping
    pub angular_damping: f32,
    /// Use gravity
    pub use_gravity: bool,
    /// Axis constraints
    pub constraints: RigidbodyConstraints,
    /// Interpolation mode
    pub interpolation: RigidbodyInterpolation,
    /// Collision detection mode
    pub collision_detection: CollisionDetection,
    /// Accumulated force for this step
    pub force: Vec3,
}

impl PhysicsBody {
    /// Create a body from its description
    pub fn from_desc(entity_id: EntityId, desc: &BodyDesc) -> Self {
        let inv_mass = match desc.body_type {
            BodyType::Dynamic => 1.0 / desc.mass.max(0.001),
            BodyType::Kinematic | BodyType::Static => 0.0,
        };

        Self {
            entity_id,
            body_type: desc.body_type,
            position: desc.position,
            rotation: desc.rotation,
            velocity: desc.velocity,
            angular_velocity: desc.angular_velocity,
            mass: desc.mass,
            inv_mass,
            linear_damping: desc.linear_damping,
            angular_damping: desc.angular_damping,
            use_gravity: desc.use_gravity,
            constraints: desc.constraints,
            interpolation: desc.interpolation,
            collision_detection: desc.collision_detection,
            force: Vec3::ZERO,
        }
    }

    /// Apply a force at the center of mass
    pub fn add_force(&mut self, force: Vec3) {
        self.force += force;
    }

    /// Check if this body is moved by forces
    pub fn is_dynamic(&self) -> bool {
        matches!(self.body_type, BodyType::Dynamic)
    }
}

/// Collider shape for collision detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Sphere around `center`
    Sphere {
        /// Radius
        radius: f32,
        /// Offset from the body position
        center: Vec3,
    },
    /// Axis-aligned box around `center`
    Box {
        /// Full extents
        size: Vec3,
        /// Offset from the body position
        center: Vec3,
    },
}

/// Collider added to the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColliderDesc {
    /// Shape
    pub shape: ColliderShape,
    /// Is this a trigger (no physics response)
    pub is_trigger: bool,
    /// Collision layer
    pub layer: u8,
    /// Layers forced to collide with this collider
    pub include: LayerMask,
    /// Layers never colliding with this collider
    pub exclude: LayerMask,
    /// Bounciness
    pub bounciness: f32,
}

impl ColliderDesc {
    /// Centered sphere on layer 0
    pub fn sphere(radius: f32) -> Self {
        Self::with_shape(ColliderShape::Sphere {
            radius,
            center: Vec3::ZERO,
        })
    }

    /// Centered box on layer 0
    pub fn cuboid(size: Vec3) -> Self {
        Self::with_shape(ColliderShape::Box {
            size,
            center: Vec3::ZERO,
        })
    }

    fn with_shape(shape: ColliderShape) -> Self {
        Self {
            shape,
            is_trigger: false,
            layer: 0,
            include: LayerMask::NONE,
            exclude: LayerMask::NONE,
            bounciness: 0.0,
        }
    }

    /// Put the collider on `layer`
    pub fn on_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }
}

/// Physics collider
pub type PhysicsCollider = ColliderDesc;

/// Contact point from collision detection
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Entity A
    pub entity_a: EntityId,
    /// Entity B
    pub entity_b: EntityId,
    /// Contact point in world space
    pub point: Vec3,
    /// Contact normal (from A to B)
    pub normal: Vec3,
    /// Penetration depth
    pub depth: f32,
    /// Combined bounciness
    pub bounciness: f32,
}

/// Collision layer matrix
#[derive(Debug, Clone)]
pub struct CollisionLayers {
    /// Collision matrix (layers[i] collides with layers[j])
    pub matrix: Vec<Vec<bool>>,
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::new(32)
    }
}

impl CollisionLayers {
    /// All layers collide with all layers
    pub fn new(num_layers: usize) -> Self {
        Self {
            matrix: vec![vec![true; num_layers]; num_layers],
        }
    }

    /// Enable or disable collisions between two layers (symmetric)
    pub fn set_collides(&mut self, layer_a: u8, layer_b: u8, collides: bool) {
        let (a, b) = (usize::from(layer_a), usize::from(layer_b));
        if a < self.matrix.len() && b < self.matrix.len() {
            self.matrix[a][b] = collides;
            self.matrix[b][a] = collides;
        }
    }

    /// Matrix lookup; layers out of range collide
    pub fn should_collide(&self, layer_a: u8, layer_b: u8) -> bool {
        let (a, b) = (usize::from(layer_a), usize::from(layer_b));
        if a < self.matrix.len() && b < self.matrix.len() {
            self.matrix[a][b]
        } else {
            true
        }
    }

    /// Pair filter: exclude masks win, include masks force, matrix decides the rest
    pub fn pair_collides(&self, a: &PhysicsCollider, b: &PhysicsCollider) -> bool {
        if a.exclude.contains(b.layer) || b.exclude.contains(a.layer) {
            return false;
        }
        if a.include.contains(b.layer) || b.include.contains(a.layer) {
            return true;
        }
        self.should_collide(a.layer, b.layer)
    }
}

/// Physics world managing the simulation
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    /// Gravity vector
    pub gravity: Vec3,
    /// All physics bodies, in insertion order
    pub bodies: IndexMap<EntityId, PhysicsBody>,
    /// All colliders, in insertion order
    pub colliders: IndexMap<EntityId, Vec<PhysicsCollider>>,
    /// Collision layer configuration
    pub collision_layers: CollisionLayers,
    /// Contacts found by the last step
    pub contacts: Vec<Contact>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Empty world with earth gravity
    pub fn new() -> Self {
        Self::with_gravity(Vec3::new(0.0, -9.81, 0.0))
    }

    /// Empty world with the given gravity
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            bodies: IndexMap::new(),
            colliders: IndexMap::new(),
            collision_layers: CollisionLayers::default(),
            contacts: Vec::new(),
        }
    }

    /// Add or replace the body of `entity`
    pub fn add_body(&mut self, entity: EntityId, desc: BodyDesc) {
        self.bodies
            .insert(entity, PhysicsBody::from_desc(entity, &desc));
    }

    /// Attach a collider to `entity`
    pub fn add_collider(&mut self, entity: EntityId, collider: ColliderDesc) {
        self.colliders.entry(entity).or_default().push(collider);
    }

    /// Get the body for an entity
    pub fn body(&self, entity: EntityId) -> Option<&PhysicsBody> {
        self.bodies.get(&entity)
    }

    /// Move a body without simulating the motion
    pub fn teleport(&mut self, entity: EntityId, position: Vec3) -> Result<()> {
        self.expect_body_mut(entity)?.position = position;
        Ok(())
    }

    /// Contacts found by the last step
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    fn expect_body(&self, entity: EntityId) -> Result<&PhysicsBody> {
        self.bodies.get(&entity).ok_or(GrabError::UnknownBody(entity))
    }

    fn expect_body_mut(&mut self, entity: EntityId) -> Result<&mut PhysicsBody> {
        self.bodies
            .get_mut(&entity)
            .ok_or(GrabError::UnknownBody(entity))
    }

    fn expect_colliders(&self, entity: EntityId) -> Result<&[PhysicsCollider]> {
        match self.colliders.get(&entity) {
            Some(colliders) if !colliders.is_empty() => Ok(colliders),
            _ => Err(GrabError::UnknownCollider(entity)),
        }
    }

    fn expect_colliders_mut(&mut self, entity: EntityId) -> Result<&mut Vec<PhysicsCollider>> {
        match self.colliders.get_mut(&entity) {
            Some(colliders) if !colliders.is_empty() => Ok(colliders),
            _ => Err(GrabError::UnknownCollider(entity)),
        }
    }

    /// Step the physics simulation
    pub fn step(&mut self, dt: f32) {
        self.contacts.clear();

        // Apply gravity and integrate forces
        self.integrate_forces(dt);

        // Detect and resolve collisions
        self.detect_collisions();
        self.resolve_collisions();

        // Frozen axes do not move
        self.apply_constraints();

        // Integrate velocities to positions
        self.integrate_velocities(dt);

        for body in self.bodies.values_mut() {
            body.force = Vec3::ZERO;
        }
    }

    fn integrate_forces(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            if !body.is_dynamic() {
                continue;
            }

            if body.use_gravity {
                let gravity_force = self.gravity * body.mass;
                body.add_force(gravity_force);
            }

            let acceleration = body.force * body.inv_mass;
            body.velocity += acceleration * dt;

            body.velocity *= (1.0 - body.linear_damping * dt).max(0.0);
            body.angular_velocity *= (1.0 - body.angular_damping * dt).max(0.0);
        }
    }

    fn integrate_velocities(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            if matches!(body.body_type, BodyType::Static) {
                continue;
            }

            body.position += body.velocity * dt;

            if body.angular_velocity != Vec3::ZERO {
                let spin = Quat::from_scaled_axis(body.angular_velocity * dt);
                body.rotation = (spin * body.rotation).normalize();
            }
        }
    }

    fn apply_constraints(&mut self) {
        for body in self.bodies.values_mut() {
            let [px, py, pz] = body.constraints.position_axes();
            let [rx, ry, rz] = body.constraints.rotation_axes();

            if px {
                body.velocity.x = 0.0;
            }
            if py {
                body.velocity.y = 0.0;
            }
            if pz {
                body.velocity.z = 0.0;
            }
            if rx {
                body.angular_velocity.x = 0.0;
            }
            if ry {
                body.angular_velocity.y = 0.0;
            }
            if rz {
                body.angular_velocity.z = 0.0;
            }
        }
    }

    fn body_position(&self, entity: EntityId) -> Vec3 {
        self.bodies
            .get(&entity)
            .map(|b| b.position)
            .unwrap_or_default()
    }

    fn detect_collisions(&mut self) {
        let entity_ids: Vec<EntityId> = self.colliders.keys().copied().collect();
        let mut contacts = Vec::new();

        for (i, &id_a) in entity_ids.iter().enumerate() {
            for &id_b in &entity_ids[i + 1..] {
                let (Some(colliders_a), Some(colliders_b)) =
                    (self.colliders.get(&id_a), self.colliders.get(&id_b))
                else {
                    continue;
                };

                let pos_a = self.body_position(id_a);
                let pos_b = self.body_position(id_b);

                for col_a in colliders_a {
                    for col_b in colliders_b {
                        if col_a.is_trigger || col_b.is_trigger {
                            continue;
                        }
                        if !self.collision_layers.pair_collides(col_a, col_b) {
                            continue;
                        }

                        if let Some((point, normal, depth)) =
                            test_collision(&col_a.shape, pos_a, &col_b.shape, pos_b)
                        {
                            contacts.push(Contact {
                                entity_a: id_a,
                                entity_b: id_b,
                                point,
                                normal,
                                depth,
                                bounciness: (col_a.bounciness + col_b.bounciness) * 0.5,
                            });
                        }
                    }
                }
            }
        }

        self.contacts = contacts;
    }

    fn resolve_collisions(&mut self) {
        for contact in &self.contacts {
            let inv_mass_a = self.bodies.get(&contact.entity_a).map_or(0.0, |b| b.inv_mass);
            let inv_mass_b = self.bodies.get(&contact.entity_b).map_or(0.0, |b| b.inv_mass);
            let total_inv_mass = inv_mass_a + inv_mass_b;

            if total_inv_mass <= 0.0 {
                continue;
            }

            let vel_a = self.bodies.get(&contact.entity_a).map_or(Vec3::ZERO, |b| b.velocity);
            let vel_b = self.bodies.get(&contact.entity_b).map_or(Vec3::ZERO, |b| b.velocity);
            let normal_vel = (vel_a - vel_b).dot(contact.normal);

            // Correct penetration even when already separating (Baumgarte)
            let correction = contact.normal * (contact.depth * 0.8 / total_inv_mass);

            // Only bounce if objects are moving towards each other
            let impulse = if normal_vel > 0.0 {
                -(1.0 + contact.bounciness) * normal_vel / total_inv_mass
            } else {
                0.0
            };

            if let Some(body) = self.bodies.get_mut(&contact.entity_a) {
                if body.is_dynamic() {
                    body.velocity += contact.normal * impulse * inv_mass_a;
                    body.position -= correction * inv_mass_a;
                }
            }
            if let Some(body) = self.bodies.get_mut(&contact.entity_b) {
                if body.is_dynamic() {
                    body.velocity -= contact.normal * impulse * inv_mass_b;
                    body.position += correction * inv_mass_b;
                }
            }
        }
    }
}

/// Contact point, normal (from A to B) and depth of two overlapping shapes
fn test_collision(
    shape_a: &ColliderShape,
    pos_a: Vec3,
    shape_b: &ColliderShape,
    pos_b: Vec3,
) -> Option<(Vec3, Vec3, f32)> {
    match (*shape_a, *shape_b) {
        (
            ColliderShape::Sphere { radius: r1, center: c1 },
            ColliderShape::Sphere { radius: r2, center: c2 },
        ) => sphere_sphere(pos_a + c1, r1, pos_b + c2, r2),
        (ColliderShape::Sphere { radius, center }, ColliderShape::Box { size, center: bc }) => {
            sphere_box(pos_a + center, radius, pos_b + bc, size)
        }
        (ColliderShape::Box { size, center: bc }, ColliderShape::Sphere { radius, center }) => {
            sphere_box(pos_b + center, radius, pos_a + bc, size)
                .map(|(point, normal, depth)| (point, -normal, depth))
        }
        (ColliderShape::Box { size: s1, center: c1 }, ColliderShape::Box { size: s2, center: c2 }) => {
            box_box(pos_a + c1, s1, pos_b + c2, s2)
        }
    }
}

fn sphere_sphere(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32) -> Option<(Vec3, Vec3, f32)> {
    let diff = b - a;
    let dist_sq = diff.length_squared();
    let min_dist = radius_a + radius_b;
    if dist_sq >= min_dist * min_dist {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > 0.0001 { diff / dist } else { Vec3::Y };
    Some((a + normal * radius_a, normal, min_dist - dist))
}

/// Normal points from the sphere towards the box
fn sphere_box(sphere: Vec3, radius: f32, box_pos: Vec3, size: Vec3) -> Option<(Vec3, Vec3, f32)> {
    let half = size * 0.5;
    let local = sphere - box_pos;
    let closest = local.clamp(-half, half);

    let diff = local - closest;
    let dist_sq = diff.length_squared();
    if dist_sq >= radius * radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    let outward = if dist > 0.0001 { diff / dist } else { Vec3::Y };
    Some((box_pos + closest, -outward, radius - dist))
}

fn box_box(pos_a: Vec3, size_a: Vec3, pos_b: Vec3, size_b: Vec3) -> Option<(Vec3, Vec3, f32)> {
    let (half_a, half_b) = (size_a * 0.5, size_b * 0.5);
    let (min_a, max_a) = (pos_a - half_a, pos_a + half_a);
    let (min_b, max_b) = (pos_b - half_b, pos_b + half_b);

    if max_a.cmplt(min_b).any() || min_a.cmpgt(max_b).any() {
        return None;
    }

    let overlap = (max_a.min(max_b) - min_a.max(min_b)).max(Vec3::ZERO);

    // Separate along the axis of least overlap
    let sign = |a: f32, b: f32| if b > a { 1.0 } else { -1.0 };
    let (depth, normal) = if overlap.x <= overlap.y && overlap.x <= overlap.z {
        (overlap.x, Vec3::new(sign(pos_a.x, pos_b.x), 0.0, 0.0))
    } else if overlap.y <= overlap.z {
        (overlap.y, Vec3::new(0.0, sign(pos_a.y, pos_b.y), 0.0))
    } else {
        (overlap.z, Vec3::new(0.0, 0.0, sign(pos_a.z, pos_b.z)))
    };

    Some(((pos_a + pos_b) * 0.5, normal, depth))
}

/// Entry distance of a ray into a sphere; `None` when missed or starting inside
fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let m = origin - center;
    let b = m.dot(direction);
    let c = m.length_squared() - radius * radius;
    if c <= 0.0 || b > 0.0 {
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(-b - discriminant.sqrt())
}

/// Entry distance of a ray into an axis-aligned box; `None` when missed or starting inside
fn ray_box(origin: Vec3, direction: Vec3, center: Vec3, size: Vec3) -> Option<f32> {
    let half = size * 0.5;
    let (min, max) = (center - half, center + half);
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let (o, d) = (origin[axis], direction[axis]);
        if d.abs() < 1e-8 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
        if t_enter > t_exit {
            return None;
        }
    }

    (t_enter >= 0.0).then_some(t_enter)
}

impl RaycastPort for PhysicsWorld {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        let direction = direction.try_normalize()?;
        let mut nearest: Option<RaycastHit> = None;

        for (entity, colliders) in &self.colliders {
            let pos = self.body_position(*entity);

            for collider in colliders.iter().filter(|c| !c.is_trigger) {
                let distance = match collider.shape {
                    ColliderShape::Sphere { radius, center } => {
                        ray_sphere(origin, direction, pos + center, radius)
                    }
                    ColliderShape::Box { size, center } => {
                        ray_box(origin, direction, pos + center, size)
                    }
                };

                let Some(distance) = distance.filter(|d| *d <= max_distance) else {
                    continue;
                };
                if nearest.map_or(true, |hit| distance < hit.distance) {
                    nearest = Some(RaycastHit {
                        point: origin + direction * distance,
                        distance,
                        entity: *entity,
                    });
                }
            }
        }

        nearest
    }
}

impl RigidbodyPort for PhysicsWorld {
    fn use_gravity(&self, entity: EntityId) -> Result<bool> {
        Ok(self.expect_body(entity)?.use_gravity)
    }

    fn set_use_gravity(&mut self, entity: EntityId, enabled: bool) -> Result<()> {
        self.expect_body_mut(entity)?.use_gravity = enabled;
        Ok(())
    }

    fn linear_damping(&self, entity: EntityId) -> Result<f32> {
        Ok(self.expect_body(entity)?.linear_damping)
    }

    fn set_linear_damping(&mut self, entity: EntityId, damping: f32) -> Result<()> {
        self.expect_body_mut(entity)?.linear_damping = damping;
        Ok(())
    }

    fn constraints(&self, entity: EntityId) -> Result<RigidbodyConstraints> {
        Ok(self.expect_body(entity)?.constraints)
    }

    fn set_constraints(&mut self, entity: EntityId, constraints: RigidbodyConstraints) -> Result<()> {
        self.expect_body_mut(entity)?.constraints = constraints;
        Ok(())
    }

    fn interpolation(&self, entity: EntityId) -> Result<RigidbodyInterpolation> {
        Ok(self.expect_body(entity)?.interpolation)
    }

    fn set_interpolation(&mut self, entity: EntityId, mode: RigidbodyInterpolation) -> Result<()> {
        self.expect_body_mut(entity)?.interpolation = mode;
        Ok(())
    }

    fn collision_detection(&self, entity: EntityId) -> Result<CollisionDetection> {
        Ok(self.expect_body(entity)?.collision_detection)
    }

    fn set_collision_detection(&mut self, entity: EntityId, mode: CollisionDetection) -> Result<()> {
        self.expect_body_mut(entity)?.collision_detection = mode;
        Ok(())
    }

    fn linear_velocity(&self, entity: EntityId) -> Result<Vec3> {
        Ok(self.expect_body(entity)?.velocity)
    }

    fn set_linear_velocity(&mut self, entity: EntityId, velocity: Vec3) -> Result<()> {
        self.expect_body_mut(entity)?.velocity = velocity;
        Ok(())
    }

    fn apply_velocity_change(&mut self, entity: EntityId, delta: Vec3) -> Result<()> {
        let body = self.expect_body_mut(entity)?;
        if body.is_dynamic() {
            body.velocity += delta;
        }
        Ok(())
    }

    fn position(&self, entity: EntityId) -> Result<Vec3> {
        Ok(self.expect_body(entity)?.position)
    }

    fn rotation(&self, entity: EntityId) -> Result<Quat> {
        Ok(self.expect_body(entity)?.rotation)
    }

    fn set_rotation(&mut self, entity: EntityId, rotation: Quat) -> Result<()> {
        self.expect_body_mut(entity)?.rotation = rotation;
        Ok(())
    }
}

impl ColliderPort for PhysicsWorld {
    fn include_layers(&self, entity: EntityId) -> Result<LayerMask> {
        Ok(self.expect_colliders(entity)?[0].include)
    }

    fn set_include_layers(&mut self, entity: EntityId, mask: LayerMask) -> Result<()> {
        for collider in self.expect_colliders_mut(entity)? {
            collider.include = mask;
        }
        Ok(())
    }

    fn exclude_layers(&self, entity: EntityId) -> Result<LayerMask> {
        Ok(self.expect_colliders(entity)?[0].exclude)
    }

    fn set_exclude_layers(&mut self, entity: EntityId, mask: LayerMask) -> Result<()> {
        for collider in self.expect_colliders_mut(entity)? {
            collider.exclude = mask;
        }
        Ok(())
    }
}
