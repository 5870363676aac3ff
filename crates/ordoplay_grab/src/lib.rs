// SPDX-License-Identifier: MIT OR Apache-2.0
//! Physical grab interaction for `OrdoPlay` rigidbodies.
//!
//! A holder ("the hand") picks up a dynamic body, carries it in front of
//! itself with a PID-driven velocity controller, can swing it out along a
//! bounded axis, and releases it either on request or automatically when
//! the body moves too fast relative to the holder.
//!
//! ## Architecture
//!
//! The interaction is built on:
//! - [`VectorPid`], the per-axis controller driving a held body
//! - [`Grabbable`], the per-object Idle/Grabbed state machine that
//!   overrides and restores physical properties
//! - [`Hand`], the per-holder Idle/Holding/Swinging state machine
//! - [`Interaction`], the façade that turns discrete intents into
//!   transitions applied at fixed-step boundaries
//!
//! The physics engine is reached only through the port traits in [`body`];
//! [`world::PhysicsWorld`] is a small in-memory implementation of them.

pub mod body;
pub mod error;
pub mod grabbable;
pub mod hand;
pub mod interaction;
pub mod pid;
pub mod settings;
pub mod snapshot;
pub mod world;

pub use body::{
    BodyProperties, ColliderLayers, ColliderPort, CollisionDetection, EntityId, LayerMask,
    PhysicsPort, RaycastHit, RaycastPort, RigidbodyConstraints, RigidbodyInterpolation,
    RigidbodyPort,
};
pub use error::{GrabError, Result};
pub use grabbable::{Grabbable, GrabbableRegistry, GrabbableState, GrabbedState};
pub use hand::{Hand, HandAnchors, HandState, Looker};
pub use interaction::{Intent, Interaction};
pub use pid::{PidGains, VectorPid};
pub use settings::{
    GrabbableSettings, HandSettings, InteractionSettings, SettingsError, SimulationSettings,
};
pub use snapshot::PropertySnapshot;
