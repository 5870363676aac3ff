// SPDX-License-Identifier: MIT OR Apache-2.0
//! Intent façade over the hands and the grabbables they share.
//!
//! Input arrives once per rendered frame, physics runs in fixed steps.
//! Intent methods on [`Interaction`] only queue; the queue is drained at the
//! start of [`Interaction::fixed_update`], so a transition never lands in
//! the middle of a step.
//!
//! Every hand of one interaction resolves grabbables through the same
//! registry, so an object held by one hand is out of reach for the others.
//! The hand passed to [`Interaction::new`] is the primary hand; the
//! single-hand methods ([`grab`](Interaction::grab), [`hand`](Interaction::hand),
//! ...) act on it.

use crate::body::{EntityId, PhysicsPort};
use crate::error::{GrabError, Result};
use crate::grabbable::{Grabbable, GrabbableRegistry};
use crate::hand::{Hand, HandAnchors, Looker};
use crate::pid::PidGains;
use crate::settings::{GrabbableSettings, HandSettings, InteractionSettings};
use glam::Vec3;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Discrete request from the input layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Pick up whatever is under the gaze
    Grab,
    /// Let go unconditionally
    ReleaseFully,
    /// Start swinging the held object
    BeginSwing,
    /// Move the hand vertically while swinging
    UpdateSwing(f32),
    /// Settle back into holding if slow enough, otherwise let go
    EndSwingOrRelease,
    /// Let go at the held object's capped observed velocity
    Throw,
    /// Let go with an explicit velocity
    ReleaseWithVelocity([f32; 3]),
}

/// What a hand sees and where it rests during one fixed step
#[derive(Clone, Copy)]
pub struct HandView<'a> {
    /// Gaze of the holder
    pub looker: &'a dyn Looker,
    /// Anchors the hand settles towards
    pub anchors: HandAnchors,
}

/// Coordinates hands with the grabbables they can reach
#[derive(Debug)]
pub struct Interaction {
    hands: IndexMap<EntityId, Hand>,
    primary: EntityId,
    grabbables: GrabbableRegistry,
    hand_settings: HandSettings,
    pid_gains: PidGains,
    grabbable_settings: GrabbableSettings,
    fixed_timestep: f32,
    pending: VecDeque<(EntityId, Intent)>,
}

impl Interaction {
    /// Create an interaction whose primary hand belongs to `holder` and
    /// starts idle at `hand_position`
    pub fn new(holder: EntityId, settings: &InteractionSettings, hand_position: Vec3) -> Self {
        let hand = Hand::new(holder, settings.hand, settings.pid).with_position(hand_position);
        let mut hands = IndexMap::new();
        hands.insert(holder, hand);

        Self {
            hands,
            primary: holder,
            grabbables: GrabbableRegistry::new(),
            hand_settings: settings.hand,
            pid_gains: settings.pid,
            grabbable_settings: settings.grabbable,
            fixed_timestep: settings.simulation.fixed_timestep,
            pending: VecDeque::new(),
        }
    }

    /// Give `holder` its own hand, sharing this interaction's grabbables
    pub fn add_hand(&mut self, holder: EntityId, hand_position: Vec3) -> Result<()> {
        if self.hands.contains_key(&holder) {
            return Err(GrabError::DuplicateHolder(holder));
        }
        let hand =
            Hand::new(holder, self.hand_settings, self.pid_gains).with_position(hand_position);
        self.hands.insert(holder, hand);
        tracing::debug!("Added hand for holder {:?}", holder);
        Ok(())
    }

    /// Make `entity` grabbable.
    ///
    /// Fails if the port has no body or collider for it, or if it is already
    /// registered.
    pub fn register<P: PhysicsPort + ?Sized>(&mut self, entity: EntityId, port: &P) -> Result<()> {
        port.position(entity)?;
        port.exclude_layers(entity)?;
        self.grabbables
            .insert(Grabbable::new(entity, self.grabbable_settings))?;
        tracing::debug!("Registered grabbable {:?}", entity);
        Ok(())
    }

    /// Remove the grabbable capability from `entity`, releasing it first if held
    pub fn unregister<P: PhysicsPort + ?Sized>(
        &mut self,
        entity: EntityId,
        port: &mut P,
    ) -> Result<Option<Grabbable>> {
        if let Some(hand) = self
            .hands
            .values_mut()
            .find(|hand| hand.grabbable() == Some(entity))
        {
            hand.release(port, &mut self.grabbables)?;
        }
        Ok(self.grabbables.remove(entity))
    }

    /// Queue an intent for the primary hand
    pub fn submit(&mut self, intent: Intent) {
        self.pending.push_back((self.primary, intent));
    }

    /// Queue an intent for the hand of `holder`
    pub fn submit_for(&mut self, holder: EntityId, intent: Intent) -> Result<()> {
        if !self.hands.contains_key(&holder) {
            return Err(GrabError::UnknownHolder(holder));
        }
        self.pending.push_back((holder, intent));
        Ok(())
    }

    /// Queue a grab
    pub fn grab(&mut self) {
        self.submit(Intent::Grab);
    }

    /// Queue an unconditional release
    pub fn release_fully(&mut self) {
        self.submit(Intent::ReleaseFully);
    }

    /// Queue the start of a swing
    pub fn begin_swing(&mut self) {
        self.submit(Intent::BeginSwing);
    }

    /// Queue a vertical swing movement
    pub fn update_swing(&mut self, vertical_delta: f32) {
        self.submit(Intent::UpdateSwing(vertical_delta));
    }

    /// Queue the soft release
    pub fn end_swing_or_release(&mut self) {
        self.submit(Intent::EndSwingOrRelease);
    }

    /// Queue a throw at the held object's own velocity
    pub fn throw(&mut self) {
        self.submit(Intent::Throw);
    }

    /// Queue a release with an explicit velocity
    pub fn release_with_velocity(&mut self, velocity: Vec3) {
        self.submit(Intent::ReleaseWithVelocity(velocity.to_array()));
    }

    /// Apply one intent to the primary hand immediately.
    ///
    /// Only call this between fixed steps; [`fixed_update`](Self::fixed_update)
    /// does so for queued intents.
    pub fn apply<P: PhysicsPort + ?Sized>(
        &mut self,
        intent: Intent,
        port: &mut P,
        looker: &dyn Looker,
    ) -> Result<()> {
        self.apply_for(self.primary, intent, port, looker)
    }

    /// Apply one intent to the hand of `holder` immediately
    pub fn apply_for<P: PhysicsPort + ?Sized>(
        &mut self,
        holder: EntityId,
        intent: Intent,
        port: &mut P,
        looker: &dyn Looker,
    ) -> Result<()> {
        let hand = self
            .hands
            .get_mut(&holder)
            .ok_or(GrabError::UnknownHolder(holder))?;
        let grabbables = &mut self.grabbables;

        tracing::trace!("Applying {:?} for {:?}", intent, holder);
        match intent {
            Intent::Grab => {
                hand.grab(looker, port, grabbables)?;
            }
            Intent::ReleaseFully => hand.release(port, grabbables)?,
            Intent::BeginSwing => hand.begin_swing(),
            Intent::UpdateSwing(vertical_delta) => {
                hand.swing_hand(Vec3::new(0.0, vertical_delta, 0.0));
            }
            Intent::EndSwingOrRelease => hand.end_swing_or_release(port, grabbables)?,
            Intent::Throw => hand.throw(port, grabbables)?,
            Intent::ReleaseWithVelocity(velocity) => {
                hand.release_with_velocity(Vec3::from_array(velocity), port, grabbables)?;
            }
        }
        Ok(())
    }

    /// Run one fixed step with every hand sharing `looker` and `anchors`.
    ///
    /// The physics world is stepped by the caller afterwards.
    pub fn fixed_update<P: PhysicsPort + ?Sized>(
        &mut self,
        port: &mut P,
        looker: &dyn Looker,
        anchors: HandAnchors,
    ) -> Result<()> {
        self.fixed_update_each(port, move |_| HandView { looker, anchors })
    }

    /// Run one fixed step: apply queued intents, sample grabbable velocities,
    /// then drive each hand in the order it was added.
    ///
    /// `view` supplies the gaze and anchors of each holder.
    pub fn fixed_update_each<'a, P, F>(&mut self, port: &mut P, mut view: F) -> Result<()>
    where
        P: PhysicsPort + ?Sized,
        F: FnMut(EntityId) -> HandView<'a>,
    {
        while let Some((holder, intent)) = self.pending.pop_front() {
            let looker = view(holder).looker;
            self.apply_for(holder, intent, port, looker)?;
        }

        self.grabbables.fixed_step(port, self.fixed_timestep)?;
        for (holder, hand) in &mut self.hands {
            let HandView { looker, anchors } = view(*holder);
            hand.fixed_step(looker, anchors, port, &mut self.grabbables, self.fixed_timestep)?;
        }
        Ok(())
    }

    /// The primary hand
    pub fn hand(&self) -> &Hand {
        &self.hands[&self.primary]
    }

    /// The hand of `holder`, if it has one
    pub fn hand_for(&self, holder: EntityId) -> Option<&Hand> {
        self.hands.get(&holder)
    }

    /// Every hand in the order it was added, the primary hand first
    pub fn hands(&self) -> impl Iterator<Item = &Hand> {
        self.hands.values()
    }

    /// Registered grabbables
    pub fn grabbables(&self) -> &GrabbableRegistry {
        &self.grabbables
    }

    /// Object held by the primary hand, if any
    pub fn held(&self) -> Option<&Grabbable> {
        self.held_by(self.primary)
    }

    /// Object held by the hand of `holder`, if any
    pub fn held_by(&self, holder: EntityId) -> Option<&Grabbable> {
        self.hands
            .get(&holder)
            .and_then(Hand::grabbable)
            .and_then(|entity| self.grabbables.get(entity))
    }

    /// Number of intents waiting for the next fixed step
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Duration of one fixed step
    pub fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep
    }
}
