// SPDX-License-Identifier: MIT OR Apache-2.0
//! The holder side of a grab.
//!
//! A [`Hand`] is Idle, Holding a grabbable, or Swinging it. Every fixed
//! step it pulls the held body towards the hand with a [`VectorPid`],
//! locks the body's rotation to the holder's gaze, and moves the hand
//! itself between its idle and swinging anchors.

use crate::body::{EntityId, PhysicsPort};
use crate::error::Result;
use crate::grabbable::GrabbableRegistry;
use crate::pid::{PidGains, VectorPid};
use crate::settings::HandSettings;
use glam::{Quat, Vec3};

/// Gaze of the holder, provided by the camera rig
pub trait Looker {
    /// World-space eye position
    fn look_origin(&self) -> Vec3;
    /// Unit view direction
    fn look_direction(&self) -> Vec3;
    /// View orientation
    fn look_rotation(&self) -> Quat;
}

/// Anchor positions the hand settles towards
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandAnchors {
    /// Resting position while idle or holding
    pub idle: Vec3,
    /// Fully extended position while swinging
    pub swinging: Vec3,
}

/// Hand state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HandState {
    /// Empty hand
    #[default]
    Idle,
    /// Carrying a grabbable in front of the holder
    Holding {
        /// Held object
        grabbable: EntityId,
        /// Object orientation relative to the gaze at grab time
        rotation_offset: Quat,
    },
    /// Swinging a grabbable along the swing axis
    Swinging {
        /// Swung object
        grabbable: EntityId,
        /// Object orientation relative to the gaze at grab time
        rotation_offset: Quat,
        /// Upper bound of the swing distance
        max_swing_distance: f32,
        /// Progress along the swing axis, in `[0, max_swing_distance]`
        current_swing_distance: f32,
    },
}

impl HandState {
    /// Held or swung object, if any
    pub fn grabbable(&self) -> Option<EntityId> {
        match *self {
            HandState::Idle => None,
            HandState::Holding { grabbable, .. } | HandState::Swinging { grabbable, .. } => {
                Some(grabbable)
            }
        }
    }

    /// Normalized swing progress; zero unless swinging
    pub fn swing_strength(&self) -> f32 {
        match *self {
            HandState::Swinging {
                max_swing_distance,
                current_swing_distance,
                ..
            } => {
                if current_swing_distance == 0.0 {
                    0.0
                } else {
                    (current_swing_distance / max_swing_distance).clamp(0.0, 1.0)
                }
            }
            HandState::Idle | HandState::Holding { .. } => 0.0,
        }
    }
}

/// A holder able to carry one grabbable at a time
#[derive(Debug, Clone)]
pub struct Hand {
    holder: EntityId,
    settings: HandSettings,
    pid: VectorPid,
    state: HandState,
    position: Vec3,
}

impl Hand {
    /// Create an idle hand for `holder`
    pub fn new(holder: EntityId, settings: HandSettings, gains: PidGains) -> Self {
        Self {
            holder,
            settings,
            pid: VectorPid::new(gains),
            state: HandState::Idle,
            position: Vec3::ZERO,
        }
    }

    /// Place the hand, e.g. at its idle anchor when spawning
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Pick up the grabbable under the holder's gaze.
    ///
    /// Does nothing unless the hand is idle, something grabbable lies within
    /// `max_grabbing_distance`, and that object is not held elsewhere.
    /// Returns whether a grab happened.
    pub fn grab<P: PhysicsPort + ?Sized>(
        &mut self,
        looker: &dyn Looker,
        port: &mut P,
        grabbables: &mut GrabbableRegistry,
    ) -> Result<bool> {
        if !self.is_idle() {
            return Ok(false);
        }

        let Some(hit) = port.raycast(
            looker.look_origin(),
            looker.look_direction(),
            self.settings.max_grabbing_distance,
        ) else {
            return Ok(false);
        };

        let Some(grabbable) = grabbables.get_mut(hit.entity) else {
            return Ok(false);
        };
        if grabbable.is_grabbed() {
            tracing::debug!("Ignoring grab of {:?}: already held", hit.entity);
            return Ok(false);
        }

        let rotation_offset = looker.look_rotation().inverse() * port.rotation(hit.entity)?;
        grabbable.grab(self.holder, self.settings.holder_layer, port)?;
        self.state = HandState::Holding {
            grabbable: hit.entity,
            rotation_offset,
        };

        tracing::info!(
            "Hand {:?} grabbed {:?} at {:.2}m",
            self.holder,
            hit.entity,
            hit.distance
        );
        Ok(true)
    }

    /// Start swinging the held object. Only valid while holding.
    pub fn begin_swing(&mut self) {
        let HandState::Holding {
            grabbable,
            rotation_offset,
        } = self.state
        else {
            return;
        };

        self.state = HandState::Swinging {
            grabbable,
            rotation_offset,
            max_swing_distance: self.settings.max_swing_distance,
            current_swing_distance: 0.0,
        };
        tracing::debug!("Hand {:?} began swinging {:?}", self.holder, grabbable);
    }

    /// Advance the swing by a hand movement. Only valid while swinging.
    ///
    /// Moving the hand down (negative `delta.y`) extends the swing.
    pub fn swing_hand(&mut self, delta: Vec3) {
        let HandState::Swinging {
            grabbable,
            rotation_offset,
            max_swing_distance,
            current_swing_distance,
        } = self.state
        else {
            return;
        };

        let distance = (current_swing_distance - delta.y)
            .max(0.0)
            .min(max_swing_distance);
        self.state = HandState::Swinging {
            grabbable,
            rotation_offset,
            max_swing_distance,
            current_swing_distance: distance,
        };
    }

    /// Return from swinging to holding. Swing progress is discarded.
    pub fn end_swing(&mut self) {
        let HandState::Swinging {
            grabbable,
            rotation_offset,
            ..
        } = self.state
        else {
            return;
        };

        self.state = HandState::Holding {
            grabbable,
            rotation_offset,
        };
        tracing::debug!("Hand {:?} stopped swinging {:?}", self.holder, grabbable);
    }

    /// Let go of the held object. Does nothing while idle.
    pub fn release<P: PhysicsPort + ?Sized>(
        &mut self,
        port: &mut P,
        grabbables: &mut GrabbableRegistry,
    ) -> Result<()> {
        let Some(entity) = self.take_grabbable() else {
            return Ok(());
        };
        grabbables.require_mut(entity)?.release(port)?;
        tracing::info!("Hand {:?} released {:?}", self.holder, entity);
        Ok(())
    }

    /// Let go of the held object and give it `velocity`. Does nothing while idle.
    pub fn release_with_velocity<P: PhysicsPort + ?Sized>(
        &mut self,
        velocity: Vec3,
        port: &mut P,
        grabbables: &mut GrabbableRegistry,
    ) -> Result<()> {
        let Some(entity) = self.take_grabbable() else {
            return Ok(());
        };
        grabbables
            .require_mut(entity)?
            .release_with_velocity(velocity, port)?;
        tracing::info!(
            "Hand {:?} released {:?} at {:.2}m/s",
            self.holder,
            entity,
            velocity.length()
        );
        Ok(())
    }

    /// Let go of the held object at its capped observed velocity
    pub fn throw<P: PhysicsPort + ?Sized>(
        &mut self,
        port: &mut P,
        grabbables: &mut GrabbableRegistry,
    ) -> Result<()> {
        let Some(entity) = self.state.grabbable() else {
            return Ok(());
        };
        let velocity = grabbables.require(entity)?.clamped_interpolated_velocity();
        self.release_with_velocity(velocity, port, grabbables)
    }

    /// Settle back into holding if the swung object is slow enough,
    /// otherwise let go. Releases while holding; does nothing while idle.
    pub fn end_swing_or_release<P: PhysicsPort + ?Sized>(
        &mut self,
        port: &mut P,
        grabbables: &mut GrabbableRegistry,
    ) -> Result<()> {
        let Some(entity) = self.state.grabbable() else {
            return Ok(());
        };

        if self.is_swinging() {
            let speed = grabbables
                .require(entity)?
                .clamped_interpolated_velocity()
                .length();
            if speed < self.settings.settle_velocity_threshold {
                self.end_swing();
                return Ok(());
            }
        }
        self.release(port, grabbables)
    }

    /// Per fixed step behaviour of the current state
    pub fn fixed_step<P: PhysicsPort + ?Sized>(
        &mut self,
        looker: &dyn Looker,
        anchors: HandAnchors,
        port: &mut P,
        grabbables: &mut GrabbableRegistry,
        dt: f32,
    ) -> Result<()> {
        match self.state {
            HandState::Idle => {
                self.move_to_idle_anchor(anchors);
            }
            HandState::Holding {
                grabbable,
                rotation_offset,
            } => {
                self.move_grabbable_towards_hand(grabbable, port, dt)?;
                port.set_rotation(grabbable, looker.look_rotation() * rotation_offset)?;
                self.move_to_idle_anchor(anchors);
            }
            HandState::Swinging {
                grabbable,
                rotation_offset,
                ..
            } => {
                let swing_strength = self.state.swing_strength();
                self.move_grabbable_towards_hand(grabbable, port, dt)?;
                port.set_rotation(grabbable, looker.look_rotation() * rotation_offset)?;
                self.position = anchors.idle.lerp(anchors.swinging, swing_strength);
                self.auto_release(grabbable, swing_strength, port, grabbables)?;
            }
        }
        Ok(())
    }

    fn move_grabbable_towards_hand<P: PhysicsPort + ?Sized>(
        &mut self,
        grabbable: EntityId,
        port: &mut P,
        dt: f32,
    ) -> Result<()> {
        let current = port.position(grabbable)?;
        self.pid.calculate(current, self.position, dt);
        port.apply_velocity_change(grabbable, self.pid.value())
    }

    fn move_to_idle_anchor(&mut self, anchors: HandAnchors) {
        self.position = self
            .position
            .lerp(anchors.idle, self.settings.idle_follow_factor);
    }

    /// Release when the object flies off before the swing has engaged
    fn auto_release<P: PhysicsPort + ?Sized>(
        &mut self,
        grabbable: EntityId,
        swing_strength: f32,
        port: &mut P,
        grabbables: &mut GrabbableRegistry,
    ) -> Result<()> {
        let threshold = self.settings.auto_release_velocity_threshold;
        let velocity = grabbables
            .require(grabbable)?
            .clamped_interpolated_velocity();

        if velocity.length_squared() > threshold * threshold && swing_strength < f32::EPSILON {
            tracing::info!(
                "Auto-releasing {:?} at {:.2}m/s",
                grabbable,
                velocity.length()
            );
            self.release(port, grabbables)?;
        }
        Ok(())
    }

    /// Move to Idle and reset the controller, returning the released object
    fn take_grabbable(&mut self) -> Option<EntityId> {
        let entity = self.state.grabbable()?;
        self.state = HandState::Idle;
        self.pid.reset();
        Some(entity)
    }

    /// Check if the hand is empty
    pub fn is_idle(&self) -> bool {
        matches!(self.state, HandState::Idle)
    }

    /// Check if the hand is holding without swinging
    pub fn is_holding(&self) -> bool {
        matches!(self.state, HandState::Holding { .. })
    }

    /// Check if the hand is swinging
    pub fn is_swinging(&self) -> bool {
        matches!(self.state, HandState::Swinging { .. })
    }

    /// Held or swung object, if any
    pub fn grabbable(&self) -> Option<EntityId> {
        self.state.grabbable()
    }

    /// Normalized swing progress; zero unless swinging
    pub fn swing_strength(&self) -> f32 {
        self.state.swing_strength()
    }

    /// Current state
    pub fn state(&self) -> &HandState {
        &self.state
    }

    /// Effective hand position the held object is pulled towards
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Holder entity this hand belongs to
    pub fn holder(&self) -> EntityId {
        self.holder
    }

    /// Settings this hand was created with
    pub fn settings(&self) -> &HandSettings {
        &self.settings
    }

    /// The velocity controller
    pub fn pid(&self) -> &VectorPid {
        &self.pid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grabbable::Grabbable;
    use crate::settings::GrabbableSettings;
    use crate::world::{BodyDesc, ColliderDesc, PhysicsWorld};
    use crate::RigidbodyPort;

    const DT: f32 = 0.02;

    /// Looker at the origin facing -Z
    struct FixedGaze(Quat);

    impl Looker for FixedGaze {
        fn look_origin(&self) -> Vec3 {
            Vec3::ZERO
        }

        fn look_direction(&self) -> Vec3 {
            self.0 * Vec3::NEG_Z
        }

        fn look_rotation(&self) -> Quat {
            self.0
        }
    }

    struct Rig {
        world: PhysicsWorld,
        grabbables: GrabbableRegistry,
        hand: Hand,
        target: EntityId,
    }

    fn rig() -> Rig {
        let mut world = PhysicsWorld::new();
        let target = EntityId::new();
        world.add_body(
            target,
            BodyDesc {
                rotation: Quat::from_rotation_y(0.5),
                ..BodyDesc::dynamic(Vec3::new(0.0, 0.0, -2.0))
            },
        );
        world.add_collider(target, ColliderDesc::sphere(0.25));

        let mut grabbables = GrabbableRegistry::new();
        grabbables
            .insert(Grabbable::new(target, GrabbableSettings::default()))
            .unwrap();

        let hand = Hand::new(EntityId::new(), HandSettings::default(), PidGains::default());
        Rig {
            world,
            grabbables,
            hand,
            target,
        }
    }

    fn swinging_rig() -> (Rig, FixedGaze) {
        let mut rig = rig();
        let gaze = FixedGaze(Quat::IDENTITY);
        assert!(rig
            .hand
            .grab(&gaze, &mut rig.world, &mut rig.grabbables)
            .unwrap());
        rig.hand.begin_swing();
        (rig, gaze)
    }

    #[test]
    fn test_grab_hit_enters_holding() {
        let mut rig = rig();
        let gaze = FixedGaze(Quat::IDENTITY);

        assert!(rig.hand.grab(&gaze, &mut rig.world, &mut rig.grabbables).unwrap());
        assert!(rig.hand.is_holding());
        assert_eq!(rig.hand.grabbable(), Some(rig.target));
        assert_eq!(
            rig.grabbables.get(rig.target).unwrap().holder(),
            Some(rig.hand.holder())
        );
    }

    #[test]
    fn test_grab_miss_stays_idle() {
        let mut rig = rig();
        // Looking straight up, away from the object
        let gaze = FixedGaze(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2));

        assert!(!rig.hand.grab(&gaze, &mut rig.world, &mut rig.grabbables).unwrap());
        assert!(rig.hand.is_idle());
    }

    #[test]
    fn test_grab_out_of_range() {
        let mut rig = rig();
        rig.world.teleport(rig.target, Vec3::new(0.0, 0.0, -10.0)).unwrap();
        let gaze = FixedGaze(Quat::IDENTITY);

        assert!(!rig.hand.grab(&gaze, &mut rig.world, &mut rig.grabbables).unwrap());
        assert!(rig.hand.is_idle());
    }

    #[test]
    fn test_grab_ignores_non_grabbable() {
        let mut rig = rig();
        rig.grabbables.remove(rig.target);
        let gaze = FixedGaze(Quat::IDENTITY);

        assert!(!rig.hand.grab(&gaze, &mut rig.world, &mut rig.grabbables).unwrap());
        assert!(rig.hand.is_idle());
    }

    #[test]
    fn test_rotation_offset_tracks_gaze() {
        let mut rig = rig();
        let gaze = FixedGaze(Quat::IDENTITY);
        rig.hand.grab(&gaze, &mut rig.world, &mut rig.grabbables).unwrap();

        let HandState::Holding { rotation_offset, .. } = *rig.hand.state() else {
            panic!("expected holding");
        };
        assert!(rotation_offset.abs_diff_eq(Quat::from_rotation_y(0.5), 1e-5));

        // Turning the gaze carries the object's rotation with it
        let turned = FixedGaze(Quat::from_rotation_y(1.0));
        rig.hand
            .fixed_step(&turned, HandAnchors::default(), &mut rig.world, &mut rig.grabbables, DT)
            .unwrap();
        let rotation = rig.world.rotation(rig.target).unwrap();
        assert!(rotation.abs_diff_eq(Quat::from_rotation_y(1.5), 1e-5));
    }

    #[test]
    fn test_swing_requires_holding() {
        let mut rig = rig();
        rig.hand.begin_swing();
        assert!(rig.hand.is_idle());

        rig.hand.swing_hand(Vec3::NEG_Y);
        rig.hand.end_swing();
        assert!(rig.hand.is_idle());
    }

    #[test]
    fn test_swing_strength_progression() {
        let (mut rig, _) = swinging_rig();
        assert_eq!(rig.hand.swing_strength(), 0.0);

        let mut strengths = vec![rig.hand.swing_strength()];
        for _ in 0..5 {
            rig.hand.swing_hand(Vec3::new(0.0, -1.0, 0.0));
            strengths.push(rig.hand.swing_strength());
        }

        let expected = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
        for (got, want) in strengths.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{strengths:?}");
        }
    }

    #[test]
    fn test_swing_distance_is_bounded() {
        let (mut rig, _) = swinging_rig();

        for delta in [-100.0, 3.0, -2.5, 1e9, -1e9, 0.0, 7.0, f32::INFINITY] {
            rig.hand.swing_hand(Vec3::new(0.0, delta, 0.0));
            let HandState::Swinging {
                current_swing_distance,
                max_swing_distance,
                ..
            } = *rig.hand.state()
            else {
                panic!("expected swinging");
            };
            assert!((0.0..=max_swing_distance).contains(&current_swing_distance));
        }
    }

    #[test]
    fn test_end_swing_keeps_offset() {
        let (mut rig, _) = swinging_rig();
        let HandState::Swinging {
            rotation_offset, ..
        } = *rig.hand.state()
        else {
            panic!("expected swinging");
        };
        rig.hand.swing_hand(Vec3::NEG_Y);
        rig.hand.end_swing();

        assert_eq!(
            *rig.hand.state(),
            HandState::Holding {
                grabbable: rig.target,
                rotation_offset,
            }
        );
    }

    #[test]
    fn test_release_resets_controller() {
        let (mut rig, gaze) = swinging_rig();
        rig.hand
            .fixed_step(&gaze, HandAnchors::default(), &mut rig.world, &mut rig.grabbables, DT)
            .unwrap();
        assert_ne!(rig.hand.pid().integral(), Vec3::ZERO);

        rig.hand.release(&mut rig.world, &mut rig.grabbables).unwrap();
        assert!(rig.hand.is_idle());
        assert_eq!(rig.hand.pid().integral(), Vec3::ZERO);
        assert_eq!(rig.hand.pid().previous_error(), Vec3::ZERO);
        assert!(!rig.grabbables.get(rig.target).unwrap().is_grabbed());
    }

    #[test]
    fn test_idle_hand_follows_anchor() {
        let mut rig = rig();
        let gaze = FixedGaze(Quat::IDENTITY);
        let anchors = HandAnchors {
            idle: Vec3::new(1.0, 0.0, 0.0),
            swinging: Vec3::ZERO,
        };

        rig.hand
            .fixed_step(&gaze, anchors, &mut rig.world, &mut rig.grabbables, DT)
            .unwrap();
        assert!((rig.hand.position().x - 0.5).abs() < 1e-6);
        rig.hand
            .fixed_step(&gaze, anchors, &mut rig.world, &mut rig.grabbables, DT)
            .unwrap();
        assert!((rig.hand.position().x - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_swinging_hand_sits_between_anchors() {
        let (mut rig, gaze) = swinging_rig();
        let anchors = HandAnchors {
            idle: Vec3::ZERO,
            swinging: Vec3::new(0.0, 0.0, -4.0),
        };
        rig.hand.swing_hand(Vec3::new(0.0, -2.5, 0.0));

        rig.hand
            .fixed_step(&gaze, anchors, &mut rig.world, &mut rig.grabbables, DT)
            .unwrap();
        assert!(rig.hand.position().abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-5));
    }

    #[test]
    fn test_auto_release_when_not_engaged() {
        let (mut rig, gaze) = swinging_rig();

        // Yank the object 1m in one step: 50 m/s observed, 15 m/s after the cap
        rig.world.teleport(rig.target, Vec3::new(1.0, 0.0, -2.0)).unwrap();
        rig.grabbables.fixed_step(&rig.world, DT).unwrap();
        rig.hand
            .fixed_step(&gaze, HandAnchors::default(), &mut rig.world, &mut rig.grabbables, DT)
            .unwrap();

        assert!(rig.hand.is_idle());
        assert!(!rig.grabbables.get(rig.target).unwrap().is_grabbed());
        assert!(rig.world.use_gravity(rig.target).unwrap());
    }

    #[test]
    fn test_no_auto_release_once_swing_engaged() {
        let (mut rig, gaze) = swinging_rig();
        rig.hand.swing_hand(Vec3::new(0.0, -0.5, 0.0));

        rig.world.teleport(rig.target, Vec3::new(1.0, 0.0, -2.0)).unwrap();
        rig.grabbables.fixed_step(&rig.world, DT).unwrap();
        rig.hand
            .fixed_step(&gaze, HandAnchors::default(), &mut rig.world, &mut rig.grabbables, DT)
            .unwrap();

        assert!(rig.hand.is_swinging());
    }

    #[test]
    fn test_no_auto_release_while_holding() {
        let (mut rig, gaze) = swinging_rig();
        rig.hand.end_swing();

        rig.world.teleport(rig.target, Vec3::new(1.0, 0.0, -2.0)).unwrap();
        rig.grabbables.fixed_step(&rig.world, DT).unwrap();
        rig.hand
            .fixed_step(&gaze, HandAnchors::default(), &mut rig.world, &mut rig.grabbables, DT)
            .unwrap();

        assert!(rig.hand.is_holding());
    }

    #[test]
    fn test_throw_uses_capped_velocity() {
        let (mut rig, _) = swinging_rig();
        rig.world.teleport(rig.target, Vec3::new(0.0, 2.0, -2.0)).unwrap();
        rig.grabbables.fixed_step(&rig.world, DT).unwrap();

        rig.hand.throw(&mut rig.world, &mut rig.grabbables).unwrap();
        assert!(rig.hand.is_idle());
        let velocity = rig.world.linear_velocity(rig.target).unwrap();
        assert!(velocity.abs_diff_eq(Vec3::new(0.0, 15.0, 0.0), 1e-3));
    }
}
