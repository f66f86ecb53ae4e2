//! Position, size and velocity of an entity
//!
//! Two movement models share one component:
//! - `Motion::Kinematic`: the body integrates its own velocity every update.
//! - `Motion::Simulated`: rapier owns the state; the plain fields are a
//!   mirror refreshed by [`BodyComponent::pull_from_physics`] after each step.
//!
//! Gameplay and rendering read the plain fields either way.

use glam::Vec2;
use rapier2d::prelude::RigidBodyHandle;

use crate::entity::EntityId;
use crate::error::{PhysicsError, PhysicsResult};
use crate::physics::{BodyState, PhysicsWorld};
use crate::sim::Rect;

/// Movement model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Kinematic,
    Simulated { handle: RigidBodyHandle },
}

#[derive(Debug, Clone)]
pub struct BodyComponent {
    /// Top-left corner
    position: Vec2,
    size: Vec2,
    velocity: Vec2,
    /// Radians
    rotation: f32,
    motion: Motion,
    /// World epoch of the last pull (simulated bodies only)
    pulled_epoch: u64,
}

impl BodyComponent {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            motion: Motion::Kinematic,
            pulled_epoch: 0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.position, self.size)
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self.motion, Motion::Simulated { .. })
    }

    pub fn handle(&self) -> Option<RigidBodyHandle> {
        match self.motion {
            Motion::Simulated { handle } => Some(handle),
            Motion::Kinematic => None,
        }
    }

    /// Kinematic integration. Simulated bodies are left to the world.
    pub fn update(&mut self, dt: f32) {
        if let Motion::Kinematic = self.motion {
            self.position += self.velocity * dt;
        }
    }

    pub(crate) fn mark_simulated(&mut self, handle: RigidBodyHandle, epoch: u64) {
        self.motion = Motion::Simulated { handle };
        self.pulled_epoch = epoch;
    }

    pub(crate) fn mark_kinematic(&mut self) {
        self.motion = Motion::Kinematic;
    }

    /// Copy the simulator's state into the plain fields (physics -> body)
    pub fn pull_from_physics(&mut self, world: &PhysicsWorld) {
        let Some(handle) = self.handle() else {
            return;
        };
        let state = world.body_state(handle);
        self.position = state.translation - self.size * 0.5;
        self.velocity = state.velocity;
        self.rotation = state.rotation;
        self.pulled_epoch = world.epoch();
    }

    /// Overwrite the simulator's state with the plain fields (body -> physics).
    ///
    /// Never called automatically. Rejected if the world has stepped since the
    /// last pull, since the plain fields would then be stale.
    pub fn push_to_physics(&self, world: &mut PhysicsWorld, owner: EntityId) -> PhysicsResult<()> {
        let handle = self.handle().ok_or(PhysicsError::NotAttached(owner))?;
        if self.pulled_epoch != world.epoch() {
            return Err(PhysicsError::PendingPull(owner));
        }
        let state = BodyState {
            translation: self.center(),
            velocity: self.velocity,
            rotation: self.rotation,
        };
        if world.set_body_state(handle, state) {
            Ok(())
        } else {
            Err(PhysicsError::NotAttached(owner))
        }
    }

    /// Apply an impulse to the simulated body
    pub fn apply_impulse(
        &self,
        world: &mut PhysicsWorld,
        owner: EntityId,
        impulse: Vec2,
    ) -> PhysicsResult<()> {
        let handle = self.handle().ok_or(PhysicsError::NotAttached(owner))?;
        if world.apply_impulse(handle, impulse) {
            Ok(())
        } else {
            Err(PhysicsError::NotAttached(owner))
        }
    }
}
