//! rapier2d integration
//!
//! The [`PhysicsWorld`] owns the rapier simulation. Entities opt in by
//! attaching their [`BodyComponent`]; the entity id is stored in the rigid
//! body's `user_data` so contacts can be traced back to gameplay objects.
//!
//! Each frame:
//! 1. Gameplay may push state explicitly (launch velocity, bounce fix-ups).
//! 2. [`PhysicsWorld::step`] advances the simulation and queues contacts.
//! 3. Simulated bodies pull their new state.
//! 4. Rules read [`PhysicsWorld::contacts`]; the physics layer itself never
//!    touches gameplay state.

use glam::Vec2;
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::{BodyComponent, EntityId};
use crate::error::{PhysicsError, PhysicsResult};

/// How rapier treats a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    /// Fully simulated (acorns)
    Dynamic,
    /// Moved by its velocity only, pushes dynamic bodies (leaf)
    Kinematic,
    /// Immovable
    Static,
}

/// Material and integration properties of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub gravity_scale: f32,
    pub linear_damping: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.3,
            restitution: 0.0,
            gravity_scale: 1.0,
            linear_damping: 0.0,
        }
    }
}

/// Everything needed to create a rigid body for an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyDef {
    pub body_type: BodyType,
    pub material: PhysicsMaterial,
    /// Collider size relative to the body size (1.0 = same box)
    pub collider_scale: f32,
}

impl BodyDef {
    pub fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            material: PhysicsMaterial::default(),
            collider_scale: 1.0,
        }
    }

    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn with_collider_scale(mut self, scale: f32) -> Self {
        self.collider_scale = scale;
        self
    }
}

/// Snapshot of a rigid body. `translation` is the body center.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyState {
    pub translation: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
}

/// Two entities began touching during the last step. Unordered: `a <= b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: EntityId,
    pub b: EntityId,
}

impl Contact {
    pub fn new(first: EntityId, second: EntityId) -> Self {
        Self {
            a: first.min(second),
            b: first.max(second),
        }
    }

    pub fn involves(&self, id: EntityId) -> bool {
        self.a == id || self.b == id
    }

    /// The entity on the other side of the contact from `id`
    pub fn other(&self, id: EntityId) -> Option<EntityId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}

pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    substeps: u32,
    /// Incremented on every step
    epoch: u64,
    /// Contacts that began during the last step
    contacts: Vec<Contact>,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![gravity.x, gravity.y],
            integration_params: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            substeps: 1,
            epoch: 0,
            contacts: Vec::new(),
        }
    }

    pub fn with_substeps(mut self, substeps: u32) -> Self {
        self.substeps = substeps.max(1);
        self
    }

    pub fn gravity(&self) -> Vec2 {
        Vec2::new(self.gravity.x, self.gravity.y)
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = vector![gravity.x, gravity.y];
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Create a rigid body + box collider for `body` and switch it to the
    /// simulated model.
    ///
    /// A body that is already simulated is left alone.
    pub fn attach(
        &mut self,
        owner: EntityId,
        body: &mut BodyComponent,
        def: &BodyDef,
    ) -> PhysicsResult<RigidBodyHandle> {
        if body.is_simulated() {
            return Err(PhysicsError::AlreadyAttached(owner));
        }

        let center = body.center();
        let velocity = body.velocity();
        let builder = match def.body_type {
            BodyType::Dynamic => RigidBodyBuilder::dynamic(),
            BodyType::Kinematic => RigidBodyBuilder::kinematic_velocity_based(),
            BodyType::Static => RigidBodyBuilder::fixed(),
        };
        let rb = builder
            .translation(vector![center.x, center.y])
            .linvel(vector![velocity.x, velocity.y])
            .rotation(body.rotation())
            .gravity_scale(def.material.gravity_scale)
            .linear_damping(def.material.linear_damping)
            .user_data(owner.to_user_data())
            .build();
        let handle = self.bodies.insert(rb);

        let half = body.size() * 0.5 * def.collider_scale;
        let collider = ColliderBuilder::cuboid(half.x.max(0.01), half.y.max(0.01))
            .density(def.material.density)
            .friction(def.material.friction)
            .restitution(def.material.restitution)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        body.mark_simulated(handle, self.epoch);
        log::debug!("Attached {:?} body to entity {}", def.body_type, owner);
        Ok(handle)
    }

    /// Remove a rigid body and its colliders. Unknown handles are ignored.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Remove the rigid body behind `body` and return it to kinematic motion
    pub fn detach(&mut self, body: &mut BodyComponent) {
        if let Some(handle) = body.handle() {
            self.remove_body(handle);
            body.mark_kinematic();
        }
    }

    /// Current state of a body; all zeros for a stale handle
    pub fn body_state(&self, handle: RigidBodyHandle) -> BodyState {
        match self.bodies.get(handle) {
            Some(rb) => {
                let t = rb.translation();
                let v = rb.linvel();
                BodyState {
                    translation: Vec2::new(t.x, t.y),
                    velocity: Vec2::new(v.x, v.y),
                    rotation: rb.rotation().angle(),
                }
            }
            None => BodyState::default(),
        }
    }

    /// Overwrite a body's transform and velocity. Returns false for a stale handle.
    pub fn set_body_state(&mut self, handle: RigidBodyHandle, state: BodyState) -> bool {
        match self.bodies.get_mut(handle) {
            Some(rb) => {
                rb.set_translation(vector![state.translation.x, state.translation.y], true);
                rb.set_rotation(Rotation::new(state.rotation), true);
                rb.set_linvel(vector![state.velocity.x, state.velocity.y], true);
                true
            }
            None => false,
        }
    }

    /// Returns false for a stale handle
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec2) -> bool {
        match self.bodies.get_mut(handle) {
            Some(rb) => {
                rb.apply_impulse(vector![impulse.x, impulse.y], true);
                true
            }
            None => false,
        }
    }

    /// Advance the simulation by `dt`, split into the configured substeps.
    ///
    /// Returns the contacts that began during this step; they stay readable
    /// through [`contacts`](Self::contacts) until the next step.
    pub fn step(&mut self, dt: f32) -> &[Contact] {
        self.contacts.clear();
        self.integration_params.dt = dt / self.substeps as f32;

        let (collision_send, collision_recv) =
            rapier2d::crossbeam::channel::unbounded::<CollisionEvent>();
        let (force_send, _force_recv) =
            rapier2d::crossbeam::channel::unbounded::<ContactForceEvent>();
        let event_handler = ChannelEventCollector::new(collision_send, force_send);

        for _ in 0..self.substeps {
            self.pipeline.step(
                &self.gravity,
                &self.integration_params,
                &mut self.island_manager,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                None,
                &(),
                &event_handler,
            );
        }

        while let Ok(event) = collision_recv.try_recv() {
            if let CollisionEvent::Started(h1, h2, _flags) = event {
                if let (Some(a), Some(b)) = (self.collider_owner(h1), self.collider_owner(h2)) {
                    self.record_contact(a, b);
                }
            }
        }

        // Channel delivery order is not stable; sort for deterministic rules
        self.contacts.sort_by_key(|c| (c.a, c.b));

        self.epoch += 1;
        &self.contacts
    }

    /// Contacts from the most recent step
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Queue a contact once per pair, whichever way round it was reported
    fn record_contact(&mut self, a: EntityId, b: EntityId) {
        let contact = Contact::new(a, b);
        if !self.contacts.contains(&contact) {
            self.contacts.push(contact);
        }
    }

    /// Refresh every simulated body in `objects` from the simulation
    pub fn sync_objects<'a>(&self, objects: impl IntoIterator<Item = &'a mut crate::GameObject>) {
        for obj in objects {
            if let Some(body) = obj.body_mut() {
                body.pull_from_physics(self);
            }
        }
    }

    /// collider -> parent rigid body -> user_data -> entity
    fn collider_owner(&self, handle: ColliderHandle) -> Option<EntityId> {
        let parent = self.colliders.get(handle)?.parent()?;
        let rb = self.bodies.get(parent)?;
        EntityId::from_user_data(rb.user_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn falling_body() -> BodyComponent {
        BodyComponent::new(Vec2::new(100.0, 0.0), Vec2::splat(20.0))
    }

    #[test]
    fn test_attach_twice_is_noop() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 100.0));
        let mut body = falling_body();
        let def = BodyDef::new(BodyType::Dynamic);

        let first = world.attach(EntityId(1), &mut body, &def).unwrap();
        let second = world.attach(EntityId(1), &mut body, &def);
        assert_eq!(second, Err(PhysicsError::AlreadyAttached(EntityId(1))));
        assert_eq!(body.handle(), Some(first));
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_pull_matches_simulator_state() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 400.0)).with_substeps(4);
        let mut body = falling_body().with_velocity(Vec2::new(50.0, 0.0));
        world.attach(EntityId(1), &mut body, &BodyDef::new(BodyType::Dynamic)).unwrap();

        let before = body.position();
        world.step(1.0 / 60.0);
        body.pull_from_physics(&world);

        let handle = body.handle().unwrap();
        let state = world.body_state(handle);
        assert_eq!(body.velocity(), state.velocity);
        assert_eq!(body.rotation(), state.rotation);
        assert_eq!(body.position(), state.translation - body.size() * 0.5);
        // Gravity pulled it down and the initial velocity moved it right
        assert!(body.position().y > before.y);
        assert!(body.position().x > before.x);
    }

    #[test]
    fn test_stale_handle_is_neutral() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let mut body = falling_body().with_velocity(Vec2::new(10.0, 10.0));
        let handle = world
            .attach(EntityId(1), &mut body, &BodyDef::new(BodyType::Dynamic))
            .unwrap();

        world.detach(&mut body);
        assert!(!body.is_simulated());
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.body_state(handle), BodyState::default());
        assert!(!world.apply_impulse(handle, Vec2::X));
        assert!(!world.set_body_state(handle, BodyState::default()));

        // Detaching again is harmless
        world.detach(&mut body);
    }

    #[test]
    fn test_push_requires_pull_after_step() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let mut body = falling_body();
        world.attach(EntityId(5), &mut body, &BodyDef::new(BodyType::Dynamic)).unwrap();

        // Fresh attach: pushing a launch velocity is fine
        body.set_velocity(Vec2::new(0.0, 300.0));
        assert_eq!(body.push_to_physics(&mut world, EntityId(5)), Ok(()));

        world.step(1.0 / 60.0);
        assert_eq!(
            body.push_to_physics(&mut world, EntityId(5)),
            Err(PhysicsError::PendingPull(EntityId(5)))
        );

        body.pull_from_physics(&world);
        assert!((body.velocity().y - 300.0).abs() < 1e-3);
        assert_eq!(body.push_to_physics(&mut world, EntityId(5)), Ok(()));
    }

    #[test]
    fn test_contact_resolves_to_entities() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);

        let mut mover = BodyComponent::new(Vec2::new(0.0, 0.0), Vec2::splat(20.0))
            .with_velocity(Vec2::new(600.0, 0.0));
        let mut wall = BodyComponent::new(Vec2::new(40.0, -20.0), Vec2::new(20.0, 60.0));
        world.attach(EntityId(10), &mut mover, &BodyDef::new(BodyType::Dynamic)).unwrap();
        world.attach(EntityId(20), &mut wall, &BodyDef::new(BodyType::Static)).unwrap();

        let mut seen = Vec::new();
        for _ in 0..30 {
            seen.extend_from_slice(world.step(1.0 / 60.0));
        }

        assert!(!seen.is_empty());
        let contact = seen[0];
        assert!(contact.involves(EntityId(10)));
        assert_eq!(contact.other(EntityId(10)), Some(EntityId(20)));
        assert_eq!(contact.other(EntityId(99)), None);
    }

    #[test]
    fn test_reversed_contact_is_deduplicated() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.record_contact(EntityId(20), EntityId(10));
        world.record_contact(EntityId(10), EntityId(20));
        world.record_contact(EntityId(10), EntityId(30));

        assert_eq!(
            world.contacts(),
            &[
                Contact::new(EntityId(10), EntityId(20)),
                Contact::new(EntityId(10), EntityId(30)),
            ]
        );
        assert_eq!(world.contacts()[0].a, EntityId(10));
    }

    #[test]
    fn test_gravity_accessors() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 9.8));
        assert_eq!(world.gravity(), Vec2::new(0.0, 9.8));
        world.set_gravity(Vec2::ZERO);
        assert_eq!(world.gravity(), Vec2::ZERO);
    }
}
