//! Entity/component composition
//!
//! A [`GameObject`] is an ordered bag of [`Component`]s. Components are a
//! closed set of variants tagged by [`ComponentKind`]; typed lookup goes
//! through [`ComponentType`] and always returns the first match in insertion
//! order.
//!
//! Insertion order is also update order: put the body first so behaviors see
//! this frame's position, and sprites last.

pub mod behavior;
pub mod body;
pub mod controller;
pub mod prop;
pub mod sprite;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use behavior::{Behavior, BounceBehavior, ProjectileBehavior, SweepBehavior};
pub use body::{BodyComponent, Motion};
pub use controller::{ControlScheme, ControllerComponent, Facing};
pub use prop::{Prop, PuzzleColor};
pub use sprite::{SpriteComponent, SpriteFrame};

use crate::physics::PhysicsWorld;
use crate::platform::InputDevice;
use crate::renderer::Renderer;
use crate::sim::Rect;
use crate::view::View;

/// Stable entity identifier, allocated by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Encode for rapier's `user_data`
    pub fn to_user_data(self) -> u128 {
        // Offset by one so a zeroed user_data never resolves to an entity
        self.0 as u128 + 1
    }

    pub fn from_user_data(data: u128) -> Option<Self> {
        if data == 0 || data > u32::MAX as u128 + 1 {
            return None;
        }
        Some(Self((data - 1) as u32))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capability tag for lookup-by-type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Body,
    Behavior,
    Controller,
    Sprite,
    Prop,
}

/// A capability attached to exactly one entity
#[derive(Debug, Clone)]
pub enum Component {
    Body(BodyComponent),
    Behavior(Behavior),
    Controller(ControllerComponent),
    Sprite(SpriteComponent),
    Prop(Prop),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Body(_) => ComponentKind::Body,
            Component::Behavior(_) => ComponentKind::Behavior,
            Component::Controller(_) => ComponentKind::Controller,
            Component::Sprite(_) => ComponentKind::Sprite,
            Component::Prop(_) => ComponentKind::Prop,
        }
    }

    fn update(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateContext<'_>) {
        match self {
            Component::Body(body) => body.update(ctx.dt),
            Component::Behavior(behavior) => behavior.update(siblings, ctx),
            Component::Controller(controller) => controller.update(siblings, ctx),
            Component::Sprite(_) | Component::Prop(_) => {}
        }
    }
}

/// Typed access to one component variant
pub trait ComponentType: Sized {
    const KIND: ComponentKind;

    fn from_component(component: &Component) -> Option<&Self>;
    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;
}

macro_rules! component_type {
    ($ty:ty, $variant:ident) => {
        impl ComponentType for $ty {
            const KIND: ComponentKind = ComponentKind::$variant;

            fn from_component(component: &Component) -> Option<&Self> {
                match component {
                    Component::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                match component {
                    Component::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Component {
            fn from(inner: $ty) -> Self {
                Component::$variant(inner)
            }
        }
    };
}

component_type!(BodyComponent, Body);
component_type!(Behavior, Behavior);
component_type!(ControllerComponent, Controller);
component_type!(SpriteComponent, Sprite);
component_type!(Prop, Prop);

/// Per-frame services available to components during update
pub struct UpdateContext<'a> {
    pub dt: f32,
    pub input: &'a dyn InputDevice,
    pub physics: Option<&'a mut PhysicsWorld>,
}

/// The other components of the entity currently being updated
pub struct Siblings<'a> {
    owner: EntityId,
    before: &'a mut [Component],
    after: &'a mut [Component],
}

impl Siblings<'_> {
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        self.before
            .iter()
            .chain(self.after.iter())
            .find_map(T::from_component)
    }

    pub fn get_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find_map(T::from_component_mut)
    }
}

/// A composed game entity
#[derive(Debug, Clone)]
pub struct GameObject {
    id: EntityId,
    name: String,
    components: Vec<Component>,
    active: bool,
}

impl GameObject {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            components: Vec::new(),
            active: true,
        }
    }

    /// Builder form of [`add_component`](Self::add_component)
    pub fn with(mut self, component: impl Into<Component>) -> Self {
        self.add_component(component);
        self
    }

    pub fn add_component(&mut self, component: impl Into<Component>) {
        self.components.push(component.into());
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// First component of type `T`
    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        self.components.iter().find_map(T::from_component)
    }

    pub fn get_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.components.iter_mut().find_map(T::from_component_mut)
    }

    /// Untyped lookup by capability tag
    pub fn get_kind(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.iter().find(|c| c.kind() == kind)
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        self.get_kind(kind).is_some()
    }

    pub fn body(&self) -> Option<&BodyComponent> {
        self.get::<BodyComponent>()
    }

    pub fn body_mut(&mut self) -> Option<&mut BodyComponent> {
        self.get_mut::<BodyComponent>()
    }

    pub fn prop(&self) -> Option<&Prop> {
        self.get::<Prop>()
    }

    pub fn prop_mut(&mut self) -> Option<&mut Prop> {
        self.get_mut::<Prop>()
    }

    /// AABB of the body, if there is one
    pub fn rect(&self) -> Option<Rect> {
        self.body().map(BodyComponent::rect)
    }

    /// Update every component in insertion order
    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if !self.active {
            return;
        }
        let owner = self.id;
        for i in 0..self.components.len() {
            let (before, rest) = self.components.split_at_mut(i);
            if let Some((current, after)) = rest.split_first_mut() {
                let mut siblings = Siblings {
                    owner,
                    before,
                    after,
                };
                current.update(&mut siblings, ctx);
            }
        }
    }

    /// Render every drawable component in insertion order
    pub fn render(&self, renderer: &mut dyn Renderer, view: &View) {
        if !self.active {
            return;
        }
        for component in &self.components {
            if let Component::Sprite(sprite) = component {
                sprite.render(self, renderer, view);
            }
        }
    }
}
