//! Data-driven entity construction
//!
//! The factory maps a type name to a recipe that assembles a [`GameObject`]
//! from [`SpawnParams`]. It is owned by the session and populated once at
//! startup with [`ObjectFactory::register_builtin_types`].
//!
//! Object descriptions (JSON) are an optional source of default params:
//! [`ObjectFactory::params_for`] turns a loaded description into
//! `SpawnParams` that callers may adjust before calling `create`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::entity::{
    Behavior, BodyComponent, BounceBehavior, ControlScheme, ControllerComponent, EntityId,
    GameObject, ProjectileBehavior, Prop, PuzzleColor, SpriteComponent, SweepBehavior,
};
use crate::error::{FactoryError, FactoryResult, PhysicsError};
use crate::physics::{BodyDef, BodyType, PhysicsMaterial, PhysicsWorld};
use crate::renderer::colors;
use crate::sim::{Rect, VisionCone};

/// Inputs to a recipe. Zero size / speed means "use the type's default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnParams {
    /// Top-left corner
    pub position: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub velocity: Vec2,
    pub texture: Option<String>,
    /// Movement/bounce area, where the type uses one
    pub bounds: Option<Rect>,
    pub color: Option<PuzzleColor>,
    pub final_door: bool,
}

impl SpawnParams {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, w: f32, h: f32) -> Self {
        self.size = Vec2::new(w, h);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = Some(texture.into());
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_color(mut self, color: PuzzleColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn final_door(mut self) -> Self {
        self.final_door = true;
        self
    }

    fn size_or(&self, default: Vec2) -> Vec2 {
        if self.size == Vec2::ZERO { default } else { self.size }
    }

    fn speed_or(&self, default: f32) -> f32 {
        if self.speed > 0.0 { self.speed } else { default }
    }

    fn texture_or(&self, default: &str) -> String {
        self.texture.clone().unwrap_or_else(|| default.to_string())
    }
}

/// Services a recipe may use while building an entity
pub struct SpawnContext<'a> {
    next_id: &'a mut u32,
    pub physics: Option<&'a mut PhysicsWorld>,
}

impl<'a> SpawnContext<'a> {
    pub fn new(next_id: &'a mut u32, physics: Option<&'a mut PhysicsWorld>) -> Self {
        Self { next_id, physics }
    }

    pub fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(*self.next_id);
        *self.next_id += 1;
        id
    }
}

pub type Recipe = Box<dyn Fn(EntityId, &SpawnParams, &mut SpawnContext<'_>) -> GameObject>;

/// One component entry of an object description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescription {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub speed: Option<f32>,
    pub texture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescription {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub components: Vec<ComponentDescription>,
}

impl ObjectDescription {
    /// Fold the component entries into spawn params (first value wins)
    pub fn to_params(&self) -> SpawnParams {
        let first = |f: fn(&ComponentDescription) -> Option<f32>| self.components.iter().find_map(f);
        let mut params = SpawnParams::at(
            first(|c| c.x).unwrap_or(0.0),
            first(|c| c.y).unwrap_or(0.0),
        );
        if let (Some(w), Some(h)) = (first(|c| c.width), first(|c| c.height)) {
            params.size = Vec2::new(w, h);
        }
        params.speed = first(|c| c.speed).unwrap_or(0.0);
        params.texture = self.components.iter().find_map(|c| c.texture.clone());
        params
    }
}

#[derive(Default)]
pub struct ObjectFactory {
    recipes: HashMap<String, Recipe>,
    descriptions: HashMap<String, ObjectDescription>,
}

impl ObjectFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with every built-in type registered
    pub fn with_builtin_types() -> Self {
        let mut factory = Self::new();
        factory.register_builtin_types();
        factory
    }

    /// Register a recipe. An existing recipe with the same name is replaced.
    pub fn register<F>(&mut self, name: impl Into<String>, recipe: F)
    where
        F: Fn(EntityId, &SpawnParams, &mut SpawnContext<'_>) -> GameObject + 'static,
    {
        self.recipes.insert(name.into(), Box::new(recipe));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    /// Build an entity of type `name`. Unknown names allocate no id.
    pub fn create(
        &self,
        name: &str,
        params: &SpawnParams,
        ctx: &mut SpawnContext<'_>,
    ) -> FactoryResult<GameObject> {
        let Some(recipe) = self.recipes.get(name) else {
            log::warn!("Unknown object type: {name}");
            return Err(FactoryError::UnknownType(name.to_string()));
        };
        let id = ctx.alloc_id();
        let obj = recipe(id, params, ctx);
        log::debug!("Created {name} {id} at {:?}", params.position);
        Ok(obj)
    }

    /// Build from the loaded description's params
    pub fn create_described(
        &self,
        name: &str,
        ctx: &mut SpawnContext<'_>,
    ) -> FactoryResult<GameObject> {
        let params = self.params_for(name).unwrap_or_default();
        self.create(name, &params, ctx)
    }

    /// Parse and store object descriptions.
    ///
    /// Every described type must already be registered; otherwise nothing
    /// is stored. Returns how many descriptions were loaded.
    pub fn load_descriptions(&mut self, json: &str) -> FactoryResult<usize> {
        let parsed: Vec<ObjectDescription> = serde_json::from_str(json)
            .map_err(|e| FactoryError::InvalidDescription(e.to_string()))?;

        if let Some(unknown) = parsed.iter().find(|d| !self.contains(&d.type_name)) {
            log::warn!("Description for unregistered type: {}", unknown.type_name);
            return Err(FactoryError::UnknownType(unknown.type_name.clone()));
        }

        let count = parsed.len();
        for desc in parsed {
            log::info!("Loaded object definition: {}", desc.type_name);
            for c in &desc.components {
                log::debug!(
                    "  - Component: {} x={:?} y={:?} width={:?} height={:?} speed={:?} texture={:?}",
                    c.kind,
                    c.x,
                    c.y,
                    c.width,
                    c.height,
                    c.speed,
                    c.texture
                );
            }
            self.descriptions.insert(desc.type_name.clone(), desc);
        }
        Ok(count)
    }

    pub fn load_description_file(&mut self, path: impl AsRef<Path>) -> FactoryResult<usize> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            FactoryError::InvalidDescription(format!("{}: {e}", path.display()))
        })?;
        self.load_descriptions(&json)
    }

    pub fn description(&self, name: &str) -> Option<&ObjectDescription> {
        self.descriptions.get(name)
    }

    /// Default params from a loaded description
    pub fn params_for(&self, name: &str) -> Option<SpawnParams> {
        self.descriptions.get(name).map(ObjectDescription::to_params)
    }

    pub fn register_builtin_types(&mut self) {
        self.register("Squirrel", squirrel);
        self.register("Acorn", acorn);
        self.register("PhysicsAcorn", physics_acorn);
        self.register("Leaf", leaf);
        self.register("PhysicsLeaf", physics_leaf);
        self.register("Player", player);
        self.register("Wall", wall);
        self.register("SecurityCamera", security_camera);
        self.register("Key", key);
        self.register("Door", door);
        self.register("ColorBlock", color_block);
        self.register("ColorBox", color_box);
    }
}

/// Bounce area for leaves: lower half of the screen plus a little slack
pub fn leaf_bounds() -> Rect {
    Rect::new(
        -LEAF_BOUNCE_SLACK,
        SCREEN_HEIGHT / 2.0 - LEAF_BOUNCE_SLACK,
        SCREEN_WIDTH + 2.0 * LEAF_BOUNCE_SLACK,
        SCREEN_HEIGHT / 2.0 + 2.0 * LEAF_BOUNCE_SLACK,
    )
}

/// Walkable interior of the stealth room
pub fn room_interior() -> Rect {
    Rect::new(
        WALL_THICKNESS,
        WALL_THICKNESS,
        SCREEN_WIDTH - 2.0 * WALL_THICKNESS,
        SCREEN_HEIGHT - 2.0 * WALL_THICKNESS,
    )
}

fn screen() -> Rect {
    Rect::new(0.0, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT)
}

fn body(params: &SpawnParams, default_size: Vec2) -> BodyComponent {
    BodyComponent::new(params.position, params.size_or(default_size)).with_velocity(params.velocity)
}

/// Hand the body to the physics world, or stay kinematic if there is none
fn simulate(mut obj: GameObject, def: &BodyDef, ctx: &mut SpawnContext<'_>) -> GameObject {
    let id = obj.id();
    let Some(world) = ctx.physics.as_deref_mut() else {
        log::warn!("{}; staying kinematic", PhysicsError::NoWorld(id));
        return obj;
    };
    if let Some(body) = obj.body_mut() {
        if let Err(e) = world.attach(id, body, def) {
            log::debug!("{e}");
        }
    }
    obj
}

fn squirrel(id: EntityId, params: &SpawnParams, _ctx: &mut SpawnContext<'_>) -> GameObject {
    GameObject::new(id, "Squirrel")
        .with(body(params, Vec2::splat(SQUIRREL_SIZE)))
        .with(ControllerComponent::new(
            params.speed_or(SQUIRREL_SPEED),
            ControlScheme::Horizontal,
            params.bounds.unwrap_or_else(screen),
        ))
        .with(SpriteComponent::textured(params.texture_or("squirrel")).with_fill(colors::SQUIRREL))
}

fn acorn(id: EntityId, params: &SpawnParams, _ctx: &mut SpawnContext<'_>) -> GameObject {
    let mut body = body(params, Vec2::splat(ACORN_SIZE));
    if params.velocity == Vec2::ZERO {
        body.set_velocity(Vec2::new(0.0, params.speed_or(ACORN_SPEED)));
    }
    let limit = params.bounds.map(|b| b.bottom()).unwrap_or(SCREEN_HEIGHT);
    GameObject::new(id, "Acorn")
        .with(body)
        .with(Behavior::Projectile(ProjectileBehavior::new(limit)))
        .with(SpriteComponent::textured(params.texture_or("acorn")).with_fill(colors::ACORN))
}

fn physics_acorn(id: EntityId, params: &SpawnParams, ctx: &mut SpawnContext<'_>) -> GameObject {
    let mut obj = acorn(id, params, ctx);
    obj.set_name("PhysicsAcorn");
    let def = BodyDef::new(BodyType::Dynamic).with_material(PhysicsMaterial {
        density: 1.0,
        friction: 0.3,
        restitution: 0.2,
        gravity_scale: 1.0,
        linear_damping: 0.0,
    });
    simulate(obj, &def, ctx)
}

fn leaf(id: EntityId, params: &SpawnParams, _ctx: &mut SpawnContext<'_>) -> GameObject {
    let mut body = body(params, Vec2::splat(LEAF_SIZE));
    if params.velocity == Vec2::ZERO {
        body.set_velocity(Vec2::new(LEAF_SPEED_X, LEAF_SPEED_Y));
    }
    GameObject::new(id, "Leaf")
        .with(body)
        .with(Behavior::Bounce(BounceBehavior::new(
            params.bounds.unwrap_or_else(leaf_bounds),
        )))
        .with(SpriteComponent::textured(params.texture_or("leaf")).with_fill(colors::LEAF))
}

fn physics_leaf(id: EntityId, params: &SpawnParams, ctx: &mut SpawnContext<'_>) -> GameObject {
    let mut obj = leaf(id, params, ctx);
    obj.set_name("PhysicsLeaf");
    // Collider matches the inset hitbox used by the kinematic game
    let def = BodyDef::new(BodyType::Kinematic).with_collider_scale(1.0 - 2.0 * LEAF_HITBOX_INSET);
    simulate(obj, &def, ctx)
}

fn player(id: EntityId, params: &SpawnParams, _ctx: &mut SpawnContext<'_>) -> GameObject {
    GameObject::new(id, "Player")
        .with(body(params, Vec2::splat(PLAYER_SIZE)))
        .with(ControllerComponent::new(
            params.speed_or(PLAYER_SPEED),
            ControlScheme::FourWay,
            params.bounds.unwrap_or_else(room_interior),
        ))
        .with(
            SpriteComponent::textured(params.texture_or("player"))
                .with_fill(colors::PLAYER)
                .with_sheet(2, 2),
        )
}

fn wall(id: EntityId, params: &SpawnParams, _ctx: &mut SpawnContext<'_>) -> GameObject {
    GameObject::new(id, "Wall")
        .with(body(params, Vec2::new(SCREEN_WIDTH, WALL_THICKNESS)))
        .with(Prop::Wall)
        .with(SpriteComponent::textured(params.texture_or("wall")).with_fill(colors::WALL))
}

fn security_camera(id: EntityId, params: &SpawnParams, _ctx: &mut SpawnContext<'_>) -> GameObject {
    let body = body(params, Vec2::splat(CAMERA_SIZE));
    let cone = VisionCone::new(body.center(), CAMERA_HALF_WIDTH, CAMERA_RANGE).with_sweep(
        0.0,
        360.0,
        params.speed_or(CAMERA_SWEEP_SPEED),
    );
    GameObject::new(id, "SecurityCamera")
        .with(body)
        .with(Behavior::Sweep(SweepBehavior::new(cone)))
        .with(SpriteComponent::filled(colors::CAMERA))
}

fn key(id: EntityId, params: &SpawnParams, _ctx: &mut SpawnContext<'_>) -> GameObject {
    GameObject::new(id, "Key")
        .with(body(params, Vec2::splat(KEY_SIZE)))
        .with(Prop::key())
        .with(SpriteComponent::textured(params.texture_or("key")).with_fill(colors::KEY))
}

fn door(id: EntityId, params: &SpawnParams, _ctx: &mut SpawnContext<'_>) -> GameObject {
    GameObject::new(id, "Door")
        .with(body(params, Vec2::new(DOOR_WIDTH, DOOR_HEIGHT)))
        .with(Prop::door(params.final_door))
        .with(SpriteComponent::textured(params.texture_or("door")).with_fill(colors::DOOR))
}

fn color_block(id: EntityId, params: &SpawnParams, _ctx: &mut SpawnContext<'_>) -> GameObject {
    let color = params.color.unwrap_or(PuzzleColor::Red);
    GameObject::new(id, "ColorBlock")
        .with(body(params, Vec2::splat(PUZZLE_BLOCK_SIZE)))
        .with(Prop::block(color))
        .with(SpriteComponent::filled(color.rgba()))
}

fn color_box(id: EntityId, params: &SpawnParams, _ctx: &mut SpawnContext<'_>) -> GameObject {
    let color = params.color.unwrap_or(PuzzleColor::Red);
    GameObject::new(id, "ColorBox")
        .with(body(params, Vec2::splat(PUZZLE_BOX_SIZE)))
        .with(Prop::color_box(color))
        .with(SpriteComponent::filled(color.box_rgba()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ComponentKind, UpdateContext};
    use crate::platform::KeyboardState;

    #[test]
    fn test_unknown_type_yields_no_entity() {
        let factory = ObjectFactory::with_builtin_types();
        let mut next_id = 0;
        let mut ctx = SpawnContext::new(&mut next_id, None);

        let result = factory.create("Dragon", &SpawnParams::default(), &mut ctx);
        assert_eq!(result.unwrap_err(), FactoryError::UnknownType("Dragon".into()));
        assert_eq!(next_id, 0);
    }

    #[test]
    fn test_known_type_matches_params() {
        let factory = ObjectFactory::with_builtin_types();
        let mut next_id = 10;
        let mut ctx = SpawnContext::new(&mut next_id, None);
        let params = SpawnParams::at(120.0, 340.0).with_size(64.0, 48.0);

        let wall = factory.create("Wall", &params, &mut ctx).unwrap();
        assert_eq!(wall.id(), EntityId(10));
        assert_eq!(wall.name(), "Wall");
        assert_eq!(wall.rect(), Some(Rect::new(120.0, 340.0, 64.0, 48.0)));
        assert_eq!(next_id, 11);
    }

    #[test]
    fn test_every_builtin_has_a_body() {
        let factory = ObjectFactory::with_builtin_types();
        let mut next_id = 0;
        let names: Vec<String> = factory.type_names().map(str::to_string).collect();
        assert_eq!(names.len(), 12);
        for name in names {
            let mut ctx = SpawnContext::new(&mut next_id, None);
            let obj = factory.create(&name, &SpawnParams::at(1.0, 2.0), &mut ctx).unwrap();
            assert!(obj.has(ComponentKind::Body), "{name} has no body");
            assert_eq!(obj.body().unwrap().position(), Vec2::new(1.0, 2.0));
        }
    }

    #[test]
    fn test_projectile_falls_from_squirrel() {
        let factory = ObjectFactory::with_builtin_types();
        let mut next_id = 0;
        let mut ctx = SpawnContext::new(&mut next_id, None);
        let params = SpawnParams::at(400.0, 50.0).with_velocity(Vec2::new(0.0, 400.0));
        let mut acorn = factory.create("Acorn", &params, &mut ctx).unwrap();

        let input = KeyboardState::new();
        acorn.update(&mut UpdateContext {
            dt: 0.1,
            input: &input,
            physics: None,
        });
        let pos = acorn.body().unwrap().position();
        assert!((pos.y - 90.0).abs() < 1e-3);
        assert_eq!(pos.x, 400.0);
    }

    #[test]
    fn test_simulated_recipe_without_world_stays_kinematic() {
        let factory = ObjectFactory::with_builtin_types();
        let mut next_id = 0;
        let mut ctx = SpawnContext::new(&mut next_id, None);
        let acorn = factory
            .create("PhysicsAcorn", &SpawnParams::at(0.0, 0.0), &mut ctx)
            .unwrap();
        assert!(!acorn.body().unwrap().is_simulated());
        assert_eq!(acorn.name(), "PhysicsAcorn");
    }

    #[test]
    fn test_simulated_recipe_attaches() {
        let factory = ObjectFactory::with_builtin_types();
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let mut next_id = 0;
        let mut ctx = SpawnContext::new(&mut next_id, Some(&mut world));
        let leaf = factory
            .create("PhysicsLeaf", &SpawnParams::at(100.0, 400.0), &mut ctx)
            .unwrap();
        assert!(leaf.body().unwrap().is_simulated());
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_register_overwrites() {
        let mut factory = ObjectFactory::with_builtin_types();
        factory.register("Wall", |id, _params, _ctx| GameObject::new(id, "Hedge"));
        let mut next_id = 0;
        let mut ctx = SpawnContext::new(&mut next_id, None);
        let obj = factory.create("Wall", &SpawnParams::default(), &mut ctx).unwrap();
        assert_eq!(obj.name(), "Hedge");
    }

    #[test]
    fn test_descriptions_provide_defaults() {
        let mut factory = ObjectFactory::with_builtin_types();
        let json = r#"[
            { "type": "Squirrel", "components": [
                { "type": "Body", "x": 400, "y": 50, "width": 80, "height": 80 },
                { "type": "Controller", "speed": 250 },
                { "type": "Sprite", "texture": "SQRL" }
            ] }
        ]"#;
        assert_eq!(factory.load_descriptions(json), Ok(1));

        let params = factory.params_for("Squirrel").unwrap();
        assert_eq!(params.position, Vec2::new(400.0, 50.0));
        assert_eq!(params.size, Vec2::splat(80.0));
        assert_eq!(params.speed, 250.0);
        assert_eq!(params.texture.as_deref(), Some("SQRL"));
        assert!(factory.params_for("Leaf").is_none());

        let mut next_id = 0;
        let mut ctx = SpawnContext::new(&mut next_id, None);
        let squirrel = factory.create_described("Squirrel", &mut ctx).unwrap();
        assert_eq!(squirrel.get::<ControllerComponent>().unwrap().speed, 250.0);
    }

    #[test]
    fn test_descriptions_reject_unregistered_and_garbage() {
        let mut factory = ObjectFactory::with_builtin_types();
        let json = r#"[ { "type": "Leaf" }, { "type": "Dragon" } ]"#;
        assert_eq!(
            factory.load_descriptions(json),
            Err(FactoryError::UnknownType("Dragon".into()))
        );
        assert!(factory.description("Leaf").is_none());

        assert!(matches!(
            factory.load_descriptions("not json"),
            Err(FactoryError::InvalidDescription(_))
        ));
    }
}
