//! Game session: owns everything a running game needs
//!
//! One tick runs, in order:
//! 1. phase handling (title / restart)
//! 2. level progression from the previous tick's results
//! 3. mode input (firing acorns)
//! 4. entity updates
//! 5. physics step and pull
//! 6. mode rules (hits, keys, doors, cameras, puzzle)
//! 7. sweep of inactive entities

use std::path::Path;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::state::{GamePhase, GameState};
use crate::consts::*;
use crate::entity::{EntityId, GameObject, UpdateContext};
use crate::error::FactoryResult;
use crate::factory::{ObjectFactory, SpawnContext, SpawnParams};
use crate::physics::PhysicsWorld;
use crate::platform::{FrameClock, InputDevice, Key};
use crate::renderer::{Renderer, colors};
use crate::settings::{GameConfig, GameMode};
use crate::view::View;

pub struct GameSession {
    pub(super) config: GameConfig,
    pub(super) state: GameState,
    pub(super) objects: Vec<GameObject>,
    pub(super) factory: ObjectFactory,
    pub(super) physics: Option<PhysicsWorld>,
    pub(super) view: View,
    pub(super) rng: Pcg32,
    next_id: u32,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        let mut factory = ObjectFactory::with_builtin_types();
        if let Some(path) = &config.objects_path {
            match factory.load_description_file(path) {
                Ok(count) => log::info!("Loaded {count} object descriptions"),
                Err(e) => log::warn!("Object descriptions not loaded: {e}"),
            }
        }

        let physics = (config.mode == GameMode::AcornDrop && config.physics_projectiles).then(|| {
            PhysicsWorld::new(Vec2::new(0.0, ACORN_GRAVITY)).with_substeps(PHYSICS_SUBSTEPS)
        });

        let mut session = Self {
            state: GameState::new(config.mode, &config.level(0)),
            rng: Pcg32::seed_from_u64(config.seed),
            objects: Vec::new(),
            factory,
            physics,
            view: View::default(),
            next_id: 1,
            config,
        };
        session.load_level(0);
        log::info!(
            "Session ready: {} ({}, seed {})",
            session.config.title,
            session.config.mode.as_str(),
            session.config.seed
        );
        session
    }

    pub fn from_config_file(path: impl AsRef<Path>) -> Self {
        Self::new(GameConfig::load_or_default(path))
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode
    }

    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn physics(&self) -> Option<&PhysicsWorld> {
        self.physics.as_ref()
    }

    pub fn factory(&self) -> &ObjectFactory {
        &self.factory
    }

    /// Register extra recipes before play starts
    pub fn factory_mut(&mut self) -> &mut ObjectFactory {
        &mut self.factory
    }

    pub fn find(&self, id: EntityId) -> Option<&GameObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn find_mut(&mut self, id: EntityId) -> Option<&mut GameObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    /// First active object with this name
    pub fn find_named(&self, name: &str) -> Option<&GameObject> {
        self.objects.iter().find(|o| o.is_active() && o.name() == name)
    }

    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a GameObject> + 'a {
        self.objects
            .iter()
            .filter(move |o| o.is_active() && o.name() == name)
    }

    /// Build an entity through the factory and add it to the session
    pub fn spawn(&mut self, name: &str, params: &SpawnParams) -> FactoryResult<EntityId> {
        let mut ctx = SpawnContext::new(&mut self.next_id, self.physics.as_mut());
        let obj = self.factory.create(name, params, &mut ctx)?;
        let id = obj.id();
        self.objects.push(obj);
        Ok(id)
    }

    /// Add an already-built entity
    pub fn insert(&mut self, obj: GameObject) -> EntityId {
        let id = obj.id();
        self.objects.push(obj);
        id
    }

    pub fn alloc_id(&mut self) -> EntityId {
        SpawnContext::new(&mut self.next_id, None).alloc_id()
    }

    /// Remove every entity (and its rigid body)
    pub(super) fn clear_objects(&mut self) {
        for obj in &mut self.objects {
            obj.set_active(false);
        }
        self.sweep_inactive();
    }

    /// Drop inactive entities, removing their rigid bodies first
    pub(super) fn sweep_inactive(&mut self) {
        let physics = &mut self.physics;
        self.objects.retain(|obj| {
            if obj.is_active() {
                return true;
            }
            if let (Some(world), Some(handle)) =
                (physics.as_mut(), obj.body().and_then(|b| b.handle()))
            {
                world.remove_body(handle);
            }
            log::debug!("Removed {} {}", obj.name(), obj.id());
            false
        });
    }

    fn load_level(&mut self, level: usize) {
        match self.config.mode {
            GameMode::AcornDrop => self.spawn_shooter_level(level),
            GameMode::Stealth => self.spawn_stealth_level(level),
        }
    }

    /// Back to level 1, straight into play
    pub fn restart(&mut self) {
        self.clear_objects();
        self.state = GameState::new(self.config.mode, &self.config.level(0));
        self.load_level(0);
        self.state.start();
        log::info!("Game restarted");
    }

    /// Advance the game by `dt` seconds
    pub fn tick(&mut self, input: &dyn InputDevice, dt: f32) {
        self.state.clear_events();
        self.state.time_ticks += 1;

        match self.state.phase {
            GamePhase::TitleScreen => {
                if input.is_key_pressed(Key::Enter) || input.is_key_pressed(Key::Space) {
                    self.state.start();
                }
                return;
            }
            GamePhase::GameOver | GamePhase::YouWin => {
                if input.is_key_pressed(Key::Enter) {
                    self.restart();
                }
                return;
            }
            GamePhase::Playing => {}
        }

        match self.config.mode {
            GameMode::AcornDrop => {
                if !self.shooter_progress() {
                    return;
                }
                self.shooter_input(input, dt);
            }
            GameMode::Stealth => self.stealth_progress(),
        }

        let mut ctx = UpdateContext {
            dt,
            input,
            physics: self.physics.as_mut(),
        };
        for obj in &mut self.objects {
            obj.update(&mut ctx);
        }

        if let Some(world) = &mut self.physics {
            world.step(dt);
            world.sync_objects(self.objects.iter_mut());
        }

        match self.config.mode {
            GameMode::AcornDrop => self.shooter_rules(),
            GameMode::Stealth => self.stealth_rules(),
        }

        self.sweep_inactive();
    }

    /// Draw the current frame
    pub fn render(&self, renderer: &mut dyn Renderer) {
        let background = match self.config.mode {
            GameMode::AcornDrop => colors::FOREST,
            GameMode::Stealth => colors::BACKGROUND,
        };
        renderer.clear(background);

        for obj in &self.objects {
            obj.render(renderer, &self.view);
        }

        match self.config.mode {
            GameMode::AcornDrop => self.render_shooter_hud(renderer),
            GameMode::Stealth => self.render_stealth_overlay(renderer),
        }

        let center = Vec2::new(SCREEN_WIDTH / 2.0 - 80.0, SCREEN_HEIGHT / 2.0);
        match self.state.phase {
            GamePhase::TitleScreen => {
                renderer.draw_text(&self.config.title, center, colors::TEXT);
                renderer.draw_text("Press Enter to start", center + Vec2::new(0.0, 30.0), colors::TEXT);
            }
            GamePhase::GameOver => {
                renderer.draw_text("Game Over!", center, colors::TEXT);
                renderer.draw_text("Press Enter to restart", center + Vec2::new(0.0, 30.0), colors::TEXT);
            }
            GamePhase::YouWin => {
                renderer.draw_text("You Win!", center, colors::TEXT);
                renderer.draw_text("Press Enter to play again", center + Vec2::new(0.0, 30.0), colors::TEXT);
            }
            GamePhase::Playing => {}
        }

        renderer.present();
    }

    /// Real-time loop: pump input, tick, render, pace to ~60 Hz.
    ///
    /// `before_frame` runs ahead of the input pump each frame and may queue
    /// input events (scripted or AI play). Returns the number of frames run.
    pub fn run<I, F>(
        &mut self,
        input: &mut I,
        renderer: &mut dyn Renderer,
        max_frames: Option<u64>,
        mut before_frame: F,
    ) -> u64
    where
        I: InputDevice,
        F: FnMut(&GameSession, &mut I),
    {
        let mut clock = FrameClock::default();
        let mut frames = 0;
        loop {
            if max_frames.is_some_and(|max| frames >= max) {
                break;
            }
            before_frame(&*self, input);
            if input.pump() {
                log::info!("Quit requested");
                break;
            }
            let dt = clock.tick();
            self.tick(&*input, dt);
            self.render(renderer);
            clock.sleep_remaining();
            frames += 1;
        }
        frames
    }
}
