//! Nutshell - a small 2D arcade/stealth game
//!
//! Core modules:
//! - `entity`: GameObject + components (body, behavior, controller, sprite, prop)
//! - `physics`: rapier2d world, body attachment and contact queue
//! - `sim`: Collision/vision tests, game state and per-frame rules
//! - `factory`: Data-driven entity construction
//! - `view`: World-to-screen camera transform
//! - `platform`: Input device and frame clock
//! - `renderer`: Draw-call collaborator
//! - `settings`: Game configuration

pub mod entity;
pub mod error;
pub mod factory;
pub mod physics;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod view;

pub use entity::{Component, ComponentKind, EntityId, GameObject};
pub use error::{ConfigError, FactoryError, PhysicsError};
pub use factory::{ObjectFactory, SpawnContext, SpawnParams};
pub use physics::{Contact, PhysicsWorld};
pub use settings::{GameConfig, GameMode};
pub use sim::{GamePhase, GameSession, GameState};
pub use view::View;

/// Game configuration constants
pub mod consts {
    /// Screen dimensions (world units are pixels)
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Target frame budget (~60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Upper bound on a single frame's dt to avoid large-step instability
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Physics substeps per frame
    pub const PHYSICS_SUBSTEPS: u32 = 4;

    /// Squirrel defaults
    pub const SQUIRREL_SIZE: f32 = 80.0;
    pub const SQUIRREL_SPEED: f32 = 300.0;
    pub const SQUIRREL_START_X: f32 = 400.0;
    pub const SQUIRREL_START_Y: f32 = 50.0;

    /// Acorn defaults
    pub const ACORN_SIZE: f32 = 30.0;
    pub const ACORN_SPEED: f32 = 400.0;
    /// Seconds between shots
    pub const ACORN_COOLDOWN: f32 = 0.3;
    /// Downward gravity for simulated acorns (pixels/s²)
    pub const ACORN_GRAVITY: f32 = 400.0;

    /// Leaf defaults
    pub const LEAF_SIZE: f32 = 90.0;
    pub const LEAF_SPEED_X: f32 = 200.0;
    pub const LEAF_SPEED_Y: f32 = 150.0;
    /// Slack allowed past the play area before the leaf bounces
    pub const LEAF_BOUNCE_SLACK: f32 = 20.0;
    /// Fraction trimmed from each side of the leaf before hit testing
    pub const LEAF_HITBOX_INSET: f32 = 0.2;

    /// Stealth room
    pub const WALL_THICKNESS: f32 = 32.0;
    pub const PLAYER_SIZE: f32 = 100.0;
    pub const PLAYER_SPEED: f32 = 150.0;
    pub const KEY_SIZE: f32 = 32.0;
    pub const DOOR_WIDTH: f32 = 64.0;
    pub const DOOR_HEIGHT: f32 = 96.0;
    pub const CAMERA_SIZE: f32 = 32.0;
    /// Vision cone defaults (degrees / pixels)
    pub const CAMERA_RANGE: f32 = 200.0;
    pub const CAMERA_HALF_WIDTH: f32 = 30.0;
    pub const CAMERA_SWEEP_SPEED: f32 = 15.0;

    /// Color puzzle
    pub const PUZZLE_BLOCK_SIZE: f32 = 40.0;
    pub const PUZZLE_BOX_SIZE: f32 = 50.0;
}

/// Wrap an angle in degrees to [-180, 180]
#[inline]
pub fn wrap_degrees(mut angle: f32) -> f32 {
    while angle > 180.0 {
        angle -= 360.0;
    }
    while angle < -180.0 {
        angle += 360.0;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(720.0 + 45.0), 45.0);
    }
}
