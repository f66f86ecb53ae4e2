//! Game simulation
//!
//! Geometry tests (AABB, vision cones), the game state machine and the
//! per-mode rules. Everything here runs on the seeded session RNG and a
//! caller-supplied dt, so a replay with the same inputs is identical.

pub mod autopilot;
pub mod collision;
pub mod session;
mod shooter;
pub mod state;
mod stealth;
pub mod vision;

pub use autopilot::autopilot;
pub use collision::Rect;
pub use session::GameSession;
pub use state::{GameEvent, GamePhase, GameState, LevelProgress};
pub use vision::VisionCone;
