//! Platform abstraction layer
//!
//! Handles the outside world for the game loop:
//! - Input events and per-frame key state
//! - Frame timing

pub mod input;
pub mod time;

pub use input::{InputDevice, InputEvent, Key, KeyboardState};
pub use time::FrameClock;
