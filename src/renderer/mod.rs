//! Rendering abstraction
//!
//! Drawing goes through the [`Renderer`] trait so the game never touches a
//! window or GPU directly. [`RecordingRenderer`] is the headless backend used
//! by the demo binary and the tests: it records every call as a
//! [`DrawCommand`].

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::SpriteFrame;
use crate::sim::Rect;

/// Straight-alpha RGBA color, channels in 0..=1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_array(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    /// Scale RGB, keep alpha
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor, self.a)
    }

    pub fn with_alpha(&self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

/// Colors for game elements
pub mod colors {
    use super::Rgba;

    pub const BACKGROUND: Rgba = Rgba::from_array([0.02, 0.02, 0.05, 1.0]);
    pub const FOREST: Rgba = Rgba::from_array([0.1, 0.25, 0.12, 1.0]);
    pub const SQUIRREL: Rgba = Rgba::from_array([0.6, 0.4, 0.2, 1.0]);
    pub const ACORN: Rgba = Rgba::from_array([0.45, 0.3, 0.1, 1.0]);
    pub const LEAF: Rgba = Rgba::from_array([0.2, 0.8, 0.4, 1.0]);
    pub const PLAYER: Rgba = Rgba::from_array([1.0, 1.0, 1.0, 1.0]);
    pub const WALL: Rgba = Rgba::from_array([0.3, 0.3, 0.4, 1.0]);
    pub const CAMERA: Rgba = Rgba::from_array([0.7, 0.7, 0.8, 1.0]);
    pub const VISION: Rgba = Rgba::from_array([1.0, 0.9, 0.3, 0.25]);
    pub const KEY: Rgba = Rgba::from_array([0.9, 0.85, 0.3, 1.0]); // Gold
    pub const DOOR: Rgba = Rgba::from_array([0.5, 0.3, 0.15, 1.0]);
    pub const PUZZLE_RED: Rgba = Rgba::from_array([0.9, 0.2, 0.2, 1.0]);
    pub const PUZZLE_BLUE: Rgba = Rgba::from_array([0.2, 0.4, 1.0, 1.0]);
    pub const PUZZLE_GREEN: Rgba = Rgba::from_array([0.2, 0.85, 0.3, 1.0]);
    pub const TEXT: Rgba = Rgba::from_array([1.0, 1.0, 1.0, 1.0]);
}

/// Drawing surface for one frame
pub trait Renderer {
    fn clear(&mut self, color: Rgba);

    fn draw_rect(&mut self, rect: Rect, color: Rgba);

    /// Draw a texture (optionally one sheet frame) into `dest`.
    ///
    /// Returns false when the texture is not loaded; nothing is drawn.
    fn draw_texture(&mut self, name: &str, dest: Rect, frame: Option<SpriteFrame>) -> bool;

    fn draw_text(&mut self, text: &str, pos: Vec2, color: Rgba);

    fn present(&mut self);
}

/// One recorded renderer call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgba),
    Rect {
        rect: Rect,
        color: Rgba,
    },
    Texture {
        name: String,
        dest: Rect,
        frame: Option<SpriteFrame>,
    },
    Text {
        text: String,
        pos: Vec2,
        color: Rgba,
    },
}

/// Headless renderer that records draw calls
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    textures: HashSet<String>,
    font_loaded: bool,
    commands: Vec<DrawCommand>,
    frames_presented: u64,
    warned: HashSet<String>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self {
            font_loaded: true,
            ..Default::default()
        }
    }

    /// Mark a texture as loaded
    pub fn load_texture(&mut self, name: impl Into<String>) {
        self.textures.insert(name.into());
    }

    pub fn with_textures<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.load_texture(name);
        }
        self
    }

    /// Simulate a missing font: text is skipped
    pub fn without_font(mut self) -> Self {
        self.font_loaded = false;
        self
    }

    pub fn has_texture(&self, name: &str) -> bool {
        self.textures.contains(name)
    }

    /// Commands recorded since the last `present`
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn count_rects(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { .. }))
            .count()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Warn once per missing resource
    fn warn_missing(&mut self, what: &str) {
        if self.warned.insert(what.to_string()) {
            log::warn!("Missing {what}, drawing skipped");
        }
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self, color: Rgba) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn draw_texture(&mut self, name: &str, dest: Rect, frame: Option<SpriteFrame>) -> bool {
        if !self.textures.contains(name) {
            self.warn_missing(&format!("texture '{name}'"));
            return false;
        }
        self.commands.push(DrawCommand::Texture {
            name: name.to_string(),
            dest,
            frame,
        });
        true
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, color: Rgba) {
        if !self.font_loaded {
            self.warn_missing("font");
            return;
        }
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            color,
        });
    }

    fn present(&mut self) {
        self.frames_presented += 1;
    }
}
