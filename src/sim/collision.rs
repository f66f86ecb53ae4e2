//! Axis-aligned rectangle tests
//!
//! Every gameplay overlap (acorn vs leaf, player vs key/door/block) goes
//! through [`Rect::overlaps`]. Rectangles are derived straight from a body's
//! top-left position and size.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, `pos` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Four corners, clockwise from top-left
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.right(), self.y),
            Vec2::new(self.right(), self.bottom()),
            Vec2::new(self.x, self.bottom()),
        ]
    }

    /// No area: zero (or negative) width or height
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Standard four-inequality AABB test.
    ///
    /// Strict inequalities: rectangles that only share an edge do not
    /// overlap, and a zero-size rectangle never overlaps anything.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Shrink each side by `fraction` of the width/height.
    ///
    /// `inset(0.2)` keeps the middle 60% on both axes.
    pub fn inset(&self, fraction: f32) -> Rect {
        let dx = self.w * fraction;
        let dy = self.h * fraction;
        Rect::new(
            self.x + dx,
            self.y + dy,
            (self.w - 2.0 * dx).max(0.0),
            (self.h - 2.0 * dy).max(0.0),
        )
    }

    /// Inclusive point test (edges count as inside)
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Move `inner` so it lies inside `self` (on each axis where it fits)
    pub fn clamp_inside(&self, inner: Rect) -> Vec2 {
        let mut pos = inner.pos();
        if pos.x < self.x {
            pos.x = self.x;
        }
        if pos.x + inner.w > self.right() {
            pos.x = self.right() - inner.w;
        }
        if pos.y < self.y {
            pos.y = self.y;
        }
        if pos.y + inner.h > self.bottom() {
            pos.y = self.bottom() - inner.h;
        }
        pos
    }
}
