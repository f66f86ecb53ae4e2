//! World-to-screen camera transform
//!
//! Pure transform state. The view never owns or moves entities; it only maps
//! world coordinates into the viewport.

use glam::Vec2;

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::sim::Rect;

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    center: Vec2,
    size: Vec2,
    bounds: Option<Rect>,
    /// Zoom factor, 1.0 = one world unit per pixel
    scale: f32,
    /// Radians, applied around the view center
    rotation: f32,
}

impl Default for View {
    fn default() -> Self {
        let size = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        Self::new(size * 0.5, size)
    }
}

impl View {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            size,
            bounds: None,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
        self.clamp_to_bounds();
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Zoom; non-positive values are ignored
    pub fn set_scale(&mut self, scale: f32) {
        if scale > 0.0 {
            self.scale = scale;
        }
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    pub fn move_by(&mut self, delta: Vec2) {
        self.center += delta;
        self.clamp_to_bounds();
    }

    /// Move toward `target` by `smoothing` (0 = stay, 1 = snap)
    pub fn follow(&mut self, target: Vec2, smoothing: f32) {
        self.center += (target - self.center) * smoothing;
        self.clamp_to_bounds();
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
        self.clamp_to_bounds();
    }

    pub fn clear_bounds(&mut self) {
        self.bounds = None;
    }

    /// Keep the visible area inside the bounds.
    ///
    /// If the bounds are smaller than the view, the view is pinned to the
    /// bounds' top-left edge.
    pub fn clamp_to_bounds(&mut self) {
        let Some(b) = self.bounds else {
            return;
        };
        let half = self.size * 0.5;
        self.center.x = (b.x + half.x).max(self.center.x.min(b.right() - half.x));
        self.center.y = (b.y + half.y).max(self.center.y.min(b.bottom() - half.y));
    }

    /// World point -> screen pixel
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let mut offset = (world - self.center) * self.scale;
        if self.rotation != 0.0 {
            offset = Vec2::from_angle(-self.rotation).rotate(offset);
        }
        offset + self.size * 0.5
    }

    /// Screen pixel -> world point
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let mut offset = screen - self.size * 0.5;
        if self.rotation != 0.0 {
            offset = Vec2::from_angle(self.rotation).rotate(offset);
        }
        offset / self.scale + self.center
    }

    /// Map a world rectangle. Rotation moves the top-left corner but the
    /// rectangle stays axis-aligned.
    pub fn world_rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_pos_size(self.world_to_screen(rect.pos()), rect.size() * self.scale)
    }
}
