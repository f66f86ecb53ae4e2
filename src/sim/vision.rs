//! Vision cones for security cameras
//!
//! A cone is a distance + angle region anchored at an origin. The heading
//! sweeps back and forth between two bounds. All angles are in degrees,
//! measured with `atan2(dy, dx)` in screen space (y down).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::wrap_degrees;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionCone {
    pub origin: Vec2,
    /// Current heading (degrees)
    pub heading: f32,
    /// Sweep bounds (degrees)
    pub min_heading: f32,
    pub max_heading: f32,
    /// Degrees per second
    pub sweep_speed: f32,
    /// +1 while heading increases, -1 while it decreases
    pub direction: f32,
    /// Half of the cone's opening angle (degrees)
    pub half_width: f32,
    pub range: f32,
}

impl VisionCone {
    pub fn new(origin: Vec2, half_width: f32, range: f32) -> Self {
        Self {
            origin,
            heading: 0.0,
            min_heading: 0.0,
            max_heading: 360.0,
            sweep_speed: 0.0,
            direction: 1.0,
            half_width,
            range,
        }
    }

    pub fn with_sweep(mut self, min_heading: f32, max_heading: f32, speed: f32) -> Self {
        self.min_heading = min_heading;
        self.max_heading = max_heading;
        self.sweep_speed = speed;
        self.heading = min_heading;
        self
    }

    pub fn with_heading(mut self, heading: f32) -> Self {
        self.heading = heading;
        self
    }

    /// Advance the ping-pong sweep
    pub fn sweep(&mut self, dt: f32) {
        self.heading += self.sweep_speed * self.direction * dt;
        if self.heading >= self.max_heading {
            self.heading = self.max_heading;
            self.direction = -1.0;
        } else if self.heading <= self.min_heading {
            self.heading = self.min_heading;
            self.direction = 1.0;
        }
    }

    /// Point test. Boundaries are inclusive on both range and angle.
    pub fn sees_point(&self, point: Vec2) -> bool {
        let delta = point - self.origin;
        let distance = delta.length();
        if distance > self.range {
            return false;
        }
        if distance == 0.0 {
            return true;
        }

        let bearing = delta.y.atan2(delta.x).to_degrees();
        let diff = wrap_degrees(bearing - self.heading);
        diff.abs() <= self.half_width
    }

    /// Conservative rectangle test: any corner or the center
    pub fn sees_rect(&self, rect: &Rect) -> bool {
        rect.corners()
            .iter()
            .chain(std::iter::once(&rect.center()))
            .any(|p| self.sees_point(*p))
    }

    /// The two edge directions of the cone (for drawing)
    pub fn edges(&self) -> (Vec2, Vec2) {
        let left = (self.heading - self.half_width).to_radians();
        let right = (self.heading + self.half_width).to_radians();
        (
            self.origin + Vec2::new(left.cos(), left.sin()) * self.range,
            self.origin + Vec2::new(right.cos(), right.sin()) * self.range,
        )
    }
}
