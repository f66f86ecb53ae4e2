//! Player-driven movement
//!
//! Unlike behaviors, controllers react to the input device. Movement is
//! clamped to `bounds` every update.

use glam::Vec2;

use super::body::BodyComponent;
use super::{Siblings, UpdateContext};
use crate::platform::{InputDevice, Key};
use crate::sim::Rect;

/// Which axes the controller drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlScheme {
    /// Left/right only (squirrel on the branch)
    Horizontal,
    /// Four directions (stealth player)
    FourWay,
}

/// Last movement direction, used to pick an animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Rest,
    Left,
    Right,
    Vertical,
}

impl Facing {
    /// Sprite sheet frame (0 = rest, 1 = left, 2 = right, 3 = up/down)
    pub fn frame(&self) -> u32 {
        match self {
            Facing::Rest => 0,
            Facing::Left => 1,
            Facing::Right => 2,
            Facing::Vertical => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControllerComponent {
    pub speed: f32,
    pub scheme: ControlScheme,
    pub bounds: Rect,
    facing: Facing,
}

impl ControllerComponent {
    pub fn new(speed: f32, scheme: ControlScheme, bounds: Rect) -> Self {
        Self {
            speed,
            scheme,
            bounds,
            facing: Facing::Rest,
        }
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Direction requested by the currently held keys
    pub fn direction(&self, input: &dyn InputDevice) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if input.is_key_down(Key::Left) || input.is_key_down(Key::A) {
            dir.x -= 1.0;
        }
        if input.is_key_down(Key::Right) || input.is_key_down(Key::D) {
            dir.x += 1.0;
        }
        if self.scheme == ControlScheme::FourWay {
            if input.is_key_down(Key::Up) || input.is_key_down(Key::W) {
                dir.y -= 1.0;
            }
            if input.is_key_down(Key::Down) || input.is_key_down(Key::S) {
                dir.y += 1.0;
            }
        }
        dir
    }

    /// Move the body `speed * dt` along `dir` (per axis) and clamp it
    pub fn steer(&mut self, body: &mut BodyComponent, dir: Vec2, dt: f32) {
        body.set_position(body.position() + dir * self.speed * dt);
        let clamped = self.bounds.clamp_inside(body.rect());
        body.set_position(clamped);

        self.facing = if dir.y != 0.0 {
            Facing::Vertical
        } else if dir.x < 0.0 {
            Facing::Left
        } else if dir.x > 0.0 {
            Facing::Right
        } else {
            Facing::Rest
        };
    }

    pub(super) fn update(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateContext<'_>) {
        let Some(body) = siblings.get_mut::<BodyComponent>() else {
            return;
        };
        let dir = self.direction(ctx.input);
        self.steer(body, dir, ctx.dt);
    }
}
