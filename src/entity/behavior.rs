//! Autonomous movement/lifecycle policies
//!
//! Behaviors read and write the sibling body. Without a body they do nothing.

use glam::Vec2;

use super::body::BodyComponent;
use super::{Siblings, UpdateContext};
use crate::sim::{Rect, VisionCone};

#[derive(Debug, Clone)]
pub enum Behavior {
    Bounce(BounceBehavior),
    Projectile(ProjectileBehavior),
    Sweep(SweepBehavior),
}

impl Behavior {
    pub(super) fn update(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateContext<'_>) {
        let owner = siblings.owner();
        let Some(body) = siblings.get_mut::<BodyComponent>() else {
            return;
        };
        match self {
            Behavior::Bounce(bounce) => {
                if bounce.apply(body) && body.is_simulated() {
                    // Simulated leaf: hand the corrected state back to rapier
                    if let Some(world) = ctx.physics.as_deref_mut() {
                        if let Err(e) = body.push_to_physics(world, owner) {
                            log::debug!("Bounce correction skipped: {e}");
                        }
                    }
                }
            }
            Behavior::Projectile(projectile) => projectile.apply(body),
            Behavior::Sweep(sweep) => {
                sweep.cone.origin = body.center();
                sweep.cone.sweep(ctx.dt);
            }
        }
    }

    pub fn as_projectile(&self) -> Option<&ProjectileBehavior> {
        match self {
            Behavior::Projectile(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_sweep(&self) -> Option<&SweepBehavior> {
        match self {
            Behavior::Sweep(s) => Some(s),
            _ => None,
        }
    }
}

/// Keep the body inside `bounds`, reflecting velocity off the edges
#[derive(Debug, Clone)]
pub struct BounceBehavior {
    pub bounds: Rect,
}

impl BounceBehavior {
    pub fn new(bounds: Rect) -> Self {
        Self { bounds }
    }

    /// Returns true if the body was corrected
    fn apply(&self, body: &mut BodyComponent) -> bool {
        let mut pos = body.position();
        let mut vel = body.velocity();
        let size = body.size();
        let b = &self.bounds;

        if pos.x < b.x {
            pos.x = b.x;
            vel.x = vel.x.abs();
        }
        if pos.x + size.x > b.right() {
            pos.x = b.right() - size.x;
            vel.x = -vel.x.abs();
        }
        if pos.y < b.y {
            pos.y = b.y;
            vel.y = vel.y.abs();
        }
        if pos.y + size.y > b.bottom() {
            pos.y = b.bottom() - size.y;
            vel.y = -vel.y.abs();
        }

        let changed = pos != body.position() || vel != body.velocity();
        if changed {
            body.set_position(pos);
            body.set_velocity(vel);
        }
        changed
    }
}

/// Flags the body once it passes below `limit_y`
#[derive(Debug, Clone)]
pub struct ProjectileBehavior {
    pub limit_y: f32,
    off_screen: bool,
}

impl ProjectileBehavior {
    pub fn new(limit_y: f32) -> Self {
        Self {
            limit_y,
            off_screen: false,
        }
    }

    pub fn is_off_screen(&self) -> bool {
        self.off_screen
    }

    fn apply(&mut self, body: &BodyComponent) {
        if body.position().y > self.limit_y {
            self.off_screen = true;
        }
    }
}

/// Security camera: a vision cone anchored at the body center
#[derive(Debug, Clone)]
pub struct SweepBehavior {
    pub cone: VisionCone,
}

impl SweepBehavior {
    pub fn new(cone: VisionCone) -> Self {
        Self { cone }
    }

    pub fn sees(&self, target: &Rect) -> bool {
        self.cone.sees_rect(target)
    }

    pub fn origin(&self) -> Vec2 {
        self.cone.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityId, GameObject};
    use crate::platform::KeyboardState;

    fn step(obj: &mut GameObject, dt: f32) {
        let input = KeyboardState::new();
        let mut ctx = UpdateContext {
            dt,
            input: &input,
            physics: None,
        };
        obj.update(&mut ctx);
    }

    #[test]
    fn test_bounce_reflects_off_right_edge() {
        let bounds = Rect::new(-20.0, 280.0, 840.0, 340.0);
        let mut leaf = GameObject::new(EntityId(1), "Leaf")
            .with(
                BodyComponent::new(Vec2::new(740.0, 400.0), Vec2::splat(90.0))
                    .with_velocity(Vec2::new(200.0, 150.0)),
            )
            .with(Behavior::Bounce(BounceBehavior::new(bounds)));

        step(&mut leaf, 0.1);
        let body = leaf.body().unwrap();
        assert_eq!(body.position().x, 820.0 - 90.0);
        assert_eq!(body.velocity().x, -200.0);
        assert_eq!(body.velocity().y, 150.0);
    }

    #[test]
    fn test_bounce_never_reverses_inward_velocity() {
        // Already heading back in: the correction keeps it heading in
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut body = BodyComponent::new(Vec2::new(-5.0, 50.0), Vec2::splat(10.0))
            .with_velocity(Vec2::new(30.0, 0.0));
        assert!(BounceBehavior::new(bounds).apply(&mut body));
        assert_eq!(body.position().x, 0.0);
        assert_eq!(body.velocity().x, 30.0);
    }

    #[test]
    fn test_projectile_flags_off_screen() {
        let mut acorn = GameObject::new(EntityId(2), "Acorn")
            .with(
                BodyComponent::new(Vec2::new(100.0, 590.0), Vec2::splat(30.0))
                    .with_velocity(Vec2::new(0.0, 400.0)),
            )
            .with(Behavior::Projectile(ProjectileBehavior::new(600.0)));

        let flagged = |obj: &GameObject| {
            obj.get::<Behavior>()
                .and_then(Behavior::as_projectile)
                .map(ProjectileBehavior::is_off_screen)
        };

        assert_eq!(flagged(&acorn), Some(false));
        step(&mut acorn, 0.1);
        assert_eq!(flagged(&acorn), Some(true));
    }

    #[test]
    fn test_sweep_tracks_body_center() {
        let cone = VisionCone::new(Vec2::ZERO, 30.0, 200.0).with_sweep(0.0, 360.0, 15.0);
        let mut camera = GameObject::new(EntityId(3), "SecurityCamera")
            .with(BodyComponent::new(Vec2::new(700.0, 50.0), Vec2::splat(32.0)))
            .with(Behavior::Sweep(SweepBehavior::new(cone)));

        step(&mut camera, 1.0);
        let sweep = camera.get::<Behavior>().and_then(Behavior::as_sweep).unwrap();
        assert_eq!(sweep.origin(), Vec2::new(716.0, 66.0));
        assert!((sweep.cone.heading - 15.0).abs() < 1e-4);
    }
}
