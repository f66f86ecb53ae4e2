//! Render-time translation of body state into a draw call

use super::controller::ControllerComponent;
use super::GameObject;
use crate::renderer::{Renderer, Rgba};
use crate::view::View;

/// One cell of a sprite sheet laid out as `cols` x `rows`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteFrame {
    pub index: u32,
    pub cols: u32,
    pub rows: u32,
}

impl SpriteFrame {
    pub fn new(index: u32, cols: u32, rows: u32) -> Self {
        Self { index, cols, rows }
    }

    /// (column, row) of this frame; the index wraps around the sheet
    pub fn cell(&self) -> (u32, u32) {
        let count = (self.cols * self.rows).max(1);
        let i = self.index % count;
        let cols = self.cols.max(1);
        (i % cols, i / cols)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpriteComponent {
    pub texture: Option<String>,
    /// Drawn as a flat rectangle when the texture is absent or missing
    pub fill: Option<Rgba>,
    /// Sheet layout (cols, rows); the frame follows the controller's facing
    pub sheet: Option<(u32, u32)>,
    pub visible: bool,
}

impl SpriteComponent {
    pub fn textured(texture: impl Into<String>) -> Self {
        Self {
            texture: Some(texture.into()),
            visible: true,
            ..Default::default()
        }
    }

    pub fn filled(fill: Rgba) -> Self {
        Self {
            fill: Some(fill),
            visible: true,
            ..Default::default()
        }
    }

    pub fn with_fill(mut self, fill: Rgba) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_sheet(mut self, cols: u32, rows: u32) -> Self {
        self.sheet = Some((cols, rows));
        self
    }

    /// Frame to draw for the current owner state
    pub fn frame(&self, owner: &GameObject) -> Option<SpriteFrame> {
        let (cols, rows) = self.sheet?;
        let index = owner
            .get::<ControllerComponent>()
            .map(|c| c.facing().frame())
            .unwrap_or(0);
        Some(SpriteFrame::new(index, cols, rows))
    }

    pub(super) fn render(&self, owner: &GameObject, renderer: &mut dyn Renderer, view: &View) {
        if !self.visible {
            return;
        }
        let Some(rect) = owner.rect() else {
            return;
        };
        let dest = view.world_rect_to_screen(rect);

        if let Some(texture) = &self.texture {
            if renderer.draw_texture(texture, dest, self.frame(owner)) {
                return;
            }
        }
        if let Some(fill) = self.fill {
            renderer.draw_rect(dest, fill);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{BodyComponent, ControlScheme, EntityId};
    use crate::renderer::{DrawCommand, RecordingRenderer, colors};
    use crate::sim::Rect;
    use glam::Vec2;

    fn leaf(sprite: SpriteComponent) -> GameObject {
        GameObject::new(EntityId(1), "Leaf")
            .with(BodyComponent::new(Vec2::new(100.0, 200.0), Vec2::splat(90.0)))
            .with(sprite)
    }

    #[test]
    fn test_draws_texture_through_view() {
        let obj = leaf(SpriteComponent::textured("leaf"));
        let view = View::new(Vec2::new(500.0, 400.0), Vec2::new(800.0, 600.0));
        let mut r = RecordingRenderer::new().with_textures(["leaf"]);

        obj.render(&mut r, &view);
        assert_eq!(
            r.commands(),
            &[DrawCommand::Texture {
                name: "leaf".into(),
                dest: Rect::new(0.0, 100.0, 90.0, 90.0),
                frame: None,
            }]
        );
    }

    #[test]
    fn test_missing_texture_falls_back_to_fill() {
        let obj = leaf(SpriteComponent::textured("leaf").with_fill(colors::LEAF));
        let view = View::default();
        let mut r = RecordingRenderer::new();

        obj.render(&mut r, &view);
        assert_eq!(r.count_rects(), 1);
    }

    #[test]
    fn test_missing_texture_without_fill_skips() {
        let obj = leaf(SpriteComponent::textured("leaf"));
        let mut r = RecordingRenderer::new();
        obj.render(&mut r, &View::default());
        assert!(r.commands().is_empty());
    }

    #[test]
    fn test_frame_follows_facing() {
        let player = GameObject::new(EntityId(2), "Player")
            .with(BodyComponent::new(Vec2::ZERO, Vec2::splat(100.0)))
            .with(crate::entity::ControllerComponent::new(
                150.0,
                ControlScheme::FourWay,
                Rect::new(0.0, 0.0, 800.0, 600.0),
            ))
            .with(SpriteComponent::textured("player").with_sheet(2, 2));
        let sprite = player.get::<SpriteComponent>().unwrap();
        assert_eq!(sprite.frame(&player), Some(SpriteFrame::new(0, 2, 2)));
        assert_eq!(SpriteFrame::new(3, 2, 2).cell(), (1, 1));
        assert_eq!(SpriteFrame::new(5, 2, 2).cell(), (1, 0));
    }
}
