//! Stealth room: avoid the cameras, take the key, open the door
//!
//! Level 2 adds the color puzzle: carry each block onto the box of its
//! color. The level-2 key stays hidden and out of reach until every box
//! holds a matching block.

use glam::Vec2;

use super::session::GameSession;
use super::state::GameEvent;
use crate::consts::*;
use crate::entity::{Behavior, EntityId, GameObject, Prop, PuzzleColor, SpriteComponent};
use crate::factory::{SpawnParams, room_interior};
use crate::renderer::{Renderer, colors};
use crate::sim::Rect;

const PLAYER: &str = "Player";

/// Where a carried block sits relative to the player's top-left corner
const CARRY_OFFSET: Vec2 = Vec2::new(6.0, -5.0);

impl GameSession {
    pub(super) fn spawn_stealth_level(&mut self, level: usize) {
        self.clear_objects();

        let walls = [
            Rect::new(0.0, 0.0, SCREEN_WIDTH, WALL_THICKNESS),
            Rect::new(0.0, SCREEN_HEIGHT - WALL_THICKNESS, SCREEN_WIDTH, WALL_THICKNESS),
            Rect::new(0.0, 0.0, WALL_THICKNESS, SCREEN_HEIGHT),
            Rect::new(SCREEN_WIDTH - WALL_THICKNESS, 0.0, WALL_THICKNESS, SCREEN_HEIGHT),
        ];
        let mut spawns: Vec<(&str, SpawnParams)> = walls
            .iter()
            .map(|w| ("Wall", SpawnParams::at(w.x, w.y).with_size(w.w, w.h)))
            .collect();

        let door_pos = Vec2::new(
            SCREEN_WIDTH - WALL_THICKNESS - DOOR_WIDTH,
            SCREEN_HEIGHT / 2.0 - DOOR_HEIGHT / 2.0,
        );
        let sweep = self.config.camera_sweep_speed;

        if level == 0 {
            spawns.push(("SecurityCamera", SpawnParams::at(SCREEN_WIDTH - 100.0, 50.0).with_speed(sweep)));
            spawns.push(("Key", SpawnParams::at(400.0, 300.0)));
            spawns.push(("Door", SpawnParams::at(door_pos.x, door_pos.y)));
            spawns.push(("Player", SpawnParams::at(100.0, 100.0)));
        } else {
            let (px, py) = (200.0, 150.0);
            for (dx, color) in [(50.0, PuzzleColor::Red), (175.0, PuzzleColor::Blue), (300.0, PuzzleColor::Green)] {
                spawns.push(("ColorBox", SpawnParams::at(px + dx, py + 50.0).with_color(color)));
            }
            // Shuffled relative to the boxes
            for (dx, color) in [(180.0, PuzzleColor::Green), (55.0, PuzzleColor::Blue), (305.0, PuzzleColor::Red)] {
                spawns.push(("ColorBlock", SpawnParams::at(px + dx, py + 240.0).with_color(color)));
            }
            spawns.push(("Key", SpawnParams::at(400.0, 450.0)));
            spawns.push(("Door", SpawnParams::at(door_pos.x, door_pos.y).final_door()));
            spawns.push(("SecurityCamera", SpawnParams::at(100.0, 50.0).with_speed(sweep)));
            spawns.push((
                "SecurityCamera",
                SpawnParams::at(SCREEN_WIDTH - 100.0, SCREEN_HEIGHT - 100.0).with_speed(sweep),
            ));
            spawns.push(("Player", SpawnParams::at(80.0, SCREEN_HEIGHT - 150.0)));
        }

        for (name, params) in spawns {
            let params = if name == PLAYER {
                params.with_speed(self.config.player_speed).with_bounds(room_interior())
            } else {
                params
            };
            if let Err(e) = self.spawn(name, &params) {
                log::warn!("Level {} incomplete: {e}", level + 1);
            }
        }

        // The puzzle key appears once the puzzle is solved
        if self.has_puzzle() {
            self.set_key_visible(false);
        }

        self.view.set_bounds(Rect::new(0.0, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT));
        log::info!("Stealth level {} ready", level + 1);
    }

    /// Load the level queued by a door on the previous tick
    pub(super) fn stealth_progress(&mut self) {
        if let Some(next) = self.state.pending_level {
            self.spawn_stealth_level(next);
            self.state.enter_stealth_level(next);
        }
    }

    fn has_puzzle(&self) -> bool {
        self.objects
            .iter()
            .any(|o| matches!(o.prop(), Some(Prop::ColorBox { .. })))
    }

    fn set_key_visible(&mut self, visible: bool) {
        for obj in &mut self.objects {
            if obj.prop().is_some_and(Prop::is_key) {
                if let Some(sprite) = obj.get_mut::<SpriteComponent>() {
                    sprite.visible = visible;
                }
            }
        }
    }

    pub(super) fn stealth_rules(&mut self) {
        let Some(player) = self.find_named(PLAYER).and_then(GameObject::rect) else {
            return;
        };

        // Cameras
        let spotted = self.objects.iter().find_map(|o| {
            let sweep = o.get::<Behavior>().and_then(Behavior::as_sweep)?;
            (o.is_active() && sweep.sees(&player)).then(|| o.id())
        });
        if let Some(camera) = spotted {
            self.state.caught(camera);
            return;
        }

        let puzzle = self.has_puzzle();
        if puzzle {
            self.update_puzzle(player);
        }

        // Key
        let key_allowed = !puzzle || self.state.puzzle_solved;
        if key_allowed && !self.state.has_key {
            let key = self.objects.iter().find(|o| {
                o.is_active()
                    && matches!(o.prop(), Some(Prop::Key { collected: false }))
                    && o.rect().is_some_and(|r| r.overlaps(&player))
            });
            if let Some(id) = key.map(GameObject::id) {
                if let Some(obj) = self.find_mut(id) {
                    if let Some(Prop::Key { collected }) = obj.prop_mut() {
                        *collected = true;
                    }
                    obj.set_active(false);
                }
                self.state.has_key = true;
                self.state.push_event(GameEvent::KeyCollected);
                log::info!("Key collected");
            }
        }

        // Door
        if self.state.has_key {
            let door = self.objects.iter_mut().find(|o| {
                matches!(o.prop(), Some(Prop::Door { opened: false, .. }))
                    && o.rect().is_some_and(|r| r.overlaps(&player))
            });
            if let Some(Prop::Door { opened, final_door }) = door.and_then(GameObject::prop_mut) {
                *opened = true;
                let final_door = *final_door;
                self.state.push_event(GameEvent::DoorOpened { final_door });
                if final_door {
                    self.state.win();
                } else {
                    self.state.pending_level = Some(self.state.level + 1);
                    log::info!("Door opened, on to level {}", self.state.level + 2);
                }
            }
        }

        self.view.follow(player.center(), 0.1);
    }

    fn update_puzzle(&mut self, player: Rect) {
        if self.state.puzzle_solved {
            return;
        }
        let boxes: Vec<(PuzzleColor, Rect)> = self
            .objects
            .iter()
            .filter_map(|o| match (o.prop(), o.rect()) {
                (Some(Prop::ColorBox { target }), Some(rect)) => Some((*target, rect)),
                _ => None,
            })
            .collect();

        if let Some(id) = self.state.carried {
            self.carry_block(id, player, &boxes);
        } else {
            let picked = self.objects.iter().find(|o| {
                matches!(o.prop(), Some(Prop::ColorBlock { placed: false, .. }))
                    && o.rect().is_some_and(|r| r.overlaps(&player))
            });
            if let Some(id) = picked.map(GameObject::id) {
                self.state.carried = Some(id);
                self.state.push_event(GameEvent::BlockPicked(id));
                log::info!("Picked up block {id}");
            }
        }

        let solved = boxes.iter().all(|(color, rect)| {
            self.objects.iter().any(|o| {
                matches!(o.prop(), Some(Prop::ColorBlock { color: c, .. }) if c == color)
                    && o.rect().is_some_and(|b| rect.contains_point(b.center()))
            })
        });
        if solved {
            self.state.puzzle_solved = true;
            self.state.carried = None;
            self.set_key_visible(true);
            self.state.push_event(GameEvent::PuzzleSolved);
            log::info!("Puzzle solved!");
        }
    }

    /// Move the carried block with the player; drop it into its box when
    /// the player's center is over the box
    fn carry_block(&mut self, id: EntityId, player: Rect, boxes: &[(PuzzleColor, Rect)]) {
        let Some(block) = self.objects.iter_mut().find(|o| o.id() == id) else {
            self.state.carried = None;
            return;
        };
        let color = block.prop().and_then(Prop::color);
        let Some(body) = block.body_mut() else {
            self.state.carried = None;
            return;
        };
        body.set_position(player.pos() + CARRY_OFFSET);

        let target = boxes
            .iter()
            .find(|(c, rect)| Some(*c) == color && rect.contains_point(player.center()));
        let Some((_, target)) = target else {
            return;
        };

        let snapped = target.pos() + (target.size() - body.size()) * 0.5;
        body.set_position(snapped);
        if let Some(Prop::ColorBlock { placed, .. }) = block.prop_mut() {
            *placed = true;
        }
        self.state.carried = None;
        self.state.push_event(GameEvent::BlockPlaced(id));
        log::info!("Block {id} locked in place");
    }

    pub(super) fn render_stealth_overlay(&self, renderer: &mut dyn Renderer) {
        // Vision cones: origin plus dots along both edges
        for obj in &self.objects {
            let Some(sweep) = obj.get::<Behavior>().and_then(Behavior::as_sweep) else {
                continue;
            };
            let origin = sweep.origin();
            let (left, right) = sweep.cone.edges();
            for edge in [left, right] {
                for i in 1..=8 {
                    let p = origin + (edge - origin) * (i as f32 / 8.0);
                    let dot = Rect::from_pos_size(p - Vec2::splat(2.0), Vec2::splat(4.0));
                    renderer.draw_rect(self.view.world_rect_to_screen(dot), colors::VISION);
                }
            }
        }

        let key = if self.state.has_key { "Key: yes" } else { "Key: no" };
        renderer.draw_text(key, Vec2::new(40.0, 40.0), colors::TEXT);
        let level = format!("Level: {}", self.state.level + 1);
        renderer.draw_text(&level, Vec2::new(SCREEN_WIDTH - 140.0, 40.0), colors::TEXT);

        if self.has_puzzle() {
            let text = if self.state.puzzle_solved {
                "SOLVED! Get the key!"
            } else {
                "Carry blocks into matching boxes"
            };
            renderer.draw_text(text, Vec2::new(230.0, 160.0), colors::TEXT);
        }
    }
}
