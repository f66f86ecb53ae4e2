//! Demo AI: plays either mode by queueing keyboard events
//!
//! Runs before the input pump each frame. It only reads the session, so the
//! game itself cannot tell a scripted player from a real one.

use glam::Vec2;

use super::session::GameSession;
use super::state::GamePhase;
use crate::consts::*;
use crate::entity::{GameObject, Prop};
use crate::platform::{InputDevice, InputEvent, Key, KeyboardState};
use crate::settings::GameMode;

/// Keys the AI holds rather than taps
const HELD_KEYS: [Key; 5] = [Key::Left, Key::Right, Key::Up, Key::Down, Key::Space];

/// Close enough on an axis to stop steering
const DEADZONE: f32 = 4.0;

/// Queue the key changes the AI wants for the next frame
pub fn autopilot(session: &GameSession, keys: &mut KeyboardState) {
    let mut wanted: Vec<Key> = Vec::new();

    match session.phase() {
        GamePhase::TitleScreen | GamePhase::GameOver | GamePhase::YouWin => {
            tap(keys, Key::Enter);
        }
        GamePhase::Playing => match session.mode() {
            GameMode::AcornDrop => {
                if shooter_keys(session, &mut wanted) == Some(true) {
                    wanted.push(Key::Space);
                }
            }
            GameMode::Stealth => stealth_keys(session, &mut wanted),
        },
    }

    for key in HELD_KEYS {
        let want = wanted.contains(&key);
        if want && !keys.is_key_down(key) {
            keys.push_event(InputEvent::KeyDown(key));
        } else if !want && keys.is_key_down(key) {
            keys.push_event(InputEvent::KeyUp(key));
        }
    }
}

/// Press on one frame, release on the next
fn tap(keys: &mut KeyboardState, key: Key) {
    if keys.is_key_down(key) {
        keys.push_event(InputEvent::KeyUp(key));
    } else {
        keys.push_event(InputEvent::KeyDown(key));
    }
}

fn steer_x(from: f32, to: f32, wanted: &mut Vec<Key>) {
    if to - from > DEADZONE {
        wanted.push(Key::Right);
    } else if from - to > DEADZONE {
        wanted.push(Key::Left);
    }
}

/// Lead the leaf and fire when lined up. Returns whether to fire.
fn shooter_keys(session: &GameSession, wanted: &mut Vec<Key>) -> Option<bool> {
    let squirrel = session.find_named("Squirrel")?.rect()?;
    let leaf = session
        .objects()
        .iter()
        .find(|o| o.is_active() && matches!(o.name(), "Leaf" | "PhysicsLeaf"))?;
    let leaf_rect = leaf.rect()?;
    let leaf_vel = leaf.body()?.velocity();

    // Time for an acorn to fall to the leaf, ignoring bounces
    let drop = (leaf_rect.center().y - squirrel.bottom()).max(0.0);
    let t = drop / ACORN_SPEED;
    let target_x = (leaf_rect.center().x + leaf_vel.x * t).clamp(0.0, SCREEN_WIDTH);

    let from = squirrel.center().x;
    steer_x(from, target_x, wanted);
    Some((target_x - from).abs() < LEAF_SIZE * 0.25)
}

/// Walk to whatever the level needs next. Cameras are not avoided.
fn stealth_keys(session: &GameSession, wanted: &mut Vec<Key>) {
    let Some(player) = session.find_named("Player").and_then(GameObject::rect) else {
        return;
    };
    let Some(target) = stealth_target(session) else {
        return;
    };

    let from = player.center();
    steer_x(from.x, target.x, wanted);
    if target.y - from.y > DEADZONE {
        wanted.push(Key::Down);
    } else if from.y - target.y > DEADZONE {
        wanted.push(Key::Up);
    }
}

fn center_of(session: &GameSession, pred: impl Fn(&Prop) -> bool) -> Option<Vec2> {
    session
        .objects()
        .iter()
        .filter(|o| o.is_active() && o.prop().is_some_and(&pred))
        .find_map(GameObject::rect)
        .map(|r| r.center())
}

fn stealth_target(session: &GameSession) -> Option<Vec2> {
    let state = session.state();
    let puzzle = session
        .objects()
        .iter()
        .any(|o| matches!(o.prop(), Some(Prop::ColorBox { .. })));
    if puzzle && !state.puzzle_solved {
        return match state.carried.and_then(|id| session.find(id)) {
            Some(block) => {
                let color = block.prop().and_then(Prop::color)?;
                center_of(session, |p| matches!(p, Prop::ColorBox { target } if *target == color))
            }
            None => center_of(session, |p| matches!(p, Prop::ColorBlock { placed: false, .. })),
        };
    }

    if !state.has_key {
        center_of(session, |p| matches!(p, Prop::Key { collected: false }))
    } else {
        center_of(session, |p| matches!(p, Prop::Door { opened: false, .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;

    fn frame(session: &mut GameSession, keys: &mut KeyboardState) {
        autopilot(session, keys);
        keys.pump();
        session.tick(&*keys, FRAME_DT);
    }

    #[test]
    fn test_autopilot_starts_game() {
        let mut session = GameSession::new(GameConfig::default());
        let mut keys = KeyboardState::new();
        frame(&mut session, &mut keys);
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_autopilot_fires_at_leaf() {
        let mut session = GameSession::new(GameConfig::default());
        let mut keys = KeyboardState::new();
        let ammo = session.state().ammo;
        for _ in 0..600 {
            frame(&mut session, &mut keys);
            if session.state().ammo < ammo {
                break;
            }
        }
        assert!(session.state().ammo < ammo);
    }

    #[test]
    fn test_autopilot_walks_toward_key() {
        let config = GameConfig {
            mode: GameMode::Stealth,
            ..Default::default()
        };
        let mut session = GameSession::new(config);
        let mut keys = KeyboardState::new();
        frame(&mut session, &mut keys);

        let start = session.find_named("Player").and_then(GameObject::rect).unwrap();
        for _ in 0..30 {
            frame(&mut session, &mut keys);
        }
        let now = session.find_named("Player").and_then(GameObject::rect).unwrap();

        // Key sits down and to the right of the start
        assert!(now.x > start.x);
        assert!(now.y > start.y);
    }
}
