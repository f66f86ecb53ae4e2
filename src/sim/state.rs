//! Game state and progression
//!
//! Counters and phase only. Entities live in the session; this struct is
//! what the rules read and write every tick.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::settings::{GameConfig, GameMode, LevelConfig};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for Enter/Space
    TitleScreen,
    /// Active gameplay
    Playing,
    /// Run lost (out of ammo, or caught by a camera)
    GameOver,
    /// Final level cleared
    YouWin,
}

impl GamePhase {
    pub fn is_finished(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::YouWin)
    }
}

/// Something that happened during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    AcornFired { ammo_left: u32 },
    Hit { hits: u32, hits_to_win: u32 },
    LevelUp { level: usize },
    OutOfAmmo,
    KeyCollected,
    DoorOpened { final_door: bool },
    Caught { camera: EntityId },
    BlockPicked(EntityId),
    BlockPlaced(EntityId),
    PuzzleSolved,
    Won,
}

/// Outcome of a progression check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelProgress {
    Continue,
    /// Entered this (0-based) level; the caller spawns it
    NextLevel(usize),
    Won,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub mode: GameMode,
    pub phase: GamePhase,
    /// Current level index (0-based)
    pub level: usize,
    pub hits: u32,
    pub hits_to_win: u32,
    pub ammo: u32,
    pub score: u64,
    /// Seconds until the next shot is allowed
    pub cooldown: f32,
    /// Simulation tick counter
    pub time_ticks: u64,

    // === Stealth ===
    pub has_key: bool,
    /// Puzzle block following the player
    pub carried: Option<EntityId>,
    pub puzzle_solved: bool,
    /// Level to load on the next tick (door just opened)
    pub pending_level: Option<usize>,

    /// Events from the current tick
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(mode: GameMode, first_level: &LevelConfig) -> Self {
        Self {
            mode,
            phase: GamePhase::TitleScreen,
            level: 0,
            hits: 0,
            hits_to_win: first_level.hits_to_win,
            ammo: first_level.ammo,
            score: 0,
            cooldown: 0.0,
            time_ticks: 0,
            has_key: false,
            carried: None,
            puzzle_solved: false,
            pending_level: None,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub(crate) fn clear_events(&mut self) {
        self.events.clear();
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// TitleScreen -> Playing
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::TitleScreen {
            return false;
        }
        self.phase = GamePhase::Playing;
        self.push_event(GameEvent::Started);
        log::info!("Game started ({})", self.mode.as_str());
        true
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Spend one acorn if the cooldown allows it
    pub fn try_fire(&mut self, cooldown: f32) -> bool {
        if !self.is_playing() || self.cooldown > 0.0 || self.ammo == 0 {
            return false;
        }
        self.ammo -= 1;
        self.cooldown = cooldown;
        self.push_event(GameEvent::AcornFired {
            ammo_left: self.ammo,
        });
        true
    }

    pub fn tick_cooldown(&mut self, dt: f32) {
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
        }
    }

    pub fn register_hit(&mut self) {
        self.hits += 1;
        self.score += 1;
        self.push_event(GameEvent::Hit {
            hits: self.hits,
            hits_to_win: self.hits_to_win,
        });
        log::info!("Hit! Points: {}/{}", self.hits, self.hits_to_win);
    }

    /// Advance once the hit threshold was reached on an earlier tick.
    ///
    /// Hits are reset on transition, so the check fires exactly once per
    /// level. On the last level the game is won instead.
    pub fn check_level_progress(&mut self, config: &GameConfig) -> LevelProgress {
        if !self.is_playing() || self.hits < self.hits_to_win {
            return LevelProgress::Continue;
        }
        if self.level + 1 >= config.level_count() {
            self.phase = GamePhase::YouWin;
            self.push_event(GameEvent::Won);
            log::info!("All levels cleared, score {}", self.score);
            return LevelProgress::Won;
        }

        self.level += 1;
        let next = config.level(self.level);
        self.hits = 0;
        self.hits_to_win = next.hits_to_win;
        self.ammo = next.ammo;
        self.cooldown = 0.0;
        self.push_event(GameEvent::LevelUp { level: self.level });
        log::info!(
            "Level {} ({} hits to win, {} acorns)",
            self.level + 1,
            self.hits_to_win,
            self.ammo
        );
        LevelProgress::NextLevel(self.level)
    }

    /// Out of acorns with nothing left in flight and the level unfinished
    pub fn check_out_of_ammo(&mut self, in_flight: bool) -> bool {
        if !self.is_playing() || self.ammo > 0 || in_flight || self.hits >= self.hits_to_win {
            return false;
        }
        self.phase = GamePhase::GameOver;
        self.push_event(GameEvent::OutOfAmmo);
        log::info!("Game Over! You ran out of nuts");
        true
    }

    /// Stealth: enter `level`, dropping per-level progress
    pub fn enter_stealth_level(&mut self, level: usize) {
        self.level = level;
        self.has_key = false;
        self.carried = None;
        self.puzzle_solved = false;
        self.pending_level = None;
        self.push_event(GameEvent::LevelUp { level });
    }

    pub fn caught(&mut self, camera: EntityId) {
        if !self.is_playing() {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.push_event(GameEvent::Caught { camera });
        log::info!("Caught by camera {camera}! You Lose!");
    }

    pub fn win(&mut self) {
        if !self.is_playing() {
            return;
        }
        self.phase = GamePhase::YouWin;
        self.push_event(GameEvent::Won);
        log::info!("You Win!");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> (GameState, GameConfig) {
        let config = GameConfig::default();
        let mut state = GameState::new(GameMode::AcornDrop, &config.level(0));
        state.start();
        (state, config)
    }

    #[test]
    fn test_title_to_playing_once() {
        let config = GameConfig::default();
        let mut state = GameState::new(GameMode::AcornDrop, &config.level(0));
        assert_eq!(state.phase, GamePhase::TitleScreen);
        assert!(state.start());
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.start());
        assert_eq!(state.events(), &[GameEvent::Started]);
    }

    #[test]
    fn test_level_transition_fires_exactly_once() {
        let (mut state, config) = playing();
        for _ in 0..5 {
            state.register_hit();
        }

        assert_eq!(state.check_level_progress(&config), LevelProgress::NextLevel(1));
        assert_eq!(state.hits, 0);
        assert_eq!(state.hits_to_win, 8);
        assert_eq!(state.ammo, 12);

        // Repeated checks without new hits do nothing
        assert_eq!(state.check_level_progress(&config), LevelProgress::Continue);
        assert_eq!(state.check_level_progress(&config), LevelProgress::Continue);
        assert_eq!(state.level, 1);
        assert_eq!(
            state
                .events()
                .iter()
                .filter(|e| matches!(e, GameEvent::LevelUp { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_last_level_wins() {
        let (mut state, config) = playing();
        state.level = 1;
        state.hits_to_win = 8;
        state.hits = 8;
        assert_eq!(state.check_level_progress(&config), LevelProgress::Won);
        assert_eq!(state.phase, GamePhase::YouWin);
        assert_eq!(state.check_level_progress(&config), LevelProgress::Continue);
    }

    #[test]
    fn test_fire_respects_cooldown_and_ammo() {
        let (mut state, _) = playing();
        state.ammo = 2;
        assert!(state.try_fire(0.3));
        assert!(!state.try_fire(0.3));
        state.tick_cooldown(0.2);
        assert!(!state.try_fire(0.3));
        state.tick_cooldown(0.2);
        assert!(state.try_fire(0.3));
        state.tick_cooldown(1.0);
        assert!(!state.try_fire(0.3));
        assert_eq!(state.ammo, 0);
    }

    #[test]
    fn test_out_of_ammo_waits_for_flight() {
        let (mut state, _) = playing();
        state.ammo = 0;
        assert!(!state.check_out_of_ammo(true));
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.check_out_of_ammo(false));
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_out_of_ammo_not_lost_when_threshold_met() {
        let (mut state, _) = playing();
        state.ammo = 0;
        state.hits = state.hits_to_win;
        assert!(!state.check_out_of_ammo(false));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_caught_ends_game_once() {
        let (mut state, _) = playing();
        state.caught(EntityId(4));
        state.caught(EntityId(5));
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(
            state.events().last(),
            Some(&GameEvent::Caught { camera: EntityId(4) })
        );
    }
}
