//! Keyboard input
//!
//! Game code only sees the [`InputDevice`] trait. [`KeyboardState`] is fed
//! events by whatever owns the window (or by a script in headless runs) and
//! keeps the current and previous key sets so edges can be detected.

use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    A,
    D,
    W,
    S,
    Space,
    Enter,
    Escape,
}

/// Raw event from the windowing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    Quit,
}

pub trait InputDevice {
    /// Apply pending events for a new frame. Returns true if quit was requested.
    fn pump(&mut self) -> bool;

    fn is_key_down(&self, key: Key) -> bool;

    /// Went down this frame
    fn is_key_pressed(&self, key: Key) -> bool;

    /// Went up this frame
    fn is_key_released(&self, key: Key) -> bool;
}

#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    current: HashSet<Key>,
    previous: HashSet<Key>,
    pending: VecDeque<InputEvent>,
    quit: bool,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next `pump`
    pub fn push_event(&mut self, event: InputEvent) {
        self.pending.push_back(event);
    }

    /// Hold `key` immediately (no pump needed)
    pub fn press(&mut self, key: Key) {
        self.current.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.current.remove(&key);
    }

    pub fn release_all(&mut self) {
        self.current.clear();
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }
}

impl InputDevice for KeyboardState {
    fn pump(&mut self) -> bool {
        self.previous.clone_from(&self.current);
        while let Some(event) = self.pending.pop_front() {
            match event {
                InputEvent::KeyDown(key) => {
                    self.current.insert(key);
                }
                InputEvent::KeyUp(key) => {
                    self.current.remove(&key);
                }
                InputEvent::Quit => self.quit = true,
            }
        }
        if self.current.contains(&Key::Escape) {
            self.quit = true;
        }
        self.quit
    }

    fn is_key_down(&self, key: Key) -> bool {
        self.current.contains(&key)
    }

    fn is_key_pressed(&self, key: Key) -> bool {
        self.current.contains(&key) && !self.previous.contains(&key)
    }

    fn is_key_released(&self, key: Key) -> bool {
        !self.current.contains(&key) && self.previous.contains(&key)
    }
}
