//! Input state tracking and the per-tick snapshot events read from.
//!
//! - **Level-triggered (held):** a key counts every tick it is physically down.
//! - **Edge-triggered (just_pressed):** true only for the first tick after the
//!   press. `end_frame()` clears edges once a tick has consumed them, so a press
//!   landing on a frame with zero simulation steps is not lost.
//!
//! Events never see `InputState` directly. The loop hands them an
//! `InputSnapshot`, which stays frozen for the whole tick.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    /// Placeholder held by freshly created key events.
    Unbound,
    Left,
    Right,
    Up,
    Down,
    Space,
    Enter,
    Escape,
    W,
    A,
    S,
    D,
    R,
}

impl Key {
    pub const ALL: &'static [Key] = &[
        Key::Unbound,
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::Space,
        Key::Enter,
        Key::Escape,
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::R,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Unbound => "Unbound",
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Space => "Space",
            Self::Enter => "Enter",
            Self::Escape => "Escape",
            Self::W => "W",
            Self::A => "A",
            Self::S => "S",
            Self::D => "D",
            Self::R => "R",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.label() == label)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseBtn {
    Left,
    Right,
    Middle,
}

impl MouseBtn {
    pub fn label(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Middle => "Middle",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Left" => Some(Self::Left),
            "Right" => Some(Self::Right),
            "Middle" => Some(Self::Middle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouseClick {
    pub x: f64,
    pub y: f64,
    pub button: MouseBtn,
}

/// Frozen view of the input devices for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pub held: BTreeSet<Key>,
    pub just_pressed: BTreeSet<Key>,
    pub last_pressed: Option<Key>,
    pub click: Option<MouseClick>,
}

impl InputSnapshot {
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Convenience for replays and tests: every key listed is both held and
    /// freshly pressed.
    pub fn pressing(keys: &[Key]) -> Self {
        let held: BTreeSet<Key> = keys.iter().copied().collect();
        Self {
            just_pressed: held.clone(),
            last_pressed: keys.last().copied(),
            held,
            click: None,
        }
    }
}

pub struct InputState {
    held: BTreeSet<Key>,
    just_pressed: BTreeSet<Key>,
    last_pressed: Option<Key>,
    click: Option<MouseClick>,
    pub mouse_position: (f64, f64),
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: BTreeSet::new(),
            just_pressed: BTreeSet::new(),
            last_pressed: None,
            click: None,
            mouse_position: (0.0, 0.0),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
            self.last_pressed = Some(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Registers a click at the current mouse position.
    pub fn mouse_down(&mut self, button: MouseBtn) {
        self.click = Some(MouseClick {
            x: self.mouse_position.0,
            y: self.mouse_position.1,
            button,
        });
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn last_pressed(&self) -> Option<Key> {
        self.last_pressed
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            held: self.held.clone(),
            just_pressed: self.just_pressed.clone(),
            last_pressed: self.last_pressed,
            click: self.click,
        }
    }

    /// Drops edge-triggered state. Call only after a tick consumed it.
    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.click = None;
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
