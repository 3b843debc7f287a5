//! Keyboard controls - key codes, engine commands and the bindings between them.

use serde::{Deserialize, Serialize};

use crate::constants::viewport::PAN_STEP;

/// A key as reported by the embedding UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Char(char),
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
}

impl KeyCode {
    /// Letters compare case-insensitively.
    fn normalized(self) -> KeyCode {
        match self {
            KeyCode::Char(' ') => KeyCode::Space,
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanDirection {
    Left,
    Right,
    Up,
    Down,
}

impl PanDirection {
    /// Offset change for one key press. Panning left reveals content on the
    /// left, so the content itself moves right.
    pub fn delta(self) -> (f32, f32) {
        match self {
            PanDirection::Left => (PAN_STEP, 0.0),
            PanDirection::Right => (-PAN_STEP, 0.0),
            PanDirection::Up => (0.0, PAN_STEP),
            PanDirection::Down => (0.0, -PAN_STEP),
        }
    }
}

/// Something the engine can be told to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Toggle storage box `1..=5`.
    ToggleBox(u8),
    /// Open the box matching the shape under the pointer.
    OpenHoveredBox,
    /// Transfer the selected shape into the open box.
    Confirm,
    Pan(PanDirection),
}

/// Key → command table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    /// Toggle keys for boxes 1..=5, in order.
    pub box_keys: [KeyCode; 5],
    pub open_hovered: KeyCode,
    pub confirm: KeyCode,
    pub pan_left: KeyCode,
    pub pan_right: KeyCode,
    pub pan_up: KeyCode,
    pub pan_down: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            box_keys: [
                KeyCode::Char('a'),
                KeyCode::Char('s'),
                KeyCode::Char('d'),
                KeyCode::Char('f'),
                KeyCode::Char('g'),
            ],
            open_hovered: KeyCode::Char('q'),
            confirm: KeyCode::Space,
            pan_left: KeyCode::ArrowLeft,
            pan_right: KeyCode::ArrowRight,
            pan_up: KeyCode::ArrowUp,
            pan_down: KeyCode::ArrowDown,
        }
    }
}

impl KeyBindings {
    pub fn resolve(&self, key: KeyCode) -> Option<Command> {
        let key = key.normalized();
        if let Some(i) = self.box_keys.iter().position(|k| k.normalized() == key) {
            return Some(Command::ToggleBox(i as u8 + 1));
        }
        let table = [
            (self.open_hovered, Command::OpenHoveredBox),
            (self.confirm, Command::Confirm),
            (self.pan_left, Command::Pan(PanDirection::Left)),
            (self.pan_right, Command::Pan(PanDirection::Right)),
            (self.pan_up, Command::Pan(PanDirection::Up)),
            (self.pan_down, Command::Pan(PanDirection::Down)),
        ];
        table
            .iter()
            .find(|(k, _)| k.normalized() == key)
            .map(|(_, cmd)| *cmd)
    }

    /// Every bound key, for duplicate detection.
    pub fn all_keys(&self) -> Vec<KeyCode> {
        let mut keys: Vec<KeyCode> = self.box_keys.iter().map(|k| k.normalized()).collect();
        keys.extend(
            [
                self.open_hovered,
                self.confirm,
                self.pan_left,
                self.pan_right,
                self.pan_up,
                self.pan_down,
            ]
            .iter()
            .map(|k| k.normalized()),
        );
        keys
    }
}
