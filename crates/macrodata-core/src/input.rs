//! Inbound events from the embedding UI.
//!
//! Pointer coordinates are relative to the top-left corner of the grid
//! container, in screen pixels.

use macrodata_logic::controls::KeyCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerMove { x: f32, y: f32 },
    /// Pointer left the grid container.
    PointerLeave,
    /// Drag by a screen-space delta.
    PointerDrag { dx: f32, dy: f32 },
    /// Wheel with the pointer as zoom focus. Positive `delta_y` zooms out.
    Wheel { x: f32, y: f32, delta_y: f32 },
    /// `repeat` is set for auto-repeat events of a held key.
    KeyDown { key: KeyCode, repeat: bool },
}

impl InputEvent {
    /// A fresh (non-repeat) key press.
    pub fn key(key: KeyCode) -> Self {
        InputEvent::KeyDown { key, repeat: false }
    }

    pub fn char_key(c: char) -> Self {
        Self::key(KeyCode::Char(c))
    }
}
