//! Macrodata Core - Grid Production Engine
//!
//! A grid of animated digits hides polyomino "targets". The player pans and
//! zooms over the grid, hovers every cell of a target, opens the storage box
//! for its category and confirms; the target's digits fly into the box and
//! its cells regenerate.
//!
//! # Architecture
//!
//! Shapes live in a `hecs` ECS world:
//! - **Entities**: one per shape still on the grid
//! - **Components**: `Shape`, `Footprint`, `Selection`, the `Completed` marker
//! - **Systems**: hover selection, the transfer pipeline, cell spawn phases,
//!   the help pulse
//!
//! The digit matrix, viewport and storage boxes are plain values owned by
//! [`engine::GridEngine`], the only writer of session state.
//!
//! # Example
//!
//! ```rust,no_run
//! use macrodata_core::prelude::*;
//!
//! let mut engine = GridEngine::new(SessionConfig::default()).unwrap();
//!
//! engine.handle_input(InputEvent::PointerMove { x: 120.0, y: 80.0 });
//! engine.handle_input(InputEvent::char_key('q'));
//! engine.handle_input(InputEvent::key(KeyCode::Space));
//!
//! loop {
//!     engine.update(1000.0 / 60.0); // 60 FPS
//!     for event in engine.drain_events() {
//!         println!("{:?}", event);
//!     }
//! }
//! ```

pub mod components;
pub mod engine;
pub mod events;
pub mod generation;
pub mod grid;
pub mod input;
pub mod persistence;
pub mod render;
pub mod systems;

pub use macrodata_logic as logic;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{EngineError, GridEngine};
    pub use crate::events::{Cue, EngineEvent, NoticeKind, ProgressListener};
    pub use crate::input::InputEvent;
    pub use crate::render::{CellHighlight, RenderState};
    pub use crate::systems::TransferPhase;
    pub use macrodata_logic::controls::{Command, KeyCode, PanDirection};
    pub use macrodata_logic::session::SessionConfig;
    pub use macrodata_logic::shapes::{CellPos, ShapeKind};
}
