//! Render snapshot - everything a UI needs to draw one frame.
//!
//! Built on demand from engine state; holding one never affects the session.

use std::collections::{BTreeSet, HashMap};

use macrodata_logic::shapes::{CellPos, ShapeKind};
use macrodata_logic::viewport::ScreenRect;
use serde::{Deserialize, Serialize};

use crate::components::{Completed, Selection, Shape};
use crate::engine::GridEngine;
use crate::events::NoticeKind;
use crate::systems::TransferPhase;

/// Highlight class of a cell relative to the hovered cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellHighlight {
    Normal,
    /// Diagonal neighbour of the hovered cell.
    Diagonal,
    /// Orthogonal neighbour of the hovered cell.
    Orthogonal,
    /// The hovered cell, or any cell of the selected shape.
    Hover,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub pos: CellPos,
    pub digit: u8,
    /// Container-relative screen rectangle.
    pub rect: ScreenRect,
    pub highlight: CellHighlight,
    /// False while the cell's digit is in flight.
    pub visible: bool,
    /// Wobble suspended (cell belongs to the selected shape).
    pub is_static: bool,
    pub visited: bool,
    pub pulsing: bool,
    pub spawning: bool,
    pub wobble_duration: f32,
    pub wobble_delay: f32,
    pub spawn_duration: f32,
    pub spawn_delay: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxView {
    pub index: u8,
    pub kind: ShapeKind,
    pub open: bool,
    pub percent: f32,
    pub anchor: ScreenRect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlyingDigitView {
    pub id: String,
    pub digit: u8,
    pub x: f32,
    pub y: f32,
    /// Flight progress in `[0, 1]`.
    pub progress: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    pub scale: f32,
    pub offset: (f32, f32),
    pub cells: Vec<CellView>,
    pub boxes: Vec<BoxView>,
    pub flying: Vec<FlyingDigitView>,
    pub notice: Option<NoticeKind>,
    pub notice_message: Option<String>,
    pub overall_percent: u32,
    pub phase: TransferPhase,
}

struct ShapeState {
    kind: ShapeKind,
    selected: bool,
    completed: bool,
    visited: BTreeSet<CellPos>,
}

fn highlight_for(pos: CellPos, hovered: Option<CellPos>, in_selected: bool) -> CellHighlight {
    if in_selected {
        return CellHighlight::Hover;
    }
    match hovered {
        Some(h) if h == pos => CellHighlight::Hover,
        Some(h) if pos.is_orthogonal_to(&h) => CellHighlight::Orthogonal,
        Some(h) if pos.is_diagonal_to(&h) => CellHighlight::Diagonal,
        _ => CellHighlight::Normal,
    }
}

impl GridEngine {
    /// Snapshot of the current frame.
    pub fn render_state(&self) -> RenderState {
        let now = self.clock_ms;
        let shapes: HashMap<u32, ShapeState> = self
            .world
            .query::<(&Shape, &Selection, Option<&Completed>)>()
            .iter()
            .map(|(_, (shape, selection, completed))| {
                (
                    shape.id,
                    ShapeState {
                        kind: shape.kind,
                        selected: selection.selected,
                        completed: completed.is_some(),
                        visited: selection.visited.clone(),
                    },
                )
            })
            .collect();
        let pulsing_kind = self.help_pulse.active(now);

        let cells: Vec<CellView> = self
            .grid
            .iter()
            .map(|(pos, cell)| {
                let shape = cell.shape_id.and_then(|id| shapes.get(&id));
                let in_selected = shape.is_some_and(|s| s.selected);
                CellView {
                    pos,
                    digit: cell.digit,
                    rect: self.viewport.cell_rect(pos),
                    highlight: highlight_for(pos, self.hovered, in_selected),
                    visible: !shape.is_some_and(|s| s.completed),
                    is_static: in_selected,
                    visited: shape.is_some_and(|s| s.selected && s.visited.contains(&pos)),
                    pulsing: shape
                        .is_some_and(|s| !s.completed && Some(s.kind) == pulsing_kind),
                    spawning: cell.is_spawning(),
                    wobble_duration: cell.wobble_duration,
                    wobble_delay: cell.wobble_delay,
                    spawn_duration: cell.spawn_duration,
                    spawn_delay: cell.spawn_delay,
                }
            })
            .collect();

        let boxes: Vec<BoxView> = self
            .storage
            .boxes()
            .iter()
            .map(|b| BoxView {
                index: b.index(),
                kind: b.kind(),
                open: b.is_open(),
                percent: b.percent(),
                anchor: self.box_anchor(b.index()),
            })
            .collect();

        let flying: Vec<FlyingDigitView> = self
            .pipeline
            .active()
            .filter(|_| self.pipeline.phase() == TransferPhase::Animating)
            .map(|transfer| {
                let progress = transfer.progress(now);
                transfer
                    .digits
                    .iter()
                    .map(|d| {
                        let (x, y) = d.position_at(progress);
                        FlyingDigitView {
                            id: d.id.clone(),
                            digit: d.digit,
                            x,
                            y,
                            progress,
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        RenderState {
            scale: self.viewport.scale(),
            offset: self.viewport.offset(),
            cells,
            boxes,
            flying,
            notice: self.notice.map(|n| n.kind),
            notice_message: self.notice.map(|n| n.message().to_string()),
            overall_percent: self.storage.overall_percent(),
            phase: self.pipeline.phase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;
    use macrodata_logic::controls::Command;
    use macrodata_logic::session::SessionConfig;

    fn engine() -> GridEngine {
        let config = SessionConfig {
            rows: 8,
            cols: 8,
            shapes_per_category: 1,
            seed: Some(5),
            ..SessionConfig::default()
        };
        GridEngine::from_layout(config, &[(ShapeKind::T, CellPos::new(3, 3))]).unwrap()
    }

    fn hover(engine: &mut GridEngine, pos: CellPos) {
        let (x, y) = engine.viewport().cell_center(pos);
        engine.handle_input(InputEvent::PointerMove { x, y });
    }

    fn cell(state: &RenderState, row: u32, col: u32) -> &CellView {
        let pos = CellPos::new(row, col);
        state.cells.iter().find(|c| c.pos == pos).unwrap()
    }

    #[test]
    fn test_neighbourhood_highlight() {
        let mut engine = engine();
        hover(&mut engine, CellPos::new(0, 1));
        let state = engine.render_state();
        assert_eq!(cell(&state, 0, 1).highlight, CellHighlight::Hover);
        assert_eq!(cell(&state, 1, 1).highlight, CellHighlight::Orthogonal);
        assert_eq!(cell(&state, 0, 0).highlight, CellHighlight::Orthogonal);
        assert_eq!(cell(&state, 1, 2).highlight, CellHighlight::Diagonal);
        assert_eq!(cell(&state, 2, 1).highlight, CellHighlight::Normal);
    }

    #[test]
    fn test_selected_shape_cells_are_hover_and_static() {
        let mut engine = engine();
        // T occupies (3,3) (3,4) (3,5) (4,4)
        hover(&mut engine, CellPos::new(3, 3));
        let state = engine.render_state();
        let far = cell(&state, 4, 4);
        assert_eq!(far.highlight, CellHighlight::Hover);
        assert!(far.is_static);
        assert!(!far.visited);
        assert!(cell(&state, 3, 3).visited);
        assert!(!cell(&state, 0, 0).is_static);
    }

    #[test]
    fn test_in_flight_digits_hidden_and_flying() {
        let mut engine = engine();
        for pos in ShapeKind::T.cells_at(CellPos::new(3, 3)) {
            hover(&mut engine, pos);
        }
        engine.command(Command::ToggleBox(3));
        engine.command(Command::Confirm);
        engine.update(600.0);

        let state = engine.render_state();
        assert_eq!(state.phase, TransferPhase::Animating);
        assert!(!cell(&state, 3, 3).visible);
        assert!(cell(&state, 0, 0).visible);
        assert_eq!(state.flying.len(), 4);
        assert_eq!(state.flying[0].id, "1-0");
        assert!((state.flying[0].progress - 0.5).abs() < 1e-6);
        let target = engine.box_anchor(3).center();
        assert_ne!((state.flying[0].x, state.flying[0].y), target);
    }

    #[test]
    fn test_boxes_and_notice() {
        let mut engine = engine();
        engine.command(Command::Confirm);
        let state = engine.render_state();
        assert_eq!(state.boxes.len(), 5);
        assert_eq!(state.boxes[2].kind, ShapeKind::T);
        assert_eq!(state.notice, Some(NoticeKind::NothingSelected));
        assert_eq!(
            state.notice_message.as_deref(),
            Some("No data is selected for refinement.")
        );
        assert_eq!(state.overall_percent, 0);
    }

    #[test]
    fn test_pulsing_cells_follow_open_box() {
        let mut engine = engine();
        engine.command(Command::ToggleBox(3));
        let interval = f64::from(engine.config().help_pulse_interval_ms);
        engine.update(interval);
        let state = engine.render_state();
        assert!(cell(&state, 4, 4).pulsing);
        assert!(!cell(&state, 0, 0).pulsing);

        engine.update(1500.0);
        assert!(!cell(&engine.render_state(), 4, 4).pulsing);
    }
}
