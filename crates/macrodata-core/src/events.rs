//! Outbound events - what the engine reports back to the embedding UI.
//!
//! Every event is queued (see [`crate::engine::GridEngine::drain_events`])
//! and, when a [`ProgressListener`] is installed, dispatched to it as it
//! happens.

use macrodata_logic::shapes::ShapeKind;
use serde::{Deserialize, Serialize};

/// Cosmetic audio cue. Never emitted while the engine is muted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// A cell of the selected shape was hovered for the first time.
    FirstVisit,
    /// A transfer is halfway to its box.
    Landing,
    /// Every box reached 100%.
    Win,
}

/// Transient message shown after a rejected action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeKind {
    /// The "open hovered box" key was pressed with no shape under the pointer.
    NoShapeHovered,
    /// Confirm on a ready shape whose box is not the open one.
    WrongContainer,
    /// Confirm with no shape selected.
    NothingSelected,
}

impl NoticeKind {
    pub fn message(self) -> &'static str {
        match self {
            NoticeKind::NoShapeHovered => {
                "Please hover the cursor over data that needs to be refined."
            }
            NoticeKind::WrongContainer => "Incorrect storage unit is open.",
            NoticeKind::NothingSelected => "No data is selected for refinement.",
        }
    }
}

/// A notice currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    /// Engine clock time at which the notice disappears.
    pub expires_at_ms: f64,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        self.kind.message()
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Something that happened inside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A shape was confirmed into its box. Fired once per transfer.
    ShapeCompleted { kind: ShapeKind, shape_id: u32 },
    /// All five boxes are full. Fired once per session.
    OverallComplete,
    Cue(Cue),
    Notice(NoticeKind),
    BoxToggled { index: u8, open: bool },
    /// A help pulse started for the shapes of `kind`.
    HelpPulse { kind: ShapeKind },
    /// A transfer ended; the shape's cells were regenerated.
    ShapeSettled { shape_id: u32 },
}

/// Callback interface for the embedding UI. Every method defaults to a no-op.
pub trait ProgressListener {
    fn on_shape_completed(&mut self, _kind: ShapeKind) {}

    fn on_overall_complete(&mut self) {}

    fn on_cue(&mut self, _cue: Cue) {}

    fn on_notice(&mut self, _notice: NoticeKind) {}
}

/// Forward one event to the matching listener method.
pub(crate) fn dispatch(listener: &mut dyn ProgressListener, event: &EngineEvent) {
    match event {
        EngineEvent::ShapeCompleted { kind, .. } => listener.on_shape_completed(*kind),
        EngineEvent::OverallComplete => listener.on_overall_complete(),
        EngineEvent::Cue(cue) => listener.on_cue(*cue),
        EngineEvent::Notice(kind) => listener.on_notice(*kind),
        EngineEvent::BoxToggled { .. }
        | EngineEvent::HelpPulse { .. }
        | EngineEvent::ShapeSettled { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tally {
        completed: Vec<ShapeKind>,
        overall: u32,
        cues: Vec<Cue>,
    }

    impl ProgressListener for Tally {
        fn on_shape_completed(&mut self, kind: ShapeKind) {
            self.completed.push(kind);
        }

        fn on_overall_complete(&mut self) {
            self.overall += 1;
        }

        fn on_cue(&mut self, cue: Cue) {
            self.cues.push(cue);
        }
    }

    #[test]
    fn test_dispatch_routes_by_variant() {
        let mut tally = Tally::default();
        dispatch(
            &mut tally,
            &EngineEvent::ShapeCompleted {
                kind: ShapeKind::T,
                shape_id: 4,
            },
        );
        dispatch(&mut tally, &EngineEvent::OverallComplete);
        dispatch(&mut tally, &EngineEvent::Cue(Cue::Landing));
        dispatch(&mut tally, &EngineEvent::ShapeSettled { shape_id: 4 });
        assert_eq!(tally.completed, vec![ShapeKind::T]);
        assert_eq!(tally.overall, 1);
        assert_eq!(tally.cues, vec![Cue::Landing]);
    }

    #[test]
    fn test_notice_expiry() {
        let notice = Notice {
            kind: NoticeKind::WrongContainer,
            expires_at_ms: 2000.0,
        };
        assert!(!notice.is_expired(1999.0));
        assert!(notice.is_expired(2000.0));
        assert_eq!(notice.message(), "Incorrect storage unit is open.");
    }
}
