//! Transfer pipeline - flies a confirmed shape's digits into its box.
//!
//! `Idle -> Armed -> Animating -> SettlingGrid -> Idle`. Only one transfer
//! is in flight at a time and an armed transfer always runs to completion.

use hecs::Entity;
use macrodata_logic::constants::timing::{LANDING_CUE_MS, TRANSFER_MS};
use macrodata_logic::shapes::{CellPos, ShapeKind};
use macrodata_logic::viewport::Viewport;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransferPhase {
    #[default]
    Idle,
    /// Confirmed; the flight starts on the next tick.
    Armed,
    Animating,
    /// Flight over, cells being regenerated.
    SettlingGrid,
}

/// One digit travelling from its cell to the open box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlyingDigit {
    /// `"{shape_id}-{index}"`
    pub id: String,
    pub digit: u8,
    pub start: (f32, f32),
    pub target: (f32, f32),
}

impl FlyingDigit {
    /// Screen position at `progress` in `[0, 1]`, eased in and out.
    pub fn position_at(&self, progress: f32) -> (f32, f32) {
        let t = ease_in_out(progress.clamp(0.0, 1.0));
        (
            self.start.0 + (self.target.0 - self.start.0) * t,
            self.start.1 + (self.target.1 - self.start.1) * t,
        )
    }
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// One flight per cell of the shape, starting at each cell's current screen
/// position and ending at `target`.
pub fn build_flight(
    shape_id: u32,
    cells: &[CellPos],
    grid: &Grid,
    viewport: &Viewport,
    target: (f32, f32),
) -> Vec<FlyingDigit> {
    cells
        .iter()
        .enumerate()
        .map(|(i, pos)| FlyingDigit {
            id: format!("{}-{}", shape_id, i),
            digit: grid.get(*pos).map(|c| c.digit).unwrap_or(0),
            start: viewport.cell_to_screen(*pos),
            target,
        })
        .collect()
}

/// The shape currently in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub entity: Entity,
    pub shape_id: u32,
    pub kind: ShapeKind,
    pub cells: Vec<CellPos>,
    pub digits: Vec<FlyingDigit>,
    pub started_at_ms: f64,
    landed: bool,
}

impl Transfer {
    pub fn new(
        entity: Entity,
        shape_id: u32,
        kind: ShapeKind,
        cells: Vec<CellPos>,
        digits: Vec<FlyingDigit>,
        started_at_ms: f64,
    ) -> Self {
        Self {
            entity,
            shape_id,
            kind,
            cells,
            digits,
            started_at_ms,
            landed: false,
        }
    }

    /// Fraction of the flight completed at `now_ms`.
    pub fn progress(&self, now_ms: f64) -> f32 {
        ((now_ms - self.started_at_ms) / TRANSFER_MS).clamp(0.0, 1.0) as f32
    }
}

/// What a pipeline tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferStep {
    Started,
    /// Halfway point reached.
    Landed,
    /// Flight over. The caller settles the grid, then calls
    /// [`TransferPipeline::finish`].
    Finished(Transfer),
}

#[derive(Debug, Clone, Default)]
pub struct TransferPipeline {
    phase: TransferPhase,
    active: Option<Transfer>,
}

impl TransferPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TransferPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == TransferPhase::Idle
    }

    pub fn active(&self) -> Option<&Transfer> {
        self.active.as_ref()
    }

    /// Accept a transfer. Refused unless idle.
    pub fn arm(&mut self, transfer: Transfer) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.active = Some(transfer);
        self.phase = TransferPhase::Armed;
        true
    }

    /// Advance to `now_ms`. Several steps may happen in one tick.
    pub fn tick(&mut self, now_ms: f64) -> Vec<TransferStep> {
        let mut steps = Vec::new();

        if self.phase == TransferPhase::Armed {
            self.phase = TransferPhase::Animating;
            steps.push(TransferStep::Started);
        }
        if self.phase != TransferPhase::Animating {
            return steps;
        }

        let Some(transfer) = self.active.as_mut() else {
            self.phase = TransferPhase::Idle;
            return steps;
        };
        let elapsed = now_ms - transfer.started_at_ms;
        if !transfer.landed && elapsed >= LANDING_CUE_MS {
            transfer.landed = true;
            steps.push(TransferStep::Landed);
        }
        if elapsed >= TRANSFER_MS {
            self.phase = TransferPhase::SettlingGrid;
            if let Some(done) = self.active.take() {
                steps.push(TransferStep::Finished(done));
            }
        }
        steps
    }

    /// Return to idle after the grid has been settled.
    pub fn finish(&mut self) {
        self.active = None;
        self.phase = TransferPhase::Idle;
    }
}
