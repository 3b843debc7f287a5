//! Grid model - the digit matrix and its cell-to-shape associations.
//!
//! Cells are stored row-major. Each cell carries its own randomised
//! animation timing and an explicit [`AnimationPhase`] that the engine
//! advances on its clock, so a refreshed cell replays its spawn animation
//! without any identity churn on the rendering side.

use macrodata_logic::constants::cell_timing;
use macrodata_logic::shapes::CellPos;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Spawn animation state of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnimationPhase {
    /// Spawn animation running until the given engine clock time (ms).
    Spawning { until_ms: f64 },
    /// Spawn done; the cell wobbles idly.
    Settled,
}

/// One digit cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub digit: u8,
    /// Idle wobble timing (seconds).
    pub wobble_duration: f32,
    pub wobble_delay: f32,
    /// Spawn animation timing (seconds).
    pub spawn_duration: f32,
    pub spawn_delay: f32,
    /// Shape occupying this cell, if any.
    pub shape_id: Option<u32>,
    pub phase: AnimationPhase,
}

fn random_in(rng: &mut impl Rng, (min, max): (f32, f32)) -> f32 {
    rng.gen_range(min..max)
}

impl Cell {
    fn random(rng: &mut impl Rng, now_ms: f64) -> Self {
        let mut cell = Self {
            digit: rng.gen_range(0..10),
            wobble_duration: random_in(rng, cell_timing::WOBBLE_DURATION),
            wobble_delay: random_in(rng, cell_timing::WOBBLE_DELAY),
            spawn_duration: random_in(rng, cell_timing::SPAWN_DURATION),
            spawn_delay: random_in(rng, cell_timing::SPAWN_DELAY),
            shape_id: None,
            phase: AnimationPhase::Settled,
        };
        cell.phase = cell.spawn_phase(now_ms);
        cell
    }

    /// Fresh digit and spawn timing; wobble timing is kept.
    fn respawn(&mut self, rng: &mut impl Rng, now_ms: f64) {
        self.digit = rng.gen_range(0..10);
        self.spawn_duration = random_in(rng, cell_timing::SPAWN_DURATION);
        self.spawn_delay = random_in(rng, cell_timing::RESPAWN_DELAY);
        self.shape_id = None;
        self.phase = self.spawn_phase(now_ms);
    }

    fn spawn_phase(&self, now_ms: f64) -> AnimationPhase {
        let total_ms = (self.spawn_delay + self.spawn_duration) as f64 * 1000.0;
        AnimationPhase::Spawning {
            until_ms: now_ms + total_ms,
        }
    }

    pub fn is_spawning(&self) -> bool {
        matches!(self.phase, AnimationPhase::Spawning { .. })
    }
}

/// Row-major matrix of cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    rows: u32,
    cols: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Fill a `rows × cols` grid with independently randomised cells.
    pub fn new(rows: u32, cols: u32, rng: &mut impl Rng) -> Self {
        let cells = (0..rows as usize * cols as usize)
            .map(|_| Cell::random(rng, 0.0))
            .collect();
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    fn index(&self, pos: CellPos) -> Option<usize> {
        if pos.row < self.rows && pos.col < self.cols {
            Some(pos.row as usize * self.cols as usize + pos.col as usize)
        } else {
            None
        }
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        self.index(pos).is_some()
    }

    pub fn get(&self, pos: CellPos) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, pos: CellPos) -> Option<&mut Cell> {
        self.index(pos).map(move |i| &mut self.cells[i])
    }

    pub fn shape_at(&self, pos: CellPos) -> Option<u32> {
        self.get(pos).and_then(|c| c.shape_id)
    }

    /// In bounds and not occupied by a shape.
    pub fn is_free(&self, pos: CellPos) -> bool {
        self.get(pos).is_some_and(|c| c.shape_id.is_none())
    }

    /// Mark a cell as belonging to `shape_id`. Out-of-range positions are ignored.
    pub fn assign(&mut self, pos: CellPos, shape_id: u32) {
        if let Some(cell) = self.get_mut(pos) {
            cell.shape_id = Some(shape_id);
        }
    }

    /// Regenerate digit and spawn timing for exactly `positions` and clear
    /// their shape association.
    pub fn refresh_cells(&mut self, positions: &[CellPos], now_ms: f64, rng: &mut impl Rng) {
        for pos in positions {
            if let Some(i) = self.index(*pos) {
                self.cells[i].respawn(rng, now_ms);
            }
        }
    }

    /// All cells with their positions, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (CellPos, &Cell)> {
        let cols = self.cols;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let i = i as u32;
            (CellPos::new(i / cols, i % cols), cell)
        })
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.shape_id.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_create_grid_ranges() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = Grid::new(12, 9, &mut rng);
        assert_eq!(grid.iter().count(), 108);
        for (_, cell) in grid.iter() {
            assert!(cell.digit <= 9);
            assert!((4.0..8.0).contains(&cell.wobble_duration));
            assert!((0.0..3.0).contains(&cell.wobble_delay));
            assert!((1.0..4.0).contains(&cell.spawn_duration));
            assert!((0.5..3.5).contains(&cell.spawn_delay));
            assert!(cell.shape_id.is_none());
            assert!(cell.is_spawning());
        }
    }

    #[test]
    fn test_iter_positions_row_major() {
        let mut rng = StdRng::seed_from_u64(2);
        let grid = Grid::new(2, 3, &mut rng);
        let positions: Vec<_> = grid.iter().map(|(p, _)| p).collect();
        assert_eq!(positions[0], CellPos::new(0, 0));
        assert_eq!(positions[2], CellPos::new(0, 2));
        assert_eq!(positions[3], CellPos::new(1, 0));
    }

    #[test]
    fn test_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let grid = Grid::new(4, 5, &mut rng);
        assert!(grid.get(CellPos::new(3, 4)).is_some());
        assert!(grid.get(CellPos::new(4, 0)).is_none());
        assert!(grid.get(CellPos::new(0, 5)).is_none());
        assert!(!grid.is_free(CellPos::new(9, 9)));
    }

    #[test]
    fn test_refresh_only_touches_given_cells() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut grid = Grid::new(5, 5, &mut rng);
        let target = [CellPos::new(1, 1), CellPos::new(1, 2)];
        for p in &target {
            grid.assign(*p, 7);
        }
        grid.assign(CellPos::new(3, 3), 8);
        let untouched = grid.get(CellPos::new(3, 3)).cloned();

        grid.refresh_cells(&target, 5000.0, &mut rng);

        for p in &target {
            let cell = grid.get(*p).unwrap();
            assert_eq!(cell.shape_id, None);
            assert!((0.0..1.0).contains(&cell.spawn_delay));
            match cell.phase {
                AnimationPhase::Spawning { until_ms } => assert!(until_ms > 5000.0),
                AnimationPhase::Settled => panic!("refreshed cell should respawn"),
            }
        }
        assert_eq!(grid.get(CellPos::new(3, 3)).cloned(), untouched);
        assert_eq!(grid.occupied_count(), 1);
    }
}
