//! Animation system - advances per-cell spawn phases on the engine clock

use crate::grid::{AnimationPhase, Grid};

/// Move every cell whose spawn animation has ended to `Settled`.
/// Returns the number of cells settled.
pub fn spawn_phase_system(grid: &mut Grid, now_ms: f64) -> usize {
    let mut settled = 0;
    for cell in grid.cells_mut() {
        if let AnimationPhase::Spawning { until_ms } = cell.phase {
            if now_ms >= until_ms {
                cell.phase = AnimationPhase::Settled;
                settled += 1;
            }
        }
    }
    settled
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrodata_logic::shapes::CellPos;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cells_settle_after_spawn() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut grid = Grid::new(3, 3, &mut rng);
        // longest initial spawn is 3.5s delay + 4s duration
        assert_eq!(spawn_phase_system(&mut grid, 0.0), 0);
        assert_eq!(spawn_phase_system(&mut grid, 7500.0), 9);
        assert!(grid.iter().all(|(_, c)| !c.is_spawning()));
        assert_eq!(spawn_phase_system(&mut grid, 9000.0), 0);
    }

    #[test]
    fn test_refreshed_cell_respawns() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = Grid::new(2, 2, &mut rng);
        spawn_phase_system(&mut grid, 10_000.0);
        grid.refresh_cells(&[CellPos::new(1, 1)], 10_000.0, &mut rng);
        assert!(grid.get(CellPos::new(1, 1)).unwrap().is_spawning());
        assert_eq!(spawn_phase_system(&mut grid, 10_000.0), 0);
        // respawn is at most 1s delay + 4s duration
        assert_eq!(spawn_phase_system(&mut grid, 15_000.0), 1);
    }
}
