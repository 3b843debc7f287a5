//! Property-based invariant tests for shape placement and selection.
//!
//! 1. No two shapes share a cell; every cell is in bounds.
//! 2. Placed + skipped instances always add up to the request.
//! 3. A shape is ready iff every one of its cells was hovered in one pass.

use std::collections::HashSet;

use hecs::World;
use macrodata_core::components::{Footprint, Shape, ShapeRegistry};
use macrodata_core::generation::place_shapes;
use macrodata_core::grid::Grid;
use macrodata_core::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ═════════════════════════════════════════════════════════════════════════
// 1 + 2. placement
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn shapes_never_overlap_and_stay_in_bounds(
        rows in 1u32..40,
        cols in 1u32..40,
        per_category in 1u32..8,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = Grid::new(rows, cols, &mut rng);
        let mut world = World::new();
        let mut registry = ShapeRegistry::new();
        let report = place_shapes(&mut world, &mut grid, &mut registry, per_category, &mut rng);

        prop_assert_eq!(report.placed + report.shortfalls.len() as u32, report.requested);

        let mut seen = HashSet::new();
        let mut ids = HashSet::new();
        for (_, (shape, footprint)) in world.query::<(&Shape, &Footprint)>().iter() {
            prop_assert!(ids.insert(shape.id));
            prop_assert_eq!(footprint.cells.len(), shape.kind.cell_count());
            for pos in &footprint.cells {
                prop_assert!(pos.row < rows && pos.col < cols);
                prop_assert!(seen.insert(*pos), "cell {} shared", pos);
                prop_assert_eq!(grid.shape_at(*pos), Some(shape.id));
            }
        }
        prop_assert_eq!(grid.occupied_count(), seen.len());
        prop_assert_eq!(ids.len() as u32, report.placed);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. readiness
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ready_iff_all_cells_visited(
        kind_index in 0usize..5,
        visit_mask in 0u8..32,
    ) {
        let kind = ShapeKind::ALL[kind_index];
        let anchor = CellPos::new(1, 1);
        let config = SessionConfig {
            rows: 8,
            cols: 8,
            shapes_per_category: 1,
            seed: Some(1),
            ..SessionConfig::default()
        };
        let mut engine = GridEngine::from_layout(config, &[(kind, anchor)]).unwrap();
        let cells = kind.cells_at(anchor);

        let mut visited = 0;
        for (i, pos) in cells.iter().enumerate() {
            if visit_mask & (1 << i) != 0 {
                let (x, y) = engine.viewport().cell_center(*pos);
                engine.handle_input(InputEvent::PointerMove { x, y });
                visited += 1;
            }
        }

        let ready = engine.selected_shape().is_some_and(|s| s.is_ready());
        prop_assert_eq!(ready, visited == cells.len());
    }
}
