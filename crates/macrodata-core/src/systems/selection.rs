//! Selection system - hover drives which shape is selected and which of its
//! cells have been visited.

use std::collections::BTreeSet;

use hecs::{Entity, World};
use macrodata_logic::shapes::{CellPos, ShapeKind};

use crate::components::{Completed, Footprint, Selection, Shape};
use crate::grid::Grid;

/// Result of one hover update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverOutcome {
    /// Shape selected after the update.
    pub selected: Option<u32>,
    /// The hovered cell was added to the selected shape's visited set.
    pub first_visit: bool,
}

/// Apply a hover over `cell` (`None` = off-grid or pointer left).
///
/// The shape under the pointer becomes the only selected shape and records
/// the cell as visited. Every other shape, and every shape when nothing
/// selectable is hovered, loses its selection and visits. Completed shapes
/// are never selected.
pub fn hover_system(world: &mut World, grid: &Grid, cell: Option<CellPos>) -> HoverOutcome {
    let target = cell.and_then(|pos| grid.shape_at(pos).map(|id| (pos, id)));
    let mut outcome = HoverOutcome::default();

    for (_, (shape, selection, completed)) in
        world.query_mut::<(&Shape, &mut Selection, Option<&Completed>)>()
    {
        match target {
            Some((pos, id)) if id == shape.id && completed.is_none() => {
                selection.selected = true;
                outcome.selected = Some(id);
                outcome.first_visit = selection.visited.insert(pos);
            }
            _ => {
                if selection.selected || !selection.visited.is_empty() {
                    selection.clear();
                }
            }
        }
    }

    outcome
}

/// Read-only view of one shape entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeSnapshot {
    pub entity: Entity,
    pub id: u32,
    pub kind: ShapeKind,
    pub cells: Vec<CellPos>,
    pub selected: bool,
    pub completed: bool,
    pub visited: BTreeSet<CellPos>,
}

impl ShapeSnapshot {
    /// Selected with every cell visited.
    pub fn is_ready(&self) -> bool {
        self.selected && self.visited.len() == self.cells.len()
    }
}

/// Every shape still on the grid, ordered by id.
pub fn shape_snapshots(world: &World) -> Vec<ShapeSnapshot> {
    let mut shapes: Vec<ShapeSnapshot> = world
        .query::<(&Shape, &Footprint, &Selection, Option<&Completed>)>()
        .iter()
        .map(|(entity, (shape, footprint, selection, completed))| ShapeSnapshot {
            entity,
            id: shape.id,
            kind: shape.kind,
            cells: footprint.cells.clone(),
            selected: selection.selected,
            completed: completed.is_some(),
            visited: selection.visited.clone(),
        })
        .collect();
    shapes.sort_by_key(|s| s.id);
    shapes
}

/// The selected shape, if any.
pub fn selected_shape(world: &World) -> Option<ShapeSnapshot> {
    world
        .query::<(&Shape, &Footprint, &Selection)>()
        .without::<&Completed>()
        .iter()
        .find(|(_, (_, _, selection))| selection.selected)
        .map(|(entity, (shape, footprint, selection))| ShapeSnapshot {
            entity,
            id: shape.id,
            kind: shape.kind,
            cells: footprint.cells.clone(),
            selected: true,
            completed: false,
            visited: selection.visited.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ShapeRegistry;
    use crate::generation::place_at;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn world_with_two_shapes() -> (World, Grid) {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = Grid::new(10, 10, &mut rng);
        let mut world = World::new();
        let mut reg = ShapeRegistry::new();
        // rectangle #1 at (0,0)..(1,1), hline #2 at row 5 cols 2..5
        place_at(&mut world, &mut grid, &mut reg, ShapeKind::Rectangle, CellPos::new(0, 0)).unwrap();
        place_at(&mut world, &mut grid, &mut reg, ShapeKind::HLine, CellPos::new(5, 2)).unwrap();
        (world, grid)
    }

    #[test]
    fn test_hover_selects_and_visits() {
        let (mut world, grid) = world_with_two_shapes();
        let out = hover_system(&mut world, &grid, Some(CellPos::new(0, 1)));
        assert_eq!(out, HoverOutcome { selected: Some(1), first_visit: true });

        let again = hover_system(&mut world, &grid, Some(CellPos::new(0, 1)));
        assert!(!again.first_visit);

        let sel = selected_shape(&world).unwrap();
        assert_eq!(sel.id, 1);
        assert_eq!(sel.visited.len(), 1);
        assert!(!sel.is_ready());
    }

    #[test]
    fn test_ready_after_all_cells() {
        let (mut world, grid) = world_with_two_shapes();
        for pos in ShapeKind::Rectangle.cells_at(CellPos::new(0, 0)) {
            hover_system(&mut world, &grid, Some(pos));
        }
        assert!(selected_shape(&world).unwrap().is_ready());
    }

    #[test]
    fn test_moving_to_other_shape_clears_first() {
        let (mut world, grid) = world_with_two_shapes();
        hover_system(&mut world, &grid, Some(CellPos::new(0, 0)));
        hover_system(&mut world, &grid, Some(CellPos::new(1, 1)));
        hover_system(&mut world, &grid, Some(CellPos::new(5, 3)));

        let shapes = shape_snapshots(&world);
        assert!(!shapes[0].selected);
        assert!(shapes[0].visited.is_empty());
        assert!(shapes[1].selected);
        assert_eq!(shapes[1].visited.len(), 1);
    }

    #[test]
    fn test_hover_empty_or_off_grid_clears_all() {
        let (mut world, grid) = world_with_two_shapes();
        hover_system(&mut world, &grid, Some(CellPos::new(0, 0)));
        let out = hover_system(&mut world, &grid, Some(CellPos::new(9, 9)));
        assert_eq!(out.selected, None);
        assert!(selected_shape(&world).is_none());

        hover_system(&mut world, &grid, Some(CellPos::new(0, 0)));
        hover_system(&mut world, &grid, None);
        assert!(shape_snapshots(&world).iter().all(|s| s.visited.is_empty()));
    }

    #[test]
    fn test_completed_shape_not_selectable() {
        let (mut world, grid) = world_with_two_shapes();
        let entity = shape_snapshots(&world)[0].entity;
        world.insert_one(entity, Completed).unwrap();
        let out = hover_system(&mut world, &grid, Some(CellPos::new(0, 0)));
        assert_eq!(out.selected, None);
        assert!(shape_snapshots(&world)[0].completed);
    }
}
