//! Shape placement - scatters non-overlapping polyominoes over the grid.
//!
//! Placement is category-major, instance-minor. Each instance gets a bounded
//! number of random anchors; an instance that never finds room is skipped and
//! reported, the session carries on with fewer targets of that category.

use hecs::{Entity, World};
use log::warn;
use macrodata_logic::constants::placement::MAX_ATTEMPTS;
use macrodata_logic::shapes::{CellPos, ShapeKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{Footprint, Selection, Shape, ShapeRegistry};
use crate::grid::Grid;

/// A shape instance that could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementShortfall {
    pub kind: ShapeKind,
    /// 1-based instance number within its category.
    pub instance: u32,
    pub attempts: u32,
}

/// Outcome of a placement run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementReport {
    pub requested: u32,
    pub placed: u32,
    /// Placed instances per category, in [`ShapeKind::ALL`] order.
    pub placed_per_kind: [u32; 5],
    pub shortfalls: Vec<PlacementShortfall>,
}

impl PlacementReport {
    pub fn is_complete(&self) -> bool {
        self.shortfalls.is_empty()
    }

    pub fn placed_of(&self, kind: ShapeKind) -> u32 {
        self.placed_per_kind[kind.box_index() as usize - 1]
    }

    fn record(&mut self, kind: ShapeKind) {
        self.placed += 1;
        self.placed_per_kind[kind.box_index() as usize - 1] += 1;
    }
}

/// Explicit placement that could not be honoured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("{kind} at {anchor} does not fit in a {rows}x{cols} grid")]
    OutOfBounds {
        kind: ShapeKind,
        anchor: CellPos,
        rows: u32,
        cols: u32,
    },
    #[error("{kind} at {anchor} overlaps shape #{other}")]
    Overlap {
        kind: ShapeKind,
        anchor: CellPos,
        other: u32,
    },
}

/// Spawn a shape entity over `cells` and mark the grid.
pub fn spawn_shape(
    world: &mut World,
    grid: &mut Grid,
    registry: &mut ShapeRegistry,
    kind: ShapeKind,
    cells: Vec<CellPos>,
) -> Entity {
    let id = registry.allocate();
    for pos in &cells {
        grid.assign(*pos, id);
    }
    let entity = world.spawn((Shape { id, kind }, Footprint { cells }, Selection::default()));
    registry.insert(id, entity);
    entity
}

/// Try to find a free anchor for `kind` with up to `max_attempts` random draws.
pub fn find_anchor(
    grid: &Grid,
    kind: ShapeKind,
    max_attempts: u32,
    rng: &mut impl Rng,
) -> Result<Vec<CellPos>, u32> {
    let (height, width) = kind.extent();
    if height > grid.rows() || width > grid.cols() {
        return Err(0);
    }
    for _ in 0..max_attempts {
        let anchor = CellPos::new(
            rng.gen_range(0..=grid.rows() - height),
            rng.gen_range(0..=grid.cols() - width),
        );
        if !kind.fits_at(anchor, grid.rows(), grid.cols()) {
            continue;
        }
        let cells = kind.cells_at(anchor);
        if cells.iter().all(|p| grid.is_free(*p)) {
            return Ok(cells);
        }
    }
    Err(max_attempts)
}

/// Place `shapes_per_category` instances of every category.
pub fn place_shapes(
    world: &mut World,
    grid: &mut Grid,
    registry: &mut ShapeRegistry,
    shapes_per_category: u32,
    rng: &mut impl Rng,
) -> PlacementReport {
    let mut report = PlacementReport {
        requested: shapes_per_category * ShapeKind::ALL.len() as u32,
        ..Default::default()
    };

    for kind in ShapeKind::ALL {
        for instance in 1..=shapes_per_category {
            match find_anchor(grid, kind, MAX_ATTEMPTS, rng) {
                Ok(cells) => {
                    spawn_shape(world, grid, registry, kind, cells);
                    report.record(kind);
                }
                Err(attempts) => {
                    warn!(
                        "Could not place shape '{}' instance {} after {} attempts",
                        kind, instance, attempts
                    );
                    report.shortfalls.push(PlacementShortfall {
                        kind,
                        instance,
                        attempts,
                    });
                }
            }
        }
    }

    report
}

/// Place one shape at an exact anchor.
pub fn place_at(
    world: &mut World,
    grid: &mut Grid,
    registry: &mut ShapeRegistry,
    kind: ShapeKind,
    anchor: CellPos,
) -> Result<Entity, LayoutError> {
    if !kind.fits_at(anchor, grid.rows(), grid.cols()) {
        return Err(LayoutError::OutOfBounds {
            kind,
            anchor,
            rows: grid.rows(),
            cols: grid.cols(),
        });
    }
    let cells = kind.cells_at(anchor);
    if let Some(other) = cells.iter().find_map(|p| grid.shape_at(*p)) {
        return Err(LayoutError::Overlap { kind, anchor, other });
    }
    Ok(spawn_shape(world, grid, registry, kind, cells))
}

/// Place an explicit list of `(kind, anchor)` pairs, all or nothing per entry.
pub fn place_layout(
    world: &mut World,
    grid: &mut Grid,
    registry: &mut ShapeRegistry,
    placements: &[(ShapeKind, CellPos)],
) -> Result<PlacementReport, LayoutError> {
    let mut report = PlacementReport {
        requested: placements.len() as u32,
        ..Default::default()
    };
    for (kind, anchor) in placements {
        place_at(world, grid, registry, *kind, *anchor)?;
        report.record(*kind);
    }
    Ok(report)
}
