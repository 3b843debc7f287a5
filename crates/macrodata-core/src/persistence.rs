//! Save/Load functionality for session snapshots
//!
//! Uses bincode for compact binary serialization of a whole session.
//! Shape components are serialized per entity then respawned on load.
//! Hover, notices, the transfer pipeline and timers are not saved.

use hecs::{Entity, World};
use log::info;
use macrodata_logic::session::SessionConfig;
use macrodata_logic::shapes::CellPos;
use macrodata_logic::storage::StorageBank;
use macrodata_logic::viewport::{ScreenRect, Viewport};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use thiserror::Error;

use crate::components::*;
use crate::engine::GridEngine;
use crate::generation::PlacementReport;
use crate::grid::Grid;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a session
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub config: SessionConfig,
    pub grid: Grid,
    pub viewport: Viewport,
    pub storage: StorageBank,
    pub report: PlacementReport,
    /// Next shape id to allocate
    pub next_shape_id: u32,
    pub box_anchors: [Option<ScreenRect>; 5],
    pub overall_fired: bool,
    pub clock_ms: f64,
    /// All shape entities with their components
    pub shapes: Vec<SerializableShape>,
}

/// One shape entity in serializable form
#[derive(Serialize, Deserialize)]
pub struct SerializableShape {
    pub shape: Shape,
    pub footprint: Footprint,
    /// In flight at save time
    pub completed: bool,
}

/// Extract all shape entities from a world
fn serialize_shapes(world: &World) -> Vec<SerializableShape> {
    let mut shapes: Vec<SerializableShape> = world
        .query::<(&Shape, &Footprint, Option<&Completed>)>()
        .iter()
        .map(|(_, (shape, footprint, completed))| SerializableShape {
            shape: *shape,
            footprint: footprint.clone(),
            completed: completed.is_some(),
        })
        .collect();
    shapes.sort_by_key(|s| s.shape.id);
    shapes
}

/// Save a session to a writer
pub fn save_session<W: Write>(mut writer: W, engine: &GridEngine) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        config: engine.config.clone(),
        grid: engine.grid.clone(),
        viewport: engine.viewport.clone(),
        storage: engine.storage.clone(),
        report: engine.report.clone(),
        next_shape_id: engine.registry.next_id(),
        box_anchors: engine.box_anchors,
        overall_fired: engine.overall_fired,
        clock_ms: engine.clock_ms,
        shapes: serialize_shapes(&engine.world),
    };

    bincode::serialize_into(&mut writer, &save_data)?;
    writer.flush()?;
    info!(
        "Session saved: {} shapes, {}% complete",
        save_data.shapes.len(),
        engine.overall_percent()
    );
    Ok(())
}

/// Load a session from a reader
pub fn load_session<R: Read>(reader: R) -> Result<LoadedSession, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut world = World::new();
    let mut registry = ShapeRegistry::new();
    let mut in_flight = Vec::new();
    let shape_count = save_data.shapes.len();

    for saved in save_data.shapes {
        let id = saved.shape.id;
        let cells = saved.footprint.cells.clone();
        let entity = world.spawn((saved.shape, saved.footprint, Selection::default()));
        registry.insert(id, entity);
        if saved.completed {
            in_flight.push((entity, id, cells));
        }
    }
    registry.set_next_id(save_data.next_shape_id);

    info!("Session loaded: {} shapes", shape_count);

    Ok(LoadedSession {
        config: save_data.config,
        world,
        registry,
        grid: save_data.grid,
        viewport: save_data.viewport,
        storage: save_data.storage,
        report: save_data.report,
        box_anchors: save_data.box_anchors,
        overall_fired: save_data.overall_fired,
        clock_ms: save_data.clock_ms,
        in_flight,
    })
}

/// Result of loading a session
pub struct LoadedSession {
    pub config: SessionConfig,
    pub world: World,
    pub registry: ShapeRegistry,
    pub grid: Grid,
    pub viewport: Viewport,
    pub storage: StorageBank,
    pub report: PlacementReport,
    pub box_anchors: [Option<ScreenRect>; 5],
    pub overall_fired: bool,
    pub clock_ms: f64,
    /// Shapes that were mid-transfer and still need settling
    pub in_flight: Vec<(Entity, u32, Vec<CellPos>)>,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;
    use macrodata_logic::controls::Command;
    use macrodata_logic::shapes::ShapeKind;
    use crate::systems::TransferPhase;

    fn engine() -> GridEngine {
        let config = SessionConfig {
            rows: 12,
            cols: 12,
            shapes_per_category: 1,
            seed: Some(3),
            ..SessionConfig::default()
        };
        GridEngine::from_layout(
            config,
            &[
                (ShapeKind::Rectangle, CellPos::new(0, 0)),
                (ShapeKind::HLine, CellPos::new(5, 4)),
            ],
        )
        .unwrap()
    }

    fn hover(engine: &mut GridEngine, pos: CellPos) {
        let (x, y) = engine.viewport().cell_center(pos);
        engine.handle_input(InputEvent::PointerMove { x, y });
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut engine = engine();
        engine.command(Command::ToggleBox(5));
        engine.update(250.0);

        let mut save_buffer = Vec::new();
        engine.save(&mut save_buffer).expect("Save failed");

        let mut loaded = self::engine();
        loaded.load(&save_buffer[..]).expect("Load failed");

        assert_eq!(loaded.shapes().len(), 2);
        assert_eq!(loaded.clock_ms(), 250.0);
        assert!(loaded.storage().is_open_for(ShapeKind::HLine));
        assert_eq!(loaded.grid().occupied_count(), 8);
        let digits: Vec<u8> = engine.grid().iter().map(|(_, c)| c.digit).collect();
        let loaded_digits: Vec<u8> = loaded.grid().iter().map(|(_, c)| c.digit).collect();
        assert_eq!(digits, loaded_digits);
    }

    #[test]
    fn test_in_flight_shape_settles_on_load() {
        let mut engine = engine();
        for pos in ShapeKind::Rectangle.cells_at(CellPos::new(0, 0)) {
            hover(&mut engine, pos);
        }
        engine.command(Command::ToggleBox(4));
        engine.command(Command::Confirm);
        assert_eq!(engine.transfer_phase(), TransferPhase::Armed);

        let mut save_buffer = Vec::new();
        engine.save(&mut save_buffer).unwrap();
        let mut loaded = self::engine();
        loaded.load(&save_buffer[..]).unwrap();

        assert_eq!(loaded.transfer_phase(), TransferPhase::Idle);
        assert_eq!(loaded.shapes().len(), 1);
        assert_eq!(loaded.grid().shape_at(CellPos::new(0, 0)), None);
        assert_eq!(loaded.storage().get(4).unwrap().percent(), 100.0);
    }

    #[test]
    fn test_version_mismatch() {
        let engine = engine();
        let mut save_buffer = Vec::new();
        engine.save(&mut save_buffer).unwrap();
        // version is the leading little-endian u32
        save_buffer[0] = 99;

        let mut loaded = self::engine();
        match loaded.load(&save_buffer[..]) {
            Err(SaveError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, SAVE_VERSION);
                assert_eq!(found, 99);
            }
            other => panic!("expected version mismatch, got {:?}", other.err()),
        }
    }
}
