//! Shape components - one entity per hidden target.

use hecs::Entity;
use macrodata_logic::shapes::{CellPos, ShapeKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Identity and category of a placed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub id: u32,
    pub kind: ShapeKind,
}

/// Absolute grid cells covered by a shape, in offset order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub cells: Vec<CellPos>,
}

impl Footprint {
    pub fn contains(&self, pos: CellPos) -> bool {
        self.cells.contains(&pos)
    }
}

/// Hover state of a shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub selected: bool,
    /// Cells hovered since the shape became selected.
    pub visited: BTreeSet<CellPos>,
}

impl Selection {
    pub fn clear(&mut self) {
        self.selected = false;
        self.visited.clear();
    }

    /// Every cell of `footprint` has been visited.
    pub fn is_ready(&self, footprint: &Footprint) -> bool {
        self.selected && self.visited.len() == footprint.cells.len()
    }
}

/// Marker: the shape has been confirmed and is in flight to its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completed;

/// Id allocation and id → entity lookup for live shapes.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    next_id: u32,
    by_id: HashMap<u32, Entity>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            by_id: HashMap::new(),
        }
    }

    /// Next unused id. Ids are never reused within a session.
    pub fn allocate(&mut self) -> u32 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub(crate) fn set_next_id(&mut self, next: u32) {
        self.next_id = next;
    }

    pub fn insert(&mut self, id: u32, entity: Entity) {
        self.by_id.insert(id, entity);
    }

    pub fn remove(&mut self, id: u32) -> Option<Entity> {
        self.by_id.remove(&id)
    }

    pub fn entity(&self, id: u32) -> Option<Entity> {
        self.by_id.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_requires_all_cells() {
        let footprint = Footprint {
            cells: vec![CellPos::new(0, 0), CellPos::new(0, 1)],
        };
        let mut sel = Selection {
            selected: true,
            ..Default::default()
        };
        sel.visited.insert(CellPos::new(0, 0));
        assert!(!sel.is_ready(&footprint));
        sel.visited.insert(CellPos::new(0, 1));
        assert!(sel.is_ready(&footprint));
        sel.clear();
        assert!(!sel.is_ready(&footprint));
    }

    #[test]
    fn test_registry_ids_monotonic() {
        let mut reg = ShapeRegistry::new();
        assert_eq!(reg.allocate(), 1);
        assert_eq!(reg.allocate(), 2);
        assert_eq!(reg.next_id(), 3);
    }

    #[test]
    fn test_default_registry_starts_at_one() {
        let mut reg = ShapeRegistry::default();
        assert_eq!(reg.allocate(), 1);
    }
}
