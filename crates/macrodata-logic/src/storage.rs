//! Storage boxes - five containers, one per shape category.
//!
//! At most one box is open at a time: opening a box closes the others.
//! Progress only moves through [`StorageBank::record_completion`].
//!
//! ```
//! use macrodata_logic::shapes::ShapeKind;
//! use macrodata_logic::storage::{IncrementPolicy, StorageBank};
//!
//! let mut bank = StorageBank::new(2, IncrementPolicy::Exact);
//! bank.toggle_open(4).unwrap();
//! assert!(bank.is_open_for(ShapeKind::Rectangle));
//! bank.record_completion(ShapeKind::Rectangle);
//! assert_eq!(bank.get(4).unwrap().percent(), 50.0);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::layout::{BOX_WIDTH_FRACTION, FOOTER_HEIGHT};
use crate::constants::CATEGORY_COUNT;
use crate::shapes::ShapeKind;
use crate::viewport::ScreenRect;

/// How the per-completion percentage step is derived from the shape count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncrementPolicy {
    /// `100 / shapes_per_category`, unrounded.
    #[default]
    Exact,
    /// `100 / shapes_per_category` rounded up to two decimals when more than
    /// one shape per category exists.
    CeilHundredths,
}

impl IncrementPolicy {
    pub fn step(self, shapes_per_category: u32) -> f32 {
        let n = shapes_per_category.max(1);
        let raw = 100.0 / n as f32;
        match self {
            IncrementPolicy::Exact => raw,
            IncrementPolicy::CeilHundredths if n > 1 => (raw * 100.0).ceil() / 100.0,
            IncrementPolicy::CeilHundredths => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("no storage box with index {0} (expected 1..=5)")]
    InvalidBox(u8),
}

/// One storage container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageBox {
    index: u8,
    kind: ShapeKind,
    open: bool,
    completed: u32,
    percent: f32,
}

impl StorageBox {
    fn new(kind: ShapeKind) -> Self {
        Self {
            index: kind.box_index(),
            kind,
            open: false,
            completed: 0,
            percent: 0.0,
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Shapes of this category transferred in so far.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    pub fn is_full(&self) -> bool {
        self.percent >= 100.0
    }
}

/// The five storage boxes in category order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageBank {
    boxes: Vec<StorageBox>,
    shapes_per_category: u32,
    policy: IncrementPolicy,
}

impl StorageBank {
    pub fn new(shapes_per_category: u32, policy: IncrementPolicy) -> Self {
        Self {
            boxes: ShapeKind::ALL.iter().map(|k| StorageBox::new(*k)).collect(),
            shapes_per_category: shapes_per_category.max(1),
            policy,
        }
    }

    pub fn boxes(&self) -> &[StorageBox] {
        &self.boxes
    }

    /// Box by 1-based index.
    pub fn get(&self, index: u8) -> Option<&StorageBox> {
        self.boxes.get((index as usize).checked_sub(1)?)
    }

    pub fn for_kind(&self, kind: ShapeKind) -> &StorageBox {
        &self.boxes[kind.box_index() as usize - 1]
    }

    pub fn step(&self) -> f32 {
        self.policy.step(self.shapes_per_category)
    }

    pub fn policy(&self) -> IncrementPolicy {
        self.policy
    }

    /// Flip a box. Opening closes every other box. Returns the new state.
    pub fn toggle_open(&mut self, index: u8) -> Result<bool, StorageError> {
        let slot = (index as usize)
            .checked_sub(1)
            .filter(|i| *i < CATEGORY_COUNT)
            .ok_or(StorageError::InvalidBox(index))?;
        let now_open = !self.boxes[slot].open;
        for (i, b) in self.boxes.iter_mut().enumerate() {
            b.open = i == slot && now_open;
        }
        Ok(now_open)
    }

    /// Open the box bound to `kind` (closing the others). Returns its index.
    pub fn open_for(&mut self, kind: ShapeKind) -> u8 {
        let index = kind.box_index();
        for b in &mut self.boxes {
            b.open = b.index == index;
        }
        index
    }

    pub fn close_all(&mut self) {
        for b in &mut self.boxes {
            b.open = false;
        }
    }

    pub fn open_box(&self) -> Option<&StorageBox> {
        self.boxes.iter().find(|b| b.open)
    }

    pub fn is_open_for(&self, kind: ShapeKind) -> bool {
        self.for_kind(kind).open
    }

    /// Credit one transferred shape to its box. Returns the new percentage.
    pub fn record_completion(&mut self, kind: ShapeKind) -> f32 {
        let step = self.step();
        let per_category = self.shapes_per_category;
        let b = &mut self.boxes[kind.box_index() as usize - 1];
        b.completed += 1;
        b.percent = if b.completed >= per_category {
            100.0
        } else {
            (b.completed as f32 * step).min(100.0)
        };
        b.percent
    }

    /// 20% per full box.
    pub fn overall_percent(&self) -> u32 {
        let full = self.boxes.iter().filter(|b| b.is_full()).count() as u32;
        full * (100 / CATEGORY_COUNT as u32)
    }

    pub fn all_complete(&self) -> bool {
        self.boxes.iter().all(|b| b.is_full())
    }
}

/// Default on-screen rectangle of box `index` (1..=5): five equal slots in a
/// strip directly below the grid container, each box centred in its slot.
pub fn footer_anchor(index: u8, container_width: f32, container_height: f32) -> ScreenRect {
    let slot = container_width / CATEGORY_COUNT as f32;
    let width = slot * BOX_WIDTH_FRACTION;
    let i = index.clamp(1, CATEGORY_COUNT as u8) - 1;
    ScreenRect::new(
        i as f32 * slot + (slot - width) / 2.0,
        container_height,
        width,
        FOOTER_HEIGHT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_steps() {
        assert_eq!(IncrementPolicy::Exact.step(1), 100.0);
        assert_eq!(IncrementPolicy::Exact.step(4), 25.0);
        assert_eq!(IncrementPolicy::CeilHundredths.step(1), 100.0);
        assert_eq!(IncrementPolicy::CeilHundredths.step(3), 33.34);
        assert!((IncrementPolicy::Exact.step(3) - 33.333_332).abs() < 1e-4);
    }

    #[test]
    fn test_toggle_is_exclusive() {
        let mut bank = StorageBank::new(1, IncrementPolicy::Exact);
        assert_eq!(bank.toggle_open(2), Ok(true));
        assert_eq!(bank.toggle_open(5), Ok(true));
        assert!(!bank.get(2).unwrap().is_open());
        assert_eq!(bank.open_box().map(|b| b.index()), Some(5));
        assert_eq!(bank.toggle_open(5), Ok(false));
        assert!(bank.open_box().is_none());
    }

    #[test]
    fn test_toggle_invalid_index() {
        let mut bank = StorageBank::new(1, IncrementPolicy::Exact);
        assert_eq!(bank.toggle_open(0), Err(StorageError::InvalidBox(0)));
        assert_eq!(bank.toggle_open(6), Err(StorageError::InvalidBox(6)));
    }

    #[test]
    fn test_open_for_kind() {
        let mut bank = StorageBank::new(1, IncrementPolicy::Exact);
        bank.toggle_open(1).unwrap();
        assert_eq!(bank.open_for(ShapeKind::T), 3);
        assert!(bank.is_open_for(ShapeKind::T));
        assert!(!bank.is_open_for(ShapeKind::Plus));
        // opening an already open box keeps it open
        bank.open_for(ShapeKind::T);
        assert!(bank.is_open_for(ShapeKind::T));
    }

    #[test]
    fn test_record_completion_caps_at_100() {
        let mut bank = StorageBank::new(3, IncrementPolicy::CeilHundredths);
        assert_eq!(bank.record_completion(ShapeKind::L), 33.34);
        assert_eq!(bank.record_completion(ShapeKind::L), 66.68);
        assert_eq!(bank.record_completion(ShapeKind::L), 100.0);
        assert_eq!(bank.record_completion(ShapeKind::L), 100.0);
    }

    #[test]
    fn test_exact_policy_reaches_exactly_100() {
        let mut bank = StorageBank::new(3, IncrementPolicy::Exact);
        for _ in 0..3 {
            bank.record_completion(ShapeKind::Plus);
        }
        assert_eq!(bank.for_kind(ShapeKind::Plus).percent(), 100.0);
    }

    #[test]
    fn test_completion_only_touches_own_box() {
        let mut bank = StorageBank::new(2, IncrementPolicy::Exact);
        bank.record_completion(ShapeKind::HLine);
        for b in bank.boxes() {
            let expected = if b.kind() == ShapeKind::HLine { 50.0 } else { 0.0 };
            assert_eq!(b.percent(), expected);
        }
    }

    #[test]
    fn test_overall_percent() {
        let mut bank = StorageBank::new(1, IncrementPolicy::Exact);
        assert_eq!(bank.overall_percent(), 0);
        bank.record_completion(ShapeKind::Plus);
        bank.record_completion(ShapeKind::T);
        assert_eq!(bank.overall_percent(), 40);
        assert!(!bank.all_complete());
        bank.record_completion(ShapeKind::L);
        bank.record_completion(ShapeKind::Rectangle);
        bank.record_completion(ShapeKind::HLine);
        assert_eq!(bank.overall_percent(), 100);
        assert!(bank.all_complete());
    }

    #[test]
    fn test_footer_anchors_are_ordered_and_centered() {
        let rects: Vec<ScreenRect> = (1..=5).map(|i| footer_anchor(i, 1000.0, 600.0)).collect();
        assert_eq!(rects[0], ScreenRect::new(20.0, 600.0, 160.0, FOOTER_HEIGHT));
        assert_eq!(rects[2].center().0, 500.0);
        for pair in rects.windows(2) {
            assert!(pair[0].x + pair[0].width < pair[1].x);
        }
    }
}
