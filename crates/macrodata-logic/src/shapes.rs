//! Shape catalog - the five polyomino categories hidden in the grid.
//!
//! Each category is a fixed list of `(row, col)` offsets from its top-left
//! anchor. Category order is significant: it is the placement order and the
//! storage box order (box 1 holds `plus`, box 5 holds `hline`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A grid coordinate. Rows grow downward, columns to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub row: u32,
    pub col: u32,
}

impl CellPos {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// True if this position is an orthogonal neighbour of `other`.
    pub fn is_orthogonal_to(&self, other: &CellPos) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        dr + dc == 1
    }

    /// True if this position touches `other` only at a corner.
    pub fn is_diagonal_to(&self, other: &CellPos) -> bool {
        self.row.abs_diff(other.row) == 1 && self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

/// Shape category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeKind {
    #[serde(rename = "plus")]
    Plus,
    #[serde(rename = "L")]
    L,
    #[serde(rename = "T")]
    T,
    #[serde(rename = "rectangle")]
    Rectangle,
    #[serde(rename = "hline")]
    HLine,
}

const PLUS: [CellPos; 5] = [
    CellPos::new(0, 1),
    CellPos::new(1, 0),
    CellPos::new(1, 1),
    CellPos::new(1, 2),
    CellPos::new(2, 1),
];
const L_SHAPE: [CellPos; 4] = [
    CellPos::new(0, 0),
    CellPos::new(1, 0),
    CellPos::new(2, 0),
    CellPos::new(2, 1),
];
const T_SHAPE: [CellPos; 4] = [
    CellPos::new(0, 0),
    CellPos::new(0, 1),
    CellPos::new(0, 2),
    CellPos::new(1, 1),
];
const RECTANGLE: [CellPos; 4] = [
    CellPos::new(0, 0),
    CellPos::new(0, 1),
    CellPos::new(1, 0),
    CellPos::new(1, 1),
];
const HLINE: [CellPos; 4] = [
    CellPos::new(0, 0),
    CellPos::new(0, 1),
    CellPos::new(0, 2),
    CellPos::new(0, 3),
];

impl ShapeKind {
    /// All categories in placement / storage box order.
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Plus,
        ShapeKind::L,
        ShapeKind::T,
        ShapeKind::Rectangle,
        ShapeKind::HLine,
    ];

    /// Offsets from the top-left anchor.
    pub fn offsets(self) -> &'static [CellPos] {
        match self {
            ShapeKind::Plus => &PLUS,
            ShapeKind::L => &L_SHAPE,
            ShapeKind::T => &T_SHAPE,
            ShapeKind::Rectangle => &RECTANGLE,
            ShapeKind::HLine => &HLINE,
        }
    }

    pub fn cell_count(self) -> usize {
        self.offsets().len()
    }

    /// Bounding box as `(rows, cols)`.
    pub fn extent(self) -> (u32, u32) {
        let offsets = self.offsets();
        let rows = offsets.iter().map(|o| o.row).max().unwrap_or(0) + 1;
        let cols = offsets.iter().map(|o| o.col).max().unwrap_or(0) + 1;
        (rows, cols)
    }

    /// Absolute cell positions for a shape anchored at `anchor`.
    pub fn cells_at(self, anchor: CellPos) -> Vec<CellPos> {
        self.offsets()
            .iter()
            .map(|o| CellPos::new(anchor.row + o.row, anchor.col + o.col))
            .collect()
    }

    /// Whether a shape anchored at `anchor` fits in a `rows × cols` grid.
    pub fn fits_at(self, anchor: CellPos, rows: u32, cols: u32) -> bool {
        let (h, w) = self.extent();
        anchor.row + h <= rows && anchor.col + w <= cols
    }

    /// 1-based storage box index bound to this category.
    pub fn box_index(self) -> u8 {
        match self {
            ShapeKind::Plus => 1,
            ShapeKind::L => 2,
            ShapeKind::T => 3,
            ShapeKind::Rectangle => 4,
            ShapeKind::HLine => 5,
        }
    }

    pub fn from_box_index(index: u8) -> Option<ShapeKind> {
        match index {
            1 => Some(ShapeKind::Plus),
            2 => Some(ShapeKind::L),
            3 => Some(ShapeKind::T),
            4 => Some(ShapeKind::Rectangle),
            5 => Some(ShapeKind::HLine),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Plus => "plus",
            ShapeKind::L => "L",
            ShapeKind::T => "T",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::HLine => "hline",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
