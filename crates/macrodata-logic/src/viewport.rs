//! Pan/zoom viewport over the cell grid.
//!
//! The grid is laid out in *world* pixels (cells plus gaps, origin at the
//! top-left of the first cell) and drawn into a fixed-size container through
//! the affine transform `screen = offset + world * scale`. All pointer
//! coordinates are relative to the container's top-left corner.
//!
//! ```
//! use macrodata_logic::viewport::{GridGeometry, Viewport};
//!
//! let geometry = GridGeometry::new(10, 10, 24.0, 32.0, 8.0, 8.0);
//! let mut view = Viewport::new(geometry, 200.0, 200.0);
//! view.zoom_at(100.0, 100.0, 0.5);
//! let (row, col) = view.screen_to_cell(100.0, 100.0);
//! assert!(row >= 0 && col >= 0);
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::viewport::{MAX_SCALE, ZOOM_SPEED};
use crate::shapes::CellPos;

/// Cell grid dimensions in world pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub rows: u32,
    pub cols: u32,
    pub cell_width: f32,
    pub cell_height: f32,
    pub row_gap: f32,
    pub col_gap: f32,
}

impl GridGeometry {
    pub fn new(rows: u32, cols: u32, cell_width: f32, cell_height: f32, row_gap: f32, col_gap: f32) -> Self {
        Self {
            rows,
            cols,
            cell_width,
            cell_height,
            row_gap,
            col_gap,
        }
    }

    /// Unscaled width of the whole grid (no trailing gap).
    pub fn natural_width(&self) -> f32 {
        self.cols as f32 * self.cell_width + self.cols.saturating_sub(1) as f32 * self.col_gap
    }

    /// Unscaled height of the whole grid (no trailing gap).
    pub fn natural_height(&self) -> f32 {
        self.rows as f32 * self.cell_height + self.rows.saturating_sub(1) as f32 * self.row_gap
    }

    /// Horizontal distance between the left edges of adjacent cells.
    pub fn pitch_x(&self) -> f32 {
        self.cell_width + self.col_gap
    }

    /// Vertical distance between the top edges of adjacent cells.
    pub fn pitch_y(&self) -> f32 {
        self.cell_height + self.row_gap
    }

    /// World-space top-left corner of a cell.
    pub fn cell_origin(&self, pos: CellPos) -> (f32, f32) {
        (pos.col as f32 * self.pitch_x(), pos.row as f32 * self.pitch_y())
    }

    pub fn contains(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && row < self.rows as i64 && col < self.cols as i64
    }
}

/// Screen-space rectangle, container-relative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// Pan offset and zoom scale over a [`GridGeometry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    geometry: GridGeometry,
    container_width: f32,
    container_height: f32,
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl Viewport {
    /// Start at 1:1 (or the smallest scale that covers the container),
    /// with offsets clamped.
    pub fn new(geometry: GridGeometry, container_width: f32, container_height: f32) -> Self {
        let mut view = Self {
            geometry,
            container_width,
            container_height,
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        };
        view.scale = view.clamp_scale(1.0);
        let (x, y) = view.clamp(0.0, 0.0, view.scale);
        view.offset_x = x;
        view.offset_y = y;
        view
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> (f32, f32) {
        (self.offset_x, self.offset_y)
    }

    pub fn container_size(&self) -> (f32, f32) {
        (self.container_width, self.container_height)
    }

    /// Smallest scale at which the grid still covers the container.
    pub fn min_scale(&self) -> f32 {
        let w = self.geometry.natural_width();
        let h = self.geometry.natural_height();
        (self.container_width / w).max(self.container_height / h)
    }

    /// Upper zoom bound; never below `min_scale` so the range stays non-empty.
    pub fn max_scale(&self) -> f32 {
        MAX_SCALE.max(self.min_scale())
    }

    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale(), self.max_scale())
    }

    /// Restrict an offset pair so the grid never leaves the container.
    ///
    /// Per axis: content at least as large as the container is limited to
    /// `[container - scaled, 0]`; smaller content is centered.
    pub fn clamp(&self, x: f32, y: f32, scale: f32) -> (f32, f32) {
        (
            clamp_axis(x, self.container_width, self.geometry.natural_width() * scale),
            clamp_axis(y, self.container_height, self.geometry.natural_height() * scale),
        )
    }

    /// Zoom by `delta_scale` keeping the world point under the pointer fixed.
    pub fn zoom_at(&mut self, pointer_x: f32, pointer_y: f32, delta_scale: f32) {
        let old_scale = self.scale;
        let new_scale = self.clamp_scale(old_scale + delta_scale);
        let world_x = (pointer_x - self.offset_x) / old_scale;
        let world_y = (pointer_y - self.offset_y) / old_scale;
        let (x, y) = self.clamp(
            pointer_x - world_x * new_scale,
            pointer_y - world_y * new_scale,
            new_scale,
        );
        self.scale = new_scale;
        self.offset_x = x;
        self.offset_y = y;
    }

    /// Wheel zoom: positive `delta_y` (scrolling down) zooms out.
    pub fn zoom_wheel(&mut self, pointer_x: f32, pointer_y: f32, delta_y: f32) {
        self.zoom_at(pointer_x, pointer_y, -delta_y * ZOOM_SPEED);
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        let (x, y) = self.clamp(self.offset_x + dx, self.offset_y + dy, self.scale);
        self.offset_x = x;
        self.offset_y = y;
    }

    /// Change the container size, then re-clamp scale and offsets.
    pub fn resize(&mut self, container_width: f32, container_height: f32) {
        self.container_width = container_width;
        self.container_height = container_height;
        self.scale = self.clamp_scale(self.scale);
        let (x, y) = self.clamp(self.offset_x, self.offset_y, self.scale);
        self.offset_x = x;
        self.offset_y = y;
    }

    pub fn screen_to_world(&self, px: f32, py: f32) -> (f32, f32) {
        ((px - self.offset_x) / self.scale, (py - self.offset_y) / self.scale)
    }

    pub fn world_to_screen(&self, wx: f32, wy: f32) -> (f32, f32) {
        (self.offset_x + wx * self.scale, self.offset_y + wy * self.scale)
    }

    /// Raw `(row, col)` under a pointer. May be out of range; the gap after
    /// a cell maps to that cell.
    pub fn screen_to_cell(&self, px: f32, py: f32) -> (i64, i64) {
        let (wx, wy) = self.screen_to_world(px, py);
        let col = (wx / self.geometry.pitch_x()).floor() as i64;
        let row = (wy / self.geometry.pitch_y()).floor() as i64;
        (row, col)
    }

    /// Bounds-checked variant of [`Viewport::screen_to_cell`].
    pub fn cell_at(&self, px: f32, py: f32) -> Option<CellPos> {
        let (row, col) = self.screen_to_cell(px, py);
        if self.geometry.contains(row, col) {
            Some(CellPos::new(row as u32, col as u32))
        } else {
            None
        }
    }

    /// Screen-space top-left corner of a cell.
    pub fn cell_to_screen(&self, pos: CellPos) -> (f32, f32) {
        let (wx, wy) = self.geometry.cell_origin(pos);
        self.world_to_screen(wx, wy)
    }

    /// Screen-space rectangle of the drawn cell (gap excluded).
    pub fn cell_rect(&self, pos: CellPos) -> ScreenRect {
        let (x, y) = self.cell_to_screen(pos);
        ScreenRect::new(
            x,
            y,
            self.geometry.cell_width * self.scale,
            self.geometry.cell_height * self.scale,
        )
    }

    /// Screen-space center of a cell.
    pub fn cell_center(&self, pos: CellPos) -> (f32, f32) {
        self.cell_rect(pos).center()
    }
}

fn clamp_axis(offset: f32, container: f32, scaled: f32) -> f32 {
    if scaled >= container {
        offset.clamp(container - scaled, 0.0)
    } else {
        (container - scaled) / 2.0
    }
}
