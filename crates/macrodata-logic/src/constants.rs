//! Game constants - timings, placement limits, viewport limits, default geometry.
//!
//! Plain constants with no engine dependency. The engine, the harness and
//! any embedding UI read the same values from here.

pub mod timing {
    /// Total flight time of a confirmed transfer, in milliseconds.
    pub const TRANSFER_MS: f64 = 1200.0;
    /// Point in the flight at which the landing cue fires.
    pub const LANDING_CUE_MS: f64 = 600.0;
    /// How long a user-facing notice stays up.
    pub const NOTICE_MS: f64 = 2000.0;
    /// Debounce window for the "open box for hovered shape" key.
    pub const HOVER_KEY_LOCK_MS: f64 = 2000.0;
    /// Length of a single help pulse.
    pub const HELP_PULSE_MS: f64 = 1500.0;
    /// Default interval between help pulses while a box is open.
    pub const DEFAULT_HELP_INTERVAL_MS: u32 = 10_000;
}

pub mod placement {
    /// Random anchors tried per shape instance before it is skipped.
    pub const MAX_ATTEMPTS: u32 = 500;
}

pub mod viewport {
    /// Upper zoom bound. The lower bound is derived from the container.
    pub const MAX_SCALE: f32 = 5.0;
    /// Scale change per wheel delta unit.
    pub const ZOOM_SPEED: f32 = 0.001;
    /// Pixels moved per directional pan key press.
    pub const PAN_STEP: f32 = 50.0;
}

/// Randomisation ranges for per-cell animation timing, in seconds.
pub mod cell_timing {
    pub const WOBBLE_DURATION: (f32, f32) = (4.0, 8.0);
    pub const WOBBLE_DELAY: (f32, f32) = (0.0, 3.0);
    pub const SPAWN_DURATION: (f32, f32) = (1.0, 4.0);
    pub const SPAWN_DELAY: (f32, f32) = (0.5, 3.5);
    /// Refreshed cells respawn faster than the initial grid.
    pub const RESPAWN_DELAY: (f32, f32) = (0.0, 1.0);
}

pub mod layout {
    pub const CELL_WIDTH: f32 = 24.0;
    pub const CELL_HEIGHT: f32 = 32.0;
    pub const ROW_GAP: f32 = 8.0;
    pub const COL_GAP: f32 = 8.0;
    pub const ROWS: u32 = 30;
    pub const COLS: u32 = 60;
    pub const CONTAINER_WIDTH: f32 = 1200.0;
    pub const CONTAINER_HEIGHT: f32 = 600.0;
    pub const SHAPES_PER_CATEGORY: u32 = 2;
    /// Height of the storage box strip below the grid container.
    pub const FOOTER_HEIGHT: f32 = 70.0;
    /// Width of one storage box as a fraction of its footer slot.
    pub const BOX_WIDTH_FRACTION: f32 = 0.8;
}

/// Number of shape categories, and therefore of storage boxes.
pub const CATEGORY_COUNT: usize = 5;
