//! Session configuration - everything the surrounding UI supplies once per game.
//!
//! The data model and validation are independent of any UI framework.
//! Validation collects every problem instead of stopping at the first one.
//!
//! ```
//! use macrodata_logic::session::{validate_config, SessionConfig};
//!
//! let mut config = SessionConfig::default();
//! config.rows = 12;
//! config.cols = 16;
//! assert!(validate_config(&config).is_empty());
//!
//! config.shapes_per_category = 0;
//! assert_eq!(validate_config(&config).len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{layout, timing};
use crate::controls::KeyBindings;
use crate::storage::IncrementPolicy;
use crate::viewport::GridGeometry;

/// Per-session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub rows: u32,
    pub cols: u32,
    /// Cell size in pixels.
    pub cell_width: f32,
    pub cell_height: f32,
    /// Gaps between cells in pixels.
    pub row_gap: f32,
    pub col_gap: f32,
    /// Instances generated for each of the five categories.
    pub shapes_per_category: u32,
    /// Interval between help pulses while a box is open.
    pub help_pulse_interval_ms: u32,
    /// Size of the grid viewport container in pixels.
    pub container_width: f32,
    pub container_height: f32,
    /// Seed for layout and digits (`None` = fresh entropy).
    pub seed: Option<u64>,
    pub increment_policy: IncrementPolicy,
    /// Suppresses cosmetic audio cues.
    pub muted: bool,
    pub key_bindings: KeyBindings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rows: layout::ROWS,
            cols: layout::COLS,
            cell_width: layout::CELL_WIDTH,
            cell_height: layout::CELL_HEIGHT,
            row_gap: layout::ROW_GAP,
            col_gap: layout::COL_GAP,
            shapes_per_category: layout::SHAPES_PER_CATEGORY,
            help_pulse_interval_ms: timing::DEFAULT_HELP_INTERVAL_MS,
            container_width: layout::CONTAINER_WIDTH,
            container_height: layout::CONTAINER_HEIGHT,
            seed: None,
            increment_policy: IncrementPolicy::default(),
            muted: false,
            key_bindings: KeyBindings::default(),
        }
    }
}

impl SessionConfig {
    pub fn geometry(&self) -> GridGeometry {
        GridGeometry::new(
            self.rows,
            self.cols,
            self.cell_width,
            self.cell_height,
            self.row_gap,
            self.col_gap,
        )
    }

    /// Total shapes requested across all categories.
    pub fn requested_shapes(&self) -> u32 {
        self.shapes_per_category * 5
    }

    /// `Ok(self)` if [`validate_config`] finds nothing.
    pub fn validated(self) -> Result<Self, ConfigErrors> {
        let errors = validate_config(&self);
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigErrors(errors))
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid must have at least one row and one column (got {rows}x{cols})")]
    EmptyGrid { rows: u32, cols: u32 },
    #[error("cell size must be positive (got {width}x{height})")]
    InvalidCellSize { width: f32, height: f32 },
    #[error("gaps must be non-negative (got row {row}, col {col})")]
    NegativeGap { row: f32, col: f32 },
    #[error("at least one shape per category is required")]
    NoShapes,
    #[error("help pulse interval must be positive")]
    InvalidHelpInterval,
    #[error("container size must be positive (got {width}x{height})")]
    InvalidContainer { width: f32, height: f32 },
    #[error("key {0} is bound to more than one action")]
    DuplicateKey(String),
}

/// Every problem found in one configuration.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid session configuration: {0:?}")]
pub struct ConfigErrors(pub Vec<ConfigError>);

/// Validate a session configuration, returning all errors found.
pub fn validate_config(config: &SessionConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.rows == 0 || config.cols == 0 {
        errors.push(ConfigError::EmptyGrid {
            rows: config.rows,
            cols: config.cols,
        });
    }
    if !(config.cell_width > 0.0 && config.cell_height > 0.0) {
        errors.push(ConfigError::InvalidCellSize {
            width: config.cell_width,
            height: config.cell_height,
        });
    }
    if !(config.row_gap >= 0.0 && config.col_gap >= 0.0) {
        errors.push(ConfigError::NegativeGap {
            row: config.row_gap,
            col: config.col_gap,
        });
    }
    if config.shapes_per_category == 0 {
        errors.push(ConfigError::NoShapes);
    }
    if config.help_pulse_interval_ms == 0 {
        errors.push(ConfigError::InvalidHelpInterval);
    }
    if !(config.container_width > 0.0 && config.container_height > 0.0) {
        errors.push(ConfigError::InvalidContainer {
            width: config.container_width,
            height: config.container_height,
        });
    }

    let keys = config.key_bindings.all_keys();
    for (i, key) in keys.iter().enumerate() {
        if keys[..i].contains(key) {
            let name = format!("{:?}", key);
            if !errors.contains(&ConfigError::DuplicateKey(name.clone())) {
                errors.push(ConfigError::DuplicateKey(name));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::KeyCode;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&SessionConfig::default()).is_empty());
    }

    #[test]
    fn test_collects_all_errors() {
        let config = SessionConfig {
            rows: 0,
            cell_width: 0.0,
            row_gap: -1.0,
            shapes_per_category: 0,
            help_pulse_interval_ms: 0,
            container_height: -5.0,
            ..SessionConfig::default()
        };
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ConfigError::NoShapes));
        assert!(errors.contains(&ConfigError::InvalidHelpInterval));
    }

    #[test]
    fn test_nan_sizes_rejected() {
        let config = SessionConfig {
            cell_height: f32::NAN,
            ..SessionConfig::default()
        };
        assert_eq!(validate_config(&config).len(), 1);
    }

    #[test]
    fn test_duplicate_keys() {
        let mut config = SessionConfig::default();
        config.key_bindings.open_hovered = KeyCode::Char('A');
        let errors = validate_config(&config);
        assert_eq!(errors, vec![ConfigError::DuplicateKey("Char('a')".to_string())]);
    }

    #[test]
    fn test_validated() {
        assert!(SessionConfig::default().validated().is_ok());
        let bad = SessionConfig {
            cols: 0,
            ..SessionConfig::default()
        };
        let err = bad.validated().unwrap_err();
        assert_eq!(err.0.len(), 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{ "rows": 12, "cols": 20, "seed": 7 }"#).unwrap();
        assert_eq!(config.rows, 12);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.cell_width, layout::CELL_WIDTH);
        assert_eq!(config.key_bindings, KeyBindings::default());
    }

    #[test]
    fn test_geometry() {
        let g = SessionConfig::default().geometry();
        assert_eq!(g.rows, layout::ROWS);
        assert_eq!(g.cell_width, layout::CELL_WIDTH);
    }
}
