//! Generation - procedural creation of the grid's hidden shapes.

mod placement;

pub use placement::*;
