//! Systems - logic that operates on shape components and the grid

mod animation;
mod help_pulse;
mod selection;
mod transfer;

pub use animation::*;
pub use help_pulse::*;
pub use selection::*;
pub use transfer::*;
