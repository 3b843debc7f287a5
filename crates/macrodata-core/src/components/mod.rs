//! Component definitions for the ECS world.
//!
//! Components are pure data structs attached to shape entities.
//! They have no behavior - that lives in systems.

mod shape;

pub use shape::*;
