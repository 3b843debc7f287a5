//! Pure grid-refinement logic for Macrodata.
//!
//! This crate contains the game rules that are independent of any ECS,
//! renderer, or input backend. Functions take plain data and return
//! results, making them unit-testable and usable from the engine, the
//! headless harness, and any embedding UI.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Timings, placement limits, zoom limits, default layout |
//! | [`controls`] | Key codes, engine commands, key bindings |
//! | [`session`] | Session configuration and validation |
//! | [`shapes`] | The five polyomino categories and grid coordinates |
//! | [`storage`] | Storage box bank, completion percentages |
//! | [`viewport`] | Pan/zoom transform, screen ↔ cell mapping |

pub mod constants;
pub mod controls;
pub mod session;
pub mod shapes;
pub mod storage;
pub mod viewport;
