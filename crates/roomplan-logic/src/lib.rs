//! Pure floor-plan logic for roomplan.
//!
//! This crate turns a painted raster into a typed cell grid, splits the grid
//! into rooms and corridors, and places equipment onto the result. Nothing
//! here depends on a renderer or engine: functions take plain data and
//! return results, so the whole pipeline runs headless and under test.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Tolerances, text cell codes, palette colors, item names |
//! | [`color`] | `Rgb` samples on a [0, 1] scale with tolerant matching |
//! | [`grid`] | Cells, rectangles, dense grids and cell kinds |
//! | [`raster`] | Bottom-up pixel buffers and `image` conversion |
//! | [`codec`] | Raster ↔ typed grid ↔ integer text matrix |
//! | [`segment`] | 4-connected region extraction with door/window tallies |
//! | [`classify`] | Room vs. corridor labelling and the corridor mask |
//! | [`catalog`] | Equipment items, rotations, footprints, clearance rules |
//! | [`occupancy`] | Two-layer cell ownership for floor and desk-top items |
//! | [`placement`] | Placement checks, interactive and batch placement |
//! | [`history`] | Bounded snapshot undo log |
//! | [`canvas`] | Plan painting: lines, strokes, bucket fill, undo |
//! | [`scheme`] | Scheme rasters and spawn plans for the 3D scene |
//! | [`status`] | Periodic equipment status rolls |
//! | [`session`] | Editor session tying selection, counts and undo together |
//! | [`config`] | Planner configuration and validation |
//! | [`error`] | Input errors |
//! | [`files`] | PNG, text grid and JSON file helpers |

pub mod canvas;
pub mod catalog;
pub mod classify;
pub mod codec;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod files;
pub mod grid;
pub mod history;
pub mod occupancy;
pub mod placement;
pub mod raster;
pub mod scheme;
pub mod segment;
pub mod session;
pub mod status;

#[cfg(test)]
mod test_support;

pub use error::{PlanError, Result};
