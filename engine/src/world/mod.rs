//! World Module
//!
//! World-space configuration for the editing plane.

pub mod grid;

pub use grid::{GridConfig, snap_to_grid, snap_value};
