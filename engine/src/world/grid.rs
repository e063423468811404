//! Grid Configuration Module
//!
//! Snapping for the 2D editing plane. Joints land on the corners of a square
//! grid so hand-placed structures line up with level anchors.
//!
//! ## Default Grid
//! One cell is 10 editor units, matching the spacing of the default anchors
//! (±30, 0).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Grid configuration for the editing plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Edge length of one grid cell in editor units
    pub cell_size: f32,
    /// Grid snapping on/off
    pub snap_enabled: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 10.0,
            snap_enabled: true,
        }
    }
}

impl GridConfig {
    /// Snap a position to the nearest grid corner if snapping is enabled.
    pub fn snap(&self, pos: Vec2) -> Vec2 {
        if !self.snap_enabled {
            return pos;
        }
        snap_to_grid(pos, self.cell_size)
    }
}

/// Standalone function to snap a position to a grid.
///
/// A non-positive `grid_size` leaves the position untouched.
pub fn snap_to_grid(pos: Vec2, grid_size: f32) -> Vec2 {
    if grid_size <= 0.0 {
        return pos;
    }
    Vec2::new(
        snap_value(pos.x, grid_size),
        snap_value(pos.y, grid_size),
    )
}

/// Snap a single coordinate to the nearest multiple of `grid_size`.
pub fn snap_value(value: f32, grid_size: f32) -> f32 {
    if grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}
