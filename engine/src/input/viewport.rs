//! Viewport Module
//!
//! Resolves pointer events into editor-plane world coordinates.

use glam::Vec2;

use super::mouse::PointerEvent;

/// Turns a device pointer event into a 2D world position.
pub trait PointerProjector {
    fn to_world(&self, event: &PointerEvent) -> Option<Vec2>;
}

/// Orthographic view of the editing plane.
///
/// The visible world height is fixed; the visible width follows the
/// viewport aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoViewport {
    /// World point at the center of the viewport
    pub center: Vec2,
    /// World units visible from bottom to top edge
    pub view_height: f32,
}

impl Default for OrthoViewport {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            view_height: 70.0,
        }
    }
}

impl OrthoViewport {
    pub fn new(center: Vec2, view_height: f32) -> Self {
        Self { center, view_height }
    }

    /// World units visible from left to right edge for an aspect ratio.
    pub fn view_width(&self, aspect_ratio: f32) -> f32 {
        self.view_height * aspect_ratio
    }
}

impl PointerProjector for OrthoViewport {
    fn to_world(&self, event: &PointerEvent) -> Option<Vec2> {
        let (nx, ny) = event.normalized_device()?;
        let half_h = self.view_height * 0.5;
        let half_w = self.view_width(event.aspect_ratio()) * 0.5;
        Some(self.center + Vec2::new(nx * half_w, ny * half_h))
    }
}
