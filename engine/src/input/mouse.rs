//! Mouse Input Module
//!
//! Pointer events in window pixels, decoupled from any windowing crate.

/// Mouse button identifiers, independent of windowing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    /// Additional mouse buttons (button 4, 5, etc.)
    Other(u16),
}

/// 2D position, used for mouse coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A single pointer press or move, in window pixels (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Pointer position in pixels
    pub position: Position,
    /// Button involved, if any (moves carry `None`)
    pub button: Option<MouseButton>,
    /// Size of the surface the position is relative to
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl PointerEvent {
    pub fn press(x: f32, y: f32, button: MouseButton, viewport: (u32, u32)) -> Self {
        Self {
            position: Position::new(x, y),
            button: Some(button),
            viewport_width: viewport.0,
            viewport_height: viewport.1,
        }
    }

    pub fn moved(x: f32, y: f32, viewport: (u32, u32)) -> Self {
        Self {
            position: Position::new(x, y),
            button: None,
            viewport_width: viewport.0,
            viewport_height: viewport.1,
        }
    }

    /// Normalized device coordinates (-1 to 1, Y up).
    ///
    /// `None` for a zero-sized viewport.
    pub fn normalized_device(&self) -> Option<(f32, f32)> {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return None;
        }
        let x = self.position.x / self.viewport_width as f32 * 2.0 - 1.0;
        let y = 1.0 - self.position.y / self.viewport_height as f32 * 2.0;
        Some((x, y))
    }

    /// Width over height of the viewport.
    pub fn aspect_ratio(&self) -> f32 {
        if self.viewport_height == 0 {
            return 1.0;
        }
        self.viewport_width as f32 / self.viewport_height as f32
    }
}
