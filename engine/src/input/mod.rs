//! Input Module
//!
//! Platform-agnostic pointer handling for the editor. Decoupled from any
//! windowing system so a host application only has to forward pixel
//! positions and viewport sizes.
//!
//! # Example
//!
//! ```rust,ignore
//! use poly_bridge_engine::input::{MouseButton, OrthoViewport, PointerEvent, PointerProjector};
//!
//! let view = OrthoViewport::default();
//! let click = PointerEvent::press(412.0, 180.0, MouseButton::Left, (800, 600));
//! if let Some(world) = view.to_world(&click) {
//!     // Hand the editor-plane position to the edit session
//! }
//! ```

pub mod mouse;
pub mod viewport;

pub use mouse::{MouseButton, PointerEvent, Position};
pub use viewport::{OrthoViewport, PointerProjector};
