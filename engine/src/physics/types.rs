//! Physics type re-exports from glam
//!
//! The editor works in the 2D plane (`Vec2`), the simulation in 3D with
//! `Quat` orientations.

pub use glam::{Quat, Vec2, Vec3};

/// Acceleration due to gravity used by the toy simulation (m/s²).
///
/// Slightly softer than Earth gravity so falls read well at toy scale.
pub const TOY_GRAVITY: f32 = 9.8 * 0.8;
