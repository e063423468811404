//! Physics module
//!
//! Geometry queries for the bridge simulation, built without an external
//! physics library. The simulation only needs rays: downward rays to find the
//! ground under a vehicle and short forward rays to find walls ahead of it.
//!
//! # Unit System
//!
//! **1 unit = 1 meter** on the simulation side. Editor coordinates are scaled
//! into this space by the structure placer.
//!
//! # Submodules
//!
//! - [`types`] - Core mathematical types re-exported from glam
//! - [`collision`] - Ray-triangle and ray-AABB queries over tagged meshes

pub mod collision;
pub mod types;

pub use collision::{
    Aabb, CollisionBody, CollisionWorld, HitInfo, MeshError, RayQuery, SurfaceKind, TriangleMesh,
    ray_aabb_intersect, ray_triangle_intersect, triangle_normal,
};
pub use types::{Quat, TOY_GRAVITY, Vec2, Vec3};
