//! Poly Bridge Engine Library
//!
//! Core of a bridge-building toy: a 2D truss editor and a small 3D ray-cast
//! simulation that drives a car (after an optional boat) across the result.
//! The library owns no rendering resources; a host application drains the
//! graph and simulation events and draws whatever it likes.
//!
//! # Modules
//!
//! - [`physics`] - Ray queries over tagged triangle meshes
//! - [`input`] - Pointer events and editor-plane projection
//! - [`world`] - Editing-plane grid snapping
//! - [`game`] - Structure graph, editor, placement, simulation, mode control
//!
//! # Example
//!
//! ```ignore
//! use poly_bridge_engine::game::{GameConfig, ModeController, Tool};
//! use poly_bridge_engine::physics::Vec2;
//!
//! let mut game = ModeController::new(GameConfig::default(), None);
//! game.select_tool(Tool::PlaceJoint);
//! game.click_world(Vec2::new(0.0, 10.0));
//!
//! game.toggle_play_edit();
//! game.play_reset_vehicle();
//! game.tick(1.0 / 60.0);
//! ```

pub mod input;
pub mod physics;
pub mod world;

// Game-specific modules (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

pub use input::{MouseButton, OrthoViewport, PointerEvent, PointerProjector};
pub use physics::{CollisionWorld, HitInfo, RayQuery, SurfaceKind, TriangleMesh};
pub use world::{GridConfig, snap_to_grid};
