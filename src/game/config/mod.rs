//! Config Module
//!
//! Tunables and level definitions, loadable from JSON.

pub mod game_config;
pub mod level;

pub use game_config::{
    BoatConfig, ConfigError, EditorConfig, GameConfig, PlacementConfig, SimulationConfig,
    VehicleConfig,
};
pub use level::{AnchorPoint, LevelAnchorConfig};
