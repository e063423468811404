//! Game Configuration
//!
//! Tunables for the editor, the structure placer and the simulation.
//! `Default` returns the values the toy was balanced with; every struct is
//! `#[serde(default)]` so a JSON file only needs the fields it overrides.

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::{GridConfig, snap_value};

/// Errors raised while loading configuration or level files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Editor picking radii, grid and default-anchor layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Joint placement grid
    pub grid: GridConfig,
    /// Visual radius of a free joint
    pub joint_radius: f32,
    /// Visual radius of an anchor joint
    pub anchor_radius: f32,
    /// Picking tolerance is the entity radius times this
    pub pick_sensitivity: f32,
    /// Visual half-thickness of a member
    pub member_thickness_radius: f32,
    /// Two joints closer than this occupy the same spot
    pub joint_epsilon: f32,
    /// World height visible in the editor view
    pub view_height: f32,
    /// Aspect ratio assumed when laying out default anchors
    pub reference_aspect: f32,
    /// Default anchors sit at this fraction of the reference view width
    pub default_anchor_fraction: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            joint_radius: 0.7,
            anchor_radius: 1.0,
            pick_sensitivity: 1.5,
            member_thickness_radius: 0.25,
            joint_epsilon: 0.001,
            view_height: 70.0,
            reference_aspect: 1.2,
            default_anchor_fraction: 0.4,
        }
    }
}

impl EditorConfig {
    /// Two symmetric placeholder anchors used when no level is loaded.
    pub fn default_anchor_positions(&self) -> [Vec2; 2] {
        let reference_width = self.view_height * self.reference_aspect;
        let x = snap_value(reference_width * self.default_anchor_fraction, self.grid.cell_size);
        [Vec2::new(-x, 0.0), Vec2::new(x, 0.0)]
    }
}

/// How the 2D graph is projected into the 3D scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Cross-axis position of the left structure plane
    pub left_plane: f32,
    /// Cross-axis position of the right structure plane
    pub right_plane: f32,
    /// Length-axis span used when the level has no anchors
    pub default_length_span: Vec2,
    /// Editor units to world units
    pub build_to_world_scale: f32,
    /// Deck baseline relative to the top of the environment
    pub deck_base_offset: f32,
    pub column_radius: f32,
    /// Radius of a deck drawn as a tube when the planes coincide
    pub deck_tube_radius: f32,
    pub tube_segments: u32,
    /// Planes or spans closer than this are treated as coincident
    pub epsilon: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            left_plane: -0.35,
            right_plane: 0.6,
            default_length_span: Vec2::new(-1.3, 1.0),
            build_to_world_scale: 0.03,
            deck_base_offset: -0.87,
            column_radius: 0.02,
            deck_tube_radius: 0.05,
            tube_segments: 6,
            epsilon: 0.001,
        }
    }
}

impl PlacementConfig {
    pub fn has_width(&self) -> bool {
        (self.right_plane - self.left_plane).abs() > self.epsilon
    }
}

/// Vehicle body, motion and contact parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Fallback body size (width, height, depth) when no model loads
    pub size: Vec3,
    /// Forward speed (m/s)
    pub speed: f32,
    /// Fraction of impact speed returned on a bounce
    pub bounce_factor: f32,
    /// Impacts slower than this settle instead of bouncing
    pub min_bounce_velocity: f32,
    /// A drop of more than this fraction of body height starts a tumble
    pub tumble_drop_fraction: f32,
    /// Maximum tumble spin per axis (rad/s)
    pub tumble_spin: Vec3,
    /// Ground probes reach this far below the body
    pub probe_margin: f32,
    /// Ground probes start this far above the body
    pub probe_lift: f32,
    /// Forward ray length as a fraction of body depth
    pub front_ray_length_factor: f32,
    /// Forward rays start this far above the body bottom
    pub front_ray_lift: f32,
    /// Surfaces steeper than this (radians from up) block travel
    pub obstacle_angle: f32,
    /// Extra travel beyond the structure ends (negative extends it)
    pub travel_padding: f32,
    /// Rotation blend per tick toward the ground normal while airborne
    pub airborne_align_rate: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            size: Vec3::new(0.25, 0.2, 0.5),
            speed: 3.0,
            bounce_factor: 0.3,
            min_bounce_velocity: 0.05,
            tumble_drop_fraction: 0.3,
            tumble_spin: Vec3::new(1.5, 0.5, 1.0),
            probe_margin: 0.3,
            probe_lift: 0.1,
            front_ray_length_factor: 0.7,
            front_ray_lift: 0.03,
            obstacle_angle: std::f32::consts::PI / 3.5,
            travel_padding: -1.95,
            airborne_align_rate: 0.6,
        }
    }
}

/// Boat that crosses under the bridge before the car runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoatConfig {
    pub enabled: bool,
    /// Speed along the cross axis (m/s)
    pub speed: f32,
    /// Distance travelled toward negative X
    pub travel: f32,
    /// Start position relative to the environment center (x, z)
    pub start_offset: Vec2,
    /// Water surface depth below the environment top
    pub water_depth: f32,
    /// Fallback hull size when the model gives none
    pub size: Vec3,
}

impl Default for BoatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 2.0,
            travel: 3.0,
            start_offset: Vec2::new(1.3, -0.2),
            water_depth: 1.7,
            size: Vec3::new(0.6, 0.25, 0.3),
        }
    }
}

/// Global simulation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Downward acceleration (m/s²)
    pub gravity: f32,
    /// Longest step a single tick may integrate
    pub max_delta: f32,
    /// Falling below this height resets the run
    pub world_floor: f32,
    /// Seconds a notification stays visible
    pub notification_secs: f32,
    pub vehicle: VehicleConfig,
    pub boat: BoatConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: crate::physics::TOY_GRAVITY,
            max_delta: 0.1,
            world_floor: -20.0,
            notification_secs: 10.0,
            vehicle: VehicleConfig::default(),
            boat: BoatConfig::default(),
        }
    }
}

/// Everything tunable, grouped by subsystem.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub editor: EditorConfig,
    pub placement: PlacementConfig,
    pub simulation: SimulationConfig,
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.simulation.vehicle;
        if v.size.min_element() <= 0.0 {
            return Err(ConfigError::Invalid(format!("vehicle size must be positive, got {}", v.size)));
        }
        if v.speed <= 0.0 {
            return Err(ConfigError::Invalid(format!("vehicle speed must be positive, got {}", v.speed)));
        }
        if !(0.0..1.0).contains(&v.bounce_factor) {
            return Err(ConfigError::Invalid(format!(
                "bounce factor must be in [0, 1), got {}",
                v.bounce_factor
            )));
        }
        if self.simulation.max_delta <= 0.0 {
            return Err(ConfigError::Invalid("max_delta must be positive".into()));
        }
        if self.placement.build_to_world_scale <= 0.0 {
            return Err(ConfigError::Invalid("build_to_world_scale must be positive".into()));
        }
        Ok(())
    }
}
