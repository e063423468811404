//! Boat crossing that runs before the car.

use glam::Vec3;
use serde::Serialize;
use tracing::debug;

use crate::game::config::BoatConfig;
use crate::physics::Aabb;

/// Remaining distance treated as arrival.
const ARRIVAL_TOLERANCE: f32 = 0.001;

#[derive(Clone, Debug, Serialize)]
pub struct Boat {
    /// Hull center
    pub position: Vec3,
    pub size: Vec3,
    initial_x: f32,
    target_x: f32,
    speed: f32,
    arrived: bool,
}

impl Boat {
    /// Floats the boat on the water beside the environment center.
    pub fn in_environment(bounds: &Aabb, size: Vec3, config: &BoatConfig) -> Self {
        let center = bounds.center();
        let water_y = bounds.max.y - config.water_depth;
        let position = Vec3::new(
            center.x + config.start_offset.x,
            water_y + size.y * 0.5,
            center.z + config.start_offset.y,
        );
        Self {
            position,
            size,
            initial_x: position.x,
            target_x: position.x - config.travel,
            speed: config.speed,
            arrived: false,
        }
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    pub fn reset(&mut self) {
        self.position.x = self.initial_x;
        self.arrived = false;
    }

    /// Moves toward the target. True on the tick the boat arrives.
    pub fn step(&mut self, dt: f32) -> bool {
        if self.arrived {
            return false;
        }
        let remaining = self.target_x - self.position.x;
        let distance = self.speed * dt;
        if distance >= remaining.abs() - ARRIVAL_TOLERANCE {
            self.position.x = self.target_x;
            self.arrived = true;
            debug!(x = self.target_x, "boat arrived");
            return true;
        }
        self.position.x += remaining.signum() * distance;
        false
    }
}
