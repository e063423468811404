//! Vehicle Physics
//!
//! A kinematic box driven by ray probes instead of a rigid-body solver:
//!
//! - six parallel downward rays find the supporting surface
//! - gravity, bounce and tumble act on the vertical axis only
//! - three short forward rays stop the car at walls
//!
//! Orientation snaps to the ground normal while resting and blends toward
//! it while airborne. A tumbling car spins freely until it lands.

use glam::{Quat, Vec3};
use serde::Serialize;
use tracing::debug;

use super::events::SimEvent;
use crate::game::config::VehicleConfig;
use crate::game::types::hash_unit;
use crate::physics::{RayQuery, SurfaceKind};

/// Shortest forward probe, even at zero speed.
const MIN_FRONT_RAY: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum VehicleMotion {
    Grounded,
    Falling,
    /// Falling with free rotation
    Tumbling,
}

impl VehicleMotion {
    pub fn is_airborne(self) -> bool {
        self != VehicleMotion::Grounded
    }
}

/// Highest surface point found under the vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GroundContact {
    pub point: Vec3,
    pub normal: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardOutcome {
    Moved,
    /// A wall-like surface is directly ahead; nothing moved
    Blocked,
}

#[derive(Clone, Debug, Serialize)]
pub struct Vehicle {
    /// Body center
    pub position: Vec3,
    pub orientation: Quat,
    /// Width, height, depth
    pub size: Vec3,
    /// Positive is up
    pub vertical_velocity: f32,
    /// Tumble spin (rad/s)
    pub angular_velocity: Vec3,
    pub motion: VehicleMotion,
    /// Height of the last surface the vehicle rested on
    pub last_ground_y: f32,
    ground_normal: Vec3,
    tumbles: u32,
}

impl Vehicle {
    pub fn new(size: Vec3) -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            size,
            vertical_velocity: 0.0,
            angular_velocity: Vec3::ZERO,
            motion: VehicleMotion::Grounded,
            last_ground_y: -size.y * 0.5,
            ground_normal: Vec3::Y,
            tumbles: 0,
        }
    }

    /// Puts the vehicle at rest at `position`, upright.
    pub fn place(&mut self, position: Vec3) {
        self.position = position;
        self.orientation = Quat::IDENTITY;
        self.vertical_velocity = 0.0;
        self.angular_velocity = Vec3::ZERO;
        self.motion = VehicleMotion::Grounded;
        self.ground_normal = Vec3::Y;
        self.last_ground_y = self.bottom_y();
    }

    /// World-space offset from the body center to the bottom center.
    fn bottom_offset(&self) -> Vec3 {
        self.orientation * Vec3::new(0.0, -self.size.y * 0.5, 0.0)
    }

    pub fn bottom_y(&self) -> f32 {
        self.position.y + self.bottom_offset().y
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    pub fn is_tumbling(&self) -> bool {
        self.motion == VehicleMotion::Tumbling
    }

    // ========================================================================
    // GROUND PROBE
    // ========================================================================

    /// Local XZ probe offsets: front and rear center, then the four corners.
    fn probe_offsets(&self) -> [Vec3; 6] {
        let x = self.size.x * 0.4;
        let z = self.size.z * 0.45;
        [
            Vec3::new(0.0, 0.0, z),
            Vec3::new(0.0, 0.0, -z),
            Vec3::new(-x, 0.0, z),
            Vec3::new(x, 0.0, z),
            Vec3::new(-x, 0.0, -z),
            Vec3::new(x, 0.0, -z),
        ]
    }

    /// Casts every downward probe and keeps the highest walkable hit.
    ///
    /// Probes start just above the body top and reach `probe_margin` plus
    /// `extra_reach` below its bottom.
    pub fn probe_ground(
        &self,
        world: &impl RayQuery,
        config: &VehicleConfig,
        extra_reach: f32,
    ) -> Option<GroundContact> {
        let lift = Vec3::Y * (self.size.y * 0.5 + config.probe_lift);
        let bottom = self.bottom_y();
        self.probe_offsets()
            .iter()
            .filter_map(|offset| {
                let origin = self.position + self.orientation * (*offset + lift);
                let reach = (origin.y - bottom).max(0.0) + config.probe_margin + extra_reach;
                world.ray_cast(origin, Vec3::NEG_Y, reach, SurfaceKind::WALKABLE)
            })
            .max_by(|a, b| a.position.y.total_cmp(&b.position.y))
            .map(|hit| GroundContact {
                point: hit.position,
                normal: hit.normal,
            })
    }

    fn align_to(&mut self, normal: Vec3, rate: f32) {
        let normal = normal.try_normalize().unwrap_or(Vec3::Y);
        let target = Quat::from_rotation_arc(Vec3::Y, normal);
        self.orientation = if rate >= 1.0 {
            target
        } else {
            self.orientation.slerp(target, rate).normalize()
        };
    }

    fn rest_on(&mut self, contact: &GroundContact) {
        self.align_to(contact.normal, 1.0);
        self.position.y = contact.point.y - self.bottom_offset().y;
        self.vertical_velocity = 0.0;
        self.angular_velocity = Vec3::ZERO;
        self.ground_normal = contact.normal;
        self.last_ground_y = contact.point.y;
        self.motion = VehicleMotion::Grounded;
    }

    // ========================================================================
    // VERTICAL MOTION
    // ========================================================================

    /// Ground detection, gravity, bounce and tumble for one tick.
    pub fn update_vertical(
        &mut self,
        world: &impl RayQuery,
        config: &VehicleConfig,
        gravity: f32,
        dt: f32,
    ) -> Option<SimEvent> {
        if self.motion == VehicleMotion::Grounded {
            if let Some(contact) = self.probe_ground(world, config, 0.0) {
                self.rest_on(&contact);
                return None;
            }
            debug!(y = self.position.y, "vehicle left the ground");
            self.motion = VehicleMotion::Falling;
            return self.fall(config, gravity, dt, None);
        }

        // Reach as far as this tick can carry the body
        let extra = self.vertical_velocity.abs() * dt;
        let contact = self.probe_ground(world, config, extra);
        if let Some(contact) = contact {
            let next_velocity = self.vertical_velocity - gravity * dt;
            let next_bottom = self.bottom_y() + next_velocity * dt;
            if next_velocity <= 0.0 && next_bottom <= contact.point.y {
                return Some(self.land(&contact, config, gravity));
            }
        }
        self.fall(config, gravity, dt, contact)
    }

    fn land(&mut self, contact: &GroundContact, config: &VehicleConfig, gravity: f32) -> SimEvent {
        let drop = (self.bottom_y() - contact.point.y).max(0.0);
        let impact_speed = (self.vertical_velocity * self.vertical_velocity + 2.0 * gravity * drop).sqrt();
        self.rest_on(contact);

        if impact_speed > config.min_bounce_velocity {
            self.vertical_velocity = impact_speed * config.bounce_factor;
            self.motion = VehicleMotion::Falling;
            debug!(impact_speed, rebound = self.vertical_velocity, "vehicle bounced");
            SimEvent::Bounced { impact_speed }
        } else {
            debug!(y = contact.point.y, "vehicle landed");
            SimEvent::Landed
        }
    }

    fn fall(
        &mut self,
        config: &VehicleConfig,
        gravity: f32,
        dt: f32,
        contact: Option<GroundContact>,
    ) -> Option<SimEvent> {
        self.vertical_velocity -= gravity * dt;
        self.position.y += self.vertical_velocity * dt;

        if self.is_tumbling() {
            let spin = Quat::from_scaled_axis(self.angular_velocity * dt);
            self.orientation = (spin * self.orientation).normalize();
            return None;
        }

        if let Some(contact) = contact {
            self.align_to(contact.normal, config.airborne_align_rate);
        }
        let drop = self.last_ground_y - self.bottom_y();
        if drop > self.size.y * config.tumble_drop_fraction {
            self.start_tumble(config);
            return Some(SimEvent::TumbleStarted);
        }
        None
    }

    fn start_tumble(&mut self, config: &VehicleConfig) {
        self.tumbles += 1;
        let seed = self.position.z * 7.31 + self.tumbles as f32;
        let jitter = Vec3::new(
            hash_unit(seed) - 0.5,
            hash_unit(seed + 1.7) - 0.5,
            hash_unit(seed + 3.9) - 0.5,
        );
        self.angular_velocity = jitter * config.tumble_spin;
        self.motion = VehicleMotion::Tumbling;
        debug!(spin = ?self.angular_velocity, "vehicle tumbling");
    }

    // ========================================================================
    // FORWARD MOTION
    // ========================================================================

    /// Drives forward one tick unless a wall is directly ahead.
    ///
    /// While grounded the step follows the ground plane.
    pub fn advance(&mut self, world: &impl RayQuery, config: &VehicleConfig, dt: f32) -> ForwardOutcome {
        let step = config.speed * dt;
        let forward = self.forward();
        let ray_length = (self.size.z * config.front_ray_length_factor + step).max(MIN_FRONT_RAY);
        let side = self.size.x * 0.5 * 0.85;
        let ray_y = -self.size.y * 0.5 + config.front_ray_lift;
        let ray_z = self.size.z * 0.5 - 0.01;

        for x in [0.0, -side, side] {
            let origin = self.position + self.orientation * Vec3::new(x, ray_y, ray_z);
            let Some(hit) = world.ray_cast(origin, forward, ray_length, SurfaceKind::OBSTACLES) else {
                continue;
            };
            let steep = hit.normal.angle_between(Vec3::Y) > config.obstacle_angle;
            if steep && hit.position.y > origin.y - 0.01 {
                debug!(distance = hit.distance, surface = ?hit.surface, "obstacle ahead");
                return ForwardOutcome::Blocked;
            }
        }

        let mut displacement = forward * step;
        if self.motion == VehicleMotion::Grounded {
            let n = self.ground_normal;
            displacement -= n * displacement.dot(n);
        }
        self.position += displacement;
        ForwardOutcome::Moved
    }
}
