//! Simulation Engine
//!
//! Owns everything a run needs: the collision world, the placed structure,
//! the car and the optional boat. Progress is a scripted sequence:
//!
//! ```text
//! NotStarted -> BoatRunning -> VehicleRunning -> Completed
//!      ^______________ reset (from any state) ________|
//! ```
//!
//! `tick` never fails. Anomalies such as falling out of the world become
//! state transitions, [`SimEvent`]s and notifications.

use glam::Vec3;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::boat::Boat;
use super::events::{Notification, NotificationQueue, SimEvent};
use super::loading::{AssetEvent, LoadingStage, placeholder_environment};
use super::vehicle::{ForwardOutcome, Vehicle};
use crate::game::config::{GameConfig, LevelAnchorConfig, SimulationConfig};
use crate::game::placement::{Placement, PlacementExtents, ReferenceFrame, StructurePlacer};
use crate::game::structure::GraphSnapshot;
use crate::physics::{Aabb, CollisionWorld, RayQuery, SurfaceKind, TriangleMesh};

/// Distance from the end bound counted as reaching it.
const END_TOLERANCE: f32 = 0.001;
/// Height above the scene the start pose is probed from.
const SETTLE_CLEARANCE: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SequenceState {
    NotStarted,
    BoatRunning,
    VehicleRunning,
    Completed,
}

/// Where along the structure the car starts and stops.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TravelBounds {
    /// Cross-axis position of the car, centered between the width planes
    pub start_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl TravelBounds {
    pub fn from_extents(extents: &PlacementExtents, vehicle_size: Vec3, padding: f32) -> Self {
        let half_depth = vehicle_size.z * 0.5;
        Self {
            start_x: extents.center_x(),
            min_z: extents.min_z + half_depth + padding,
            max_z: extents.max_z - half_depth - padding,
        }
    }

    /// No room to travel; a run completes as soon as it starts.
    pub fn is_degenerate(&self) -> bool {
        self.min_z >= self.max_z
    }

    pub fn length(&self) -> f32 {
        (self.max_z - self.min_z).max(0.0)
    }
}

pub struct SimulationEngine {
    config: SimulationConfig,
    placer: StructurePlacer,
    snapshot: GraphSnapshot,
    level: LevelAnchorConfig,
    stage: LoadingStage,
    world: CollisionWorld,
    environment_bounds: Option<Aabb>,
    placement: Option<Placement>,
    vehicle: Vehicle,
    boat: Option<Boat>,
    bounds: Option<TravelBounds>,
    sequence: SequenceState,
    events: Vec<SimEvent>,
    notifications: NotificationQueue,
}

impl SimulationEngine {
    /// Starts loading for one run. Nothing moves until every stage is done.
    pub fn new(config: &GameConfig, snapshot: GraphSnapshot, level: LevelAnchorConfig) -> Self {
        info!(
            joints = snapshot.joints.len(),
            members = snapshot.members.len(),
            level = level.name(),
            "simulation created"
        );
        Self {
            config: config.simulation.clone(),
            placer: StructurePlacer::new(config.placement.clone()),
            snapshot,
            level,
            stage: LoadingStage::Environment,
            world: CollisionWorld::new(),
            environment_bounds: None,
            placement: None,
            vehicle: Vehicle::new(config.simulation.vehicle.size),
            boat: None,
            bounds: None,
            sequence: SequenceState::NotStarted,
            events: Vec::new(),
            notifications: NotificationQueue::new(config.simulation.notification_secs),
        }
    }

    // ========================================================================
    // LOADING
    // ========================================================================

    pub fn stage(&self) -> LoadingStage {
        self.stage
    }

    pub fn is_ready(&self) -> bool {
        self.stage == LoadingStage::Ready
    }

    /// Feeds one asset completion. Events for a stage other than the current
    /// one are ignored.
    pub fn handle_asset_event(&mut self, event: AssetEvent) -> LoadingStage {
        if event.stage() != self.stage {
            debug!(expected = ?self.stage, got = ?event.stage(), "asset event out of order, ignored");
            return self.stage;
        }

        match event {
            AssetEvent::EnvironmentLoaded(mesh) => match mesh.bounds() {
                Some(bounds) => {
                    let frame = ReferenceFrame::from_environment_bounds(&bounds, self.placer.config());
                    self.install_environment(mesh, Some(bounds), frame);
                }
                None => self.environment_fallback("environment mesh is empty"),
            },
            AssetEvent::EnvironmentFailed(reason) => self.environment_fallback(&reason),
            AssetEvent::VehicleLoaded { size } if size.min_element() > 0.0 => {
                self.vehicle = Vehicle::new(size);
                self.stage = self.after_vehicle_stage();
            }
            AssetEvent::VehicleLoaded { size } => {
                self.vehicle_fallback(&format!("invalid vehicle size {size}"));
            }
            AssetEvent::VehicleFailed(reason) => self.vehicle_fallback(&reason),
            AssetEvent::BoatLoaded { size } => {
                let size = if size.min_element() > 0.0 { size } else { self.config.boat.size };
                self.boat = self
                    .environment_bounds
                    .map(|bounds| Boat::in_environment(&bounds, size, &self.config.boat));
                self.stage = LoadingStage::Ready;
            }
            AssetEvent::BoatFailed(reason) => {
                warn!(%reason, "boat model failed to load, running without it");
                self.notifications.push("Failed to load boat model");
                self.boat = None;
                self.stage = LoadingStage::Ready;
            }
        }

        if self.stage == LoadingStage::Ready {
            self.finish_loading();
        }
        self.stage
    }

    fn environment_fallback(&mut self, reason: &str) {
        warn!(%reason, "map model failed to load, using placeholder banks");
        self.notifications.push("Failed to load map model");
        let span = self.placer.target_span(&self.level);
        let (mesh, frame) = placeholder_environment(span);
        let bounds = mesh.bounds();
        self.install_environment(mesh, bounds, frame);
    }

    fn install_environment(&mut self, mesh: TriangleMesh, bounds: Option<Aabb>, frame: ReferenceFrame) {
        self.world.remove_kind(SurfaceKind::Environment);
        self.world.add(SurfaceKind::Environment, mesh);
        self.environment_bounds = bounds;
        self.place_structure(frame);
    }

    /// Builds the collidable structure once the frame is known.
    fn place_structure(&mut self, frame: ReferenceFrame) {
        let placement = self.placer.place(&self.snapshot, &self.level, &frame);
        self.world.remove_kind(SurfaceKind::Deck);
        self.world.remove_kind(SurfaceKind::Column);
        for (kind, mesh) in placement.collision_meshes() {
            self.world.add(kind, mesh);
        }
        debug!(bodies = self.world.len(), deck_base_y = frame.deck_base_y, "structure installed");
        self.placement = Some(placement);
        self.stage = LoadingStage::Vehicle;
    }

    fn vehicle_fallback(&mut self, reason: &str) {
        warn!(%reason, "car model failed to load, using default box");
        self.notifications.push("Failed to load car model");
        self.vehicle = Vehicle::new(self.config.vehicle.size);
        self.stage = self.after_vehicle_stage();
    }

    fn after_vehicle_stage(&self) -> LoadingStage {
        if self.config.boat.enabled {
            LoadingStage::Boat
        } else {
            LoadingStage::Ready
        }
    }

    fn finish_loading(&mut self) {
        let Some(placement) = &self.placement else {
            return;
        };
        let bounds = TravelBounds::from_extents(
            &placement.extents,
            self.vehicle.size,
            self.config.vehicle.travel_padding,
        );
        info!(
            min_z = bounds.min_z,
            max_z = bounds.max_z,
            boat = self.boat.is_some(),
            "simulation ready"
        );
        self.bounds = Some(bounds);
        self.restore_initial_pose();
    }

    // ========================================================================
    // SEQUENCE CONTROL
    // ========================================================================

    pub fn sequence_state(&self) -> SequenceState {
        self.sequence
    }

    /// Label for the single play/reset control.
    pub fn run_label(&self) -> &'static str {
        match self.sequence {
            SequenceState::NotStarted => "Run Car",
            SequenceState::BoatRunning | SequenceState::VehicleRunning => "Reset Car",
            SequenceState::Completed => "Run Again",
        }
    }

    /// Starts the sequence if idle, otherwise resets it.
    pub fn toggle_play_reset(&mut self) -> SequenceState {
        if !self.is_ready() {
            debug!(stage = ?self.stage, "play ignored while loading");
            return self.sequence;
        }
        match self.sequence {
            SequenceState::NotStarted => self.start(),
            _ => self.reset(),
        }
        self.sequence
    }

    fn start(&mut self) {
        info!("sequence started");
        self.events.push(SimEvent::SequenceStarted);
        if self.boat.is_some() {
            self.sequence = SequenceState::BoatRunning;
        } else {
            self.start_vehicle();
        }
    }

    fn start_vehicle(&mut self) {
        self.sequence = SequenceState::VehicleRunning;
        self.events.push(SimEvent::VehicleStarted);
        if self.bounds.is_some_and(|b| b.is_degenerate()) {
            debug!("no travel range, run completes immediately");
            self.complete(SimEvent::ReachedEnd);
        }
    }

    fn complete(&mut self, reason: SimEvent) {
        info!(?reason, z = self.vehicle.position.z, "run completed");
        self.events.push(reason);
        self.sequence = SequenceState::Completed;
    }

    /// Snaps every actor back to its initial pose.
    pub fn reset(&mut self) {
        info!(from = ?self.sequence, "sequence reset");
        self.restore_initial_pose();
        self.events.push(SimEvent::SequenceReset);
    }

    fn restore_initial_pose(&mut self) {
        self.sequence = SequenceState::NotStarted;
        if let Some(boat) = &mut self.boat {
            boat.reset();
        }
        let Some(bounds) = self.bounds else {
            return;
        };
        let deck_base_y = self.placement.as_ref().map_or(0.0, |p| p.extents.deck_base_y);
        let height = self.vehicle.size.y;
        let top = self
            .world
            .bounds(SurfaceKind::ALL)
            .map_or(deck_base_y + height * 2.0 + 10.0, |b| b.max.y + height * 2.0 + SETTLE_CLEARANCE);

        // Settle onto whatever is under the start point
        let probe = Vec3::new(bounds.start_x, top, bounds.min_z);
        let reach = top - self.config.world_floor;
        let ground_y = self
            .world
            .ray_cast(probe, Vec3::NEG_Y, reach, SurfaceKind::WALKABLE)
            .map_or(deck_base_y, |hit| hit.position.y);
        self.vehicle
            .place(Vec3::new(bounds.start_x, ground_y + height * 0.5, bounds.min_z));
        debug!(position = ?self.vehicle.position, "vehicle at start");
    }

    // ========================================================================
    // TICK
    // ========================================================================

    /// Advances the simulation by `dt` seconds (clamped to `max_delta`).
    pub fn tick(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let dt = dt.min(self.config.max_delta);
        self.notifications.tick(dt);
        if !self.is_ready() || self.sequence == SequenceState::NotStarted {
            return;
        }

        if self.sequence == SequenceState::BoatRunning {
            let arrived = self.boat.as_mut().is_none_or(|boat| boat.step(dt));
            if arrived {
                self.events.push(SimEvent::BoatArrived);
                self.start_vehicle();
            }
        }

        let vehicle_config = &self.config.vehicle;
        if let Some(event) =
            self.vehicle
                .update_vertical(&self.world, vehicle_config, self.config.gravity, dt)
        {
            self.events.push(event);
        }

        if self.sequence == SequenceState::VehicleRunning && !self.vehicle.is_tumbling() {
            match self.vehicle.advance(&self.world, vehicle_config, dt) {
                ForwardOutcome::Blocked => self.complete(SimEvent::ObstacleStop),
                ForwardOutcome::Moved => {
                    if let Some(bounds) = self.bounds {
                        if self.vehicle.position.z >= bounds.max_z - END_TOLERANCE {
                            self.vehicle.position.z = bounds.max_z;
                            self.complete(SimEvent::ReachedEnd);
                        }
                    }
                }
            }
        }

        if self.vehicle.position.y < self.config.world_floor {
            warn!(y = self.vehicle.position.y, "vehicle fell out of the world, resetting");
            self.notifications.push("Vehicle fell out of the world!");
            self.events.push(SimEvent::FellOutOfWorld);
            self.reset();
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn boat(&self) -> Option<&Boat> {
        self.boat.as_ref()
    }

    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    pub fn travel_bounds(&self) -> Option<TravelBounds> {
        self.bounds
    }

    pub fn collision_world(&self) -> &CollisionWorld {
        &self.world
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.active()
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::LevelAnchorConfig;
    use crate::game::structure::{AnchorKind, MaterialKind, StructureGraph};
    use glam::Vec2;

    fn no_boat() -> GameConfig {
        let mut config = GameConfig::default();
        config.simulation.boat.enabled = false;
        config
    }

    fn flat_deck_snapshot() -> GraphSnapshot {
        let mut graph = StructureGraph::new();
        let a = graph.add_joint(Vec2::new(-30.0, 0.0), Some(AnchorKind::PlaceholderAnchor)).id;
        let b = graph.add_joint(Vec2::new(30.0, 0.0), Some(AnchorKind::PlaceholderAnchor)).id;
        graph.add_member(a, b, MaterialKind::Deck).unwrap();
        graph.snapshot()
    }

    #[test]
    fn test_loading_stages_in_order() {
        let mut engine = SimulationEngine::new(&GameConfig::default(), flat_deck_snapshot(), LevelAnchorConfig::empty());
        assert_eq!(engine.stage(), LoadingStage::Environment);

        // Out of order is ignored
        assert_eq!(
            engine.handle_asset_event(AssetEvent::VehicleFailed("early".into())),
            LoadingStage::Environment
        );
        assert_eq!(engine.handle_asset_event(AssetEvent::EnvironmentFailed("404".into())), LoadingStage::Vehicle);
        assert!(engine.placement().is_some());
        assert_eq!(
            engine.handle_asset_event(AssetEvent::VehicleLoaded { size: Vec3::new(0.3, 0.2, 0.6) }),
            LoadingStage::Boat
        );
        assert_eq!(
            engine.handle_asset_event(AssetEvent::BoatLoaded { size: Vec3::new(0.6, 0.2, 0.3) }),
            LoadingStage::Ready
        );
        assert!(engine.boat().is_some());
        assert_eq!(engine.notifications().len(), 1);
        assert_eq!(engine.notifications()[0].message, "Failed to load map model");
    }

    #[test]
    fn test_play_waits_for_loading() {
        let mut engine = SimulationEngine::new(&no_boat(), flat_deck_snapshot(), LevelAnchorConfig::empty());
        assert_eq!(engine.toggle_play_reset(), SequenceState::NotStarted);
        engine.handle_asset_event(AssetEvent::EnvironmentFailed("missing".into()));
        engine.handle_asset_event(AssetEvent::VehicleFailed("missing".into()));
        assert!(engine.is_ready());
        assert_eq!(engine.toggle_play_reset(), SequenceState::VehicleRunning);
    }

    #[test]
    fn test_vehicle_starts_on_placeholder_bank() {
        let mut engine = SimulationEngine::new(&no_boat(), flat_deck_snapshot(), LevelAnchorConfig::empty());
        engine.handle_asset_event(AssetEvent::EnvironmentFailed("missing".into()));
        engine.handle_asset_event(AssetEvent::VehicleFailed("missing".into()));

        let bounds = engine.travel_bounds().unwrap();
        let car = engine.vehicle();
        assert!((car.position.z - bounds.min_z).abs() < 1e-5);
        assert!(car.bottom_y().abs() < 1e-4, "car should rest on the bank top");
    }

    #[test]
    fn test_run_label_follows_sequence() {
        let mut engine = SimulationEngine::new(&GameConfig::default(), flat_deck_snapshot(), LevelAnchorConfig::empty());
        engine.handle_asset_event(AssetEvent::EnvironmentFailed("missing".into()));
        engine.handle_asset_event(AssetEvent::VehicleFailed("missing".into()));
        engine.handle_asset_event(AssetEvent::BoatLoaded { size: Vec3::ONE });
        assert_eq!(engine.run_label(), "Run Car");

        engine.toggle_play_reset();
        assert_eq!(engine.sequence_state(), SequenceState::BoatRunning);
        assert_eq!(engine.run_label(), "Reset Car");

        engine.toggle_play_reset();
        assert_eq!(engine.sequence_state(), SequenceState::NotStarted);
        assert_eq!(engine.drain_events(), vec![SimEvent::SequenceStarted, SimEvent::SequenceReset]);
    }

    #[test]
    fn test_boat_runs_before_vehicle() {
        let mut engine = SimulationEngine::new(&GameConfig::default(), flat_deck_snapshot(), LevelAnchorConfig::empty());
        engine.handle_asset_event(AssetEvent::EnvironmentFailed("missing".into()));
        engine.handle_asset_event(AssetEvent::VehicleFailed("missing".into()));
        engine.handle_asset_event(AssetEvent::BoatLoaded { size: Vec3::ONE });
        engine.toggle_play_reset();

        let start_z = engine.vehicle().position.z;
        for _ in 0..10 {
            engine.tick(0.1);
        }
        // 1 s of a 1.5 s crossing: car has not moved
        assert_eq!(engine.sequence_state(), SequenceState::BoatRunning);
        assert_eq!(engine.vehicle().position.z, start_z);

        for _ in 0..6 {
            engine.tick(0.1);
        }
        assert_eq!(engine.sequence_state(), SequenceState::VehicleRunning);
        assert!(engine.drain_events().contains(&SimEvent::BoatArrived));
    }

    #[test]
    fn test_no_bridge_falls_out_and_resets() {
        let snapshot = StructureGraph::new().snapshot();
        let mut engine = SimulationEngine::new(&no_boat(), snapshot, LevelAnchorConfig::empty());
        engine.handle_asset_event(AssetEvent::EnvironmentFailed("missing".into()));
        engine.handle_asset_event(AssetEvent::VehicleFailed("missing".into()));
        engine.toggle_play_reset();

        let mut fell = false;
        for _ in 0..2000 {
            engine.tick(1.0 / 30.0);
            if engine.drain_events().contains(&SimEvent::FellOutOfWorld) {
                fell = true;
                break;
            }
        }
        assert!(fell);
        assert_eq!(engine.sequence_state(), SequenceState::NotStarted);
        assert!(
            engine
                .notifications()
                .iter()
                .any(|n| n.message == "Vehicle fell out of the world!")
        );
    }

    #[test]
    fn test_degenerate_travel_completes_immediately() {
        let mut config = no_boat();
        config.simulation.vehicle.travel_padding = 5.0;
        let mut engine = SimulationEngine::new(&config, flat_deck_snapshot(), LevelAnchorConfig::empty());
        engine.handle_asset_event(AssetEvent::EnvironmentFailed("missing".into()));
        engine.handle_asset_event(AssetEvent::VehicleFailed("missing".into()));

        assert!(engine.travel_bounds().unwrap().is_degenerate());
        assert_eq!(engine.toggle_play_reset(), SequenceState::Completed);
        assert_eq!(engine.run_label(), "Run Again");
    }
}
