//! Simulation Tests - Full Runs Through the Engine
//!
//! Drives complete runs: a clear run to the end bound, a wall stop, a run
//! across a built bridge and the out-of-world recovery.

use glam::{Vec2, Vec3};
use poly_bridge_engine::game::config::LevelAnchorConfig;
use poly_bridge_engine::game::simulation::{AssetEvent, SequenceState, SimEvent, SimulationEngine};
use poly_bridge_engine::game::structure::GraphSnapshot;
use poly_bridge_engine::game::{GameConfig, MaterialKind, ModeController, Tool};
use poly_bridge_engine::physics::TriangleMesh;

const DT: f32 = 1.0 / 60.0;

fn config_without_boat() -> GameConfig {
    let mut config = GameConfig::default();
    config.simulation.boat.enabled = false;
    config
}

/// Flat ground along the whole travel range, plus optional extra boxes.
fn environment(extra: &[(Vec3, Vec3)]) -> TriangleMesh {
    let mut triangles = TriangleMesh::cuboid(Vec3::new(-5.0, -1.0, -10.0), Vec3::new(5.0, 0.0, 10.0))
        .triangles()
        .to_vec();
    for &(min, max) in extra {
        triangles.extend_from_slice(TriangleMesh::cuboid(min, max).triangles());
    }
    TriangleMesh::new(triangles)
}

fn ready_engine(environment: TriangleMesh) -> SimulationEngine {
    let mut engine = SimulationEngine::new(
        &config_without_boat(),
        GraphSnapshot::default(),
        LevelAnchorConfig::empty(),
    );
    engine.handle_asset_event(AssetEvent::EnvironmentLoaded(environment));
    engine.handle_asset_event(AssetEvent::VehicleFailed("not needed".into()));
    assert!(engine.is_ready());
    engine
}

// ============================================================================
// Clear Run
// ============================================================================

#[test]
fn test_clear_run_stops_exactly_at_end_bound() {
    let mut engine = ready_engine(environment(&[]));
    let bounds = engine.travel_bounds().unwrap();
    assert!((engine.vehicle().position.z - bounds.min_z).abs() < 1e-5);

    engine.toggle_play_reset();
    let speed = GameConfig::default().simulation.vehicle.speed;
    let ticks = (bounds.length() / speed / DT).round() as usize;

    for _ in 0..ticks - 1 {
        engine.tick(DT);
    }
    assert_eq!(engine.sequence_state(), SequenceState::VehicleRunning);

    engine.tick(DT);
    assert_eq!(engine.sequence_state(), SequenceState::Completed);
    assert_eq!(engine.vehicle().position.z, bounds.max_z);
    assert!(engine.drain_events().contains(&SimEvent::ReachedEnd));
    assert_eq!(engine.run_label(), "Run Again");

    // Further ticks keep it parked
    engine.tick(DT);
    assert_eq!(engine.vehicle().position.z, bounds.max_z);
}

// ============================================================================
// Obstacle Stop
// ============================================================================

#[test]
fn test_wall_halts_run_without_penetration() {
    let wall = (Vec3::new(-5.0, 0.0, 0.5), Vec3::new(5.0, 1.0, 0.7));
    let mut engine = ready_engine(environment(&[wall]));
    engine.toggle_play_reset();

    let mut before = engine.vehicle().position;
    for _ in 0..600 {
        engine.tick(DT);
        if engine.sequence_state() == SequenceState::Completed {
            break;
        }
        before = engine.vehicle().position;
    }

    assert_eq!(engine.sequence_state(), SequenceState::Completed);
    let stopped = engine.vehicle().position;
    assert_eq!(stopped.z, before.z, "the stopping tick must not move the car");
    assert!((stopped - before).length() < 1e-5);
    let front = engine.vehicle().position.z + engine.vehicle().size.z * 0.5;
    assert!(front < 0.5, "car front {} went into the wall", front);
    assert!(engine.drain_events().contains(&SimEvent::ObstacleStop));
}

// ============================================================================
// End to End
// ============================================================================

#[test]
fn test_car_crosses_built_bridge() {
    let mut game = ModeController::new(config_without_boat(), None);
    game.select_tool(Tool::PlaceJoint);
    game.click_world(Vec2::new(0.0, 10.0));
    game.select_tool(Tool::PlaceMember(MaterialKind::Deck));
    for (from, to) in [(Vec2::new(-30.0, 0.0), Vec2::new(0.0, 10.0)), (Vec2::new(0.0, 10.0), Vec2::new(30.0, 0.0))] {
        game.click_world(from);
        game.click_world(to);
    }
    assert_eq!(game.graph().member_count(), 2);

    game.toggle_play_edit();
    game.handle_asset_event(AssetEvent::EnvironmentFailed("offline".into()));
    game.handle_asset_event(AssetEvent::VehicleFailed("offline".into()));
    assert_eq!(game.play_reset_vehicle(), Some(SequenceState::VehicleRunning));

    let mut events = Vec::new();
    for _ in 0..1200 {
        game.tick(DT);
        events.extend(game.drain_sim_events());
        if events.contains(&SimEvent::ReachedEnd) {
            break;
        }
    }
    assert!(events.contains(&SimEvent::ReachedEnd), "events: {:?}", events);
    assert!(!events.contains(&SimEvent::FellOutOfWorld));
    assert!(!events.contains(&SimEvent::ObstacleStop));
}

#[test]
fn test_missing_bridge_resets_after_fall() {
    let mut game = ModeController::new(config_without_boat(), None);
    game.toggle_play_edit();
    game.handle_asset_event(AssetEvent::EnvironmentFailed("offline".into()));
    game.handle_asset_event(AssetEvent::VehicleFailed("offline".into()));
    game.play_reset_vehicle();

    let mut fell = false;
    for _ in 0..1200 {
        game.tick(DT);
        if game.drain_sim_events().contains(&SimEvent::FellOutOfWorld) {
            fell = true;
            break;
        }
    }
    assert!(fell);
    let simulation = game.simulation().unwrap();
    assert_eq!(simulation.sequence_state(), SequenceState::NotStarted);
    assert_eq!(simulation.run_label(), "Run Car");
    let bounds = simulation.travel_bounds().unwrap();
    assert!((simulation.vehicle().position.z - bounds.min_z).abs() < 1e-5);
}
