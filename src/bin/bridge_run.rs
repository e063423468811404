//! Bridge Run - Headless Driver
//!
//! Builds a two-span deck bridge between the level anchors, switches to the
//! simulation with placeholder assets and runs the car until the run ends.
//!
//! Run with: `cargo run --bin bridge_run -- [--level level.json] [--config config.json]`
//!
//! Set `RUST_LOG=debug` for per-tick detail.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;
use tracing::{info, warn};

use poly_bridge_engine::game::simulation::{AssetEvent, SequenceState, SimEvent};
use poly_bridge_engine::game::{ConfigError, GameConfig, LevelAnchorConfig, MaterialKind, ModeController, Tool};

/// Simulated frame rate
const TICK_RATE: f32 = 60.0;
/// Default simulated time limit (s)
const TIME_LIMIT: f32 = 30.0;

#[derive(Parser, Debug)]
#[command(name = "bridge_run")]
#[command(about = "Builds a bridge and drives the car across it without a window", long_about = None)]
struct Args {
    /// Level anchor JSON; two placeholder anchors when omitted
    #[arg(long)]
    level: Option<PathBuf>,
    /// Game config JSON; defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulated seconds before giving up
    #[arg(long, default_value_t = TIME_LIMIT)]
    time_limit: f32,
}

fn main() -> Result<(), ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let level = args.level.as_ref().map(LevelAnchorConfig::load).transpose()?;
    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let mut game = ModeController::new(config, level);
    build_bridge(&mut game);
    info!(
        joints = game.graph().joint_count(),
        members = game.graph().member_count(),
        "bridge built"
    );

    game.toggle_play_edit();
    game.handle_asset_event(AssetEvent::EnvironmentFailed("no map model in headless run".into()));
    game.handle_asset_event(AssetEvent::VehicleFailed("no car model in headless run".into()));
    game.handle_asset_event(AssetEvent::BoatFailed("no boat model in headless run".into()));
    game.play_reset_vehicle();

    let dt = 1.0 / TICK_RATE;
    let mut elapsed = 0.0;
    while elapsed < args.time_limit {
        game.tick(dt);
        elapsed += dt;
        for event in game.drain_sim_events() {
            match event {
                SimEvent::ObstacleStop | SimEvent::ReachedEnd | SimEvent::FellOutOfWorld => {
                    info!(?event, elapsed, "run event");
                }
                _ => {}
            }
        }

        let Some(simulation) = game.simulation() else {
            break;
        };
        if simulation.sequence_state() == SequenceState::Completed {
            break;
        }
    }

    let Some(simulation) = game.simulation() else {
        return Ok(());
    };
    let car = simulation.vehicle();
    match simulation.sequence_state() {
        SequenceState::Completed => info!(elapsed, z = car.position.z, "run completed"),
        state => warn!(?state, elapsed, "run did not complete"),
    }
    for notification in simulation.notifications() {
        info!(message = %notification.message, "notification");
    }
    Ok(())
}

/// Raises a joint midway between the first two anchors and decks it to both.
fn build_bridge(game: &mut ModeController) {
    let anchors: Vec<Vec2> = game.graph().joints().map(|j| j.position).collect();
    let &[left, right, ..] = anchors.as_slice() else {
        warn!("need two anchors to build a bridge");
        return;
    };
    let mid = (left + right) * 0.5 + Vec2::new(0.0, 10.0);

    game.select_tool(Tool::PlaceJoint);
    game.click_world(mid);
    let Some(mid) = game.graph().joints().find(|j| !j.is_anchor()).map(|j| j.position) else {
        return;
    };

    game.select_tool(Tool::PlaceMember(MaterialKind::Deck));
    for (from, to) in [(left, mid), (mid, right)] {
        game.click_world(from);
        game.click_world(to);
    }
    game.select_tool(Tool::None);
}
