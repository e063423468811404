//! Mode Controller
//!
//! Top-level owner of the structure graph. Exactly one of the two modes is
//! live at a time:
//!
//! - `Editing`: pointer input goes to the [`EditSession`]
//! - `Simulating`: a [`SimulationEngine`] runs against a placement of the graph
//!
//! Leaving the simulation discards every joint and member the player
//! authored; the graph comes back holding only its anchors.

use glam::Vec2;
use serde::Serialize;
use tracing::{debug, info};

use crate::game::builder::{EditOutcome, EditSession, MemberPreview, Tool};
use crate::game::config::{GameConfig, LevelAnchorConfig};
use crate::game::placement::{Placement, ReferenceFrame, StructurePlacer};
use crate::game::simulation::{AssetEvent, SequenceState, SimEvent, SimulationEngine};
use crate::game::structure::{GraphEvent, GraphSnapshot, StructureGraph};
use crate::input::{MouseButton, OrthoViewport, PointerEvent, PointerProjector};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Mode {
    Editing,
    Simulating,
}

pub struct ModeController {
    // === Configuration ===
    config: GameConfig,
    /// Loaded level, if any
    level: Option<LevelAnchorConfig>,

    // === Editing ===
    graph: StructureGraph,
    session: EditSession,
    /// Screen-to-plane projection for pointer events
    viewport: OrthoViewport,

    // === Simulation ===
    /// Present exactly while simulating
    simulation: Option<SimulationEngine>,
}

impl ModeController {
    /// Starts in editing mode with the level's anchors, or two placeholders.
    pub fn new(config: GameConfig, level: Option<LevelAnchorConfig>) -> Self {
        let mut graph = StructureGraph::new();
        let mut session = EditSession::new(&config.editor);
        session.reset_bridge(&mut graph, level.as_ref());
        let viewport = OrthoViewport::new(Vec2::ZERO, config.editor.view_height);

        Self {
            config,
            level,
            graph,
            session,
            viewport,
            simulation: None,
        }
    }

    pub fn mode(&self) -> Mode {
        if self.simulation.is_some() {
            Mode::Simulating
        } else {
            Mode::Editing
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn graph(&self) -> &StructureGraph {
        &self.graph
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn simulation(&self) -> Option<&SimulationEngine> {
        self.simulation.as_ref()
    }

    pub fn set_viewport(&mut self, viewport: OrthoViewport) {
        self.viewport = viewport;
    }

    /// Replaces the level and resets the bridge to its anchors.
    ///
    /// Only allowed while editing.
    pub fn load_level(&mut self, level: Option<LevelAnchorConfig>) -> bool {
        if self.mode() != Mode::Editing {
            debug!("level change ignored while simulating");
            return false;
        }
        info!(level = level.as_ref().map_or("none", |l| l.name()), "level loaded");
        self.level = level;
        self.session.reset_bridge(&mut self.graph, self.level.as_ref());
        true
    }

    // ========================================================================
    // EDITING COMMANDS
    // ========================================================================

    /// Tool-select command. Ignored while simulating.
    pub fn select_tool(&mut self, tool: Tool) -> bool {
        if self.mode() != Mode::Editing {
            return false;
        }
        self.session.select_tool(tool);
        true
    }

    /// Applies the active tool at a world position.
    pub fn click_world(&mut self, position: Vec2) -> EditOutcome {
        if self.mode() != Mode::Editing {
            return EditOutcome::Ignored;
        }
        self.session.click(&mut self.graph, position)
    }

    /// Left presses act as clicks; other buttons are ignored.
    pub fn pointer_down(&mut self, event: &PointerEvent) -> EditOutcome {
        if event.button != Some(MouseButton::Left) {
            return EditOutcome::Ignored;
        }
        match self.viewport.to_world(event) {
            Some(position) => self.click_world(position),
            None => EditOutcome::Ignored,
        }
    }

    pub fn pointer_move(&mut self, event: &PointerEvent) {
        if self.mode() != Mode::Editing {
            return;
        }
        if let Some(position) = self.viewport.to_world(event) {
            self.session.pointer_moved(position);
        }
    }

    /// Rubber-band line while a member's second joint is pending.
    pub fn preview(&self) -> Option<MemberPreview> {
        match self.mode() {
            Mode::Editing => self.session.preview(&self.graph),
            Mode::Simulating => None,
        }
    }

    /// Reset-design command: back to editing, anchors only.
    pub fn reset_design(&mut self) {
        if self.mode() == Mode::Simulating {
            self.exit_simulation();
        } else {
            self.session.reset_bridge(&mut self.graph, self.level.as_ref());
        }
    }

    /// Graph changes for a presentation layer.
    pub fn drain_graph_events(&mut self) -> Vec<GraphEvent> {
        self.graph.drain_events()
    }

    // ========================================================================
    // MODE SWITCHING
    // ========================================================================

    /// Play/edit command. Returns the mode now live.
    pub fn toggle_play_edit(&mut self) -> Mode {
        match self.mode() {
            Mode::Editing => self.enter_simulation(),
            Mode::Simulating => self.exit_simulation(),
        }
        self.mode()
    }

    /// Graph as the simulation sees it, with the level's anchors in place.
    pub fn simulation_snapshot(&self) -> GraphSnapshot {
        let snapshot = self.graph.snapshot();
        match self.level.as_ref().filter(|l| !l.is_empty()) {
            Some(level) => {
                let anchors: Vec<Vec2> = level.anchors().collect();
                snapshot.with_level_anchors(&anchors)
            }
            None => snapshot,
        }
    }

    fn enter_simulation(&mut self) {
        // Drop any half-placed member before the graph is frozen
        self.session.select_tool(Tool::None);
        let snapshot = self.simulation_snapshot();
        let level = self.level.clone().unwrap_or_else(LevelAnchorConfig::empty);
        info!(
            joints = snapshot.joints.len(),
            members = snapshot.members.len(),
            "entering simulation"
        );
        self.simulation = Some(SimulationEngine::new(&self.config, snapshot, level));
    }

    fn exit_simulation(&mut self) {
        self.simulation = None;
        self.session.reset_bridge(&mut self.graph, self.level.as_ref());
        info!(anchors = self.graph.joint_count(), "back to editing, authored structure discarded");
    }

    // ========================================================================
    // SIMULATION COMMANDS
    // ========================================================================

    pub fn handle_asset_event(&mut self, event: AssetEvent) {
        if let Some(simulation) = &mut self.simulation {
            simulation.handle_asset_event(event);
        }
    }

    /// Play/reset-vehicle command. `None` while editing.
    pub fn play_reset_vehicle(&mut self) -> Option<SequenceState> {
        self.simulation.as_mut().map(SimulationEngine::toggle_play_reset)
    }

    pub fn tick(&mut self, dt: f32) {
        if let Some(simulation) = &mut self.simulation {
            simulation.tick(dt);
        }
    }

    pub fn drain_sim_events(&mut self) -> Vec<SimEvent> {
        self.simulation
            .as_mut()
            .map(SimulationEngine::drain_events)
            .unwrap_or_default()
    }

    /// 3D projection of the current graph.
    ///
    /// While simulating this is the placement the run uses. While editing it
    /// is computed on demand against a default frame.
    pub fn placement_snapshot(&self) -> Placement {
        if let Some(placement) = self.simulation.as_ref().and_then(|s| s.placement()) {
            return placement.clone();
        }
        let level = self.level.clone().unwrap_or_else(LevelAnchorConfig::empty);
        StructurePlacer::new(self.config.placement.clone()).place(
            &self.simulation_snapshot(),
            &level,
            &ReferenceFrame::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::structure::MaterialKind;

    fn level() -> LevelAnchorConfig {
        LevelAnchorConfig::new("gap", [Vec2::new(-20.0, 0.0), Vec2::new(20.0, 0.0)])
    }

    #[test]
    fn test_starts_editing_with_anchors() {
        let game = ModeController::new(GameConfig::default(), Some(level()));
        assert_eq!(game.mode(), Mode::Editing);
        assert_eq!(game.graph().joint_count(), 2);
        assert!(game.graph().joints().all(|j| j.is_anchor()));
    }

    #[test]
    fn test_round_trip_discards_authored_structure() {
        let mut game = ModeController::new(GameConfig::default(), None);
        game.select_tool(Tool::PlaceJoint);
        assert!(matches!(game.click_world(Vec2::new(0.0, 10.0)), EditOutcome::JointAdded(_)));
        assert_eq!(game.graph().non_anchor_joint_count(), 1);

        assert_eq!(game.toggle_play_edit(), Mode::Simulating);
        let snapshot = game.simulation().unwrap().placement();
        assert!(snapshot.is_none(), "placement waits for the environment");
        assert_eq!(game.click_world(Vec2::new(10.0, 10.0)), EditOutcome::Ignored);

        assert_eq!(game.toggle_play_edit(), Mode::Editing);
        assert_eq!(game.graph().joint_count(), 2);
        assert_eq!(game.graph().member_count(), 0);
        assert_eq!(game.session().tool(), Tool::None);
    }

    #[test]
    fn test_simulation_uses_level_anchors() {
        let mut game = ModeController::new(GameConfig::default(), None);
        game.load_level(Some(level()));
        let snapshot = game.simulation_snapshot();
        let xs: Vec<f32> = snapshot.joints.iter().filter(|j| j.is_anchor()).map(|j| j.position.x).collect();
        assert_eq!(xs, vec![-20.0, 20.0]);
    }

    #[test]
    fn test_pointer_click_goes_through_viewport() {
        let mut game = ModeController::new(GameConfig::default(), None);
        game.select_tool(Tool::PlaceMember(MaterialKind::Deck));

        // Center of an 800x600 viewport is world (0, 0); left anchor is at -30
        let width = game.config().editor.view_height * 800.0 / 600.0;
        let x = 400.0 + (-30.0 / width) * 800.0;
        let press = PointerEvent::press(x, 300.0, MouseButton::Left, (800, 600));
        assert!(matches!(game.pointer_down(&press), EditOutcome::FirstJointSelected(_)));

        game.pointer_move(&PointerEvent::moved(600.0, 200.0, (800, 600)));
        assert!(game.preview().is_some());

        let right = PointerEvent::press(x, 300.0, MouseButton::Right, (800, 600));
        assert_eq!(game.pointer_down(&right), EditOutcome::Ignored);
    }

    #[test]
    fn test_play_reset_vehicle_only_while_simulating() {
        let mut game = ModeController::new(GameConfig::default(), None);
        assert_eq!(game.play_reset_vehicle(), None);
        game.toggle_play_edit();
        // Still loading: the sequence does not start
        assert_eq!(game.play_reset_vehicle(), Some(SequenceState::NotStarted));
    }

    #[test]
    fn test_reset_design_from_simulation() {
        let mut game = ModeController::new(GameConfig::default(), None);
        game.toggle_play_edit();
        game.reset_design();
        assert_eq!(game.mode(), Mode::Editing);
        assert_eq!(game.graph().joint_count(), 2);
    }
}
