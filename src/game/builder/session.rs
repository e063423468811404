//! Edit Session
//!
//! The interactive authoring state machine. While editing is live the session
//! is the only thing that mutates the [`StructureGraph`]; it borrows the graph
//! per call instead of owning it so the mode controller can hand the same
//! graph to the placer when the simulation starts.

use glam::Vec2;
use tracing::{debug, info};

use super::picking::{EntityPicker, PickKind, Picked, ProximityPicker};
use super::tools::{EditState, MemberPreview, Tool};
use crate::game::config::{EditorConfig, LevelAnchorConfig};
use crate::game::structure::{AnchorKind, GraphError, JointId, MemberId, StructureGraph};
use crate::world::GridConfig;

/// What a click did.
#[derive(Clone, Debug, PartialEq)]
pub enum EditOutcome {
    /// No tool active, or nothing under the pointer to act on
    Ignored,
    JointAdded(JointId),
    /// A joint already occupies the snapped position
    JointOccupied,
    FirstJointSelected(JointId),
    MemberAdded(MemberId),
    MemberRejected(GraphError),
    /// Empty space clicked while a first joint was held
    SelectionCancelled,
    MemberDeleted(MemberId),
    JointDeleted { joint: JointId, cascaded: Vec<MemberId> },
    DeleteRejected(GraphError),
}

impl EditOutcome {
    /// True when the graph was modified.
    pub fn changed_graph(&self) -> bool {
        matches!(
            self,
            EditOutcome::JointAdded(_)
                | EditOutcome::MemberAdded(_)
                | EditOutcome::MemberDeleted(_)
                | EditOutcome::JointDeleted { .. }
        )
    }
}

/// Tool state plus the pending half of a member.
#[derive(Debug, Clone)]
pub struct EditSession<P = ProximityPicker> {
    state: EditState,
    picker: P,
    grid: GridConfig,
    joint_epsilon: f32,
    default_anchors: [Vec2; 2],
    pointer: Option<Vec2>,
}

impl EditSession<ProximityPicker> {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_picker(config, ProximityPicker::from_config(config))
    }
}

impl<P: EntityPicker> EditSession<P> {
    pub fn with_picker(config: &EditorConfig, picker: P) -> Self {
        Self {
            state: EditState::Idle,
            picker,
            grid: config.grid,
            joint_epsilon: config.joint_epsilon,
            default_anchors: config.default_anchor_positions(),
            pointer: None,
        }
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn tool(&self) -> Tool {
        self.state.tool()
    }

    /// Switches tool. Any half-made member is dropped.
    pub fn select_tool(&mut self, tool: Tool) {
        if let EditState::PlacingMemberAwaitingSecondJoint { first, .. } = self.state {
            debug!(%first, "pending member discarded by tool change");
        }
        self.state = EditState::for_tool(tool);
        info!(tool = tool.label(), "tool selected");
    }

    /// Tracks the pointer for the member preview.
    pub fn pointer_moved(&mut self, position: Vec2) {
        self.pointer = Some(position);
    }

    /// Line from the held first joint to the pointer, if a member is in progress.
    pub fn preview(&self, graph: &StructureGraph) -> Option<MemberPreview> {
        let EditState::PlacingMemberAwaitingSecondJoint { material, first } = self.state else {
            return None;
        };
        let from = graph.joint(first)?.position;
        Some(MemberPreview {
            material,
            from,
            to: self.pointer.unwrap_or(from),
        })
    }

    /// Applies the current tool at a world position.
    pub fn click(&mut self, graph: &mut StructureGraph, position: Vec2) -> EditOutcome {
        self.pointer = Some(position);
        let outcome = match self.state {
            EditState::Idle => EditOutcome::Ignored,
            EditState::PlacingJoint => self.place_joint(graph, position),
            EditState::PlacingMemberAwaitingFirstJoint(material) => {
                match self.picker.pick(graph, position, PickKind::Joint) {
                    Some(Picked::Joint(first)) => {
                        self.state = EditState::PlacingMemberAwaitingSecondJoint { material, first };
                        EditOutcome::FirstJointSelected(first)
                    }
                    _ => EditOutcome::Ignored,
                }
            }
            EditState::PlacingMemberAwaitingSecondJoint { material, first } => {
                self.state = EditState::PlacingMemberAwaitingFirstJoint(material);
                match self.picker.pick(graph, position, PickKind::Joint) {
                    Some(Picked::Joint(second)) => match graph.add_member(first, second, material) {
                        Ok(member) => EditOutcome::MemberAdded(member.id),
                        Err(err) => EditOutcome::MemberRejected(err),
                    },
                    _ => EditOutcome::SelectionCancelled,
                }
            }
            EditState::Deleting => self.delete_at(graph, position),
        };
        debug!(?outcome, x = position.x, y = position.y, "edit click");
        outcome
    }

    fn place_joint(&self, graph: &mut StructureGraph, position: Vec2) -> EditOutcome {
        let snapped = self.grid.snap(position);
        if graph.joint_at(snapped, self.joint_epsilon).is_some() {
            return EditOutcome::JointOccupied;
        }
        EditOutcome::JointAdded(graph.add_joint(snapped, None).id)
    }

    fn delete_at(&self, graph: &mut StructureGraph, position: Vec2) -> EditOutcome {
        if let Some(Picked::Member(member)) = self.picker.pick(graph, position, PickKind::Member) {
            return match graph.remove_member(member) {
                Ok(()) => EditOutcome::MemberDeleted(member),
                Err(err) => EditOutcome::DeleteRejected(err),
            };
        }
        match self.picker.pick(graph, position, PickKind::Joint) {
            Some(Picked::Joint(joint)) => match graph.remove_joint(joint) {
                Ok(cascaded) => EditOutcome::JointDeleted { joint, cascaded },
                Err(err) => EditOutcome::DeleteRejected(err),
            },
            _ => EditOutcome::Ignored,
        }
    }

    /// Discards every user edit and re-seeds the anchors.
    ///
    /// Uses the level's anchors when a non-empty level is given, otherwise
    /// two symmetric placeholders.
    pub fn reset_bridge(&mut self, graph: &mut StructureGraph, level: Option<&LevelAnchorConfig>) {
        if let EditState::PlacingMemberAwaitingSecondJoint { material, .. } = self.state {
            self.state = EditState::PlacingMemberAwaitingFirstJoint(material);
        }
        match level.filter(|l| !l.is_empty()) {
            Some(level) => graph.reseed_anchors(level.anchors(), AnchorKind::LevelAnchor),
            None => graph.reseed_anchors(self.default_anchors, AnchorKind::PlaceholderAnchor),
        }
        info!(anchors = graph.joint_count(), "bridge reset");
    }
}
