//! Structure Graph
//!
//! Joints and the members between them. Pure data plus invariant checks:
//!
//! - every member references two distinct joints currently in the graph
//! - at most one member per unordered joint pair
//! - anchors cannot be removed one by one (only a non-preserving `clear`)
//! - ids come from a per-graph monotonic generator and are never reused
//!
//! Changes are queued as [`GraphEvent`]s for whatever draws the structure.
//! Hosts should drain them once per frame.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::ids::{IdGenerator, JointId, MemberId};

/// Structural role of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    /// Walkable road surface
    Deck,
    /// Thin vertical or diagonal support
    Column,
}

impl MaterialKind {
    pub fn is_walkable(self) -> bool {
        matches!(self, MaterialKind::Deck)
    }
}

/// Where an anchor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorKind {
    /// Defined by the loaded level
    LevelAnchor,
    /// Stand-in laid out by the editor when no level is loaded
    PlaceholderAnchor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub id: JointId,
    pub position: Vec2,
    /// `Some` for joints the user cannot delete
    pub anchor: Option<AnchorKind>,
}

impl Joint {
    pub fn is_anchor(&self) -> bool {
        self.anchor.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub end1: JointId,
    pub end2: JointId,
    pub material: MaterialKind,
}

impl Member {
    pub fn touches(&self, joint: JointId) -> bool {
        self.end1 == joint || self.end2 == joint
    }

    /// True when this member joins `a` and `b` in either order.
    pub fn joins(&self, a: JointId, b: JointId) -> bool {
        (self.end1 == a && self.end2 == b) || (self.end1 == b && self.end2 == a)
    }
}

/// Why a graph mutation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("{0} does not exist")]
    JointNotFound(JointId),

    #[error("{0} does not exist")]
    MemberNotFound(MemberId),

    #[error("{0} is an anchor and cannot be removed")]
    IsAnchor(JointId),

    #[error("a member cannot start and end at {0}")]
    SelfLoop(JointId),

    #[error("those joints are already connected by {existing}")]
    DuplicateMember { existing: MemberId },
}

/// Change notification for a presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    JointAdded(Joint),
    JointRemoved(JointId),
    MemberAdded { member: Member, from: Vec2, to: Vec2 },
    MemberRemoved(MemberId),
}

/// Read-only copy of a graph, detached from its id generator and event queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub joints: Vec<Joint>,
    pub members: Vec<Member>,
}

impl GraphSnapshot {
    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.iter().find(|j| j.id == id)
    }

    /// Replaces placeholder anchors with the level's anchors.
    ///
    /// Placeholders are matched to level anchors in creation order and keep
    /// their ids, so members attached to them stay attached. Surplus level
    /// anchors are appended as new joints.
    pub fn with_level_anchors(mut self, level_anchors: &[Vec2]) -> Self {
        let mut remaining = level_anchors.iter().copied();
        for joint in self
            .joints
            .iter_mut()
            .filter(|j| j.anchor == Some(AnchorKind::PlaceholderAnchor))
        {
            let Some(position) = remaining.next() else {
                break;
            };
            joint.position = position;
            joint.anchor = Some(AnchorKind::LevelAnchor);
        }

        let last_id = self
            .joints
            .iter()
            .map(|j| j.id.raw())
            .chain(self.members.iter().map(|m| m.id.raw()))
            .max();
        let mut ids = last_id.map_or_else(IdGenerator::new, IdGenerator::starting_after);
        for position in remaining {
            // Only add anchors the graph does not already have
            let present = self
                .joints
                .iter()
                .any(|j| j.anchor == Some(AnchorKind::LevelAnchor) && j.position == position);
            if !present {
                self.joints.push(Joint {
                    id: ids.joint(),
                    position,
                    anchor: Some(AnchorKind::LevelAnchor),
                });
            }
        }
        self
    }
}

/// Joints and members of the structure being authored.
#[derive(Debug, Default)]
pub struct StructureGraph {
    joints: BTreeMap<JointId, Joint>,
    members: BTreeMap<MemberId, Member>,
    ids: IdGenerator,
    events: Vec<GraphEvent>,
}

impl StructureGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a joint. Always succeeds.
    pub fn add_joint(&mut self, position: Vec2, anchor: Option<AnchorKind>) -> Joint {
        let joint = Joint {
            id: self.ids.joint(),
            position,
            anchor,
        };
        self.joints.insert(joint.id, joint);
        debug!(id = %joint.id, x = position.x, y = position.y, ?anchor, "joint added");
        self.events.push(GraphEvent::JointAdded(joint));
        joint
    }

    /// Connects two existing, distinct, not yet connected joints.
    pub fn add_member(
        &mut self,
        a: JointId,
        b: JointId,
        material: MaterialKind,
    ) -> Result<Member, GraphError> {
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        let from = self.joints.get(&a).ok_or(GraphError::JointNotFound(a))?.position;
        let to = self.joints.get(&b).ok_or(GraphError::JointNotFound(b))?.position;
        if let Some(existing) = self.find_member(a, b) {
            return Err(GraphError::DuplicateMember { existing: existing.id });
        }

        let member = Member {
            id: self.ids.member(),
            end1: a,
            end2: b,
            material,
        };
        self.members.insert(member.id, member);
        debug!(id = %member.id, %a, %b, ?material, "member added");
        self.events.push(GraphEvent::MemberAdded { member, from, to });
        Ok(member)
    }

    /// Removes a non-anchor joint and every member attached to it.
    ///
    /// Returns the ids of the cascaded members.
    pub fn remove_joint(&mut self, id: JointId) -> Result<Vec<MemberId>, GraphError> {
        let joint = self.joints.get(&id).ok_or(GraphError::JointNotFound(id))?;
        if joint.is_anchor() {
            return Err(GraphError::IsAnchor(id));
        }

        let attached: Vec<MemberId> = self
            .members
            .values()
            .filter(|m| m.touches(id))
            .map(|m| m.id)
            .collect();
        for member in &attached {
            self.members.remove(member);
            self.events.push(GraphEvent::MemberRemoved(*member));
        }
        self.joints.remove(&id);
        self.events.push(GraphEvent::JointRemoved(id));
        debug!(%id, cascaded = attached.len(), "joint removed");
        Ok(attached)
    }

    pub fn remove_member(&mut self, id: MemberId) -> Result<(), GraphError> {
        self.members.remove(&id).ok_or(GraphError::MemberNotFound(id))?;
        self.events.push(GraphEvent::MemberRemoved(id));
        debug!(%id, "member removed");
        Ok(())
    }

    /// Removes every member, and every joint or only the non-anchor ones.
    pub fn clear(&mut self, preserve_anchors: bool) {
        for id in std::mem::take(&mut self.members).into_keys() {
            self.events.push(GraphEvent::MemberRemoved(id));
        }
        let removed: Vec<JointId> = self
            .joints
            .values()
            .filter(|j| !(preserve_anchors && j.is_anchor()))
            .map(|j| j.id)
            .collect();
        for id in removed {
            self.joints.remove(&id);
            self.events.push(GraphEvent::JointRemoved(id));
        }
        debug!(preserve_anchors, remaining = self.joints.len(), "graph cleared");
    }

    /// Clears everything and adds one anchor per position.
    pub fn reseed_anchors(&mut self, positions: impl IntoIterator<Item = Vec2>, kind: AnchorKind) {
        self.clear(false);
        for position in positions {
            self.add_joint(position, Some(kind));
        }
    }

    /// Unordered lookup of the member joining two joints.
    pub fn find_member(&self, a: JointId, b: JointId) -> Option<&Member> {
        self.members.values().find(|m| m.joins(a, b))
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(&id)
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(&id)
    }

    /// Joints in creation order.
    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.joints.values()
    }

    /// Members in creation order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    /// First joint within `epsilon` of `position` on both axes.
    pub fn joint_at(&self, position: Vec2, epsilon: f32) -> Option<&Joint> {
        self.joints.values().find(|j| {
            (j.position.x - position.x).abs() < epsilon && (j.position.y - position.y).abs() < epsilon
        })
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Joints the user placed (what the toolbar counts).
    pub fn non_anchor_joint_count(&self) -> usize {
        self.joints.values().filter(|j| !j.is_anchor()).count()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            joints: self.joints.values().copied().collect(),
            members: self.members.values().copied().collect(),
        }
    }

    /// Takes the queued change notifications.
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_anchors() -> (StructureGraph, JointId, JointId) {
        let mut graph = StructureGraph::new();
        let a = graph.add_joint(Vec2::new(-30.0, 0.0), Some(AnchorKind::LevelAnchor)).id;
        let b = graph.add_joint(Vec2::new(30.0, 0.0), Some(AnchorKind::LevelAnchor)).id;
        (graph, a, b)
    }

    #[test]
    fn test_duplicate_member_rejected_either_order() {
        let (mut graph, a, b) = graph_with_anchors();
        let first = graph.add_member(a, b, MaterialKind::Deck).unwrap();
        assert_eq!(
            graph.add_member(a, b, MaterialKind::Deck),
            Err(GraphError::DuplicateMember { existing: first.id })
        );
        assert_eq!(
            graph.add_member(b, a, MaterialKind::Column),
            Err(GraphError::DuplicateMember { existing: first.id })
        );
        assert_eq!(graph.member_count(), 1);
    }

    #[test]
    fn test_self_loop_rejected() {
        let (mut graph, a, _) = graph_with_anchors();
        assert_eq!(graph.add_member(a, a, MaterialKind::Deck), Err(GraphError::SelfLoop(a)));
        assert_eq!(graph.member_count(), 0);
    }

    #[test]
    fn test_member_requires_existing_joints() {
        let (mut graph, a, _) = graph_with_anchors();
        let ghost = JointId(99);
        assert_eq!(graph.add_member(a, ghost, MaterialKind::Deck), Err(GraphError::JointNotFound(ghost)));
    }

    #[test]
    fn test_remove_joint_cascades() {
        let (mut graph, a, b) = graph_with_anchors();
        let mid = graph.add_joint(Vec2::new(0.0, 10.0), None).id;
        let m1 = graph.add_member(a, mid, MaterialKind::Deck).unwrap().id;
        let m2 = graph.add_member(mid, b, MaterialKind::Deck).unwrap().id;
        let keep = graph.add_member(a, b, MaterialKind::Column).unwrap().id;

        let cascaded = graph.remove_joint(mid).unwrap();
        assert_eq!(cascaded, vec![m1, m2]);
        assert!(graph.joint(mid).is_none());
        assert!(graph.members().all(|m| !m.touches(mid)));
        assert!(graph.member(keep).is_some());
    }

    #[test]
    fn test_anchor_protected() {
        let (mut graph, a, b) = graph_with_anchors();
        graph.add_member(a, b, MaterialKind::Deck).unwrap();
        let before = graph.snapshot();
        assert_eq!(graph.remove_joint(a), Err(GraphError::IsAnchor(a)));
        assert_eq!(graph.snapshot(), before);
    }

    #[test]
    fn test_missing_ids_are_failures() {
        let (mut graph, _, _) = graph_with_anchors();
        assert_eq!(graph.remove_joint(JointId(42)), Err(GraphError::JointNotFound(JointId(42))));
        assert_eq!(graph.remove_member(MemberId(42)), Err(GraphError::MemberNotFound(MemberId(42))));
    }

    #[test]
    fn test_clear_preserving_anchors() {
        let (mut graph, a, _) = graph_with_anchors();
        let mid = graph.add_joint(Vec2::new(0.0, 10.0), None).id;
        graph.add_member(a, mid, MaterialKind::Deck).unwrap();

        graph.clear(true);
        assert_eq!(graph.joint_count(), 2);
        assert_eq!(graph.member_count(), 0);
        assert_eq!(graph.non_anchor_joint_count(), 0);

        graph.clear(false);
        assert_eq!(graph.joint_count(), 0);
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let (mut graph, _, b) = graph_with_anchors();
        graph.clear(false);
        let fresh = graph.add_joint(Vec2::ZERO, None).id;
        assert!(fresh > b);
    }

    #[test]
    fn test_events_report_changes() {
        let (mut graph, a, b) = graph_with_anchors();
        graph.drain_events();
        let member = graph.add_member(a, b, MaterialKind::Deck).unwrap();
        graph.clear(true);

        let events = graph.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            GraphEvent::MemberAdded { member: m, from, .. } if m == member && from == Vec2::new(-30.0, 0.0)
        ));
        assert_eq!(events[1], GraphEvent::MemberRemoved(member.id));
        assert!(graph.drain_events().is_empty());
    }

    #[test]
    fn test_snapshot_rebinds_placeholder_anchors() {
        let mut graph = StructureGraph::new();
        graph.reseed_anchors(
            [Vec2::new(-30.0, 0.0), Vec2::new(30.0, 0.0)],
            AnchorKind::PlaceholderAnchor,
        );
        let ids: Vec<JointId> = graph.joints().map(|j| j.id).collect();
        let deck = graph.add_member(ids[0], ids[1], MaterialKind::Deck).unwrap();

        let level = [Vec2::new(-35.0, 0.0), Vec2::new(35.0, 0.0), Vec2::new(0.0, -20.0)];
        let snap = graph.snapshot().with_level_anchors(&level);

        assert_eq!(snap.joints.len(), 3);
        assert!(snap.joints.iter().all(|j| j.anchor == Some(AnchorKind::LevelAnchor)));
        assert_eq!(snap.joint(ids[0]).unwrap().position, Vec2::new(-35.0, 0.0));
        assert_eq!(snap.members, vec![deck]);
        // The live graph is untouched
        assert_eq!(graph.joint(ids[1]).unwrap().anchor, Some(AnchorKind::PlaceholderAnchor));
    }
}
