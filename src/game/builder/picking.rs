//! Entity Picking
//!
//! Nearest-candidate-within-tolerance selection of joints and members near a
//! point on the editing plane.

use glam::Vec2;

use crate::game::config::EditorConfig;
use crate::game::structure::{Joint, JointId, MemberId, StructureGraph};

/// Which kind of entity a pick is looking for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickKind {
    Joint,
    Member,
}

/// Result of a successful pick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Picked {
    Joint(JointId),
    Member(MemberId),
}

/// Finds the entity of a kind nearest to a world position.
pub trait EntityPicker {
    fn pick(&self, graph: &StructureGraph, position: Vec2, kind: PickKind) -> Option<Picked>;
}

/// Distance-based picker using the editor's visual radii.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProximityPicker {
    pub joint_radius: f32,
    pub anchor_radius: f32,
    pub member_radius: f32,
    pub sensitivity: f32,
}

impl Default for ProximityPicker {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl ProximityPicker {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            joint_radius: config.joint_radius,
            anchor_radius: config.anchor_radius,
            member_radius: config.member_thickness_radius,
            sensitivity: config.pick_sensitivity,
        }
    }

    fn joint_tolerance(&self, joint: &Joint) -> f32 {
        let radius = if joint.is_anchor() { self.anchor_radius } else { self.joint_radius };
        radius * self.sensitivity
    }

    fn member_tolerance(&self) -> f32 {
        self.member_radius * 2.0 * self.sensitivity
    }

    pub fn pick_joint(&self, graph: &StructureGraph, position: Vec2) -> Option<JointId> {
        graph
            .joints()
            .filter_map(|j| {
                let dist_sq = j.position.distance_squared(position);
                let tol = self.joint_tolerance(j);
                (dist_sq < tol * tol).then_some((j.id, dist_sq))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Picks a member by perpendicular distance to its span.
    ///
    /// Points inside an endpoint's joint tolerance belong to the joint, so a
    /// click on a joint never selects the members attached to it.
    pub fn pick_member(&self, graph: &StructureGraph, position: Vec2) -> Option<MemberId> {
        let tol = self.member_tolerance();
        graph
            .members()
            .filter_map(|m| {
                let a = graph.joint(m.end1)?;
                let b = graph.joint(m.end2)?;
                let on_joint = [a, b].iter().any(|j| {
                    let jt = self.joint_tolerance(j);
                    j.position.distance_squared(position) < jt * jt
                });
                if on_joint {
                    return None;
                }
                let dist = perpendicular_distance(position, a.position, b.position)?;
                (dist < tol).then_some((m.id, dist))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }
}

impl EntityPicker for ProximityPicker {
    fn pick(&self, graph: &StructureGraph, position: Vec2, kind: PickKind) -> Option<Picked> {
        match kind {
            PickKind::Joint => self.pick_joint(graph, position).map(Picked::Joint),
            PickKind::Member => self.pick_member(graph, position).map(Picked::Member),
        }
    }
}

/// Distance from `p` to segment `a`-`b` when `p` projects strictly inside it.
pub fn perpendicular_distance(p: Vec2, a: Vec2, b: Vec2) -> Option<f32> {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return None;
    }
    let t = (p - a).dot(ab) / len_sq;
    if t <= 0.0 || t >= 1.0 {
        return None;
    }
    Some(p.distance(a + ab * t))
}
