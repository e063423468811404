//! Structure Placer
//!
//! Projects the width-less 2D graph into the 3D scene:
//!
//! - editor x becomes the world length axis (z), remapped into a target span
//! - editor y becomes a height offset from the anchor baseline
//! - two fixed cross-axis planes give the structure its width
//!
//! The result is a snapshot with no link back to the graph. It is rebuilt
//! from scratch for every simulation run.

use glam::{Vec2, Vec3};
use serde::Serialize;
use tracing::{debug, warn};

use crate::game::config::{LevelAnchorConfig, PlacementConfig};
use crate::game::structure::{GraphSnapshot, JointId, MaterialKind, MemberId};
use crate::game::types::SurfaceMesh;
use crate::physics::{Aabb, SurfaceKind, TriangleMesh};

// ============================================================================
// COLORS
// ============================================================================

pub mod colors {
    /// Deck surface color
    pub const DECK: [f32; 4] = [0.22, 0.42, 0.86, 1.0];
    /// Column tube color
    pub const COLUMN: [f32; 4] = [0.95, 0.78, 0.18, 1.0];
}

// ============================================================================
// REFERENCE FRAME
// ============================================================================

/// Where in the 3D scene the structure is built.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReferenceFrame {
    /// Scene point the length and width axes are measured from
    pub center: Vec3,
    /// World height of the anchor baseline
    pub deck_base_y: f32,
}

impl Default for ReferenceFrame {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            deck_base_y: 0.0,
        }
    }
}

impl ReferenceFrame {
    /// Frame centered on an environment, with the baseline offset from its top.
    pub fn from_environment_bounds(bounds: &Aabb, config: &PlacementConfig) -> Self {
        Self {
            center: bounds.center(),
            deck_base_y: bounds.max.y + config.deck_base_offset,
        }
    }
}

// ============================================================================
// PLACEMENT SNAPSHOT
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlacedJoint {
    pub id: JointId,
    pub is_anchor: bool,
    pub left: Vec3,
    /// Absent when the structure has no width
    pub right: Option<Vec3>,
}

impl PlacedJoint {
    /// Right-plane position, or the left one for width-less structures.
    pub fn right_or_left(&self) -> Vec3 {
        self.right.unwrap_or(self.left)
    }
}

/// Straight tube between two points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Tube {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum MemberShape {
    /// Walkable quad: end1-left, end2-left, end2-right, end1-right
    DeckQuad([Vec3; 4]),
    /// Walkable tube for width-less structures
    DeckTube(Tube),
    /// Non-walkable support, one tube per plane
    Column { left: Tube, right: Option<Tube> },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlacedMember {
    pub id: MemberId,
    pub material: MaterialKind,
    pub end1: JointId,
    pub end2: JointId,
    pub shape: MemberShape,
}

/// World-space box the structure was laid out in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlacementExtents {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
    pub deck_base_y: f32,
    /// Editor height that maps onto `deck_base_y`
    pub reference_anchor_y: f32,
}

impl PlacementExtents {
    pub fn center_x(&self) -> f32 {
        (self.min_x + self.max_x) * 0.5
    }
}

/// Read-only 3D projection of one graph snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Placement {
    pub frame: ReferenceFrame,
    pub extents: PlacementExtents,
    pub joints: Vec<PlacedJoint>,
    pub members: Vec<PlacedMember>,
    tube_segments: u32,
}

impl Placement {
    pub fn joint(&self, id: JointId) -> Option<&PlacedJoint> {
        self.joints.iter().find(|j| j.id == id)
    }

    pub fn member(&self, id: MemberId) -> Option<&PlacedMember> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Collision geometry: decks are walkable, columns only obstruct.
    pub fn collision_meshes(&self) -> Vec<(SurfaceKind, TriangleMesh)> {
        let tube = |t: &Tube| TriangleMesh::tube(t.start, t.end, t.radius, self.tube_segments);
        let mut out = Vec::new();
        for member in &self.members {
            match &member.shape {
                MemberShape::DeckQuad(corners) => {
                    out.push((SurfaceKind::Deck, TriangleMesh::quad(*corners)));
                }
                MemberShape::DeckTube(t) => out.push((SurfaceKind::Deck, tube(t))),
                MemberShape::Column { left, right } => {
                    out.push((SurfaceKind::Column, tube(left)));
                    if let Some(right) = right {
                        out.push((SurfaceKind::Column, tube(right)));
                    }
                }
            }
        }
        out
    }

    /// Flat-shaded triangles for a renderer.
    pub fn surface_mesh(&self) -> SurfaceMesh {
        let mut mesh = SurfaceMesh::new();
        for (kind, collision) in self.collision_meshes() {
            let color = match kind {
                SurfaceKind::Column => colors::COLUMN,
                _ => colors::DECK,
            };
            mesh.push_triangles(collision.triangles(), color);
        }
        mesh
    }
}

// ============================================================================
// PLACER
// ============================================================================

/// Pure graph-to-scene projection.
#[derive(Clone, Debug, Default)]
pub struct StructurePlacer {
    config: PlacementConfig,
}

impl StructurePlacer {
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Length-axis span (start, end) relative to the frame center.
    pub fn target_span(&self, level: &LevelAnchorConfig) -> (f32, f32) {
        match level.x_extent() {
            Some((lo, hi)) => (
                lo * self.config.build_to_world_scale,
                hi * self.config.build_to_world_scale,
            ),
            None => (self.config.default_length_span.x, self.config.default_length_span.y),
        }
    }

    pub fn place(
        &self,
        graph: &GraphSnapshot,
        level: &LevelAnchorConfig,
        frame: &ReferenceFrame,
    ) -> Placement {
        let cfg = &self.config;
        let (span_start, span_end) = self.target_span(level);
        let target_len = span_end - span_start;
        let reference_y = level.mean_y();
        let has_width = cfg.has_width();

        let (min_x, max_x) = graph.joints.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), j| {
            (lo.min(j.position.x), hi.max(j.position.x))
        });
        let joint_span = max_x - min_x;
        let can_scale = target_len > cfg.epsilon && joint_span > cfg.epsilon;

        let map_length = |x: f32| {
            if can_scale {
                span_start + (x - min_x) / joint_span * target_len
            } else {
                span_start + (x - min_x)
            }
        };
        let to_world = |p: Vec2, plane: f32| {
            Vec3::new(
                frame.center.x + plane,
                frame.deck_base_y + (p.y - reference_y) * cfg.build_to_world_scale,
                frame.center.z + map_length(p.x),
            )
        };

        let joints: Vec<PlacedJoint> = graph
            .joints
            .iter()
            .map(|j| PlacedJoint {
                id: j.id,
                is_anchor: j.is_anchor(),
                left: to_world(j.position, cfg.left_plane),
                right: has_width.then(|| to_world(j.position, cfg.right_plane)),
            })
            .collect();

        let find = |id: JointId| joints.iter().find(|j| j.id == id);
        let mut members = Vec::with_capacity(graph.members.len());
        for m in &graph.members {
            let (Some(a), Some(b)) = (find(m.end1), find(m.end2)) else {
                warn!(id = %m.id, "member endpoint missing from snapshot, skipped");
                continue;
            };
            if a.left.distance_squared(b.left) < 1e-12 {
                debug!(id = %m.id, "zero-length member skipped");
                continue;
            }
            let shape = match m.material {
                MaterialKind::Column => {
                    let tube = |s: Vec3, e: Vec3| Tube { start: s, end: e, radius: cfg.column_radius };
                    MemberShape::Column {
                        left: tube(a.left, b.left),
                        right: has_width.then(|| tube(a.right_or_left(), b.right_or_left())),
                    }
                }
                MaterialKind::Deck if has_width => {
                    MemberShape::DeckQuad([a.left, b.left, b.right_or_left(), a.right_or_left()])
                }
                MaterialKind::Deck => MemberShape::DeckTube(Tube {
                    start: a.left,
                    end: b.left,
                    radius: cfg.deck_tube_radius,
                }),
            };
            members.push(PlacedMember {
                id: m.id,
                material: m.material,
                end1: m.end1,
                end2: m.end2,
                shape,
            });
        }

        let extents = PlacementExtents {
            min_x: frame.center.x + cfg.left_plane.min(cfg.right_plane),
            max_x: frame.center.x + cfg.left_plane.max(cfg.right_plane),
            min_z: frame.center.z + span_start.min(span_end),
            max_z: frame.center.z + span_start.max(span_end),
            deck_base_y: frame.deck_base_y,
            reference_anchor_y: reference_y,
        };
        debug!(joints = joints.len(), members = members.len(), can_scale, "structure placed");

        Placement {
            frame: *frame,
            extents,
            joints,
            members,
            tube_segments: cfg.tube_segments,
        }
    }
}
