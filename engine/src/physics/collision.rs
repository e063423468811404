//! Collision detection module
//!
//! Ray queries against triangle geometry. Everything the simulation can touch
//! (the static environment, deck surfaces, support columns) is stored as a
//! [`TriangleMesh`] tagged with a [`SurfaceKind`], and a [`CollisionWorld`]
//! answers "nearest hit along this ray" across the whole set.
//!
//! # Ray-AABB Intersection
//!
//! Each mesh keeps an axis-aligned bounding box. The slab method rejects rays
//! that miss the box before any triangle is tested.
//!
//! # Example
//!
//! ```ignore
//! use poly_bridge_engine::physics::{CollisionWorld, RayQuery, SurfaceKind, TriangleMesh};
//! use glam::Vec3;
//!
//! let mut world = CollisionWorld::new();
//! world.add(
//!     SurfaceKind::Environment,
//!     TriangleMesh::cuboid(Vec3::new(-5.0, -1.0, -5.0), Vec3::new(5.0, 0.0, 5.0)),
//! );
//!
//! let hit = world.ray_cast(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 10.0, SurfaceKind::WALKABLE);
//! if let Some(hit) = hit {
//!     println!("Ground at y={} (normal {:?})", hit.position.y, hit.normal);
//! }
//! ```

use glam::Vec3;
use thiserror::Error;

/// Hits closer than this to the ray origin are ignored.
const RAY_NEAR: f32 = 1e-5;

/// Barycentric slack so rays through a shared edge hit at least one triangle.
const EDGE_EPSILON: f32 = 1e-5;

/// What a collidable surface represents to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Static level geometry (terrain, banks, walls)
    Environment,
    /// Walkable bridge deck
    Deck,
    /// Thin bridge support; never walked on
    Column,
}

impl SurfaceKind {
    /// Surfaces a vehicle can stand on.
    pub const WALKABLE: &'static [SurfaceKind] = &[SurfaceKind::Environment, SurfaceKind::Deck];
    /// Surfaces that can block forward travel.
    pub const OBSTACLES: &'static [SurfaceKind] = &[SurfaceKind::Environment, SurfaceKind::Column];
    pub const ALL: &'static [SurfaceKind] =
        &[SurfaceKind::Environment, SurfaceKind::Deck, SurfaceKind::Column];
}

/// Information about a ray-surface collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    /// World-space position where the collision occurred
    pub position: Vec3,
    /// Surface normal at the hit point, normalized and facing back along the ray
    pub normal: Vec3,
    /// Distance from ray origin to hit point
    pub distance: f32,
    /// Kind of surface that was hit
    pub surface: SurfaceKind,
}

/// Errors raised while building meshes from external vertex data.
#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("index buffer length {0} is not a multiple of 3")]
    NotTriangles(usize),

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// Performs ray-AABB (Axis-Aligned Bounding Box) intersection test using the slab method.
///
/// # Returns
///
/// * `Some(t)` - Distance along the ray to the intersection point (t >= 0)
/// * `None` - No intersection or intersection is behind the ray origin
pub fn ray_aabb_intersect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    aabb_min: Vec3,
    aabb_max: Vec3,
) -> Option<f32> {
    // Near-zero direction components get a huge inverse instead of a division by zero
    let inv_dir = Vec3::new(
        if ray_dir.x.abs() > 1e-10 { 1.0 / ray_dir.x } else { f32::MAX * ray_dir.x.signum() },
        if ray_dir.y.abs() > 1e-10 { 1.0 / ray_dir.y } else { f32::MAX * ray_dir.y.signum() },
        if ray_dir.z.abs() > 1e-10 { 1.0 / ray_dir.z } else { f32::MAX * ray_dir.z.signum() },
    );

    let t1 = (aabb_min - ray_origin) * inv_dir;
    let t2 = (aabb_max - ray_origin) * inv_dir;

    let t_min = t1.min(t2).max_element();
    let t_max = t1.max(t2).min_element();

    if t_max >= t_min && t_max >= 0.0 {
        if t_min >= 0.0 {
            Some(t_min)
        } else {
            // Ray starts inside the AABB
            Some(t_max)
        }
    } else {
        None
    }
}

/// Möller-Trumbore ray-triangle intersection.
///
/// Both faces count as hits. Returns the distance along `ray_dir`.
pub fn ray_triangle_intersect(ray_origin: Vec3, ray_dir: Vec3, tri: &[Vec3; 3]) -> Option<f32> {
    let edge1 = tri[1] - tri[0];
    let edge2 = tri[2] - tri[0];
    let p = ray_dir.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < 1e-9 {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray_origin - tri[0];
    let u = s.dot(p) * inv_det;
    if !(-EDGE_EPSILON..=1.0 + EDGE_EPSILON).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray_dir.dot(q) * inv_det;
    if v < -EDGE_EPSILON || u + v > 1.0 + EDGE_EPSILON {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > RAY_NEAR).then_some(t)
}

/// Geometric normal of a triangle from its winding. Zero for degenerate triangles.
pub fn triangle_normal(tri: &[Vec3; 3]) -> Vec3 {
    (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero()
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min: min.min(max), max: min.max(max) }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |b, p| Self {
            min: b.min.min(p),
            max: b.max.max(p),
        }))
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// A soup of triangles with a cached bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    triangles: Vec<[Vec3; 3]>,
    bounds: Option<Aabb>,
}

impl TriangleMesh {
    pub fn new(triangles: Vec<[Vec3; 3]>) -> Self {
        let bounds = Aabb::from_points(triangles.iter().flatten().copied());
        Self { triangles, bounds }
    }

    /// Builds a mesh from an indexed vertex list (three indices per triangle).
    pub fn from_indexed(vertices: &[Vec3], indices: &[u32]) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::NotTriangles(indices.len()));
        }
        let fetch = |index: u32| {
            vertices.get(index as usize).copied().ok_or(MeshError::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            })
        };
        let triangles = indices
            .chunks_exact(3)
            .map(|c| Ok([fetch(c[0])?, fetch(c[1])?, fetch(c[2])?]))
            .collect::<Result<Vec<_>, MeshError>>()?;
        Ok(Self::new(triangles))
    }

    /// Closed box between two corners (12 triangles).
    pub fn cuboid(min: Vec3, max: Vec3) -> Self {
        let (lo, hi) = (min.min(max), min.max(max));
        let c = |x: bool, y: bool, z: bool| {
            Vec3::new(
                if x { hi.x } else { lo.x },
                if y { hi.y } else { lo.y },
                if z { hi.z } else { lo.z },
            )
        };
        let faces = [
            // -X / +X
            [c(false, false, false), c(false, false, true), c(false, true, true), c(false, true, false)],
            [c(true, false, false), c(true, true, false), c(true, true, true), c(true, false, true)],
            // -Y / +Y
            [c(false, false, false), c(true, false, false), c(true, false, true), c(false, false, true)],
            [c(false, true, false), c(false, true, true), c(true, true, true), c(true, true, false)],
            // -Z / +Z
            [c(false, false, false), c(false, true, false), c(true, true, false), c(true, false, false)],
            [c(false, false, true), c(true, false, true), c(true, true, true), c(false, true, true)],
        ];
        let triangles = faces
            .iter()
            .flat_map(|f| [[f[0], f[1], f[2]], [f[0], f[2], f[3]]])
            .collect();
        Self::new(triangles)
    }

    /// Planar quad split along the `corners[0]`-`corners[2]` diagonal.
    pub fn quad(corners: [Vec3; 4]) -> Self {
        Self::new(vec![
            [corners[0], corners[1], corners[2]],
            [corners[0], corners[2], corners[3]],
        ])
    }

    /// Open-ended cylinder approximated with `segments` flat sides.
    pub fn tube(start: Vec3, end: Vec3, radius: f32, segments: u32) -> Self {
        let axis = end - start;
        if axis.length_squared() < 1e-12 || radius <= 0.0 {
            return Self::new(Vec::new());
        }
        let dir = axis.normalize();
        let (u, v) = dir.any_orthonormal_pair();
        let segments = segments.max(3);
        let ring = |i: u32| {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            (u * angle.cos() + v * angle.sin()) * radius
        };

        let mut triangles = Vec::with_capacity(segments as usize * 2);
        for i in 0..segments {
            let (a, b) = (ring(i), ring(i + 1));
            triangles.push([start + a, end + a, end + b]);
            triangles.push([start + a, end + b, start + b]);
        }
        Self::new(triangles)
    }

    pub fn triangles(&self) -> &[[Vec3; 3]] {
        &self.triangles
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Nearest triangle hit within `max_distance`: (distance, normal facing the ray).
    pub fn ray_cast(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<(f32, Vec3)> {
        let bounds = self.bounds?;
        // From inside the box the slab test reports the exit, not the entry
        if !bounds.contains(origin) {
            let entry = ray_aabb_intersect(origin, dir, bounds.min, bounds.max)?;
            if entry > max_distance {
                return None;
            }
        }

        let mut best: Option<(f32, Vec3)> = None;
        for tri in &self.triangles {
            let Some(t) = ray_triangle_intersect(origin, dir, tri) else {
                continue;
            };
            if t > max_distance || best.is_some_and(|(bt, _)| t >= bt) {
                continue;
            }
            let mut normal = triangle_normal(tri);
            if normal.dot(dir) > 0.0 {
                normal = -normal;
            }
            best = Some((t, normal));
        }
        best
    }
}

/// A mesh registered in a [`CollisionWorld`].
#[derive(Debug, Clone)]
pub struct CollisionBody {
    pub kind: SurfaceKind,
    pub mesh: TriangleMesh,
}

/// Uniform "ray against a geometry set" query.
pub trait RayQuery {
    /// Nearest hit along `dir` (normalized) within `max_distance`, considering
    /// only surfaces whose kind is listed in `kinds`.
    fn ray_cast(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_distance: f32,
        kinds: &[SurfaceKind],
    ) -> Option<HitInfo>;
}

/// Every collidable surface of one simulation run.
#[derive(Debug, Clone, Default)]
pub struct CollisionWorld {
    bodies: Vec<CollisionBody>,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mesh. Empty meshes are ignored.
    pub fn add(&mut self, kind: SurfaceKind, mesh: TriangleMesh) {
        if !mesh.is_empty() {
            self.bodies.push(CollisionBody { kind, mesh });
        }
    }

    /// Drops every body of the given kind.
    pub fn remove_kind(&mut self, kind: SurfaceKind) {
        self.bodies.retain(|b| b.kind != kind);
    }

    pub fn bodies(&self) -> &[CollisionBody] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Combined bounds of every body of the listed kinds.
    pub fn bounds(&self, kinds: &[SurfaceKind]) -> Option<Aabb> {
        self.bodies
            .iter()
            .filter(|b| kinds.contains(&b.kind))
            .filter_map(|b| b.mesh.bounds())
            .reduce(|a, b| a.union(&b))
    }
}

impl RayQuery for CollisionWorld {
    fn ray_cast(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_distance: f32,
        kinds: &[SurfaceKind],
    ) -> Option<HitInfo> {
        let mut best: Option<HitInfo> = None;
        for body in self.bodies.iter().filter(|b| kinds.contains(&b.kind)) {
            let limit = best.map_or(max_distance, |b| b.distance);
            if let Some((distance, normal)) = body.mesh.ray_cast(origin, dir, limit) {
                if best.is_none_or(|b| distance < b.distance) {
                    best = Some(HitInfo {
                        position: origin + dir * distance,
                        normal,
                        distance,
                        surface: body.kind,
                    });
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slab() -> TriangleMesh {
        TriangleMesh::cuboid(Vec3::new(-5.0, -1.0, -5.0), Vec3::new(5.0, 0.0, 5.0))
    }

    #[test]
    fn test_ray_hits_aabb_from_front() {
        let origin = Vec3::new(0.0, 0.0, -5.0);
        let t = ray_aabb_intersect(origin, Vec3::Z, Vec3::splat(-1.0), Vec3::splat(1.0))
            .expect("ray should hit the box");
        assert!((t - 4.0).abs() < 0.001, "Expected t=4.0, got t={}", t);
    }

    #[test]
    fn test_ray_misses_aabb() {
        let origin = Vec3::new(0.0, 5.0, -5.0);
        assert!(ray_aabb_intersect(origin, Vec3::Z, Vec3::splat(-1.0), Vec3::splat(1.0)).is_none());
    }

    #[test]
    fn test_ray_starts_inside_aabb() {
        let t = ray_aabb_intersect(Vec3::ZERO, Vec3::Z, Vec3::splat(-1.0), Vec3::splat(1.0))
            .expect("ray should exit the box");
        assert!((t - 1.0).abs() < 0.001, "Expected t=1.0, got t={}", t);
    }

    #[test]
    fn test_ray_triangle_both_faces() {
        let tri = [Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 1.0)];
        let down = ray_triangle_intersect(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, &tri);
        let up = ray_triangle_intersect(Vec3::new(0.0, -3.0, 0.0), Vec3::Y, &tri);
        assert!((down.unwrap() - 2.0).abs() < 0.001);
        assert!((up.unwrap() - 3.0).abs() < 0.001);
        assert!(ray_triangle_intersect(Vec3::new(5.0, 2.0, 0.0), Vec3::NEG_Y, &tri).is_none());
    }

    #[test]
    fn test_mesh_normal_faces_ray() {
        // Winding points the quad normal down; the hit normal must still face the ray
        let quad = TriangleMesh::quad([
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
        ]);
        let (t, normal) = quad.ray_cast(Vec3::new(0.2, 1.0, 0.1), Vec3::NEG_Y, 5.0).unwrap();
        assert!((t - 1.0).abs() < 0.001);
        assert!((normal - Vec3::Y).length() < 0.001, "normal was {:?}", normal);
    }

    #[test]
    fn test_mesh_respects_max_distance() {
        let mesh = slab();
        assert!(mesh.ray_cast(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 1.5).is_none());
        assert!(mesh.ray_cast(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 2.5).is_some());
    }

    #[test]
    fn test_mesh_hit_from_inside_bounds() {
        // Ground plus a wall: the ray starts inside the combined box and its
        // reach ends well before the box exit
        let mut triangles = slab().triangles().to_vec();
        triangles.extend_from_slice(
            TriangleMesh::cuboid(Vec3::new(-5.0, 0.0, 0.5), Vec3::new(5.0, 1.0, 0.7)).triangles(),
        );
        let mesh = TriangleMesh::new(triangles);
        let origin = Vec3::new(0.0, 0.1, 0.2);
        assert!(mesh.bounds().unwrap().contains(origin));

        let (t, normal) = mesh.ray_cast(origin, Vec3::Z, 0.4).expect("wall within reach");
        assert!((t - 0.3).abs() < 1e-4, "t was {}", t);
        assert!((normal - Vec3::NEG_Z).length() < 1e-4);
        assert!(mesh.ray_cast(origin, Vec3::Z, 0.25).is_none());

        let (down, _) = mesh.ray_cast(origin, Vec3::NEG_Y, 0.2).expect("ground within reach");
        assert!((down - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_sloped_quad_hit_from_inside_bounds() {
        let ramp = TriangleMesh::quad([
            Vec3::new(-2.0, 0.0, -2.0),
            Vec3::new(-2.0, 1.0, 2.0),
            Vec3::new(2.0, 1.0, 2.0),
            Vec3::new(2.0, 0.0, -2.0),
        ]);
        let mut world = CollisionWorld::new();
        world.add(SurfaceKind::Deck, ramp);
        // Surface is at y = 0.5 under the origin
        let hit = world
            .ray_cast(Vec3::new(0.0, 0.8, 0.0), Vec3::NEG_Y, 0.5, SurfaceKind::WALKABLE)
            .expect("ramp below");
        assert!((hit.position.y - 0.5).abs() < 1e-4);
        assert!(hit.normal.y > 0.9);
    }

    #[test]
    fn test_aabb_contains() {
        let b = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!(b.contains(Vec3::ZERO));
        assert!(b.contains(Vec3::ONE));
        assert!(!b.contains(Vec3::new(0.0, 1.5, 0.0)));
    }

    #[test]
    fn test_from_indexed_rejects_bad_index() {
        let verts = [Vec3::ZERO, Vec3::X, Vec3::Z];
        assert!(TriangleMesh::from_indexed(&verts, &[0, 1, 2]).is_ok());
        assert_eq!(
            TriangleMesh::from_indexed(&verts, &[0, 1, 7]),
            Err(MeshError::IndexOutOfRange { index: 7, vertex_count: 3 })
        );
        assert_eq!(TriangleMesh::from_indexed(&verts, &[0, 1]), Err(MeshError::NotTriangles(2)));
    }

    #[test]
    fn test_tube_blocks_sideways_ray() {
        let tube = TriangleMesh::tube(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), 0.1, 6);
        let (t, normal) = tube.ray_cast(Vec3::new(0.0, 1.0, -1.0), Vec3::Z, 5.0).unwrap();
        assert!(t > 0.85 && t < 0.95, "t was {}", t);
        assert!(normal.z < -0.5);
    }

    #[test]
    fn test_world_filters_by_kind_and_picks_nearest() {
        let mut world = CollisionWorld::new();
        world.add(SurfaceKind::Environment, slab());
        world.add(
            SurfaceKind::Column,
            TriangleMesh::cuboid(Vec3::new(-0.5, 0.0, -0.5), Vec3::new(0.5, 1.0, 0.5)),
        );

        let origin = Vec3::new(0.0, 3.0, 0.0);
        let all = world.ray_cast(origin, Vec3::NEG_Y, 10.0, SurfaceKind::ALL).unwrap();
        assert_eq!(all.surface, SurfaceKind::Column);
        assert!((all.position.y - 1.0).abs() < 0.001);

        let walk = world.ray_cast(origin, Vec3::NEG_Y, 10.0, SurfaceKind::WALKABLE).unwrap();
        assert_eq!(walk.surface, SurfaceKind::Environment);
        assert!((walk.position.y - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_world_bounds_by_kind() {
        let mut world = CollisionWorld::new();
        world.add(SurfaceKind::Environment, slab());
        world.add(SurfaceKind::Deck, TriangleMesh::new(Vec::new()));
        assert_eq!(world.len(), 1);
        let bounds = world.bounds(&[SurfaceKind::Environment]).unwrap();
        assert_eq!(bounds.max, Vec3::new(5.0, 0.0, 5.0));
        assert!(world.bounds(&[SurfaceKind::Deck]).is_none());
    }
}
