//! Shared Types Module
//!
//! Vertex export for presentation layers and small numeric helpers shared
//! across game modules.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

// ============================================================================
// VERTEX EXPORT
// ============================================================================

/// Vertex for placed structure surfaces.
///
/// `#[repr(C)]` and `Pod` so a renderer can upload a slice as-is.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

static_assertions::assert_eq_size!(SurfaceVertex, [u8; 40]);

impl SurfaceVertex {
    pub fn new(position: Vec3, normal: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            color,
        }
    }
}

/// Indexed triangle list of [`SurfaceVertex`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceMesh {
    pub vertices: Vec<SurfaceVertex>,
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends flat-shaded triangles with one color.
    pub fn push_triangles(&mut self, triangles: &[[Vec3; 3]], color: [f32; 4]) {
        for tri in triangles {
            let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
            let base = self.vertices.len() as u32;
            self.vertices
                .extend(tri.iter().map(|&p| SurfaceVertex::new(p, normal, color)));
            self.indices.extend([base, base + 1, base + 2]);
        }
    }

    /// Raw bytes of the vertex buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

// ============================================================================
// HASH NOISE
// ============================================================================

/// Deterministic pseudo-random value in [0, 1) from a seed.
pub fn hash_unit(seed: f32) -> f32 {
    ((seed * 12.9898).sin() * 43758.5453).fract().abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_unit_range_and_determinism() {
        for i in 0..100 {
            let v = hash_unit(i as f32 * 0.37);
            assert!((0.0..1.0).contains(&v), "hash out of range: {}", v);
            assert_eq!(v, hash_unit(i as f32 * 0.37));
        }
    }

    #[test]
    fn test_push_triangles_indexes_sequentially() {
        let tri = [[Vec3::ZERO, Vec3::X, Vec3::Z]];
        let mut mesh = SurfaceMesh::new();
        mesh.push_triangles(&tri, [1.0; 4]);
        mesh.push_triangles(&tri, [0.5; 4]);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_bytes().len(), 6 * 40);
    }
}
