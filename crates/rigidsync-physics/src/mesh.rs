//! Collision geometry supplied by the asset layer.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{PhysicsError, Result};

/// How the indices of a mesh group are to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshPrimitive {
    /// Isolated points.
    Points,
    /// Independent line segments.
    Lines,
    /// Closed polyline.
    LineLoop,
    /// Open polyline.
    LineStrip,
    /// Independent triangles, three indices each.
    Triangles,
    /// Triangle strip.
    TriangleStrip,
    /// Triangle fan.
    TriangleFan,
}

/// One group of collision geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionMesh {
    /// Primitive kind of `indices`.
    pub primitive: MeshPrimitive,
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]`.
    pub vertices: Vec<f32>,
    /// Flat array of indices into `vertices`.
    pub indices: Vec<u32>,
}

impl CollisionMesh {
    /// Create a triangle mesh group.
    pub fn triangles(vertices: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            primitive: MeshPrimitive::Triangles,
            vertices,
            indices,
        }
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles (only meaningful for `Triangles`).
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// True if there is nothing to collide with.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Describe why the flat arrays do not form whole triangles over the
    /// stored vertices, if they don't.
    pub fn layout_error(&self) -> Option<String> {
        if self.vertices.len() % 3 != 0 {
            return Some(format!(
                "vertex array length {} is not a multiple of 3",
                self.vertices.len()
            ));
        }
        if self.indices.len() % 3 != 0 {
            return Some(format!(
                "index array length {} is not a multiple of 3",
                self.indices.len()
            ));
        }
        let num_vertices = self.num_vertices();
        self.indices
            .iter()
            .find(|&&i| i as usize >= num_vertices)
            .map(|i| format!("index {} out of range for {} vertices", i, num_vertices))
    }

    /// Vertex positions multiplied by `scale`.
    pub fn scaled_points(&self, scale: f32) -> Vec<Point3<f32>> {
        self.vertices
            .chunks_exact(3)
            .map(|v| Point3::new(v[0] * scale, v[1] * scale, v[2] * scale))
            .collect()
    }

    /// Triangle index triples.
    pub fn triangle_indices(&self) -> Vec<[u32; 3]> {
        self.indices
            .chunks_exact(3)
            .map(|i| [i[0], i[1], i[2]])
            .collect()
    }

    /// Merge another triangle group into this one.
    pub fn merge(&mut self, other: &CollisionMesh) {
        let offset = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }

    /// A closed axis-aligned box centered at the origin.
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::triangles(
            vec![
                -hx, -hy, hz, hx, -hy, hz, hx, hy, hz, -hx, hy, hz, // front
                -hx, -hy, -hz, -hx, hy, -hz, hx, hy, -hz, hx, -hy, -hz, // back
            ],
            vec![
                0, 1, 2, 0, 2, 3, // front
                4, 5, 6, 4, 6, 7, // back
                3, 2, 6, 3, 6, 5, // top
                0, 7, 1, 0, 4, 7, // bottom
                1, 7, 6, 1, 6, 2, // right
                0, 3, 5, 0, 5, 4, // left
            ],
        )
    }
}

/// Check that every group in a mesh group can serve as collision geometry.
///
/// Fails on the first group whose primitive is not `Triangles`; nothing
/// after it is inspected.
pub fn validate_mesh_group(meshes: &[CollisionMesh]) -> Result<()> {
    for (group, mesh) in meshes.iter().enumerate() {
        if mesh.primitive != MeshPrimitive::Triangles {
            error!(group, primitive = ?mesh.primitive, "invalid collision primitive, cannot load collision mesh");
            return Err(PhysicsError::InvalidCollisionPrimitive {
                group,
                primitive: mesh.primitive,
            });
        }
    }
    Ok(())
}

/// Merge all groups into a single triangle mesh.
pub fn merge_mesh_group(meshes: &[CollisionMesh]) -> CollisionMesh {
    let mut merged = CollisionMesh::triangles(Vec::new(), Vec::new());
    for mesh in meshes {
        merged.merge(mesh);
    }
    merged
}
