//! Collision shape generation and default mass estimation.

use nalgebra::{Isometry3, Point3, Vector3};
use parry3d::shape::{ConvexPolyhedron, SharedShape, TriMesh};

use crate::error::{PhysicsError, Result};
use crate::mesh::{merge_mesh_group, CollisionMesh};

/// Strategy for generating collision shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColliderStrategy {
    /// One convex hull per mesh group (moving bodies).
    #[default]
    ConvexHull,
    /// One triangle mesh over all groups (static scenes).
    TriMesh,
}

/// Build a collision shape for a validated triangle mesh group.
///
/// `scale` is applied to every vertex. `name` is only used in errors.
pub fn mesh_group_to_shape(
    meshes: &[CollisionMesh],
    strategy: ColliderStrategy,
    scale: f32,
    name: &str,
) -> Result<SharedShape> {
    if meshes.is_empty() || meshes.iter().all(CollisionMesh::is_empty) {
        return Err(PhysicsError::SolverFailure {
            name: name.to_string(),
            reason: "Empty mesh".to_string(),
        });
    }

    for (group, mesh) in meshes.iter().enumerate() {
        if let Some(reason) = mesh.layout_error() {
            return Err(PhysicsError::SolverFailure {
                name: name.to_string(),
                reason: format!("mesh group {}: {}", group, reason),
            });
        }
    }

    match strategy {
        ColliderStrategy::ConvexHull => {
            let mut hulls = Vec::with_capacity(meshes.len());
            for mesh in meshes.iter().filter(|m| !m.is_empty()) {
                hulls.push(create_convex_hull(mesh, scale, name)?);
            }
            if hulls.len() == 1 {
                Ok(hulls.remove(0))
            } else {
                Ok(SharedShape::compound(
                    hulls
                        .into_iter()
                        .map(|hull| (Isometry3::identity(), hull))
                        .collect(),
                ))
            }
        }
        ColliderStrategy::TriMesh => create_trimesh(&merge_mesh_group(meshes), scale, name),
    }
}

fn create_convex_hull(mesh: &CollisionMesh, scale: f32, name: &str) -> Result<SharedShape> {
    let points = mesh.scaled_points(scale);

    if points.len() < 4 {
        return Err(PhysicsError::SolverFailure {
            name: name.to_string(),
            reason: "Need at least 4 points for convex hull".to_string(),
        });
    }

    match ConvexPolyhedron::from_convex_hull(&points) {
        Some(hull) => Ok(SharedShape::new(hull)),
        // Flat or otherwise degenerate geometry
        None => Ok(create_aabb(&points)),
    }
}

fn create_trimesh(mesh: &CollisionMesh, scale: f32, name: &str) -> Result<SharedShape> {
    let vertices = mesh.scaled_points(scale);
    let indices = mesh.triangle_indices();

    if indices.is_empty() {
        return Err(PhysicsError::SolverFailure {
            name: name.to_string(),
            reason: "No triangles in mesh".to_string(),
        });
    }

    match TriMesh::new(vertices, indices) {
        Ok(trimesh) => Ok(SharedShape::new(trimesh)),
        Err(e) => Err(PhysicsError::SolverFailure {
            name: name.to_string(),
            reason: format!("Failed to create trimesh: {:?}", e),
        }),
    }
}

fn create_aabb(points: &[Point3<f32>]) -> SharedShape {
    let mut min = Vector3::repeat(f32::INFINITY);
    let mut max = Vector3::repeat(f32::NEG_INFINITY);

    for p in points {
        min = min.inf(&p.coords);
        max = max.sup(&p.coords);
    }

    // Keep a sliver of thickness along collapsed axes.
    let half_extents = ((max - min) / 2.0).map(|e| e.max(1.0e-3));

    SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
}

/// Principal inertia of `shape` for a body of the given mass, assuming
/// uniform density.
pub fn shape_inertia(shape: &SharedShape, mass: f32) -> Vector3<f32> {
    let unit = shape.mass_properties(1.0);
    let volume_mass = unit.mass();
    if volume_mass <= f32::EPSILON {
        return Vector3::zeros();
    }
    unit.principal_inertia() * (mass / volume_mass)
}

/// Chooses a mass for objects whose template does not carry one.
pub trait MassPolicy {
    /// Mass in kg for the given collision geometry.
    fn default_mass(&self, meshes: &[CollisionMesh]) -> f32;
}

/// Mass proportional to the index count of the first mesh group.
///
/// A placeholder heuristic, not a physical estimate.
#[derive(Debug, Clone, Copy)]
pub struct IndexCountMass {
    /// Mass contributed by each index.
    pub per_index: f32,
}

impl Default for IndexCountMass {
    fn default() -> Self {
        Self { per_index: 0.001 }
    }
}

impl MassPolicy for IndexCountMass {
    fn default_mass(&self, meshes: &[CollisionMesh]) -> f32 {
        meshes
            .first()
            .map(|mesh| mesh.indices.len() as f32 * self.per_index)
            .unwrap_or(0.0)
    }
}
