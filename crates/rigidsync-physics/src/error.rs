//! Error types for the physics manager.

use thiserror::Error;

use crate::body::ObjectId;
use crate::mesh::MeshPrimitive;

/// Errors that can occur while managing the simulation.
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// A collision mesh group uses something other than triangles.
    #[error("invalid collision primitive {primitive:?} in mesh group {group}")]
    InvalidCollisionPrimitive {
        /// Index of the offending group.
        group: usize,
        /// Primitive found in that group.
        primitive: MeshPrimitive,
    },

    /// Stepping or per-object call before `init_physics`, or after shutdown.
    #[error("physics simulation is not initialized")]
    UninitializedSimulation,

    /// `init_physics` was called on a manager that is already running.
    #[error("physics simulation is already initialized")]
    AlreadyInitialized,

    /// No registered body has this ID.
    #[error("unknown object ID: {0}")]
    UnknownObjectId(ObjectId),

    /// The asset provider has no template for the requested key.
    #[error("object template not found: {0}")]
    UnknownObjectTemplate(String),

    /// Only one static scene is allowed per simulation.
    #[error("a scene has already been added to this simulation")]
    SceneAlreadyAdded,

    /// A scene-level property was requested before `add_scene`.
    #[error("no scene has been added to this simulation")]
    NoScene,

    /// The solver could not build or integrate a body.
    #[error("solver failure for {name}: {reason}")]
    SolverFailure {
        /// Object or scene name.
        name: String,
        /// Reason for failure.
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for physics manager operations.
pub type Result<T> = std::result::Result<T, PhysicsError>;
