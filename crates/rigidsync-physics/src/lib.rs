#![warn(missing_docs)]

//! Rigid-body physics manager backed by Rapier3d.
//!
//! The manager owns every simulated body, advances the solver with a
//! fixed-substep policy and keeps each body's scene node in sync with the
//! solver pose.
//!
//! # Features
//!
//! - Static scene from triangle meshes, dynamic/kinematic objects from templates
//! - Fixed-timestep stepping with bounded catch-up
//! - Forces, impulses and per-object material/mass properties
//! - Activity tracking and optional step profiling
//!
//! # Example
//!
//! ```ignore
//! use rigidsync_physics::*;
//!
//! let mut library = ObjectLibrary::new();
//! library.register("cube.phys.json", template);
//!
//! let root = SceneNode::new_root("root");
//! let mut physics = PhysicsManager::new(library);
//! physics.init_physics(&root, &PhysicsManagerAttributes {
//!     simulator: SimulatorKind::Rapier,
//!     ..Default::default()
//! })?;
//!
//! let cube = physics.add_object(ObjectKey::ConfigFile("cube.phys.json"), MotionType::Dynamic)?;
//! physics.set_translation(cube, Vector3::new(0.0, 10.0, 0.0))?;
//! physics.step_physics(1.0 / 60.0)?;
//! ```

mod assets;
mod backend;
mod body;
mod colliders;
mod config;
mod error;
mod manager;
mod mesh;
mod scene;
mod stepping;

pub use assets::{AssetInfo, AssetKind, AssetProvider, ObjectKey, ObjectLibrary, ObjectTemplate};
pub use backend::{
    create_backend, BodyDesc, BodyHandle, DynamicsBackend, MassSettings, MaterialSettings,
    MotionType, PassiveBackend, RapierBackend,
};
pub use body::{BodyProperties, ObjectId, RigidBody, TransformAuthority};
pub use colliders::{mesh_group_to_shape, shape_inertia, ColliderStrategy, IndexCountMass, MassPolicy};
pub use config::{
    PhysicsManagerAttributes, PhysicsObjectAttributes, PhysicsSceneAttributes, SimulatorKind,
};
pub use error::{PhysicsError, Result};
pub use manager::{ActivityReport, ManagerState, PhysicsManager};
pub use mesh::{merge_mesh_group, validate_mesh_group, CollisionMesh, MeshPrimitive};
pub use scene::{SceneNode, SceneNodeRef};
pub use stepping::{FixedStepper, StepPlan, StepProfiler, Timeline};

pub use nalgebra::{Isometry3, UnitQuaternion, Vector3};
