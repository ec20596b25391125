//! Registry entry for one simulated body.

use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

use nalgebra::Vector3;

use crate::backend::{BodyHandle, MassSettings, MaterialSettings, MotionType};
use crate::config::PhysicsObjectAttributes;
use crate::mesh::CollisionMesh;
use crate::scene::{SceneNode, SceneNodeRef};

/// Stable identifier of a registered body. Never reused within a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side owns a body's pose between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformAuthority {
    /// The solver integrates the pose; the scene node follows it.
    Solver,
    /// The application drives the pose; the solver only receives it.
    External,
}

impl From<MotionType> for TransformAuthority {
    fn from(motion: MotionType) -> Self {
        match motion {
            MotionType::Dynamic => TransformAuthority::Solver,
            MotionType::Static | MotionType::Kinematic => TransformAuthority::External,
        }
    }
}

/// Physical configuration of a body as last set by the application.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyProperties {
    /// Mass in kg.
    pub mass: f32,
    /// Principal inertia.
    pub inertia: Vector3<f32>,
    /// Center of mass in the body frame.
    pub com: Vector3<f32>,
    /// Uniform collision scale.
    pub scale: f32,
    /// Friction coefficient.
    pub friction: f32,
    /// Restitution coefficient.
    pub restitution: f32,
    /// Linear damping.
    pub linear_damping: f32,
    /// Angular damping.
    pub angular_damping: f32,
    /// Collision margin.
    pub margin: f32,
}

impl BodyProperties {
    /// Properties from object attributes with an already resolved mass.
    pub fn from_attributes(attributes: &PhysicsObjectAttributes, mass: f32) -> Self {
        Self {
            mass,
            inertia: attributes.inertia(),
            com: attributes.com(),
            scale: attributes.scale,
            friction: attributes.friction_coefficient,
            restitution: attributes.restitution_coefficient,
            linear_damping: attributes.linear_damping,
            angular_damping: attributes.angular_damping,
            margin: attributes.margin,
        }
    }

    /// Mass block for the backend.
    pub fn mass_settings(&self) -> MassSettings {
        MassSettings {
            mass: self.mass,
            com: self.com,
            inertia: self.inertia,
        }
    }

    /// Material block for the backend.
    pub fn material_settings(&self) -> MaterialSettings {
        MaterialSettings {
            friction: self.friction,
            restitution: self.restitution,
            margin: self.margin,
        }
    }
}

/// A simulated body: its solver handle, configuration and scene node.
#[derive(Debug)]
pub struct RigidBody {
    id: ObjectId,
    motion: MotionType,
    handle: BodyHandle,
    /// Configuration mirrored into the solver.
    pub(crate) properties: BodyProperties,
    /// Inertia was derived from the shape and follows mass/scale changes.
    pub(crate) derived_inertia: bool,
    geometry: Vec<CollisionMesh>,
    node: Weak<RefCell<SceneNode>>,
}

impl RigidBody {
    pub(crate) fn new(
        id: ObjectId,
        motion: MotionType,
        handle: BodyHandle,
        properties: BodyProperties,
        derived_inertia: bool,
        geometry: Vec<CollisionMesh>,
        node: Weak<RefCell<SceneNode>>,
    ) -> Self {
        Self {
            id,
            motion,
            handle,
            properties,
            derived_inertia,
            geometry,
            node,
        }
    }

    /// Registry ID.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Motion type.
    pub fn motion_type(&self) -> MotionType {
        self.motion
    }

    /// Who owns the pose.
    pub fn authority(&self) -> TransformAuthority {
        self.motion.into()
    }

    /// Solver-side handle.
    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    /// Current configuration.
    pub fn properties(&self) -> &BodyProperties {
        &self.properties
    }

    /// Collision geometry the body was built from.
    pub fn geometry(&self) -> &[CollisionMesh] {
        &self.geometry
    }

    /// Scene node, if the scene graph still holds it.
    pub fn node(&self) -> Option<SceneNodeRef> {
        self.node.upgrade()
    }
}
