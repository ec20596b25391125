//! Default physical properties for objects, scenes and the manager itself.
//!
//! These bundles are what the asset layer hands over alongside collision
//! geometry. They deserialize from JSON with every field optional.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Which dynamics backend drives the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulatorKind {
    /// No dynamics: bodies only hold transforms.
    #[default]
    None,
    /// Rapier3d rigid-body pipeline.
    Rapier,
}

/// Per-object physical properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsObjectAttributes {
    /// Mass in kg. `None` lets the manager's mass policy decide.
    pub mass: Option<f32>,
    /// Collision margin.
    pub margin: f32,
    /// Uniform scale applied to the collision geometry.
    pub scale: f32,
    /// Center of mass offset in the body frame.
    #[serde(rename = "COM")]
    pub com: [f32; 3],
    /// Principal inertia. All zeros means "derive from the shape".
    pub inertia: [f32; 3],
    /// Friction coefficient.
    pub friction_coefficient: f32,
    /// Restitution coefficient.
    pub restitution_coefficient: f32,
    /// Linear damping.
    #[serde(alias = "linDamping")]
    pub linear_damping: f32,
    /// Angular damping.
    #[serde(alias = "angDamping")]
    pub angular_damping: f32,
    /// Asset the object was created from.
    pub origin_handle: String,
    /// Mesh used for rendering.
    pub render_mesh_handle: String,
    /// Mesh used for collision.
    pub collision_mesh_handle: String,
}

impl Default for PhysicsObjectAttributes {
    fn default() -> Self {
        Self {
            mass: None,
            margin: 0.01,
            scale: 1.0,
            com: [0.0; 3],
            inertia: [0.0; 3],
            friction_coefficient: 0.5,
            restitution_coefficient: 0.6,
            linear_damping: 0.2,
            angular_damping: 0.2,
            origin_handle: String::new(),
            render_mesh_handle: String::new(),
            collision_mesh_handle: String::new(),
        }
    }
}

impl PhysicsObjectAttributes {
    /// Parse from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let attributes: Self = serde_json::from_str(json)?;
        attributes.validate()?;
        Ok(attributes)
    }

    /// Validate attribute ranges.
    pub fn validate(&self) -> Result<()> {
        if let Some(mass) = self.mass {
            if mass.is_nan() || mass < 0.0 {
                return Err(PhysicsError::InvalidConfig(format!("mass must be >= 0, got {mass}")));
            }
        }
        if self.scale.is_nan() || self.scale <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if self.margin < 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "margin must be >= 0, got {}",
                self.margin
            )));
        }
        if self.inertia.iter().any(|&i| i < 0.0) {
            return Err(PhysicsError::InvalidConfig("inertia must be >= 0".into()));
        }
        Ok(())
    }

    /// Center of mass as a vector.
    pub fn com(&self) -> Vector3<f32> {
        Vector3::from(self.com)
    }

    /// Principal inertia as a vector.
    pub fn inertia(&self) -> Vector3<f32> {
        Vector3::from(self.inertia)
    }
}

/// Properties of the static scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsSceneAttributes {
    /// World gravity to install when the scene is added. `None` keeps the
    /// gravity given to `init_physics`.
    pub gravity: Option<[f32; 3]>,
    /// Friction coefficient.
    pub friction_coefficient: f32,
    /// Restitution coefficient.
    pub restitution_coefficient: f32,
    /// Mesh used for rendering.
    pub render_mesh_handle: String,
    /// Mesh used for collision.
    pub collision_mesh_handle: String,
}

impl Default for PhysicsSceneAttributes {
    fn default() -> Self {
        Self {
            gravity: None,
            friction_coefficient: 0.4,
            restitution_coefficient: 0.1,
            render_mesh_handle: String::new(),
            collision_mesh_handle: String::new(),
        }
    }
}

impl PhysicsSceneAttributes {
    /// Parse from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Manager-wide simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsManagerAttributes {
    /// Backend to construct.
    pub simulator: SimulatorKind,
    /// Fixed integration step (seconds).
    pub timestep: f64,
    /// Maximum fixed steps per `step_physics` call. Zero means one
    /// variable-size step.
    pub max_substeps: u32,
    /// Initial world gravity.
    pub gravity: [f32; 3],
    /// Record step timings.
    pub profile: bool,
}

impl Default for PhysicsManagerAttributes {
    fn default() -> Self {
        Self {
            simulator: SimulatorKind::None,
            timestep: 0.01,
            max_substeps: 10,
            gravity: [0.0, -9.8, 0.0],
            profile: false,
        }
    }
}

impl PhysicsManagerAttributes {
    /// Parse from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let attributes: Self = serde_json::from_str(json)?;
        attributes.validate()?;
        Ok(attributes)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        Ok(())
    }

    /// Gravity as a vector.
    pub fn gravity(&self) -> Vector3<f32> {
        Vector3::from(self.gravity)
    }
}
