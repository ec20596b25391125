//! Dynamics backends.
//!
//! The manager drives one [`DynamicsBackend`] and never talks to a solver
//! directly, so different solvers only differ in how they build their world
//! and bodies.

mod passive;
mod rapier;

pub use passive::PassiveBackend;
pub use rapier::RapierBackend;

use nalgebra::{Isometry3, Vector3};
use parry3d::shape::SharedShape;

use crate::config::SimulatorKind;
use crate::error::Result;

/// Opaque handle to a body inside a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u64);

/// How a body moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionType {
    /// Immovable, infinite mass.
    Static,
    /// Integrated by the solver.
    Dynamic,
    /// Moved externally, still pushes dynamic bodies around.
    Kinematic,
}

/// Mass properties in the body frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassSettings {
    /// Mass in kg.
    pub mass: f32,
    /// Center of mass offset.
    pub com: Vector3<f32>,
    /// Principal inertia.
    pub inertia: Vector3<f32>,
}

/// Contact material of a body's collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialSettings {
    /// Friction coefficient.
    pub friction: f32,
    /// Restitution coefficient.
    pub restitution: f32,
    /// Collision margin.
    pub margin: f32,
}

/// Everything a backend needs to create a body.
#[derive(Clone)]
pub struct BodyDesc {
    /// Name used in logs and errors.
    pub name: String,
    /// Motion type.
    pub motion: MotionType,
    /// Initial pose.
    pub transform: Isometry3<f32>,
    /// Collision shape, already scaled.
    pub shape: SharedShape,
    /// Mass properties (ignored for static bodies).
    pub mass: MassSettings,
    /// Contact material.
    pub material: MaterialSettings,
    /// Linear damping.
    pub linear_damping: f32,
    /// Angular damping.
    pub angular_damping: f32,
}

/// A rigid-body solver the manager can drive.
///
/// Per-body methods return `false` / `None` for handles the backend does
/// not know; the manager checks its own registry first.
pub trait DynamicsBackend {
    /// Which simulator this is.
    fn kind(&self) -> SimulatorKind;

    /// World gravity.
    fn gravity(&self) -> Vector3<f32>;

    /// Replace world gravity.
    fn set_gravity(&mut self, gravity: Vector3<f32>);

    /// Insert a body.
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle>;

    /// Remove a body and its collider. Returns false if unknown.
    fn remove_body(&mut self, handle: BodyHandle) -> bool;

    /// Number of bodies in the world.
    fn body_count(&self) -> usize;

    /// Advance the world by exactly one integration step of `dt` seconds.
    fn step(&mut self, dt: f32);

    /// Drop forces and torques accumulated for the step just taken.
    fn clear_forces(&mut self);

    /// Current pose.
    fn transform(&self, handle: BodyHandle) -> Option<Isometry3<f32>>;

    /// Teleport a body. The new pose is authoritative immediately.
    fn set_transform(&mut self, handle: BodyHandle, transform: Isometry3<f32>) -> bool;

    /// Linear velocity.
    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vector3<f32>>;

    /// Angular velocity.
    fn angular_velocity(&self, handle: BodyHandle) -> Option<Vector3<f32>>;

    /// Accumulate a force applied `rel_pos` away from the center of mass.
    fn add_force(&mut self, handle: BodyHandle, force: Vector3<f32>, rel_pos: Vector3<f32>) -> bool;

    /// Apply an instantaneous impulse `rel_pos` away from the center of mass.
    fn apply_impulse(
        &mut self,
        handle: BodyHandle,
        impulse: Vector3<f32>,
        rel_pos: Vector3<f32>,
    ) -> bool;

    /// Replace mass properties and recompute everything derived from them.
    fn set_mass_properties(&mut self, handle: BodyHandle, mass: MassSettings) -> bool;

    /// Replace the contact material.
    fn set_material(&mut self, handle: BodyHandle, material: MaterialSettings) -> bool;

    /// Replace damping coefficients.
    fn set_damping(&mut self, handle: BodyHandle, linear: f32, angular: f32) -> bool;

    /// Swap the collision shape, keeping material and mass settings.
    fn set_shape(&mut self, handle: BodyHandle, shape: SharedShape) -> bool;

    /// Whether the solver is still integrating this body.
    fn is_active(&self, handle: BodyHandle) -> bool;
}

/// Construct the backend for a simulator kind.
pub fn create_backend(kind: SimulatorKind, gravity: Vector3<f32>) -> Box<dyn DynamicsBackend> {
    match kind {
        SimulatorKind::None => Box::new(PassiveBackend::new(gravity)),
        SimulatorKind::Rapier => Box::new(RapierBackend::new(gravity)),
    }
}
