//! Rapier3d dynamics backend.

use std::collections::HashMap;

use nalgebra::{Isometry3, Point3, Vector3};
use parry3d::mass_properties::MassProperties;
use parry3d::shape::SharedShape;
use rapier3d::dynamics::{
    CCDSolver, ImpulseJointSet, IntegrationParameters, IslandManager, MultibodyJointSet,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet, RigidBodyType,
};
use rapier3d::geometry::{BroadPhaseMultiSap, ColliderBuilder, ColliderHandle, ColliderSet, NarrowPhase};
use rapier3d::pipeline::{PhysicsPipeline, QueryPipeline};

use super::{BodyDesc, BodyHandle, DynamicsBackend, MassSettings, MaterialSettings, MotionType};
use crate::config::SimulatorKind;
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
struct RapierBody {
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

/// Rapier physics world.
pub struct RapierBackend {
    // Rapier components
    pipeline: PhysicsPipeline,
    gravity: Vector3<f32>,
    integration_params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: BroadPhaseMultiSap,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    handles: HashMap<BodyHandle, RapierBody>,
    next_handle: u64,
}

impl RapierBackend {
    /// Create an empty world with the given gravity.
    pub fn new(gravity: Vector3<f32>) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity,
            integration_params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            handles: HashMap::new(),
            next_handle: 0,
        }
    }

    fn rapier_body(&self, handle: BodyHandle) -> Option<&rapier3d::dynamics::RigidBody> {
        let entry = self.handles.get(&handle)?;
        self.bodies.get(entry.body)
    }

    fn rapier_body_mut(&mut self, handle: BodyHandle) -> Option<&mut rapier3d::dynamics::RigidBody> {
        let entry = self.handles.get(&handle)?;
        self.bodies.get_mut(entry.body)
    }
}

fn mass_properties(mass: &MassSettings) -> MassProperties {
    MassProperties::new(Point3::from(mass.com), mass.mass, mass.inertia)
}

fn body_type(motion: MotionType) -> RigidBodyType {
    match motion {
        MotionType::Static => RigidBodyType::Fixed,
        MotionType::Dynamic => RigidBodyType::Dynamic,
        MotionType::Kinematic => RigidBodyType::KinematicPositionBased,
    }
}

impl DynamicsBackend for RapierBackend {
    fn kind(&self) -> SimulatorKind {
        SimulatorKind::Rapier
    }

    fn gravity(&self) -> Vector3<f32> {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vector3<f32>) {
        self.gravity = gravity;
        // Sleeping bodies would otherwise ignore the change.
        for (_, body) in self.bodies.iter_mut() {
            if body.is_dynamic() {
                body.wake_up(true);
            }
        }
    }

    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle> {
        let mut builder = RigidBodyBuilder::new(body_type(desc.motion))
            .position(desc.transform)
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping);
        if desc.motion == MotionType::Dynamic {
            builder = builder.additional_mass_properties(mass_properties(&desc.mass));
        }
        let body = self.bodies.insert(builder.build());

        // Mass comes entirely from the body's additional mass properties.
        let collider = ColliderBuilder::new(desc.shape.clone())
            .density(0.0)
            .friction(desc.material.friction)
            .restitution(desc.material.restitution)
            .contact_skin(desc.material.margin)
            .build();
        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        if let Some(rb) = self.bodies.get_mut(body) {
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }

        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(handle, RapierBody { body, collider });
        Ok(handle)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let Some(entry) = self.handles.remove(&handle) else {
            return false;
        };
        self.bodies
            .remove(
                entry.body,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn step(&mut self, dt: f32) {
        self.integration_params.dt = dt;

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    fn clear_forces(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            body.reset_forces(false);
            body.reset_torques(false);
        }
    }

    fn transform(&self, handle: BodyHandle) -> Option<Isometry3<f32>> {
        self.rapier_body(handle).map(|rb| *rb.position())
    }

    fn set_transform(&mut self, handle: BodyHandle, transform: Isometry3<f32>) -> bool {
        match self.rapier_body_mut(handle) {
            Some(rb) => {
                rb.set_position(transform, true);
                true
            }
            None => false,
        }
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        self.rapier_body(handle).map(|rb| *rb.linvel())
    }

    fn angular_velocity(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        self.rapier_body(handle).map(|rb| *rb.angvel())
    }

    fn add_force(&mut self, handle: BodyHandle, force: Vector3<f32>, rel_pos: Vector3<f32>) -> bool {
        match self.rapier_body_mut(handle) {
            Some(rb) => {
                rb.add_force(force, true);
                if rel_pos != Vector3::zeros() {
                    rb.add_torque(rel_pos.cross(&force), true);
                }
                true
            }
            None => false,
        }
    }

    fn apply_impulse(
        &mut self,
        handle: BodyHandle,
        impulse: Vector3<f32>,
        rel_pos: Vector3<f32>,
    ) -> bool {
        match self.rapier_body_mut(handle) {
            Some(rb) => {
                rb.apply_impulse(impulse, true);
                if rel_pos != Vector3::zeros() {
                    rb.apply_torque_impulse(rel_pos.cross(&impulse), true);
                }
                true
            }
            None => false,
        }
    }

    fn set_mass_properties(&mut self, handle: BodyHandle, mass: MassSettings) -> bool {
        let Some(entry) = self.handles.get(&handle) else {
            return false;
        };
        let Some(rb) = self.bodies.get_mut(entry.body) else {
            return false;
        };
        if rb.is_dynamic() {
            rb.set_additional_mass_properties(mass_properties(&mass), true);
            // Inverse mass and world inertia are cached; refresh them now.
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }
        true
    }

    fn set_material(&mut self, handle: BodyHandle, material: MaterialSettings) -> bool {
        let Some(entry) = self.handles.get(&handle) else {
            return false;
        };
        match self.colliders.get_mut(entry.collider) {
            Some(collider) => {
                collider.set_friction(material.friction);
                collider.set_restitution(material.restitution);
                collider.set_contact_skin(material.margin);
                true
            }
            None => false,
        }
    }

    fn set_damping(&mut self, handle: BodyHandle, linear: f32, angular: f32) -> bool {
        match self.rapier_body_mut(handle) {
            Some(rb) => {
                rb.set_linear_damping(linear);
                rb.set_angular_damping(angular);
                true
            }
            None => false,
        }
    }

    fn set_shape(&mut self, handle: BodyHandle, shape: SharedShape) -> bool {
        let Some(entry) = self.handles.get(&handle).copied() else {
            return false;
        };
        let Some(collider) = self.colliders.get_mut(entry.collider) else {
            return false;
        };
        collider.set_shape(shape);
        if let Some(rb) = self.bodies.get_mut(entry.body) {
            rb.recompute_mass_properties_from_colliders(&self.colliders);
            rb.wake_up(true);
        }
        true
    }

    fn is_active(&self, handle: BodyHandle) -> bool {
        self.rapier_body(handle)
            .map(|rb| !rb.is_sleeping())
            .unwrap_or(false)
    }
}
