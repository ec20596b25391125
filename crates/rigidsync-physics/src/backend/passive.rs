//! Backend for `SimulatorKind::None`: bodies exist but nothing moves them.

use std::collections::HashMap;

use nalgebra::{Isometry3, Vector3};
use parry3d::shape::SharedShape;

use super::{BodyDesc, BodyHandle, DynamicsBackend, MassSettings, MaterialSettings};
use crate::config::SimulatorKind;
use crate::error::Result;

struct PassiveBody {
    transform: Isometry3<f32>,
}

/// Stores poses and nothing else.
///
/// Forces and impulses are accepted and ignored, and no body is ever
/// reported active.
pub struct PassiveBackend {
    gravity: Vector3<f32>,
    bodies: HashMap<BodyHandle, PassiveBody>,
    next_handle: u64,
}

impl PassiveBackend {
    /// Create an empty world.
    pub fn new(gravity: Vector3<f32>) -> Self {
        Self {
            gravity,
            bodies: HashMap::new(),
            next_handle: 0,
        }
    }
}

impl DynamicsBackend for PassiveBackend {
    fn kind(&self) -> SimulatorKind {
        SimulatorKind::None
    }

    fn gravity(&self) -> Vector3<f32> {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vector3<f32>) {
        self.gravity = gravity;
    }

    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle> {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(
            handle,
            PassiveBody {
                transform: desc.transform,
            },
        );
        Ok(handle)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies.remove(&handle).is_some()
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn step(&mut self, _dt: f32) {}

    fn clear_forces(&mut self) {}

    fn transform(&self, handle: BodyHandle) -> Option<Isometry3<f32>> {
        self.bodies.get(&handle).map(|b| b.transform)
    }

    fn set_transform(&mut self, handle: BodyHandle, transform: Isometry3<f32>) -> bool {
        match self.bodies.get_mut(&handle) {
            Some(body) => {
                body.transform = transform;
                true
            }
            None => false,
        }
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        self.bodies.get(&handle).map(|_| Vector3::zeros())
    }

    fn angular_velocity(&self, handle: BodyHandle) -> Option<Vector3<f32>> {
        self.bodies.get(&handle).map(|_| Vector3::zeros())
    }

    fn add_force(&mut self, handle: BodyHandle, _force: Vector3<f32>, _rel_pos: Vector3<f32>) -> bool {
        self.bodies.contains_key(&handle)
    }

    fn apply_impulse(
        &mut self,
        handle: BodyHandle,
        _impulse: Vector3<f32>,
        _rel_pos: Vector3<f32>,
    ) -> bool {
        self.bodies.contains_key(&handle)
    }

    fn set_mass_properties(&mut self, handle: BodyHandle, _mass: MassSettings) -> bool {
        self.bodies.contains_key(&handle)
    }

    fn set_material(&mut self, handle: BodyHandle, _material: MaterialSettings) -> bool {
        self.bodies.contains_key(&handle)
    }

    fn set_damping(&mut self, handle: BodyHandle, _linear: f32, _angular: f32) -> bool {
        self.bodies.contains_key(&handle)
    }

    fn set_shape(&mut self, handle: BodyHandle, _shape: SharedShape) -> bool {
        self.bodies.contains_key(&handle)
    }

    fn is_active(&self, _handle: BodyHandle) -> bool {
        false
    }
}
