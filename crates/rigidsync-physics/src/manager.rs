//! The physics manager: body registry, stepping and per-object API.

use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Instant;

use nalgebra::{Isometry3, Matrix4, Translation3, Unit, UnitQuaternion, Vector3};
use tracing::{debug, info, warn};

use crate::assets::{AssetInfo, AssetKind, AssetProvider, ObjectKey, ObjectTemplate};
use crate::backend::{create_backend, BodyDesc, DynamicsBackend, MotionType};
use crate::body::{BodyProperties, ObjectId, RigidBody, TransformAuthority};
use crate::colliders::{mesh_group_to_shape, shape_inertia, ColliderStrategy, IndexCountMass, MassPolicy};
use crate::config::{PhysicsManagerAttributes, PhysicsSceneAttributes};
use crate::error::{PhysicsError, Result};
use crate::mesh::{validate_mesh_group, CollisionMesh};
use crate::scene::{SceneNode, SceneNodeRef};
use crate::stepping::{FixedStepper, StepPlan, StepProfiler, Timeline};

/// Lifecycle of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// `init_physics` has not run yet.
    Uninitialized,
    /// Simulation is live.
    Initialized,
    /// `shutdown` has run; the manager is unusable.
    Destroyed,
}

/// Result of an activity check over dynamic bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityReport {
    /// Bodies the solver is still integrating.
    pub active: usize,
    /// All dynamic bodies.
    pub total: usize,
}

/// Owns every simulated body and keeps solver and scene graph in sync.
///
/// All calls happen on the thread driving the render loop: bodies are
/// added and removed between `step_physics` calls, never during one.
pub struct PhysicsManager {
    assets: Box<dyn AssetProvider>,
    mass_policy: Box<dyn MassPolicy>,
    backend: Option<Box<dyn DynamicsBackend>>,
    state: ManagerState,
    root: Weak<std::cell::RefCell<SceneNode>>,

    registry: HashMap<ObjectId, RigidBody>,
    scene: Option<RigidBody>,
    next_object_id: u64,

    stepper: FixedStepper,
    timeline: Timeline,
    profiler: StepProfiler,
    world_time: f64,
}

impl PhysicsManager {
    /// Create an uninitialized manager resolving objects through `assets`.
    pub fn new(assets: impl AssetProvider + 'static) -> Self {
        let defaults = PhysicsManagerAttributes::default();
        Self {
            assets: Box::new(assets),
            mass_policy: Box::new(IndexCountMass::default()),
            backend: None,
            state: ManagerState::Uninitialized,
            root: Weak::new(),
            registry: HashMap::new(),
            scene: None,
            next_object_id: 0,
            stepper: FixedStepper::new(defaults.timestep, defaults.max_substeps),
            timeline: Timeline::new(),
            profiler: StepProfiler::new(false),
            world_time: 0.0,
        }
    }

    /// Replace the policy used for objects without an explicit mass.
    pub fn with_mass_policy(mut self, policy: impl MassPolicy + 'static) -> Self {
        self.mass_policy = Box::new(policy);
        self
    }

    // ============ Initialization =============

    /// Build the solver world selected by `attributes.simulator` and bind
    /// `root` as the parent of every body's scene node.
    pub fn init_physics(
        &mut self,
        root: &SceneNodeRef,
        attributes: &PhysicsManagerAttributes,
    ) -> Result<()> {
        attributes.validate()?;
        let backend = create_backend(attributes.simulator, attributes.gravity());
        self.init_physics_with_backend(root, backend, attributes)
    }

    /// Like [`init_physics`](Self::init_physics) with a caller-supplied backend.
    pub fn init_physics_with_backend(
        &mut self,
        root: &SceneNodeRef,
        mut backend: Box<dyn DynamicsBackend>,
        attributes: &PhysicsManagerAttributes,
    ) -> Result<()> {
        if self.state != ManagerState::Uninitialized {
            return Err(PhysicsError::AlreadyInitialized);
        }
        attributes.validate()?;
        info!(simulator = ?backend.kind(), "initializing physics engine");

        backend.set_gravity(attributes.gravity());
        self.backend = Some(backend);
        self.root = Rc::downgrade(root);
        self.stepper = FixedStepper::new(attributes.timestep, attributes.max_substeps);
        self.profiler.set_enabled(attributes.profile);
        if attributes.profile {
            self.profiler.reset();
        }
        self.timeline.start();
        self.world_time = 0.0;
        self.state = ManagerState::Initialized;

        info!("initialized physics engine");
        Ok(())
    }

    /// Remove every body and make the manager unusable.
    pub fn shutdown(&mut self) {
        if self.state == ManagerState::Destroyed {
            return;
        }
        let bodies = self.registry.drain().map(|(_, body)| body);
        for body in bodies.chain(self.scene.take()) {
            if let Some(backend) = self.backend.as_mut() {
                backend.remove_body(body.handle());
            }
            if let Some(node) = body.node() {
                SceneNode::detach(&node);
            }
        }
        self.backend = None;
        self.state = ManagerState::Destroyed;
        info!("physics manager shut down");
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ManagerState {
        self.state
    }

    /// True between `init_physics` and `shutdown`.
    pub fn is_initialized(&self) -> bool {
        self.state == ManagerState::Initialized
    }

    fn backend(&self) -> Result<&dyn DynamicsBackend> {
        self.backend
            .as_deref()
            .ok_or(PhysicsError::UninitializedSimulation)
    }

    fn backend_mut(&mut self) -> Result<&mut Box<dyn DynamicsBackend>> {
        self.backend
            .as_mut()
            .ok_or(PhysicsError::UninitializedSimulation)
    }

    fn create_node(&self, name: String) -> Weak<std::cell::RefCell<SceneNode>> {
        match self.root.upgrade() {
            Some(root) => Rc::downgrade(&SceneNode::create_child(&root, name)),
            None => {
                warn!(node = %name, "physics root node is gone, body has no scene node");
                Weak::new()
            }
        }
    }

    // ============ Object/Scene Instantiation =============

    /// Add the static scene. Only one scene per simulation.
    ///
    /// Every mesh group must be made of triangles; otherwise nothing is
    /// registered.
    pub fn add_scene(
        &mut self,
        info: &AssetInfo,
        attributes: &PhysicsSceneAttributes,
        mesh_group: &[CollisionMesh],
    ) -> Result<()> {
        self.backend()?;
        if self.scene.is_some() {
            return Err(PhysicsError::SceneAlreadyAdded);
        }
        validate_mesh_group(mesh_group)?;

        match info.kind {
            AssetKind::InstanceMesh => info!(path = %info.filepath, "initialize instance scene"),
            AssetKind::FrlInstanceMesh => info!(path = %info.filepath, "initialize FRL scene"),
            AssetKind::Generic => info!(path = %info.filepath, "initialize GLB scene"),
        }

        let shape = mesh_group_to_shape(mesh_group, ColliderStrategy::TriMesh, 1.0, &info.filepath)?;
        let properties = BodyProperties {
            mass: 0.0,
            inertia: Vector3::zeros(),
            com: Vector3::zeros(),
            scale: 1.0,
            friction: attributes.friction_coefficient,
            restitution: attributes.restitution_coefficient,
            linear_damping: 0.0,
            angular_damping: 0.0,
            margin: 0.0,
        };
        let desc = BodyDesc {
            name: info.filepath.clone(),
            motion: MotionType::Static,
            transform: Isometry3::identity(),
            shape,
            mass: properties.mass_settings(),
            material: properties.material_settings(),
            linear_damping: 0.0,
            angular_damping: 0.0,
        };

        let backend = self.backend_mut()?;
        let handle = backend.create_body(&desc)?;
        if let Some(gravity) = attributes.gravity {
            backend.set_gravity(Vector3::from(gravity));
        }

        let node = self.create_node("scene".to_string());
        // The scene is not an object and does not consume an object ID.
        self.scene = Some(RigidBody::new(
            ObjectId(u64::MAX),
            MotionType::Static,
            handle,
            properties,
            false,
            mesh_group.to_vec(),
            node,
        ));
        info!("init scene done");
        Ok(())
    }

    /// Add an object from a template known to the asset provider.
    pub fn add_object(&mut self, key: ObjectKey<'_>, motion: MotionType) -> Result<ObjectId> {
        self.backend()?;
        let template = self
            .assets
            .object_template(key)
            .cloned()
            .ok_or_else(|| PhysicsError::UnknownObjectTemplate(key.to_string()))?;
        self.add_object_from_template(&template, motion)
    }

    /// Add an object from an explicit template.
    pub fn add_object_from_template(
        &mut self,
        template: &ObjectTemplate,
        motion: MotionType,
    ) -> Result<ObjectId> {
        self.backend()?;
        validate_mesh_group(&template.mesh_group)?;
        let attributes = &template.attributes;
        attributes.validate()?;

        let id = ObjectId(self.next_object_id);
        let name = if attributes.origin_handle.is_empty() {
            format!("object_{}", id)
        } else {
            attributes.origin_handle.clone()
        };

        let mass = attributes
            .mass
            .unwrap_or_else(|| self.mass_policy.default_mass(&template.mesh_group));
        let shape = mesh_group_to_shape(
            &template.mesh_group,
            ColliderStrategy::ConvexHull,
            attributes.scale,
            &name,
        )?;

        let mut properties = BodyProperties::from_attributes(attributes, mass);
        let derived_inertia = properties.inertia == Vector3::zeros();
        if derived_inertia {
            properties.inertia = shape_inertia(&shape, mass);
        }

        let desc = BodyDesc {
            name: name.clone(),
            motion,
            transform: Isometry3::identity(),
            shape,
            mass: properties.mass_settings(),
            material: properties.material_settings(),
            linear_damping: properties.linear_damping,
            angular_damping: properties.angular_damping,
        };
        let handle = self.backend_mut()?.create_body(&desc)?;

        let node = self.create_node(name.clone());
        self.registry.insert(
            id,
            RigidBody::new(
                id,
                motion,
                handle,
                properties,
                derived_inertia,
                template.mesh_group.clone(),
                node,
            ),
        );
        self.next_object_id += 1;

        info!(%id, object = %name, ?motion, mass, "added object");
        Ok(id)
    }

    /// Remove an object from the registry, the solver and the scene graph.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<()> {
        self.backend()?;
        let body = self
            .registry
            .remove(&id)
            .ok_or(PhysicsError::UnknownObjectId(id))?;
        self.backend_mut()?.remove_body(body.handle());
        if let Some(node) = body.node() {
            SceneNode::detach(&node);
        }
        info!(%id, "removed object");
        Ok(())
    }

    /// IDs of all registered objects, ascending.
    pub fn object_ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.registry.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Number of registered objects (the scene is not counted).
    pub fn object_count(&self) -> usize {
        self.registry.len()
    }

    /// A registered object.
    pub fn object(&self, id: ObjectId) -> Option<&RigidBody> {
        self.registry.get(&id)
    }

    /// The static scene, if one was added.
    pub fn scene(&self) -> Option<&RigidBody> {
        self.scene.as_ref()
    }

    /// Scene plus all objects.
    pub fn bodies(&self) -> impl Iterator<Item = &RigidBody> {
        self.scene.iter().chain(self.registry.values())
    }

    /// Scene node mirroring an object.
    pub fn object_node(&self, id: ObjectId) -> Result<SceneNodeRef> {
        let body = self.registry.get(&id).ok_or(PhysicsError::UnknownObjectId(id))?;
        body.node().ok_or(PhysicsError::UnknownObjectId(id))
    }

    // ============ Simulator functions =============

    /// Advance the simulation by `dt` seconds of frame time.
    ///
    /// The time is split into fixed solver steps (see [`FixedStepper`]);
    /// afterwards solver-owned poses are copied into their scene nodes.
    pub fn step_physics(&mut self, dt: f64) -> Result<StepPlan> {
        self.backend()?;
        if !dt.is_finite() {
            return Err(PhysicsError::InvalidConfig(format!(
                "frame time must be finite, got {}",
                dt
            )));
        }
        let start = Instant::now();

        let plan = self.stepper.plan(dt);
        let backend = self.backend_mut()?;
        for _ in 0..plan.steps {
            backend.step(plan.step_size as f32);
        }
        backend.clear_forces();
        self.world_time += plan.simulated_time();

        self.sync_scene_nodes();

        self.profiler.record(start.elapsed());
        if self.profiler.is_enabled() {
            debug!(
                steps = plan.steps,
                fps = ?self.profiler.steps_per_second(),
                average_fps = ?self.profiler.average_steps_per_second(),
                "step physics"
            );
        }
        Ok(plan)
    }

    /// Step by the duration of the previous application frame.
    pub fn step_physics_realtime(&mut self) -> Result<StepPlan> {
        let dt = self
            .timeline
            .previous_frame_duration()
            .map(|d| d.as_secs_f64())
            .unwrap_or_else(|| self.stepper.fixed_time_step());
        self.step_physics(dt)
    }

    /// Close the current application frame and refresh activity counts.
    pub fn next_frame(&mut self) -> Result<ActivityReport> {
        self.backend()?;
        self.timeline.next_frame();
        self.check_active_objects()
    }

    /// Count dynamic objects the solver is still integrating.
    pub fn check_active_objects(&self) -> Result<ActivityReport> {
        let backend = self.backend()?;
        let mut report = ActivityReport::default();
        for body in self.registry.values() {
            if body.motion_type() != MotionType::Dynamic {
                continue;
            }
            report.total += 1;
            if backend.is_active(body.handle()) {
                report.active += 1;
            }
        }
        debug!(total = report.total, active = report.active, "active objects");
        Ok(report)
    }

    fn sync_scene_nodes(&self) {
        let Some(backend) = self.backend.as_deref() else {
            return;
        };
        for body in self.bodies() {
            if body.authority() != TransformAuthority::Solver {
                continue;
            }
            if let (Some(node), Some(transform)) = (body.node(), backend.transform(body.handle())) {
                node.borrow_mut().set_transformation(transform);
            }
        }
    }

    /// Fixed solver step (seconds).
    pub fn timestep(&self) -> f64 {
        self.stepper.fixed_time_step()
    }

    /// Change the fixed solver step.
    pub fn set_timestep(&mut self, dt: f64) -> Result<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                dt
            )));
        }
        self.stepper.set_fixed_time_step(dt);
        Ok(())
    }

    /// Maximum solver steps per `step_physics` call.
    pub fn max_substeps(&self) -> u32 {
        self.stepper.max_substeps()
    }

    /// Change the maximum solver steps per call.
    pub fn set_max_substeps(&mut self, max_substeps: u32) {
        self.stepper.set_max_substeps(max_substeps);
    }

    /// Simulated time since `init_physics`.
    pub fn world_time(&self) -> f64 {
        self.world_time
    }

    /// Step timing statistics.
    pub fn profiler(&self) -> &StepProfiler {
        &self.profiler
    }

    /// World gravity.
    pub fn gravity(&self) -> Result<Vector3<f32>> {
        Ok(self.backend()?.gravity())
    }

    /// Replace world gravity for all dynamic bodies.
    pub fn set_gravity(&mut self, gravity: Vector3<f32>) -> Result<()> {
        self.backend_mut()?.set_gravity(gravity);
        Ok(())
    }

    // =========== Scene Getter/Setter functions ===========

    fn scene_body_mut(&mut self) -> Result<(&mut Box<dyn DynamicsBackend>, &mut RigidBody)> {
        let backend = self
            .backend
            .as_mut()
            .ok_or(PhysicsError::UninitializedSimulation)?;
        let scene = self.scene.as_mut().ok_or(PhysicsError::NoScene)?;
        Ok((backend, scene))
    }

    /// Scene friction coefficient.
    pub fn scene_friction_coefficient(&self) -> Result<f32> {
        self.backend()?;
        let scene = self.scene.as_ref().ok_or(PhysicsError::NoScene)?;
        Ok(scene.properties.friction)
    }

    /// Change the scene friction coefficient.
    pub fn set_scene_friction_coefficient(&mut self, friction: f32) -> Result<()> {
        let (backend, scene) = self.scene_body_mut()?;
        scene.properties.friction = friction;
        backend.set_material(scene.handle(), scene.properties.material_settings());
        Ok(())
    }

    /// Scene restitution coefficient.
    pub fn scene_restitution_coefficient(&self) -> Result<f32> {
        self.backend()?;
        let scene = self.scene.as_ref().ok_or(PhysicsError::NoScene)?;
        Ok(scene.properties.restitution)
    }

    /// Change the scene restitution coefficient.
    pub fn set_scene_restitution_coefficient(&mut self, restitution: f32) -> Result<()> {
        let (backend, scene) = self.scene_body_mut()?;
        scene.properties.restitution = restitution;
        backend.set_material(scene.handle(), scene.properties.material_settings());
        Ok(())
    }

    // ============ Object Transformation functions =============

    fn parts(&self, id: ObjectId) -> Result<(&dyn DynamicsBackend, &RigidBody)> {
        let backend = self.backend()?;
        let body = self.registry.get(&id).ok_or(PhysicsError::UnknownObjectId(id))?;
        Ok((backend, body))
    }

    fn parts_mut(&mut self, id: ObjectId) -> Result<(&mut Box<dyn DynamicsBackend>, &mut RigidBody)> {
        let backend = self
            .backend
            .as_mut()
            .ok_or(PhysicsError::UninitializedSimulation)?;
        let body = self
            .registry
            .get_mut(&id)
            .ok_or(PhysicsError::UnknownObjectId(id))?;
        Ok((backend, body))
    }

    /// Write a new pose into the solver and mirror it into the scene node.
    fn update_transformation(
        &mut self,
        id: ObjectId,
        update: impl FnOnce(Isometry3<f32>) -> Isometry3<f32>,
    ) -> Result<()> {
        let (backend, body) = self.parts_mut(id)?;
        let current = backend
            .transform(body.handle())
            .ok_or(PhysicsError::UnknownObjectId(id))?;
        let transform = update(current);
        backend.set_transform(body.handle(), transform);
        if let Some(node) = body.node() {
            node.borrow_mut().set_transformation(transform);
        }
        Ok(())
    }

    /// Replace the pose.
    pub fn set_transformation(&mut self, id: ObjectId, transform: Isometry3<f32>) -> Result<()> {
        self.update_transformation(id, |_| transform)
    }

    /// Replace the position, keeping orientation.
    pub fn set_translation(&mut self, id: ObjectId, translation: Vector3<f32>) -> Result<()> {
        self.update_transformation(id, |current| {
            Isometry3::from_parts(Translation3::from(translation), current.rotation)
        })
    }

    /// Replace the orientation, keeping position.
    pub fn set_rotation(&mut self, id: ObjectId, rotation: UnitQuaternion<f32>) -> Result<()> {
        self.update_transformation(id, |current| Isometry3::from_parts(current.translation, rotation))
    }

    /// Reset the pose to identity.
    pub fn reset_transformation(&mut self, id: ObjectId) -> Result<()> {
        self.update_transformation(id, |_| Isometry3::identity())
    }

    /// Translate in the parent frame.
    pub fn translate(&mut self, id: ObjectId, vector: Vector3<f32>) -> Result<()> {
        self.update_transformation(id, |current| Translation3::from(vector) * current)
    }

    /// Translate in the body frame.
    pub fn translate_local(&mut self, id: ObjectId, vector: Vector3<f32>) -> Result<()> {
        self.update_transformation(id, |current| current * Translation3::from(vector))
    }

    /// Rotate about an axis through the parent-frame origin.
    pub fn rotate(&mut self, id: ObjectId, angle: f32, axis: Unit<Vector3<f32>>) -> Result<()> {
        let rotation = Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&axis, angle),
        );
        self.update_transformation(id, |current| rotation * current)
    }

    /// Rotate about an axis of the body frame.
    pub fn rotate_local(&mut self, id: ObjectId, angle: f32, axis: Unit<Vector3<f32>>) -> Result<()> {
        let rotation = Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&axis, angle),
        );
        self.update_transformation(id, |current| current * rotation)
    }

    /// Rotate about the parent-frame X axis.
    pub fn rotate_x(&mut self, id: ObjectId, angle: f32) -> Result<()> {
        self.rotate(id, angle, Vector3::x_axis())
    }

    /// Rotate about the parent-frame Y axis.
    pub fn rotate_y(&mut self, id: ObjectId, angle: f32) -> Result<()> {
        self.rotate(id, angle, Vector3::y_axis())
    }

    /// Rotate about the parent-frame Z axis.
    pub fn rotate_z(&mut self, id: ObjectId, angle: f32) -> Result<()> {
        self.rotate(id, angle, Vector3::z_axis())
    }

    /// Rotate about the body X axis.
    pub fn rotate_x_local(&mut self, id: ObjectId, angle: f32) -> Result<()> {
        self.rotate_local(id, angle, Vector3::x_axis())
    }

    /// Rotate about the body Y axis.
    pub fn rotate_y_local(&mut self, id: ObjectId, angle: f32) -> Result<()> {
        self.rotate_local(id, angle, Vector3::y_axis())
    }

    /// Rotate about the body Z axis.
    pub fn rotate_z_local(&mut self, id: ObjectId, angle: f32) -> Result<()> {
        self.rotate_local(id, angle, Vector3::z_axis())
    }

    /// Current pose as seen by the solver.
    pub fn transformation(&self, id: ObjectId) -> Result<Isometry3<f32>> {
        let (backend, body) = self.parts(id)?;
        backend
            .transform(body.handle())
            .ok_or(PhysicsError::UnknownObjectId(id))
    }

    /// Current pose as a 4x4 matrix.
    pub fn transformation_matrix(&self, id: ObjectId) -> Result<Matrix4<f32>> {
        Ok(self.transformation(id)?.to_homogeneous())
    }

    /// Current position.
    pub fn translation(&self, id: ObjectId) -> Result<Vector3<f32>> {
        Ok(self.transformation(id)?.translation.vector)
    }

    /// Current orientation.
    pub fn rotation(&self, id: ObjectId) -> Result<UnitQuaternion<f32>> {
        Ok(self.transformation(id)?.rotation)
    }

    /// Linear velocity.
    pub fn linear_velocity(&self, id: ObjectId) -> Result<Vector3<f32>> {
        let (backend, body) = self.parts(id)?;
        backend
            .linear_velocity(body.handle())
            .ok_or(PhysicsError::UnknownObjectId(id))
    }

    /// Angular velocity.
    pub fn angular_velocity(&self, id: ObjectId) -> Result<Vector3<f32>> {
        let (backend, body) = self.parts(id)?;
        backend
            .angular_velocity(body.handle())
            .ok_or(PhysicsError::UnknownObjectId(id))
    }

    //============ Interact with objects =============

    /// Push on an object during the next step. `rel_pos` is measured from
    /// the center of mass; off-center forces also produce torque.
    pub fn apply_force(&mut self, id: ObjectId, force: Vector3<f32>, rel_pos: Vector3<f32>) -> Result<()> {
        let (backend, body) = self.parts_mut(id)?;
        backend.add_force(body.handle(), force, rel_pos);
        Ok(())
    }

    /// Change an object's velocity instantly.
    pub fn apply_impulse(&mut self, id: ObjectId, impulse: Vector3<f32>, rel_pos: Vector3<f32>) -> Result<()> {
        let (backend, body) = self.parts_mut(id)?;
        backend.apply_impulse(body.handle(), impulse, rel_pos);
        Ok(())
    }

    // ============ Object Setter/Getter functions =============

    fn properties(&self, id: ObjectId) -> Result<&BodyProperties> {
        Ok(self.parts(id)?.1.properties())
    }

    /// Recompute shape-derived inertia if needed and push mass properties.
    fn push_mass(backend: &mut dyn DynamicsBackend, body: &mut RigidBody) -> Result<()> {
        if body.derived_inertia {
            let shape = mesh_group_to_shape(
                body.geometry(),
                ColliderStrategy::ConvexHull,
                body.properties.scale,
                &body.id().to_string(),
            )?;
            body.properties.inertia = shape_inertia(&shape, body.properties.mass);
        }
        backend.set_mass_properties(body.handle(), body.properties.mass_settings());
        Ok(())
    }

    /// Mass in kg.
    pub fn mass(&self, id: ObjectId) -> Result<f32> {
        Ok(self.properties(id)?.mass)
    }

    /// Change the mass. Shape-derived inertia follows.
    pub fn set_mass(&mut self, id: ObjectId, mass: f32) -> Result<()> {
        if mass.is_nan() || mass < 0.0 {
            return Err(PhysicsError::InvalidConfig(format!("mass must be >= 0, got {}", mass)));
        }
        let (backend, body) = self.parts_mut(id)?;
        body.properties.mass = mass;
        Self::push_mass(&mut **backend, body)
    }

    /// Principal inertia.
    pub fn inertia(&self, id: ObjectId) -> Result<Vector3<f32>> {
        Ok(self.properties(id)?.inertia)
    }

    /// Set the principal inertia explicitly.
    pub fn set_inertia(&mut self, id: ObjectId, inertia: Vector3<f32>) -> Result<()> {
        let (backend, body) = self.parts_mut(id)?;
        body.properties.inertia = inertia;
        body.derived_inertia = false;
        Self::push_mass(&mut **backend, body)
    }

    /// Center of mass in the body frame.
    pub fn com(&self, id: ObjectId) -> Result<Vector3<f32>> {
        Ok(self.properties(id)?.com)
    }

    /// Move the center of mass.
    pub fn set_com(&mut self, id: ObjectId, com: Vector3<f32>) -> Result<()> {
        let (backend, body) = self.parts_mut(id)?;
        body.properties.com = com;
        Self::push_mass(&mut **backend, body)
    }

    /// Collision scale.
    pub fn scale(&self, id: ObjectId) -> Result<f32> {
        Ok(self.properties(id)?.scale)
    }

    /// Rescale the collision shape.
    pub fn set_scale(&mut self, id: ObjectId, scale: f32) -> Result<()> {
        if scale.is_nan() || scale <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!("scale must be positive, got {}", scale)));
        }
        let (backend, body) = self.parts_mut(id)?;
        let shape = mesh_group_to_shape(
            body.geometry(),
            ColliderStrategy::ConvexHull,
            scale,
            &body.id().to_string(),
        )?;
        body.properties.scale = scale;
        backend.set_shape(body.handle(), shape);
        Self::push_mass(&mut **backend, body)
    }

    /// Friction coefficient.
    pub fn friction_coefficient(&self, id: ObjectId) -> Result<f32> {
        Ok(self.properties(id)?.friction)
    }

    /// Change the friction coefficient.
    pub fn set_friction_coefficient(&mut self, id: ObjectId, friction: f32) -> Result<()> {
        let (backend, body) = self.parts_mut(id)?;
        body.properties.friction = friction;
        backend.set_material(body.handle(), body.properties.material_settings());
        Ok(())
    }

    /// Restitution coefficient.
    pub fn restitution_coefficient(&self, id: ObjectId) -> Result<f32> {
        Ok(self.properties(id)?.restitution)
    }

    /// Change the restitution coefficient.
    pub fn set_restitution_coefficient(&mut self, id: ObjectId, restitution: f32) -> Result<()> {
        let (backend, body) = self.parts_mut(id)?;
        body.properties.restitution = restitution;
        backend.set_material(body.handle(), body.properties.material_settings());
        Ok(())
    }

    /// Linear damping.
    pub fn linear_damping(&self, id: ObjectId) -> Result<f32> {
        Ok(self.properties(id)?.linear_damping)
    }

    /// Change the linear damping.
    pub fn set_linear_damping(&mut self, id: ObjectId, damping: f32) -> Result<()> {
        let (backend, body) = self.parts_mut(id)?;
        body.properties.linear_damping = damping;
        let props = body.properties();
        backend.set_damping(body.handle(), props.linear_damping, props.angular_damping);
        Ok(())
    }

    /// Angular damping.
    pub fn angular_damping(&self, id: ObjectId) -> Result<f32> {
        Ok(self.properties(id)?.angular_damping)
    }

    /// Change the angular damping.
    pub fn set_angular_damping(&mut self, id: ObjectId, damping: f32) -> Result<()> {
        let (backend, body) = self.parts_mut(id)?;
        body.properties.angular_damping = damping;
        let props = body.properties();
        backend.set_damping(body.handle(), props.linear_damping, props.angular_damping);
        Ok(())
    }

    /// Collision margin.
    pub fn margin(&self, id: ObjectId) -> Result<f32> {
        Ok(self.properties(id)?.margin)
    }

    /// Change the collision margin.
    pub fn set_margin(&mut self, id: ObjectId, margin: f32) -> Result<()> {
        if margin.is_nan() || margin < 0.0 {
            return Err(PhysicsError::InvalidConfig(format!("margin must be >= 0, got {}", margin)));
        }
        let (backend, body) = self.parts_mut(id)?;
        body.properties.margin = margin;
        backend.set_material(body.handle(), body.properties.material_settings());
        Ok(())
    }
}

impl Drop for PhysicsManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ObjectLibrary;
    use crate::config::{PhysicsObjectAttributes, SimulatorKind};
    use crate::mesh::MeshPrimitive;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    const CUBE: &str = "cube.phys.json";

    fn cube_template(mass: Option<f32>) -> ObjectTemplate {
        ObjectTemplate {
            attributes: PhysicsObjectAttributes {
                mass,
                ..Default::default()
            },
            mesh_group: vec![CollisionMesh::cuboid(0.5, 0.5, 0.5)],
        }
    }

    fn rapier_attributes(gravity: [f32; 3]) -> PhysicsManagerAttributes {
        PhysicsManagerAttributes {
            simulator: SimulatorKind::Rapier,
            timestep: 1.0 / 240.0,
            max_substeps: 10,
            gravity,
            profile: false,
        }
    }

    fn manager(gravity: [f32; 3]) -> (PhysicsManager, SceneNodeRef) {
        let mut library = ObjectLibrary::new();
        library.register(CUBE, cube_template(Some(1.0)));
        let root = SceneNode::new_root("root");
        let mut manager = PhysicsManager::new(library);
        manager
            .init_physics(&root, &rapier_attributes(gravity))
            .unwrap();
        (manager, root)
    }

    fn ground() -> Vec<CollisionMesh> {
        vec![CollisionMesh::cuboid(20.0, 0.5, 20.0)]
    }

    #[test]
    fn test_ids_are_monotonic_and_never_reused() {
        let (mut manager, _root) = manager([0.0, 0.0, 0.0]);
        let a = manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Dynamic).unwrap();
        let b = manager.add_object(ObjectKey::Index(0), MotionType::Dynamic).unwrap();
        assert_eq!((a, b), (ObjectId(0), ObjectId(1)));

        manager.remove_object(b).unwrap();
        let c = manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Dynamic).unwrap();
        assert_eq!(c, ObjectId(2));
        assert_eq!(manager.object_ids(), vec![ObjectId(0), ObjectId(2)]);
    }

    #[test]
    fn test_invalid_primitive_rejected_without_registration() {
        let (mut manager, root) = manager([0.0, -9.8, 0.0]);
        let mut template = cube_template(Some(1.0));
        let mut lines = CollisionMesh::cuboid(0.5, 0.5, 0.5);
        lines.primitive = MeshPrimitive::Lines;
        template.mesh_group.push(lines);

        let err = manager
            .add_object_from_template(&template, MotionType::Dynamic)
            .unwrap_err();
        assert!(matches!(err, PhysicsError::InvalidCollisionPrimitive { group: 1, .. }));
        assert_eq!(manager.object_count(), 0);
        assert!(root.borrow().children().is_empty());

        // The failed attempt did not consume an ID.
        let id = manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Dynamic).unwrap();
        assert_eq!(id, ObjectId(0));
    }

    #[test]
    fn test_invalid_scene_rejected() {
        let (mut manager, _root) = manager([0.0, -9.8, 0.0]);
        let mut strip = CollisionMesh::cuboid(1.0, 1.0, 1.0);
        strip.primitive = MeshPrimitive::TriangleStrip;

        let err = manager
            .add_scene(&AssetInfo::default(), &PhysicsSceneAttributes::default(), &[strip])
            .unwrap_err();
        assert!(matches!(err, PhysicsError::InvalidCollisionPrimitive { .. }));
        assert!(manager.scene().is_none());
        assert_eq!(manager.bodies().count(), 0);
    }

    #[test]
    fn test_only_one_scene() {
        let (mut manager, _root) = manager([0.0, -9.8, 0.0]);
        let info = AssetInfo::default();
        let attrs = PhysicsSceneAttributes::default();
        manager.add_scene(&info, &attrs, &ground()).unwrap();
        let err = manager.add_scene(&info, &attrs, &ground()).unwrap_err();
        assert!(matches!(err, PhysicsError::SceneAlreadyAdded));
    }

    #[test]
    fn test_uninitialized_operations_are_reported() {
        let mut library = ObjectLibrary::new();
        library.register(CUBE, cube_template(Some(1.0)));
        let mut manager = PhysicsManager::new(library);

        assert!(matches!(
            manager.step_physics(1.0 / 60.0),
            Err(PhysicsError::UninitializedSimulation)
        ));
        assert!(matches!(
            manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Dynamic),
            Err(PhysicsError::UninitializedSimulation)
        ));
        assert!(matches!(
            manager.apply_impulse(ObjectId(0), Vector3::x(), Vector3::zeros()),
            Err(PhysicsError::UninitializedSimulation)
        ));
        assert!(matches!(manager.gravity(), Err(PhysicsError::UninitializedSimulation)));
        assert!(matches!(manager.next_frame(), Err(PhysicsError::UninitializedSimulation)));
        assert!(manager.timeline.previous_frame_duration().is_none());
        assert_eq!(manager.object_count(), 0);
        assert_eq!(manager.world_time(), 0.0);
    }

    #[test]
    fn test_init_twice_is_an_error() {
        let (mut manager, root) = manager([0.0, -9.8, 0.0]);
        let err = manager
            .init_physics(&root, &PhysicsManagerAttributes::default())
            .unwrap_err();
        assert!(matches!(err, PhysicsError::AlreadyInitialized));
        assert_eq!(manager.state(), ManagerState::Initialized);
    }

    #[test]
    fn test_unknown_ids_are_reported() {
        let (mut manager, _root) = manager([0.0, -9.8, 0.0]);
        let missing = ObjectId(7);
        assert!(matches!(
            manager.remove_object(missing),
            Err(PhysicsError::UnknownObjectId(ObjectId(7)))
        ));
        assert!(matches!(
            manager.translate(missing, Vector3::x()),
            Err(PhysicsError::UnknownObjectId(_))
        ));
        assert!(matches!(manager.mass(missing), Err(PhysicsError::UnknownObjectId(_))));
        assert!(matches!(
            manager.add_object(ObjectKey::ConfigFile("missing.phys.json"), MotionType::Dynamic),
            Err(PhysicsError::UnknownObjectTemplate(_))
        ));
    }

    #[test]
    fn test_no_influence_means_no_motion() {
        let (mut manager, _root) = manager([0.0, 0.0, 0.0]);
        let id = manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Dynamic).unwrap();
        manager.set_translation(id, Vector3::new(1.0, 2.0, 3.0)).unwrap();
        let before = manager.transformation(id).unwrap();

        for _ in 0..30 {
            manager.step_physics(1.0 / 60.0).unwrap();
        }

        let after = manager.transformation(id).unwrap();
        assert_relative_eq!(after.translation.vector, before.translation.vector, epsilon = 1.0e-6);
        assert_relative_eq!(after.rotation.angle_to(&before.rotation), 0.0, epsilon = 1.0e-6);
    }

    #[test]
    fn test_centered_impulse_changes_only_linear_velocity() {
        let (mut manager, _root) = manager([0.0, 0.0, 0.0]);
        let id = manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Dynamic).unwrap();
        manager.set_mass(id, 2.0).unwrap();

        manager
            .apply_impulse(id, Vector3::new(4.0, 0.0, 0.0), Vector3::zeros())
            .unwrap();

        let linvel = manager.linear_velocity(id).unwrap();
        assert_relative_eq!(linvel.x, 2.0, epsilon = 1.0e-4);
        assert_relative_eq!(manager.angular_velocity(id).unwrap().norm(), 0.0);
    }

    #[test]
    fn test_offset_force_produces_torque() {
        let (mut manager, _root) = manager([0.0, 0.0, 0.0]);
        let id = manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Dynamic).unwrap();
        manager.set_timestep(0.01).unwrap();

        // r x F = (0, 0.5, 0) x (10, 0, 0) = (0, 0, -5); I = 1/6 for the unit cube.
        manager
            .apply_force(id, Vector3::new(10.0, 0.0, 0.0), Vector3::new(0.0, 0.5, 0.0))
            .unwrap();
        assert_eq!(manager.step_physics(0.01).unwrap().steps, 1);

        let angvel = manager.angular_velocity(id).unwrap();
        assert_relative_eq!(angvel.z, -0.3, epsilon = 0.01);
        assert_relative_eq!(angvel.x, 0.0, epsilon = 1.0e-6);
        assert_relative_eq!(angvel.y, 0.0, epsilon = 1.0e-6);
        assert_relative_eq!(manager.linear_velocity(id).unwrap().x, 0.1, epsilon = 0.01);
    }

    #[test]
    fn test_inertia_change_reaches_solver() {
        let (mut manager, _root) = manager([0.0, 0.0, 0.0]);
        let id = manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Dynamic).unwrap();
        manager.set_inertia(id, Vector3::new(1.0, 1.0, 1.0)).unwrap();

        manager
            .apply_impulse(id, Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.5, 0.0))
            .unwrap();

        // With the derived 1/6 inertia this would be -3.
        let angvel = manager.angular_velocity(id).unwrap();
        assert_relative_eq!(angvel, Vector3::new(0.0, 0.0, -0.5), epsilon = 1.0e-4);
    }

    #[test]
    fn test_non_finite_frame_time_is_rejected() {
        let (mut manager, _root) = manager([0.0, -9.8, 0.0]);
        let id = manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Dynamic).unwrap();
        manager.set_translation(id, Vector3::new(0.0, 10.0, 0.0)).unwrap();

        for dt in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                manager.step_physics(dt),
                Err(PhysicsError::InvalidConfig(_))
            ));
        }
        assert_eq!(manager.world_time(), 0.0);

        let mut steps = 0;
        for _ in 0..60 {
            steps += manager.step_physics(1.0 / 60.0).unwrap().steps;
        }
        assert!(steps > 0);
        assert!(manager.translation(id).unwrap().y < 10.0);
    }

    #[test]
    fn test_scene_with_bad_index_is_rejected() {
        let (mut manager, root) = manager([0.0, -9.8, 0.0]);
        let floor = CollisionMesh::triangles(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0],
            vec![0, 1, 7],
        );

        let err = manager
            .add_scene(&AssetInfo::default(), &PhysicsSceneAttributes::default(), &[floor])
            .unwrap_err();
        assert!(matches!(err, PhysicsError::SolverFailure { .. }));
        assert!(manager.scene().is_none());
        assert!(root.borrow().children().is_empty());

        // A well-formed scene can still be added afterwards.
        manager
            .add_scene(&AssetInfo::default(), &PhysicsSceneAttributes::default(), &ground())
            .unwrap();
    }

    #[test]
    fn test_cube_falls_onto_scene() {
        let (mut manager, root) = manager([0.0, -9.8, 0.0]);
        manager
            .add_scene(&AssetInfo::default(), &PhysicsSceneAttributes::default(), &ground())
            .unwrap();
        let scene: Vec<_> = manager.bodies().collect();
        assert_eq!(scene.len(), 1);
        assert_eq!(scene[0].motion_type(), MotionType::Static);

        let id = manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Dynamic).unwrap();
        assert_eq!(id, ObjectId(0));
        manager.set_translation(id, Vector3::new(0.0, 10.0, 0.0)).unwrap();

        for _ in 0..60 {
            manager.step_physics(1.0 / 60.0).unwrap();
        }

        let y = manager.translation(id).unwrap().y;
        assert!(y < 10.0);
        let report = manager.check_active_objects().unwrap();
        assert_eq!(report, ActivityReport { active: 1, total: 1 });

        // The scene node mirrors the solver after every step.
        let node = manager.object_node(id).unwrap();
        assert_relative_eq!(node.borrow().transformation().translation.y, y);
        assert_eq!(root.borrow().children().len(), 2);
    }

    #[test]
    fn test_kinematic_pose_survives_step() {
        let (mut manager, _root) = manager([0.0, -9.8, 0.0]);
        let id = manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Kinematic).unwrap();
        manager.set_translation(id, Vector3::new(0.0, 5.0, 0.0)).unwrap();

        for _ in 0..10 {
            manager.step_physics(1.0 / 60.0).unwrap();
        }

        assert_relative_eq!(manager.translation(id).unwrap().y, 5.0);
        assert_eq!(manager.check_active_objects().unwrap().total, 0);
    }

    #[test]
    fn test_gravity_inversion_is_involution() {
        let (mut manager, _root) = manager([0.0, -9.8, 0.0]);
        let original = manager.gravity().unwrap();
        manager.set_gravity(-original).unwrap();
        assert_eq!(manager.gravity().unwrap(), Vector3::new(0.0, 9.8, 0.0));
        let inverted = manager.gravity().unwrap();
        manager.set_gravity(-inverted).unwrap();
        assert_eq!(manager.gravity().unwrap(), original);
    }

    #[test]
    fn test_world_and_local_transforms() {
        let (mut manager, _root) = manager([0.0, 0.0, 0.0]);
        let id = manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Kinematic).unwrap();

        manager.translate(id, Vector3::new(1.0, 0.0, 0.0)).unwrap();
        manager.rotate_y_local(id, FRAC_PI_2).unwrap();
        // Local +X now points along world -Z.
        manager.translate_local(id, Vector3::new(1.0, 0.0, 0.0)).unwrap();
        let t = manager.translation(id).unwrap();
        assert_relative_eq!(t, Vector3::new(1.0, 0.0, -1.0), epsilon = 1.0e-5);

        // A world rotation swings the position around the origin.
        manager.rotate_z(id, FRAC_PI_2).unwrap();
        let t = manager.translation(id).unwrap();
        assert_relative_eq!(t, Vector3::new(0.0, 1.0, -1.0), epsilon = 1.0e-5);

        manager.reset_transformation(id).unwrap();
        assert_eq!(manager.transformation(id).unwrap(), Isometry3::identity());
        let node = manager.object_node(id).unwrap();
        assert_eq!(node.borrow().transformation(), Isometry3::identity());
    }

    #[test]
    fn test_property_setters() {
        let (mut manager, _root) = manager([0.0, 0.0, 0.0]);
        let id = manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Dynamic).unwrap();

        let derived = manager.inertia(id).unwrap();
        assert_relative_eq!(derived.x, 1.0 / 6.0, epsilon = 1.0e-4);
        manager.set_mass(id, 2.0).unwrap();
        assert_relative_eq!(manager.inertia(id).unwrap().x, 2.0 / 6.0, epsilon = 1.0e-4);

        manager.set_inertia(id, Vector3::new(1.0, 2.0, 3.0)).unwrap();
        manager.set_mass(id, 4.0).unwrap();
        assert_eq!(manager.inertia(id).unwrap(), Vector3::new(1.0, 2.0, 3.0));

        manager.set_com(id, Vector3::new(0.0, 0.1, 0.0)).unwrap();
        manager.set_friction_coefficient(id, 0.9).unwrap();
        manager.set_restitution_coefficient(id, 0.2).unwrap();
        manager.set_linear_damping(id, 0.05).unwrap();
        manager.set_angular_damping(id, 0.07).unwrap();
        manager.set_margin(id, 0.02).unwrap();
        manager.set_scale(id, 2.0).unwrap();

        assert_eq!(manager.mass(id).unwrap(), 4.0);
        assert_eq!(manager.com(id).unwrap(), Vector3::new(0.0, 0.1, 0.0));
        assert_eq!(manager.friction_coefficient(id).unwrap(), 0.9);
        assert_eq!(manager.restitution_coefficient(id).unwrap(), 0.2);
        assert_eq!(manager.linear_damping(id).unwrap(), 0.05);
        assert_eq!(manager.angular_damping(id).unwrap(), 0.07);
        assert_eq!(manager.margin(id).unwrap(), 0.02);
        assert_eq!(manager.scale(id).unwrap(), 2.0);

        assert!(matches!(manager.set_scale(id, 0.0), Err(PhysicsError::InvalidConfig(_))));
        assert!(matches!(manager.set_mass(id, -1.0), Err(PhysicsError::InvalidConfig(_))));
    }

    #[test]
    fn test_mass_policy_fills_missing_mass() {
        let (mut manager, _root) = manager([0.0, 0.0, 0.0]);
        let id = manager
            .add_object_from_template(&cube_template(None), MotionType::Dynamic)
            .unwrap();
        assert_relative_eq!(manager.mass(id).unwrap(), 0.036, epsilon = 1.0e-6);
    }

    #[test]
    fn test_remove_detaches_scene_node() {
        let (mut manager, root) = manager([0.0, 0.0, 0.0]);
        let id = manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Dynamic).unwrap();
        assert_eq!(root.borrow().children().len(), 1);

        manager.remove_object(id).unwrap();
        assert!(root.borrow().children().is_empty());
        assert!(manager.object(id).is_none());
        assert!(matches!(manager.remove_object(id), Err(PhysicsError::UnknownObjectId(_))));
    }

    #[test]
    fn test_shutdown() {
        let (mut manager, root) = manager([0.0, -9.8, 0.0]);
        manager
            .add_scene(&AssetInfo::default(), &PhysicsSceneAttributes::default(), &ground())
            .unwrap();
        manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Dynamic).unwrap();

        manager.shutdown();
        assert_eq!(manager.state(), ManagerState::Destroyed);
        assert!(root.borrow().children().is_empty());
        assert_eq!(manager.bodies().count(), 0);
        assert!(matches!(
            manager.step_physics(0.01),
            Err(PhysicsError::UninitializedSimulation)
        ));
        assert!(matches!(
            manager.init_physics(&root, &PhysicsManagerAttributes::default()),
            Err(PhysicsError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_scene_attributes() {
        let (mut manager, _root) = manager([0.0, -9.8, 0.0]);
        assert!(matches!(manager.scene_friction_coefficient(), Err(PhysicsError::NoScene)));

        let attrs = PhysicsSceneAttributes {
            gravity: Some([0.0, 0.0, -9.8]),
            ..Default::default()
        };
        manager.add_scene(&AssetInfo::default(), &attrs, &ground()).unwrap();

        assert_eq!(manager.gravity().unwrap(), Vector3::new(0.0, 0.0, -9.8));
        assert_eq!(manager.scene_friction_coefficient().unwrap(), 0.4);
        assert_eq!(manager.scene_restitution_coefficient().unwrap(), 0.1);
        manager.set_scene_friction_coefficient(0.8).unwrap();
        manager.set_scene_restitution_coefficient(0.3).unwrap();
        assert_eq!(manager.scene_friction_coefficient().unwrap(), 0.8);
        assert_eq!(manager.scene_restitution_coefficient().unwrap(), 0.3);
    }

    #[test]
    fn test_world_time_follows_fixed_steps() {
        let (mut manager, _root) = manager([0.0, 0.0, 0.0]);
        manager.set_timestep(0.01).unwrap();
        let plan = manager.step_physics(0.035).unwrap();
        assert_eq!(plan.steps, 3);
        assert_relative_eq!(manager.world_time(), 0.03, epsilon = 1.0e-9);
        assert!(matches!(manager.set_timestep(0.0), Err(PhysicsError::InvalidConfig(_))));
    }

    #[test]
    fn test_passive_simulator() {
        let mut library = ObjectLibrary::new();
        library.register(CUBE, cube_template(Some(1.0)));
        let root = SceneNode::new_root("root");
        let mut manager = PhysicsManager::new(library);
        manager
            .init_physics(&root, &PhysicsManagerAttributes::default())
            .unwrap();

        let id = manager.add_object(ObjectKey::ConfigFile(CUBE), MotionType::Dynamic).unwrap();
        manager.set_translation(id, Vector3::new(0.0, 3.0, 0.0)).unwrap();
        manager.apply_force(id, Vector3::new(0.0, 100.0, 0.0), Vector3::zeros()).unwrap();
        manager.step_physics(0.1).unwrap();

        assert_eq!(manager.translation(id).unwrap(), Vector3::new(0.0, 3.0, 0.0));
        assert_eq!(manager.next_frame().unwrap(), ActivityReport { active: 0, total: 1 });
    }

    #[test]
    fn test_profiling_counts_step_calls() {
        let root = SceneNode::new_root("root");
        let mut manager = PhysicsManager::new(ObjectLibrary::new());
        let attrs = PhysicsManagerAttributes {
            profile: true,
            ..rapier_attributes([0.0, -9.8, 0.0])
        };
        manager.init_physics(&root, &attrs).unwrap();

        for _ in 0..5 {
            manager.step_physics(1.0 / 60.0).unwrap();
        }
        assert_eq!(manager.profiler().total_frames(), 5);

        manager.next_frame().unwrap();
        manager.step_physics_realtime().unwrap();
        assert_eq!(manager.profiler().total_frames(), 6);
    }
}
