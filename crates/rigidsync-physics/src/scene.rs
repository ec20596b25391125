//! Minimal hierarchical scene node.
//!
//! The renderer owns the scene graph; the physics manager only creates one
//! child per body under the root it was given and keeps a weak reference to
//! it, writing the simulated transform back every frame.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use nalgebra::{Isometry3, Matrix4};

/// Shared handle to a scene node.
pub type SceneNodeRef = Rc<RefCell<SceneNode>>;

/// A node with a rigid transform relative to its parent.
#[derive(Debug)]
pub struct SceneNode {
    name: String,
    transformation: Isometry3<f32>,
    parent: Weak<RefCell<SceneNode>>,
    children: Vec<SceneNodeRef>,
}

impl SceneNode {
    fn new(name: String, parent: Weak<RefCell<SceneNode>>) -> Self {
        Self {
            name,
            transformation: Isometry3::identity(),
            parent,
            children: Vec::new(),
        }
    }

    /// Create a detached root node.
    pub fn new_root(name: impl Into<String>) -> SceneNodeRef {
        Rc::new(RefCell::new(Self::new(name.into(), Weak::new())))
    }

    /// Create a child of `parent` with an identity transform.
    pub fn create_child(parent: &SceneNodeRef, name: impl Into<String>) -> SceneNodeRef {
        let child = Rc::new(RefCell::new(Self::new(name.into(), Rc::downgrade(parent))));
        parent.borrow_mut().children.push(Rc::clone(&child));
        child
    }

    /// Remove `node` from its parent's children. The node itself stays
    /// alive as long as someone else holds it.
    pub fn detach(node: &SceneNodeRef) {
        let parent = node.borrow().parent.upgrade();
        if let Some(parent) = parent {
            parent
                .borrow_mut()
                .children
                .retain(|child| !Rc::ptr_eq(child, node));
        }
        node.borrow_mut().parent = Weak::new();
    }

    /// Node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transform relative to the parent.
    pub fn transformation(&self) -> Isometry3<f32> {
        self.transformation
    }

    /// Transform relative to the parent as a 4x4 matrix.
    pub fn transformation_matrix(&self) -> Matrix4<f32> {
        self.transformation.to_homogeneous()
    }

    /// Replace the transform relative to the parent.
    pub fn set_transformation(&mut self, transformation: Isometry3<f32>) {
        self.transformation = transformation;
    }

    /// Transform relative to the root of the hierarchy.
    pub fn absolute_transformation(&self) -> Isometry3<f32> {
        match self.parent.upgrade() {
            Some(parent) => parent.borrow().absolute_transformation() * self.transformation,
            None => self.transformation,
        }
    }

    /// Parent node, if still attached.
    pub fn parent(&self) -> Option<SceneNodeRef> {
        self.parent.upgrade()
    }

    /// Direct children.
    pub fn children(&self) -> &[SceneNodeRef] {
        &self.children
    }
}
