//! Interface to the asset layer that supplies collision geometry.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::PhysicsObjectAttributes;
use crate::mesh::CollisionMesh;

/// Kind of mesh a scene asset was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssetKind {
    /// Semantic instance mesh (`.ply`).
    InstanceMesh,
    /// FRL instance mesh.
    FrlInstanceMesh,
    /// Any other mesh (glTF / GLB).
    #[default]
    Generic,
}

/// Description of a loaded scene asset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Path the asset was loaded from.
    pub filepath: String,
    /// Mesh kind.
    pub kind: AssetKind,
}

/// Everything needed to instantiate one object.
#[derive(Debug, Clone)]
pub struct ObjectTemplate {
    /// Default physical properties.
    pub attributes: PhysicsObjectAttributes,
    /// Collision geometry; may contain several groups.
    pub mesh_group: Vec<CollisionMesh>,
}

/// How an object template is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKey<'a> {
    /// By the configuration file it was loaded from.
    ConfigFile(&'a str),
    /// By its position in the library.
    Index(usize),
}

impl fmt::Display for ObjectKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKey::ConfigFile(path) => write!(f, "{}", path),
            ObjectKey::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// Source of object templates.
pub trait AssetProvider {
    /// Resolve a template, or `None` if it was never loaded.
    fn object_template(&self, key: ObjectKey<'_>) -> Option<&ObjectTemplate>;
}

/// In-memory template library.
#[derive(Debug, Clone, Default)]
pub struct ObjectLibrary {
    templates: Vec<ObjectTemplate>,
    by_config: HashMap<String, usize>,
}

impl ObjectLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template under a configuration file name and return its
    /// index. Registering the same name again replaces the template but
    /// keeps the index.
    pub fn register(&mut self, config_file: impl Into<String>, template: ObjectTemplate) -> usize {
        let config_file = config_file.into();
        if let Some(&index) = self.by_config.get(&config_file) {
            self.templates[index] = template;
            return index;
        }
        let index = self.templates.len();
        self.templates.push(template);
        self.by_config.insert(config_file, index);
        index
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True if no template is registered.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl AssetProvider for ObjectLibrary {
    fn object_template(&self, key: ObjectKey<'_>) -> Option<&ObjectTemplate> {
        let index = match key {
            ObjectKey::ConfigFile(path) => *self.by_config.get(path)?,
            ObjectKey::Index(index) => index,
        };
        self.templates.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(mass: f32) -> ObjectTemplate {
        ObjectTemplate {
            attributes: PhysicsObjectAttributes {
                mass: Some(mass),
                ..Default::default()
            },
            mesh_group: vec![CollisionMesh::cuboid(0.5, 0.5, 0.5)],
        }
    }

    #[test]
    fn test_lookup_by_name_and_index() {
        let mut library = ObjectLibrary::new();
        assert_eq!(library.register("cube.phys.json", template(1.0)), 0);
        assert_eq!(library.register("crate.phys.json", template(5.0)), 1);

        let by_name = library
            .object_template(ObjectKey::ConfigFile("crate.phys.json"))
            .unwrap();
        assert_eq!(by_name.attributes.mass, Some(5.0));
        let by_index = library.object_template(ObjectKey::Index(0)).unwrap();
        assert_eq!(by_index.attributes.mass, Some(1.0));
        assert!(library.object_template(ObjectKey::Index(2)).is_none());
        assert!(library.object_template(ObjectKey::ConfigFile("nope")).is_none());
    }

    #[test]
    fn test_reregister_keeps_index() {
        let mut library = ObjectLibrary::new();
        library.register("cube.phys.json", template(1.0));
        assert_eq!(library.register("cube.phys.json", template(3.0)), 0);
        assert_eq!(library.len(), 1);
        assert_eq!(
            library.object_template(ObjectKey::Index(0)).unwrap().attributes.mass,
            Some(3.0)
        );
    }
}
