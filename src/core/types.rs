//! Nominal type registry.
//!
//! Every item carries a [`TypeId`] into a [`TypeRegistry`]. The registry records the
//! single-inheritance chain of item classes so that `is` checks ("is this a Shape?")
//! work on runtime data without downcasting.

use std::collections::HashMap;
use std::fmt;

use crate::util::{Error, Result};

/// Index of a type inside its registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Metadata for one type.
#[derive(Clone, Debug)]
pub struct Type {
    name: String,
    parent: Option<TypeId>,
    children: Vec<TypeId>,
}

impl Type {
    /// Type name (unique within its registry).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent type, `None` for roots.
    pub fn parent(&self) -> Option<TypeId> {
        self.parent
    }

    /// Direct subtypes in registration order.
    pub fn children(&self) -> &[TypeId] {
        &self.children
    }
}

/// Registry of types keyed by name.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    types: Vec<Type>,
    by_name: HashMap<String, TypeId>,
}

/// Built-in type names.
pub mod names {
    pub const ITEM: &str = "Item";

    pub const SIMPLE: &str = "Simple";
    pub const NUMBER: &str = "Number";
    pub const MEASURE: &str = "Measure";
    pub const ANGLE: &str = "Angle";
    pub const DISTANCE: &str = "Distance";
    pub const SIZE: &str = "Size";
    pub const TIME: &str = "Time";
    pub const BOOLEAN: &str = "Boolean";
    pub const STRING: &str = "String";

    pub const COMPLEX: &str = "Complex";
    pub const VECTOR: &str = "Vector";
    pub const COLOR: &str = "Color";
    pub const EULER: &str = "Euler";
    pub const QUATERNION: &str = "Quaternion";

    pub const FRAME: &str = "Frame";
    pub const GEO_FRAME: &str = "GeoFrame";
    pub const EUCLIDEAN_FRAME: &str = "EuclideanFrame";

    pub const POSITION: &str = "Position";
    pub const GEO_POSITION: &str = "GeoPosition";
    pub const EUCLIDEAN_POSITION: &str = "EuclideanPosition";

    pub const ORIENTATION: &str = "Orientation";
    pub const YAW_PITCH_ROLL_ORIENTATION: &str = "YawPitchRollOrientation";
    pub const QUATERNION_ORIENTATION: &str = "QuaternionOrientation";
    pub const AXIS_ANGLE_ORIENTATION: &str = "AxisAngleOrientation";
    pub const MATRIX_ORIENTATION: &str = "MatrixOrientation";
    pub const LOOK_AT_ORIENTATION: &str = "LookAtOrientation";

    pub const POSE: &str = "Pose";
    pub const GEO_POSE: &str = "GeoPose";

    pub const SHAPE: &str = "Shape";
    pub const SPHERE: &str = "Sphere";
    pub const CYLINDER: &str = "Cylinder";
    pub const CONE: &str = "Cone";
    pub const CUBOID: &str = "Cuboid";

    pub const ENTITY: &str = "Entity";
    pub const TERRAIN_ENTITY: &str = "TerrainEntity";
    pub const ATMOSPHERE_ENTITY: &str = "AtmosphereEntity";
    pub const BACKGROUND_ENTITY: &str = "BackgroundEntity";
    pub const GRATICULE_ENTITY: &str = "GraticuleEntity";
    pub const ARROW_ENTITY: &str = "ArrowEntity";
    pub const AXES_ENTITY: &str = "AxesEntity";
    pub const CAMERA_ENTITY: &str = "CameraEntity";
    pub const PRESENCE_ENTITY: &str = "PresenceEntity";

    pub const WIDGET: &str = "Widget";
    pub const LAYER: &str = "Layer";
    pub const SPACE: &str = "Space";
    pub const USER: &str = "User";
    pub const VIEW: &str = "View";
}

/// Built-in hierarchy as (type, parent) pairs, parents first.
pub const BUILTIN_TYPES: &[(&str, Option<&str>)] = &[
    (names::ITEM, None),
    (names::SIMPLE, Some(names::ITEM)),
    (names::NUMBER, Some(names::SIMPLE)),
    (names::MEASURE, Some(names::NUMBER)),
    (names::ANGLE, Some(names::MEASURE)),
    (names::DISTANCE, Some(names::MEASURE)),
    (names::SIZE, Some(names::MEASURE)),
    (names::TIME, Some(names::MEASURE)),
    (names::BOOLEAN, Some(names::SIMPLE)),
    (names::STRING, Some(names::SIMPLE)),
    (names::COMPLEX, Some(names::ITEM)),
    (names::VECTOR, Some(names::COMPLEX)),
    (names::COLOR, Some(names::COMPLEX)),
    (names::EULER, Some(names::COMPLEX)),
    (names::QUATERNION, Some(names::COMPLEX)),
    (names::FRAME, Some(names::ITEM)),
    (names::GEO_FRAME, Some(names::FRAME)),
    (names::EUCLIDEAN_FRAME, Some(names::FRAME)),
    (names::POSITION, Some(names::ITEM)),
    (names::GEO_POSITION, Some(names::POSITION)),
    (names::EUCLIDEAN_POSITION, Some(names::POSITION)),
    (names::ORIENTATION, Some(names::ITEM)),
    (names::YAW_PITCH_ROLL_ORIENTATION, Some(names::ORIENTATION)),
    (names::QUATERNION_ORIENTATION, Some(names::ORIENTATION)),
    (names::AXIS_ANGLE_ORIENTATION, Some(names::ORIENTATION)),
    (names::MATRIX_ORIENTATION, Some(names::ORIENTATION)),
    (names::LOOK_AT_ORIENTATION, Some(names::ORIENTATION)),
    (names::POSE, Some(names::ITEM)),
    (names::GEO_POSE, Some(names::POSE)),
    (names::SHAPE, Some(names::ITEM)),
    (names::SPHERE, Some(names::SHAPE)),
    (names::CYLINDER, Some(names::SHAPE)),
    (names::CONE, Some(names::SHAPE)),
    (names::CUBOID, Some(names::SHAPE)),
    (names::ENTITY, Some(names::ITEM)),
    (names::TERRAIN_ENTITY, Some(names::ENTITY)),
    (names::ATMOSPHERE_ENTITY, Some(names::ENTITY)),
    (names::BACKGROUND_ENTITY, Some(names::ENTITY)),
    (names::GRATICULE_ENTITY, Some(names::ENTITY)),
    (names::ARROW_ENTITY, Some(names::ENTITY)),
    (names::AXES_ENTITY, Some(names::ENTITY)),
    (names::CAMERA_ENTITY, Some(names::ENTITY)),
    (names::PRESENCE_ENTITY, Some(names::ENTITY)),
    (names::WIDGET, Some(names::ITEM)),
    (names::LAYER, Some(names::ITEM)),
    (names::SPACE, Some(names::ITEM)),
    (names::USER, Some(names::ITEM)),
    (names::VIEW, Some(names::ITEM)),
];

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in item hierarchy.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, parent) in BUILTIN_TYPES {
            // Built-in table is parent-first and duplicate-free.
            let parent = parent.and_then(|p| registry.get(p));
            let id = TypeId(registry.types.len() as u32);
            registry.insert(id, name, parent);
        }
        registry
    }

    fn insert(&mut self, id: TypeId, name: &str, parent: Option<TypeId>) {
        self.types.push(Type {
            name: name.to_string(),
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.types[p.index()].children.push(id);
        }
        self.by_name.insert(name.to_string(), id);
    }

    /// Register a new type under an optional parent.
    ///
    /// Names are unique: registering an existing name fails instead of silently keeping
    /// the first registration.
    pub fn register(&mut self, name: &str, parent: Option<&str>) -> Result<TypeId> {
        if self.by_name.contains_key(name) {
            return Err(Error::DuplicateType(name.to_string()));
        }
        let parent = match parent {
            Some(p) => Some(self.get(p).ok_or_else(|| Error::UnknownType(p.to_string()))?),
            None => None,
        };
        let id = TypeId(self.types.len() as u32);
        self.insert(id, name, parent);
        tracing::debug!(name, "type registered");
        Ok(id)
    }

    /// Look up a type by name.
    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Look up a type by name, failing for unknown names.
    pub fn require(&self, name: &str) -> Result<TypeId> {
        self.get(name).ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    /// Type metadata.
    ///
    /// # Panics
    ///
    /// Panics if `id` comes from a different registry and is out of bounds.
    pub fn info(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    /// Type name.
    pub fn name(&self, id: TypeId) -> &str {
        self.info(id).name()
    }

    /// Check whether `id` equals `ancestor` or inherits from it.
    pub fn is(&self, id: TypeId, ancestor: TypeId) -> bool {
        let mut current = Some(id);
        while let Some(t) = current {
            if t == ancestor {
                return true;
            }
            current = self.types[t.index()].parent;
        }
        false
    }

    /// Check by names; unknown names are never related.
    pub fn is_named(&self, name: &str, ancestor: &str) -> bool {
        match (self.get(name), self.get(ancestor)) {
            (Some(t), Some(a)) => self.is(t, a),
            _ => false,
        }
    }

    /// The inheritance chain from `id` up to its root, `id` first.
    pub fn ancestors(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(t) = current {
            chain.push(t);
            current = self.types[t.index()].parent;
        }
        chain
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over all types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.types.iter().enumerate().map(|(i, t)| (TypeId(i as u32), t))
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_walks_ancestors() {
        let reg = TypeRegistry::with_builtins();
        let sphere = reg.get(names::SPHERE).unwrap();
        assert!(reg.is(sphere, sphere));
        assert!(reg.is(sphere, reg.get(names::SHAPE).unwrap()));
        assert!(reg.is(sphere, reg.get(names::ITEM).unwrap()));
        assert!(!reg.is(sphere, reg.get(names::CYLINDER).unwrap()));
        assert!(!reg.is(reg.get(names::SHAPE).unwrap(), sphere));
    }

    #[test]
    fn test_children_recorded() {
        let reg = TypeRegistry::with_builtins();
        let measure = reg.info(reg.get(names::MEASURE).unwrap());
        let kids: Vec<&str> = measure.children().iter().map(|c| reg.name(*c)).collect();
        assert_eq!(kids, vec!["Angle", "Distance", "Size", "Time"]);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut reg = TypeRegistry::with_builtins();
        assert!(matches!(reg.register("Sphere", Some("Shape")), Err(Error::DuplicateType(_))));
        let torus = reg.register("Torus", Some("Shape")).unwrap();
        assert!(reg.is_named("Torus", "Item"));
        assert_eq!(reg.ancestors(torus).len(), 3);
    }

    #[test]
    fn test_unknown_parent() {
        let mut reg = TypeRegistry::new();
        assert!(matches!(reg.register("A", Some("Nope")), Err(Error::UnknownType(_))));
        assert!(reg.is_empty());
    }
}
