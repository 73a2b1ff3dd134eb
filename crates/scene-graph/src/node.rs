//! Scene graph nodes.

use glam::{DMat4, DQuat, DVec3, EulerRot};
use std::fmt;

use crate::{Geometry, Material, PerspectiveCamera};

/// Stable handle to a node inside a [`crate::SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Raw index of this id.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node draws (if anything).
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Pure transform node.
    Group,
    /// Triangle mesh.
    Mesh { geometry: Geometry, material: Material },
    /// Polyline set; the geometry is expected to be [`Geometry::Lines`].
    Lines { geometry: Geometry, material: Material },
    /// Perspective camera.
    Camera(PerspectiveCamera),
}

/// A transform node with an optional drawable payload.
#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub position: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
    pub visible: bool,
    pub kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    fn with_kind(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
            visible: true,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create an empty group node.
    pub fn group(name: &str) -> Self {
        Self::with_kind(name, NodeKind::Group)
    }

    /// Create a mesh node.
    pub fn mesh(name: &str, geometry: Geometry, material: Material) -> Self {
        Self::with_kind(name, NodeKind::Mesh { geometry, material })
    }

    /// Create a polyline node.
    pub fn lines(name: &str, geometry: Geometry, material: Material) -> Self {
        Self::with_kind(name, NodeKind::Lines { geometry, material })
    }

    /// Create a camera node.
    pub fn camera(name: &str, camera: PerspectiveCamera) -> Self {
        Self::with_kind(name, NodeKind::Camera(camera))
    }

    /// Parent node, `None` for roots.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Set rotation from Euler angles (radians) applied in the given order.
    pub fn set_rotation_euler(&mut self, order: EulerRot, a: f64, b: f64, c: f64) {
        self.rotation = DQuat::from_euler(order, a, b, c);
    }

    /// Rotate around the local X axis.
    #[inline]
    pub fn rotate_x(&mut self, angle: f64) {
        self.rotation *= DQuat::from_rotation_x(angle);
    }

    /// Rotate around the local Y axis.
    #[inline]
    pub fn rotate_y(&mut self, angle: f64) {
        self.rotation *= DQuat::from_rotation_y(angle);
    }

    /// Rotate around the local Z axis.
    #[inline]
    pub fn rotate_z(&mut self, angle: f64) {
        self.rotation *= DQuat::from_rotation_z(angle);
    }

    /// Local transform matrix (scale, then rotation, then translation).
    pub fn local_matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Camera payload, if this node is a camera.
    pub fn as_camera(&self) -> Option<&PerspectiveCamera> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Mutable camera payload, if this node is a camera.
    pub fn as_camera_mut(&mut self) -> Option<&mut PerspectiveCamera> {
        match &mut self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Material of a drawable node.
    pub fn material_mut(&mut self) -> Option<&mut Material> {
        match &mut self.kind {
            NodeKind::Mesh { material, .. } | NodeKind::Lines { material, .. } => Some(material),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_local_rotations_compose_in_order() {
        let mut node = Node::group("n");
        node.rotate_z(FRAC_PI_2);
        node.rotate_x(FRAC_PI_2);
        // Local X rotation applied after Z: +Y maps to +Z, then Z rotation maps +Z to +Z.
        let v = node.rotation * DVec3::Y;
        assert!(v.abs_diff_eq(DVec3::Z, 1e-12), "{v:?}");
    }

    #[test]
    fn test_local_matrix_translation() {
        let mut node = Node::group("n");
        node.position = DVec3::new(1.0, 2.0, 3.0);
        let p = node.local_matrix().transform_point3(DVec3::ZERO);
        assert_eq!(p, DVec3::new(1.0, 2.0, 3.0));
    }
}
