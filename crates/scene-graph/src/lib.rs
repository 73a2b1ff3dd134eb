//! # scene-graph
//!
//! The renderer surface consumed by the GeoPose sandbox: a retained scene graph of
//! transform nodes, geometries, materials and a perspective camera, plus a
//! [`Renderer`] trait. [`HeadlessRenderer`] walks the graph without touching a GPU and
//! reports what would have been drawn.
//!
//! ```
//! use scene_graph::{SceneGraph, Node, Geometry, Material, HeadlessRenderer, Renderer, PerspectiveCamera};
//!
//! let mut scene = SceneGraph::new();
//! let planet = scene.add(None, Node::mesh("planet", Geometry::sphere(1.0, 32, 16), Material::default())).unwrap();
//! let camera = scene.add(None, Node::camera("camera", PerspectiveCamera::new(45.0, 1.5, 0.1, 100.0))).unwrap();
//! scene.get_mut(camera).unwrap().position.z = 5.0;
//!
//! let mut renderer = HeadlessRenderer::new();
//! renderer.set_size(800, 600);
//! let stats = renderer.render(&scene, camera).unwrap();
//! assert_eq!(stats.meshes, 1);
//! # let _ = planet;
//! ```

mod camera;
mod geometry;
mod graph;
mod material;
mod node;
mod renderer;

pub use camera::PerspectiveCamera;
pub use geometry::Geometry;
pub use graph::SceneGraph;
pub use material::{Material, Side};
pub use node::{Node, NodeId, NodeKind};
pub use renderer::{FrameStats, HeadlessRenderer, Renderer};

use thiserror::Error;

/// Errors raised by scene graph operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Node id does not exist (never created or already removed)
    #[error("Scene node not found: {0}")]
    NodeNotFound(NodeId),

    /// Reparenting would make a node its own ancestor
    #[error("Cannot attach node {child} under {parent}: would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    /// Node used as a camera is not a camera
    #[error("Node {0} is not a camera")]
    NotACamera(NodeId),
}

/// Result type alias for scene graph operations.
pub type Result<T> = std::result::Result<T, SceneError>;
