//! Renderer contract and a headless implementation.

use tracing::trace;

use crate::{NodeId, NodeKind, Result, SceneError, SceneGraph};

/// Statistics for one rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame counter (1 for the first frame).
    pub frame: u64,
    pub meshes: usize,
    pub lines: usize,
    pub vertices: usize,
}

/// What the data model needs from a rendering backend.
pub trait Renderer {
    /// Resize the output surface in pixels.
    fn set_size(&mut self, width: u32, height: u32);

    /// Current surface size.
    fn size(&self) -> (u32, u32);

    /// Draw the scene as seen from `camera`.
    fn render(&mut self, scene: &SceneGraph, camera: NodeId) -> Result<FrameStats>;
}

/// Renderer that only walks the scene graph.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    width: u32,
    height: u32,
    frames: u64,
    last: FrameStats,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Statistics of the last frame.
    pub fn last_stats(&self) -> FrameStats {
        self.last
    }
}

impl Renderer for HeadlessRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn render(&mut self, scene: &SceneGraph, camera: NodeId) -> Result<FrameStats> {
        let node = scene.get(camera).ok_or(SceneError::NodeNotFound(camera))?;
        if node.as_camera().is_none() {
            return Err(SceneError::NotACamera(camera));
        }

        self.frames += 1;
        let mut stats = FrameStats {
            frame: self.frames,
            ..FrameStats::default()
        };
        scene.traverse_visible(|_, node, _| match &node.kind {
            NodeKind::Mesh { geometry, .. } => {
                stats.meshes += 1;
                stats.vertices += geometry.vertex_count();
            }
            NodeKind::Lines { geometry, .. } => {
                stats.lines += 1;
                stats.vertices += geometry.vertex_count();
            }
            NodeKind::Group | NodeKind::Camera(_) => {}
        });
        trace!(frame = stats.frame, meshes = stats.meshes, lines = stats.lines, "headless frame");
        self.last = stats;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Geometry, Material, Node, PerspectiveCamera};

    #[test]
    fn test_render_counts_visible_drawables() {
        let mut scene = SceneGraph::new();
        scene.add(None, Node::mesh("m", Geometry::sphere(1.0, 4, 2), Material::default())).unwrap();
        let hidden = scene.add(None, Node::mesh("h", Geometry::sphere(1.0, 4, 2), Material::default())).unwrap();
        scene.get_mut(hidden).unwrap().visible = false;
        let cam = scene.add(None, Node::camera("cam", PerspectiveCamera::default())).unwrap();

        let mut renderer = HeadlessRenderer::new();
        let stats = renderer.render(&scene, cam).unwrap();
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.meshes, 1);
        assert_eq!(stats.vertices, 15);
    }

    #[test]
    fn test_render_requires_camera() {
        let mut scene = SceneGraph::new();
        let group = scene.add(None, Node::group("g")).unwrap();
        let mut renderer = HeadlessRenderer::new();
        assert_eq!(renderer.render(&scene, group), Err(SceneError::NotACamera(group)));
        assert_eq!(renderer.frames(), 0);
    }
}
