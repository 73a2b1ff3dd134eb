//! Scene graph container.

use glam::DMat4;
use std::collections::HashMap;

use crate::{Node, NodeId, Result, SceneError};

/// Retained scene graph: a forest of [`Node`]s addressed by [`NodeId`].
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
    next_id: u32,
}

impl SceneGraph {
    /// Create an empty scene graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root nodes in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Get a node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Check if a node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Insert a node, optionally under a parent.
    pub fn add(&mut self, parent: Option<NodeId>, mut node: Node) -> Result<NodeId> {
        if let Some(p) = parent {
            if !self.nodes.contains_key(&p) {
                return Err(SceneError::NodeNotFound(p));
            }
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;

        node.parent = parent;
        node.children.clear();
        self.nodes.insert(id, node);
        match parent {
            Some(p) => {
                if let Some(parent) = self.nodes.get_mut(&p) {
                    parent.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        tracing::trace!(node = %id, "scene node added");
        Ok(id)
    }

    /// Move `child` (and its subtree) under `parent`, or to the roots when `None`.
    pub fn attach(&mut self, parent: Option<NodeId>, child: NodeId) -> Result<()> {
        if !self.nodes.contains_key(&child) {
            return Err(SceneError::NodeNotFound(child));
        }
        if let Some(p) = parent {
            if !self.nodes.contains_key(&p) {
                return Err(SceneError::NodeNotFound(p));
            }
            if self.is_ancestor_or_self(child, p) {
                return Err(SceneError::Cycle { parent: p, child });
            }
        }

        self.detach(child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = parent;
        }
        match parent {
            Some(p) => {
                if let Some(parent) = self.nodes.get_mut(&p) {
                    parent.children.push(child);
                }
            }
            None => self.roots.push(child),
        }
        Ok(())
    }

    /// Remove a node and its whole subtree. Unknown ids are ignored.
    pub fn remove(&mut self, id: NodeId) {
        if !self.nodes.contains_key(&id) {
            return;
        }
        self.detach(id);
        self.remove_recursive(id);
    }

    fn remove_recursive(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.remove_recursive(child);
            }
        }
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        match parent {
            Some(p) => {
                if let Some(parent) = self.nodes.get_mut(&p) {
                    parent.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes.get(&id).and_then(|n| n.parent) {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    /// World transform of a node (product of local matrices from the root down).
    pub fn world_matrix(&self, id: NodeId) -> Result<DMat4> {
        let node = self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))?;
        let local = node.local_matrix();
        match node.parent {
            Some(p) => Ok(self.world_matrix(p)? * local),
            None => Ok(local),
        }
    }

    /// Depth-first walk over visible nodes, passing each node's world matrix.
    pub fn traverse_visible(&self, mut visit: impl FnMut(NodeId, &Node, &DMat4)) {
        for root in &self.roots {
            self.traverse_node(*root, &DMat4::IDENTITY, &mut visit);
        }
    }

    fn traverse_node(&self, id: NodeId, parent: &DMat4, visit: &mut impl FnMut(NodeId, &Node, &DMat4)) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.visible {
            return;
        }
        let world = *parent * node.local_matrix();
        visit(id, node, &world);
        for child in &node.children {
            self.traverse_node(*child, &world, visit);
        }
    }
}
