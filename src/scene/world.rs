//! The item model paired with the scene graph it drives.

use scene_graph::{NodeId, SceneGraph};
use std::collections::HashMap;

use crate::core::{ItemId, Model};

/// Item revisions an entity last synchronized from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SyncMark {
    pub item: u64,
    pub pose: (u64, u64),
}

/// Item model, scene graph and the item-to-node bindings between them.
#[derive(Debug, Default)]
pub struct World {
    pub model: Model,
    pub scene: SceneGraph,
    nodes: HashMap<ItemId, NodeId>,
    synced: HashMap<ItemId, SyncMark>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing model.
    pub fn with_model(model: Model) -> Self {
        Self {
            model,
            scene: SceneGraph::new(),
            nodes: HashMap::new(),
            synced: HashMap::new(),
        }
    }

    /// Record that `item` is represented by `node`.
    pub fn bind(&mut self, item: ItemId, node: NodeId) {
        self.nodes.insert(item, node);
    }

    pub fn unbind(&mut self, item: ItemId) -> Option<NodeId> {
        self.synced.remove(&item);
        self.nodes.remove(&item)
    }

    pub(crate) fn sync_mark(&self, item: ItemId) -> Option<SyncMark> {
        self.synced.get(&item).copied()
    }

    pub(crate) fn set_sync_mark(&mut self, item: ItemId, mark: SyncMark) {
        self.synced.insert(item, mark);
    }

    /// Node bound to `item`.
    pub fn node_of(&self, item: ItemId) -> Option<NodeId> {
        self.nodes.get(&item).copied()
    }

    /// Node of `item` or of its closest ancestor that has one.
    pub fn nearest_node(&self, item: ItemId) -> Option<NodeId> {
        let mut current = Some(item);
        while let Some(id) = current {
            if let Some(node) = self.node_of(id) {
                return Some(node);
            }
            current = self.model.parent(id).ok().flatten();
        }
        None
    }

    /// Number of bound items.
    pub fn bound(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::names;
    use scene_graph::Node;

    #[test]
    fn test_nearest_node_walks_up() {
        let mut world = World::new();
        let root = world.model.create(None, names::ITEM, "root").unwrap();
        let mid = world.model.create(Some(root), names::ITEM, "mid").unwrap();
        let leaf = world.model.create(Some(mid), names::ITEM, "leaf").unwrap();
        assert_eq!(world.nearest_node(leaf), None);

        let node = world.scene.add(None, Node::group("root")).unwrap();
        world.bind(root, node);
        assert_eq!(world.nearest_node(leaf), Some(node));
        assert_eq!(world.unbind(root), Some(node));
        assert_eq!(world.bound(), 0);
    }
}
