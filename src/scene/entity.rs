//! Entities: items that own a pose and a scene graph node.
//!
//! The pose drives the node. [`Entity::update`] brings the item subtree up to date and,
//! when the pose's position or orientation changed, copies the new transform onto the
//! node. Nothing flows back from the scene graph into the model.

use scene_graph::{Node, NodeId, SceneError};
use tracing::trace;

use super::world::SyncMark;
use super::World;
use crate::core::{names, ItemId};
use crate::geo::{EuclideanFrame, GeoFrame, GeoPose, Pose, YawPitchRollOrientation};
use crate::util::Result;
use crate::Error;

/// Frame an entity's pose is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRef {
    Geo(GeoFrame),
    Euclidean(EuclideanFrame),
}

impl From<GeoFrame> for FrameRef {
    fn from(frame: GeoFrame) -> Self {
        Self::Geo(frame)
    }
}

impl From<EuclideanFrame> for FrameRef {
    fn from(frame: EuclideanFrame) -> Self {
        Self::Euclidean(frame)
    }
}

/// Handle to an entity item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Entity {
    id: ItemId,
    pose: Pose,
    node: NodeId,
}

impl Entity {
    /// Create an entity item with a `pose` child and add `node` to the scene graph.
    ///
    /// The node goes under the nearest ancestor item that has a node. When an ancestor
    /// is an entity, this entity's pose becomes relative to that entity's pose.
    pub fn create(
        world: &mut World,
        parent: Option<ItemId>,
        type_name: &str,
        name: &str,
        frame: FrameRef,
        node: Node,
    ) -> Result<Self> {
        if !world.model.types().is_named(type_name, names::ENTITY) {
            return Err(Error::TypeMismatch {
                expected: names::ENTITY.to_string(),
                actual: type_name.to_string(),
            });
        }
        let parent_entity = match parent {
            Some(p) => Self::nearest(world, p)?,
            None => None,
        };

        let model = &mut world.model;
        let id = model.create(parent, type_name, name)?;
        let pose = match frame {
            FrameRef::Geo(frame) => GeoPose::create(model, Some(id), "pose", &frame)?.pose,
            FrameRef::Euclidean(frame) => Pose::create(model, Some(id), "pose", &frame)?,
        };
        if let Some(parent_entity) = parent_entity {
            pose.set_parent(model, Some(parent_entity.pose))?;
        }

        let parent_node = parent.and_then(|p| world.nearest_node(p));
        let node = world.scene.add(parent_node, node)?;
        world.bind(id, node);
        trace!(item = %id, node = %node, name, "entity created");
        Ok(Self { id, pose, node })
    }

    pub fn from_item(world: &World, id: ItemId) -> Result<Self> {
        world.model.require_type(id, names::ENTITY)?;
        let pose_id = world
            .model
            .child_by_name(id, "pose")
            .ok_or_else(|| Error::serialization(world.model.path(id), "entity without pose"))?;
        let node = world
            .node_of(id)
            .ok_or_else(|| Error::other(format!("entity {} has no scene node", world.model.path(id))))?;
        Ok(Self {
            id,
            pose: Pose::from_item(&world.model, pose_id)?,
            node,
        })
    }

    /// Closest entity at or above `id`.
    fn nearest(world: &World, id: ItemId) -> Result<Option<Self>> {
        let mut current = Some(id);
        while let Some(c) = current {
            if world.model.is(c, names::ENTITY) && world.node_of(c).is_some() {
                return Self::from_item(world, c).map(Some);
            }
            current = world.model.parent(c)?;
        }
        Ok(None)
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Geodetic view of the pose, if the entity lives in a geo frame.
    pub fn geo_pose(&self, world: &World) -> Option<GeoPose> {
        GeoPose::from_item(&world.model, self.pose.id()).ok()
    }

    /// Update the item subtree and re-sync the node transform when the pose moved.
    ///
    /// The pose counts as moved when its position or orientation was invalidated since
    /// the last sync, whoever updated it in between. Returns whether anything under the
    /// entity changed since the previous call.
    pub fn update(&self, world: &mut World, delta_time: f64) -> Result<bool> {
        world.model.update(self.id, delta_time, false)?;

        let model = &world.model;
        let mark = SyncMark {
            item: model.revision(self.id),
            pose: (model.revision(self.pose.position()), model.revision(self.pose.orientation())),
        };
        let last = world.sync_mark(self.id);
        if last.map(|l| l.pose) != Some(mark.pose) {
            self.sync(world)?;
        }
        world.set_sync_mark(self.id, mark);
        Ok(last.map(|l| l.item) != Some(mark.item))
    }

    /// Copy the pose transform onto the node.
    ///
    /// The additional rotation applies first; yaw/pitch/roll orientations then turn the
    /// node about its local Z, Y and X axes in that order.
    pub fn sync(&self, world: &mut World) -> Result<()> {
        let state = self.pose.state(&world.model)?;
        let ypr = YawPitchRollOrientation::from_item(&world.model, self.pose.orientation()).ok();
        let angles = match ypr {
            Some(o) => Some((
                o.yaw.radians(&world.model)?,
                o.pitch.radians(&world.model)?,
                o.roll.radians(&world.model)?,
            )),
            None => None,
        };

        let node = world
            .scene
            .get_mut(self.node)
            .ok_or(SceneError::NodeNotFound(self.node))?;
        node.position = state.relative_position();
        match angles {
            Some((yaw, pitch, roll)) => {
                node.rotation = state.position.additional_quat();
                node.rotate_z(yaw);
                node.rotate_y(pitch);
                node.rotate_x(roll);
            }
            None => node.rotation = state.relative_rotation,
        }
        trace!(item = %self.id, position = %node.position, "entity synced");
        Ok(())
    }

    pub fn set_visible(&self, world: &mut World, visible: bool) -> Result<()> {
        let node = world
            .scene
            .get_mut(self.node)
            .ok_or(SceneError::NodeNotFound(self.node))?;
        node.visible = visible;
        Ok(())
    }

    /// Remove the node and destroy the item subtree.
    pub fn destroy(self, world: &mut World) -> Result<()> {
        let mut pending = vec![self.id];
        while let Some(id) = pending.pop() {
            world.unbind(id);
            pending.extend(world.model.children(id)?.iter().copied());
        }
        world.scene.remove(self.node);
        world.model.destroy(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::EuclideanPosition;
    use crate::util::DVec3;

    fn local(world: &mut World) -> EuclideanFrame {
        EuclideanFrame::create(&mut world.model, None, "local", 1.0).unwrap()
    }

    #[test]
    fn test_entity_nodes_mirror_item_tree() {
        let mut world = World::new();
        let frame = local(&mut world);
        let parent = Entity::create(&mut world, None, names::ENTITY, "parent", frame.into(), Node::group("parent")).unwrap();
        let child = Entity::create(
            &mut world,
            Some(parent.id()),
            names::ARROW_ENTITY,
            "child",
            frame.into(),
            Node::group("child"),
        )
        .unwrap();

        assert_eq!(world.scene.get(child.node()).unwrap().parent(), Some(parent.node()));
        assert_eq!(child.pose().parent(&world.model).unwrap(), Some(parent.pose().id()));
        assert_eq!(Entity::from_item(&world, child.id()).unwrap(), child);
        assert!(Entity::create(&mut world, None, names::LAYER, "x", frame.into(), Node::group("x")).is_err());
    }

    #[test]
    fn test_update_syncs_node_only_when_pose_changed() {
        let mut world = World::new();
        let frame = local(&mut world);
        let entity = Entity::create(&mut world, None, names::ENTITY, "e", frame.into(), Node::group("e")).unwrap();
        let position = EuclideanPosition::from_item(&world.model, entity.pose().position()).unwrap();
        let orientation = YawPitchRollOrientation::from_item(&world.model, entity.pose().orientation()).unwrap();
        position.set(&mut world.model, DVec3::new(1.0, 2.0, 3.0)).unwrap();
        orientation.set(&mut world.model, 90.0, 0.0, 0.0).unwrap();

        assert!(entity.update(&mut world, 0.0).unwrap());
        let node = world.scene.get(entity.node()).unwrap();
        assert_eq!(node.position, DVec3::new(1.0, 2.0, 3.0));
        assert!((node.rotation * DVec3::X).abs_diff_eq(DVec3::Y, 1e-12));

        // Nodes edited behind the model's back are left alone while the pose is clean.
        world.scene.get_mut(entity.node()).unwrap().position = DVec3::ZERO;
        assert!(!entity.update(&mut world, 0.0).unwrap());
        assert_eq!(world.scene.get(entity.node()).unwrap().position, DVec3::ZERO);

        entity.destroy(&mut world).unwrap();
        assert!(world.scene.is_empty());
        assert!(!world.model.contains(entity.id()));
    }
}
