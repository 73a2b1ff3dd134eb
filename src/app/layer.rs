//! Layers bind a user to a space and own the widgets drawn for them.

use scene_graph::Node;
use tracing::debug;

use super::widget::widgets_of;
use super::{Space, User, Widget};
use crate::core::{names, ItemId};
use crate::scene::{FrameRef, World};
use crate::util::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    id: ItemId,
    pub space: Space,
    pub user: User,
}

impl Layer {
    pub fn create(world: &mut World, parent: Option<ItemId>, name: &str, space: &Space, user: &User) -> Result<Self> {
        let id = world.model.create(parent, names::LAYER, name)?;
        debug!(layer = name, "layer created");
        Ok(Self {
            id,
            space: space.clone(),
            user: *user,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name<'a>(&self, world: &'a World) -> Result<&'a str> {
        world.model.name(self.id)
    }

    /// Add a top-level widget posed in `frame`.
    pub fn add_widget(
        &self,
        world: &mut World,
        name: &str,
        entity_type: &str,
        frame: FrameRef,
        node: Node,
    ) -> Result<Widget> {
        Widget::create(world, self.id, name, entity_type, frame, node)
    }

    pub fn widgets(&self, world: &World) -> Result<Vec<Widget>> {
        widgets_of(world, self.id)
    }

    /// Update the space, then the user's presence, then the widgets.
    pub fn update(&self, world: &mut World, delta_time: f64) -> Result<()> {
        self.space.update(world, delta_time)?;
        self.user.update(world, delta_time)?;
        for widget in self.widgets(world)? {
            widget.update(world, delta_time)?;
        }
        world.model.update(self.id, delta_time, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SandboxSettings;
    use scene_graph::PerspectiveCamera;

    #[test]
    fn test_layer_updates_space_user_and_widgets() {
        let settings = SandboxSettings::default();
        let mut world = World::new();
        let space = Space::create(&mut world, None, "Earth", None, &[], &settings).unwrap();
        let user = User::create(&mut world, None, "bob", &space, PerspectiveCamera::default()).unwrap();
        let layer = Layer::create(&mut world, None, "main", &space, &user).unwrap();
        let marker = layer
            .add_widget(&mut world, "marker", names::ENTITY, space.frame.into(), Node::group("marker"))
            .unwrap();
        let geo = marker.entity.geo_pose(&world).unwrap();
        geo.position.set(&mut world.model, 90.0, 0.0, 0.0).unwrap();

        layer.update(&mut world, 0.016).unwrap();
        for id in [space.id(), user.id(), marker.id(), layer.id()] {
            assert!(world.model.is_updated(id));
        }
        let node = world.scene.get(marker.entity.node()).unwrap();
        assert!(node.position.z > 6.0e6);
        assert_eq!(layer.widgets(&world).unwrap(), vec![marker]);
    }
}
