//! Widgets: user-facing entities grouped into layers.

use scene_graph::Node;

use crate::core::{names, ItemId};
use crate::scene::{Entity, FrameRef, World};
use crate::util::Result;
use crate::Error;

/// An entity owned by a layer or by another widget.
///
/// The widget item holds its entity as the `entity` child. Nested widgets have their
/// pose and node attached to the enclosing widget's entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Widget {
    id: ItemId,
    pub entity: Entity,
}

impl Widget {
    /// Create a widget under `parent`, which must be a layer or a widget.
    pub fn create(
        world: &mut World,
        parent: ItemId,
        name: &str,
        entity_type: &str,
        frame: FrameRef,
        node: Node,
    ) -> Result<Self> {
        let enclosing = if world.model.is(parent, names::WIDGET) {
            Some(Self::from_item(world, parent)?)
        } else if world.model.is(parent, names::LAYER) {
            None
        } else {
            return Err(Error::InvalidParent {
                child: name.to_string(),
                expected: format!("{} or {}", names::LAYER, names::WIDGET),
                actual: world.model.type_name(parent)?.to_string(),
            });
        };

        let id = world.model.create(Some(parent), names::WIDGET, name)?;
        let entity = Entity::create(world, Some(id), entity_type, "entity", frame, node)?;
        if let Some(enclosing) = enclosing {
            entity.pose().set_parent(&mut world.model, Some(enclosing.entity.pose()))?;
            world.scene.attach(Some(enclosing.entity.node()), entity.node())?;
        }
        Ok(Self { id, entity })
    }

    pub fn from_item(world: &World, id: ItemId) -> Result<Self> {
        world.model.require_type(id, names::WIDGET)?;
        let entity = world
            .model
            .child_by_name(id, "entity")
            .ok_or_else(|| Error::serialization(world.model.path(id), "widget without entity"))?;
        Ok(Self {
            id,
            entity: Entity::from_item(world, entity)?,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Widgets directly below this one.
    pub fn children(&self, world: &World) -> Result<Vec<Widget>> {
        widgets_of(world, self.id)
    }

    /// Update the entity, then every child widget.
    pub fn update(&self, world: &mut World, delta_time: f64) -> Result<()> {
        self.entity.update(world, delta_time)?;
        for child in self.children(world)? {
            child.update(world, delta_time)?;
        }
        world.model.update(self.id, delta_time, false)
    }

    /// Remove the widget, its nested widgets and their nodes.
    pub fn destroy(self, world: &mut World) -> Result<()> {
        for child in self.children(world)? {
            child.destroy(world)?;
        }
        self.entity.destroy(world)?;
        world.model.destroy(self.id)
    }
}

/// Widgets that are direct children of `parent`.
pub(crate) fn widgets_of(world: &World, parent: ItemId) -> Result<Vec<Widget>> {
    world
        .model
        .children(parent)?
        .iter()
        .filter(|c| world.model.is(**c, names::WIDGET))
        .map(|c| Widget::from_item(world, *c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{EuclideanFrame, EuclideanPosition};
    use crate::util::DVec3;

    fn setup() -> (World, ItemId, EuclideanFrame) {
        let mut world = World::new();
        let layer = world.model.create(None, names::LAYER, "layer").unwrap();
        let frame = EuclideanFrame::create(&mut world.model, None, "local", 1.0).unwrap();
        (world, layer, frame)
    }

    #[test]
    fn test_widget_parent_must_be_layer_or_widget() {
        let (mut world, layer, frame) = setup();
        let other = world.model.create(None, names::ITEM, "other").unwrap();
        let err = Widget::create(&mut world, other, "w", names::ENTITY, frame.into(), Node::group("w")).unwrap_err();
        assert!(matches!(err, Error::InvalidParent { .. }));

        let outer = Widget::create(&mut world, layer, "outer", names::ENTITY, frame.into(), Node::group("outer")).unwrap();
        let inner = Widget::create(&mut world, outer.id(), "inner", names::ENTITY, frame.into(), Node::group("inner")).unwrap();
        assert_eq!(outer.children(&world).unwrap(), vec![inner]);
        assert_eq!(world.scene.get(inner.entity.node()).unwrap().parent(), Some(outer.entity.node()));
    }

    #[test]
    fn test_update_cascades_to_nested_widgets() {
        let (mut world, layer, frame) = setup();
        let outer = Widget::create(&mut world, layer, "outer", names::ENTITY, frame.into(), Node::group("outer")).unwrap();
        let inner = Widget::create(&mut world, outer.id(), "inner", names::ENTITY, frame.into(), Node::group("inner")).unwrap();
        EuclideanPosition::from_item(&world.model, inner.entity.pose().position())
            .unwrap()
            .set(&mut world.model, DVec3::new(0.0, 0.0, 2.0))
            .unwrap();

        outer.update(&mut world, 0.0).unwrap();
        assert!(world.model.is_updated(inner.id()));
        assert_eq!(world.scene.get(inner.entity.node()).unwrap().position, DVec3::new(0.0, 0.0, 2.0));

        outer.destroy(&mut world).unwrap();
        assert!(world.scene.is_empty());
        assert!(!world.model.contains(inner.id()));
    }
}
