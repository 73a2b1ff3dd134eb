//! Users and their presence in a space.

use scene_graph::{Node, PerspectiveCamera};
use tracing::debug;

use super::Space;
use crate::core::{names, ItemId};
use crate::geo::{BasicYpr, GeoPose};
use crate::scene::{CameraEntity, Entity, World};
use crate::util::Result;
use crate::Error;

/// Where a user is: a geo-posed entity carrying the user's camera.
///
/// The presence pose is geodetic in its space's frame; the camera sits at the presence
/// origin looking down local -Z, which the additional rotation turns towards the ground.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Presence {
    pub entity: Entity,
    pub pose: GeoPose,
    pub camera: CameraEntity,
    space: ItemId,
}

impl Presence {
    pub fn create(
        world: &mut World,
        parent: Option<ItemId>,
        name: &str,
        space: &Space,
        camera: PerspectiveCamera,
    ) -> Result<Self> {
        let entity = Entity::create(world, parent, names::PRESENCE_ENTITY, name, space.frame.into(), Node::group(name))?;
        world.scene.attach(Some(space.node(world)?), entity.node())?;
        let pose = entity
            .geo_pose(world)
            .ok_or_else(|| Error::other("presence pose is not geodetic"))?;
        let camera = CameraEntity::create(world, Some(entity.id()), "camera", space.local.into(), camera)?;
        Ok(Self {
            entity,
            pose,
            camera,
            space: space.id(),
        })
    }

    /// Space item this presence lives in.
    pub fn space(&self) -> ItemId {
        self.space
    }

    /// Move to `longitude`/`latitude` (degrees) and `altitude` (meters).
    pub fn set_location(&self, world: &mut World, longitude: f64, latitude: f64, altitude: f64) -> Result<()> {
        self.pose.position.set(&mut world.model, longitude, latitude, altitude)
    }

    /// Yaw, pitch and roll in degrees.
    pub fn set_orientation(&self, world: &mut World, yaw: f64, pitch: f64, roll: f64) -> Result<()> {
        self.pose.orientation.set(&mut world.model, yaw, pitch, roll)
    }

    pub fn to_basic_ypr(&self, world: &World) -> Result<BasicYpr> {
        self.pose.to_basic_ypr(&world.model)
    }

    pub fn apply_basic_ypr(&self, world: &mut World, ypr: &BasicYpr) -> Result<()> {
        self.pose.apply_basic_ypr(&mut world.model, ypr)
    }

    pub fn update(&self, world: &mut World, delta_time: f64) -> Result<()> {
        self.entity.update(world, delta_time)?;
        self.camera.update(world, delta_time)
    }
}

/// A named user with one presence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct User {
    id: ItemId,
    pub presence: Presence,
}

impl User {
    pub fn create(
        world: &mut World,
        parent: Option<ItemId>,
        name: &str,
        space: &Space,
        camera: PerspectiveCamera,
    ) -> Result<Self> {
        let id = world.model.create(parent, names::USER, name)?;
        let presence = Presence::create(world, Some(id), "presence", space, camera)?;
        debug!(user = name, space = world.model.name(space.id())?, "user created");
        Ok(Self { id, presence })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name<'a>(&self, world: &'a World) -> Result<&'a str> {
        world.model.name(self.id)
    }

    pub fn update(&self, world: &mut World, delta_time: f64) -> Result<()> {
        self.presence.update(world, delta_time)?;
        world.model.update(self.id, delta_time, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SandboxSettings;
    use crate::util::DVec3;

    #[test]
    fn test_presence_camera_looks_at_ground() {
        let settings = SandboxSettings::default();
        let mut world = World::new();
        let space = Space::create(&mut world, None, "Earth", None, &[], &settings).unwrap();
        let user = User::create(&mut world, None, "alice", &space, PerspectiveCamera::default()).unwrap();
        user.presence.set_location(&mut world, 0.0, 0.0, 1.0e6).unwrap();
        user.update(&mut world, 0.0).unwrap();

        let camera_node = user.presence.camera.entity.node();
        assert_eq!(world.scene.get(camera_node).unwrap().parent(), Some(user.presence.entity.node()));
        assert_eq!(
            world.scene.get(user.presence.entity.node()).unwrap().parent(),
            Some(space.node(&world).unwrap())
        );

        let world_matrix = world.scene.world_matrix(camera_node).unwrap();
        let eye = world_matrix.transform_point3(DVec3::ZERO);
        let forward = world_matrix.transform_vector3(DVec3::NEG_Z);
        assert!(eye.x > crate::geo::WGS84_EQUATORIAL_RADIUS);
        assert!(forward.normalize().abs_diff_eq(DVec3::NEG_X, 1e-9));
    }
}
