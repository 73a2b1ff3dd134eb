//! Spaces: a planet frame and the entities that draw it.

use scene_graph::Node;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SandboxSettings;
use crate::core::{names, ItemId};
use crate::geo::{EuclideanFrame, GeoFrame};
use crate::scene::{AtmosphereEntity, AxesEntity, BackgroundEntity, FrameRef, GraticuleEntity, TerrainEntity, World};
use crate::util::Result;
use crate::Error;

/// Entities a space can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceEntity {
    Terrain,
    Atmosphere,
    Background,
    Graticule,
    Axes,
}

impl SpaceEntity {
    pub const ALL: [SpaceEntity; 5] = [
        Self::Terrain,
        Self::Atmosphere,
        Self::Background,
        Self::Graticule,
        Self::Axes,
    ];

    /// Entities switched on in `settings`.
    pub fn enabled(settings: &SandboxSettings) -> Vec<SpaceEntity> {
        Self::ALL
            .into_iter()
            .filter(|e| match e {
                Self::Terrain => settings.show_terrain,
                Self::Atmosphere => settings.show_atmosphere,
                Self::Background => settings.show_background,
                Self::Graticule => settings.show_graticule,
                Self::Axes => settings.show_axes,
            })
            .collect()
    }
}

/// A named world: a geo frame, a local frame and its entities.
///
/// The space item owns a group node; every entity node of the space hangs below it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Space {
    id: ItemId,
    pub frame: GeoFrame,
    pub local: EuclideanFrame,
    pub terrain: Option<TerrainEntity>,
    pub atmosphere: Option<AtmosphereEntity>,
    pub background: Option<BackgroundEntity>,
    pub graticule: Option<GraticuleEntity>,
    pub axes: Option<AxesEntity>,
}

impl Space {
    /// Create a space under `parent` drawing `entities` on `frame`.
    ///
    /// Without a frame the space gets its own WGS84 ellipsoid.
    pub fn create(
        world: &mut World,
        parent: Option<ItemId>,
        name: &str,
        frame: Option<GeoFrame>,
        entities: &[SpaceEntity],
        settings: &SandboxSettings,
    ) -> Result<Self> {
        let id = world.model.create(parent, names::SPACE, name)?;
        let node = world.scene.add(None, Node::group(name))?;
        world.bind(id, node);

        let frame = match frame {
            Some(frame) => frame,
            None => GeoFrame::create_default(&mut world.model, Some(id))?,
        };
        let local = EuclideanFrame::create(&mut world.model, Some(id), "local", 1.0)?;
        let at: FrameRef = local.into();
        let texture = |path: &Option<std::path::PathBuf>| path.as_ref().map(|p| p.to_string_lossy().into_owned());

        let mut space = Self {
            id,
            frame,
            local,
            terrain: None,
            atmosphere: None,
            background: None,
            graticule: None,
            axes: None,
        };
        for entity in entities {
            match entity {
                SpaceEntity::Terrain if space.terrain.is_none() => {
                    let t = texture(&settings.terrain_texture);
                    space.terrain = Some(TerrainEntity::create(world, Some(id), "terrain", frame, at, t.as_deref())?);
                }
                SpaceEntity::Atmosphere if space.atmosphere.is_none() => {
                    let t = texture(&settings.atmosphere_texture);
                    space.atmosphere =
                        Some(AtmosphereEntity::create(world, Some(id), "atmosphere", frame, at, t.as_deref())?);
                }
                SpaceEntity::Background if space.background.is_none() => {
                    let t = texture(&settings.background_texture);
                    let background = BackgroundEntity::create(world, Some(id), "background", frame, at, t.as_deref())?;
                    background.color.set(&mut world.model, settings.background_color)?;
                    space.background = Some(background);
                }
                SpaceEntity::Graticule if space.graticule.is_none() => {
                    space.graticule = Some(GraticuleEntity::create(
                        world,
                        Some(id),
                        "graticule",
                        frame,
                        at,
                        settings.graticule_step,
                    )?);
                }
                SpaceEntity::Axes if space.axes.is_none() => {
                    space.axes = Some(AxesEntity::create(world, Some(id), "axes", at, settings.axes_length)?);
                }
                _ => {}
            }
        }
        debug!(space = name, ?entities, "space created");
        Ok(space)
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name<'a>(&self, world: &'a World) -> Result<&'a str> {
        world.model.name(self.id)
    }

    /// Group node holding the space's entity nodes.
    pub fn node(&self, world: &World) -> Result<scene_graph::NodeId> {
        world
            .node_of(self.id)
            .ok_or_else(|| Error::other(format!("space {} has no scene node", world.model.path(self.id))))
    }

    /// Update every entity of the space, then the rest of its items.
    pub fn update(&self, world: &mut World, delta_time: f64) -> Result<()> {
        if let Some(terrain) = &self.terrain {
            terrain.update(world, delta_time)?;
        }
        if let Some(atmosphere) = &self.atmosphere {
            atmosphere.update(world, delta_time)?;
        }
        if let Some(background) = &self.background {
            background.update(world, delta_time)?;
        }
        if let Some(graticule) = &self.graticule {
            graticule.update(world, delta_time)?;
        }
        if let Some(axes) = &self.axes {
            axes.update(world, delta_time)?;
        }
        world.model.update(self.id, delta_time, false)
    }

    pub fn set_visible(&self, world: &mut World, visible: bool) -> Result<()> {
        let node = self.node(world)?;
        if let Some(node) = world.scene.get_mut(node) {
            node.visible = visible;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_follows_settings_toggles() {
        let settings = SandboxSettings {
            show_atmosphere: false,
            show_axes: true,
            ..SandboxSettings::default()
        };
        let entities = SpaceEntity::enabled(&settings);
        assert_eq!(
            entities,
            vec![SpaceEntity::Terrain, SpaceEntity::Background, SpaceEntity::Graticule, SpaceEntity::Axes]
        );

        let mut world = World::new();
        let space = Space::create(&mut world, None, "Earth", None, &entities, &settings).unwrap();
        assert!(space.terrain.is_some());
        assert!(space.atmosphere.is_none());
        assert!(space.axes.is_some());
        assert_eq!(space.frame.radii(&world.model).unwrap().0, crate::geo::WGS84_EQUATORIAL_RADIUS);

        space.update(&mut world, 0.0).unwrap();
        let root = space.node(&world).unwrap();
        let terrain = world.scene.get(space.terrain.unwrap().entity.node()).unwrap();
        assert_eq!(terrain.parent(), Some(root));
        assert!(world.model.is_updated(space.id()));
    }

    #[test]
    fn test_entity_names_parse_lowercase() {
        let parsed: Vec<SpaceEntity> = serde_json::from_str(r#"["terrain", "graticule"]"#).unwrap();
        assert_eq!(parsed, vec![SpaceEntity::Terrain, SpaceEntity::Graticule]);
        assert!(serde_json::from_str::<SpaceEntity>(r#""ocean""#).is_err());
    }
}
