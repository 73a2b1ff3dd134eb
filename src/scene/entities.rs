//! Concrete entities: planet, sky, grid lines, arrows and the camera.
//!
//! Each wraps an [`Entity`] plus the value items that shape its node. When
//! [`Entity::update`] reports a change, the node's geometry and material are rebuilt
//! from those values.

use scene_graph::{Geometry, Material, Node, NodeId, NodeKind, PerspectiveCamera, SceneError, Side};
use tracing::debug;

use super::{Entity, FrameRef, World};
use crate::core::{names, ItemId};
use crate::geo::{geodetic_to_cartesian, GeoFrame, YawPitchRollOrientation};
use crate::util::{DVec3, Result};
use crate::values::{Angle, Color, Distance, Number};

/// Replace the geometry and color of a mesh or lines node.
fn set_drawable(world: &mut World, node: NodeId, geometry: Geometry, color: [f32; 4]) -> Result<()> {
    let node_ref = world.scene.get_mut(node).ok_or(SceneError::NodeNotFound(node))?;
    match &mut node_ref.kind {
        NodeKind::Mesh { geometry: g, material } | NodeKind::Lines { geometry: g, material } => {
            *g = geometry;
            material.color = color;
            material.transparent = color[3] < 1.0;
        }
        NodeKind::Group | NodeKind::Camera(_) => {}
    }
    Ok(())
}

fn material(texture: Option<&str>, side: Side) -> Material {
    let material = Material::default().with_side(side);
    match texture {
        Some(t) => material.with_texture(t),
        None => material,
    }
}

/// Shape a sphere node into the frame's ellipsoid grown by `offset` meters.
fn ellipsoid(world: &mut World, node: NodeId, frame: &GeoFrame, offset: f64, color: [f32; 4]) -> Result<()> {
    let (equatorial, polar) = frame.radii(&world.model)?;
    let radius = equatorial + offset;
    set_drawable(world, node, Geometry::sphere(radius, 128, 64), color)?;
    let node_ref = world.scene.get_mut(node).ok_or(SceneError::NodeNotFound(node))?;
    node_ref.scale = if radius > 0.0 {
        DVec3::new(1.0, (polar + offset) / radius, 1.0)
    } else {
        DVec3::ONE
    };
    Ok(())
}

/// Planet surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainEntity {
    pub entity: Entity,
    pub frame: GeoFrame,
    pub color: Color,
}

impl TerrainEntity {
    pub fn create(
        world: &mut World,
        parent: Option<ItemId>,
        name: &str,
        geo: GeoFrame,
        frame: FrameRef,
        texture: Option<&str>,
    ) -> Result<Self> {
        let node = Node::mesh(name, Geometry::sphere(1.0, 128, 64), material(texture, Side::Front));
        let entity = Entity::create(world, parent, names::TERRAIN_ENTITY, name, frame, node)?;
        let color = Color::create(&mut world.model, Some(entity.id()), "color", [1.0, 1.0, 1.0, 1.0])?;
        world.model.link(geo.id(), entity.id())?;
        Ok(Self { entity, frame: geo, color })
    }

    pub fn update(&self, world: &mut World, delta_time: f64) -> Result<()> {
        world.model.update(self.frame.id(), delta_time, false)?;
        if self.entity.update(world, delta_time)? {
            let color = self.color.get_f32(&world.model)?;
            ellipsoid(world, self.entity.node(), &self.frame, 0.0, color)?;
        }
        Ok(())
    }
}

/// Translucent shell around the planet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtmosphereEntity {
    pub entity: Entity,
    pub frame: GeoFrame,
    pub thickness: Distance,
    pub color: Color,
}

impl AtmosphereEntity {
    pub fn create(
        world: &mut World,
        parent: Option<ItemId>,
        name: &str,
        geo: GeoFrame,
        frame: FrameRef,
        texture: Option<&str>,
    ) -> Result<Self> {
        let node = Node::mesh(name, Geometry::sphere(1.0, 128, 64), material(texture, Side::Back));
        let entity = Entity::create(world, parent, names::ATMOSPHERE_ENTITY, name, frame, node)?;
        let model = &mut world.model;
        let thickness = Distance::create(model, Some(entity.id()), "thickness", 60_000.0)?;
        let color = Color::create(model, Some(entity.id()), "color", [0.55, 0.75, 1.0, 0.25])?;
        model.link(geo.id(), entity.id())?;
        Ok(Self {
            entity,
            frame: geo,
            thickness,
            color,
        })
    }

    pub fn update(&self, world: &mut World, delta_time: f64) -> Result<()> {
        world.model.update(self.frame.id(), delta_time, false)?;
        if self.entity.update(world, delta_time)? {
            let thickness = self.thickness.meters(&world.model)?;
            let color = self.color.get_f32(&world.model)?;
            ellipsoid(world, self.entity.node(), &self.frame, thickness, color)?;
        }
        Ok(())
    }
}

/// Sky sphere seen from the inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackgroundEntity {
    pub entity: Entity,
    pub frame: GeoFrame,
    /// Radius in equatorial radii.
    pub scale: Number,
    pub color: Color,
}

impl BackgroundEntity {
    pub fn create(
        world: &mut World,
        parent: Option<ItemId>,
        name: &str,
        geo: GeoFrame,
        frame: FrameRef,
        texture: Option<&str>,
    ) -> Result<Self> {
        let node = Node::mesh(name, Geometry::sphere(1.0, 64, 32), material(texture, Side::Back));
        let entity = Entity::create(world, parent, names::BACKGROUND_ENTITY, name, frame, node)?;
        let model = &mut world.model;
        let scale = Number::create_ranged(model, Some(entity.id()), "scale", 50.0, 1.0, 1.0e6)?;
        let color = Color::create(model, Some(entity.id()), "color", [0.02, 0.02, 0.05, 1.0])?;
        model.link(geo.id(), entity.id())?;
        Ok(Self {
            entity,
            frame: geo,
            scale,
            color,
        })
    }

    pub fn update(&self, world: &mut World, delta_time: f64) -> Result<()> {
        world.model.update(self.frame.id(), delta_time, false)?;
        if self.entity.update(world, delta_time)? {
            let model = &world.model;
            let radius = self.frame.equatorial_radius.meters(model)? * self.scale.get(model)?;
            let color = self.color.get_f32(model)?;
            set_drawable(world, self.entity.node(), Geometry::sphere(radius, 64, 32), color)?;
        }
        Ok(())
    }
}

/// Meridian and parallel polylines every `step_degrees` on the ellipsoid.
///
/// Meridians start at -180°, parallels skip the poles.
pub fn graticule_lines(equatorial_radius: f64, polar_radius: f64, step_degrees: f64, altitude: f64) -> Vec<Vec<DVec3>> {
    const SAMPLE_DEGREES: f64 = 2.0;
    let step = step_degrees.clamp(1.0, 90.0);
    let point = |lon: f64, lat: f64| {
        geodetic_to_cartesian(lon.to_radians(), lat.to_radians(), altitude, equatorial_radius, polar_radius).relative
    };

    let mut lines = Vec::new();
    let meridians = (360.0 / step).round() as usize;
    let meridian_samples = (180.0 / SAMPLE_DEGREES) as usize;
    for i in 0..meridians {
        let lon = -180.0 + i as f64 * step;
        lines.push(
            (0..=meridian_samples)
                .map(|j| point(lon, -90.0 + j as f64 * SAMPLE_DEGREES))
                .collect(),
        );
    }

    let parallel_samples = (360.0 / SAMPLE_DEGREES) as usize;
    let mut lat = -90.0 + step;
    while lat < 90.0 - 1e-9 {
        lines.push(
            (0..=parallel_samples)
                .map(|j| point(-180.0 + j as f64 * SAMPLE_DEGREES, lat))
                .collect(),
        );
        lat += step;
    }
    lines
}

/// Latitude/longitude grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraticuleEntity {
    pub entity: Entity,
    pub frame: GeoFrame,
    pub step: Angle,
    pub altitude: Distance,
    pub color: Color,
}

impl GraticuleEntity {
    pub fn create(
        world: &mut World,
        parent: Option<ItemId>,
        name: &str,
        geo: GeoFrame,
        frame: FrameRef,
        step_degrees: f64,
    ) -> Result<Self> {
        let node = Node::lines(name, Geometry::Lines { polylines: Vec::new() }, Material::default());
        let entity = Entity::create(world, parent, names::GRATICULE_ENTITY, name, frame, node)?;
        let model = &mut world.model;
        let step = Angle::create_ranged(model, Some(entity.id()), "step", step_degrees, 1.0, 90.0)?;
        let altitude = Distance::create(model, Some(entity.id()), "altitude", 0.0)?;
        let color = Color::create(model, Some(entity.id()), "color", [1.0, 1.0, 1.0, 0.35])?;
        model.link(geo.id(), entity.id())?;
        Ok(Self {
            entity,
            frame: geo,
            step,
            altitude,
            color,
        })
    }

    pub fn update(&self, world: &mut World, delta_time: f64) -> Result<()> {
        world.model.update(self.frame.id(), delta_time, false)?;
        if self.entity.update(world, delta_time)? {
            let model = &world.model;
            let (equatorial, polar) = self.frame.radii(model)?;
            let polylines = graticule_lines(
                equatorial,
                polar,
                self.step.degrees(model)?,
                self.altitude.meters(model)?,
            );
            debug!(lines = polylines.len(), "graticule rebuilt");
            let color = self.color.get_f32(model)?;
            set_drawable(world, self.entity.node(), Geometry::Lines { polylines }, color)?;
        }
        Ok(())
    }
}

/// Arrow along local +Y: a cylinder shaft topped by a cone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrowEntity {
    pub entity: Entity,
    pub length: Distance,
    pub radius: Distance,
    pub color: Color,
    shaft: NodeId,
    head: NodeId,
}

impl ArrowEntity {
    pub fn create(
        world: &mut World,
        parent: Option<ItemId>,
        name: &str,
        frame: FrameRef,
        length: f64,
        color: [f64; 4],
    ) -> Result<Self> {
        let entity = Entity::create(world, parent, names::ARROW_ENTITY, name, frame, Node::group(name))?;
        let model = &mut world.model;
        let length = Distance::create(model, Some(entity.id()), "length", length)?;
        let radius = Distance::create(model, Some(entity.id()), "radius", length.meters(model)? * 0.02)?;
        let color = Color::create(model, Some(entity.id()), "color", color)?;

        let shaft = world.scene.add(
            Some(entity.node()),
            Node::mesh("shaft", Geometry::cylinder(1.0, 1.0, 1.0, 16), Material::default()),
        )?;
        let head = world.scene.add(
            Some(entity.node()),
            Node::mesh("head", Geometry::cone(1.0, 1.0, 16), Material::default()),
        )?;
        Ok(Self {
            entity,
            length,
            radius,
            color,
            shaft,
            head,
        })
    }

    pub fn update(&self, world: &mut World, delta_time: f64) -> Result<()> {
        if self.entity.update(world, delta_time)? {
            let model = &world.model;
            let length = self.length.meters(model)?;
            let radius = self.radius.meters(model)?;
            let color = self.color.get_f32(model)?;

            set_drawable(world, self.shaft, Geometry::cylinder(radius, radius, length * 0.8, 16), color)?;
            set_drawable(world, self.head, Geometry::cone(radius * 2.5, length * 0.2, 16), color)?;
            for (node, y) in [(self.shaft, length * 0.4), (self.head, length * 0.8)] {
                let node_ref = world.scene.get_mut(node).ok_or(SceneError::NodeNotFound(node))?;
                node_ref.position = DVec3::new(0.0, y, 0.0);
            }
        }
        Ok(())
    }
}

/// Red, green and blue arrows along X, Y and Z.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxesEntity {
    pub entity: Entity,
    pub arrows: [ArrowEntity; 3],
}

impl AxesEntity {
    pub fn create(world: &mut World, parent: Option<ItemId>, name: &str, frame: FrameRef, length: f64) -> Result<Self> {
        let entity = Entity::create(world, parent, names::AXES_ENTITY, name, frame, Node::group(name))?;
        // (name, color, yaw, roll) turning the +Y arrow onto each axis.
        let axes = [
            ("x", [1.0, 0.2, 0.2, 1.0], -90.0, 0.0),
            ("y", [0.2, 1.0, 0.2, 1.0], 0.0, 0.0),
            ("z", [0.2, 0.4, 1.0, 1.0], 0.0, 90.0),
        ];
        let mut arrows = Vec::with_capacity(3);
        for (axis, color, yaw, roll) in axes {
            let arrow = ArrowEntity::create(world, Some(entity.id()), axis, frame, length, color)?;
            let orientation = YawPitchRollOrientation::from_item(&world.model, arrow.entity.pose().orientation())?;
            orientation.set(&mut world.model, yaw, 0.0, roll)?;
            arrows.push(arrow);
        }
        let arrows: [ArrowEntity; 3] = arrows
            .try_into()
            .map_err(|_| crate::Error::other("axes need three arrows"))?;
        Ok(Self { entity, arrows })
    }

    pub fn update(&self, world: &mut World, delta_time: f64) -> Result<()> {
        self.entity.update(world, delta_time)?;
        for arrow in &self.arrows {
            arrow.update(world, delta_time)?;
        }
        Ok(())
    }
}

/// Perspective camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CameraEntity {
    pub entity: Entity,
    /// Vertical field of view in degrees.
    pub fov: Number,
    pub near: Distance,
    pub far: Distance,
}

impl CameraEntity {
    pub fn create(
        world: &mut World,
        parent: Option<ItemId>,
        name: &str,
        frame: FrameRef,
        camera: PerspectiveCamera,
    ) -> Result<Self> {
        let (fov, near, far) = (camera.fov, camera.near, camera.far);
        let entity = Entity::create(world, parent, names::CAMERA_ENTITY, name, frame, Node::camera(name, camera))?;
        let model = &mut world.model;
        Ok(Self {
            fov: Number::create_ranged(model, Some(entity.id()), "fov", fov, 1.0, 179.0)?,
            near: Distance::create(model, Some(entity.id()), "near", near)?,
            far: Distance::create(model, Some(entity.id()), "far", far)?,
            entity,
        })
    }

    pub fn update(&self, world: &mut World, delta_time: f64) -> Result<()> {
        if self.entity.update(world, delta_time)? {
            let model = &world.model;
            let (fov, near, far) = (self.fov.get(model)?, self.near.meters(model)?, self.far.meters(model)?);
            let node = self.entity.node();
            let camera = world
                .scene
                .get_mut(node)
                .and_then(Node::as_camera_mut)
                .ok_or(SceneError::NotACamera(node))?;
            camera.fov = fov;
            camera.near = near;
            camera.far = far.max(near);
            camera.update_projection_matrix();
        }
        Ok(())
    }

    /// Width over height of the viewport.
    pub fn set_aspect(&self, world: &mut World, aspect: f64) -> Result<()> {
        let node = self.entity.node();
        let camera = world
            .scene
            .get_mut(node)
            .and_then(Node::as_camera_mut)
            .ok_or(SceneError::NotACamera(node))?;
        camera.aspect = aspect;
        camera.update_projection_matrix();
        Ok(())
    }

    pub fn camera<'a>(&self, world: &'a World) -> Option<&'a PerspectiveCamera> {
        world.scene.get(self.entity.node()).and_then(Node::as_camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::EuclideanFrame;
    use scene_graph::{HeadlessRenderer, Renderer};

    fn setup() -> (World, GeoFrame, FrameRef) {
        let mut world = World::new();
        let geo = GeoFrame::create(&mut world.model, None, "planet", 100.0, 90.0).unwrap();
        let local = EuclideanFrame::create(&mut world.model, None, "local", 1.0).unwrap();
        (world, geo, local.into())
    }

    #[test]
    fn test_terrain_follows_frame() {
        let (mut world, geo, local) = setup();
        let terrain = TerrainEntity::create(&mut world, None, "terrain", geo, local, Some("earth.jpg")).unwrap();
        terrain.update(&mut world, 0.0).unwrap();
        let node = world.scene.get(terrain.entity.node()).unwrap();
        assert_eq!(node.scale, DVec3::new(1.0, 0.9, 1.0));
        match &node.kind {
            NodeKind::Mesh { geometry, material } => {
                assert_eq!(geometry.bounding_radius(), 100.0);
                assert_eq!(material.texture.as_deref(), Some("earth.jpg"));
            }
            other => panic!("unexpected node kind {other:?}"),
        }

        geo.equatorial_radius.set(&mut world.model, 200.0).unwrap();
        terrain.update(&mut world, 0.0).unwrap();
        let node = world.scene.get(terrain.entity.node()).unwrap();
        assert!(matches!(&node.kind, NodeKind::Mesh { geometry, .. } if geometry.bounding_radius() == 200.0));
    }

    #[test]
    fn test_graticule_line_counts() {
        let lines = graticule_lines(1.0, 1.0, 30.0, 0.0);
        // 12 meridians and 5 parallels (-60..60).
        assert_eq!(lines.len(), 17);
        assert!(lines[0][0].abs_diff_eq(DVec3::NEG_Y, 1e-12));
        assert!(lines.iter().flatten().all(|p| (p.length() - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_axes_render() {
        let (mut world, _geo, local) = setup();
        let axes = AxesEntity::create(&mut world, None, "axes", local, 2.0).unwrap();
        let camera = CameraEntity::create(&mut world, None, "camera", local, PerspectiveCamera::default()).unwrap();
        axes.update(&mut world, 0.0).unwrap();
        camera.update(&mut world, 0.0).unwrap();

        let x = world.scene.get(axes.arrows[0].entity.node()).unwrap();
        assert!((x.rotation * DVec3::Y).abs_diff_eq(DVec3::X, 1e-12));
        let z = world.scene.get(axes.arrows[2].entity.node()).unwrap();
        assert!((z.rotation * DVec3::Y).abs_diff_eq(DVec3::Z, 1e-12));

        let mut renderer = HeadlessRenderer::new();
        let stats = renderer.render(&world.scene, camera.entity.node()).unwrap();
        assert_eq!(stats.meshes, 6);

        camera.fov.set(&mut world.model, 60.0).unwrap();
        camera.set_aspect(&mut world, 2.0).unwrap();
        camera.update(&mut world, 0.0).unwrap();
        let cam = camera.camera(&world).unwrap();
        assert_eq!((cam.fov, cam.aspect), (60.0, 2.0));
    }
}
