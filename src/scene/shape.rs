//! Shape items and their scene graph geometry.

use scene_graph::Geometry;

use crate::core::{names, ItemId, Model};
use crate::util::Result;
use crate::values::{Distance, Number};
use crate::Error;

/// A shape item. Dimensions are in meters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Sphere {
        id: ItemId,
        radius: Distance,
        segments: Number,
    },
    Cylinder {
        id: ItemId,
        radius_top: Distance,
        radius_bottom: Distance,
        height: Distance,
        segments: Number,
    },
    Cone {
        id: ItemId,
        radius: Distance,
        height: Distance,
        segments: Number,
    },
    Cuboid {
        id: ItemId,
        width: Distance,
        height: Distance,
        depth: Distance,
    },
}

fn segments(model: &mut Model, parent: ItemId, default: f64) -> Result<Number> {
    Number::create_ranged(model, Some(parent), "segments", default, 3.0, 512.0)
}

impl Shape {
    pub fn sphere(model: &mut Model, parent: Option<ItemId>, name: &str, radius: f64) -> Result<Self> {
        let id = model.create(parent, names::SPHERE, name)?;
        Ok(Self::Sphere {
            id,
            radius: Distance::create(model, Some(id), "radius", radius)?,
            segments: segments(model, id, 64.0)?,
        })
    }

    pub fn cylinder(model: &mut Model, parent: Option<ItemId>, name: &str, radius: f64, height: f64) -> Result<Self> {
        let id = model.create(parent, names::CYLINDER, name)?;
        Ok(Self::Cylinder {
            id,
            radius_top: Distance::create(model, Some(id), "radius_top", radius)?,
            radius_bottom: Distance::create(model, Some(id), "radius_bottom", radius)?,
            height: Distance::create(model, Some(id), "height", height)?,
            segments: segments(model, id, 16.0)?,
        })
    }

    pub fn cone(model: &mut Model, parent: Option<ItemId>, name: &str, radius: f64, height: f64) -> Result<Self> {
        let id = model.create(parent, names::CONE, name)?;
        Ok(Self::Cone {
            id,
            radius: Distance::create(model, Some(id), "radius", radius)?,
            height: Distance::create(model, Some(id), "height", height)?,
            segments: segments(model, id, 16.0)?,
        })
    }

    pub fn cuboid(model: &mut Model, parent: Option<ItemId>, name: &str, size: [f64; 3]) -> Result<Self> {
        let id = model.create(parent, names::CUBOID, name)?;
        Ok(Self::Cuboid {
            id,
            width: Distance::create(model, Some(id), "width", size[0])?,
            height: Distance::create(model, Some(id), "height", size[1])?,
            depth: Distance::create(model, Some(id), "depth", size[2])?,
        })
    }

    /// Wrap an existing shape item.
    pub fn from_item(model: &Model, id: ItemId) -> Result<Self> {
        let distance = |name: &str| -> Result<Distance> {
            let child = model
                .child_by_name(id, name)
                .ok_or_else(|| Error::serialization(model.path(id), format!("missing child '{name}'")))?;
            Distance::from_item(model, child)
        };
        let number = |name: &str| -> Result<Number> {
            let child = model
                .child_by_name(id, name)
                .ok_or_else(|| Error::serialization(model.path(id), format!("missing child '{name}'")))?;
            Number::from_item(model, child)
        };

        let type_name = model.type_name(id)?;
        match type_name {
            names::SPHERE => Ok(Self::Sphere {
                id,
                radius: distance("radius")?,
                segments: number("segments")?,
            }),
            names::CYLINDER => Ok(Self::Cylinder {
                id,
                radius_top: distance("radius_top")?,
                radius_bottom: distance("radius_bottom")?,
                height: distance("height")?,
                segments: number("segments")?,
            }),
            names::CONE => Ok(Self::Cone {
                id,
                radius: distance("radius")?,
                height: distance("height")?,
                segments: number("segments")?,
            }),
            names::CUBOID => Ok(Self::Cuboid {
                id,
                width: distance("width")?,
                height: distance("height")?,
                depth: distance("depth")?,
            }),
            other => Err(Error::TypeMismatch {
                expected: names::SHAPE.to_string(),
                actual: other.to_string(),
            }),
        }
    }

    pub fn id(&self) -> ItemId {
        match self {
            Self::Sphere { id, .. } | Self::Cylinder { id, .. } | Self::Cone { id, .. } | Self::Cuboid { id, .. } => *id,
        }
    }

    /// Scene graph geometry for the current dimensions.
    pub fn geometry(&self, model: &Model) -> Result<Geometry> {
        Ok(match self {
            Self::Sphere { radius, segments, .. } => {
                let segments = segments.get(model)? as u32;
                Geometry::sphere(radius.meters(model)?, segments, segments / 2)
            }
            Self::Cylinder {
                radius_top,
                radius_bottom,
                height,
                segments,
                ..
            } => Geometry::cylinder(
                radius_top.meters(model)?,
                radius_bottom.meters(model)?,
                height.meters(model)?,
                segments.get(model)? as u32,
            ),
            Self::Cone {
                radius,
                height,
                segments,
                ..
            } => Geometry::cone(radius.meters(model)?, height.meters(model)?, segments.get(model)? as u32),
            Self::Cuboid {
                width, height, depth, ..
            } => Geometry::Cuboid {
                width: width.meters(model)?,
                height: height.meters(model)?,
                depth: depth.meters(model)?,
            },
        })
    }
}
