//! Reference frames.

use crate::core::{names, ItemId, Model};
use crate::util::{axis_vector, DVec3, Result};
use crate::values::{Distance, Number, Text};
use crate::Error;

/// WGS84 equatorial radius in meters.
pub const WGS84_EQUATORIAL_RADIUS: f64 = 6_378_137.0;
/// WGS84 polar radius in meters.
pub const WGS84_POLAR_RADIUS: f64 = 6_356_752.314245;

/// Common frame properties: handedness and vertical axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Frame {
    id: ItemId,
    pub handedness: Text,
    pub vertical_axis: Text,
}

impl Frame {
    /// Create a plain frame (right-handed, Y up).
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str) -> Result<Self> {
        Self::create_typed(model, parent, names::FRAME, name, &["x", "y", "z"])
    }

    /// Create a frame item of `type_name` whose vertical axis is one of `axes`.
    pub(crate) fn create_typed(
        model: &mut Model,
        parent: Option<ItemId>,
        type_name: &str,
        name: &str,
        axes: &[&str],
    ) -> Result<Self> {
        let id = model.create(parent, type_name, name)?;
        Ok(Self {
            id,
            handedness: Text::create_choice(model, Some(id), "handedness", "right", &["right", "left"])?,
            vertical_axis: Text::create_choice(model, Some(id), "vertical_axis", "y", axes)?,
        })
    }

    pub fn from_item(model: &Model, id: ItemId) -> Result<Self> {
        model.require_type(id, names::FRAME)?;
        Ok(Self {
            id,
            handedness: Text::from_item(model, child(model, id, "handedness")?)?,
            vertical_axis: Text::from_item(model, child(model, id, "vertical_axis")?)?,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn is_right_handed(&self, model: &Model) -> Result<bool> {
        Ok(self.handedness.get(model)? == "right")
    }

    /// Unit vector of the vertical axis.
    pub fn vertical(&self, model: &Model) -> Result<DVec3> {
        let axis = self.vertical_axis.get(model)?;
        axis_vector(&axis).ok_or_else(|| Error::invalid("vertical_axis", format!("unknown axis '{axis}'")))
    }
}

/// Geodetic frame over a reference ellipsoid. The polar axis is always Y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeoFrame {
    pub frame: Frame,
    pub equatorial_radius: Distance,
    pub polar_radius: Distance,
}

impl GeoFrame {
    /// Create a frame for an ellipsoid with the given radii in meters.
    pub fn create(
        model: &mut Model,
        parent: Option<ItemId>,
        name: &str,
        equatorial_radius: f64,
        polar_radius: f64,
    ) -> Result<Self> {
        let frame = Frame::create_typed(model, parent, names::GEO_FRAME, name, &["y"])?;
        let id = frame.id();
        Ok(Self {
            frame,
            equatorial_radius: Distance::create(model, Some(id), "equatorial_radius", equatorial_radius)?,
            polar_radius: Distance::create(model, Some(id), "polar_radius", polar_radius)?,
        })
    }

    /// WGS84 ellipsoid.
    pub fn create_default(model: &mut Model, parent: Option<ItemId>) -> Result<Self> {
        Self::create(model, parent, "WGS84", WGS84_EQUATORIAL_RADIUS, WGS84_POLAR_RADIUS)
    }

    pub fn from_item(model: &Model, id: ItemId) -> Result<Self> {
        model.require_type(id, names::GEO_FRAME)?;
        Ok(Self {
            frame: Frame::from_item(model, id)?,
            equatorial_radius: Distance::from_item(model, child(model, id, "equatorial_radius")?)?,
            polar_radius: Distance::from_item(model, child(model, id, "polar_radius")?)?,
        })
    }

    pub fn id(&self) -> ItemId {
        self.frame.id()
    }

    /// Equatorial and polar radius in meters.
    pub fn radii(&self, model: &Model) -> Result<(f64, f64)> {
        Ok((self.equatorial_radius.meters(model)?, self.polar_radius.meters(model)?))
    }
}

/// Cartesian frame with a uniform scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EuclideanFrame {
    pub frame: Frame,
    pub scale: Number,
}

impl EuclideanFrame {
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, scale: f64) -> Result<Self> {
        let frame = Frame::create_typed(model, parent, names::EUCLIDEAN_FRAME, name, &["x", "y", "z"])?;
        let id = frame.id();
        Ok(Self {
            frame,
            scale: Number::create(model, Some(id), "scale", scale)?,
        })
    }

    pub fn from_item(model: &Model, id: ItemId) -> Result<Self> {
        model.require_type(id, names::EUCLIDEAN_FRAME)?;
        Ok(Self {
            frame: Frame::from_item(model, id)?,
            scale: Number::from_item(model, child(model, id, "scale")?)?,
        })
    }

    pub fn id(&self) -> ItemId {
        self.frame.id()
    }
}

pub(crate) fn child(model: &Model, id: ItemId, name: &str) -> Result<ItemId> {
    model
        .child_by_name(id, name)
        .ok_or_else(|| Error::serialization(model.path(id), format!("missing child '{name}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geo_frame() {
        let mut model = Model::new();
        let frame = GeoFrame::create_default(&mut model, None).unwrap();
        assert_eq!(model.name(frame.id()).unwrap(), "WGS84");
        assert_eq!(frame.radii(&model).unwrap(), (WGS84_EQUATORIAL_RADIUS, WGS84_POLAR_RADIUS));
        assert!(model.is(frame.id(), names::FRAME));
        assert!(frame.frame.is_right_handed(&model).unwrap());
        assert_eq!(frame.frame.vertical(&model).unwrap(), DVec3::Y);

        let again = GeoFrame::from_item(&model, frame.id()).unwrap();
        assert_eq!(again, frame);
        assert!(EuclideanFrame::from_item(&model, frame.id()).is_err());
    }

    #[test]
    fn test_geo_frame_is_y_polar() {
        let mut model = Model::new();
        let frame = GeoFrame::create_default(&mut model, None).unwrap();
        let err = frame.frame.vertical_axis.set(&mut model, "z").unwrap_err();
        assert!(matches!(err, Error::NotAValidValue { .. }));
        assert_eq!(frame.frame.vertical(&model).unwrap(), DVec3::Y);
    }

    #[test]
    fn test_frame_axis_choices() {
        let mut model = Model::new();
        let frame = EuclideanFrame::create(&mut model, None, "local", 2.0).unwrap();
        frame.frame.vertical_axis.set(&mut model, "z").unwrap();
        assert_eq!(frame.frame.vertical(&model).unwrap(), DVec3::Z);
        assert!(frame.frame.vertical_axis.set(&mut model, "w").is_err());
        assert!(frame.frame.handedness.set(&mut model, "up").is_err());
    }
}
