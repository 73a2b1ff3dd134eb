//! Positions and the geodetic-to-Cartesian conversion.
//!
//! A position item caches its derived Cartesian state in its payload. The state is
//! recomputed by [`Model::update`] and read back through [`position_state`].

use smallvec::{smallvec, SmallVec};
use std::f64::consts::FRAC_PI_2;

use super::frame::{child, EuclideanFrame, GeoFrame};
use crate::core::{names, ItemId, Model, Payload};
use crate::util::{DQuat, DVec3, EulerRot, Result};
use crate::values::{Angle, Distance, Vector};
use crate::Error;

/// Latitude step for the tangent estimate, in radians.
const TANGENT_EPSILON: f64 = 1e-6;

/// Derived Cartesian state of a position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionState {
    /// Position relative to the frame origin.
    pub relative: DVec3,
    /// Unit surface normal (up direction).
    pub vertical: DVec3,
    /// Unit northward tangent, perpendicular to `vertical`.
    pub tangent: DVec3,
    /// Euler angles (radians, order YXZ) turning local +Z onto `vertical`.
    pub additional_rotation: DVec3,
}

impl Default for PositionState {
    fn default() -> Self {
        Self {
            relative: DVec3::ZERO,
            vertical: DVec3::Y,
            tangent: DVec3::NEG_Z,
            additional_rotation: DVec3::ZERO,
        }
    }
}

impl PositionState {
    /// Additional rotation as a quaternion.
    pub fn additional_quat(&self) -> DQuat {
        additional_quat(self.additional_rotation)
    }
}

/// Quaternion for additional-rotation Euler angles (order YXZ).
pub fn additional_quat(angles: DVec3) -> DQuat {
    DQuat::from_euler(EulerRot::YXZ, angles.y, angles.x, angles.z)
}

#[derive(Debug)]
enum PositionSource {
    Geo {
        longitude: Angle,
        latitude: Angle,
        altitude: Distance,
    },
    Euclidean {
        values: Vector,
    },
}

/// Payload of position items.
#[derive(Debug)]
pub struct PositionData {
    source: Option<PositionSource>,
    frame: ItemId,
    state: PositionState,
}

impl PositionData {
    fn new(frame: ItemId) -> Self {
        Self {
            source: None,
            frame,
            state: PositionState::default(),
        }
    }

    pub(crate) fn dependencies(&self) -> SmallVec<[ItemId; 2]> {
        smallvec![self.frame]
    }

    pub(crate) fn refresh(&mut self, model: &Model) -> Result<()> {
        self.state = match &self.source {
            Some(PositionSource::Geo { longitude, latitude, altitude }) => {
                let (equatorial, polar) = GeoFrame::from_item(model, self.frame)?.radii(model)?;
                geodetic_to_cartesian(
                    longitude.radians(model)?,
                    latitude.radians(model)?,
                    altitude.meters(model)?,
                    equatorial,
                    polar,
                )
            }
            Some(PositionSource::Euclidean { values }) => {
                let frame = EuclideanFrame::from_item(model, self.frame)?;
                let vertical = frame.frame.vertical(model)?;
                PositionState {
                    relative: values.get(model)? * frame.scale.get(model)?,
                    vertical,
                    tangent: vertical.any_orthonormal_vector(),
                    additional_rotation: DVec3::ZERO,
                }
            }
            None => PositionState::default(),
        };
        Ok(())
    }
}

/// Convert geodetic coordinates (radians, meters) on an ellipsoid into Cartesian.
///
/// Y is the polar axis; longitude 0 lies on +X and longitude +90° on +Z. The radius
/// ratio `polar / equatorial` scales the polar component, and the vertical is the
/// ellipsoid normal.
pub fn geodetic_to_cartesian(
    longitude: f64,
    latitude: f64,
    altitude: f64,
    equatorial_radius: f64,
    polar_radius: f64,
) -> PositionState {
    let flattening = if equatorial_radius > 0.0 {
        polar_radius / equatorial_radius
    } else {
        1.0
    };
    let surface = |lat: f64| {
        DVec3::new(
            longitude.cos() * lat.cos() * equatorial_radius,
            lat.sin() * equatorial_radius * flattening,
            longitude.sin() * lat.cos() * equatorial_radius,
        )
    };

    let geo = DVec3::new(
        longitude.cos() * latitude.cos(),
        latitude.sin(),
        longitude.sin() * latitude.cos(),
    );
    let vertical = if flattening > 0.0 {
        DVec3::new(geo.x, geo.y / flattening, geo.z).normalize()
    } else {
        DVec3::Y * latitude.signum()
    };
    let relative = surface(latitude) + vertical * altitude;

    // Northward tangent from a central difference along the meridian. Offsetting the
    // radius by one meter instead gives the same direction once normalized.
    let delta = surface(latitude + TANGENT_EPSILON) - surface(latitude - TANGENT_EPSILON);
    let length = delta.length();
    let meridian = DVec3::new(longitude.cos(), 0.0, longitude.sin());
    let (tangent, dx) = if length > 0.0 {
        (delta / length, -delta.dot(meridian) / length)
    } else {
        (DVec3::Y, latitude.sin())
    };
    let additional_rotation = DVec3::new(-FRAC_PI_2 + dx.clamp(-1.0, 1.0).acos(), FRAC_PI_2 - longitude, 0.0);

    PositionState {
        relative,
        vertical,
        tangent,
        additional_rotation,
    }
}

/// Cached state of any position item (valid after its last update).
pub fn position_state(model: &Model, id: ItemId) -> Result<PositionState> {
    match model.payload(id)? {
        Payload::Position(p) => Ok(p.state),
        _ => Err(Error::TypeMismatch {
            expected: names::POSITION.to_string(),
            actual: model.type_name(id)?.to_string(),
        }),
    }
}

fn create_position(model: &mut Model, parent: Option<ItemId>, type_name: &str, name: &str, frame: ItemId) -> Result<ItemId> {
    let id = model.create_with(parent, type_name, name, Payload::Position(PositionData::new(frame)))?;
    model.link(frame, id)?;
    Ok(id)
}

fn set_source(model: &mut Model, id: ItemId, source: PositionSource) -> Result<()> {
    if let Payload::Position(p) = model.payload_mut(id)? {
        p.source = Some(source);
    }
    model.invalidate(id)
}

fn frame_of(model: &Model, id: ItemId) -> Result<ItemId> {
    match model.payload(id)? {
        Payload::Position(p) => Ok(p.frame),
        _ => Err(Error::TypeMismatch {
            expected: names::POSITION.to_string(),
            actual: model.type_name(id)?.to_string(),
        }),
    }
}

/// Longitude/latitude in degrees and altitude in meters over a [`GeoFrame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeoPosition {
    id: ItemId,
    pub longitude: Angle,
    pub latitude: Angle,
    pub altitude: Distance,
}

impl GeoPosition {
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, frame: &GeoFrame) -> Result<Self> {
        let id = create_position(model, parent, names::GEO_POSITION, name, frame.id())?;
        let position = Self {
            id,
            longitude: Angle::create(model, Some(id), "longitude", 0.0)?,
            latitude: Angle::create(model, Some(id), "latitude", 0.0)?,
            altitude: Distance::create_signed(model, Some(id), "altitude", 0.0)?,
        };
        set_source(model, id, position.source())?;
        Ok(position)
    }

    pub fn from_item(model: &Model, id: ItemId) -> Result<Self> {
        model.require_type(id, names::GEO_POSITION)?;
        Ok(Self {
            id,
            longitude: Angle::from_item(model, child(model, id, "longitude")?)?,
            latitude: Angle::from_item(model, child(model, id, "latitude")?)?,
            altitude: Distance::from_item(model, child(model, id, "altitude")?)?,
        })
    }

    fn source(&self) -> PositionSource {
        PositionSource::Geo {
            longitude: self.longitude,
            latitude: self.latitude,
            altitude: self.altitude,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn frame(&self, model: &Model) -> Result<GeoFrame> {
        GeoFrame::from_item(model, frame_of(model, self.id)?)
    }

    /// Set longitude and latitude in degrees, altitude in meters.
    pub fn set(&self, model: &mut Model, longitude: f64, latitude: f64, altitude: f64) -> Result<()> {
        self.longitude.set_in(model, longitude, "degrees")?;
        self.latitude.set_in(model, latitude, "degrees")?;
        self.altitude.set_in(model, altitude, "meters")
    }

    pub fn state(&self, model: &Model) -> Result<PositionState> {
        position_state(model, self.id)
    }
}

/// Cartesian coordinates in a [`EuclideanFrame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EuclideanPosition {
    id: ItemId,
    pub values: Vector,
}

impl EuclideanPosition {
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, frame: &EuclideanFrame) -> Result<Self> {
        let id = create_position(model, parent, names::EUCLIDEAN_POSITION, name, frame.id())?;
        let position = Self {
            id,
            values: Vector::create(model, Some(id), "values", DVec3::ZERO)?,
        };
        set_source(model, id, PositionSource::Euclidean { values: position.values })?;
        Ok(position)
    }

    pub fn from_item(model: &Model, id: ItemId) -> Result<Self> {
        model.require_type(id, names::EUCLIDEAN_POSITION)?;
        Ok(Self {
            id,
            values: Vector::from_item(model, child(model, id, "values")?)?,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn set(&self, model: &mut Model, value: DVec3) -> Result<()> {
        self.values.set(model, value)
    }

    pub fn state(&self, model: &Model) -> Result<PositionState> {
        position_state(model, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{approx_eq, EPSILON};

    #[test]
    fn test_sphere_origin() {
        let r = 1000.0;
        let state = geodetic_to_cartesian(0.0, 0.0, 0.0, r, r);
        assert!(state.relative.abs_diff_eq(DVec3::new(r, 0.0, 0.0), 1e-9));
        assert!(approx_eq(state.vertical.length(), 1.0, EPSILON));
    }

    #[test]
    fn test_tangent_points_north() {
        let r = 1000.0;
        let state = geodetic_to_cartesian(0.0, 0.0, 0.0, r, r);
        assert!(state.tangent.abs_diff_eq(DVec3::Y, 1e-9));

        for (lon, lat) in [(90.0, 45.0), (-30.0, -20.0), (150.0, 70.0)] {
            let state = geodetic_to_cartesian(f64::to_radians(lon), f64::to_radians(lat), 0.0, r, r);
            assert!(approx_eq(state.tangent.length(), 1.0, 1e-9));
            assert!(state.tangent.dot(state.vertical).abs() < 1e-9, "lon {lon} lat {lat}");
            assert!(state.tangent.y > 0.0);
        }
        let state = geodetic_to_cartesian(f64::to_radians(90.0), f64::to_radians(45.0), 0.0, r, r);
        let half = std::f64::consts::FRAC_1_SQRT_2;
        assert!(state.tangent.abs_diff_eq(DVec3::new(0.0, half, -half), 1e-9));
    }

    #[test]
    fn test_additional_rotation_aligns_z_with_vertical() {
        for (lon, lat) in [(0.0, 0.0), (30.0, 45.0), (-120.0, -60.0), (170.0, 10.0)] {
            let state = geodetic_to_cartesian(
                f64::to_radians(lon),
                f64::to_radians(lat),
                0.0,
                6_378_137.0,
                6_356_752.314245,
            );
            let z = state.additional_quat() * DVec3::Z;
            assert!(z.abs_diff_eq(state.vertical, 1e-6), "lon {lon} lat {lat}: {z} vs {}", state.vertical);
        }
    }

    #[test]
    fn test_geo_position_updates_from_frame() {
        let mut model = Model::new();
        let frame = GeoFrame::create(&mut model, None, "sphere", 100.0, 100.0).unwrap();
        let position = GeoPosition::create(&mut model, None, "p", &frame).unwrap();
        position.set(&mut model, 90.0, 0.0, 10.0).unwrap();
        model.update(position.id(), 0.0, false).unwrap();
        let state = position.state(&model).unwrap();
        assert!(state.relative.abs_diff_eq(DVec3::new(0.0, 0.0, 110.0), 1e-9));

        // Changing the frame invalidates the position through the link.
        frame.equatorial_radius.set(&mut model, 200.0).unwrap();
        assert!(!model.is_updated(position.id()));
        model.update(position.id(), 0.0, false).unwrap();
        assert!(approx_eq(position.state(&model).unwrap().relative.z, 210.0, 1e-9));
    }

    #[test]
    fn test_euclidean_position_scaled() {
        let mut model = Model::new();
        let frame = EuclideanFrame::create(&mut model, None, "local", 2.0).unwrap();
        let position = EuclideanPosition::create(&mut model, None, "p", &frame).unwrap();
        position.set(&mut model, DVec3::new(1.0, 2.0, 3.0)).unwrap();
        model.update(position.id(), 0.0, false).unwrap();
        let state = position.state(&model).unwrap();
        assert_eq!(state.relative, DVec3::new(2.0, 4.0, 6.0));
        assert_eq!(state.vertical, DVec3::Y);
        assert_eq!(EuclideanPosition::from_item(&model, position.id()).unwrap(), position);
    }
}
