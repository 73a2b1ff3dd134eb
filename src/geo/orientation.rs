//! Orientations. Each kind refreshes to a rotation quaternion.

use smallvec::SmallVec;

use super::frame::child;
use super::position::position_state;
use crate::core::{names, ItemId, Model, Payload};
use crate::util::{DMat3, DMat4, DQuat, DVec3, EulerRot, Result, EPSILON};
use crate::values::{Angle, Quaternion, Vector};
use crate::Error;

#[derive(Debug)]
enum OrientationSource {
    YawPitchRoll { yaw: Angle, pitch: Angle, roll: Angle },
    Quaternion { value: Quaternion },
    AxisAngle { axis: Vector, angle: Angle },
    Matrix { rows: [Vector; 3] },
    LookAt { target: Vector, up: Vector },
}

/// Payload of orientation items.
#[derive(Debug)]
pub struct OrientationData {
    source: Option<OrientationSource>,
    /// Position the orientation looks from (set when owned by a pose).
    eye: Option<ItemId>,
    rotation: DQuat,
}

impl OrientationData {
    fn new() -> Self {
        Self {
            source: None,
            eye: None,
            rotation: DQuat::IDENTITY,
        }
    }

    pub(crate) fn dependencies(&self) -> SmallVec<[ItemId; 2]> {
        match (&self.source, self.eye) {
            (Some(OrientationSource::LookAt { .. }), Some(eye)) => SmallVec::from_slice(&[eye]),
            _ => SmallVec::new(),
        }
    }

    pub(crate) fn refresh(&mut self, model: &Model) -> Result<()> {
        self.rotation = match &self.source {
            Some(OrientationSource::YawPitchRoll { yaw, pitch, roll }) => {
                ypr_quat(yaw.radians(model)?, pitch.radians(model)?, roll.radians(model)?)
            }
            Some(OrientationSource::Quaternion { value }) => value.get(model)?,
            Some(OrientationSource::AxisAngle { axis, angle }) => {
                let axis = axis.get(model)?;
                if axis.length_squared() < EPSILON {
                    DQuat::IDENTITY
                } else {
                    DQuat::from_axis_angle(axis.normalize(), angle.radians(model)?)
                }
            }
            Some(OrientationSource::Matrix { rows }) => {
                let rows = [rows[0].get(model)?, rows[1].get(model)?, rows[2].get(model)?];
                matrix_quat(rows).ok_or_else(|| Error::invalid("matrix", "rows are degenerate"))?
            }
            Some(OrientationSource::LookAt { target, up }) => {
                let eye = match self.eye {
                    Some(eye) => position_state(model, eye)?.relative,
                    None => DVec3::ZERO,
                };
                look_at_quat(eye, target.get(model)?, up.get(model)?).unwrap_or(DQuat::IDENTITY)
            }
            None => DQuat::IDENTITY,
        };
        Ok(())
    }
}

/// Yaw about Z, then pitch about Y, then roll about X (radians).
pub fn ypr_quat(yaw: f64, pitch: f64, roll: f64) -> DQuat {
    DQuat::from_euler(EulerRot::ZYX, yaw, pitch, roll)
}

/// Orthonormalize a row-major 3×3 matrix (Gram–Schmidt on its columns) into a rotation.
pub fn matrix_quat(rows: [DVec3; 3]) -> Option<DQuat> {
    let m = DMat3::from_cols(rows[0], rows[1], rows[2]).transpose();
    let x = m.x_axis.try_normalize()?;
    let y = (m.y_axis - x * x.dot(m.y_axis)).try_normalize()?;
    let z = x.cross(y);
    Some(DQuat::from_mat3(&DMat3::from_cols(x, y, z)))
}

/// Rotation whose local -Z points from `eye` to `target` with local +Y towards `up`.
pub fn look_at_quat(eye: DVec3, target: DVec3, up: DVec3) -> Option<DQuat> {
    let direction = target - eye;
    if direction.length_squared() < EPSILON || direction.cross(up).length_squared() < EPSILON {
        return None;
    }
    let view = DMat4::look_at_rh(eye, target, up);
    Some(DQuat::from_mat4(&view).inverse())
}

/// Cached rotation of any orientation item (valid after its last update).
pub fn orientation_rotation(model: &Model, id: ItemId) -> Result<DQuat> {
    match model.payload(id)? {
        Payload::Orientation(o) => Ok(o.rotation),
        _ => Err(Error::TypeMismatch {
            expected: names::ORIENTATION.to_string(),
            actual: model.type_name(id)?.to_string(),
        }),
    }
}

/// Point an orientation at the position it is evaluated from.
pub(crate) fn set_eye(model: &mut Model, id: ItemId, eye: Option<ItemId>) -> Result<()> {
    if let Payload::Orientation(o) = model.payload_mut(id)? {
        o.eye = eye;
    }
    if let Some(eye) = eye {
        model.link(eye, id)?;
    }
    model.invalidate(id)
}

fn create_orientation(model: &mut Model, parent: Option<ItemId>, type_name: &str, name: &str) -> Result<ItemId> {
    model.create_with(parent, type_name, name, Payload::Orientation(OrientationData::new()))
}

fn set_source(model: &mut Model, id: ItemId, source: OrientationSource) -> Result<()> {
    if let Payload::Orientation(o) = model.payload_mut(id)? {
        o.source = Some(source);
    }
    model.invalidate(id)
}

/// Yaw/pitch/roll angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct YawPitchRollOrientation {
    id: ItemId,
    pub yaw: Angle,
    pub pitch: Angle,
    pub roll: Angle,
}

impl YawPitchRollOrientation {
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str) -> Result<Self> {
        let id = create_orientation(model, parent, names::YAW_PITCH_ROLL_ORIENTATION, name)?;
        let orientation = Self {
            id,
            yaw: Angle::create(model, Some(id), "yaw", 0.0)?,
            pitch: Angle::create(model, Some(id), "pitch", 0.0)?,
            roll: Angle::create(model, Some(id), "roll", 0.0)?,
        };
        orientation.attach(model)?;
        Ok(orientation)
    }

    pub fn from_item(model: &Model, id: ItemId) -> Result<Self> {
        model.require_type(id, names::YAW_PITCH_ROLL_ORIENTATION)?;
        Ok(Self {
            id,
            yaw: Angle::from_item(model, child(model, id, "yaw")?)?,
            pitch: Angle::from_item(model, child(model, id, "pitch")?)?,
            roll: Angle::from_item(model, child(model, id, "roll")?)?,
        })
    }

    fn attach(&self, model: &mut Model) -> Result<()> {
        let source = OrientationSource::YawPitchRoll {
            yaw: self.yaw,
            pitch: self.pitch,
            roll: self.roll,
        };
        set_source(model, self.id, source)
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Set yaw, pitch and roll in degrees.
    pub fn set(&self, model: &mut Model, yaw: f64, pitch: f64, roll: f64) -> Result<()> {
        self.yaw.set_in(model, yaw, "degrees")?;
        self.pitch.set_in(model, pitch, "degrees")?;
        self.roll.set_in(model, roll, "degrees")
    }

    pub fn rotation(&self, model: &Model) -> Result<DQuat> {
        orientation_rotation(model, self.id)
    }
}

/// Rotation given directly as a quaternion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuaternionOrientation {
    id: ItemId,
    pub value: Quaternion,
}

impl QuaternionOrientation {
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str) -> Result<Self> {
        let id = create_orientation(model, parent, names::QUATERNION_ORIENTATION, name)?;
        let value = Quaternion::create(model, Some(id), "value", DQuat::IDENTITY)?;
        set_source(model, id, OrientationSource::Quaternion { value })?;
        Ok(Self { id, value })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn rotation(&self, model: &Model) -> Result<DQuat> {
        orientation_rotation(model, self.id)
    }
}

/// Rotation by an angle (degrees) about an axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AxisAngleOrientation {
    id: ItemId,
    pub axis: Vector,
    pub angle: Angle,
}

impl AxisAngleOrientation {
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str) -> Result<Self> {
        let id = create_orientation(model, parent, names::AXIS_ANGLE_ORIENTATION, name)?;
        let axis = Vector::create(model, Some(id), "axis", DVec3::Y)?;
        let angle = Angle::create(model, Some(id), "angle", 0.0)?;
        set_source(model, id, OrientationSource::AxisAngle { axis, angle })?;
        Ok(Self { id, axis, angle })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn rotation(&self, model: &Model) -> Result<DQuat> {
        orientation_rotation(model, self.id)
    }
}

/// Row-major 3×3 rotation matrix; orthonormalized on refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MatrixOrientation {
    id: ItemId,
    pub rows: [Vector; 3],
}

impl MatrixOrientation {
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str) -> Result<Self> {
        let id = create_orientation(model, parent, names::MATRIX_ORIENTATION, name)?;
        let rows = [
            Vector::create(model, Some(id), "row0", DVec3::X)?,
            Vector::create(model, Some(id), "row1", DVec3::Y)?,
            Vector::create(model, Some(id), "row2", DVec3::Z)?,
        ];
        set_source(model, id, OrientationSource::Matrix { rows })?;
        Ok(Self { id, rows })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn set_rows(&self, model: &mut Model, rows: [DVec3; 3]) -> Result<()> {
        for (handle, row) in self.rows.iter().zip(rows) {
            handle.set(model, row)?;
        }
        Ok(())
    }

    pub fn rotation(&self, model: &Model) -> Result<DQuat> {
        orientation_rotation(model, self.id)
    }
}

/// Looks at a target point from the owning pose's position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LookAtOrientation {
    id: ItemId,
    pub target: Vector,
    pub up: Vector,
}

impl LookAtOrientation {
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str) -> Result<Self> {
        let id = create_orientation(model, parent, names::LOOK_AT_ORIENTATION, name)?;
        let target = Vector::create(model, Some(id), "target", DVec3::ZERO)?;
        let up = Vector::create(model, Some(id), "up", DVec3::Y)?;
        set_source(model, id, OrientationSource::LookAt { target, up })?;
        Ok(Self { id, target, up })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn rotation(&self, model: &Model) -> Result<DQuat> {
        orientation_rotation(model, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_ypr_applies_z_then_y_then_x() {
        let q = ypr_quat(FRAC_PI_2, 0.0, 0.0);
        assert!((q * DVec3::X).abs_diff_eq(DVec3::Y, 1e-12));
        let q = ypr_quat(0.0, FRAC_PI_2, 0.0);
        assert!((q * DVec3::Z).abs_diff_eq(DVec3::X, 1e-12));
        // Intrinsic: roll acts in the frame already turned by yaw.
        let q = ypr_quat(FRAC_PI_2, 0.0, FRAC_PI_2);
        assert!((q * DVec3::Y).abs_diff_eq(DVec3::Z, 1e-12));
    }

    #[test]
    fn test_matrix_orthonormalizes() {
        let q = matrix_quat([DVec3::new(2.0, 0.0, 0.0), DVec3::new(0.1, 3.0, 0.0), DVec3::Z]).unwrap();
        assert!(q.is_normalized());
        assert!(matrix_quat([DVec3::X, DVec3::X, DVec3::Z]).is_none());
    }

    #[test]
    fn test_look_at_points_minus_z() {
        let q = look_at_quat(DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0), DVec3::Y).unwrap();
        assert!((q * DVec3::NEG_Z).abs_diff_eq(DVec3::X, 1e-12));
        assert!(look_at_quat(DVec3::ZERO, DVec3::Y, DVec3::Y).is_none());
    }

    #[test]
    fn test_orientation_items_refresh() {
        let mut model = Model::new();
        let ypr = YawPitchRollOrientation::create(&mut model, None, "ypr").unwrap();
        ypr.set(&mut model, 90.0, 0.0, 0.0).unwrap();
        model.update(ypr.id(), 0.0, false).unwrap();
        assert!((ypr.rotation(&model).unwrap() * DVec3::X).abs_diff_eq(DVec3::Y, 1e-12));

        let axis = AxisAngleOrientation::create(&mut model, None, "aa").unwrap();
        axis.angle.set(&mut model, 180.0).unwrap();
        model.update(axis.id(), 0.0, false).unwrap();
        assert!((axis.rotation(&model).unwrap() * DVec3::X).abs_diff_eq(DVec3::NEG_X, 1e-12));

        let quat = QuaternionOrientation::create(&mut model, None, "q").unwrap();
        model.update(quat.id(), 0.0, false).unwrap();
        assert_eq!(quat.rotation(&model).unwrap(), DQuat::IDENTITY);
        assert!(orientation_rotation(&model, axis.angle.id()).is_err());
    }
}
