//! Geographic data model.
//!
//! - [`Frame`], [`GeoFrame`], [`EuclideanFrame`] - reference frames
//! - [`GeoPosition`], [`EuclideanPosition`] - positions with cached Cartesian state
//! - Orientations: yaw/pitch/roll, quaternion, axis-angle, matrix, look-at
//! - [`Pose`], [`GeoPose`] - position plus orientation, optionally nested
//!
//! Derived state is recomputed by [`Model::update`](crate::core::Model::update) and read
//! back with the `state`/`rotation` accessors.

mod frame;
mod geopose;
mod orientation;
mod pose;
mod position;

pub use frame::{EuclideanFrame, Frame, GeoFrame, WGS84_EQUATORIAL_RADIUS, WGS84_POLAR_RADIUS};
pub use geopose::{BasicPosition, BasicYpr, YprAngles};
pub use orientation::{
    look_at_quat, matrix_quat, orientation_rotation, ypr_quat, AxisAngleOrientation, LookAtOrientation,
    MatrixOrientation, OrientationData, QuaternionOrientation, YawPitchRollOrientation,
};
pub use pose::{pose_state, GeoPose, Pose, PoseData, PoseState};
pub use position::{
    additional_quat, geodetic_to_cartesian, position_state, EuclideanPosition, GeoPosition, PositionData,
    PositionState,
};
