//! Math type re-exports and small numeric helpers.
//!
//! The data model works in double precision throughout: planet-scale coordinates
//! lose centimeters in `f32`.

pub use glam::{DMat3, DMat4, DQuat, DVec2, DVec3, DVec4, EulerRot};

/// Default tolerance for floating point comparisons.
pub const EPSILON: f64 = 1e-9;

/// Compare two floats with an absolute tolerance.
#[inline]
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Degrees to radians.
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

/// Radians to degrees.
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}

/// Unit vector along a named axis (`x`, `y` or `z`, case-insensitive).
pub fn axis_vector(axis: &str) -> Option<DVec3> {
    match axis.to_ascii_lowercase().as_str() {
        "x" => Some(DVec3::X),
        "y" => Some(DVec3::Y),
        "z" => Some(DVec3::Z),
        _ => None,
    }
}

/// Parse an Euler order name such as `"XYZ"` or `"yxz"`.
pub fn euler_order(name: &str) -> Option<EulerRot> {
    match name.to_ascii_uppercase().as_str() {
        "XYZ" => Some(EulerRot::XYZ),
        "XZY" => Some(EulerRot::XZY),
        "YXZ" => Some(EulerRot::YXZ),
        "YZX" => Some(EulerRot::YZX),
        "ZXY" => Some(EulerRot::ZXY),
        "ZYX" => Some(EulerRot::ZYX),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_vector() {
        assert_eq!(axis_vector("Y"), Some(DVec3::Y));
        assert_eq!(axis_vector("w"), None);
    }

    #[test]
    fn test_euler_order() {
        assert_eq!(euler_order("yxz"), Some(EulerRot::YXZ));
        assert!(euler_order("XXY").is_none());
        assert!(approx_eq(rad_to_deg(deg_to_rad(33.0)), 33.0, EPSILON));
    }
}
