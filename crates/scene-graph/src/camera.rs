//! Perspective camera.

use glam::DMat4;

/// Perspective projection parameters with a cached projection matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    projection: DMat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f64, aspect: f64, near: f64, far: f64) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            projection: DMat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the projection after changing fov/aspect/near/far.
    pub fn update_projection_matrix(&mut self) {
        let aspect = if self.aspect > 0.0 { self.aspect } else { 1.0 };
        self.projection = DMat4::perspective_rh_gl(self.fov.to_radians(), aspect, self.near, self.far);
    }

    /// Last computed projection matrix.
    pub fn projection_matrix(&self) -> DMat4 {
        self.projection
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(45.0, 1.0, 0.1, 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_tracks_aspect() {
        let mut cam = PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0);
        let square = cam.projection_matrix();
        cam.aspect = 2.0;
        // Stale until explicitly updated.
        assert_eq!(cam.projection_matrix(), square);
        cam.update_projection_matrix();
        assert!((cam.projection_matrix().x_axis.x * 2.0 - square.x_axis.x).abs() < 1e-12);
    }
}
