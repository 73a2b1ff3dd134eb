//! Geometry descriptors.
//!
//! Geometries are descriptions, not vertex buffers: a GPU backend tessellates them.
//! The vertex counts reported here follow the usual indexed grid layout so that
//! headless statistics stay meaningful.

use glam::DVec3;

/// Drawable geometry description.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// UV sphere centered at the origin.
    Sphere {
        radius: f64,
        width_segments: u32,
        height_segments: u32,
    },
    /// Cylinder along +Y, centered at the origin.
    Cylinder {
        radius_top: f64,
        radius_bottom: f64,
        height: f64,
        radial_segments: u32,
    },
    /// Cone along +Y with its base centered at the origin.
    Cone {
        radius: f64,
        height: f64,
        radial_segments: u32,
    },
    /// Axis-aligned box centered at the origin.
    Cuboid { width: f64, height: f64, depth: f64 },
    /// Set of polylines.
    Lines { polylines: Vec<Vec<DVec3>> },
}

impl Geometry {
    /// UV sphere; segment counts are clamped to the minimum that forms a closed surface.
    pub fn sphere(radius: f64, width_segments: u32, height_segments: u32) -> Self {
        Self::Sphere {
            radius,
            width_segments: width_segments.max(3),
            height_segments: height_segments.max(2),
        }
    }

    /// Cylinder.
    pub fn cylinder(radius_top: f64, radius_bottom: f64, height: f64, radial_segments: u32) -> Self {
        Self::Cylinder {
            radius_top,
            radius_bottom,
            height,
            radial_segments: radial_segments.max(3),
        }
    }

    /// Cone.
    pub fn cone(radius: f64, height: f64, radial_segments: u32) -> Self {
        Self::Cone {
            radius,
            height,
            radial_segments: radial_segments.max(3),
        }
    }

    /// Number of vertices a tessellation of this geometry produces.
    pub fn vertex_count(&self) -> usize {
        match self {
            Self::Sphere { width_segments, height_segments, .. } => {
                (*width_segments as usize + 1) * (*height_segments as usize + 1)
            }
            Self::Cylinder { radial_segments, .. } => {
                // Side grid plus two caps (center + rim each).
                let r = *radial_segments as usize;
                (r + 1) * 2 + 2 * (r + 2)
            }
            Self::Cone { radial_segments, .. } => {
                let r = *radial_segments as usize;
                (r + 1) * 2 + (r + 2)
            }
            Self::Cuboid { .. } => 24,
            Self::Lines { polylines } => polylines.iter().map(Vec::len).sum(),
        }
    }

    /// Radius of a sphere around the origin that contains the geometry.
    pub fn bounding_radius(&self) -> f64 {
        match self {
            Self::Sphere { radius, .. } => *radius,
            Self::Cylinder { radius_top, radius_bottom, height, .. } => {
                let r = radius_top.max(*radius_bottom);
                (r * r + height * height * 0.25).sqrt()
            }
            Self::Cone { radius, height, .. } => (radius * radius + height * height).sqrt(),
            Self::Cuboid { width, height, depth } => {
                0.5 * (width * width + height * height + depth * depth).sqrt()
            }
            Self::Lines { polylines } => polylines
                .iter()
                .flatten()
                .map(|p| p.length())
                .fold(0.0, f64::max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_clamps_segments() {
        let g = Geometry::sphere(1.0, 0, 0);
        assert_eq!(g, Geometry::Sphere { radius: 1.0, width_segments: 3, height_segments: 2 });
        assert_eq!(g.vertex_count(), 12);
    }

    #[test]
    fn test_lines_bounds() {
        let g = Geometry::Lines {
            polylines: vec![vec![DVec3::X, DVec3::new(0.0, 3.0, 4.0)], vec![DVec3::Z]],
        };
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.bounding_radius(), 5.0);
    }
}
