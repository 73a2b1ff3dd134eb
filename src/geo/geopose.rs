//! OGC GeoPose "Basic-YPR" interchange.
//!
//! ```json
//! {"position": {"lat": 47.7, "lon": -122.3, "h": 11.0},
//!  "angles": {"yaw": 5.5, "pitch": -0.5, "roll": 0.0}}
//! ```
//!
//! Angles are degrees and `h` is meters above the ellipsoid.

use serde::{Deserialize, Serialize};

use super::pose::GeoPose;
use crate::core::Model;
use crate::util::Result;

/// Geodetic position of a Basic-YPR pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicPosition {
    pub lat: f64,
    pub lon: f64,
    pub h: f64,
}

/// Tait-Bryan angles of a Basic-YPR pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct YprAngles {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// OGC GeoPose Basic-YPR.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicYpr {
    pub position: BasicPosition,
    pub angles: YprAngles,
}

impl BasicYpr {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl GeoPose {
    /// Current values in Basic-YPR form.
    pub fn to_basic_ypr(&self, model: &Model) -> Result<BasicYpr> {
        Ok(BasicYpr {
            position: BasicPosition {
                lat: self.position.latitude.degrees(model)?,
                lon: self.position.longitude.degrees(model)?,
                h: self.position.altitude.meters(model)?,
            },
            angles: YprAngles {
                yaw: self.orientation.yaw.degrees(model)?,
                pitch: self.orientation.pitch.degrees(model)?,
                roll: self.orientation.roll.degrees(model)?,
            },
        })
    }

    /// Assign position and angles from Basic-YPR.
    pub fn apply_basic_ypr(&self, model: &mut Model, ypr: &BasicYpr) -> Result<()> {
        self.position
            .set(model, ypr.position.lon, ypr.position.lat, ypr.position.h)?;
        self.orientation
            .set(model, ypr.angles.yaw, ypr.angles.pitch, ypr.angles.roll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoFrame;
    use crate::util::approx_eq;

    #[test]
    fn test_basic_ypr_exchange() {
        let mut model = Model::new();
        let frame = GeoFrame::create_default(&mut model, None).unwrap();
        let pose = GeoPose::create(&mut model, None, "pose", &frame).unwrap();

        let ypr = BasicYpr::from_json(
            r#"{"position":{"lat":47.7,"lon":-122.3,"h":11.0},"angles":{"yaw":5.5,"pitch":-0.5,"roll":0.0}}"#,
        )
        .unwrap();
        pose.apply_basic_ypr(&mut model, &ypr).unwrap();

        let back = pose.to_basic_ypr(&model).unwrap();
        assert!(approx_eq(back.position.lat, 47.7, 1e-9));
        assert!(approx_eq(back.position.lon, -122.3, 1e-9));
        assert!(approx_eq(back.angles.yaw, 5.5, 1e-9));
        assert!(approx_eq(back.angles.pitch, -0.5, 1e-9));
        assert!(!model.is_updated(pose.id()));

        assert!(BasicYpr::from_json(r#"{"position":{}}"#).is_err());
    }
}
