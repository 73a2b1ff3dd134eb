//! Numbers with measurement units.

use std::f64::consts::PI;

use super::{create_simple, SimpleValue, Value, ValueKind};
use crate::core::{names, ItemId, Model};
use crate::util::{Error, Result};

/// A unit a measure can be expressed in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeasurementUnit {
    /// Canonical id (`"degrees"`).
    pub id: &'static str,
    /// Accepted short names (`"deg"`, `"°"`).
    pub abbreviations: &'static [&'static str],
    /// Multiplier converting a value in this unit into the base unit.
    pub factor: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl MeasurementUnit {
    /// Check an id or abbreviation (case-insensitive).
    pub fn matches(&self, name: &str) -> bool {
        self.id.eq_ignore_ascii_case(name) || self.abbreviations.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    const fn new(id: &'static str, abbreviations: &'static [&'static str], factor: f64) -> Self {
        Self {
            id,
            abbreviations,
            factor,
            min: None,
            max: None,
        }
    }

    const fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }
}

/// Angle units; base unit radians.
pub static ANGLE_UNITS: &[MeasurementUnit] = &[
    MeasurementUnit::new("degrees", &["deg", "°"], PI / 180.0),
    MeasurementUnit::new("radians", &["rad"], 1.0),
];

/// Distance units; base unit meters. Distances are non-negative.
pub static DISTANCE_UNITS: &[MeasurementUnit] = &[
    MeasurementUnit::new("meters", &["m"], 1.0).with_min(0.0),
    MeasurementUnit::new("kilometers", &["km"], 1000.0).with_min(0.0),
    MeasurementUnit::new("centimeters", &["cm"], 0.01).with_min(0.0),
    MeasurementUnit::new("miles", &["mi"], 1609.344).with_min(0.0),
    MeasurementUnit::new("feet", &["ft"], 0.3048).with_min(0.0),
];

/// Signed distance units (altitudes, offsets); base unit meters.
pub static OFFSET_UNITS: &[MeasurementUnit] = &[
    MeasurementUnit::new("meters", &["m"], 1.0),
    MeasurementUnit::new("kilometers", &["km"], 1000.0),
    MeasurementUnit::new("feet", &["ft"], 0.3048),
];

/// Size units; base unit is a plain scale factor.
pub static SIZE_UNITS: &[MeasurementUnit] = &[
    MeasurementUnit::new("units", &["u", "x"], 1.0).with_min(0.0),
    MeasurementUnit::new("percent", &["%"], 0.01).with_min(0.0),
];

/// Time units; base unit seconds.
pub static TIME_UNITS: &[MeasurementUnit] = &[
    MeasurementUnit::new("seconds", &["s"], 1.0),
    MeasurementUnit::new("milliseconds", &["ms"], 0.001),
    MeasurementUnit::new("minutes", &["min"], 60.0),
    MeasurementUnit::new("hours", &["h"], 3600.0),
];

macro_rules! measure_handle {
    ($(#[$doc:meta])* $handle:ident, $type_name:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $handle(ItemId);

        impl $handle {
            /// Wrap an existing item, checking its type.
            pub fn from_item(model: &Model, id: ItemId) -> Result<Self> {
                model.require_type(id, $type_name)?;
                Ok(Self(id))
            }

            pub fn id(self) -> ItemId {
                self.0
            }

            /// Value in the active unit.
            pub fn get(self, model: &Model) -> Result<f64> {
                Ok(model.value(self.0)?.and_then(Value::as_f64).unwrap_or(0.0))
            }

            /// Set the value in the active unit.
            pub fn set(self, model: &mut Model, value: f64) -> Result<()> {
                model.set_value(self.0, Value::Number(value))
            }

            /// Set a value expressed in `unit`, converting into the active unit.
            pub fn set_in(self, model: &mut Model, value: f64, unit: &str) -> Result<()> {
                let state = model.simple(self.0)?;
                let from = state
                    .units()
                    .iter()
                    .find(|u| u.matches(unit))
                    .ok_or_else(|| Error::invalid(unit, "unknown unit"))?;
                let to_factor = state.unit().map_or(1.0, |u| u.factor);
                self.set(model, value * from.factor / to_factor)
            }

            /// Value in the base unit.
            pub fn base(self, model: &Model) -> Result<f64> {
                Ok(model.simple(self.0)?.base_value().unwrap_or(0.0))
            }

            /// Active unit id.
            pub fn unit(self, model: &Model) -> Result<&'static str> {
                Ok(model.simple(self.0)?.unit().map_or("", |u| u.id))
            }

            /// Switch the active unit, keeping the physical quantity.
            pub fn set_unit(self, model: &mut Model, unit: &str) -> Result<()> {
                model.modify_simple(self.0, |name, v| v.set_unit(name, unit))
            }

            fn create_in(
                model: &mut Model,
                parent: Option<ItemId>,
                name: &str,
                default: f64,
                units: &'static [MeasurementUnit],
                unit_index: usize,
            ) -> Result<Self> {
                let state = SimpleValue::new(ValueKind::Number)
                    .with_default(default)
                    .with_units(units, unit_index);
                create_simple(model, parent, $type_name, name, state).map(Self)
            }
        }
    };
}

measure_handle!(
    /// Angle; degrees by default.
    Angle,
    names::ANGLE
);
measure_handle!(
    /// Distance or altitude; meters by default.
    Distance,
    names::DISTANCE
);
measure_handle!(
    /// Dimensionless size.
    Size,
    names::SIZE
);
measure_handle!(
    /// Duration; seconds by default.
    Time,
    names::TIME
);

impl Angle {
    /// Create an angle in degrees.
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, degrees: f64) -> Result<Self> {
        Self::create_in(model, parent, name, degrees, ANGLE_UNITS, 0)
    }

    /// Create an angle restricted to a range of degrees.
    pub fn create_ranged(
        model: &mut Model,
        parent: Option<ItemId>,
        name: &str,
        degrees: f64,
        min: f64,
        max: f64,
    ) -> Result<Self> {
        let state = SimpleValue::new(ValueKind::Number)
            .with_default(degrees)
            .with_units(ANGLE_UNITS, 0)
            .with_range(Some(min), Some(max));
        create_simple(model, parent, names::ANGLE, name, state).map(Self)
    }

    /// Value in radians.
    pub fn radians(self, model: &Model) -> Result<f64> {
        self.base(model)
    }

    /// Value in degrees.
    pub fn degrees(self, model: &Model) -> Result<f64> {
        Ok(self.base(model)?.to_degrees())
    }
}

impl Distance {
    /// Create a non-negative distance in meters.
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, meters: f64) -> Result<Self> {
        Self::create_in(model, parent, name, meters, DISTANCE_UNITS, 0)
    }

    /// Create a signed distance (altitude, offset) in meters.
    pub fn create_signed(model: &mut Model, parent: Option<ItemId>, name: &str, meters: f64) -> Result<Self> {
        Self::create_in(model, parent, name, meters, OFFSET_UNITS, 0)
    }

    /// Value in meters.
    pub fn meters(self, model: &Model) -> Result<f64> {
        self.base(model)
    }
}

impl Size {
    /// Create a non-negative size in plain units.
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, value: f64) -> Result<Self> {
        Self::create_in(model, parent, name, value, SIZE_UNITS, 0)
    }
}

impl Time {
    /// Create a duration in seconds.
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, seconds: f64) -> Result<Self> {
        Self::create_in(model, parent, name, seconds, TIME_UNITS, 0)
    }

    /// Value in seconds.
    pub fn seconds(self, model: &Model) -> Result<f64> {
        self.base(model)
    }
}
