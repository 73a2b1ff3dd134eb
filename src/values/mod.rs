//! Typed values layered on items.
//!
//! - [`Number`], [`Boolean`], [`Text`] - scalar leaves with validation
//! - [`Angle`], [`Distance`], [`Size`], [`Time`] - numbers with [`MeasurementUnit`]s
//! - [`Vector`], [`Color`], [`Euler`], [`Quaternion`] - composites of scalar components

mod complex;
mod measure;
mod simple;

pub use complex::*;
pub use measure::*;
pub use simple::*;
