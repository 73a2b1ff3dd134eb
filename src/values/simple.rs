//! Scalar values with validation.

use regex_lite::Regex;
use std::fmt;

use super::MeasurementUnit;
use crate::core::{names, ItemId, Model, Payload};
use crate::util::{Error, Result};

/// Kind of scalar a simple item holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Boolean,
    Text,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Text => "string",
        })
    }
}

/// A scalar value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Number(_) => ValueKind::Number,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Text(_) => ValueKind::Text,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Convert a JSON scalar into a value of the requested kind.
    pub fn from_json(json: &serde_json::Value, kind: ValueKind) -> Option<Self> {
        match (kind, json) {
            (ValueKind::Number, serde_json::Value::Number(n)) => n.as_f64().map(Self::Number),
            (ValueKind::Boolean, serde_json::Value::Bool(b)) => Some(Self::Boolean(*b)),
            (ValueKind::Text, serde_json::Value::String(s)) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Parse text (CSV cells, CLI arguments) into a value of the requested kind.
    pub fn parse(text: &str, kind: ValueKind) -> Option<Self> {
        let text = text.trim();
        match kind {
            ValueKind::Number => text.parse::<f64>().ok().map(Self::Number),
            ValueKind::Boolean => match text.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(Self::Boolean(true)),
                "false" | "0" | "no" => Some(Self::Boolean(false)),
                _ => None,
            },
            ValueKind::Text => Some(Self::Text(text.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Value state of a simple item: current value, default and constraints.
#[derive(Clone, Debug)]
pub struct SimpleValue {
    kind: ValueKind,
    value: Option<Value>,
    default: Option<Value>,
    valid_values: Vec<Value>,
    min: Option<f64>,
    max: Option<f64>,
    pattern: Option<Regex>,
    units: &'static [MeasurementUnit],
    unit_index: usize,
}

impl SimpleValue {
    /// Unconstrained value of the given kind with no default.
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            value: None,
            default: None,
            valid_values: Vec::new(),
            min: None,
            max: None,
            pattern: None,
            units: &[],
            unit_index: 0,
        }
    }

    /// Builder: default value (not validated until the item is created).
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Builder: numeric range.
    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Builder: whitelist of accepted values.
    pub fn with_valid_values(mut self, values: Vec<Value>) -> Self {
        self.valid_values = values;
        self
    }

    /// Builder: regular expression a text value must match.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::invalid(pattern, e.to_string()))?;
        self.pattern = Some(regex);
        Ok(self)
    }

    /// Builder: measurement units and the active unit.
    pub fn with_units(mut self, units: &'static [MeasurementUnit], unit_index: usize) -> Self {
        self.units = units;
        self.unit_index = unit_index.min(units.len().saturating_sub(1));
        self
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Current value, falling back to the default.
    pub fn get(&self) -> Option<&Value> {
        self.value.as_ref().or(self.default.as_ref())
    }

    /// Explicitly set value only.
    pub fn raw(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn valid_values(&self) -> &[Value] {
        &self.valid_values
    }

    /// Effective numeric range (own range intersected with the active unit's range).
    pub fn range(&self) -> (Option<f64>, Option<f64>) {
        let unit = self.unit();
        let min = match (self.min, unit.and_then(|u| u.min)) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let max = match (self.max, unit.and_then(|u| u.max)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        (min, max)
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    pub fn units(&self) -> &'static [MeasurementUnit] {
        self.units
    }

    /// Active unit, if this is a measure.
    pub fn unit(&self) -> Option<&'static MeasurementUnit> {
        self.units.get(self.unit_index)
    }

    /// True when no value is set or the value equals the default.
    pub fn is_default(&self) -> bool {
        match &self.value {
            None => true,
            Some(v) => self.default.as_ref() == Some(v),
        }
    }

    /// True when neither a value nor a default exists.
    pub fn is_undefined(&self) -> bool {
        self.value.is_none() && self.default.is_none()
    }

    /// Validate a candidate value against kind, range, whitelist and pattern.
    pub fn check_value(&self, name: &str, value: &Value) -> Result<()> {
        if value.kind() != self.kind {
            return Err(Error::invalid(name, format!("expected a {}, got {}", self.kind, value.kind())));
        }
        if let Value::Number(n) = value {
            if n.is_nan() {
                return Err(Error::invalid(name, "NaN is not a number"));
            }
            let (min, max) = self.range();
            if min.is_some_and(|m| *n < m) || max.is_some_and(|m| *n > m) {
                return Err(Error::OutOfRange {
                    name: name.to_string(),
                    value: *n,
                    min: min.unwrap_or(f64::NEG_INFINITY),
                    max: max.unwrap_or(f64::INFINITY),
                });
            }
        }
        if !self.valid_values.is_empty() && !self.valid_values.contains(value) {
            let valid: Vec<String> = self.valid_values.iter().map(Value::to_string).collect();
            return Err(Error::NotAValidValue {
                name: name.to_string(),
                value: value.to_string(),
                valid: valid.join(", "),
            });
        }
        if let (Some(regex), Value::Text(s)) = (&self.pattern, value) {
            if !regex.is_match(s) {
                return Err(Error::PatternMismatch {
                    name: name.to_string(),
                    value: s.clone(),
                    pattern: regex.as_str().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Validate and commit a value; `None` resets to the default.
    pub fn set(&mut self, name: &str, value: Option<Value>) -> Result<()> {
        if let Some(v) = &value {
            self.check_value(name, v)?;
        }
        self.value = value;
        Ok(())
    }

    /// Validate and commit a new default.
    pub fn set_default(&mut self, name: &str, default: Value) -> Result<()> {
        self.check_value(name, &default)?;
        self.default = Some(default);
        Ok(())
    }

    /// Replace the whitelist. The current value and default must be on the new list.
    pub fn set_valid_values(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        let previous = std::mem::replace(&mut self.valid_values, values);
        let check = [&self.value, &self.default]
            .into_iter()
            .flatten()
            .try_for_each(|current| self.check_value(name, current));
        if check.is_err() {
            self.valid_values = previous;
        }
        check
    }

    /// Switch the active unit, converting the stored value, default and range.
    pub fn set_unit(&mut self, name: &str, unit: &str) -> Result<()> {
        let index = self
            .units
            .iter()
            .position(|u| u.matches(unit))
            .ok_or_else(|| Error::invalid(name, format!("unknown unit '{unit}'")))?;
        let (Some(from), Some(to)) = (self.unit(), self.units.get(index)) else {
            return Ok(());
        };
        let scale = from.factor / to.factor;
        for v in [&mut self.value, &mut self.default] {
            if let Some(Value::Number(n)) = v {
                *n *= scale;
            }
        }
        for bound in [&mut self.min, &mut self.max] {
            if let Some(b) = bound {
                *b *= scale;
            }
        }
        self.unit_index = index;
        Ok(())
    }

    /// Numeric value converted to the base unit (unit factor 1).
    pub fn base_value(&self) -> Option<f64> {
        let n = self.get()?.as_f64()?;
        Some(match self.unit() {
            Some(unit) => n * unit.factor,
            None => n,
        })
    }
}

// ============================================================================
// Typed handles
// ============================================================================

pub(crate) fn create_simple(
    model: &mut Model,
    parent: Option<ItemId>,
    type_name: &str,
    name: &str,
    state: SimpleValue,
) -> Result<ItemId> {
    if let Some(default) = state.default_value() {
        state.check_value(name, default)?;
    }
    model.create_with(parent, type_name, name, Payload::Value(state))
}

/// Number item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Number(ItemId);

impl Number {
    /// Create a number with a default value.
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, default: f64) -> Result<Self> {
        Self::create_with(model, parent, name, SimpleValue::new(ValueKind::Number).with_default(default))
    }

    /// Create a number with a default and an inclusive range.
    pub fn create_ranged(
        model: &mut Model,
        parent: Option<ItemId>,
        name: &str,
        default: f64,
        min: f64,
        max: f64,
    ) -> Result<Self> {
        let state = SimpleValue::new(ValueKind::Number)
            .with_default(default)
            .with_range(Some(min), Some(max));
        Self::create_with(model, parent, name, state)
    }

    /// Create from a prepared value state.
    pub fn create_with(model: &mut Model, parent: Option<ItemId>, name: &str, state: SimpleValue) -> Result<Self> {
        create_simple(model, parent, names::NUMBER, name, state).map(Self)
    }

    /// Wrap an existing item, checking its type.
    pub fn from_item(model: &Model, id: ItemId) -> Result<Self> {
        model.require_type(id, names::NUMBER)?;
        Ok(Self(id))
    }

    pub fn id(self) -> ItemId {
        self.0
    }

    /// Current value (default when unset, 0 when undefined).
    pub fn get(self, model: &Model) -> Result<f64> {
        Ok(model.value(self.0)?.and_then(Value::as_f64).unwrap_or(0.0))
    }

    pub fn set(self, model: &mut Model, value: f64) -> Result<()> {
        model.set_value(self.0, Value::Number(value))
    }

    /// Clear the value so the default applies again.
    pub fn reset(self, model: &mut Model) -> Result<()> {
        model.modify_simple(self.0, |name, v| v.set(name, None))
    }
}

/// Boolean item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Boolean(ItemId);

impl Boolean {
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, default: bool) -> Result<Self> {
        let state = SimpleValue::new(ValueKind::Boolean).with_default(default);
        create_simple(model, parent, names::BOOLEAN, name, state).map(Self)
    }

    pub fn from_item(model: &Model, id: ItemId) -> Result<Self> {
        model.require_type(id, names::BOOLEAN)?;
        Ok(Self(id))
    }

    pub fn id(self) -> ItemId {
        self.0
    }

    pub fn get(self, model: &Model) -> Result<bool> {
        Ok(model.value(self.0)?.and_then(Value::as_bool).unwrap_or(false))
    }

    pub fn set(self, model: &mut Model, value: bool) -> Result<()> {
        model.set_value(self.0, Value::Boolean(value))
    }
}

/// Text item (the `String` type).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Text(ItemId);

impl Text {
    /// Create a free-form text.
    pub fn create(model: &mut Model, parent: Option<ItemId>, name: &str, default: &str) -> Result<Self> {
        let state = SimpleValue::new(ValueKind::Text).with_default(default);
        Self::create_with(model, parent, name, state)
    }

    /// Create a text restricted to a set of options.
    pub fn create_choice(
        model: &mut Model,
        parent: Option<ItemId>,
        name: &str,
        default: &str,
        options: &[&str],
    ) -> Result<Self> {
        let state = SimpleValue::new(ValueKind::Text)
            .with_default(default)
            .with_valid_values(options.iter().map(|o| Value::from(*o)).collect());
        Self::create_with(model, parent, name, state)
    }

    pub fn create_with(model: &mut Model, parent: Option<ItemId>, name: &str, state: SimpleValue) -> Result<Self> {
        create_simple(model, parent, names::STRING, name, state).map(Self)
    }

    pub fn from_item(model: &Model, id: ItemId) -> Result<Self> {
        model.require_type(id, names::STRING)?;
        Ok(Self(id))
    }

    pub fn id(self) -> ItemId {
        self.0
    }

    pub fn get(self, model: &Model) -> Result<String> {
        Ok(model
            .value(self.0)?
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    pub fn set(self, model: &mut Model, value: &str) -> Result<()> {
        model.set_value(self.0, Value::from(value))
    }
}
