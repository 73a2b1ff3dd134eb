//! Error types for the GeoPose sandbox.

use thiserror::Error;

use crate::core::ItemId;

/// Main error type for data-model operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Numeric value outside the allowed range
    #[error("Invalid value {value} for '{name}': outside [{min}, {max}]")]
    OutOfRange { name: String, value: f64, min: f64, max: f64 },

    /// Value not in the item's whitelist
    #[error("Invalid value {value} for '{name}': not one of [{valid}]")]
    NotAValidValue { name: String, value: String, valid: String },

    /// Text value does not match the item's pattern
    #[error("Invalid value '{value}' for '{name}': does not match /{pattern}/")]
    PatternMismatch { name: String, value: String, pattern: String },

    /// Any other rejected value (wrong kind, NaN, bad unit, bad pattern)
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// Item has a different type than required
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A type with this name is already registered
    #[error("Type already registered: {0}")]
    DuplicateType(String),

    /// No type registered under this name
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// Item id does not exist (never created or destroyed)
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Item created under a parent of the wrong type
    #[error("Invalid parent for {child}: expected {expected}, got {actual}")]
    InvalidParent { child: String, expected: String, actual: String },

    /// Operation or state not implemented
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Payload does not fit the item tree
    #[error("Serialization error at '{path}': {reason}")]
    Serialization { path: String, reason: String },

    /// Malformed CSV input
    #[error("CSV error on line {line}: {reason}")]
    Csv { line: usize, reason: String },

    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] scene_graph::SceneError),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid value error.
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a serialization error.
    pub fn serialization(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Serialization {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for sandbox operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::OutOfRange { name: "latitude".into(), value: 2.0, min: 0.0, max: 1.0 };
        let msg = e.to_string();
        assert!(msg.contains("latitude"));
        assert!(msg.contains("[0, 1]"));

        let e = Error::Csv { line: 3, reason: "missing value".into() };
        assert!(e.to_string().contains("line 3"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }
}
