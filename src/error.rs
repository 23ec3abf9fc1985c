//! Error types for the record registry

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Record registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Type not found: {type_name}")]
    NotFound { type_name: String },

    #[error("Type already registered: {type_name}")]
    DuplicateType { type_name: String },

    #[error("Invalid schema for {type_name}: {reason}")]
    InvalidSchema { type_name: String, reason: String },

    #[error("Unknown field {field} on {type_name}")]
    UnknownField { type_name: String, field: String },

    #[error("Type mismatch for {type_name}.{field}: expected {expected}")]
    TypeMismatch {
        type_name: String,
        field: String,
        expected: String,
    },

    #[error("Factory for {type_name} built a non-conforming instance: {reason}")]
    FactoryMismatch { type_name: String, reason: String },

    #[error("Expected a {expected} record, got {actual}")]
    RecordMismatch { expected: String, actual: String },

    #[error("Unsupported definition format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RegistryError {
    pub(crate) fn not_found(type_name: impl Into<String>) -> Self {
        Self::NotFound {
            type_name: type_name.into(),
        }
    }

    pub(crate) fn invalid(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means the type was never registered (or was cleared)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
