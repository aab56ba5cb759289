//! Error types for the schema registry

use thiserror::Error;

/// Errors raised when a schema registry is not usable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Registry has no fields
    #[error("Schema registry has no fields")]
    Empty,

    /// Two fields share a name
    #[error("Duplicate field in schema registry: {0}")]
    DuplicateField(String),

    /// No field is marked required
    #[error("Schema registry defines no required fields")]
    NoRequiredFields,

    /// A referenced field does not exist
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A field definition is malformed
    #[error("Invalid field definition: {0}")]
    InvalidField(String),
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
