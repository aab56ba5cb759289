//! Error types for column mapping operations

use thiserror::Error;

use crate::schema::SchemaError;

/// Errors that can occur during column mapping
///
/// Unmatched headers and unmapped fields are not errors; they are reported
/// on the [`ColumnMapping`](super::ColumnMapping). These variants cover
/// input that cannot be mapped at all.
#[derive(Error, Debug)]
pub enum MappingError {
    /// Input is not a table
    #[error("Input is not tabular: {0}")]
    NotTabular(String),

    /// A manual override or synonym names a field the schema does not define
    #[error("Mapping for header '{header}' targets unknown field '{field}'")]
    UnknownField { header: String, field: String },

    /// Schema registry is not usable
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Result type for mapping operations
pub type MappingResult<T> = Result<T, MappingError>;
