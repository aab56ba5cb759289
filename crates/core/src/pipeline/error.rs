//! Error types for pipeline operations
//!
//! Only structural failures surface here. Row and field problems are
//! reported as issues or skipped fields on the pipeline report.

use thiserror::Error;

use crate::mapping::MappingError;
use crate::schema::SchemaError;

/// Errors that abort a pipeline run with no partial output
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Schema registry is not usable
    #[error("Schema registry unusable: {0}")]
    Schema(#[from] SchemaError),

    /// Input is not a table
    #[error("Input is not tabular: {0}")]
    NotTabular(String),

    /// Pipeline configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Schema(err) => {
                format!(
                    "Schema registry unusable: {err}\n\nHint: Check the [schema] section of your configuration."
                )
            }
            PipelineError::NotTabular(msg) => {
                format!(
                    "Input is not tabular: {msg}\n\nHint: Provide a header row and rows of equal width."
                )
            }
            PipelineError::ConfigError(msg) => {
                format!("Configuration error: {msg}\n\nHint: Check your configuration file.")
            }
        }
    }
}

impl From<MappingError> for PipelineError {
    fn from(err: MappingError) -> Self {
        match err {
            MappingError::NotTabular(msg) => PipelineError::NotTabular(msg),
            MappingError::Schema(err) => PipelineError::Schema(err),
            other => PipelineError::ConfigError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mapping_error() {
        let err: PipelineError = MappingError::NotTabular("no header row".into()).into();
        assert!(matches!(err, PipelineError::NotTabular(_)));

        let err: PipelineError = MappingError::UnknownField {
            header: "Colour".into(),
            field: "color".into(),
        }
        .into();
        assert!(matches!(err, PipelineError::ConfigError(_)));
    }

    #[test]
    fn test_user_message_has_hint() {
        let err = PipelineError::Schema(SchemaError::Empty);
        assert!(err.user_message().contains("Hint"));
    }
}
