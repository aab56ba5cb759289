//! CLI error types

use std::path::PathBuf;

use bom_reconcile_core::config::ConfigError;
use bom_reconcile_core::llm::LlmError;
use bom_reconcile_core::mapping::MappingError;
use bom_reconcile_core::pipeline::PipelineError;
use thiserror::Error;

/// Errors surfaced by `bomr` commands
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Failed to write {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error("Input is not a BOM table: {0}")]
    InputError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Inference service: {0}")]
    Llm(#[from] LlmError),

    #[error("No inference service configured; pass --ollama or --anthropic, or set [llm.backend]")]
    NoInferenceService,

    #[error("Validation found {0} error(s)")]
    ValidationFailed(usize),
}

impl CliError {
    /// Message with hints where the underlying error provides them
    pub fn user_message(&self) -> String {
        match self {
            CliError::Pipeline(e) => e.user_message(),
            CliError::Llm(e) => e.user_message(),
            _ => self.to_string(),
        }
    }

    /// Process exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ValidationFailed(_) => 2,
            _ => 1,
        }
    }
}
