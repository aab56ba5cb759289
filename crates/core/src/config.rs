//! Reconciliation configuration loaded from TOML
//!
//! Every section and field has a default, so an empty file is a valid
//! configuration:
//!
//! ```toml
//! [schema]
//! required = ["part_number", "description", "quantity", "supplier"]
//!
//! [mapping.overrides]
//! "Vendor Name" = "supplier"
//!
//! [completion]
//! max_rows = 20
//!
//! [llm.backend]
//! mode = "ollama"
//! model = "llama3.2"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::advisor::AdvisorConfig;
use crate::completion::CompletionConfig;
use crate::llm::LlmConfig;
use crate::mapping::MappingConfig;
use crate::pipeline::PipelineConfig;
use crate::schema::{SchemaRegistry, SchemaResult};
use crate::validation::ValidationConfig;

/// Errors loading or saving a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read or written
    #[error("IO error with {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this configuration
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized
    #[error("Could not serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Overrides applied to the built-in BOM schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Replace the set of required fields (`None` keeps the defaults)
    pub required: Option<Vec<String>>,
}

/// Top-level configuration for a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub schema: SchemaConfig,
    pub mapping: MappingConfig,
    pub validation: ValidationConfig,
    pub completion: CompletionConfig,
    pub advisor: AdvisorConfig,
    pub llm: LlmConfig,
    pub pipeline: PipelineConfig,
}

impl ReconcileConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config from a TOML file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the config to a TOML file
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let text = self.to_toml_string()?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build the schema registry with the configured overrides
    pub fn registry(&self) -> SchemaResult<SchemaRegistry> {
        let registry = SchemaRegistry::bom();
        match &self.schema.required {
            Some(required) => registry.with_required(required),
            None => Ok(registry),
        }
    }
}
