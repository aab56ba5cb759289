//! Command handlers and the input/output helpers they share

mod advise;
mod complete;
mod map;
mod run;
mod template;
mod validate;

pub use advise::{AdviseArgs, handle_advise};
pub use complete::{CompleteArgs, handle_complete};
pub use map::{MapArgs, handle_map};
pub use run::{RunArgs, handle_run};
pub use template::{TemplateArgs, handle_template};
pub use validate::{ValidateArgs, handle_validate};

use std::io::Read;
use std::path::{Path, PathBuf};

use bom_reconcile_core::config::ReconcileConfig;
use bom_reconcile_core::llm::{self, LlmConfig, LlmMode};
use bom_reconcile_core::mapping::{ColumnMapper, MappedTable};
use bom_reconcile_core::models::{RawTable, Record};
use bom_reconcile_core::proposer::{FieldProposer, LlmProposer};
use bom_reconcile_core::schema::SchemaRegistry;
use tracing::{debug, info};

use crate::cli::{LlmArgs, OutputFormat};
use crate::error::CliError;

/// Configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "bomr.toml";

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: ReconcileConfig,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl CommandContext {
    pub fn registry(&self) -> Result<SchemaRegistry, CliError> {
        self.config
            .registry()
            .map_err(|e| CliError::Pipeline(e.into()))
    }

    /// Print a summary line on stderr unless quiet
    pub fn note(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{}", msg.as_ref());
        }
    }
}

/// Load configuration from an explicit path, `bomr.toml`, or defaults
pub fn load_config(path: Option<&Path>) -> Result<ReconcileConfig, CliError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            Ok(ReconcileConfig::from_file(path)?)
        }
        None => {
            let local = Path::new(DEFAULT_CONFIG_FILE);
            if local.is_file() {
                info!(path = %local.display(), "Loading configuration");
                Ok(ReconcileConfig::from_file(local)?)
            } else {
                debug!("No configuration file, using defaults");
                Ok(ReconcileConfig::default())
            }
        }
    }
}

/// Load an uploaded table; `-` reads stdin
///
/// The table is JSON or YAML shaped as `{"headers": [...], "rows": [[...]]}`.
/// YAML is chosen by a `.yaml`/`.yml` extension.
pub fn load_table(input: &Path) -> Result<RawTable, CliError> {
    let content = if input.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| CliError::FileReadError(PathBuf::from("<stdin>"), e.to_string()))?;
        buffer
    } else {
        std::fs::read_to_string(input)
            .map_err(|e| CliError::FileReadError(input.to_path_buf(), e.to_string()))?
    };

    let table: RawTable = if is_yaml(input) {
        serde_yaml::from_str(&content).map_err(|e| CliError::InputError(e.to_string()))?
    } else {
        serde_json::from_str(&content).map_err(|e| CliError::InputError(e.to_string()))?
    };

    debug!(
        headers = table.headers.len(),
        rows = table.row_count(),
        "Loaded table"
    );
    Ok(table)
}

/// Write canonical records as a table in registry column order
pub fn write_records(
    path: &Path,
    records: &[Record],
    registry: &SchemaRegistry,
) -> Result<(), CliError> {
    write_table(path, &RawTable::from_records(records, registry))
}

pub fn write_table(path: &Path, table: &RawTable) -> Result<(), CliError> {
    let content = if is_yaml(path) {
        serde_yaml::to_string(table).map_err(|e| CliError::SerializationError(e.to_string()))?
    } else {
        serde_json::to_string_pretty(table)
            .map_err(|e| CliError::SerializationError(e.to_string()))?
    };
    std::fs::write(path, content)
        .map_err(|e| CliError::FileWriteError(path.to_path_buf(), e.to_string()))?;
    info!(path = %path.display(), rows = table.row_count(), "Wrote table");
    Ok(())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Map and coerce an uploaded table with the configured mapping
pub fn map_input(ctx: &CommandContext, table: &RawTable) -> Result<MappedTable, CliError> {
    let mapper = ColumnMapper::with_config(ctx.registry()?, ctx.config.mapping.clone());
    Ok(mapper.map_table(table)?)
}

impl LlmArgs {
    /// Overlay command-line service selection onto configuration
    pub fn apply(&self, config: &mut LlmConfig) {
        if let Some(model) = &self.ollama {
            config.backend = LlmMode::ollama(model.clone());
            if let (Some(url), LlmMode::Ollama { url: target, .. }) =
                (&self.ollama_url, &mut config.backend)
            {
                *target = url.clone();
            }
        } else if let Some(model) = &self.anthropic {
            config.backend = LlmMode::anthropic(model.clone());
        }
        if let Some(seconds) = self.llm_timeout {
            config.timeout_seconds = seconds;
        }
    }
}

/// Build the proposer for the configured inference service, if any
pub fn build_proposer(config: &LlmConfig) -> Result<Option<Box<dyn FieldProposer>>, CliError> {
    let Some(client) = llm::build_client(config)? else {
        return Ok(None);
    };
    Ok(Some(Box::new(LlmProposer::new(client))))
}

/// Like [`build_proposer`] but an unconfigured service is an error
pub fn require_proposer(config: &LlmConfig) -> Result<Box<dyn FieldProposer>, CliError> {
    build_proposer(config)?.ok_or(CliError::NoInferenceService)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bom_reconcile_core::models::Cell;
    use tempfile::TempDir;

    #[test]
    fn test_load_json_table() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upload.json");
        std::fs::write(
            &path,
            r#"{"headers": ["Part No", "Qty"], "rows": [["R1", 10], ["R2", null]]}"#,
        )
        .unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.headers, vec!["Part No", "Qty"]);
        assert_eq!(table.rows[0][1], Cell::number(10.0));
        assert_eq!(table.rows[1][1], Cell::Empty);
    }

    #[test]
    fn test_load_yaml_table() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upload.yaml");
        std::fs::write(&path, "headers: [Part No, Vendor]\nrows:\n  - [R1, Mouser]\n").unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.rows[0][1], Cell::text("Mouser"));
    }

    #[test]
    fn test_missing_input_reports_path() {
        let err = load_table(Path::new("/nonexistent/bom.json")).unwrap_err();
        assert!(matches!(err, CliError::FileReadError(path, _) if path.ends_with("bom.json")));
    }

    #[test]
    fn test_written_records_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.json");
        let registry = SchemaRegistry::bom();
        let records = vec![Record::blank(&registry).with("part_number", "C1")];

        write_records(&path, &records, &registry).unwrap();
        let table = load_table(&path).unwrap();
        assert_eq!(table.headers.len(), registry.fields().len());
        assert_eq!(table.rows[0][0], Cell::text("C1"));
    }

    #[test]
    fn test_llm_args_override_config() {
        let mut config = LlmConfig::default();
        let args = LlmArgs {
            ollama: Some("mistral".to_string()),
            ollama_url: Some("http://gpu-box:11434".to_string()),
            anthropic: None,
            llm_timeout: Some(30),
        };
        args.apply(&mut config);

        assert_eq!(
            config.backend,
            LlmMode::Ollama {
                url: "http://gpu-box:11434".to_string(),
                model: "mistral".to_string(),
            }
        );
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_no_backend_builds_no_proposer() {
        assert!(build_proposer(&LlmConfig::default()).unwrap().is_none());
        assert!(matches!(
            require_proposer(&LlmConfig::default()),
            Err(CliError::NoInferenceService)
        ));
    }
}
