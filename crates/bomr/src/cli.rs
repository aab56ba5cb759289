use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::commands::{AdviseArgs, CompleteArgs, MapArgs, RunArgs, TemplateArgs, ValidateArgs};

/// Top-level CLI parser for the `bomr` binary.
#[derive(Debug, Parser)]
#[command(
    name = "bomr",
    version,
    about = "Reconcile uploaded Bills of Materials against a canonical schema"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "BOMR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format: json, yaml, text
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress and summaries)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Text,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the canonical BOM template with an example row
    Template(TemplateArgs),
    /// Map uploaded headers onto canonical fields
    Map(MapArgs),
    /// Validate a BOM and rank rows by completion priority
    Validate(ValidateArgs),
    /// Fill empty fields through the inference service
    Complete(CompleteArgs),
    /// Ask the inference service for supplier and cost advice
    Advise(AdviseArgs),
    /// Run map, validate, complete and advise in one pass
    Run(RunArgs),
}

/// Inference service selection shared by commands that call one
#[derive(Debug, Clone, Default, Args)]
pub struct LlmArgs {
    /// Use a local Ollama model
    #[arg(long, value_name = "MODEL", conflicts_with = "anthropic")]
    pub ollama: Option<String>,

    /// Ollama API URL
    #[arg(long, value_name = "URL", requires = "ollama")]
    pub ollama_url: Option<String>,

    /// Use an Anthropic model (key read from ANTHROPIC_API_KEY)
    #[arg(long, value_name = "MODEL")]
    pub anthropic: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub llm_timeout: Option<u64>,
}
