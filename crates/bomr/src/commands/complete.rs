//! Complete command: fill empty fields through the inference service

use std::path::PathBuf;

use bom_reconcile_core::completion::CompletionEngine;
use bom_reconcile_core::validation::Validator;
use clap::Args;
use tracing::info;

use super::validate::validate_input;
use super::{CommandContext, require_proposer, write_records};
use crate::cli::LlmArgs;
use crate::error::CliError;
use crate::output;
use crate::progress::BatchProgress;

#[derive(Debug, Clone, Args)]
pub struct CompleteArgs {
    /// Uploaded table (JSON or YAML, `-` for stdin)
    pub input: PathBuf,

    /// Write the completed canonical table to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum rows sent for completion in this run
    #[arg(long)]
    pub max_rows: Option<usize>,

    /// Rows per inference call
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Only fill required fields
    #[arg(long)]
    pub required_only: bool,

    #[command(flatten)]
    pub llm: LlmArgs,
}

/// Handle the complete command
pub async fn handle_complete(args: &CompleteArgs, ctx: &CommandContext) -> Result<(), CliError> {
    let mut llm_config = ctx.config.llm.clone();
    args.llm.apply(&mut llm_config);
    let proposer = require_proposer(&llm_config)?;

    let registry = ctx.registry()?;
    let (records, report, _) = validate_input(ctx, &args.input, true)?;

    let mut config = ctx.config.completion.clone();
    if let Some(size) = args.batch_size {
        config = config.with_batch_size(size);
    }
    if args.required_only {
        config = config.with_complete_optional(false);
    }
    let budget = args.max_rows.unwrap_or(config.max_rows);

    let engine = CompletionEngine::with_config(
        proposer,
        Validator::with_config(registry.clone(), ctx.config.validation.clone()),
        config,
    );

    info!(rows = records.len(), budget, "Completing records");
    let progress = BatchProgress::new(ctx.quiet);
    let outcome = engine
        .complete_with_progress(&records, &report, budget, &progress)
        .await;

    if outcome.failed_batches > 0 {
        progress.warn(&format!(
            "{} batch(es) failed; affected fields were left empty",
            outcome.failed_batches
        ));
    }

    if let Some(path) = &args.output {
        write_records(path, &outcome.records, &registry)?;
    }

    output::print(&outcome, ctx.format, output::completion_text)?;
    ctx.note(format!(
        "Priority score {} -> {}",
        report.total_score(),
        outcome.report.total_score()
    ));
    Ok(())
}
