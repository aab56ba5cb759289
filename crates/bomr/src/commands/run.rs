//! Run command: the full reconciliation pipeline

use std::path::PathBuf;

use bom_reconcile_core::pipeline::{PipelineStage, ReconcilePipeline};
use clap::Args;

use super::{CommandContext, build_proposer, load_table, write_records};
use crate::cli::LlmArgs;
use crate::error::CliError;
use crate::output;
use crate::progress::BatchProgress;

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Uploaded table (JSON or YAML, `-` for stdin)
    pub input: PathBuf,

    /// Write the reconciled canonical table to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Optional stages to run (complete, advise); map and validate always run
    #[arg(long, value_delimiter = ',')]
    pub stages: Vec<String>,

    /// Maximum rows sent for completion in this run
    #[arg(long)]
    pub max_rows: Option<usize>,

    #[command(flatten)]
    pub llm: LlmArgs,
}

fn parse_stages(names: &[String]) -> Result<Vec<PipelineStage>, CliError> {
    names
        .iter()
        .map(|name| name.trim().parse().map_err(CliError::InvalidArgument))
        .collect()
}

/// Handle the run command
pub async fn handle_run(args: &RunArgs, ctx: &CommandContext) -> Result<(), CliError> {
    let mut config = ctx.config.clone();
    args.llm.apply(&mut config.llm);
    if !args.stages.is_empty() {
        config.pipeline.stages = parse_stages(&args.stages)?;
    }
    if let Some(rows) = args.max_rows {
        config.completion.max_rows = rows;
    }

    let proposer = build_proposer(&config.llm)?;
    if proposer.is_none() {
        ctx.note("No inference service configured; completion and advice will be skipped");
    }

    let table = load_table(&args.input)?;
    let mut pipeline = ReconcilePipeline::new(config)?;
    if let Some(proposer) = proposer {
        pipeline = pipeline.with_boxed_proposer(proposer);
    }

    let progress = BatchProgress::new(ctx.quiet);
    let report = pipeline.run_with_progress(&table, &progress).await?;

    if let Some(advice) = &report.advice {
        for warning in &advice.warnings {
            progress.warn(warning);
        }
    }

    if let Some(path) = &args.output {
        write_records(path, &report.records, pipeline.registry())?;
    }

    output::print(&report, ctx.format, output::pipeline_text)?;
    ctx.note(format!(
        "Reconciled {} row(s) in {}",
        report.records.len(),
        report.duration_formatted()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stages() {
        let stages = parse_stages(&["complete".to_string(), " 4".to_string()]).unwrap();
        assert_eq!(stages, vec![PipelineStage::Complete, PipelineStage::Advise]);
    }

    #[test]
    fn test_unknown_stage_rejected() {
        let err = parse_stages(&["export".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unknown stage: export"));
    }
}
