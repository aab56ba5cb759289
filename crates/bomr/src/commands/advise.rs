//! Advise command: supplier and cost optimization suggestions

use std::path::PathBuf;

use bom_reconcile_core::advisor::OptimizationAdvisor;
use clap::Args;

use super::{CommandContext, load_table, map_input, require_proposer};
use crate::cli::LlmArgs;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Args)]
pub struct AdviseArgs {
    /// Uploaded table (JSON or YAML, `-` for stdin)
    pub input: PathBuf,

    #[command(flatten)]
    pub llm: LlmArgs,
}

/// Handle the advise command
pub async fn handle_advise(args: &AdviseArgs, ctx: &CommandContext) -> Result<(), CliError> {
    let mut llm_config = ctx.config.llm.clone();
    args.llm.apply(&mut llm_config);
    let proposer = require_proposer(&llm_config)?;

    let table = load_table(&args.input)?;
    let records = map_input(ctx, &table)?.records;

    let advisor = OptimizationAdvisor::with_config(proposer, ctx.config.advisor.clone());
    let outcome = advisor.suggest(&records).await;

    output::print(&outcome, ctx.format, output::advice_text)?;
    ctx.note(format!(
        "{} suggestion(s) for {} line(s)",
        outcome.suggestions.len(),
        records.len()
    ));
    Ok(())
}
