//! Map command: match uploaded headers to canonical fields

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use super::{CommandContext, load_table, map_input, write_records};
use crate::error::CliError;
use crate::output;
use bom_reconcile_core::mapping::ColumnMapping;
use bom_reconcile_core::models::Issue;

#[derive(Debug, Clone, Args)]
pub struct MapArgs {
    /// Uploaded table (JSON or YAML, `-` for stdin)
    pub input: PathBuf,

    /// Write the canonical table to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct MapView<'a> {
    mapping: &'a ColumnMapping,
    issues: &'a [Issue],
    rows: usize,
}

/// Handle the map command
pub fn handle_map(args: &MapArgs, ctx: &CommandContext) -> Result<(), CliError> {
    let table = load_table(&args.input)?;
    let mapped = map_input(ctx, &table)?;

    if let Some(path) = &args.output {
        write_records(path, &mapped.records, &ctx.registry()?)?;
        ctx.note(format!(
            "Wrote {} canonical row(s) to {}",
            mapped.records.len(),
            path.display()
        ));
    }

    let view = MapView {
        mapping: &mapped.mapping,
        issues: &mapped.issues,
        rows: mapped.records.len(),
    };
    output::print(&view, ctx.format, |v| output::mapping_text(v.mapping))
}
