//! Template command: print the canonical columns or write an upload template

use std::path::PathBuf;

use clap::Args;

use super::{CommandContext, write_table};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Args)]
pub struct TemplateArgs {
    /// Write the example table to this file instead of printing columns
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Handle the template command
pub fn handle_template(args: &TemplateArgs, ctx: &CommandContext) -> Result<(), CliError> {
    let template = ctx.registry()?.template();

    if let Some(path) = &args.output {
        write_table(path, &template.example)?;
        ctx.note(format!(
            "Wrote template with {} column(s) to {}",
            template.columns.len(),
            path.display()
        ));
        return Ok(());
    }

    output::print(&template, ctx.format, output::template_text)
}
