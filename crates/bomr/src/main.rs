//! bomr - reconcile uploaded Bills of Materials
//!
//! Maps arbitrary spreadsheet headers onto the canonical BOM schema,
//! validates the records, fills gaps through an inference service and asks
//! it for supplier consolidation advice.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use cli::{Cli, Commands};
use commands::CommandContext;
use error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        match error.downcast_ref::<CliError>() {
            Some(cli_error) => {
                eprintln!("bomr error: {}", cli_error.user_message());
                std::process::exit(cli_error.exit_code());
            }
            None => {
                eprintln!("bomr error: {error:#}");
                std::process::exit(1);
            }
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let ctx = CommandContext {
        config: commands::load_config(cli.config.as_deref())?,
        format: cli.format,
        quiet: cli.quiet,
    };

    match &cli.command {
        Commands::Template(args) => commands::handle_template(args, &ctx)?,
        Commands::Map(args) => commands::handle_map(args, &ctx)?,
        Commands::Validate(args) => commands::handle_validate(args, &ctx)?,
        Commands::Complete(args) => commands::handle_complete(args, &ctx).await?,
        Commands::Advise(args) => commands::handle_advise(args, &ctx).await?,
        Commands::Run(args) => commands::handle_run(args, &ctx).await?,
    }
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_env("BOMR_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing: {error}"))?;

    Ok(())
}
