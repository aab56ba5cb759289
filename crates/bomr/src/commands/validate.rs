//! Validate command: check records and rank rows for completion

use std::path::PathBuf;

use bom_reconcile_core::models::{Record, Severity};
use bom_reconcile_core::validation::{
    ValidationReport, Validator, derive_total_costs, missing_summary,
};
use clap::Args;

use super::{CommandContext, load_table, map_input, write_records};
use crate::error::CliError;
use crate::output::{self, ValidationView};

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Uploaded table (JSON or YAML, `-` for stdin)
    pub input: PathBuf,

    /// Exit with status 2 when any error-level issue is found
    #[arg(long)]
    pub strict: bool,

    /// Do not derive total_cost from quantity and unit_cost
    #[arg(long)]
    pub no_derive: bool,

    /// Write the canonical table (with derived totals) to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Map, derive totals and validate; shared with the completion command
pub(crate) fn validate_input(
    ctx: &CommandContext,
    input: &std::path::Path,
    derive: bool,
) -> Result<(Vec<Record>, ValidationReport, usize), CliError> {
    let table = load_table(input)?;
    let mapped = map_input(ctx, &table)?;
    let mut records = mapped.records;

    let derived = if derive && ctx.config.pipeline.derive_totals {
        derive_total_costs(&mut records)
    } else {
        0
    };

    let validator = Validator::with_config(ctx.registry()?, ctx.config.validation.clone());
    let mut report = validator.validate(&records);
    report.issues.splice(0..0, mapped.issues);
    Ok((records, report, derived))
}

/// Handle the validate command
pub fn handle_validate(args: &ValidateArgs, ctx: &CommandContext) -> Result<(), CliError> {
    let registry = ctx.registry()?;
    let (records, report, derived) = validate_input(ctx, &args.input, !args.no_derive)?;

    if let Some(path) = &args.output {
        write_records(path, &records, &registry)?;
    }

    let coverage = missing_summary(&records, &registry);
    let view = ValidationView {
        report: &report,
        coverage: &coverage,
        derived_totals: derived,
    };
    output::print(&view, ctx.format, output::validation_text)?;

    let errors = report.count(Severity::Error);
    ctx.note(format!(
        "Validated {} row(s): {} error(s), {} warning(s)",
        records.len(),
        errors,
        report.count(Severity::Warning)
    ));

    if args.strict && errors > 0 {
        return Err(CliError::ValidationFailed(errors));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use bom_reconcile_core::config::ReconcileConfig;
    use tempfile::TempDir;

    use super::*;
    use crate::cli::OutputFormat;

    fn ctx() -> CommandContext {
        CommandContext {
            config: ReconcileConfig::default(),
            format: OutputFormat::Json,
            quiet: true,
        }
    }

    fn upload(temp: &TempDir) -> PathBuf {
        let path = temp.path().join("upload.json");
        std::fs::write(
            &path,
            r#"{"headers": ["Part No", "Qty", "Unit Price"],
                "rows": [["R1", 10, 0.25], ["R2", "ten", 0.5]]}"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_strict_fails_on_errors() {
        let temp = TempDir::new().unwrap();
        let args = ValidateArgs {
            input: upload(&temp),
            strict: true,
            no_derive: false,
            output: None,
        };

        let err = handle_validate(&args, &ctx()).unwrap_err();
        assert!(matches!(err, CliError::ValidationFailed(n) if n > 0));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_derived_totals_written() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("canonical.json");
        let args = ValidateArgs {
            input: upload(&temp),
            strict: false,
            no_derive: false,
            output: Some(out.clone()),
        };

        handle_validate(&args, &ctx()).unwrap();

        let table = load_table(&out).unwrap();
        let column = table
            .headers
            .iter()
            .position(|h| h == "total_cost")
            .unwrap();
        assert_eq!(table.rows[0][column].to_string(), "2.5");
    }
}
