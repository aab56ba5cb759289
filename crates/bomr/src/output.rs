//! Rendering of command results

use std::fmt::Write as _;

use bom_reconcile_core::advisor::AdvisorOutcome;
use bom_reconcile_core::completion::CompletionOutcome;
use bom_reconcile_core::mapping::ColumnMapping;
use bom_reconcile_core::models::{Issue, Severity};
use bom_reconcile_core::pipeline::PipelineReport;
use bom_reconcile_core::schema::SchemaTemplate;
use bom_reconcile_core::validation::{FieldCoverage, ValidationReport};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Render a serializable value, using `text` for the text format
pub fn render<T: Serialize>(
    value: &T,
    format: OutputFormat,
    text: impl FnOnce(&T) -> String,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| CliError::SerializationError(e.to_string())),
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| CliError::SerializationError(e.to_string()))
        }
        OutputFormat::Text => Ok(text(value)),
    }
}

/// Print a rendered value to stdout
pub fn print<T: Serialize>(
    value: &T,
    format: OutputFormat,
    text: impl FnOnce(&T) -> String,
) -> Result<(), CliError> {
    let rendered = render(value, format, text)?;
    println!("{}", rendered.trim_end());
    Ok(())
}

pub fn template_text(template: &SchemaTemplate) -> String {
    let mut out = String::new();
    let width = template
        .columns
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0);

    for column in &template.columns {
        let marker = if column.required { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {:<width$}  {:<8}  {}",
            column.name,
            column.field_type.to_string(),
            column.description
        );
    }

    out.push_str("\nExample:\n");
    for row in &template.example.rows {
        for (header, cell) in template.example.headers.iter().zip(row) {
            if !cell.is_empty() {
                let _ = writeln!(out, "  {:<width$}  {}", header, cell);
            }
        }
    }
    out.push_str("\n* required");
    out
}

pub fn mapping_text(mapping: &ColumnMapping) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Mapped {}/{} header(s)",
        mapping.stats.mapped, mapping.stats.headers
    );

    for m in &mapping.matches {
        let _ = writeln!(
            out,
            "  {:<24} -> {:<26} {} ({:.0}%)",
            m.header,
            m.field,
            m.method,
            m.confidence * 100.0
        );
    }

    if !mapping.unmapped_headers.is_empty() {
        let _ = writeln!(out, "\nUnmapped: {}", mapping.unmapped_headers.join(", "));
    }

    if !mapping.gaps.is_empty() {
        out.push_str("\nNo source column:\n");
        for gap in &mapping.gaps {
            let kind = if gap.required { "required" } else { "optional" };
            let _ = write!(out, "  {} ({kind})", gap.field);
            if !gap.suggestions.is_empty() {
                let _ = write!(out, " - closest: {}", gap.suggestions.join(", "));
            }
            out.push('\n');
        }
    }
    out
}

/// Validation result with per-field coverage
#[derive(Debug, Serialize)]
pub struct ValidationView<'a> {
    pub report: &'a ValidationReport,
    pub coverage: &'a [FieldCoverage],
    pub derived_totals: usize,
}

pub fn validation_text(view: &ValidationView<'_>) -> String {
    let mut out = String::new();
    let report = view.report;
    let _ = writeln!(
        out,
        "{} error(s), {} warning(s), {} info, total priority score {}",
        report.count(Severity::Error),
        report.count(Severity::Warning),
        report.count(Severity::Info),
        report.total_score()
    );
    if view.derived_totals > 0 {
        let _ = writeln!(out, "Derived total_cost for {} row(s)", view.derived_totals);
    }

    issues_text(&mut out, report.issues.iter().filter(|i| !i.is_missing_value()));

    let incomplete: Vec<_> = view.coverage.iter().filter(|c| c.missing > 0).collect();
    if !incomplete.is_empty() {
        out.push_str("\nMissing values:\n");
        for c in incomplete {
            let marker = if c.required { "*" } else { " " };
            let _ = writeln!(
                out,
                "{marker} {:<26} {:>5}/{:<5} {:>5.1}%",
                c.field, c.missing, c.total, c.missing_pct
            );
        }
    }

    let queue: Vec<_> = report
        .completion_order()
        .into_iter()
        .filter(|s| s.needs_completion())
        .take(10)
        .collect();
    if !queue.is_empty() {
        out.push_str("\nCompletion priority:\n");
        for score in queue {
            let fields: Vec<&str> = score.missing_fields().collect();
            let _ = writeln!(
                out,
                "  row {:<5} score {:<3} {}",
                score.record,
                score.score,
                fields.join(", ")
            );
        }
    }
    out
}

pub fn completion_text(outcome: &CompletionOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Filled {} field(s) across {} row(s) in {} call(s)",
        outcome.applied.len(),
        outcome.rows_attempted,
        outcome.calls_made
    );
    if outcome.budget_exhausted() {
        let _ = writeln!(
            out,
            "{} row(s) left for a later run",
            outcome.rows_unprocessed
        );
    }

    for s in &outcome.applied {
        let confidence = s
            .confidence
            .map(|c| format!(" ({:.0}%)", c * 100.0))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  row {:<5} {:<26} = {}{confidence}",
            s.record, s.field, s.value
        );
    }

    if !outcome.skipped.is_empty() {
        out.push_str("\nSkipped:\n");
        for s in &outcome.skipped {
            let _ = writeln!(out, "  row {:<5} {:<26} {}", s.record, s.field, s.reason);
        }
    }
    if !outcome.discarded.is_empty() {
        let _ = writeln!(
            out,
            "\n{} suggestion(s) discarded because the field already had a value",
            outcome.discarded.len()
        );
    }
    out
}

pub fn advice_text(outcome: &AdvisorOutcome) -> String {
    let mut out = String::new();
    let aggregate = &outcome.aggregate;
    let _ = writeln!(
        out,
        "{} line(s), {} supplier(s), total cost {:.2}",
        aggregate.lines,
        aggregate.supplier_count(),
        aggregate.total_cost
    );
    for s in &aggregate.suppliers {
        let _ = writeln!(
            out,
            "  {:<24} {:>4} line(s) {:>12.2}",
            s.supplier, s.lines, s.total_cost
        );
    }

    if outcome.suggestions.is_empty() {
        out.push_str("\nNo suggestions\n");
    } else {
        out.push_str("\nSuggestions:\n");
        for (i, s) in outcome.suggestions.iter().enumerate() {
            let _ = writeln!(out, "{}. [{}] {}", i + 1, s.category, s.recommendation);
            if !s.affected_parts.is_empty() {
                let _ = writeln!(out, "   parts: {}", s.affected_parts.join(", "));
            }
            if let Some(supplier) = &s.suggested_supplier {
                let _ = writeln!(out, "   supplier: {supplier}");
            }
            if let Some(savings) = &s.potential_savings {
                let _ = writeln!(out, "   savings: {savings}");
            }
        }
    }

    for warning in &outcome.warnings {
        let _ = writeln!(out, "⚠ {warning}");
    }
    out
}

pub fn pipeline_text(report: &PipelineReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Run {} finished in {}",
        report.run_id,
        report.duration_formatted()
    );
    for stage in &report.stages {
        match &stage.skip_reason {
            Some(reason) if stage.skipped => {
                let _ = writeln!(out, "  ⊘ {:<10} skipped: {}", stage.stage, reason);
            }
            _ => {
                let _ = writeln!(out, "  ✓ {:<10} {}ms", stage.stage, stage.duration_ms);
            }
        }
    }

    let _ = writeln!(
        out,
        "\nPriority score {} -> {} over {} row(s)",
        report.initial.total_score(),
        report.validation.total_score(),
        report.records.len()
    );
    issues_text(
        &mut out,
        report.validation.issues.iter().filter(|i| !i.is_missing_value()),
    );

    if let Some(completion) = &report.completion {
        out.push('\n');
        out.push_str(&completion_text(completion));
    }
    if let Some(advice) = &report.advice {
        out.push('\n');
        out.push_str(&advice_text(advice));
    }
    out
}

fn issues_text<'a>(out: &mut String, issues: impl Iterator<Item = &'a Issue>) {
    let issues: Vec<_> = issues.collect();
    if issues.is_empty() {
        return;
    }
    out.push_str("\nIssues:\n");
    for issue in issues {
        let _ = writeln!(out, "  {issue}");
    }
}
