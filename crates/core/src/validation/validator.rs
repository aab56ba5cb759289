//! Record validation and priority scoring

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::ValidationConfig;
use super::priority::{PriorityScore, completion_order};
use super::rules::check_rule;
use crate::models::{Issue, IssueKind, Record, Severity};
use crate::schema::SchemaRegistry;

/// Issues and priority scores for a record set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Issues in record order, then table-level issues
    pub issues: Vec<Issue>,
    /// One score per record, in record order
    pub scores: Vec<PriorityScore>,
}

impl ValidationReport {
    /// Issues of one severity
    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    /// Number of issues of one severity
    pub fn count(&self, severity: Severity) -> usize {
        self.by_severity(severity).count()
    }

    /// Check whether any error was found
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Issues for one record
    pub fn issues_for(&self, record: usize) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.record == Some(record))
    }

    /// Fields of a record flagged as missing (required or optional)
    pub fn missing_fields(&self, record: usize) -> Vec<&str> {
        self.issues_for(record)
            .filter(|i| i.is_missing_value())
            .filter_map(|i| i.field.as_deref())
            .collect()
    }

    /// Score for one record
    pub fn score(&self, record: usize) -> Option<&PriorityScore> {
        self.scores.iter().find(|s| s.record == record)
    }

    /// Sum of all record scores
    pub fn total_score(&self) -> u32 {
        self.scores.iter().map(|s| s.score).sum()
    }

    /// Records needing completion, highest priority first
    pub fn completion_order(&self) -> Vec<&PriorityScore> {
        completion_order(&self.scores)
    }
}

/// Validate records against a schema registry
///
/// Validation is pure: the same records always produce the same report.
#[derive(Debug, Clone)]
pub struct Validator {
    registry: SchemaRegistry,
    config: ValidationConfig,
}

impl Validator {
    /// Create a validator with default config
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            config: ValidationConfig::default(),
        }
    }

    /// Create a validator with custom config
    pub fn with_config(registry: SchemaRegistry, config: ValidationConfig) -> Self {
        Self { registry, config }
    }

    /// The registry records are checked against
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a record set
    pub fn validate(&self, records: &[Record]) -> ValidationReport {
        let mut issues = Vec::new();
        let mut scores = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let (record_issues, score) = self.validate_record(index, record);
            issues.extend(record_issues);
            scores.push(score);
        }

        if self.config.check_duplicates {
            issues.extend(self.duplicate_parts(records));
        }
        if self.config.check_cost_variance
            && let Some(issue) = self.cost_variance(records)
        {
            issues.push(issue);
        }

        debug!(
            records = records.len(),
            issues = issues.len(),
            "Validated records"
        );

        ValidationReport { issues, scores }
    }

    /// Validate one record, returning its issues and priority score
    pub fn validate_record(&self, index: usize, record: &Record) -> (Vec<Issue>, PriorityScore) {
        let mut issues = Vec::new();
        let mut missing_required = Vec::new();
        let mut missing_optional = Vec::new();

        for spec in self.registry.fields() {
            let cell = record.cell(&spec.name);

            if cell.is_empty() {
                if spec.required {
                    missing_required.push(spec.name.clone());
                    issues.push(Issue::for_field(
                        index,
                        &spec.name,
                        Severity::Error,
                        IssueKind::MissingRequired,
                        format!("Required field '{}' is empty", spec.name),
                    ));
                } else {
                    missing_optional.push(spec.name.clone());
                    issues.push(Issue::for_field(
                        index,
                        &spec.name,
                        Severity::Info,
                        IssueKind::MissingOptional,
                        format!("Optional field '{}' is empty", spec.name),
                    ));
                }
                continue;
            }

            if !spec.field_type.accepts(cell) {
                issues.push(Issue::for_field(
                    index,
                    &spec.name,
                    Severity::Error,
                    IssueKind::TypeMismatch,
                    format!("'{}' is not a valid {}", cell, spec.field_type),
                ));
                continue;
            }

            if let Some(finding) = check_rule(spec.rule, cell, &self.config) {
                issues.push(Issue::for_field(
                    index,
                    &spec.name,
                    finding.severity,
                    IssueKind::FieldRule,
                    finding.message,
                ));
            }
        }

        if let Some(issue) = self.cost_consistency(index, record) {
            issues.push(issue);
        }

        let score = PriorityScore::new(
            index,
            missing_required,
            missing_optional,
            self.config.required_weight,
            self.config.optional_weight,
        );
        (issues, score)
    }

    fn cost_consistency(&self, index: usize, record: &Record) -> Option<Issue> {
        let quantity = record.number("quantity")?;
        let unit_cost = record.number("unit_cost")?;
        let total_cost = record.number("total_cost")?;

        let expected = quantity * unit_cost;
        if (total_cost - expected).abs() <= self.config.cost_tolerance {
            return None;
        }

        Some(Issue::for_field(
            index,
            "total_cost",
            Severity::Warning,
            IssueKind::CostMismatch,
            format!(
                "total_cost mismatch: expected {:.2} ({} × {:.2}), got {:.2}",
                expected, quantity, unit_cost, total_cost
            ),
        ))
    }

    fn duplicate_parts(&self, records: &[Record]) -> Vec<Issue> {
        let mut seen = HashSet::new();
        let mut issues = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let Some(part) = record.text("part_number") else {
                continue;
            };
            if !seen.insert(part.to_string()) {
                issues.push(Issue::for_field(
                    index,
                    "part_number",
                    Severity::Warning,
                    IssueKind::DuplicatePart,
                    format!("Duplicate part number '{}'", part),
                ));
            }
        }
        issues
    }

    fn cost_variance(&self, records: &[Record]) -> Option<Issue> {
        let costs: Vec<f64> = records.iter().filter_map(|r| r.number("unit_cost")).collect();
        if costs.len() < 2 {
            return None;
        }

        let n = costs.len() as f64;
        let mean = costs.iter().sum::<f64>() / n;
        let variance = costs.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std_dev = variance.sqrt();

        (std_dev > mean * 2.0).then(|| {
            Issue::for_table(
                Some("unit_cost".to_string()),
                Severity::Warning,
                IssueKind::CostVariance,
                "High variance in unit costs - please review for outliers",
            )
        })
    }
}
