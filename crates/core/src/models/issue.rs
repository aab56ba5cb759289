//! Validation issues

use std::fmt;

use serde::{Deserialize, Serialize};

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, typically a completion candidate
    Info,
    /// Suspicious but usable data
    Warning,
    /// Data violates a rule
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What kind of check produced an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// No uploaded column could be associated with a required field
    MappingGap,
    /// Required field is empty
    MissingRequired,
    /// Optional field is empty
    MissingOptional,
    /// Value does not match the field type
    TypeMismatch,
    /// Value violates or looks suspicious under the field rule
    FieldRule,
    /// total_cost disagrees with quantity × unit_cost
    CostMismatch,
    /// Part number appears more than once
    DuplicatePart,
    /// Unit costs are widely spread
    CostVariance,
}

/// A single issue found in the record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Record index, or `None` for table-level issues
    pub record: Option<usize>,
    /// Field the issue concerns, if any
    pub field: Option<String>,
    /// Severity
    pub severity: Severity,
    /// Check that produced the issue
    pub kind: IssueKind,
    /// Human-readable message
    pub message: String,
}

impl Issue {
    /// Create an issue scoped to a record field
    pub fn for_field(
        record: usize,
        field: impl Into<String>,
        severity: Severity,
        kind: IssueKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            record: Some(record),
            field: Some(field.into()),
            severity,
            kind,
            message: message.into(),
        }
    }

    /// Create a table-level issue
    pub fn for_table(
        field: Option<String>,
        severity: Severity,
        kind: IssueKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            record: None,
            field,
            severity,
            kind,
            message: message.into(),
        }
    }

    /// Whether the issue marks an empty field that completion could fill
    pub fn is_missing_value(&self) -> bool {
        matches!(
            self.kind,
            IssueKind::MissingRequired | IssueKind::MissingOptional
        )
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.record, &self.field) {
            (Some(row), Some(field)) => {
                write!(f, "[{}] row {} {}: {}", self.severity, row, field, self.message)
            }
            (Some(row), None) => write!(f, "[{}] row {}: {}", self.severity, row, self.message),
            (None, Some(field)) => write!(f, "[{}] {}: {}", self.severity, field, self.message),
            (None, None) => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}
