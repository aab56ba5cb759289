//! Completion results

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Cell, Record};
use crate::validation::ValidationReport;

/// A value proposed for an empty field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSuggestion {
    pub record: usize,
    pub field: String,
    pub value: Cell,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Where the value came from (model name)
    pub source: String,
}

/// Why a target field was left empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The call failed (after the allowed retry)
    ServiceUnavailable,
    /// The response could not be parsed
    ResponseParse,
    /// The response did not mention the row or field
    MissingFromResponse,
    /// The service answered "unknown"
    Unknown,
    /// The value does not fit the field type
    InvalidValue,
    /// The stated confidence is below the threshold
    LowConfidence,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::ServiceUnavailable => "service unavailable",
            SkipReason::ResponseParse => "unparseable response",
            SkipReason::MissingFromResponse => "missing from response",
            SkipReason::Unknown => "unknown",
            SkipReason::InvalidValue => "invalid value",
            SkipReason::LowConfidence => "low confidence",
        };
        write!(f, "{}", s)
    }
}

/// A target field that was not filled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedField {
    pub record: usize,
    pub field: String,
    pub reason: SkipReason,
}

/// Result of a completion pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    /// Records after merging
    pub records: Vec<Record>,
    /// Suggestions written into empty fields
    pub applied: Vec<CompletionSuggestion>,
    /// Target fields left empty, with the reason
    pub skipped: Vec<SkippedField>,
    /// Suggestions dropped because the field was no longer empty
    pub discarded: Vec<CompletionSuggestion>,
    /// Validation of the merged records
    pub report: ValidationReport,
    /// Requests sent, including retries
    pub calls_made: usize,
    /// Rows submitted to the service (budget consumed)
    pub rows_attempted: usize,
    /// Rows with completable gaps that were not submitted
    pub rows_unprocessed: usize,
    /// Batches submitted
    pub batches: usize,
    /// Batches whose call failed
    pub failed_batches: usize,
}

impl CompletionOutcome {
    /// Count skipped fields with a given reason
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }

    /// Check whether the budget ran out before every row was submitted
    pub fn budget_exhausted(&self) -> bool {
        self.rows_unprocessed > 0
    }
}
