//! Configuration for AI-assisted completion

use serde::{Deserialize, Serialize};

/// Fields copied from other rows into the prompt as reference
pub const CONTEXT_FIELDS: &[&str] = &[
    "part_number",
    "description",
    "category",
    "manufacturer",
    "supplier",
];

/// Completion engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Run completion in the full pipeline
    pub enabled: bool,
    /// Maximum rows submitted per invocation
    pub max_rows: usize,
    /// Maximum rows per request
    pub batch_size: usize,
    /// Also fill empty optional fields (otherwise required only)
    pub complete_optional: bool,
    /// Retry a batch once when the failure is transient
    pub retry_transient: bool,
    /// Per-call timeout in seconds
    pub call_timeout_secs: u64,
    /// Proposals with a lower stated confidence are skipped
    pub min_confidence: f64,
    /// Other rows included in each request as reference
    pub context_rows: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_rows: 10,
            batch_size: 5,
            complete_optional: true,
            retry_transient: true,
            call_timeout_secs: 90,
            min_confidence: 0.0,
            context_rows: 5,
        }
    }
}

impl CompletionConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row budget
    pub fn with_max_rows(mut self, rows: usize) -> Self {
        self.max_rows = rows;
        self
    }

    /// Set rows per request (at least one)
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set whether optional fields are completed
    pub fn with_complete_optional(mut self, enabled: bool) -> Self {
        self.complete_optional = enabled;
        self
    }

    /// Set the per-call timeout
    pub fn with_call_timeout(mut self, seconds: u64) -> Self {
        self.call_timeout_secs = seconds;
        self
    }

    /// Set the confidence threshold
    pub fn with_min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Set the number of reference rows
    pub fn with_context_rows(mut self, rows: usize) -> Self {
        self.context_rows = rows;
        self
    }
}
