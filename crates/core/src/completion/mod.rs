//! AI-assisted completion of missing BOM fields
//!
//! The [`CompletionEngine`] takes records and their validation report,
//! submits the most incomplete rows to a [`FieldProposer`](crate::proposer::FieldProposer)
//! in batches, and merges proposed values into empty fields only.
//!
//! Failures are local: a failed batch leaves its rows untouched and its
//! fields are reported in [`CompletionOutcome::skipped`].

mod config;
mod engine;
mod progress;
mod types;

pub use config::{CONTEXT_FIELDS, CompletionConfig};
pub use engine::CompletionEngine;
pub use progress::{CompletionProgress, NoProgress};
pub use types::{CompletionOutcome, CompletionSuggestion, SkipReason, SkippedField};
