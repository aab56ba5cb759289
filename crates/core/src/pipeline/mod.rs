//! Full reconciliation pipeline
//!
//! This module orchestrates the stages over one uploaded table:
//!
//! 1. **Map**: Associate headers with canonical fields and build records
//! 2. **Validate**: Derive missing totals, check rules, score completeness
//! 3. **Complete** (optional): Fill empty fields through a [`FieldProposer`]
//! 4. **Advise** (optional): Aggregate costs and request optimization advice
//!
//! # Example
//!
//! ```rust,ignore
//! use bom_reconcile_core::config::ReconcileConfig;
//! use bom_reconcile_core::pipeline::ReconcilePipeline;
//!
//! let pipeline = ReconcilePipeline::new(ReconcileConfig::default())?
//!     .with_proposer(proposer);
//! let report = pipeline.run(&table).await?;
//!
//! println!("Pipeline {} finished in {}", report.run_id, report.duration_formatted());
//! ```
//!
//! Only an unusable schema registry or non-tabular input fail the run.
//! Everything else is reported on the [`PipelineReport`].
//!
//! [`FieldProposer`]: crate::proposer::FieldProposer

mod config;
mod error;
mod executor;

pub use config::{PipelineConfig, PipelineStage};
pub use error::{PipelineError, PipelineResult};
pub use executor::{PipelineReport, ReconcilePipeline, StageOutput};

use crate::config::ReconcileConfig;
use crate::models::RawTable;

/// Map and validate a table without any inference calls
///
/// This is a convenience function for offline checks.
pub async fn run_offline(
    table: &RawTable,
    config: ReconcileConfig,
) -> PipelineResult<PipelineReport> {
    ReconcilePipeline::new(config)?.run(table).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    #[tokio::test]
    async fn test_run_offline() {
        let table = RawTable::new(
            vec!["Part No".to_string(), "Qty".to_string()],
            vec![vec![Cell::text("R1"), Cell::text("10")]],
        );
        let report = run_offline(&table, ReconcileConfig::default()).await.unwrap();

        assert_eq!(report.records[0].text("part_number"), Some("R1"));
        assert_eq!(report.records[0].number("quantity"), Some(10.0));
        assert!(report.validation.has_errors());
        assert!(report.completion.is_none());
    }
}
