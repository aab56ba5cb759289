//! Optimization advice over completed BOM data
//!
//! The advisor is read-only: it aggregates records by supplier and
//! category, sends the aggregate (never raw rows) to the proposer in a
//! single call, and returns advisory suggestions. Failures degrade to an
//! empty suggestion list with a warning.

mod aggregate;
mod types;

pub use aggregate::{CategorySummary, CostAggregate, SupplierSummary, UNASSIGNED};
pub use types::{AdvisorOutcome, OptimizationSuggestion, SuggestionCategory};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::Record;
use crate::proposer::FieldProposer;

/// Advisor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Run the advisor in the full pipeline
    pub enabled: bool,
    /// Minimum aggregable lines before a call is made
    pub min_lines: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_lines: 1,
        }
    }
}

/// Requests optimization suggestions for a record set
pub struct OptimizationAdvisor<P: FieldProposer> {
    proposer: P,
    config: AdvisorConfig,
}

impl<P: FieldProposer> OptimizationAdvisor<P> {
    /// Create an advisor with default config
    pub fn new(proposer: P) -> Self {
        Self {
            proposer,
            config: AdvisorConfig::default(),
        }
    }

    /// Create an advisor with custom config
    pub fn with_config(proposer: P, config: AdvisorConfig) -> Self {
        Self { proposer, config }
    }

    /// Aggregate records and ask for suggestions
    ///
    /// Records are never modified.
    pub async fn suggest(&self, records: &[Record]) -> AdvisorOutcome {
        let aggregate = CostAggregate::from_records(records);

        if aggregate.is_empty() || aggregate.lines < self.config.min_lines {
            info!(lines = aggregate.lines, "Nothing to aggregate, skipping advice");
            return AdvisorOutcome {
                suggestions: Vec::new(),
                aggregate,
                warnings: vec!["No rows with cost or supplier data to analyze".to_string()],
            };
        }

        match self.proposer.advise(&aggregate).await {
            Ok(suggestions) => {
                info!(
                    suggestions = suggestions.len(),
                    suppliers = aggregate.supplier_count(),
                    "Received optimization suggestions"
                );
                let warnings = if suggestions.is_empty() {
                    vec!["Inference service returned no suggestions".to_string()]
                } else {
                    Vec::new()
                };
                AdvisorOutcome {
                    suggestions,
                    aggregate,
                    warnings,
                }
            }
            Err(e) => {
                warn!(error = %e, "Optimization advice unavailable");
                AdvisorOutcome {
                    suggestions: Vec::new(),
                    aggregate,
                    warnings: vec![format!("Optimization advice unavailable: {}", e)],
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::proposer::{ProposalRequest, ProposalResponse, ProposeError, ProposeResult};

    struct StubAdvice {
        result: Result<Vec<OptimizationSuggestion>, ProposeError>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FieldProposer for StubAdvice {
        async fn propose(&self, _request: &ProposalRequest) -> ProposeResult<ProposalResponse> {
            Ok(ProposalResponse::default())
        }

        async fn advise(&self, _aggregate: &CostAggregate) -> ProposeResult<Vec<OptimizationSuggestion>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }

        fn source(&self) -> &str {
            "stub"
        }
    }

    fn records() -> Vec<Record> {
        vec![
            Record::new()
                .with("part_number", "R1")
                .with("supplier", "Mouser")
                .with("total_cost", 1.5),
            Record::new()
                .with("part_number", "R2")
                .with("supplier", "Arrow")
                .with("total_cost", 2.0),
        ]
    }

    #[tokio::test]
    async fn test_suggest_returns_suggestions() {
        let stub = StubAdvice {
            result: Ok(vec![OptimizationSuggestion {
                category: SuggestionCategory::SupplierConsolidation,
                recommendation: "Consolidate on Mouser".to_string(),
                affected_parts: vec!["R2".to_string()],
                ..Default::default()
            }]),
            calls: AtomicUsize::new(0),
        };
        let advisor = OptimizationAdvisor::new(stub);
        let input = records();
        let outcome = advisor.suggest(&input).await;

        assert_eq!(outcome.suggestions.len(), 1);
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.aggregate.supplier_count(), 2);
        assert_eq!(input, records());
    }

    #[tokio::test]
    async fn test_suggest_degrades_on_failure() {
        let stub = StubAdvice {
            result: Err(ProposeError::Parse("not an array".to_string())),
            calls: AtomicUsize::new(0),
        };
        let advisor = OptimizationAdvisor::new(stub);
        let outcome = advisor.suggest(&records()).await;

        assert!(outcome.suggestions.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("unavailable"));
    }

    #[tokio::test]
    async fn test_no_call_when_nothing_aggregable() {
        let stub = StubAdvice {
            result: Ok(Vec::new()),
            calls: AtomicUsize::new(0),
        };
        let advisor = OptimizationAdvisor::new(stub);
        let outcome = advisor
            .suggest(&[Record::new().with("part_number", "R1")])
            .await;

        assert!(outcome.suggestions.is_empty());
        assert_eq!(advisor.proposer.calls.load(Ordering::SeqCst), 0);
    }
}
