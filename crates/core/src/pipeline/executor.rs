//! Pipeline executor for running a full reconciliation

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use super::config::PipelineStage;
use super::error::{PipelineError, PipelineResult};
use crate::advisor::{AdvisorOutcome, OptimizationAdvisor};
use crate::completion::{CompletionEngine, CompletionOutcome, CompletionProgress, NoProgress};
use crate::config::ReconcileConfig;
use crate::mapping::{ColumnMapper, ColumnMapping};
use crate::models::{Issue, RawTable, Record};
use crate::proposer::FieldProposer;
use crate::schema::SchemaRegistry;
use crate::validation::{ValidationReport, Validator, derive_total_costs};

/// What happened to one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
    pub stage: PipelineStage,
    /// Whether the stage was skipped
    pub skipped: bool,
    /// Reason for skipping (if applicable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl StageOutput {
    fn ran(stage: PipelineStage, start: Instant) -> Self {
        Self {
            stage,
            skipped: false,
            skip_reason: None,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn skipped(stage: PipelineStage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            skipped: true,
            skip_reason: Some(reason.into()),
            duration_ms: 0,
        }
    }
}

/// Report from a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Run ID
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Stages in execution order
    pub stages: Vec<StageOutput>,
    /// Header-to-field mapping
    pub mapping: ColumnMapping,
    /// Mapping gap issues
    pub mapping_issues: Vec<Issue>,
    /// total_cost cells derived from quantity × unit_cost
    pub derived_totals: usize,
    /// Validation before completion
    pub initial: ValidationReport,
    /// Records after the last mutating stage
    pub records: Vec<Record>,
    /// Validation of `records`
    pub validation: ValidationReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<AdvisorOutcome>,
}

impl PipelineReport {
    /// Total duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at).num_milliseconds().max(0) as u64
    }

    /// Get formatted duration
    pub fn duration_formatted(&self) -> String {
        let ms = self.duration_ms();
        let secs = ms / 1000;
        let mins = secs / 60;
        let remaining_secs = secs % 60;

        if mins > 0 {
            format!("{}m {}s", mins, remaining_secs)
        } else if secs > 0 {
            format!("{}s", secs)
        } else {
            format!("{}ms", ms)
        }
    }

    /// Mapping gaps followed by validation issues
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.mapping_issues
            .iter()
            .chain(self.validation.issues.iter())
    }

    /// Output for a stage, if it is part of the run
    pub fn stage(&self, stage: PipelineStage) -> Option<&StageOutput> {
        self.stages.iter().find(|s| s.stage == stage)
    }
}

/// Runs mapping, validation, completion and advice over a table
///
/// Each stage takes the previous stage's records by reference and produces
/// new ones; the input table is never modified.
pub struct ReconcilePipeline {
    mapper: ColumnMapper,
    validator: Validator,
    config: ReconcileConfig,
    proposer: Option<Box<dyn FieldProposer>>,
}

impl ReconcilePipeline {
    /// Create a pipeline from configuration
    ///
    /// Fails if the configured schema registry is not usable.
    pub fn new(config: ReconcileConfig) -> PipelineResult<Self> {
        let registry = config.registry()?;
        registry.validate()?;

        Ok(Self {
            mapper: ColumnMapper::with_config(registry.clone(), config.mapping.clone()),
            validator: Validator::with_config(registry, config.validation.clone()),
            config,
            proposer: None,
        })
    }

    /// Attach the proposer used for completion and advice
    pub fn with_proposer(mut self, proposer: impl FieldProposer + 'static) -> Self {
        self.proposer = Some(Box::new(proposer));
        self
    }

    /// Attach an already boxed proposer
    pub fn with_boxed_proposer(mut self, proposer: Box<dyn FieldProposer>) -> Self {
        self.proposer = Some(proposer);
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        self.validator.registry()
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Run the pipeline
    pub async fn run(&self, table: &RawTable) -> PipelineResult<PipelineReport> {
        self.run_with_progress(table, &NoProgress).await
    }

    /// Run the pipeline, reporting completion progress
    pub async fn run_with_progress(
        &self,
        table: &RawTable,
        progress: &dyn CompletionProgress,
    ) -> PipelineResult<PipelineReport> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let stages = self.config.pipeline.effective_stages();
        let mut outputs = Vec::with_capacity(stages.len());

        info!(
            run_id = %run_id,
            rows = table.row_count(),
            stages = ?stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            "Starting pipeline"
        );

        // Map
        let start = Instant::now();
        let mapped = {
            let _span = info_span!("pipeline_stage", run_id = %run_id, stage = "map").entered();
            self.mapper.map_table(table).map_err(PipelineError::from)?
        };
        outputs.push(StageOutput::ran(PipelineStage::Map, start));
        let mut records = mapped.records;

        // Validate
        let start = Instant::now();
        let (derived_totals, initial) = {
            let _span =
                info_span!("pipeline_stage", run_id = %run_id, stage = "validate").entered();
            let derived = if self.config.pipeline.derive_totals {
                derive_total_costs(&mut records)
            } else {
                0
            };
            (derived, self.validator.validate(&records))
        };
        outputs.push(StageOutput::ran(PipelineStage::Validate, start));

        // Complete
        let mut validation = initial.clone();
        let mut completion = None;
        if stages.contains(&PipelineStage::Complete) {
            match self.completion_skip_reason(&initial) {
                Some(reason) => {
                    debug!(reason = %reason, "Skipping completion");
                    outputs.push(StageOutput::skipped(PipelineStage::Complete, reason));
                }
                None => {
                    let start = Instant::now();
                    let outcome = self
                        .complete(&records, &initial, progress)
                        .instrument(info_span!("pipeline_stage", run_id = %run_id, stage = "complete"))
                        .await;
                    outputs.push(StageOutput::ran(PipelineStage::Complete, start));
                    records = outcome.records.clone();
                    validation = outcome.report.clone();
                    completion = Some(outcome);
                }
            }
        }

        // Advise
        let mut advice = None;
        if stages.contains(&PipelineStage::Advise) {
            match self.advice_skip_reason() {
                Some(reason) => {
                    debug!(reason = %reason, "Skipping advice");
                    outputs.push(StageOutput::skipped(PipelineStage::Advise, reason));
                }
                None => {
                    let start = Instant::now();
                    let outcome = self
                        .advise(&records)
                        .instrument(info_span!("pipeline_stage", run_id = %run_id, stage = "advise"))
                        .await;
                    outputs.push(StageOutput::ran(PipelineStage::Advise, start));
                    advice = Some(outcome);
                }
            }
        }

        let report = PipelineReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            stages: outputs,
            mapping: mapped.mapping,
            mapping_issues: mapped.issues,
            derived_totals,
            initial,
            records,
            validation,
            completion,
            advice,
        };

        info!(
            run_id = %report.run_id,
            duration_ms = report.duration_ms(),
            issues = report.validation.issues.len(),
            score = report.validation.total_score(),
            "Pipeline completed"
        );
        Ok(report)
    }

    fn completion_skip_reason(&self, report: &ValidationReport) -> Option<String> {
        if !self.config.completion.enabled {
            Some("completion disabled".to_string())
        } else if self.proposer.is_none() {
            Some("no inference service configured".to_string())
        } else if report.completion_order().is_empty() {
            Some("no missing fields".to_string())
        } else {
            None
        }
    }

    fn advice_skip_reason(&self) -> Option<String> {
        if !self.config.advisor.enabled {
            Some("advice disabled".to_string())
        } else if self.proposer.is_none() {
            Some("no inference service configured".to_string())
        } else {
            None
        }
    }

    async fn complete(
        &self,
        records: &[Record],
        report: &ValidationReport,
        progress: &dyn CompletionProgress,
    ) -> CompletionOutcome {
        let Some(proposer) = self.proposer.as_deref() else {
            return CompletionOutcome::default();
        };
        let engine = CompletionEngine::with_config(
            proposer,
            self.validator.clone(),
            self.config.completion.clone(),
        );
        engine
            .complete_with_progress(records, report, self.config.completion.max_rows, progress)
            .await
    }

    async fn advise(&self, records: &[Record]) -> AdvisorOutcome {
        let Some(proposer) = self.proposer.as_deref() else {
            return AdvisorOutcome::default();
        };
        OptimizationAdvisor::with_config(proposer, self.config.advisor.clone())
            .suggest(records)
            .await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::advisor::{CostAggregate, OptimizationSuggestion};
    use crate::models::Cell;
    use crate::pipeline::PipelineConfig;
    use crate::proposer::{
        ProposalRequest, ProposalResponse, ProposeResult, ProposedValue,
    };

    /// Proposes "Digi-Key" for every requested supplier
    struct SupplierStub;

    #[async_trait]
    impl FieldProposer for SupplierStub {
        async fn propose(&self, request: &ProposalRequest) -> ProposeResult<ProposalResponse> {
            let mut response = ProposalResponse::default();
            for row in &request.rows {
                for target in &request.targets {
                    if target.name == "supplier" {
                        response = response.with_value(
                            row.record,
                            "supplier",
                            ProposedValue::plain("Digi-Key"),
                        );
                    }
                }
            }
            Ok(response)
        }

        async fn advise(&self, _aggregate: &CostAggregate) -> ProposeResult<Vec<OptimizationSuggestion>> {
            Ok(vec![OptimizationSuggestion {
                recommendation: "Consolidate on Digi-Key".to_string(),
                ..Default::default()
            }])
        }

        fn source(&self) -> &str {
            "stub"
        }
    }

    fn table() -> RawTable {
        RawTable::new(
            vec![
                "Part No".to_string(),
                "Description".to_string(),
                "Qty".to_string(),
                "Unit Price".to_string(),
            ],
            vec![
                vec![
                    Cell::text("R1"),
                    Cell::text("Resistor 10k 0603"),
                    Cell::text("10"),
                    Cell::text("0.10"),
                ],
                vec![
                    Cell::text("C1"),
                    Cell::text("Capacitor 100nF"),
                    Cell::number(4.0),
                    Cell::Empty,
                ],
            ],
        )
    }

    #[tokio::test]
    async fn test_run_without_proposer_skips_ai_stages() {
        let pipeline = ReconcilePipeline::new(ReconcileConfig::default()).unwrap();
        let report = pipeline.run(&table()).await.unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.derived_totals, 1);
        assert_eq!(report.records[0].number("total_cost"), Some(1.0));
        assert!(report.stage(PipelineStage::Complete).unwrap().skipped);
        assert!(report.stage(PipelineStage::Advise).unwrap().skipped);
        assert!(report.completion.is_none());
        assert_eq!(report.initial, report.validation);
        assert!(!report.run_id.is_empty());
    }

    #[tokio::test]
    async fn test_run_with_proposer_completes_and_advises() {
        let pipeline = ReconcilePipeline::new(ReconcileConfig::default())
            .unwrap()
            .with_proposer(SupplierStub);
        let report = pipeline.run(&table()).await.unwrap();

        let completion = report.completion.as_ref().unwrap();
        assert_eq!(completion.applied.len(), 2);
        assert!(report.records.iter().all(|r| r.text("supplier") == Some("Digi-Key")));
        assert!(report.validation.total_score() < report.initial.total_score());
        assert_eq!(report.advice.as_ref().unwrap().suggestions.len(), 1);
    }

    #[tokio::test]
    async fn test_selected_stages_only() {
        let mut config = ReconcileConfig::default();
        config.pipeline = PipelineConfig::new().with_stages(vec![PipelineStage::Complete]);
        let pipeline = ReconcilePipeline::new(config).unwrap().with_proposer(SupplierStub);
        let report = pipeline.run(&table()).await.unwrap();

        assert!(report.stage(PipelineStage::Advise).is_none());
        assert!(report.completion.is_some());
    }

    #[tokio::test]
    async fn test_not_tabular_is_fatal() {
        let pipeline = ReconcilePipeline::new(ReconcileConfig::default()).unwrap();
        let ragged = RawTable::new(
            vec!["Part No".to_string()],
            vec![vec![Cell::text("R1"), Cell::text("extra")]],
        );
        let result = pipeline.run(&ragged).await;
        assert!(matches!(result, Err(PipelineError::NotTabular(_))));
    }

    #[test]
    fn test_unusable_schema_is_fatal() {
        let mut config = ReconcileConfig::default();
        config.schema.required = Some(vec!["colour".to_string()]);
        assert!(matches!(
            ReconcilePipeline::new(config),
            Err(PipelineError::Schema(_))
        ));
    }
}
