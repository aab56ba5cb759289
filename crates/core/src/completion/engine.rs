//! Batched completion of empty fields

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::config::{CONTEXT_FIELDS, CompletionConfig};
use super::progress::{CompletionProgress, NoProgress};
use super::types::{CompletionOutcome, CompletionSuggestion, SkipReason, SkippedField};
use crate::models::{Cell, Record, Severity};
use crate::proposer::{
    FieldProposer, KnownValues, ProposalRequest, ProposalResponse, ProposalRow, ProposeError,
    ProposeResult, TargetField,
};
use crate::validation::{ValidationReport, Validator, check_rule};

/// Rows sharing the same target fields
#[derive(Debug, Clone, PartialEq)]
struct Batch {
    fields: Vec<String>,
    records: Vec<usize>,
}

/// Fills empty fields with values from a [`FieldProposer`]
///
/// Rows are taken in descending priority, grouped by their missing-field
/// pattern and submitted in batches. A value is written only into a field
/// that is empty at merge time.
pub struct CompletionEngine<P: FieldProposer> {
    proposer: P,
    validator: Validator,
    config: CompletionConfig,
}

impl<P: FieldProposer> CompletionEngine<P> {
    /// Create an engine with default config
    pub fn new(proposer: P, validator: Validator) -> Self {
        Self {
            proposer,
            validator,
            config: CompletionConfig::default(),
        }
    }

    /// Create an engine with custom config
    pub fn with_config(proposer: P, validator: Validator, config: CompletionConfig) -> Self {
        Self {
            proposer,
            validator,
            config,
        }
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    pub fn proposer(&self) -> &P {
        &self.proposer
    }

    /// Complete records without progress reporting
    pub async fn complete(
        &self,
        records: &[Record],
        report: &ValidationReport,
        budget: usize,
    ) -> CompletionOutcome {
        self.complete_with_progress(records, report, budget, &NoProgress)
            .await
    }

    /// Complete records, submitting at most `budget` rows
    ///
    /// The input is not modified; the outcome carries the updated records
    /// and a fresh validation report.
    pub async fn complete_with_progress(
        &self,
        records: &[Record],
        report: &ValidationReport,
        budget: usize,
        progress: &dyn CompletionProgress,
    ) -> CompletionOutcome {
        let mut updated = records.to_vec();
        let mut outcome = CompletionOutcome::default();

        let (batches, unprocessed) = self.plan(records, report, budget);
        outcome.rows_unprocessed = unprocessed;
        let planned_rows = batches.iter().map(|b| b.records.len()).sum();
        progress.started(batches.len(), planned_rows);

        for (n, batch) in batches.iter().enumerate() {
            progress.batch_started(n, &batch.records);
            outcome.batches += 1;
            outcome.rows_attempted += batch.records.len();
            let applied_before = outcome.applied.len();
            let skipped_before = outcome.skipped.len();

            let request = self.request(&updated, batch);
            match self.call(&request, n, &mut outcome.calls_made, progress).await {
                Ok(response) => self.merge(&mut updated, batch, &response, &mut outcome),
                Err(e) => {
                    warn!(batch = n, rows = batch.records.len(), error = %e, "Skipping batch");
                    outcome.failed_batches += 1;
                    let reason = e.skip_reason();
                    for &record in &batch.records {
                        for field in &batch.fields {
                            outcome.skipped.push(SkippedField {
                                record,
                                field: field.clone(),
                                reason,
                            });
                        }
                    }
                }
            }

            progress.batch_finished(
                n,
                outcome.applied.len() - applied_before,
                outcome.skipped.len() - skipped_before,
            );
        }

        outcome.report = self.validator.validate(&updated);
        outcome.records = updated;

        info!(
            applied = outcome.applied.len(),
            skipped = outcome.skipped.len(),
            discarded = outcome.discarded.len(),
            calls = outcome.calls_made,
            unprocessed = outcome.rows_unprocessed,
            "Completion pass finished"
        );
        progress.finished(
            outcome.applied.len(),
            outcome.skipped.len(),
            outcome.rows_unprocessed,
        );
        outcome
    }

    /// Target fields of a record according to the report
    fn targets(&self, record: usize, report: &ValidationReport) -> Vec<String> {
        let missing = report.missing_fields(record);
        self.validator
            .registry()
            .fields()
            .iter()
            .filter(|f| f.completable && (f.required || self.config.complete_optional))
            .filter(|f| missing.contains(&f.name.as_str()))
            .map(|f| f.name.clone())
            .collect()
    }

    /// Select rows in priority order up to the budget, then batch them
    ///
    /// The budget is spent on the highest-scoring rows first; only the
    /// selected rows are grouped by target pattern and chunked. Returns the
    /// batches to submit and the number of targeted rows left over.
    fn plan(
        &self,
        records: &[Record],
        report: &ValidationReport,
        budget: usize,
    ) -> (Vec<Batch>, usize) {
        let mut groups: Vec<Batch> = Vec::new();
        let mut index: HashMap<Vec<String>, usize> = HashMap::new();
        let mut selected = 0;
        let mut unprocessed = 0;

        for score in report.completion_order() {
            if score.record >= records.len() {
                continue;
            }
            let fields = self.targets(score.record, report);
            if fields.is_empty() {
                continue;
            }
            if selected == budget {
                unprocessed += 1;
                continue;
            }
            selected += 1;
            match index.get(&fields) {
                Some(&g) => groups[g].records.push(score.record),
                None => {
                    index.insert(fields.clone(), groups.len());
                    groups.push(Batch {
                        fields,
                        records: vec![score.record],
                    });
                }
            }
        }

        let batch_size = self.config.batch_size.max(1);
        let batches: Vec<Batch> = groups
            .into_iter()
            .flat_map(|group| {
                group
                    .records
                    .chunks(batch_size)
                    .map(|chunk| Batch {
                        fields: group.fields.clone(),
                        records: chunk.to_vec(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        debug!(
            batches = batches.len(),
            selected, unprocessed, "Planned completion batches"
        );
        (batches, unprocessed)
    }

    fn request(&self, records: &[Record], batch: &Batch) -> ProposalRequest {
        let registry = self.validator.registry();
        let rows = batch
            .records
            .iter()
            .filter_map(|&i| {
                records.get(i).map(|record| ProposalRow {
                    record: i,
                    known: record
                        .ordered(registry)
                        .filter(|(_, c)| !c.is_empty())
                        .map(|(k, v)| (k.to_string(), v.clone()))
                        .collect(),
                })
            })
            .collect();

        let targets = batch
            .fields
            .iter()
            .filter_map(|name| registry.field(name))
            .map(|spec| TargetField {
                name: spec.name.clone(),
                field_type: spec.field_type,
                description: spec.description.clone(),
            })
            .collect();

        let context = records
            .iter()
            .enumerate()
            .filter(|(i, _)| !batch.records.contains(i))
            .map(|(_, record)| {
                record
                    .ordered(registry)
                    .filter(|(f, c)| CONTEXT_FIELDS.contains(f) && !c.is_empty())
                    .map(|(f, c)| (f.to_string(), c.clone()))
                    .collect::<KnownValues>()
            })
            .filter(|known| !known.is_empty())
            .take(self.config.context_rows)
            .collect();

        ProposalRequest {
            rows,
            targets,
            context,
        }
    }

    /// Submit a request, retrying once on a transient failure
    async fn call(
        &self,
        request: &ProposalRequest,
        batch: usize,
        calls_made: &mut usize,
        progress: &dyn CompletionProgress,
    ) -> ProposeResult<ProposalResponse> {
        let attempts = if self.config.retry_transient { 2 } else { 1 };
        let limit = Duration::from_secs(self.config.call_timeout_secs);
        let mut attempt = 0;

        loop {
            attempt += 1;
            *calls_made += 1;
            let result = match timeout(limit, self.proposer.propose(request)).await {
                Ok(result) => result,
                Err(_) => Err(ProposeError::Timeout(self.config.call_timeout_secs)),
            };
            match result {
                Err(e) if e.is_transient() && attempt < attempts => {
                    debug!(batch, attempt, error = %e, "Retrying batch");
                    progress.retrying(batch, &e.to_string());
                }
                other => return other,
            }
        }
    }

    fn merge(
        &self,
        records: &mut [Record],
        batch: &Batch,
        response: &ProposalResponse,
        outcome: &mut CompletionOutcome,
    ) {
        let source = self.proposer.source().to_string();

        for &index in &batch.records {
            for field in &batch.fields {
                let cell = match self.accept(index, field, response) {
                    Ok(cell) => cell,
                    Err(reason) => {
                        debug!(record = index, field = %field, %reason, "Field skipped");
                        outcome.skipped.push(SkippedField {
                            record: index,
                            field: field.clone(),
                            reason,
                        });
                        continue;
                    }
                };

                let suggestion = CompletionSuggestion {
                    record: index,
                    field: field.clone(),
                    value: cell.clone(),
                    confidence: response.value(index, field).and_then(|v| v.confidence),
                    source: source.clone(),
                };
                let filled = records
                    .get_mut(index)
                    .is_some_and(|record| record.fill_if_empty(field, cell));
                if filled {
                    outcome.applied.push(suggestion);
                } else {
                    outcome.discarded.push(suggestion);
                }
            }
        }
    }

    /// Resolve the proposed value for one field, or the reason it is skipped
    fn accept(
        &self,
        record: usize,
        field: &str,
        response: &ProposalResponse,
    ) -> Result<Cell, SkipReason> {
        let proposed = response
            .value(record, field)
            .ok_or(SkipReason::MissingFromResponse)?;
        if proposed.is_unknown() {
            return Err(SkipReason::Unknown);
        }
        if let Some(confidence) = proposed.confidence
            && confidence < self.config.min_confidence
        {
            return Err(SkipReason::LowConfidence);
        }

        let spec = self
            .validator
            .registry()
            .field(field)
            .ok_or(SkipReason::InvalidValue)?;
        let cell = proposed
            .to_cell()
            .map(|cell| spec.field_type.coerce(cell))
            .ok_or(SkipReason::InvalidValue)?;
        if cell.is_empty() || !spec.field_type.accepts(&cell) {
            return Err(SkipReason::InvalidValue);
        }
        if let Some(finding) = check_rule(spec.rule, &cell, self.validator.config())
            && finding.severity == Severity::Error
        {
            return Err(SkipReason::InvalidValue);
        }
        Ok(cell)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::IssueKind;
    use crate::proposer::ProposedValue;
    use crate::schema::SchemaRegistry;

    /// Returns scripted results in order and records every request
    struct Scripted {
        results: Mutex<VecDeque<ProposeResult<ProposalResponse>>>,
        requests: Mutex<Vec<ProposalRequest>>,
    }

    impl Scripted {
        fn new(results: Vec<ProposeResult<ProposalResponse>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<ProposalRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FieldProposer for Scripted {
        async fn propose(&self, request: &ProposalRequest) -> ProposeResult<ProposalResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProposeError::unavailable("script exhausted")))
        }

        fn source(&self) -> &str {
            "scripted"
        }
    }

    fn line(part: &str) -> Record {
        Record::blank(&SchemaRegistry::bom())
            .with("part_number", part)
            .with("description", "Resistor 10k 0603")
            .with("quantity", 10.0)
            .with("unit_cost", 0.1)
            .with("total_cost", 1.0)
            .with("manufacturer", "Yageo")
            .with("manufacturer_part_number", "RC0603FR-0710KL")
            .with("lead_time_days", 14.0)
            .with("category", "Resistor")
            .with("datasheet_url", "https://example.com/rc0603.pdf")
            .with("notes", "n/a")
    }

    fn engine(results: Vec<ProposeResult<ProposalResponse>>) -> CompletionEngine<Scripted> {
        engine_with(results, CompletionConfig::default())
    }

    fn engine_with(
        results: Vec<ProposeResult<ProposalResponse>>,
        config: CompletionConfig,
    ) -> CompletionEngine<Scripted> {
        CompletionEngine::with_config(
            Scripted::new(results),
            Validator::new(SchemaRegistry::bom()),
            config,
        )
    }

    #[tokio::test]
    async fn test_fills_empty_field() {
        let records = vec![line("R1")];
        let engine = engine(vec![Ok(
            ProposalResponse::default().with_value(0, "supplier", ProposedValue::plain("Digi-Key"))
        )]);
        let report = engine.validator.validate(&records);

        let outcome = engine.complete(&records, &report, 10).await;

        assert_eq!(outcome.applied.len(), 1);
        assert_eq!(outcome.records[0].text("supplier"), Some("Digi-Key"));
        assert_eq!(outcome.applied[0].source, "scripted");
        assert_eq!(outcome.calls_made, 1);
        assert!(outcome.report.missing_fields(0).is_empty());
        // input untouched
        assert!(records[0].is_missing("supplier"));
    }

    #[tokio::test]
    async fn test_never_overwrites_filled_field() {
        let records = vec![line("R1")];
        let engine = engine(vec![Ok(ProposalResponse::default()
            .with_value(0, "supplier", ProposedValue::plain("Mouser"))
            .with_value(0, "manufacturer", ProposedValue::plain("Vishay")))]);
        let report = engine.validator.validate(&records);

        let outcome = engine.complete(&records, &report, 10).await;

        assert_eq!(outcome.records[0].text("manufacturer"), Some("Yageo"));
        assert_eq!(outcome.records[0].text("supplier"), Some("Mouser"));
        assert_eq!(outcome.applied.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_report_value_is_discarded() {
        let records = vec![line("R1")];
        let engine = engine(vec![Ok(
            ProposalResponse::default().with_value(0, "supplier", ProposedValue::plain("Mouser"))
        )]);
        let report = engine.validator.validate(&records);
        let filled = vec![line("R1").with("supplier", "Arrow")];

        let outcome = engine.complete(&filled, &report, 10).await;

        assert!(outcome.applied.is_empty());
        assert_eq!(outcome.discarded.len(), 1);
        assert_eq!(outcome.records[0].text("supplier"), Some("Arrow"));
    }

    #[tokio::test]
    async fn test_missing_supplier_skipped_and_issue_persists() {
        let records = vec![line("R1").with("category", Cell::Empty)];
        let engine = engine(vec![Ok(
            ProposalResponse::default().with_value(0, "category", ProposedValue::plain("Resistor"))
        )]);
        let report = engine.validator.validate(&records);

        let outcome = engine.complete(&records, &report, 10).await;

        assert_eq!(outcome.skipped_for(SkipReason::MissingFromResponse), 1);
        assert!(outcome.records[0].is_missing("supplier"));
        assert_eq!(outcome.records[0].text("category"), Some("Resistor"));
        let persisting: Vec<_> = outcome
            .report
            .issues_for(0)
            .filter(|i| i.field.as_deref() == Some("supplier"))
            .collect();
        assert_eq!(persisting.len(), 1);
        assert_eq!(persisting[0].severity, Severity::Info);
        assert_eq!(persisting[0].kind, IssueKind::MissingOptional);
    }

    #[tokio::test]
    async fn test_two_timeouts_skip_batch() {
        let records = vec![line("R1"), line("R2"), line("R3")];
        let engine = engine(vec![
            Err(ProposeError::Timeout(90)),
            Err(ProposeError::Timeout(90)),
        ]);
        let report = engine.validator.validate(&records);

        let outcome = engine.complete(&records, &report, 10).await;

        assert_eq!(outcome.calls_made, 2);
        assert_eq!(outcome.failed_batches, 1);
        assert_eq!(outcome.rows_attempted, 3);
        assert_eq!(outcome.skipped_for(SkipReason::ServiceUnavailable), 3);
        assert_eq!(outcome.records, records);
    }

    #[tokio::test]
    async fn test_transient_failure_retried_once() {
        let records = vec![line("R1")];
        let engine = engine(vec![
            Err(ProposeError::transient("503")),
            Ok(ProposalResponse::default().with_value(0, "supplier", ProposedValue::plain("Arrow"))),
        ]);
        let report = engine.validator.validate(&records);

        let outcome = engine.complete(&records, &report, 10).await;

        assert_eq!(outcome.calls_made, 2);
        assert_eq!(outcome.failed_batches, 0);
        assert_eq!(outcome.records[0].text("supplier"), Some("Arrow"));
    }

    #[tokio::test]
    async fn test_parse_error_not_retried() {
        let records = vec![line("R1")];
        let engine = engine(vec![Err(ProposeError::Parse("no rows".into()))]);
        let report = engine.validator.validate(&records);

        let outcome = engine.complete(&records, &report, 10).await;

        assert_eq!(outcome.calls_made, 1);
        assert_eq!(outcome.skipped_for(SkipReason::ResponseParse), 1);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let records = vec![line("R1")];
        let engine = engine(vec![Err(ProposeError::unavailable("401"))]);
        let report = engine.validator.validate(&records);

        let outcome = engine.complete(&records, &report, 10).await;

        assert_eq!(outcome.calls_made, 1);
        assert_eq!(outcome.failed_batches, 1);
    }

    #[tokio::test]
    async fn test_budget_truncates_last_batch() {
        let records: Vec<Record> = (0..7).map(|i| line(&format!("R{}", i))).collect();
        let config = CompletionConfig::new().with_batch_size(3);
        let engine = engine_with(
            vec![Ok(ProposalResponse::default()), Ok(ProposalResponse::default())],
            config,
        );
        let report = engine.validator.validate(&records);

        let outcome = engine.complete(&records, &report, 4).await;

        assert_eq!(outcome.batches, 2);
        assert_eq!(outcome.rows_attempted, 4);
        assert_eq!(outcome.rows_unprocessed, 3);
        assert!(outcome.budget_exhausted());
        let sizes: Vec<usize> = engine
            .proposer
            .requests()
            .iter()
            .map(|r| r.rows.len())
            .collect();
        assert_eq!(sizes, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_budget_spent_on_highest_scores_across_patterns() {
        let records = vec![
            // score 4: quantity (not completable) and supplier missing
            line("R0").with("quantity", Cell::Empty),
            // score 1: supplier missing
            line("R1"),
            // score 2: manufacturer and category missing
            line("R2")
                .with("supplier", "Mouser")
                .with("manufacturer", Cell::Empty)
                .with("category", Cell::Empty),
        ];
        let engine = engine(vec![
            Ok(ProposalResponse::default()),
            Ok(ProposalResponse::default()),
        ]);
        let report = engine.validator.validate(&records);
        let order: Vec<(usize, u32)> = report
            .completion_order()
            .iter()
            .map(|s| (s.record, s.score))
            .collect();
        assert_eq!(order, vec![(0, 4), (2, 2), (1, 1)]);

        let outcome = engine.complete(&records, &report, 2).await;

        let sent: Vec<Vec<usize>> = engine
            .proposer
            .requests()
            .iter()
            .map(|r| r.records())
            .collect();
        assert_eq!(sent, vec![vec![0], vec![2]]);
        assert_eq!(outcome.rows_attempted, 2);
        assert_eq!(outcome.rows_unprocessed, 1);
        assert_eq!(outcome.records[1], records[1]);
    }

    /// Never answers within the call timeout
    struct Stalled;

    #[async_trait]
    impl FieldProposer for Stalled {
        async fn propose(&self, _request: &ProposalRequest) -> ProposeResult<ProposalResponse> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(ProposalResponse::default())
        }

        fn source(&self) -> &str {
            "stalled"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout_elapses_twice() {
        let records = vec![line("R1"), line("R2")];
        let engine = CompletionEngine::with_config(
            Stalled,
            Validator::new(SchemaRegistry::bom()),
            CompletionConfig::new().with_call_timeout(5),
        );
        let report = engine.validator.validate(&records);

        let outcome = engine.complete(&records, &report, 10).await;

        assert_eq!(outcome.calls_made, 2);
        assert_eq!(outcome.failed_batches, 1);
        assert!(outcome.applied.is_empty());
        assert_eq!(outcome.skipped.len(), 2);
        assert!(
            outcome
                .skipped
                .iter()
                .all(|s| s.reason == SkipReason::ServiceUnavailable)
        );
        assert_eq!(outcome.records, records);
    }

    #[tokio::test]
    async fn test_rows_ordered_by_priority_and_grouped_by_pattern() {
        let records = vec![
            line("R0"),
            line("R1").with("description", Cell::Empty),
            line("R2"),
        ];
        let engine = engine(vec![
            Ok(ProposalResponse::default()),
            Ok(ProposalResponse::default()),
        ]);
        let report = engine.validator.validate(&records);

        engine.complete(&records, &report, 10).await;

        let requests = engine.proposer.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].records(), vec![1]);
        let targets: Vec<&str> = requests[0].targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(targets, vec!["description", "supplier"]);
        assert_eq!(requests[1].records(), vec![0, 2]);
    }

    #[tokio::test]
    async fn test_request_carries_known_fields_and_context() {
        let records = vec![line("R0"), line("R1").with("supplier", "Mouser")];
        let engine = engine(vec![Ok(ProposalResponse::default())]);
        let report = engine.validator.validate(&records);

        engine.complete(&records, &report, 10).await;

        let request = &engine.proposer.requests()[0];
        assert_eq!(request.records(), vec![0]);
        assert!(!request.rows[0].known.contains_key("supplier"));
        assert_eq!(
            request.rows[0].known.get("part_number"),
            Some(&Cell::text("R0"))
        );
        assert_eq!(request.context.len(), 1);
        assert_eq!(request.context[0].get("supplier"), Some(&Cell::text("Mouser")));
        assert!(!request.context[0].contains_key("notes"));
    }

    #[tokio::test]
    async fn test_request_fields_follow_registry_order() {
        let records = vec![line("R0"), line("R1").with("supplier", "Mouser")];
        let engine = engine(vec![Ok(ProposalResponse::default())]);
        let report = engine.validator.validate(&records);

        engine.complete(&records, &report, 10).await;

        let request = &engine.proposer.requests()[0];
        assert_eq!(
            request.rows[0].known.fields(),
            vec![
                "part_number",
                "description",
                "quantity",
                "unit_cost",
                "total_cost",
                "manufacturer",
                "manufacturer_part_number",
                "lead_time_days",
                "category",
                "datasheet_url",
                "notes",
            ]
        );
        assert_eq!(
            request.context[0].fields(),
            vec!["part_number", "description", "supplier", "manufacturer", "category"]
        );
    }

    #[tokio::test]
    async fn test_non_completable_fields_not_requested() {
        let records = vec![line("R1")
            .with("quantity", Cell::Empty)
            .with("notes", Cell::Empty)];
        let engine = engine(vec![Ok(ProposalResponse::default())]);
        let report = engine.validator.validate(&records);

        engine.complete(&records, &report, 10).await;

        let targets: Vec<String> = engine.proposer.requests()[0]
            .targets
            .iter()
            .map(|t| t.name.clone())
            .collect();
        assert_eq!(targets, vec!["supplier".to_string()]);
    }

    #[tokio::test]
    async fn test_required_only_when_optional_disabled() {
        let records = vec![line("R1")];
        let config = CompletionConfig::new().with_complete_optional(false);
        let engine = engine_with(Vec::new(), config);
        let report = engine.validator.validate(&records);

        let outcome = engine.complete(&records, &report, 10).await;

        assert_eq!(outcome.calls_made, 0);
        assert_eq!(outcome.rows_unprocessed, 0);
    }

    #[tokio::test]
    async fn test_unknown_invalid_and_low_confidence_skipped() {
        let records = vec![line("R1")
            .with("manufacturer", Cell::Empty)
            .with("unit_cost", Cell::Empty)
            .with("lead_time_days", Cell::Empty)];
        let config = CompletionConfig::new().with_min_confidence(0.5);
        let engine = engine_with(
            vec![Ok(ProposalResponse::default()
                .with_value(0, "supplier", ProposedValue::plain("unknown"))
                .with_value(0, "unit_cost", ProposedValue::plain("cheap"))
                .with_value(0, "manufacturer", ProposedValue::with_confidence("Yageo", 0.2))
                .with_value(0, "lead_time_days", ProposedValue::with_confidence("21", 0.9)))],
            config,
        );
        let report = engine.validator.validate(&records);

        let outcome = engine.complete(&records, &report, 10).await;

        assert_eq!(outcome.skipped_for(SkipReason::Unknown), 1);
        assert_eq!(outcome.skipped_for(SkipReason::InvalidValue), 1);
        assert_eq!(outcome.skipped_for(SkipReason::LowConfidence), 1);
        assert_eq!(outcome.applied.len(), 1);
        assert_eq!(outcome.records[0].number("lead_time_days"), Some(21.0));
        assert_eq!(outcome.applied[0].confidence, Some(0.9));
    }

    #[tokio::test]
    async fn test_rule_violation_is_invalid_value() {
        let records = vec![line("R1").with("unit_cost", Cell::Empty)];
        let engine = engine(vec![Ok(ProposalResponse::default()
            .with_value(0, "unit_cost", ProposedValue::plain(-3.0))
            .with_value(0, "supplier", ProposedValue::plain("Mouser")))]);
        let report = engine.validator.validate(&records);

        let outcome = engine.complete(&records, &report, 10).await;

        assert_eq!(outcome.skipped_for(SkipReason::InvalidValue), 1);
        assert!(outcome.records[0].is_missing("unit_cost"));
    }

    #[tokio::test]
    async fn test_priority_score_never_increases() {
        let records = vec![
            line("R1").with("description", Cell::Empty),
            line("R2").with("category", Cell::Empty),
        ];
        let engine = engine(vec![
            Ok(ProposalResponse::default()
                .with_value(0, "description", ProposedValue::plain("Capacitor 100nF"))
                .with_value(0, "supplier", ProposedValue::plain("Digi-Key"))),
            Ok(ProposalResponse::default().with_value(1, "category", ProposedValue::plain("junk"))),
        ]);
        let report = engine.validator.validate(&records);

        let outcome = engine.complete(&records, &report, 10).await;

        for before in &report.scores {
            let after = outcome.report.score(before.record).unwrap();
            assert!(after.score <= before.score);
        }
        assert!(outcome.report.total_score() < report.total_score());
    }

    #[tokio::test]
    async fn test_zero_budget_makes_no_calls() {
        let records = vec![line("R1"), line("R2")];
        let engine = engine(Vec::new());
        let report = engine.validator.validate(&records);

        let outcome = engine.complete(&records, &report, 0).await;

        assert_eq!(outcome.calls_made, 0);
        assert_eq!(outcome.rows_unprocessed, 2);
        assert_eq!(outcome.records, records);
    }
}
