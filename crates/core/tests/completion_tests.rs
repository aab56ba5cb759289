//! Completion and advice through the public API

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bom_reconcile_core::advisor::OptimizationAdvisor;
use bom_reconcile_core::completion::{
    CompletionConfig, CompletionEngine, CompletionProgress, SkipReason,
};
use bom_reconcile_core::llm::{LlmClient, LlmError, LlmResult};
use bom_reconcile_core::models::{Cell, Record};
use bom_reconcile_core::proposer::LlmProposer;
use bom_reconcile_core::schema::SchemaRegistry;
use bom_reconcile_core::validation::Validator;

/// LLM client returning canned text
struct CannedClient {
    replies: Mutex<VecDeque<LlmResult<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl CannedClient {
    fn new(replies: Vec<LlmResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmClient for CannedClient {
    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::ConnectionError("no reply".to_string())))
    }

    fn model_name(&self) -> &str {
        "canned"
    }

    fn max_tokens(&self) -> usize {
        8192
    }

    async fn is_ready(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct CountingProgress {
    events: Mutex<Vec<String>>,
}

impl CompletionProgress for CountingProgress {
    fn started(&self, batches: usize, rows: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("started {batches} {rows}"));
    }

    fn retrying(&self, batch: usize, _reason: &str) {
        self.events.lock().unwrap().push(format!("retry {batch}"));
    }

    fn batch_finished(&self, batch: usize, applied: usize, skipped: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("batch {batch} {applied} {skipped}"));
    }
}

fn line(part: &str, description: &str) -> Record {
    Record::blank(&SchemaRegistry::bom())
        .with("part_number", part)
        .with("description", description)
        .with("quantity", 100.0)
        .with("unit_cost", 0.01)
        .with("total_cost", 1.0)
        .with("manufacturer_part_number", "RC0603FR-0710KL")
        .with("lead_time_days", 7.0)
        .with("datasheet_url", "https://example.com/ds.pdf")
        .with("notes", "1% tolerance")
}

fn engine(client: CannedClient) -> CompletionEngine<LlmProposer<CannedClient>> {
    CompletionEngine::with_config(
        LlmProposer::new(client),
        Validator::new(SchemaRegistry::bom()),
        CompletionConfig::new().with_complete_optional(true),
    )
}

#[tokio::test]
async fn test_llm_reply_merged_into_empty_fields() {
    let records = vec![line("R1", "Resistor 10k 0603")];
    let reply = r#"Here you go:
```json
{"rows": [{"row": 0, "values": {
    "supplier": "Digi-Key",
    "manufacturer": {"value": "Yageo", "confidence": 0.95},
    "category": "Resistor"
}}]}
```"#;
    let engine = engine(CannedClient::new(vec![Ok(reply.to_string())]));
    let report = Validator::new(SchemaRegistry::bom()).validate(&records);

    let outcome = engine.complete(&records, &report, 10).await;

    let record = &outcome.records[0];
    assert_eq!(record.text("supplier"), Some("Digi-Key"));
    assert_eq!(record.text("manufacturer"), Some("Yageo"));
    assert_eq!(record.text("category"), Some("Resistor"));
    assert_eq!(outcome.applied.len(), 3);
    assert!(outcome.applied.iter().all(|s| s.source == "canned"));
    assert_eq!(outcome.report.score(0).unwrap().score, 0);

    let prompts = engine.proposer().client().prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("supplier"));
    assert!(prompts[0].contains("Resistor 10k 0603"));
}

#[tokio::test]
async fn test_unparseable_reply_skips_without_retry() {
    let records = vec![line("R1", "Resistor 10k 0603")];
    let engine = engine(CannedClient::new(vec![Ok(
        "I could not determine these values.".to_string(),
    )]));
    let report = Validator::new(SchemaRegistry::bom()).validate(&records);

    let outcome = engine.complete(&records, &report, 10).await;

    assert_eq!(outcome.calls_made, 1);
    assert_eq!(outcome.skipped_for(SkipReason::ResponseParse), 3);
    assert_eq!(outcome.records, records);
}

#[tokio::test]
async fn test_connection_error_retried_then_skipped() {
    let records = vec![
        line("R1", "Resistor 10k 0603"),
        line("R2", "Resistor 4k7 0603"),
    ];
    let engine = engine(CannedClient::new(vec![
        Err(LlmError::ConnectionError("refused".to_string())),
        Err(LlmError::Timeout(60)),
    ]));
    let report = Validator::new(SchemaRegistry::bom()).validate(&records);
    let progress = CountingProgress::default();

    let outcome = engine
        .complete_with_progress(&records, &report, 10, &progress)
        .await;

    assert_eq!(outcome.calls_made, 2);
    assert_eq!(outcome.failed_batches, 1);
    assert_eq!(outcome.rows_attempted, 2);
    assert_eq!(outcome.skipped_for(SkipReason::ServiceUnavailable), 6);
    assert_eq!(outcome.records, records);

    let events = progress.events.lock().unwrap().clone();
    assert_eq!(events, vec!["started 1 2", "retry 0", "batch 0 0 6"]);
}

#[tokio::test]
async fn test_existing_values_survive_completion() {
    let records = vec![
        line("R1", "Resistor 10k 0603").with("supplier", "Mouser"),
        line("R2", "Resistor 4k7 0603"),
    ];
    let reply = r#"{"rows": [
        {"row": 0, "values": {"supplier": "Arrow", "manufacturer": "Vishay", "category": "Resistor"}},
        {"row": 1, "values": {"supplier": "Arrow", "manufacturer": "Vishay", "category": "Resistor"}}
    ]}"#;
    let engine = engine(CannedClient::new(vec![
        Ok(reply.to_string()),
        Ok(reply.to_string()),
    ]));
    let report = Validator::new(SchemaRegistry::bom()).validate(&records);

    let outcome = engine.complete(&records, &report, 10).await;

    assert_eq!(outcome.records[0].text("supplier"), Some("Mouser"));
    assert_eq!(outcome.records[1].text("supplier"), Some("Arrow"));
    for (before, after) in records.iter().zip(&outcome.records) {
        for (field, cell) in before.non_empty() {
            assert_eq!(after.cell(field), cell);
        }
    }
}

#[tokio::test]
async fn test_advisor_parses_suggestion_array() {
    let records = vec![
        line("R1", "Resistor 10k 0603").with("supplier", "Mouser"),
        line("R2", "Resistor 4k7 0603").with("supplier", "Digi-Key"),
    ];
    let reply = r#"[
        {"category": "supplier_consolidation",
         "recommendation": "Buy both resistors from Digi-Key",
         "affected_parts": ["R1", "R2"],
         "current_suppliers": ["Mouser", "Digi-Key"],
         "suggested_supplier": "Digi-Key",
         "potential_savings": "5%"},
        {"recommendation": ""}
    ]"#;
    let advisor = OptimizationAdvisor::new(LlmProposer::new(CannedClient::new(vec![Ok(
        reply.to_string(),
    )])));

    let outcome = advisor.suggest(&records).await;

    assert_eq!(outcome.suggestions.len(), 1);
    assert_eq!(
        outcome.suggestions[0].suggested_supplier.as_deref(),
        Some("Digi-Key")
    );
    assert_eq!(outcome.aggregate.supplier_count(), 2);
    assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn test_advisor_failure_is_a_warning() {
    let records = vec![line("R1", "Resistor 10k 0603").with("supplier", "Mouser")];
    let advisor = OptimizationAdvisor::new(LlmProposer::new(CannedClient::new(vec![Ok(
        "no advice today".to_string(),
    )])));

    let outcome = advisor.suggest(&records).await;

    assert!(outcome.suggestions.is_empty());
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(records[0].text("supplier"), Some("Mouser"));
}

#[test]
fn test_fixture_leaves_completable_gaps() {
    let record = line("R1", "Resistor 10k 0603");
    for field in ["supplier", "manufacturer", "category"] {
        assert_eq!(record.cell(field), &Cell::Empty);
    }
}
