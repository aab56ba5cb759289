//! Field proposer backed by an LLM client

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::types::{ProposalRequest, ProposalResponse};
use super::{FieldProposer, ProposeError, ProposeResult};
use crate::advisor::{CostAggregate, OptimizationSuggestion};
use crate::llm::prompt::{
    CompletionPromptContext, PromptField, build_advisor_prompt, estimate_tokens, extract_json,
    extract_json_array,
};
use crate::llm::{LlmClient, LlmError};

/// Proposes field values by prompting an LLM
pub struct LlmProposer<C: LlmClient> {
    client: C,
}

impl<C: LlmClient> LlmProposer<C> {
    /// Wrap an LLM client
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The wrapped client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Build the completion prompt for a request
    pub fn completion_prompt(&self, request: &ProposalRequest) -> String {
        let fields = request
            .targets
            .iter()
            .map(|t| PromptField {
                name: t.name.clone(),
                kind: t.field_type.to_string(),
                description: t.description.clone(),
            })
            .collect();

        let reference = request
            .context
            .iter()
            .map(|known| {
                known
                    .iter()
                    .filter(|(_, cell)| !cell.is_empty())
                    .map(|(field, cell)| format!("{}={}", field, cell))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .filter(|line| !line.is_empty())
            .collect();

        let mut context = CompletionPromptContext::new(fields)
            .with_reference(reference)
            .with_max_tokens(self.client.max_tokens());
        for row in &request.rows {
            let known: Map<String, Value> = row
                .known
                .iter()
                .filter(|(_, cell)| !cell.is_empty())
                .map(|(field, cell)| {
                    let value = serde_json::to_value(cell).unwrap_or(Value::Null);
                    (field.to_string(), value)
                })
                .collect();
            context = context.with_row(row.record, known);
        }
        context.build_prompt()
    }

    async fn call(&self, prompt: &str) -> ProposeResult<String> {
        let tokens = estimate_tokens(prompt);
        if tokens > self.client.max_tokens() {
            return Err(LlmError::ContextTooLarge {
                max: self.client.max_tokens(),
                actual: tokens,
            }
            .into());
        }
        Ok(self.client.complete(prompt).await?)
    }
}

#[async_trait]
impl<C: LlmClient> FieldProposer for LlmProposer<C> {
    async fn propose(&self, request: &ProposalRequest) -> ProposeResult<ProposalResponse> {
        let prompt = self.completion_prompt(request);
        debug!(
            rows = request.rows.len(),
            targets = request.targets.len(),
            prompt_tokens = estimate_tokens(&prompt),
            "Requesting field proposals"
        );

        let text = self.call(&prompt).await?;
        let json: Value = serde_json::from_str(&extract_json(&text))
            .map_err(|e| ProposeError::Parse(e.to_string()))?;
        ProposalResponse::from_json(&json).map_err(ProposeError::Parse)
    }

    async fn advise(&self, aggregate: &CostAggregate) -> ProposeResult<Vec<OptimizationSuggestion>> {
        let payload =
            serde_json::to_value(aggregate).map_err(|e| ProposeError::Parse(e.to_string()))?;
        let prompt = build_advisor_prompt(&payload);

        let text = self.call(&prompt).await?;
        let json: Value = serde_json::from_str(&extract_json_array(&text))
            .map_err(|e| ProposeError::Parse(e.to_string()))?;
        let Value::Array(items) = json else {
            return Err(ProposeError::Parse(
                "expected a JSON array of suggestions".to_string(),
            ));
        };

        let mut suggestions = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<OptimizationSuggestion>(item) {
                Ok(s) if !s.recommendation.trim().is_empty() => suggestions.push(s),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Ignoring malformed suggestion"),
            }
        }
        Ok(suggestions)
    }

    fn source(&self) -> &str {
        self.client.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::models::Cell;
    use crate::proposer::{KnownValues, ProposalRow, TargetField};
    use crate::schema::FieldType;

    fn request() -> ProposalRequest {
        let known: KnownValues = [
            ("part_number", Cell::text("R1")),
            ("description", Cell::text("10k resistor")),
            ("notes", Cell::Empty),
        ]
        .into_iter()
        .map(|(f, c)| (f.to_string(), c))
        .collect();

        let other: KnownValues = [
            ("part_number", Cell::text("C7")),
            ("supplier", Cell::text("Mouser")),
        ]
        .into_iter()
        .map(|(f, c)| (f.to_string(), c))
        .collect();

        ProposalRequest {
            rows: vec![ProposalRow { record: 0, known }],
            targets: vec![TargetField {
                name: "supplier".to_string(),
                field_type: FieldType::String,
                description: "Primary supplier name".to_string(),
            }],
            context: vec![other],
        }
    }

    #[test]
    fn test_completion_prompt_contents() {
        let proposer = LlmProposer::new(MockLlmClient::new(""));
        let prompt = proposer.completion_prompt(&request());

        assert!(prompt.contains("10k resistor"));
        assert!(prompt.contains("supplier (string)"));
        assert!(prompt.contains("part_number=C7, supplier=Mouser"));
        assert!(!prompt.contains("notes"));
    }

    #[test]
    fn test_completion_prompt_keeps_field_order() {
        let proposer = LlmProposer::new(MockLlmClient::new(""));
        let prompt = proposer.completion_prompt(&request());

        let part = prompt.find("\"part_number\"").unwrap();
        let description = prompt.find("\"description\"").unwrap();
        assert!(part < description);
    }

    #[tokio::test]
    async fn test_propose_parses_fenced_json() {
        let client = MockLlmClient::new(
            "Sure:\n```json\n{\"rows\": [{\"row\": 0, \"values\": {\"supplier\": \"Digi-Key\"}}]}\n```",
        );
        let proposer = LlmProposer::new(client);
        let response = proposer.propose(&request()).await.unwrap();

        assert_eq!(
            response.value(0, "supplier").unwrap().value,
            serde_json::json!("Digi-Key")
        );
        assert_eq!(proposer.source(), "mock-model");
    }

    #[tokio::test]
    async fn test_propose_parse_error() {
        let proposer = LlmProposer::new(MockLlmClient::new("I cannot help with that."));
        let err = proposer.propose(&request()).await.unwrap_err();
        assert!(matches!(err, ProposeError::Parse(_)));
    }

    #[tokio::test]
    async fn test_propose_transport_error_is_transient() {
        let proposer = LlmProposer::new(MockLlmClient::failing());
        let err = proposer.propose(&request()).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_advise_parses_array() {
        let client = MockLlmClient::new(
            r#"Here are my ideas:
[
  {"category": "supplier_consolidation", "recommendation": "Buy passives from one distributor",
   "affected_parts": ["R1", "C1"], "current_suppliers": ["Mouser", "Arrow"],
   "suggested_supplier": "Digi-Key", "potential_savings": "5-10%"},
  {"recommendation": ""},
  {"category": "something_new", "recommendation": "Ask for quotes", "potential_savings": 12}
]"#,
        );
        let proposer = LlmProposer::new(client);
        let suggestions = proposer.advise(&CostAggregate::default()).await.unwrap();

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].suggested_supplier.as_deref(), Some("Digi-Key"));
        assert_eq!(suggestions[1].potential_savings.as_deref(), Some("12"));
    }
}
