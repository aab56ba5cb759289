//! Prompt templates for BOM completion and optimization advice
//!
//! This module provides prompt templates and utilities for constructing
//! prompts and pulling JSON back out of free-form model output.

use serde_json::{Map, Value};

/// Prompt template for filling missing BOM fields
pub const COMPLETION_PROMPT_TEMPLATE: &str = r#"You are an expert electronics engineer helping to complete a Bill of Materials (BOM).

## Fields to complete
{fields}

## Rows
Each row lists only the values that are already known.
```json
{rows}
```

{context_section}
## Rules
1. Fill in values only for the fields listed above, and only for the rows given
2. Base values on the part number, description, manufacturer or category
3. Costs are realistic estimates in USD; be conservative
4. Suppliers are real electronics distributors (Digi-Key, Mouser, Arrow, etc.)
5. Manufacturers are actual component manufacturers
6. Lead times are realistic (1-30 days typically)
7. Categories are standard electronics categories
8. If you are not confident about a value, answer "unknown"
9. A value may be given as {"value": ..., "confidence": 0.0-1.0}

## Output
Return ONLY a valid JSON object of this shape, with no explanation or markdown:
{"rows": [{"row": <row number>, "values": {"<field>": <value or "unknown">}}]}"#;

/// Prompt template for supplier and cost optimization advice
pub const ADVISOR_PROMPT_TEMPLATE: &str = r#"Analyze this Bill of Materials summary for supplier optimization opportunities.

## BOM summary
```json
{aggregate}
```

## Goals
1. Reduce the number of different suppliers
2. Identify volume discount opportunities
3. Suggest alternative suppliers where spend is concentrated
4. Simplify procurement

## Output
Return ONLY a JSON array of recommendations, with no explanation or markdown:
[
    {
        "category": "supplier_consolidation | volume_discount | alternative_supplier | other",
        "recommendation": "description of the recommendation",
        "affected_parts": ["part1", "part2"],
        "current_suppliers": ["supplier1", "supplier2"],
        "suggested_supplier": "consolidated supplier",
        "potential_savings": "estimated percentage or description"
    }
]"#;

/// A field the model is asked to fill
#[derive(Debug, Clone, PartialEq)]
pub struct PromptField {
    pub name: String,
    pub kind: String,
    pub description: String,
}

/// Context for building a completion prompt
#[derive(Debug, Clone, Default)]
pub struct CompletionPromptContext {
    /// Fields to fill
    pub fields: Vec<PromptField>,
    /// Rows as (row number, known values)
    pub rows: Vec<(usize, Map<String, Value>)>,
    /// Reference lines describing other rows in the BOM
    pub reference: Vec<String>,
    /// Maximum tokens for the prompt
    pub max_tokens: usize,
}

impl CompletionPromptContext {
    /// Create a new prompt context
    pub fn new(fields: Vec<PromptField>) -> Self {
        Self {
            fields,
            rows: Vec::new(),
            reference: Vec::new(),
            max_tokens: 8192,
        }
    }

    /// Add a row of known values
    pub fn with_row(mut self, row: usize, known: Map<String, Value>) -> Self {
        self.rows.push((row, known));
        self
    }

    /// Add reference lines for other rows
    pub fn with_reference(mut self, lines: Vec<String>) -> Self {
        self.reference = lines;
        self
    }

    /// Set maximum tokens
    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = max;
        self
    }

    /// Build the completion prompt
    pub fn build_prompt(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(|f| format!("- {} ({}): {}", f.name, f.kind, f.description))
            .collect::<Vec<_>>()
            .join("\n");

        let rows: Vec<Value> = self
            .rows
            .iter()
            .map(|(row, known)| {
                let mut entry = Map::new();
                entry.insert("row".to_string(), Value::from(*row));
                entry.insert("known".to_string(), Value::Object(known.clone()));
                Value::Object(entry)
            })
            .collect();
        let rows = serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string());

        let context_section = if self.reference.is_empty() {
            String::new()
        } else {
            format!(
                "## Other BOM rows for reference\n{}\n\n",
                truncate_to_tokens(&self.reference.join("\n"), self.max_tokens / 4)
            )
        };

        COMPLETION_PROMPT_TEMPLATE
            .replace("{fields}", &fields)
            .replace("{rows}", &rows)
            .replace("{context_section}", &context_section)
    }
}

/// Build the optimization advice prompt from an aggregate summary
pub fn build_advisor_prompt(aggregate: &Value) -> String {
    let aggregate =
        serde_json::to_string_pretty(aggregate).unwrap_or_else(|_| aggregate.to_string());
    ADVISOR_PROMPT_TEMPLATE.replace("{aggregate}", &aggregate)
}

/// Extract a JSON object from a response that may contain markdown or other text
pub fn extract_json(response: &str) -> String {
    extract_delimited(response, '{', '}')
}

/// Extract a JSON array from a response that may contain markdown or other text
pub fn extract_json_array(response: &str) -> String {
    extract_delimited(response, '[', ']')
}

fn extract_delimited(response: &str, open: char, close: char) -> String {
    let trimmed = response.trim();

    // Try to find JSON in code blocks
    if let Some(start) = trimmed.find("```json") {
        let content_start = start + 7;
        if let Some(end) = trimmed[content_start..].find("```") {
            return trimmed[content_start..content_start + end]
                .trim()
                .to_string();
        }
    }

    // Try to find generic code blocks
    if let Some(start) = trimmed.find("```") {
        let content_start = start + 3;
        // Skip language identifier if present
        let content_start = trimmed[content_start..]
            .find('\n')
            .map(|n| content_start + n + 1)
            .unwrap_or(content_start);
        if let Some(end) = trimmed[content_start..].find("```") {
            return trimmed[content_start..content_start + end]
                .trim()
                .to_string();
        }
    }

    // Try to find the value directly
    if let Some(start) = trimmed.find(open)
        && let Some(end) = trimmed.rfind(close)
        && end > start
    {
        return trimmed[start..=end].to_string();
    }

    trimmed.to_string()
}

/// Truncate text to approximately the given number of tokens
///
/// Uses a rough estimate of 4 characters per token for English text
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> String {
    let max_chars = max_tokens * 4;
    if text.len() <= max_chars {
        return text.to_string();
    }

    let mut cut = max_chars;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }

    // Truncate at line or word boundary
    let truncated = &text[..cut];
    if let Some(last_break) = truncated.rfind(['\n', ' ']) {
        format!("{}...", &truncated[..last_break])
    } else {
        format!("{}...", truncated)
    }
}

/// Estimate the token count for a piece of text
///
/// Uses a rough estimate of 4 characters per token
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}
