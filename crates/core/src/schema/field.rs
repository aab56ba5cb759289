//! Canonical field specifications

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Cell;
use crate::models::cell::parse_numeric_text;

/// Value type of a canonical field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    String,
    /// Real number
    Number,
    /// Monetary amount (USD)
    Currency,
    /// Whole number
    Integer,
    /// Web link
    Url,
    /// Value from a known vocabulary (open-ended)
    Enum,
}

impl FieldType {
    /// Whether values of this type are stored as numbers
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Number | FieldType::Currency | FieldType::Integer
        )
    }

    /// Resolve a raw cell against this type
    ///
    /// Numeric types parse text into numbers; text types render numbers as
    /// text. A value that cannot be resolved is returned unchanged so the
    /// validator can report the mismatch instead of the value being lost.
    pub fn coerce(&self, cell: Cell) -> Cell {
        if cell.is_empty() {
            return Cell::Empty;
        }
        if self.is_numeric() {
            if let Cell::Text(s) = &cell
                && let Some(n) = parse_numeric_text(s)
            {
                return Cell::Number(n);
            }
            cell
        } else {
            match cell {
                Cell::Number(_) => Cell::Text(cell.render()),
                Cell::Text(s) => Cell::text(s),
                Cell::Empty => Cell::Empty,
            }
        }
    }

    /// Check that a non-empty cell holds a value of this type
    pub fn accepts(&self, cell: &Cell) -> bool {
        match (self, cell) {
            (_, Cell::Empty) => true,
            (FieldType::Integer, Cell::Number(n)) => n.fract() == 0.0,
            (FieldType::Number | FieldType::Currency, Cell::Number(_)) => true,
            (t, Cell::Text(_)) if !t.is_numeric() => true,
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Currency => "currency",
            FieldType::Integer => "integer",
            FieldType::Url => "url",
            FieldType::Enum => "enum",
        };
        write!(f, "{}", s)
    }
}

/// Per-field validation rule
///
/// Thresholds that are policy rather than structure (maximum quantity,
/// common categories and so on) live in the validator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FieldRule {
    /// Identifier of 2-50 characters from `[A-Za-z0-9-_.]`
    PartNumber,
    /// Free text with length bounds
    Text { min: usize, max: usize },
    /// Positive count
    Quantity,
    /// Per-unit price
    UnitCost,
    /// Non-negative amount
    NonNegativeCost,
    /// Organisation or part name with a minimum length
    Name { min: usize },
    /// Delivery time in days
    LeadTime,
    /// Component category
    Category,
    /// http(s) link
    Url,
    /// Long-form note with a maximum length
    Notes { max: usize },
    /// No rule beyond the type check
    None,
}

/// Specification of one canonical field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Canonical field name
    pub name: String,
    /// Value type
    pub field_type: FieldType,
    /// Whether the field must be present on every record
    pub required: bool,
    /// Whether the completion engine may request a value for this field
    pub completable: bool,
    /// Validation rule
    pub rule: FieldRule,
    /// Human-readable description (used in prompts and templates)
    pub description: String,
    /// Alternative header spellings seeding the column mapper
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Example value for the schema template
    #[serde(default)]
    pub example: Option<Cell>,
}

impl FieldSpec {
    /// Create an optional, completable field with no rule
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            completable: true,
            rule: FieldRule::None,
            description: String::new(),
            synonyms: Vec::new(),
            example: None,
        }
    }

    /// Mark the field required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set whether the completion engine may fill this field
    pub fn completable(mut self, completable: bool) -> Self {
        self.completable = completable;
        self
    }

    /// Set the validation rule
    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rule = rule;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set header synonyms
    pub fn with_synonyms(mut self, synonyms: &[&str]) -> Self {
        self.synonyms = synonyms.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the template example value
    pub fn with_example(mut self, example: impl Into<Cell>) -> Self {
        self.example = Some(example.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_numeric_text() {
        assert_eq!(FieldType::Number.coerce(Cell::text("10")), Cell::Number(10.0));
        assert_eq!(
            FieldType::Currency.coerce(Cell::text("$2.50")),
            Cell::Number(2.5)
        );
    }

    #[test]
    fn test_coerce_failure_keeps_text() {
        let coerced = FieldType::Number.coerce(Cell::text("ten"));
        assert_eq!(coerced, Cell::Text("ten".to_string()));
        assert!(!FieldType::Number.accepts(&coerced));
    }

    #[test]
    fn test_coerce_number_to_text() {
        assert_eq!(
            FieldType::String.coerce(Cell::Number(1001.0)),
            Cell::Text("1001".to_string())
        );
    }

    #[test]
    fn test_integer_accepts_whole_numbers_only() {
        assert!(FieldType::Integer.accepts(&Cell::Number(5.0)));
        assert!(!FieldType::Integer.accepts(&Cell::Number(5.5)));
    }
}
