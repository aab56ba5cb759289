//! Request and response types exchanged with a field proposer

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Cell;
use crate::schema::FieldType;

/// A field the proposer is asked to fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetField {
    pub name: String,
    pub field_type: FieldType,
    pub description: String,
}

/// Field values of one row, kept in registry order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnownValues(Vec<(String, Cell)>);

impl KnownValues {
    pub fn get(&self, field: &str) -> Option<&Cell> {
        self.0.iter().find(|(f, _)| f == field).map(|(_, c)| c)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.0.iter().map(|(f, c)| (f.as_str(), c))
    }

    /// Field names in order
    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|(f, _)| f.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Cell)> for KnownValues {
    fn from_iter<I: IntoIterator<Item = (String, Cell)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One row of a proposal request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalRow {
    /// Record index
    pub record: usize,
    /// Non-empty fields of the record
    pub known: KnownValues,
}

/// A batch of rows sharing the same missing fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub rows: Vec<ProposalRow>,
    pub targets: Vec<TargetField>,
    /// Identifying fields of other rows, for reference only
    #[serde(default)]
    pub context: Vec<KnownValues>,
}

impl ProposalRequest {
    /// Record indices in this request
    pub fn records(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.record).collect()
    }
}

/// A single proposed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedValue {
    /// Raw JSON value as returned by the service
    pub value: Value,
    /// Optional confidence (0.0-1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ProposedValue {
    /// A value without confidence
    pub fn plain(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            confidence: None,
        }
    }

    /// A value with confidence
    pub fn with_confidence(value: impl Into<Value>, confidence: f64) -> Self {
        Self {
            value: value.into(),
            confidence: Some(confidence),
        }
    }

    /// Whether the service declined to answer
    ///
    /// `null`, blank strings and the literal `"unknown"` all count.
    pub fn is_unknown(&self) -> bool {
        match &self.value {
            Value::Null => true,
            Value::String(s) => {
                let s = s.trim();
                s.is_empty() || s.eq_ignore_ascii_case("unknown")
            }
            _ => false,
        }
    }

    /// Convert to a cell, or `None` for value kinds a table cannot hold
    pub fn to_cell(&self) -> Option<Cell> {
        match &self.value {
            Value::Number(n) => n.as_f64().map(Cell::number),
            Value::String(s) => Some(Cell::text(s)),
            Value::Null => Some(Cell::Empty),
            _ => None,
        }
    }
}

/// Values proposed for one row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalRowValues {
    pub row: usize,
    pub values: BTreeMap<String, ProposedValue>,
}

/// Parsed response to a proposal request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalResponse {
    pub rows: Vec<ProposalRowValues>,
}

impl ProposalResponse {
    /// Builder-style helper for stubs and tests
    pub fn with_value(mut self, row: usize, field: impl Into<String>, value: ProposedValue) -> Self {
        match self.rows.iter_mut().find(|r| r.row == row) {
            Some(entry) => {
                entry.values.insert(field.into(), value);
            }
            None => {
                let mut values = BTreeMap::new();
                values.insert(field.into(), value);
                self.rows.push(ProposalRowValues { row, values });
            }
        }
        self
    }

    /// Proposed value for a row and field (first matching row entry wins)
    pub fn value(&self, row: usize, field: &str) -> Option<&ProposedValue> {
        self.rows
            .iter()
            .find(|r| r.row == row)
            .and_then(|r| r.values.get(field))
    }

    /// Parse the `{"rows":[{"row":n,"values":{...}}]}` wire format
    ///
    /// Values may be scalars or `{"value": ..., "confidence": ...}` objects.
    /// Row entries that are not objects or lack a numeric `row` are ignored.
    pub fn from_json(json: &Value) -> Result<Self, String> {
        let rows = json
            .get("rows")
            .and_then(Value::as_array)
            .ok_or_else(|| "response has no 'rows' array".to_string())?;

        let mut parsed = Vec::with_capacity(rows.len());
        for entry in rows {
            let Some(row) = entry.get("row").and_then(Value::as_u64) else {
                continue;
            };
            let Some(values) = entry.get("values").and_then(Value::as_object) else {
                continue;
            };
            let values = values
                .iter()
                .map(|(field, raw)| (field.clone(), parse_value(raw)))
                .collect();
            parsed.push(ProposalRowValues {
                row: row as usize,
                values,
            });
        }
        Ok(Self { rows: parsed })
    }
}

fn parse_value(raw: &Value) -> ProposedValue {
    if let Value::Object(obj) = raw
        && let Some(value) = obj.get("value")
    {
        return ProposedValue {
            value: value.clone(),
            confidence: obj.get("confidence").and_then(Value::as_f64),
        };
    }
    ProposedValue {
        value: raw.clone(),
        confidence: None,
    }
}
