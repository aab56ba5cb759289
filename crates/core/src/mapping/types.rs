//! Types for column mapping results

use serde::{Deserialize, Serialize};

use crate::models::{Issue, IssueKind, Record, Severity};

/// Result of mapping uploaded headers to canonical fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Accepted header-to-field matches, in column order
    pub matches: Vec<HeaderMatch>,
    /// Headers that matched no field (dropped from records)
    pub unmapped_headers: Vec<String>,
    /// Canonical fields no header maps to, in registry order
    pub gaps: Vec<FieldGap>,
    /// Summary statistics
    pub stats: MappingStats,
}

impl ColumnMapping {
    /// Canonical field for a column position
    pub fn field_for_column(&self, column: usize) -> Option<&str> {
        self.matches
            .iter()
            .find(|m| m.column == column)
            .map(|m| m.field.as_str())
    }

    /// Column position mapped to a canonical field
    pub fn column_for_field(&self, field: &str) -> Option<usize> {
        self.matches
            .iter()
            .find(|m| m.field == field)
            .map(|m| m.column)
    }

    /// Check whether every required field has a column
    pub fn is_complete(&self) -> bool {
        self.gaps.iter().all(|g| !g.required)
    }

    /// Table-level issues for required fields with no column
    pub fn gap_issues(&self) -> Vec<Issue> {
        self.gaps
            .iter()
            .filter(|g| g.required)
            .map(|g| {
                Issue::for_table(
                    Some(g.field.clone()),
                    Severity::Error,
                    IssueKind::MappingGap,
                    format!("Required column '{}' is missing", g.field),
                )
            })
            .collect()
    }
}

/// One header matched to a canonical field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderMatch {
    /// Header as it appeared in the source
    pub header: String,
    /// Column position in the source
    pub column: usize,
    /// Canonical field name
    pub field: String,
    /// Match method used
    pub method: MatchMethod,
    /// Confidence score (0.0-1.0)
    pub confidence: f64,
}

/// Method used to match a header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Manual override from configuration
    Override,
    /// Case-insensitive match on the normalized header
    Exact,
    /// Synonym table match
    Synonym,
    /// Header contains the field name or vice versa
    Substring,
    /// Fuzzy (Levenshtein) match
    Fuzzy,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMethod::Override => write!(f, "override"),
            MatchMethod::Exact => write!(f, "exact"),
            MatchMethod::Synonym => write!(f, "synonym"),
            MatchMethod::Substring => write!(f, "substring"),
            MatchMethod::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// A canonical field with no source column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGap {
    /// Canonical field name
    pub field: String,
    /// Whether the field is required
    pub required: bool,
    /// Unmatched headers that came closest, for manual mapping
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// Mapping statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingStats {
    /// Number of source headers
    pub headers: usize,
    /// Number of mapped headers
    pub mapped: usize,
    /// Number of unmapped headers
    pub unmapped: usize,
    /// Required fields without a column
    pub required_gaps: usize,
    /// Optional fields without a column
    pub optional_gaps: usize,
}

/// Records produced from a raw table, plus the mapping that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedTable {
    /// One record per source row, carrying every canonical field
    pub records: Vec<Record>,
    /// Header mapping used
    pub mapping: ColumnMapping,
    /// Mapping gap issues
    pub issues: Vec<Issue>,
}
