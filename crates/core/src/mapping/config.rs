//! Configuration for column mapping

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Configuration for header-to-field mapping
///
/// Synonyms and thresholds are heuristics, so they are exposed here rather
/// than fixed in the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Enable case-insensitive exact matching on normalized headers
    pub case_insensitive: bool,
    /// Enable synonym lookup (schema seeds plus `synonyms`)
    pub use_synonyms: bool,
    /// Extra synonyms, header spelling -> canonical field
    ///
    /// These take precedence over the synonyms seeded by the schema.
    pub synonyms: BTreeMap<String, String>,
    /// Enable substring matching (header contains field name or vice versa)
    pub substring_matching: bool,
    /// Minimum length of the shorter side for a substring match
    pub min_substring_len: usize,
    /// Enable fuzzy (Levenshtein) matching
    pub fuzzy_matching: bool,
    /// Maximum Levenshtein distance for fuzzy matches
    pub max_edit_distance: usize,
    /// Minimum similarity for fuzzy matches (0.0-1.0)
    pub min_confidence: f64,
    /// Manual mapping, header -> canonical field; applied before any heuristic
    pub overrides: BTreeMap<String, String>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            use_synonyms: true,
            synonyms: BTreeMap::new(),
            substring_matching: true,
            min_substring_len: 3,
            fuzzy_matching: true,
            max_edit_distance: 3,
            min_confidence: 0.7,
            overrides: BTreeMap::new(),
        }
    }
}

impl MappingConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a strict config (normalized exact matches and overrides only)
    pub fn strict() -> Self {
        Self {
            case_insensitive: true,
            use_synonyms: false,
            synonyms: BTreeMap::new(),
            substring_matching: false,
            min_substring_len: 3,
            fuzzy_matching: false,
            max_edit_distance: 0,
            min_confidence: 1.0,
            overrides: BTreeMap::new(),
        }
    }

    /// Add a synonym
    pub fn with_synonym(mut self, header: impl Into<String>, field: impl Into<String>) -> Self {
        self.synonyms.insert(header.into(), field.into());
        self
    }

    /// Add a manual override
    pub fn with_override(mut self, header: impl Into<String>, field: impl Into<String>) -> Self {
        self.overrides.insert(header.into(), field.into());
        self
    }

    /// Enable/disable substring matching
    pub fn with_substring_matching(mut self, enabled: bool) -> Self {
        self.substring_matching = enabled;
        self
    }

    /// Enable/disable fuzzy matching
    pub fn with_fuzzy_matching(mut self, enabled: bool) -> Self {
        self.fuzzy_matching = enabled;
        self
    }

    /// Set maximum edit distance for fuzzy matches
    pub fn with_max_edit_distance(mut self, distance: usize) -> Self {
        self.max_edit_distance = distance;
        self
    }

    /// Set minimum confidence threshold for fuzzy matches
    pub fn with_min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = confidence.clamp(0.0, 1.0);
        self
    }
}
