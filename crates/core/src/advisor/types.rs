//! Optimization suggestion types

use serde::{Deserialize, Deserializer, Serialize};

use super::aggregate::CostAggregate;

/// Kind of optimization being suggested
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    /// Move parts to fewer suppliers
    SupplierConsolidation,
    /// Buy in larger quantities for price breaks
    VolumeDiscount,
    /// Source parts from a different supplier
    AlternativeSupplier,
    /// Anything else
    #[default]
    #[serde(other)]
    Other,
}

impl std::fmt::Display for SuggestionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionCategory::SupplierConsolidation => write!(f, "supplier_consolidation"),
            SuggestionCategory::VolumeDiscount => write!(f, "volume_discount"),
            SuggestionCategory::AlternativeSupplier => write!(f, "alternative_supplier"),
            SuggestionCategory::Other => write!(f, "other"),
        }
    }
}

/// One advisory recommendation; never merged back into records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    #[serde(default)]
    pub category: SuggestionCategory,
    pub recommendation: String,
    #[serde(default)]
    pub affected_parts: Vec<String>,
    #[serde(default)]
    pub current_suppliers: Vec<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub suggested_supplier: Option<String>,
    /// Free-form estimate such as "5-10%"
    #[serde(default, deserialize_with = "optional_text")]
    pub potential_savings: Option<String>,
}

/// Accept strings or numbers for free-form text fields
fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Result of an advisory pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvisorOutcome {
    /// Suggestions, empty when the service failed or nothing was aggregable
    pub suggestions: Vec<OptimizationSuggestion>,
    /// The aggregate sent to the service
    pub aggregate: CostAggregate,
    /// Why suggestions are missing, if they are
    pub warnings: Vec<String>,
}
