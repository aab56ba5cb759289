//! Field coverage summaries and derived values

use serde::{Deserialize, Serialize};

use crate::models::{Cell, Record};
use crate::schema::SchemaRegistry;

/// Missing-value coverage for one canonical field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCoverage {
    pub field: String,
    pub required: bool,
    pub description: String,
    pub missing: usize,
    pub total: usize,
    /// Percentage of records missing this field (0-100)
    pub missing_pct: f64,
}

/// Summarize missing values per field, in registry order
pub fn missing_summary(records: &[Record], registry: &SchemaRegistry) -> Vec<FieldCoverage> {
    let total = records.len();
    registry
        .fields()
        .iter()
        .map(|spec| {
            let missing = records.iter().filter(|r| r.is_missing(&spec.name)).count();
            let missing_pct = if total == 0 {
                0.0
            } else {
                missing as f64 / total as f64 * 100.0
            };
            FieldCoverage {
                field: spec.name.clone(),
                required: spec.required,
                description: spec.description.clone(),
                missing,
                total,
                missing_pct,
            }
        })
        .collect()
}

/// Fill empty `total_cost` cells from quantity × unit_cost
///
/// Existing totals are left alone. Returns the number of cells filled.
pub fn derive_total_costs(records: &mut [Record]) -> usize {
    let mut filled = 0;
    for record in records.iter_mut() {
        let (Some(quantity), Some(unit_cost)) = (record.number("quantity"), record.number("unit_cost"))
        else {
            continue;
        };
        let total = (quantity * unit_cost * 100.0).round() / 100.0;
        if record.fill_if_empty("total_cost", Cell::number(total)) {
            filled += 1;
        }
    }
    filled
}
