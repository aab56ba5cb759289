//! Configuration for record validation

use serde::{Deserialize, Serialize};

/// Categories treated as common for electronics BOMs
pub const COMMON_CATEGORIES: &[&str] = &[
    "Resistor",
    "Capacitor",
    "Inductor",
    "Diode",
    "Transistor",
    "Integrated Circuit",
    "IC",
    "Connector",
    "Switch",
    "LED",
    "Crystal",
    "Oscillator",
    "Transformer",
    "Relay",
    "Fuse",
    "Battery",
    "Cable",
    "PCB",
    "Mechanical",
    "Hardware",
];

/// Thresholds and weights used by the validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Allowed absolute difference between total_cost and quantity × unit_cost
    pub cost_tolerance: f64,
    /// Quantities above this produce a warning
    pub max_quantity: f64,
    /// Unit costs above this produce a warning
    pub max_unit_cost: f64,
    /// Lead times above this (days) produce a warning
    pub max_lead_time_days: f64,
    /// Categories that do not produce an info issue
    pub common_categories: Vec<String>,
    /// Priority weight of each missing required field
    pub required_weight: u32,
    /// Priority weight of each missing optional field
    pub optional_weight: u32,
    /// Warn on repeated part numbers
    pub check_duplicates: bool,
    /// Warn when unit costs are widely spread
    pub check_cost_variance: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            cost_tolerance: 0.01,
            max_quantity: 10_000.0,
            max_unit_cost: 10_000.0,
            max_lead_time_days: 365.0,
            common_categories: COMMON_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            required_weight: 3,
            optional_weight: 1,
            check_duplicates: true,
            check_cost_variance: true,
        }
    }
}

impl ValidationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cost consistency tolerance
    pub fn with_cost_tolerance(mut self, tolerance: f64) -> Self {
        self.cost_tolerance = tolerance.abs();
        self
    }

    /// Set priority weights for missing required and optional fields
    pub fn with_weights(mut self, required: u32, optional: u32) -> Self {
        self.required_weight = required;
        self.optional_weight = optional;
        self
    }

    /// Check whether a category contains one of the common category names
    pub fn is_common_category(&self, category: &str) -> bool {
        let lower = category.to_lowercase();
        self.common_categories
            .iter()
            .any(|c| lower.contains(&c.to_lowercase()))
    }
}
