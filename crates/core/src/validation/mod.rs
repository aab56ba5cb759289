//! Record validation
//!
//! Provides validation logic for:
//! - Per-field presence, type and rule checks
//! - Cross-field cost consistency
//! - Table checks (duplicate part numbers, unit-cost variance)
//! - Completion priority scoring
//! - Missing-value coverage summaries

pub mod config;
pub mod priority;
pub mod rules;
pub mod summary;
pub mod validator;

pub use config::{COMMON_CATEGORIES, ValidationConfig};
pub use priority::{PriorityScore, completion_order};
pub use rules::{RuleFinding, check_rule};
pub use summary::{FieldCoverage, derive_total_costs, missing_summary};
pub use validator::{ValidationReport, Validator};
