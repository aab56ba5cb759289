//! Core data types for BOM reconciliation
//!
//! - [`Cell`]: tagged spreadsheet cell value
//! - [`Record`]: one BOM line item keyed by canonical field name
//! - [`Issue`]: a validation finding
//! - [`RawTable`]: tabular input/output shape

pub mod cell;
pub mod issue;
pub mod record;
pub mod table;

pub use cell::Cell;
pub use issue::{Issue, IssueKind, Severity};
pub use record::Record;
pub use table::RawTable;
