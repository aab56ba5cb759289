//! Column mapping from uploaded headers to canonical BOM fields
//!
//! This module provides functionality to:
//! - Match uploaded headers to canonical fields (overrides, exact, synonyms,
//!   substring, fuzzy)
//! - Build canonical records from raw rows, coercing values per field type
//! - Report unmapped headers and fields with no source column
//!
//! # Example
//!
//! ```rust
//! use bom_reconcile_core::mapping::{ColumnMapper, MappingConfig};
//! use bom_reconcile_core::models::{Cell, RawTable};
//! use bom_reconcile_core::schema::SchemaRegistry;
//!
//! let table = RawTable::new(
//!     vec!["Part No".into(), "Desc".into(), "Qty".into()],
//!     vec![vec![Cell::text("R1"), Cell::text("10k resistor"), Cell::text("4")]],
//! );
//!
//! let mapper = ColumnMapper::with_config(
//!     SchemaRegistry::bom(),
//!     MappingConfig::new().with_synonym("Source", "supplier"),
//! );
//! let mapped = mapper.map_table(&table).unwrap();
//!
//! assert!(mapped.mapping.is_complete());
//! assert_eq!(mapped.records[0].number("quantity"), Some(4.0));
//! ```

mod config;
mod error;
mod matcher;
mod types;

pub use config::MappingConfig;
pub use error::{MappingError, MappingResult};
pub use matcher::{ColumnMapper, normalize_header};
pub use types::{ColumnMapping, FieldGap, HeaderMatch, MappedTable, MappingStats, MatchMethod};

use crate::models::RawTable;
use crate::schema::SchemaRegistry;

/// Map a raw table onto a registry with default configuration
///
/// This is a convenience function for simple mapping operations.
pub fn map_table(table: &RawTable, registry: &SchemaRegistry) -> MappingResult<MappedTable> {
    ColumnMapper::new(registry.clone()).map_table(table)
}
