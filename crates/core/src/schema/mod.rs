//! Schema registry: the canonical BOM field set
//!
//! The registry defines which fields a BOM record carries, their types,
//! whether they are required, and the rule the validator applies to each.
//! It also drives column-mapping synonyms and constrains which fields the
//! completion engine may ask the inference service for.
//!
//! # Example
//!
//! ```
//! use bom_reconcile_core::schema::SchemaRegistry;
//!
//! let registry = SchemaRegistry::bom();
//! assert!(registry.field("quantity").unwrap().required);
//!
//! let custom = registry.with_required(&["part_number", "quantity"]).unwrap();
//! assert!(!custom.field("description").unwrap().required);
//! ```

mod error;
mod field;
mod registry;
mod template;

pub use error::{SchemaError, SchemaResult};
pub use field::{FieldRule, FieldSpec, FieldType};
pub use registry::SchemaRegistry;
pub use template::{SchemaTemplate, TemplateColumn};
