//! Schema template: a canonical example table mirroring the registry

use serde::{Deserialize, Serialize};

use super::field::FieldType;
use super::registry::SchemaRegistry;
use crate::models::{Cell, RawTable};

/// Description of one template column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateColumn {
    /// Canonical field name
    pub name: String,
    /// Field type
    pub field_type: FieldType,
    /// Whether the field is required
    pub required: bool,
    /// Field description
    pub description: String,
}

/// A user-facing reference for the expected BOM layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaTemplate {
    /// Column descriptions in registry order
    pub columns: Vec<TemplateColumn>,
    /// Example table with canonical headers and one sample row
    pub example: RawTable,
}

impl SchemaRegistry {
    /// Build the schema template for this registry
    pub fn template(&self) -> SchemaTemplate {
        let columns = self
            .fields()
            .iter()
            .map(|f| TemplateColumn {
                name: f.name.clone(),
                field_type: f.field_type,
                required: f.required,
                description: f.description.clone(),
            })
            .collect();

        let headers = self.fields().iter().map(|f| f.name.clone()).collect();
        let row = self
            .fields()
            .iter()
            .map(|f| f.example.clone().unwrap_or(Cell::Empty))
            .collect();

        SchemaTemplate {
            columns,
            example: RawTable::new(headers, vec![row]),
        }
    }
}
