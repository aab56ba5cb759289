//! BOM line-item records keyed by canonical field name

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use crate::schema::SchemaRegistry;

static EMPTY: Cell = Cell::Empty;

/// One BOM line item
///
/// Maps canonical field names to cell values. Records built by the column
/// mapper carry every canonical field, with absent values set to
/// [`Cell::Empty`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    cells: BTreeMap<String, Cell>,
}

impl Record {
    /// Create an empty record with no fields
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record with every field of the registry set to empty
    pub fn blank(registry: &SchemaRegistry) -> Self {
        let cells = registry
            .fields()
            .iter()
            .map(|f| (f.name.clone(), Cell::Empty))
            .collect();
        Self { cells }
    }

    /// Builder-style setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Cell>) -> Self {
        self.set(field, value);
        self
    }

    /// Get a field's cell, if the field exists on this record
    pub fn get(&self, field: &str) -> Option<&Cell> {
        self.cells.get(field)
    }

    /// Get a field's cell, treating unknown fields as empty
    pub fn cell(&self, field: &str) -> &Cell {
        self.cells.get(field).unwrap_or(&EMPTY)
    }

    /// Set a field value unconditionally
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Cell>) {
        self.cells.insert(field.into(), value.into());
    }

    /// Check whether a field is missing or empty
    pub fn is_missing(&self, field: &str) -> bool {
        self.cell(field).is_empty()
    }

    /// Set a field only if it is currently missing or empty
    ///
    /// Returns `true` if the value was written.
    pub fn fill_if_empty(&mut self, field: &str, value: Cell) -> bool {
        if value.is_empty() || !self.is_missing(field) {
            return false;
        }
        self.cells.insert(field.to_string(), value);
        true
    }

    /// Text value of a field
    pub fn text(&self, field: &str) -> Option<&str> {
        self.cell(field).as_text()
    }

    /// Numeric value of a field (number cells only)
    pub fn number(&self, field: &str) -> Option<f64> {
        self.cell(field).as_number()
    }

    /// Iterate over all fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over fields in registry order
    ///
    /// Fields the registry does not declare follow in name order.
    pub fn ordered<'a>(
        &'a self,
        registry: &'a SchemaRegistry,
    ) -> impl Iterator<Item = (&'a str, &'a Cell)> + 'a {
        let declared = registry
            .fields()
            .iter()
            .filter_map(|f| self.cells.get_key_value(f.name.as_str()));
        let extra = self.cells.iter().filter(|(k, _)| !registry.contains(k));
        declared.chain(extra).map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over the fields that carry a value
    pub fn non_empty(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.iter().filter(|(_, c)| !c.is_empty())
    }

    /// Number of fields on the record
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the record has no fields at all
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_record_has_all_fields() {
        let registry = SchemaRegistry::bom();
        let record = Record::blank(&registry);
        assert_eq!(record.len(), registry.fields().len());
        assert!(record.is_missing("part_number"));
    }

    #[test]
    fn test_ordered_follows_registry() {
        let registry = SchemaRegistry::bom();
        let record = Record::new()
            .with("supplier", "Mouser")
            .with("colour", "blue")
            .with("part_number", "R1")
            .with("description", "10k resistor");

        let fields: Vec<&str> = record.ordered(&registry).map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["part_number", "description", "supplier", "colour"]);
    }

    #[test]
    fn test_fill_if_empty_never_overwrites() {
        let mut record = Record::new().with("supplier", "Mouser");
        assert!(!record.fill_if_empty("supplier", Cell::text("Digi-Key")));
        assert_eq!(record.text("supplier"), Some("Mouser"));

        assert!(record.fill_if_empty("manufacturer", Cell::text("Yageo")));
        assert_eq!(record.text("manufacturer"), Some("Yageo"));
    }

    #[test]
    fn test_fill_if_empty_ignores_empty_value() {
        let mut record = Record::new();
        assert!(!record.fill_if_empty("supplier", Cell::Empty));
        assert!(record.get("supplier").is_none());
    }

    #[test]
    fn test_unknown_field_is_missing() {
        let record = Record::new();
        assert_eq!(record.cell("nope"), &Cell::Empty);
        assert!(record.is_missing("nope"));
    }
}
