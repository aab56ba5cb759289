//! Raw tabular input and output

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::record::Record;
use crate::schema::SchemaRegistry;

/// A raw table as uploaded: header row plus data rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Column headers as they appear in the source
    pub headers: Vec<String>,
    /// Data rows; each row is positionally aligned with `headers`
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Create a table from headers and rows
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Check that the data is tabular at all
    ///
    /// A table needs at least one header, and no row may have more cells
    /// than there are headers. Short rows are allowed and read as empty.
    pub fn check_shape(&self) -> Result<(), String> {
        if self.headers.is_empty() {
            return Err("table has no header row".to_string());
        }
        for (idx, row) in self.rows.iter().enumerate() {
            if row.len() > self.headers.len() {
                return Err(format!(
                    "row {} has {} cells but only {} headers",
                    idx,
                    row.len(),
                    self.headers.len()
                ));
            }
        }
        Ok(())
    }

    /// Build a canonical table from records, using the registry's field order
    pub fn from_records(records: &[Record], registry: &SchemaRegistry) -> Self {
        let headers: Vec<String> = registry.fields().iter().map(|f| f.name.clone()).collect();
        let rows = records
            .iter()
            .map(|r| headers.iter().map(|h| r.cell(h).clone()).collect())
            .collect();
        Self { headers, rows }
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_shape() {
        let table = RawTable::new(vec!["a".into()], vec![vec![Cell::Empty]]);
        assert!(table.check_shape().is_ok());

        let wide = RawTable::new(vec!["a".into()], vec![vec![Cell::Empty, Cell::Empty]]);
        assert!(wide.check_shape().is_err());

        assert!(RawTable::default().check_shape().is_err());
    }

    #[test]
    fn test_from_records_uses_registry_order() {
        let registry = SchemaRegistry::bom();
        let record = Record::blank(&registry)
            .with("part_number", "R1")
            .with("quantity", 10.0);
        let table = RawTable::from_records(&[record], &registry);
        assert_eq!(table.headers[0], "part_number");
        assert_eq!(table.rows[0][0], Cell::Text("R1".to_string()));
        assert_eq!(table.rows[0][2], Cell::Number(10.0));
    }

    #[test]
    fn test_deserialize_json_table() {
        let json = r#"{"headers": ["Part No", "Qty"], "rows": [["R1", "10"], ["C1", 5]]}"#;
        let table: RawTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1][1], Cell::Number(5.0));
    }
}
