//! Cost aggregation by supplier and category

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Record;

/// Spend and parts for one supplier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierSummary {
    pub supplier: String,
    pub parts: Vec<String>,
    pub categories: Vec<String>,
    pub lines: usize,
    pub total_quantity: f64,
    pub total_cost: f64,
}

/// Spend and suppliers for one component category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub parts: Vec<String>,
    pub suppliers: Vec<String>,
    pub lines: usize,
    pub total_cost: f64,
}

/// Aggregate view of a BOM sent to the advisor instead of raw rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostAggregate {
    /// Per-supplier totals, by descending spend
    pub suppliers: Vec<SupplierSummary>,
    /// Per-category totals, by descending spend
    pub categories: Vec<CategorySummary>,
    /// Lines that carried a cost or a supplier
    pub lines: usize,
    /// Lines with no supplier (grouped under "unassigned")
    pub unassigned_lines: usize,
    /// Sum of all line costs
    pub total_cost: f64,
}

/// Label for lines without a supplier or category
pub const UNASSIGNED: &str = "unassigned";

impl CostAggregate {
    /// Aggregate records that have a cost or a supplier
    ///
    /// A line's cost is its `total_cost`, or quantity × unit_cost when the
    /// total is missing. Rows missing both cost and supplier are ignored.
    pub fn from_records(records: &[Record]) -> Self {
        let mut suppliers: BTreeMap<String, SupplierSummary> = BTreeMap::new();
        let mut categories: BTreeMap<String, CategorySummary> = BTreeMap::new();
        let mut aggregate = CostAggregate::default();

        for record in records {
            let cost = line_cost(record);
            let supplier = record.text("supplier");
            if cost.is_none() && supplier.is_none() {
                continue;
            }

            let cost = cost.unwrap_or(0.0);
            let part = record.text("part_number").unwrap_or("?").to_string();
            let supplier = supplier.unwrap_or(UNASSIGNED).to_string();
            let category = record.text("category").unwrap_or(UNASSIGNED).to_string();

            aggregate.lines += 1;
            aggregate.total_cost += cost;
            if supplier == UNASSIGNED {
                aggregate.unassigned_lines += 1;
            }

            let entry = suppliers
                .entry(supplier.clone())
                .or_insert_with(|| SupplierSummary {
                    supplier: supplier.clone(),
                    ..Default::default()
                });
            entry.lines += 1;
            entry.total_cost += cost;
            entry.total_quantity += record.number("quantity").unwrap_or(0.0);
            push_unique(&mut entry.parts, &part);
            push_unique(&mut entry.categories, &category);

            let entry = categories
                .entry(category.clone())
                .or_insert_with(|| CategorySummary {
                    category: category.clone(),
                    ..Default::default()
                });
            entry.lines += 1;
            entry.total_cost += cost;
            push_unique(&mut entry.parts, &part);
            push_unique(&mut entry.suppliers, &supplier);
        }

        aggregate.suppliers = suppliers.into_values().collect();
        aggregate
            .suppliers
            .sort_by(|a, b| b.total_cost.total_cmp(&a.total_cost));
        aggregate.categories = categories.into_values().collect();
        aggregate
            .categories
            .sort_by(|a, b| b.total_cost.total_cmp(&a.total_cost));
        aggregate
    }

    /// Check whether nothing could be aggregated
    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    /// Number of distinct named suppliers
    pub fn supplier_count(&self) -> usize {
        self.suppliers
            .iter()
            .filter(|s| s.supplier != UNASSIGNED)
            .count()
    }
}

fn line_cost(record: &Record) -> Option<f64> {
    record.number("total_cost").or_else(|| {
        let quantity = record.number("quantity")?;
        let unit_cost = record.number("unit_cost")?;
        Some(quantity * unit_cost)
    })
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}
