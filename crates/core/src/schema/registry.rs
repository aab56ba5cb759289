//! The canonical BOM field registry

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::{SchemaError, SchemaResult};
use super::field::{FieldRule, FieldSpec, FieldType};

/// Ordered set of canonical field specifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRegistry {
    fields: Vec<FieldSpec>,
}

impl SchemaRegistry {
    /// Build a registry from explicit field specs
    ///
    /// The registry is checked with [`SchemaRegistry::validate`].
    pub fn from_fields(fields: Vec<FieldSpec>) -> SchemaResult<Self> {
        let registry = Self { fields };
        registry.validate()?;
        Ok(registry)
    }

    /// The standard electronics BOM schema
    pub fn bom() -> Self {
        Self {
            fields: bom_fields(),
        }
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by canonical name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check whether a canonical field exists
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Required fields in declaration order
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Optional fields in declaration order
    pub fn optional_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.required)
    }

    /// Rebuild the registry with a different required set
    ///
    /// Every name must be a known field; all other fields become optional.
    pub fn with_required<S: AsRef<str>>(&self, required: &[S]) -> SchemaResult<Self> {
        for name in required {
            if !self.contains(name.as_ref()) {
                return Err(SchemaError::UnknownField(name.as_ref().to_string()));
            }
        }
        let fields = self
            .fields
            .iter()
            .cloned()
            .map(|mut f| {
                f.required = required.iter().any(|r| r.as_ref() == f.name);
                f
            })
            .collect();
        Self::from_fields(fields)
    }

    /// Check that the registry is structurally usable
    pub fn validate(&self) -> SchemaResult<()> {
        if self.fields.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(SchemaError::InvalidField(
                    "field name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }
        if !self.fields.iter().any(|f| f.required) {
            return Err(SchemaError::NoRequiredFields);
        }
        Ok(())
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::bom()
    }
}

fn bom_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("part_number", FieldType::String)
            .required()
            .completable(false)
            .with_rule(FieldRule::PartNumber)
            .with_description("Unique identifier for the component")
            .with_synonyms(&["part no", "part #", "pn", "p/n", "part", "item number", "ref"])
            .with_example("R1-10K"),
        FieldSpec::new("description", FieldType::String)
            .required()
            .with_rule(FieldRule::Text { min: 5, max: 200 })
            .with_description("Detailed description of the component")
            .with_synonyms(&["desc", "item description", "component", "value"])
            .with_example("10kΩ 0603 thick film resistor"),
        FieldSpec::new("quantity", FieldType::Number)
            .required()
            .completable(false)
            .with_rule(FieldRule::Quantity)
            .with_description("Number of units required")
            .with_synonyms(&["qty", "count", "amount", "units", "qnty"])
            .with_example(10.0),
        FieldSpec::new("unit_cost", FieldType::Currency)
            .with_rule(FieldRule::UnitCost)
            .with_description("Cost per unit in USD")
            .with_synonyms(&["unit price", "price", "cost", "price each", "each"])
            .with_example(0.02),
        FieldSpec::new("total_cost", FieldType::Currency)
            .with_rule(FieldRule::NonNegativeCost)
            .with_description("Total cost (quantity × unit_cost)")
            .with_synonyms(&["total", "extended price", "ext price", "line total"])
            .with_example(0.2),
        FieldSpec::new("supplier", FieldType::String)
            .with_rule(FieldRule::Name { min: 2 })
            .with_description("Primary supplier name")
            .with_synonyms(&["vendor", "distributor", "source"])
            .with_example("Digi-Key"),
        FieldSpec::new("manufacturer", FieldType::String)
            .with_rule(FieldRule::Name { min: 2 })
            .with_description("Component manufacturer")
            .with_synonyms(&["mfg", "mfr", "maker", "brand"])
            .with_example("Yageo"),
        FieldSpec::new("manufacturer_part_number", FieldType::String)
            .with_rule(FieldRule::Name { min: 2 })
            .with_description("Manufacturer's part number")
            .with_synonyms(&["mpn", "mfg part", "mfr part", "mfg pn", "mfr pn", "mfg part number"])
            .with_example("RC0603FR-0710KL"),
        FieldSpec::new("lead_time_days", FieldType::Integer)
            .with_rule(FieldRule::LeadTime)
            .with_description("Expected delivery time in days")
            .with_synonyms(&["lead time", "lead", "delivery days", "lt"])
            .with_example(3.0),
        FieldSpec::new("category", FieldType::Enum)
            .with_rule(FieldRule::Category)
            .with_description("Component category (e.g., Resistor, Capacitor, IC)")
            .with_synonyms(&["type", "class", "family", "group"])
            .with_example("Resistor"),
        FieldSpec::new("datasheet_url", FieldType::Url)
            .with_rule(FieldRule::Url)
            .with_description("Link to component datasheet")
            .with_synonyms(&["datasheet", "url", "link", "spec sheet"])
            .with_example("https://www.yageo.com/upload/media/product/productsearch/datasheet/rchip/PYu-RC_Group_51_RoHS_L_12.pdf"),
        FieldSpec::new("notes", FieldType::String)
            .completable(false)
            .with_rule(FieldRule::Notes { max: 500 })
            .with_description("Additional notes or specifications")
            .with_synonyms(&["note", "comments", "comment", "remarks"])
            .with_example("1% tolerance"),
    ]
}
