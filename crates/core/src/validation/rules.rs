//! Per-field rule checks

use once_cell::sync::Lazy;
use regex::Regex;

use super::config::ValidationConfig;
use crate::models::{Cell, Severity};
use crate::schema::FieldRule;

static PART_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-_.]+$").unwrap());

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^https?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
    )
    .unwrap()
});

/// Outcome of a rule that flagged a value
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFinding {
    pub severity: Severity,
    pub message: String,
}

impl RuleFinding {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }
}

/// Check a present, correctly typed value against its field rule
///
/// Returns `None` when the value looks fine. Empty cells are never flagged
/// here; presence is checked by the validator.
pub fn check_rule(rule: FieldRule, cell: &Cell, config: &ValidationConfig) -> Option<RuleFinding> {
    if cell.is_empty() {
        return None;
    }
    let text = cell.render();
    let text = text.trim();
    let len = text.chars().count();

    match rule {
        FieldRule::PartNumber => {
            if len < 2 {
                Some(RuleFinding::warning(format!(
                    "Part number '{}' seems too short",
                    text
                )))
            } else if len > 50 {
                Some(RuleFinding::warning(format!(
                    "Part number '{}' seems too long",
                    text
                )))
            } else if !PART_NUMBER_REGEX.is_match(text) {
                Some(RuleFinding::warning(format!(
                    "Part number '{}' contains unusual characters",
                    text
                )))
            } else {
                None
            }
        }
        FieldRule::Text { min, max } => {
            if len < min {
                Some(RuleFinding::warning(format!("'{}' seems too short", text)))
            } else if len > max {
                Some(RuleFinding::warning(format!(
                    "Text is very long ({} characters)",
                    len
                )))
            } else {
                None
            }
        }
        FieldRule::Quantity => {
            let qty = cell.as_number()?;
            if qty <= 0.0 {
                Some(RuleFinding::error(format!(
                    "Quantity must be positive, got {}",
                    text
                )))
            } else if qty.fract() != 0.0 && qty > 1.0 {
                Some(RuleFinding::warning(format!(
                    "Fractional quantity {} - is this intentional?",
                    text
                )))
            } else if qty > config.max_quantity {
                Some(RuleFinding::warning(format!(
                    "Very large quantity {} - please verify",
                    text
                )))
            } else {
                None
            }
        }
        FieldRule::UnitCost => {
            let cost = cell.as_number()?;
            if cost < 0.0 {
                Some(RuleFinding::error(format!(
                    "Unit cost cannot be negative, got {}",
                    text
                )))
            } else if cost == 0.0 {
                Some(RuleFinding::warning("Unit cost is zero - is this correct?"))
            } else if cost > config.max_unit_cost {
                Some(RuleFinding::warning(format!(
                    "Very high unit cost ${} - please verify",
                    text
                )))
            } else {
                None
            }
        }
        FieldRule::NonNegativeCost => {
            let cost = cell.as_number()?;
            (cost < 0.0).then(|| RuleFinding::error(format!("Cost cannot be negative, got {}", text)))
        }
        FieldRule::Name { min } => (len < min)
            .then(|| RuleFinding::warning(format!("'{}' seems too short", text))),
        FieldRule::LeadTime => {
            let days = cell.as_number()?;
            if days < 0.0 {
                Some(RuleFinding::error(format!(
                    "Lead time cannot be negative, got {}",
                    text
                )))
            } else if days > config.max_lead_time_days {
                Some(RuleFinding::warning(format!(
                    "Very long lead time ({} days) - please verify",
                    text
                )))
            } else {
                None
            }
        }
        FieldRule::Category => {
            if len < 2 {
                Some(RuleFinding::warning(format!(
                    "Category '{}' seems too short",
                    text
                )))
            } else if !config.is_common_category(text) {
                Some(RuleFinding::info(format!(
                    "Category '{}' is not a common electronics category",
                    text
                )))
            } else {
                None
            }
        }
        FieldRule::Url => (!URL_REGEX.is_match(text))
            .then(|| RuleFinding::warning(format!("URL '{}' may not be valid", text))),
        FieldRule::Notes { max } => (len > max)
            .then(|| RuleFinding::warning(format!("Notes are very long ({} characters)", len))),
        FieldRule::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(rule: FieldRule, cell: Cell) -> Option<RuleFinding> {
        check_rule(rule, &cell, &ValidationConfig::default())
    }

    #[test]
    fn test_part_number_rules() {
        assert!(check(FieldRule::PartNumber, Cell::text("R1-10K_A.2")).is_none());
        assert_eq!(
            check(FieldRule::PartNumber, Cell::text("R")).unwrap().severity,
            Severity::Warning
        );
        let odd = check(FieldRule::PartNumber, Cell::text("R1 10K")).unwrap();
        assert!(odd.message.contains("unusual characters"));
    }

    #[test]
    fn test_quantity_rules() {
        assert!(check(FieldRule::Quantity, Cell::number(4.0)).is_none());
        assert!(check(FieldRule::Quantity, Cell::number(0.5)).is_none());
        assert_eq!(
            check(FieldRule::Quantity, Cell::number(0.0)).unwrap().severity,
            Severity::Error
        );
        assert_eq!(
            check(FieldRule::Quantity, Cell::number(2.5)).unwrap().severity,
            Severity::Warning
        );
        assert_eq!(
            check(FieldRule::Quantity, Cell::number(20_000.0)).unwrap().severity,
            Severity::Warning
        );
    }

    #[test]
    fn test_cost_rules() {
        assert_eq!(
            check(FieldRule::UnitCost, Cell::number(-1.0)).unwrap().severity,
            Severity::Error
        );
        assert_eq!(
            check(FieldRule::UnitCost, Cell::number(0.0)).unwrap().severity,
            Severity::Warning
        );
        assert!(check(FieldRule::UnitCost, Cell::number(0.25)).is_none());
        assert_eq!(
            check(FieldRule::NonNegativeCost, Cell::number(-3.0))
                .unwrap()
                .severity,
            Severity::Error
        );
    }

    #[test]
    fn test_lead_time_rules() {
        assert!(check(FieldRule::LeadTime, Cell::number(14.0)).is_none());
        assert_eq!(
            check(FieldRule::LeadTime, Cell::number(400.0)).unwrap().severity,
            Severity::Warning
        );
    }

    #[test]
    fn test_category_rules() {
        assert!(check(FieldRule::Category, Cell::text("Ceramic Capacitor")).is_none());
        assert_eq!(
            check(FieldRule::Category, Cell::text("Widget")).unwrap().severity,
            Severity::Info
        );
    }

    #[test]
    fn test_url_rules() {
        assert!(check(FieldRule::Url, Cell::text("https://example.com/ds.pdf")).is_none());
        assert!(check(FieldRule::Url, Cell::text("http://localhost:8080")).is_none());
        assert!(check(FieldRule::Url, Cell::text("ftp://example.com")).is_some());
        assert!(check(FieldRule::Url, Cell::text("not a url")).is_some());
    }

    #[test]
    fn test_empty_never_flagged() {
        assert!(check(FieldRule::PartNumber, Cell::Empty).is_none());
        assert!(check(FieldRule::Quantity, Cell::Empty).is_none());
    }
}
