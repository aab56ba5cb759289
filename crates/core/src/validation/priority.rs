//! Completion priority scoring

use serde::{Deserialize, Serialize};

/// How urgently a record needs completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityScore {
    /// Record index
    pub record: usize,
    /// Weighted count of missing fields
    pub score: u32,
    /// Empty required fields, in registry order
    pub missing_required: Vec<String>,
    /// Empty optional fields, in registry order
    pub missing_optional: Vec<String>,
}

impl PriorityScore {
    /// Score a record from its missing fields
    pub fn new(
        record: usize,
        missing_required: Vec<String>,
        missing_optional: Vec<String>,
        required_weight: u32,
        optional_weight: u32,
    ) -> Self {
        let score = required_weight * missing_required.len() as u32
            + optional_weight * missing_optional.len() as u32;
        Self {
            record,
            score,
            missing_required,
            missing_optional,
        }
    }

    /// Check whether the record has anything to complete
    pub fn needs_completion(&self) -> bool {
        self.score > 0
    }

    /// All missing fields, required first
    pub fn missing_fields(&self) -> impl Iterator<Item = &str> {
        self.missing_required
            .iter()
            .chain(self.missing_optional.iter())
            .map(String::as_str)
    }
}

/// Order scores for completion: highest first, ties by record index
///
/// Records with nothing missing are left out.
pub fn completion_order(scores: &[PriorityScore]) -> Vec<&PriorityScore> {
    let mut ordered: Vec<&PriorityScore> = scores.iter().filter(|s| s.needs_completion()).collect();
    // sort_by is stable, so equal scores keep index order
    ordered.sort_by(|a, b| b.score.cmp(&a.score));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(record: usize, required: usize, optional: usize) -> PriorityScore {
        PriorityScore::new(
            record,
            vec!["r".to_string(); required],
            vec!["o".to_string(); optional],
            3,
            1,
        )
    }

    #[test]
    fn test_weighted_score() {
        assert_eq!(score(0, 2, 3).score, 9);
        assert_eq!(score(0, 0, 0).score, 0);
    }

    #[test]
    fn test_completion_order_stable() {
        let scores = vec![score(0, 0, 2), score(1, 1, 0), score(2, 0, 0), score(3, 0, 3)];
        let order: Vec<usize> = completion_order(&scores).iter().map(|s| s.record).collect();
        assert_eq!(order, vec![1, 3, 0]);
    }
}
