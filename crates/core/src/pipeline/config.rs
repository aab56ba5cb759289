//! Pipeline configuration types

use serde::{Deserialize, Serialize};

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Stages to run (empty = all)
    pub stages: Vec<PipelineStage>,
    /// Fill empty total_cost cells from quantity × unit_cost before validation
    pub derive_totals: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stages: Vec::new(),
            derive_totals: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new pipeline config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set specific stages to run
    pub fn with_stages(mut self, stages: Vec<PipelineStage>) -> Self {
        self.stages = stages;
        self
    }

    /// Enable or disable total-cost derivation
    pub fn with_derive_totals(mut self, enabled: bool) -> Self {
        self.derive_totals = enabled;
        self
    }

    /// Stages to run, in execution order
    ///
    /// Map and validate always run since later stages depend on them.
    pub fn effective_stages(&self) -> Vec<PipelineStage> {
        if self.stages.is_empty() {
            return PipelineStage::all();
        }
        PipelineStage::all()
            .into_iter()
            .filter(|s| !s.is_optional() || self.stages.contains(s))
            .collect()
    }

    /// Check if a specific stage should run
    pub fn should_run_stage(&self, stage: PipelineStage) -> bool {
        self.effective_stages().contains(&stage)
    }
}

/// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    /// Stage 1: Map uploaded headers to canonical fields
    Map,
    /// Stage 2: Validate records and score completeness
    Validate,
    /// Stage 3: Fill empty fields via the inference service (optional)
    Complete,
    /// Stage 4: Ask for cost optimization suggestions (optional)
    Advise,
}

impl PipelineStage {
    /// Get all stages in execution order
    pub fn all() -> Vec<Self> {
        vec![Self::Map, Self::Validate, Self::Complete, Self::Advise]
    }

    /// Get stage name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Validate => "validate",
            Self::Complete => "complete",
            Self::Advise => "advise",
        }
    }

    /// Get stage description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Map => "Map columns to canonical fields",
            Self::Validate => "Validate records and score completeness",
            Self::Complete => "Complete missing fields",
            Self::Advise => "Suggest cost optimizations",
        }
    }

    /// Get stage index (1-based)
    pub fn index(&self) -> usize {
        match self {
            Self::Map => 1,
            Self::Validate => 2,
            Self::Complete => 3,
            Self::Advise => 4,
        }
    }

    /// Check if this stage is optional
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Complete | Self::Advise)
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for PipelineStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "map" | "1" => Ok(Self::Map),
            "validate" | "2" => Ok(Self::Validate),
            "complete" | "3" => Ok(Self::Complete),
            "advise" | "4" => Ok(Self::Advise),
            _ => Err(format!("Unknown stage: {}", s)),
        }
    }
}
