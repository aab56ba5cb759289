//! BOM Reconcile Core - column mapping, validation and AI-assisted completion
//! for Bills of Materials
//!
//! Provides:
//! - A schema registry of canonical BOM fields
//! - Header-to-field mapping for arbitrary spreadsheet exports
//! - Record validation with completion priority scoring
//! - Batched completion of empty fields through an inference service
//! - Supplier and category cost aggregation with optimization advice
//!
//! Stages are plain transforms: each takes records by reference and returns
//! new values, so callers decide when to move from one stage to the next.

pub mod advisor;
pub mod completion;
pub mod config;
pub mod llm;
pub mod mapping;
pub mod models;
pub mod pipeline;
pub mod proposer;
pub mod schema;
pub mod validation;

// Re-export commonly used types
pub use advisor::{AdvisorConfig, AdvisorOutcome, OptimizationAdvisor, OptimizationSuggestion};
pub use completion::{
    CompletionConfig, CompletionEngine, CompletionOutcome, CompletionProgress, SkipReason,
};
pub use config::{ConfigError, ReconcileConfig};
pub use mapping::{ColumnMapper, ColumnMapping, MappingConfig, MappingError};
pub use models::{Cell, Issue, IssueKind, RawTable, Record, Severity};
pub use pipeline::{PipelineError, PipelineReport, ReconcilePipeline};
pub use proposer::{FieldProposer, LlmProposer, ProposeError};
pub use schema::{FieldSpec, FieldType, SchemaError, SchemaRegistry};
pub use validation::{ValidationConfig, ValidationReport, Validator};
