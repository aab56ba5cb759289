//! The narrow interface between reconciliation logic and the inference service
//!
//! The completion engine and the optimization advisor never talk to an
//! [`LlmClient`](crate::llm::LlmClient) directly. They go through
//! [`FieldProposer`], so merge and aggregation logic can be exercised with
//! deterministic stubs.

mod llm;
mod types;

pub use llm::LlmProposer;
pub use types::{
    KnownValues, ProposalRequest, ProposalResponse, ProposalRow, ProposalRowValues, ProposedValue,
    TargetField,
};

use async_trait::async_trait;
use thiserror::Error;

use crate::advisor::{CostAggregate, OptimizationSuggestion};
use crate::completion::SkipReason;
use crate::llm::LlmError;

/// Errors returned by a proposer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProposeError {
    /// The service could not be reached or refused the call
    #[error("Inference service unavailable: {message}")]
    Unavailable { message: String, transient: bool },

    /// The call did not finish in time
    #[error("Inference call timed out after {0} seconds")]
    Timeout(u64),

    /// The service answered with something that is not the expected shape
    #[error("Could not parse inference response: {0}")]
    Parse(String),
}

impl ProposeError {
    /// Create a non-transient unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        ProposeError::Unavailable {
            message: message.into(),
            transient: false,
        }
    }

    /// Create a transient unavailable error
    pub fn transient(message: impl Into<String>) -> Self {
        ProposeError::Unavailable {
            message: message.into(),
            transient: true,
        }
    }

    /// Whether one more attempt may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ProposeError::Unavailable { transient, .. } => *transient,
            ProposeError::Timeout(_) => true,
            ProposeError::Parse(_) => false,
        }
    }

    /// Skip reason recorded for fields of a failed batch
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            ProposeError::Parse(_) => SkipReason::ResponseParse,
            _ => SkipReason::ServiceUnavailable,
        }
    }
}

impl From<LlmError> for ProposeError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout(secs) => ProposeError::Timeout(secs),
            LlmError::ParseError(msg) | LlmError::InvalidResponse(msg) => ProposeError::Parse(msg),
            other => ProposeError::Unavailable {
                transient: other.is_retryable(),
                message: other.to_string(),
            },
        }
    }
}

/// Result type for proposer calls
pub type ProposeResult<T> = Result<T, ProposeError>;

/// Source of proposed values and optimization advice
#[async_trait]
pub trait FieldProposer: Send + Sync {
    /// Propose values for the target fields of every row in the request
    async fn propose(&self, request: &ProposalRequest) -> ProposeResult<ProposalResponse>;

    /// Suggest optimizations for an aggregated BOM
    async fn advise(&self, _aggregate: &CostAggregate) -> ProposeResult<Vec<OptimizationSuggestion>> {
        Err(ProposeError::unavailable(format!(
            "{} does not provide optimization advice",
            self.source()
        )))
    }

    /// Tag identifying where proposals come from (typically a model name)
    fn source(&self) -> &str;
}

#[async_trait]
impl<P: FieldProposer + ?Sized> FieldProposer for Box<P> {
    async fn propose(&self, request: &ProposalRequest) -> ProposeResult<ProposalResponse> {
        (**self).propose(request).await
    }

    async fn advise(&self, aggregate: &CostAggregate) -> ProposeResult<Vec<OptimizationSuggestion>> {
        (**self).advise(aggregate).await
    }

    fn source(&self) -> &str {
        (**self).source()
    }
}

#[async_trait]
impl<P: FieldProposer + ?Sized> FieldProposer for &P {
    async fn propose(&self, request: &ProposalRequest) -> ProposeResult<ProposalResponse> {
        (**self).propose(request).await
    }

    async fn advise(&self, aggregate: &CostAggregate) -> ProposeResult<Vec<OptimizationSuggestion>> {
        (**self).advise(aggregate).await
    }

    fn source(&self) -> &str {
        (**self).source()
    }
}
