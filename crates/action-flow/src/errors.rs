//! Flow execution error types

use action_primitives::ActionError;
use thiserror::Error;

/// Flow execution errors
#[derive(Debug, Error)]
pub enum FlowError {
    /// Flow validation failed
    #[error("Flow validation failed: {0}")]
    ValidationFailed(String),

    /// Invalid flow structure
    #[error("Invalid flow structure: {0}")]
    InvalidStructure(String),

    /// Step execution failed
    #[error("Step {step_id} failed: {source}")]
    StepFailed {
        step_id: String,
        #[source]
        source: ActionError,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FlowError {
    /// The action error behind a step failure
    pub fn action_error(&self) -> Option<&ActionError> {
        match self {
            FlowError::StepFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ActionError> for FlowError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::InvalidPolicy(reason) => FlowError::ValidationFailed(reason),
            other => FlowError::Internal(other.to_string()),
        }
    }
}
