//! Failure handling strategies

use crate::errors::FlowError;
use crate::types::FailureStrategy;
use action_primitives::ActionPhase;
use async_trait::async_trait;
use tracing::{error, warn};

/// Failure handler trait
#[async_trait]
pub trait FailureHandler: Send + Sync {
    /// Decide what happens after `step_id` failed
    async fn handle_failure(
        &self,
        step_id: &str,
        strategy: FailureStrategy,
        error: &FlowError,
    ) -> FailureHandlerResult;
}

/// Result of failure handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureHandlerResult {
    /// Abort the entire flow
    Abort(String),

    /// Continue to next step
    Continue(String),
}

impl FailureHandlerResult {
    pub fn message(&self) -> &str {
        match self {
            FailureHandlerResult::Abort(msg) | FailureHandlerResult::Continue(msg) => msg,
        }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, FailureHandlerResult::Abort(_))
    }
}

/// Default failure handler: follows the strategy and logs the decision.
///
/// `Continue` only tolerates failures of the act phase. A target that never
/// showed up, or is not displayed, aborts the flow whatever the strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFailureHandler;

impl DefaultFailureHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FailureHandler for DefaultFailureHandler {
    async fn handle_failure(
        &self,
        step_id: &str,
        strategy: FailureStrategy,
        err: &FlowError,
    ) -> FailureHandlerResult {
        let kind = err.action_error().map(|e| e.kind());
        match strategy {
            FailureStrategy::Abort => {
                error!(step = step_id, ?kind, error = %err, "critical step failed, aborting flow");
                FailureHandlerResult::Abort(err.to_string())
            }
            FailureStrategy::Continue
                if err.action_error().map(|e| e.phase()) == Some(ActionPhase::Locate) =>
            {
                error!(step = step_id, ?kind, error = %err, "best-effort step target unavailable, aborting flow");
                FailureHandlerResult::Abort(err.to_string())
            }
            FailureStrategy::Continue => {
                warn!(step = step_id, ?kind, error = %err, "best-effort step failed, continuing");
                FailureHandlerResult::Continue(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_primitives::ActionError;

    fn step_failure() -> FlowError {
        FlowError::StepFailed {
            step_id: "courses".to_string(),
            source: ActionError::NotInteractable("linkText=My courses".to_string()),
        }
    }

    fn missing_target() -> FlowError {
        FlowError::StepFailed {
            step_id: "courses".to_string(),
            source: ActionError::WaitTimeout {
                what: "linkText=My courses".to_string(),
                elapsed_ms: 5000,
                last_cause: Some(Box::new(ActionError::NotFound(
                    "linkText=My courses".to_string(),
                ))),
            },
        }
    }

    #[tokio::test]
    async fn abort_strategy_aborts() {
        let handler = DefaultFailureHandler::new();
        let result = handler
            .handle_failure("courses", FailureStrategy::Abort, &step_failure())
            .await;

        assert!(result.is_abort());
        assert!(result.message().contains("courses"));
    }

    #[tokio::test]
    async fn continue_strategy_continues() {
        let handler = DefaultFailureHandler::new();
        let result = handler
            .handle_failure("courses", FailureStrategy::Continue, &step_failure())
            .await;

        assert_eq!(result, FailureHandlerResult::Continue(step_failure().to_string()));
    }

    #[tokio::test]
    async fn continue_strategy_still_aborts_when_target_is_missing() {
        let handler = DefaultFailureHandler::new();
        let result = handler
            .handle_failure("courses", FailureStrategy::Continue, &missing_target())
            .await;
        assert!(result.is_abort());

        let hidden = FlowError::StepFailed {
            step_id: "courses".to_string(),
            source: ActionError::NotDisplayed("linkText=My courses".to_string()),
        };
        let result = handler
            .handle_failure("courses", FailureStrategy::Continue, &hidden)
            .await;
        assert!(result.is_abort());
    }
}
