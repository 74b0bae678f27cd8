//! Flow executor implementation

use crate::errors::FlowError;
use crate::strategies::{DefaultFailureHandler, FailureHandler, FailureHandlerResult};
use crate::types::*;
use action_primitives::{
    ActionError, ActionPrimitives, ActionReport, BrowserSession, DefaultActionPrimitives,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use robot_core_types::{FlowId, StepId};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Flow executor trait
#[async_trait]
pub trait FlowExecutor<S: BrowserSession>: Send + Sync {
    /// Execute a flow against `session`
    async fn execute(&self, flow: &Flow, session: &S) -> Result<FlowResult, FlowError>;

    /// Validate flow structure
    fn validate_flow(&self, flow: &Flow) -> Result<(), FlowError>;
}

/// Default flow executor implementation
pub struct DefaultFlowExecutor<S: BrowserSession> {
    primitives: Arc<dyn ActionPrimitives<S>>,
    failure_handler: Arc<dyn FailureHandler>,
}

impl<S: BrowserSession + 'static> DefaultFlowExecutor<S> {
    /// Create a new flow executor
    pub fn new(
        primitives: Arc<dyn ActionPrimitives<S>>,
        failure_handler: Arc<dyn FailureHandler>,
    ) -> Self {
        Self {
            primitives,
            failure_handler,
        }
    }

    /// Executor whose primitives wait with the flow's own policy
    pub fn for_flow(flow: &Flow) -> Result<Self, FlowError> {
        let primitives = DefaultActionPrimitives::new(flow.wait.clone())?;
        Ok(Self::new(
            Arc::new(primitives),
            Arc::new(DefaultFailureHandler::new()),
        ))
    }

    /// Execute a single step
    async fn execute_step(&self, step: &FlowStep, session: &S) -> Result<ActionReport, ActionError> {
        let visible = step.assert_visible;
        match &step.action {
            ActionType::Navigate { url } => self.primitives.navigate(session, url).await,
            ActionType::Click { locator } => self.primitives.click(session, locator, visible).await,
            ActionType::TypeText { locator, text } => {
                self.primitives
                    .type_text(session, locator, text, visible)
                    .await
            }
            ActionType::SelectOption { locator, option } => {
                self.primitives
                    .select(session, locator, option, visible)
                    .await
            }
            ActionType::Check { locator } => self.primitives.check(session, locator, visible).await,
        }
    }
}

#[async_trait]
impl<S: BrowserSession + 'static> FlowExecutor<S> for DefaultFlowExecutor<S> {
    async fn execute(&self, flow: &Flow, session: &S) -> Result<FlowResult, FlowError> {
        info!(flow = %flow.id, name = %flow.name, steps = flow.steps.len(), "executing flow");

        self.validate_flow(flow)?;

        let mut result = FlowResult::new(flow.id.clone());
        let total = flow.steps.len();

        for (index, step) in flow.steps.iter().enumerate() {
            let strategy = flow.strategy_for(step);
            debug!(
                step = %step.id,
                position = index + 1,
                total,
                ?strategy,
                "executing step: {}",
                step.description
            );

            let step_result = StepResult::new(step, strategy);
            match self.execute_step(step, session).await {
                Ok(report) => {
                    result = result.with_step(step_result.with_report(report).with_success().finish());
                }
                Err(source) => {
                    let report = ActionReport::failure(
                        step.action.kind(),
                        step.action.locator().map(|locator| locator.to_string()),
                        step_result.started_at,
                        elapsed_ms(step_result.started_at),
                        &source,
                    );
                    let step_result = step_result.with_report(report);
                    let err = FlowError::StepFailed {
                        step_id: step.id.clone(),
                        source,
                    };
                    match self
                        .failure_handler
                        .handle_failure(&step.id, strategy, &err)
                        .await
                    {
                        FailureHandlerResult::Continue(msg) => {
                            result = result.with_step(step_result.tolerated(msg).finish());
                        }
                        FailureHandlerResult::Abort(msg) => {
                            result = result.with_step(step_result.with_error(msg.clone()).finish());
                            result.aborted_at = Some(step.id.clone());
                            result.skipped_steps = total - index - 1;
                            warn!(
                                flow = %flow.id,
                                step = %step.id,
                                skipped = result.skipped_steps,
                                "flow aborted"
                            );
                            return Ok(result.with_error(msg).finish());
                        }
                    }
                }
            }
        }

        let tolerated = result.tolerated_failures().count();
        if tolerated > 0 {
            warn!(flow = %flow.id, tolerated, "flow completed with best-effort failures");
        } else {
            info!(flow = %flow.id, "flow completed successfully");
        }
        Ok(result.with_success().finish())
    }

    fn validate_flow(&self, flow: &Flow) -> Result<(), FlowError> {
        debug!("Validating flow structure: {}", flow.id);

        FlowId::parse(flow.id.as_str())
            .map_err(|err| FlowError::ValidationFailed(format!("Flow ID: {err}")))?;

        if flow.steps.is_empty() {
            return Err(FlowError::InvalidStructure(
                "Flow must contain at least one step".to_string(),
            ));
        }

        flow.wait.validate()?;

        let mut seen = HashSet::new();
        for step in &flow.steps {
            let step_id = StepId::parse(step.id.as_str())
                .map_err(|err| FlowError::InvalidStructure(format!("Step ID: {err}")))?;
            if !seen.insert(step_id) {
                return Err(FlowError::InvalidStructure(format!(
                    "Duplicate step ID: {}",
                    step.id
                )));
            }
            if let ActionType::Navigate { url } = &step.action {
                if url.trim().is_empty() {
                    return Err(FlowError::InvalidStructure(format!(
                        "Step {} navigates to an empty URL",
                        step.id
                    )));
                }
            }
        }

        debug!("Flow validation passed");
        Ok(())
    }
}

fn elapsed_ms(started_at: DateTime<Utc>) -> u64 {
    (Utc::now() - started_at).num_milliseconds().max(0) as u64
}

/// Execute `flow` and then quit `session` exactly once.
///
/// The session is released even when validation fails or a step panics; a
/// panic is resumed after the quit. A failing quit is recorded on the result
/// and never changes its success flag.
pub async fn run_scoped<S, E>(executor: &E, flow: &Flow, session: S) -> Result<FlowResult, FlowError>
where
    S: BrowserSession,
    E: FlowExecutor<S> + ?Sized,
{
    let outcome = AssertUnwindSafe(executor.execute(flow, &session))
        .catch_unwind()
        .await;

    let teardown = session.quit().await;
    if let Err(err) = &teardown {
        error!(flow = %flow.id, error = %err, "failed to quit browser session");
    } else {
        debug!(flow = %flow.id, "browser session released");
    }

    match outcome {
        Ok(Ok(mut result)) => {
            result.torn_down = teardown.is_ok();
            result.teardown_error = teardown.err().map(|err| err.to_string());
            Ok(result)
        }
        Ok(Err(err)) => Err(err),
        Err(payload) => panic::resume_unwind(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_primitives::simulated::{ElementSpec, Interaction, SimulatedBrowser};
    use action_primitives::{Locator, WaitPolicy};

    fn click(id: &str) -> FlowStep {
        FlowStep::new(
            id,
            format!("click {id}"),
            ActionType::Click {
                locator: Locator::id(id),
            },
        )
    }

    fn open() -> FlowStep {
        FlowStep::new(
            "open",
            "open site",
            ActionType::Navigate {
                url: "https://lms.example".to_string(),
            },
        )
    }

    fn executor(flow: &Flow) -> DefaultFlowExecutor<SimulatedBrowser> {
        DefaultFlowExecutor::for_flow(flow).unwrap()
    }

    #[test]
    fn flow_validation_empty_id() {
        let flow = Flow::new("", "Test", vec![open()]);
        let err = executor(&Flow::new("x", "x", vec![open()]))
            .validate_flow(&flow)
            .unwrap_err();
        assert!(matches!(err, FlowError::ValidationFailed(_)));
    }

    #[test]
    fn flow_validation_no_steps() {
        let flow = Flow::new("empty", "Test", vec![]);
        let err = executor(&Flow::new("x", "x", vec![open()]))
            .validate_flow(&flow)
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidStructure(_)));
    }

    #[test]
    fn flow_validation_duplicate_step_ids() {
        let flow = Flow::new("dup", "Test", vec![click("a"), click("a")]);
        let err = executor(&flow).validate_flow(&flow).unwrap_err();
        assert!(err.to_string().contains("Duplicate step ID: a"));
    }

    #[test]
    fn flow_validation_rejects_zero_interval() {
        let valid = Flow::new("x", "x", vec![open()]);
        let flow = valid
            .clone()
            .with_wait_policy(WaitPolicy::default().with_poll_interval_ms(0));
        assert!(matches!(
            executor(&valid).validate_flow(&flow),
            Err(FlowError::ValidationFailed(_))
        ));
        assert!(matches!(
            DefaultFlowExecutor::<SimulatedBrowser>::for_flow(&flow),
            Err(FlowError::ValidationFailed(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn steps_run_in_order() {
        let browser = SimulatedBrowser::new().with_elements([
            ElementSpec::new(Locator::id("login")).appear_after_ms(30),
            ElementSpec::new(Locator::id("submit")),
        ]);
        let flow = Flow::new("ordered", "Ordered", vec![open(), click("login"), click("submit")]);

        let result = executor(&flow).execute(&flow, &browser).await.unwrap();

        assert!(result.success);
        assert_eq!(result.step_results.len(), 3);
        assert!(result.step_results.iter().all(|s| s.success));
        assert_eq!(
            browser.interactions(),
            vec![
                Interaction::Navigate {
                    url: "https://lms.example".to_string()
                },
                Interaction::Click {
                    target: "id=login".to_string()
                },
                Interaction::Click {
                    target: "id=submit".to_string()
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn best_effort_failure_is_tolerated() {
        let browser = SimulatedBrowser::new().with_elements([
            ElementSpec::new(Locator::id("banner"))
                .failing_click(ActionError::NotInteractable("id=banner".to_string())),
            ElementSpec::new(Locator::id("submit")),
        ]);
        let flow = Flow::new(
            "tolerant",
            "Tolerant",
            vec![open(), click("banner").best_effort(), click("submit")],
        );

        let result = executor(&flow).execute(&flow, &browser).await.unwrap();

        assert!(result.success);
        assert_eq!(result.aborted_at, None);
        let skipped = &result.step_results[1];
        assert!(!skipped.success);
        assert!(skipped.tolerated);
        assert_eq!(skipped.strategy, FailureStrategy::Continue);
        assert!(result.step_results[2].success);
        assert_eq!(result.tolerated_failures().count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_best_effort_target_aborts() {
        let browser = SimulatedBrowser::new().with_element(ElementSpec::new(Locator::id("submit")));
        let flow = Flow::new(
            "tolerant",
            "Tolerant",
            vec![open(), click("missing").best_effort(), click("submit")],
        )
        .with_wait_policy(WaitPolicy::default().with_timeout_ms(100));

        let result = executor(&flow).execute(&flow, &browser).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.aborted_at.as_deref(), Some("missing"));
        assert_eq!(result.skipped_steps, 1);
        assert!(!result.step_results[1].tolerated);
        assert_eq!(result.tolerated_failures().count(), 0);
        assert!(!browser
            .interactions()
            .contains(&Interaction::Click {
                target: "id=submit".to_string()
            }));
    }

    #[tokio::test(start_paused = true)]
    async fn critical_failure_skips_remaining_steps() {
        let browser = SimulatedBrowser::new().with_elements([
            ElementSpec::new(Locator::id("login"))
                .failing_click(ActionError::NotInteractable("id=login".to_string())),
            ElementSpec::new(Locator::id("submit")),
        ]);
        let flow = Flow::new(
            "strict",
            "Strict",
            vec![open(), click("login"), click("submit"), click("other")],
        );

        let result = executor(&flow).execute(&flow, &browser).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.aborted_at.as_deref(), Some("login"));
        assert_eq!(result.skipped_steps, 2);
        assert_eq!(result.step_results.len(), 2);
        assert!(result.error.unwrap().contains("not interactable"));
        assert!(!browser
            .interactions()
            .contains(&Interaction::Click {
                target: "id=submit".to_string()
            }));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_step_names_its_target() {
        let browser = SimulatedBrowser::new();
        let flow = Flow::new("late", "Late", vec![click("never")])
            .with_wait_policy(WaitPolicy::default().with_timeout_ms(50));

        let result = executor(&flow).execute(&flow, &browser).await.unwrap();

        assert!(!result.success);
        let step = &result.step_results[0];
        assert!(step.error.as_deref().unwrap().contains("never"));
        let report = step.action_report.as_ref().unwrap();
        assert!(!report.ok);
        assert_eq!(report.target.as_deref(), Some("id=never"));
    }

    #[tokio::test(start_paused = true)]
    async fn run_scoped_quits_after_validation_error() {
        let browser = SimulatedBrowser::new();
        let valid = Flow::new("x", "x", vec![open()]);
        let invalid = Flow::new("x", "x", vec![]);

        let result = run_scoped(&executor(&valid), &invalid, browser.clone()).await;

        assert!(matches!(result, Err(FlowError::InvalidStructure(_))));
        assert_eq!(browser.quit_calls(), 1);
    }
}
