//! Core types for flow orchestration

use action_primitives::{ActionReport, Locator, WaitPolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Flow definition - an ordered list of steps run against one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flow {
    /// Flow identifier
    pub id: String,

    /// Flow name
    pub name: String,

    /// Flow description
    #[serde(default)]
    pub description: String,

    /// Wait policy applied before every element interaction
    #[serde(default)]
    pub wait: WaitPolicy,

    /// Failure strategy for steps without their own
    #[serde(default)]
    pub default_failure_strategy: FailureStrategy,

    /// Steps, executed in order
    pub steps: Vec<FlowStep>,
}

impl Flow {
    /// Create a new flow
    pub fn new(id: impl Into<String>, name: impl Into<String>, steps: Vec<FlowStep>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            wait: WaitPolicy::default(),
            default_failure_strategy: FailureStrategy::Abort,
            steps,
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the wait policy
    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// Set default failure strategy
    pub fn with_default_strategy(mut self, strategy: FailureStrategy) -> Self {
        self.default_failure_strategy = strategy;
        self
    }

    /// Replace `%name%` placeholders in navigation targets, typed text and
    /// option labels. Unknown placeholders stay as they are.
    pub fn with_params(mut self, params: &HashMap<String, String>) -> Self {
        if params.is_empty() {
            return self;
        }
        for step in &mut self.steps {
            step.action.substitute(params);
        }
        self
    }

    /// Strategy that applies to `step`
    pub fn strategy_for(&self, step: &FlowStep) -> FailureStrategy {
        step.failure_strategy
            .unwrap_or(self.default_failure_strategy)
    }
}

/// Single step of a flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowStep {
    /// Step identifier
    pub id: String,

    /// Human readable summary used in logs
    #[serde(default)]
    pub description: String,

    /// Action to perform
    pub action: ActionType,

    /// Overrides the flow default when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_strategy: Option<FailureStrategy>,

    /// Require the target to be displayed before acting
    #[serde(default = "default_assert_visible")]
    pub assert_visible: bool,
}

fn default_assert_visible() -> bool {
    true
}

impl FlowStep {
    pub fn new(id: impl Into<String>, description: impl Into<String>, action: ActionType) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            action,
            failure_strategy: None,
            assert_visible: true,
        }
    }

    /// Failure is logged and the flow continues
    pub fn best_effort(mut self) -> Self {
        self.failure_strategy = Some(FailureStrategy::Continue);
        self
    }

    /// Failure aborts the flow
    pub fn critical(mut self) -> Self {
        self.failure_strategy = Some(FailureStrategy::Abort);
        self
    }

    /// Act on the element without checking it is displayed
    pub fn skip_visibility_check(mut self) -> Self {
        self.assert_visible = false;
        self
    }
}

/// Action types that can be executed in flows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionType {
    /// Navigate to URL
    Navigate { url: String },

    /// Click element
    Click { locator: Locator },

    /// Type text
    TypeText { locator: Locator, text: String },

    /// Pick a dropdown option by label
    SelectOption { locator: Locator, option: String },

    /// Select a checkbox if it is not selected yet
    Check { locator: Locator },
}

impl ActionType {
    /// Short name used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            ActionType::Navigate { .. } => "navigate",
            ActionType::Click { .. } => "click",
            ActionType::TypeText { .. } => "type_text",
            ActionType::SelectOption { .. } => "select_option",
            ActionType::Check { .. } => "check",
        }
    }

    pub fn locator(&self) -> Option<&Locator> {
        match self {
            ActionType::Navigate { .. } => None,
            ActionType::Click { locator }
            | ActionType::TypeText { locator, .. }
            | ActionType::SelectOption { locator, .. }
            | ActionType::Check { locator } => Some(locator),
        }
    }

    fn substitute(&mut self, params: &HashMap<String, String>) {
        match self {
            ActionType::Navigate { url } => *url = substitute_placeholders(url, params),
            ActionType::TypeText { text, .. } => *text = substitute_placeholders(text, params),
            ActionType::SelectOption { option, .. } => *option = substitute_placeholders(option, params),
            ActionType::Click { .. } | ActionType::Check { .. } => {}
        }
    }
}

/// Replace every `%key%` whose key is in `params`.
pub fn substitute_placeholders(input: &str, params: &HashMap<String, String>) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('%') {
        let (before, tail) = rest.split_at(start);
        output.push_str(before);

        let after_open = &tail[1..];
        match after_open.find('%') {
            Some(end) => {
                let key = &after_open[..end];
                match params.get(key) {
                    Some(value) => {
                        output.push_str(value);
                        rest = &after_open[end + 1..];
                    }
                    None => {
                        // Keep the opening '%' and retry from the closing one.
                        output.push('%');
                        rest = after_open;
                    }
                }
            }
            None => {
                output.push_str(tail);
                rest = "";
            }
        }
    }

    output.push_str(rest);
    output
}

/// Failure strategy - how to handle step failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    /// Critical step: abort entire flow on failure
    #[default]
    Abort,

    /// Best-effort step: log and continue with next step
    Continue,
}

/// Flow execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowResult {
    /// Flow identifier
    pub flow_id: String,

    /// Overall success
    pub success: bool,

    /// Start time
    pub started_at: DateTime<Utc>,

    /// Finish time
    pub finished_at: DateTime<Utc>,

    /// Total latency in milliseconds
    pub latency_ms: u64,

    /// Step results, in execution order
    pub step_results: Vec<StepResult>,

    /// Step whose failure stopped the flow
    pub aborted_at: Option<String>,

    /// Steps never started because of an abort
    pub skipped_steps: usize,

    /// Whether the session was released
    pub torn_down: bool,

    /// Failure reported while releasing the session
    pub teardown_error: Option<String>,

    /// Error message if failed
    pub error: Option<String>,
}

impl FlowResult {
    /// Create a new flow result
    pub fn new(flow_id: String) -> Self {
        let now = Utc::now();
        Self {
            flow_id,
            success: false,
            started_at: now,
            finished_at: now,
            latency_ms: 0,
            step_results: Vec::new(),
            aborted_at: None,
            skipped_steps: 0,
            torn_down: false,
            teardown_error: None,
            error: None,
        }
    }

    /// Mark as success
    pub fn with_success(mut self) -> Self {
        self.success = true;
        self
    }

    /// Mark as failure
    pub fn with_error(mut self, error: String) -> Self {
        self.success = false;
        self.error = Some(error);
        self
    }

    /// Add step result
    pub fn with_step(mut self, result: StepResult) -> Self {
        self.step_results.push(result);
        self
    }

    /// Set finish time and calculate latency
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self.latency_ms = (self.finished_at - self.started_at).num_milliseconds().max(0) as u64;
        self
    }

    /// Best-effort steps that failed
    pub fn tolerated_failures(&self) -> impl Iterator<Item = &StepResult> {
        self.step_results.iter().filter(|step| step.tolerated)
    }
}

/// Step execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Step identifier
    pub step_id: String,

    /// Step description
    pub description: String,

    /// Action kind
    pub step_type: String,

    /// Strategy that applied to this step
    pub strategy: FailureStrategy,

    /// Success flag
    pub success: bool,

    /// Failed, but the step was best-effort
    pub tolerated: bool,

    /// Action report (if applicable)
    pub action_report: Option<ActionReport>,

    /// Start time
    pub started_at: DateTime<Utc>,

    /// Finish time
    pub finished_at: DateTime<Utc>,

    /// Latency in milliseconds
    pub latency_ms: u64,

    /// Error message (if failed)
    pub error: Option<String>,
}

impl StepResult {
    /// Create a new step result
    pub fn new(step: &FlowStep, strategy: FailureStrategy) -> Self {
        let now = Utc::now();
        Self {
            step_id: step.id.clone(),
            description: step.description.clone(),
            step_type: step.action.kind().to_string(),
            strategy,
            success: false,
            tolerated: false,
            action_report: None,
            started_at: now,
            finished_at: now,
            latency_ms: 0,
            error: None,
        }
    }

    /// Mark as success
    pub fn with_success(mut self) -> Self {
        self.success = true;
        self
    }

    /// Mark as failure
    pub fn with_error(mut self, error: String) -> Self {
        self.success = false;
        self.error = Some(error);
        self
    }

    /// Mark as a failure the flow can live with
    pub fn tolerated(mut self, error: String) -> Self {
        self.tolerated = true;
        self.with_error(error)
    }

    /// Add action report
    pub fn with_report(mut self, report: ActionReport) -> Self {
        self.action_report = Some(report);
        self
    }

    /// Set finish time and calculate latency
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self.latency_ms = (self.finished_at - self.started_at).num_milliseconds().max(0) as u64;
        self
    }
}
