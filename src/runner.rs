//! Glue between a flow, its parameters and a browser session

use std::collections::HashMap;

use action_flow::{run_scoped, ActionType, DefaultFlowExecutor, Flow, FlowResult};
use action_primitives::{
    simulated::SimulatedBrowser,
    webdriver::{WebDriverConfig, WebDriverSession},
    BrowserSession,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Substitute parameters and report placeholders left unresolved
pub fn prepare_flow(flow: Flow, params: &HashMap<String, String>) -> Flow {
    let flow = flow.with_params(params);
    for step in &flow.steps {
        let unresolved = match &step.action {
            ActionType::TypeText { text, .. } => has_placeholder(text),
            ActionType::Navigate { url } => has_placeholder(url),
            ActionType::SelectOption { option, .. } => has_placeholder(option),
            _ => false,
        };
        if unresolved {
            warn!(step = %step.id, "step still contains a %name% placeholder; pass it with --param");
        }
    }
    flow
}

fn has_placeholder(value: &str) -> bool {
    let mut parts = value.split('%');
    parts.next();
    let inner: Vec<_> = parts.collect();
    // "%a%" splits into ["", "a", ""]: a key needs a closing '%' after it
    inner.len() >= 2 && inner[..inner.len() - 1].iter().any(|key| is_placeholder_key(key))
}

fn is_placeholder_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Run `flow` on `session` and release the session afterwards
pub async fn run_on<S>(flow: &Flow, session: S) -> Result<FlowResult>
where
    S: BrowserSession + 'static,
{
    let executor = DefaultFlowExecutor::<S>::for_flow(flow).context("Invalid flow")?;
    let result = run_scoped(&executor, flow, session)
        .await
        .with_context(|| format!("Flow {} could not run", flow.id))?;
    info!(
        flow = %result.flow_id,
        success = result.success,
        latency_ms = result.latency_ms,
        "Flow finished"
    );
    Ok(result)
}

/// Open a WebDriver session and run `flow` on it
pub async fn run_webdriver(flow: &Flow, config: &WebDriverConfig) -> Result<FlowResult> {
    let session = WebDriverSession::connect(config)
        .await
        .with_context(|| format!("Could not reach WebDriver at {}", config.url))?;
    run_on(flow, session).await
}

/// Run `flow` on an in-memory page
pub async fn run_simulated(flow: &Flow, page: SimulatedBrowser) -> Result<FlowResult> {
    run_on(flow, page).await
}
