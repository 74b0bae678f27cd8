//! In-memory browser used by tests and the `demo` command
//!
//! Elements appear a configurable delay after the last navigation. Every
//! interaction is recorded so callers can assert on what happened.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use crate::{
    errors::ActionError,
    locator::option_locator,
    session::{BrowserSession, ElementHandle},
    types::Locator,
};

/// Description of one simulated element
#[derive(Debug, Clone)]
pub struct ElementSpec {
    locator: Locator,
    appear_after: Duration,
    displayed: bool,
    shown_after: Option<Duration>,
    selected: bool,
    lookup_error: Option<ActionError>,
    click_error: Option<ActionError>,
    type_error: Option<ActionError>,
    children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            appear_after: Duration::ZERO,
            displayed: true,
            shown_after: None,
            selected: false,
            lookup_error: None,
            click_error: None,
            type_error: None,
            children: Vec::new(),
        }
    }

    /// Element becomes present `ms` after the last navigation
    pub fn appear_after_ms(mut self, ms: u64) -> Self {
        self.appear_after = Duration::from_millis(ms);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Hidden element becomes displayed `ms` after the last navigation
    pub fn shown_after_ms(mut self, ms: u64) -> Self {
        self.shown_after = Some(Duration::from_millis(ms));
        self
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Every lookup of this element fails with `err`
    pub fn failing_lookup(mut self, err: ActionError) -> Self {
        self.lookup_error = Some(err);
        self
    }

    pub fn failing_click(mut self, err: ActionError) -> Self {
        self.click_error = Some(err);
        self
    }

    pub fn failing_typing(mut self, err: ActionError) -> Self {
        self.type_error = Some(err);
        self
    }

    /// Attach `<option>` children, as found by the select primitive
    pub fn with_options<I, T>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.children.extend(
            labels
                .into_iter()
                .map(|label| ElementSpec::new(option_locator(label.as_ref()))),
        );
        self
    }
}

/// Recorded interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    Navigate { url: String },
    Click { target: String },
    Type { target: String, text: String },
    Quit,
}

struct ElementNode {
    spec: ElementSpec,
    selected: Mutex<bool>,
    children: Vec<Arc<ElementNode>>,
}

impl ElementNode {
    fn build(spec: ElementSpec) -> Arc<Self> {
        let children = spec.children.iter().cloned().map(Self::build).collect();
        Arc::new(Self {
            selected: Mutex::new(spec.selected),
            spec,
            children,
        })
    }
}

struct PageState {
    nodes: Vec<Arc<ElementNode>>,
    loaded_at: Instant,
    url: Option<String>,
    navigate_error: Option<ActionError>,
    quit_error: Option<ActionError>,
    interactions: Vec<Interaction>,
    quit_calls: usize,
}

impl PageState {
    fn since_load(&self) -> Duration {
        Instant::now().saturating_duration_since(self.loaded_at)
    }
}

/// Simulated browser session
#[derive(Clone)]
pub struct SimulatedBrowser {
    state: Arc<Mutex<PageState>>,
}

impl Default for SimulatedBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedBrowser {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(PageState {
                nodes: Vec::new(),
                loaded_at: Instant::now(),
                url: None,
                navigate_error: None,
                quit_error: None,
                interactions: Vec::new(),
                quit_calls: 0,
            })),
        }
    }

    pub fn with_element(self, spec: ElementSpec) -> Self {
        self.state.lock().nodes.push(ElementNode::build(spec));
        self
    }

    pub fn with_elements<I>(self, specs: I) -> Self
    where
        I: IntoIterator<Item = ElementSpec>,
    {
        {
            let mut state = self.state.lock();
            state.nodes.extend(specs.into_iter().map(ElementNode::build));
        }
        self
    }

    /// Every navigation fails with `err`
    pub fn failing_navigation(self, err: ActionError) -> Self {
        self.state.lock().navigate_error = Some(err);
        self
    }

    /// Quitting is counted but fails with `err`
    pub fn failing_quit(self, err: ActionError) -> Self {
        self.state.lock().quit_error = Some(err);
        self
    }

    pub fn current_url(&self) -> Option<String> {
        self.state.lock().url.clone()
    }

    pub fn interactions(&self) -> Vec<Interaction> {
        self.state.lock().interactions.clone()
    }

    pub fn quit_calls(&self) -> usize {
        self.state.lock().quit_calls
    }

    /// Current selection state of a top-level element
    pub fn is_selected(&self, locator: &Locator) -> Option<bool> {
        let state = self.state.lock();
        state
            .nodes
            .iter()
            .find(|node| &node.spec.locator == locator)
            .map(|node| *node.selected.lock())
    }

    fn lookup(
        &self,
        nodes: &[Arc<ElementNode>],
        locator: &Locator,
    ) -> Result<SimulatedElement, ActionError> {
        let since_load = self.state.lock().since_load();
        let node = nodes
            .iter()
            .find(|node| &node.spec.locator == locator && node.spec.appear_after <= since_load)
            .or_else(|| {
                nodes
                    .iter()
                    .find(|node| &node.spec.locator == locator && node.spec.lookup_error.is_some())
            })
            .ok_or_else(|| ActionError::NotFound(locator.to_string()))?;

        if let Some(err) = &node.spec.lookup_error {
            return Err(err.clone());
        }

        Ok(SimulatedElement {
            node: Arc::clone(node),
            browser: self.clone(),
        })
    }

    fn record(&self, interaction: Interaction) {
        debug!(?interaction, "simulated interaction");
        self.state.lock().interactions.push(interaction);
    }
}

#[async_trait]
impl BrowserSession for SimulatedBrowser {
    type Element = SimulatedElement;

    async fn navigate(&self, url: &str) -> Result<(), ActionError> {
        let mut state = self.state.lock();
        if let Some(err) = &state.navigate_error {
            return Err(err.clone());
        }
        state.loaded_at = Instant::now();
        state.url = Some(url.to_string());
        state.interactions.push(Interaction::Navigate {
            url: url.to_string(),
        });
        Ok(())
    }

    async fn find_element(&self, locator: &Locator) -> Result<SimulatedElement, ActionError> {
        let nodes = self.state.lock().nodes.clone();
        self.lookup(&nodes, locator)
    }

    async fn quit(&self) -> Result<(), ActionError> {
        let mut state = self.state.lock();
        state.quit_calls += 1;
        state.interactions.push(Interaction::Quit);
        match &state.quit_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Handle to a simulated element
#[derive(Clone)]
pub struct SimulatedElement {
    node: Arc<ElementNode>,
    browser: SimulatedBrowser,
}

impl SimulatedElement {
    pub fn locator(&self) -> &Locator {
        &self.node.spec.locator
    }
}

#[async_trait]
impl ElementHandle for SimulatedElement {
    async fn is_displayed(&self) -> Result<bool, ActionError> {
        let spec = &self.node.spec;
        if spec.displayed {
            return Ok(true);
        }
        let since_load = self.browser.state.lock().since_load();
        Ok(spec.shown_after.map_or(false, |after| after <= since_load))
    }

    async fn is_selected(&self) -> Result<bool, ActionError> {
        Ok(*self.node.selected.lock())
    }

    async fn click(&self) -> Result<(), ActionError> {
        if let Some(err) = &self.node.spec.click_error {
            return Err(err.clone());
        }
        {
            let mut selected = self.node.selected.lock();
            *selected = !*selected;
        }
        self.browser.record(Interaction::Click {
            target: self.node.spec.locator.to_string(),
        });
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> Result<(), ActionError> {
        if let Some(err) = &self.node.spec.type_error {
            return Err(err.clone());
        }
        self.browser.record(Interaction::Type {
            target: self.node.spec.locator.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn find_element(&self, locator: &Locator) -> Result<SimulatedElement, ActionError> {
        self.browser.lookup(&self.node.children, locator)
    }
}
