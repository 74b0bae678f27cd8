//! WebDriver-backed session

use std::borrow::Cow;

use async_trait::async_trait;
use fantoccini::{error::CmdError, Client, ClientBuilder};
use robot_core_types::SessionId;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    errors::ActionError,
    locator::partial_link_xpath,
    session::{BrowserSession, ElementHandle},
    types::Locator,
};

/// Default WebDriver endpoint (chromedriver --port=4444)
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Connection settings for a WebDriver server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebDriverConfig {
    /// WebDriver endpoint
    pub url: String,

    /// Run Chrome without a window
    pub headless: bool,

    /// Extra Chrome command-line switches
    pub chrome_args: Vec<String>,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: false,
            chrome_args: Vec::new(),
        }
    }
}

impl WebDriverConfig {
    fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut args = self.chrome_args.clone();
        if self.headless {
            args.push("--headless=new".to_string());
            args.push("--disable-gpu".to_string());
        }

        let mut caps = serde_json::Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        if !args.is_empty() {
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        caps
    }
}

/// Browser session driven through the WebDriver protocol
pub struct WebDriverSession {
    id: SessionId,
    client: Client,
}

impl WebDriverSession {
    /// Open a new browser session on the configured server
    pub async fn connect(config: &WebDriverConfig) -> Result<Self, ActionError> {
        info!(url = %config.url, headless = config.headless, "Starting WebDriver session");

        let mut builder = ClientBuilder::native();
        builder.capabilities(config.capabilities());
        let client = builder.connect(&config.url).await.map_err(|err| {
            ActionError::Driver(format!(
                "failed to open WebDriver session at {}: {}",
                config.url, err
            ))
        })?;

        let id = SessionId::new();
        debug!(session = %id, "WebDriver session ready");
        Ok(Self { id, client })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    type Element = WebDriverElement;

    async fn navigate(&self, url: &str) -> Result<(), ActionError> {
        debug!(session = %self.id, url, "navigate");
        self.client
            .goto(url)
            .await
            .map_err(|err| map_cmd_error(err, url))
    }

    async fn find_element(&self, locator: &Locator) -> Result<WebDriverElement, ActionError> {
        let query = normalize(locator, false);
        let element = self
            .client
            .find(to_driver_locator(&query))
            .await
            .map_err(|err| map_cmd_error(err, &locator.to_string()))?;
        Ok(WebDriverElement {
            label: locator.to_string(),
            element,
        })
    }

    async fn quit(&self) -> Result<(), ActionError> {
        info!(session = %self.id, "Closing WebDriver session");
        self.client
            .clone()
            .close()
            .await
            .map_err(|err| ActionError::Driver(format!("failed to close session: {}", err)))
    }
}

/// Element found through WebDriver
#[derive(Clone)]
pub struct WebDriverElement {
    label: String,
    element: fantoccini::elements::Element,
}

#[async_trait]
impl ElementHandle for WebDriverElement {
    async fn is_displayed(&self) -> Result<bool, ActionError> {
        self.element
            .is_displayed()
            .await
            .map_err(|err| map_cmd_error(err, &self.label))
    }

    async fn is_selected(&self) -> Result<bool, ActionError> {
        self.element
            .is_selected()
            .await
            .map_err(|err| map_cmd_error(err, &self.label))
    }

    async fn click(&self) -> Result<(), ActionError> {
        self.element
            .click()
            .await
            .map_err(|err| map_cmd_error(err, &self.label))
    }

    async fn send_keys(&self, text: &str) -> Result<(), ActionError> {
        self.element
            .send_keys(text)
            .await
            .map_err(|err| map_cmd_error(err, &self.label))
    }

    async fn find_element(&self, locator: &Locator) -> Result<WebDriverElement, ActionError> {
        let query = normalize(locator, true);
        let element = self
            .element
            .find(to_driver_locator(&query))
            .await
            .map_err(|err| map_cmd_error(err, &locator.to_string()))?;
        Ok(WebDriverElement {
            label: format!("{} > {}", self.label, locator),
            element,
        })
    }
}

/// Rewrite strategies WebDriver lacks. Scoped searches get a relative path.
fn normalize(locator: &Locator, scoped: bool) -> Cow<'_, Locator> {
    match locator {
        Locator::PartialLinkText(text) => {
            let xpath = partial_link_xpath(text);
            Cow::Owned(Locator::XPath(if scoped {
                format!(".{}", xpath)
            } else {
                xpath
            }))
        }
        other => Cow::Borrowed(other),
    }
}

/// Expects a locator passed through [`normalize`].
fn to_driver_locator(locator: &Locator) -> fantoccini::Locator<'_> {
    match locator {
        Locator::Id(v) => fantoccini::Locator::Id(v),
        Locator::XPath(v) => fantoccini::Locator::XPath(v),
        Locator::Css(v) => fantoccini::Locator::Css(v),
        Locator::LinkText(v) | Locator::PartialLinkText(v) => fantoccini::Locator::LinkText(v),
    }
}

fn map_cmd_error(err: CmdError, target: &str) -> ActionError {
    if matches!(err, CmdError::NoSuchElement(_)) {
        return ActionError::NotFound(target.to_string());
    }
    let message = err.to_string();
    if message.contains("not interactable") || message.contains("click intercepted") {
        ActionError::NotInteractable(format!("{}: {}", target, message))
    } else {
        ActionError::Driver(format!("{}: {}", target, message))
    }
}
