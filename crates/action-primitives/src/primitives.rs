//! Action primitives implementation
//!
//! Five primitives, each built as "wait for element, assert visible, act":
//! 1. navigate - Load a URL
//! 2. click - Click an element
//! 3. type_text - Send keys to an element
//! 4. select - Pick an `<option>` by its label
//! 5. check - Click a checkbox only when it is not selected yet

mod check;
mod click;
mod navigate;
mod select;
mod type_text;

pub use check::*;
pub use click::*;
pub use navigate::*;
pub use select::*;
pub use type_text::*;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    errors::ActionError,
    session::{BrowserSession, ElementHandle},
    types::{ActionReport, Locator, WaitPolicy},
    waiting::FluentWait,
};

/// Action primitives trait
///
/// Every primitive waits for its target with the bounded polling wait and,
/// unless told otherwise, refuses to act on an element that is not
/// displayed.
#[async_trait]
pub trait ActionPrimitives<S: BrowserSession>: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, session: &S, url: &str) -> Result<ActionReport, ActionError>;

    /// Click an element
    async fn click(
        &self,
        session: &S,
        locator: &Locator,
        assert_visible: bool,
    ) -> Result<ActionReport, ActionError>;

    /// Type text into an element
    async fn type_text(
        &self,
        session: &S,
        locator: &Locator,
        text: &str,
        assert_visible: bool,
    ) -> Result<ActionReport, ActionError>;

    /// Select an option of a dropdown by its label
    async fn select(
        &self,
        session: &S,
        locator: &Locator,
        option: &str,
        assert_visible: bool,
    ) -> Result<ActionReport, ActionError>;

    /// Make sure a checkbox ends up selected
    async fn check(
        &self,
        session: &S,
        locator: &Locator,
        assert_visible: bool,
    ) -> Result<ActionReport, ActionError>;
}

/// Default implementation of action primitives
#[derive(Debug, Clone, Default)]
pub struct DefaultActionPrimitives {
    wait: FluentWait,
}

impl DefaultActionPrimitives {
    pub fn new(policy: WaitPolicy) -> Result<Self, ActionError> {
        Ok(Self {
            wait: FluentWait::new(policy)?,
        })
    }

    pub fn wait(&self) -> &FluentWait {
        &self.wait
    }

    /// Wait for `locator` to be present, then optionally require it to be
    /// displayed.
    pub async fn locate<S: BrowserSession>(
        &self,
        session: &S,
        locator: &Locator,
        assert_visible: bool,
    ) -> Result<S::Element, ActionError> {
        let element = self
            .wait
            .presence_of_element_located(session, locator)
            .await
            .map_err(|err| ActionError::lookup(locator.to_string(), err))?;

        if assert_visible {
            let displayed = element
                .is_displayed()
                .await
                .map_err(|err| ActionError::lookup(locator.to_string(), err))?;
            if !displayed {
                return Err(ActionError::NotDisplayed(locator.to_string()));
            }
        } else {
            debug!(locator = %locator, "visibility assertion skipped");
        }
        Ok(element)
    }
}

#[async_trait]
impl<S: BrowserSession> ActionPrimitives<S> for DefaultActionPrimitives {
    async fn navigate(&self, session: &S, url: &str) -> Result<ActionReport, ActionError> {
        navigate::execute_navigate(session, url).await
    }

    async fn click(
        &self,
        session: &S,
        locator: &Locator,
        assert_visible: bool,
    ) -> Result<ActionReport, ActionError> {
        click::execute_click(self, session, locator, assert_visible).await
    }

    async fn type_text(
        &self,
        session: &S,
        locator: &Locator,
        text: &str,
        assert_visible: bool,
    ) -> Result<ActionReport, ActionError> {
        type_text::execute_type_text(self, session, locator, text, assert_visible).await
    }

    async fn select(
        &self,
        session: &S,
        locator: &Locator,
        option: &str,
        assert_visible: bool,
    ) -> Result<ActionReport, ActionError> {
        select::execute_select(self, session, locator, option, assert_visible).await
    }

    async fn check(
        &self,
        session: &S,
        locator: &Locator,
        assert_visible: bool,
    ) -> Result<ActionReport, ActionError> {
        check::execute_check(self, session, locator, assert_visible).await
    }
}
