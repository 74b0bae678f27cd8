//! Browser capabilities consumed by the wait core and the primitives

use async_trait::async_trait;

use crate::{errors::ActionError, types::Locator};

/// Handle to one element on the current page.
///
/// Handles are owned by the caller for the duration of a single action.
#[async_trait]
pub trait ElementHandle: Send + Sync + Sized {
    async fn is_displayed(&self) -> Result<bool, ActionError>;

    async fn is_selected(&self) -> Result<bool, ActionError>;

    async fn click(&self) -> Result<(), ActionError>;

    async fn send_keys(&self, text: &str) -> Result<(), ActionError>;

    /// Search below this element
    async fn find_element(&self, locator: &Locator) -> Result<Self, ActionError>;
}

/// A live browser session.
///
/// Lookups that miss must fail with [`ActionError::NotFound`] so that the
/// polling wait can tell "not there yet" apart from real failures.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    type Element: ElementHandle;

    async fn navigate(&self, url: &str) -> Result<(), ActionError>;

    async fn find_element(&self, locator: &Locator) -> Result<Self::Element, ActionError>;

    /// Release the underlying browser. Called once per session.
    async fn quit(&self) -> Result<(), ActionError>;
}
