//! Type text primitive - Send keys to input fields

use crate::{
    errors::ActionError,
    primitives::DefaultActionPrimitives,
    session::{BrowserSession, ElementHandle},
    types::{ActionReport, Locator},
};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info};

/// Execute type_text primitive
///
/// Keys are appended to whatever the field already holds.
pub async fn execute_type_text<S: BrowserSession>(
    primitives: &DefaultActionPrimitives,
    session: &S,
    locator: &Locator,
    text: &str,
    assert_visible: bool,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    // Text may hold credentials; only its length is logged.
    info!(
        locator = %locator,
        text_length = text.chars().count(),
        "Executing type_text primitive"
    );

    if text.is_empty() {
        return Err(ActionError::Internal("Text cannot be empty".to_string()));
    }

    let element = primitives.locate(session, locator, assert_visible).await?;

    debug!("Typing {} characters", text.chars().count());
    element.send_keys(text).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(latency_ms = latency_ms, "Type text completed successfully");

    Ok(ActionReport::success(
        "type_text",
        Some(locator.to_string()),
        started_at,
        latency_ms,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::{ElementSpec, Interaction, SimulatedBrowser};

    #[tokio::test(start_paused = true)]
    async fn types_into_late_field() {
        let browser = SimulatedBrowser::new()
            .with_element(ElementSpec::new(Locator::id("username")).appear_after_ms(40));
        let primitives = DefaultActionPrimitives::default();

        execute_type_text(&primitives, &browser, &Locator::id("username"), "student", true)
            .await
            .unwrap();

        assert_eq!(
            browser.interactions(),
            vec![Interaction::Type {
                target: "id=username".to_string(),
                text: "student".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn typing_failure_is_returned() {
        let browser = SimulatedBrowser::new().with_element(
            ElementSpec::new(Locator::id("answer"))
                .failing_typing(ActionError::NotInteractable("readonly".to_string())),
        );
        let primitives = DefaultActionPrimitives::default();

        let result =
            execute_type_text(&primitives, &browser, &Locator::id("answer"), "86400", true).await;
        assert!(matches!(result, Err(ActionError::NotInteractable(_))));
    }
}
