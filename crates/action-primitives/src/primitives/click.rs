//! Click primitive

use crate::{
    errors::ActionError,
    primitives::DefaultActionPrimitives,
    session::{BrowserSession, ElementHandle},
    types::{ActionReport, Locator},
};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info};

/// Execute click primitive
///
/// Steps:
/// 1. Wait for the element to be present
/// 2. Assert it is displayed (unless skipped)
/// 3. Click it
/// 4. Generate action report
pub async fn execute_click<S: BrowserSession>(
    primitives: &DefaultActionPrimitives,
    session: &S,
    locator: &Locator,
    assert_visible: bool,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    info!(locator = %locator, "Executing click primitive");

    let element = primitives.locate(session, locator, assert_visible).await?;

    debug!("Clicking element");
    element.click().await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(
        locator = %locator,
        latency_ms = latency_ms,
        "Click completed successfully"
    );

    Ok(ActionReport::success(
        "click",
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
    async fn click_waits_for_late_element() {
        let browser = SimulatedBrowser::new()
            .with_element(ElementSpec::new(Locator::link_text("Go to activity")).appear_after_ms(70));
        let primitives = DefaultActionPrimitives::default();

        let report = execute_click(&primitives, &browser, &Locator::link_text("Go to activity"), true)
            .await
            .unwrap();

        assert!(report.ok);
        assert_eq!(
            browser.interactions(),
            vec![Interaction::Click {
                target: "linkText=Go to activity".to_string()
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn click_failure_is_returned() {
        let browser = SimulatedBrowser::new().with_element(
            ElementSpec::new(Locator::id("mod_quiz-next-nav"))
                .failing_click(ActionError::NotInteractable("overlay".to_string())),
        );
        let primitives = DefaultActionPrimitives::default();

        let err = execute_click(&primitives, &browser, &Locator::id("mod_quiz-next-nav"), true)
            .await
            .unwrap_err();

        assert!(matches!(err, ActionError::NotInteractable(_)));
        assert!(browser.interactions().is_empty());
    }
}
