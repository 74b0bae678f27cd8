//! Select primitive - Pick an option of a dropdown by its label

use crate::{
    errors::ActionError,
    locator::option_locator,
    primitives::DefaultActionPrimitives,
    session::{BrowserSession, ElementHandle},
    types::{ActionReport, Locator},
};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info};

/// Execute select primitive
///
/// Steps:
/// 1. Wait for the select element and assert it is displayed
/// 2. Find the `<option>` whose normalized text equals `option`
/// 3. Click the option
/// 4. Generate action report
pub async fn execute_select<S: BrowserSession>(
    primitives: &DefaultActionPrimitives,
    session: &S,
    locator: &Locator,
    option: &str,
    assert_visible: bool,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    info!(
        locator = %locator,
        option = %option,
        "Executing select primitive"
    );

    if option.trim().is_empty() {
        return Err(ActionError::OptionNotFound(
            "Option label cannot be empty".to_string(),
        ));
    }

    let select = primitives.locate(session, locator, assert_visible).await?;

    debug!("Finding option: {}", option);
    let choice = select
        .find_element(&option_locator(option))
        .await
        .map_err(|err| match err {
            ActionError::NotFound(_) => {
                debug!(locator = %locator, option = %option, "option missing");
                ActionError::OptionNotFound(format!("'{}' in {}", option, locator))
            }
            other => other,
        })?;

    choice.click().await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(latency_ms = latency_ms, "Select completed successfully");

    Ok(ActionReport::success(
        "select_option",
        Some(format!("{} -> {}", locator, option)),
        started_at,
        latency_ms,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::{ElementSpec, Interaction, SimulatedBrowser};

    fn planets() -> SimulatedBrowser {
        SimulatedBrowser::new().with_element(
            ElementSpec::new(Locator::xpath("//*[contains(@id, '3_p1')]"))
                .with_options(["Jupiter", "Oberon"]),
        )
    }

    #[tokio::test]
    async fn clicks_matching_option() {
        let browser = planets();
        let primitives = DefaultActionPrimitives::default();

        let report = execute_select(
            &primitives,
            &browser,
            &Locator::xpath("//*[contains(@id, '3_p1')]"),
            "Oberon",
            true,
        )
        .await
        .unwrap();

        assert!(report.ok);
        assert_eq!(report.action, "select_option");
        assert_eq!(
            browser.interactions(),
            vec![Interaction::Click {
                target: option_locator("Oberon").to_string()
            }]
        );
    }

    #[tokio::test]
    async fn unknown_option_is_reported() {
        let browser = planets();
        let primitives = DefaultActionPrimitives::default();

        let result = execute_select(
            &primitives,
            &browser,
            &Locator::xpath("//*[contains(@id, '3_p1')]"),
            "Pluto",
            true,
        )
        .await;

        assert!(matches!(result, Err(ActionError::OptionNotFound(_))));
    }
}
