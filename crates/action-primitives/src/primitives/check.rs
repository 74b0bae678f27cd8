//! Check primitive - Select a checkbox unless it already is

use crate::{
    errors::ActionError,
    primitives::DefaultActionPrimitives,
    session::{BrowserSession, ElementHandle},
    types::{ActionReport, Locator},
};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info};

/// Execute check primitive
///
/// Already selected checkboxes are left alone; clicking would clear them.
pub async fn execute_check<S: BrowserSession>(
    primitives: &DefaultActionPrimitives,
    session: &S,
    locator: &Locator,
    assert_visible: bool,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    info!(locator = %locator, "Executing check primitive");

    let element = primitives.locate(session, locator, assert_visible).await?;

    if element.is_selected().await? {
        debug!(locator = %locator, "checkbox already selected");
    } else {
        element.click().await?;
    }

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(latency_ms = latency_ms, "Check completed successfully");

    Ok(ActionReport::success(
        "check",
        Some(locator.to_string()),
        started_at,
        latency_ms,
    ))
}
