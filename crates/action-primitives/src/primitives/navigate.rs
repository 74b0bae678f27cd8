//! Navigate primitive - Load a URL

use crate::{errors::ActionError, session::BrowserSession, types::ActionReport};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info};

const SUPPORTED_SCHEMES: [&str; 4] = ["http://", "https://", "file://", "data:"];

/// Execute navigate primitive
///
/// Navigation does not wait for any element; the next step's wait covers
/// page load.
pub async fn execute_navigate<S: BrowserSession>(
    session: &S,
    url: &str,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    info!(url = %url, "Executing navigate primitive");

    if url.is_empty() {
        return Err(ActionError::Internal("URL cannot be empty".to_string()));
    }

    if !SUPPORTED_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        return Err(ActionError::Internal(format!(
            "Invalid URL scheme: {}",
            url
        )));
    }

    debug!("Issuing navigation");
    session.navigate(url).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(latency_ms = latency_ms, "Navigate completed successfully");

    Ok(ActionReport::success(
        "navigate",
        Some(url.to_string()),
        started_at,
        latency_ms,
    ))
}
