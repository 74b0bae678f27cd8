use std::env;

use action_primitives::{
    webdriver::{WebDriverConfig, WebDriverSession},
    BrowserSession, DefaultActionPrimitives, ActionPrimitives, ActionError, Locator, WaitPolicy,
};

/// Needs a chromedriver listening on ROBOT_WEBDRIVER_URL
#[tokio::test]
async fn webdriver_session_waits_and_clicks() -> Result<(), ActionError> {
    const TOGGLE: &str = "ROBOT_CHROMEDRIVER_SMOKE";
    let enabled = env::var(TOGGLE).unwrap_or_default();
    if enabled.is_empty() || enabled == "0" {
        eprintln!("skipping chromedriver smoke test (set {TOGGLE}=1 and start chromedriver)");
        return Ok(());
    }

    let config = WebDriverConfig {
        url: env::var("ROBOT_WEBDRIVER_URL")
            .unwrap_or_else(|_| "http://localhost:4444".to_string()),
        headless: true,
        ..WebDriverConfig::default()
    };
    let session = WebDriverSession::connect(&config).await?;
    let primitives = DefaultActionPrimitives::new(WaitPolicy::default().with_timeout_ms(2_000))?;

    let page = "data:text/html,<a href='%23done' id='go'>Go</a><select id='s'><option>Oberon</option></select>";
    let outcome = async {
        primitives.navigate(&session, page).await?;
        primitives.click(&session, &Locator::id("go"), true).await?;
        primitives
            .select(&session, &Locator::id("s"), "Oberon", true)
            .await?;
        let missing = primitives
            .click(&session, &Locator::id("absent"), true)
            .await;
        assert!(matches!(missing, Err(ActionError::WaitTimeout { .. })));
        Ok::<_, ActionError>(())
    }
    .await;

    session.quit().await?;
    outcome
}
