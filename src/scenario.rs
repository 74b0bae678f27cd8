//! Built-in LMS quiz scenario
//!
//! Logs in through SSO, opens the course quiz, answers the four questions
//! and moves to the next page. Credentials are `%username%` and
//! `%password%` placeholders filled from `--param`.

use std::path::Path;

use action_flow::{ActionType, Flow, FlowStep};
use action_primitives::{
    simulated::{ElementSpec, SimulatedBrowser},
    Locator, WaitPolicy,
};
use anyhow::{Context, Result};

use crate::errors::RunnerError;

pub const QUIZ_FLOW_ID: &str = "moodle-quiz";
pub const SITE_URL: &str = "https://moodle.fel.cvut.cz/";

pub const NAVBAR_LOGIN: &str = "//a[@data-cy='navbar-login-a']";
pub const SSO_LOGIN: &str = "//a[@data-cy='login-sso-a']";
pub const DO_NOT_CACHE: &str = "//*[@type='checkbox'][@id='donotcache']";
pub const SSO_PROCEED: &str = "//*[@type='submit'][@class='btn'][@name='_eventId_proceed']";
pub const MY_COURSES: &str = "//*[@class='header-moodle-main-anchor-text nav-link']";
pub const COURSE_LINK_TEXT: &str = "Software Testing";
pub const QUIZ_EVENT: &str = "//*[@data-event-id='40823']";
pub const GO_TO_ACTIVITY: &str = "Go to activity";
pub const ATTEMPT_QUIZ: &str = "//*[@type='submit'][@class='btn btn-primary']";
pub const START_ATTEMPT: &str = "//*[@type='submit'][@value='Start attempt']";
pub const ESSAY_RESPONSE: &str = "//*[contains(@class, 'qtype_essay_response')]";
pub const NUMERIC_ANSWER: &str = "//*[contains(@name, '2_answer')][contains(@class, 'form-control')]";
pub const PLANET_SELECT: &str = "//*[contains(@id, '3_p1')]";
pub const COUNTRY_SELECT: &str = "//*[contains(@id, '4_p1')]";
pub const NEXT_PAGE: &str = "mod_quiz-next-nav";

pub const ESSAY_ANSWER: &str = "Vladimir Zubkov, paralelka cvičení 106";
pub const NUMERIC_VALUE: &str = "86400";
pub const PLANET_OPTION: &str = "Oberon";
pub const COUNTRY_OPTION: &str = "Rumunsko";

fn click(id: &str, description: &str, locator: Locator) -> FlowStep {
    FlowStep::new(id, description, ActionType::Click { locator })
}

fn type_text(id: &str, description: &str, locator: Locator, text: &str) -> FlowStep {
    FlowStep::new(
        id,
        description,
        ActionType::TypeText {
            locator,
            text: text.to_string(),
        },
    )
}

fn select(id: &str, description: &str, locator: Locator, option: &str) -> FlowStep {
    FlowStep::new(
        id,
        description,
        ActionType::SelectOption {
            locator,
            option: option.to_string(),
        },
    )
}

/// The nineteen steps of the quiz run
pub fn quiz_flow(wait: WaitPolicy) -> Flow {
    let steps = vec![
        FlowStep::new(
            "open-site",
            "open the LMS front page",
            ActionType::Navigate {
                url: SITE_URL.to_string(),
            },
        ),
        click("navbar-login", "click the navbar login link", Locator::xpath(NAVBAR_LOGIN)),
        click("sso-login", "choose SSO login", Locator::xpath(SSO_LOGIN)),
        type_text("username", "type the username", Locator::id("username"), "%username%"),
        type_text("password", "type the password", Locator::id("password"), "%password%"),
        FlowStep::new(
            "do-not-cache",
            "tick 'do not cache' if it is not ticked",
            ActionType::Check {
                locator: Locator::xpath(DO_NOT_CACHE),
            },
        )
        .best_effort()
        .skip_visibility_check(),
        click("sso-proceed", "submit the SSO form", Locator::xpath(SSO_PROCEED)),
        click("my-courses", "open 'My courses'", Locator::xpath(MY_COURSES)).best_effort(),
        click(
            "open-course",
            "open the course",
            Locator::partial_link_text(COURSE_LINK_TEXT),
        )
        .best_effort(),
        click("quiz-event", "open the quiz event pop-up", Locator::xpath(QUIZ_EVENT)),
        click("go-to-activity", "follow 'Go to activity'", Locator::link_text(GO_TO_ACTIVITY)),
        click("attempt-quiz", "click 'Attempt quiz'", Locator::xpath(ATTEMPT_QUIZ)),
        click("start-attempt", "confirm 'Start attempt'", Locator::xpath(START_ATTEMPT)),
        click("focus-essay", "focus the essay response", Locator::xpath(ESSAY_RESPONSE)),
        type_text("essay-answer", "answer the essay question", Locator::xpath(ESSAY_RESPONSE), ESSAY_ANSWER),
        type_text("numeric-answer", "answer the numeric question", Locator::xpath(NUMERIC_ANSWER), NUMERIC_VALUE),
        select("planet", "pick the planet", Locator::xpath(PLANET_SELECT), PLANET_OPTION),
        select("country", "pick the country", Locator::xpath(COUNTRY_SELECT), COUNTRY_OPTION),
        click("next-page", "go to the next page", Locator::id(NEXT_PAGE)),
    ];

    Flow::new(QUIZ_FLOW_ID, "LMS quiz attempt", steps)
        .with_description("SSO login, quiz start and answers on the course LMS")
        .with_wait_policy(wait)
}

/// A page holding every element the quiz run touches. Elements show up with
/// small delays so the waits have something to poll for.
pub fn simulated_quiz_page() -> SimulatedBrowser {
    SimulatedBrowser::new().with_elements([
        ElementSpec::new(Locator::xpath(NAVBAR_LOGIN)).appear_after_ms(40),
        ElementSpec::new(Locator::xpath(SSO_LOGIN)).appear_after_ms(25),
        ElementSpec::new(Locator::id("username")).appear_after_ms(60),
        ElementSpec::new(Locator::id("password")),
        ElementSpec::new(Locator::xpath(DO_NOT_CACHE)).hidden(),
        ElementSpec::new(Locator::xpath(SSO_PROCEED)),
        ElementSpec::new(Locator::xpath(MY_COURSES)).appear_after_ms(120),
        ElementSpec::new(Locator::partial_link_text(COURSE_LINK_TEXT)).appear_after_ms(30),
        ElementSpec::new(Locator::xpath(QUIZ_EVENT)),
        ElementSpec::new(Locator::link_text(GO_TO_ACTIVITY)).appear_after_ms(15),
        ElementSpec::new(Locator::xpath(ATTEMPT_QUIZ)).appear_after_ms(80),
        ElementSpec::new(Locator::xpath(START_ATTEMPT)),
        ElementSpec::new(Locator::xpath(ESSAY_RESPONSE)).appear_after_ms(200),
        ElementSpec::new(Locator::xpath(NUMERIC_ANSWER)),
        ElementSpec::new(Locator::xpath(PLANET_SELECT))
            .with_options(["Titan", "Europa", "Oberon"]),
        ElementSpec::new(Locator::xpath(COUNTRY_SELECT))
            .with_options(["Bulharsko", "Rumunsko", "Slovinsko"]),
        ElementSpec::new(Locator::id(NEXT_PAGE)),
    ])
}

/// Read a flow document. `.json` files are parsed as JSON, anything else
/// as YAML.
pub async fn load_flow_file(path: &Path) -> Result<Flow> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| RunnerError::FlowFile {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

    let flow = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON flow {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML flow {}", path.display()))?
    };
    Ok(flow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_flow::FailureStrategy;

    #[test]
    fn quiz_has_nineteen_steps_with_unique_ids() {
        let flow = quiz_flow(WaitPolicy::default());
        assert_eq!(flow.steps.len(), 19);

        let mut ids: Vec<_> = flow.steps.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 19);
    }

    #[test]
    fn only_three_steps_are_best_effort() {
        let flow = quiz_flow(WaitPolicy::default());
        let lenient: Vec<_> = flow
            .steps
            .iter()
            .filter(|step| flow.strategy_for(step) == FailureStrategy::Continue)
            .map(|step| step.id.as_str())
            .collect();

        assert_eq!(lenient, vec!["do-not-cache", "my-courses", "open-course"]);
    }

    #[test]
    fn only_checkbox_skips_visibility() {
        let flow = quiz_flow(WaitPolicy::default());
        let unchecked: Vec<_> = flow
            .steps
            .iter()
            .filter(|step| !step.assert_visible)
            .map(|step| step.id.as_str())
            .collect();

        assert_eq!(unchecked, vec!["do-not-cache"]);
    }

    #[tokio::test]
    async fn flow_file_round_trips_through_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.yaml");
        let flow = quiz_flow(WaitPolicy::default().with_timeout_ms(3000));
        tokio::fs::write(&path, serde_yaml::to_string(&flow).unwrap())
            .await
            .unwrap();

        let loaded = load_flow_file(&path).await.unwrap();

        assert_eq!(loaded.id, QUIZ_FLOW_ID);
        assert_eq!(loaded.wait.timeout_ms, 3000);
        assert_eq!(loaded.steps[16].action, flow.steps[16].action);
    }

    #[tokio::test]
    async fn hand_written_json_flow_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.json");
        let json = r#"{
            "id": "short",
            "name": "Short",
            "steps": [
                {"id": "open", "action": {"type": "navigate", "url": "https://lms.example"}},
                {"id": "go", "action": {"type": "click", "locator": {"by": "id", "value": "go"}},
                 "failure_strategy": "continue"}
            ]
        }"#;
        tokio::fs::write(&path, json).await.unwrap();

        let flow = load_flow_file(&path).await.unwrap();

        assert_eq!(flow.steps.len(), 2);
        assert!(flow.steps[1].assert_visible);
        assert_eq!(flow.steps[1].failure_strategy, Some(FailureStrategy::Continue));
        assert_eq!(flow.wait, WaitPolicy::default());
    }

    #[tokio::test]
    async fn missing_flow_file_is_reported() {
        let err = load_flow_file(Path::new("/nonexistent/flow.yaml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot read flow file"));
    }
}
