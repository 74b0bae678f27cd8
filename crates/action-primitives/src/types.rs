//! Core data types for action primitives

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::errors::{ActionError, ErrorKind};

/// Default total timeout for a single wait (milliseconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default delay between two predicate evaluations (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Opaque element query.
///
/// The wait core never looks inside a locator; only the session
/// implementation translates it into a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// Element `id` attribute
    Id(String),

    /// XPath expression
    #[serde(rename = "xpath")]
    XPath(String),

    /// CSS selector
    Css(String),

    /// Exact link text
    LinkText(String),

    /// Substring of link text
    PartialLinkText(String),
}

impl Locator {
    pub fn id(value: impl Into<String>) -> Self {
        Locator::Id(value.into())
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Locator::XPath(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Locator::Css(value.into())
    }

    pub fn link_text(value: impl Into<String>) -> Self {
        Locator::LinkText(value.into())
    }

    pub fn partial_link_text(value: impl Into<String>) -> Self {
        Locator::PartialLinkText(value.into())
    }

    /// Raw query string without the strategy prefix
    pub fn value(&self) -> &str {
        match self {
            Locator::Id(v)
            | Locator::XPath(v)
            | Locator::Css(v)
            | Locator::LinkText(v)
            | Locator::PartialLinkText(v) => v,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(v) => write!(f, "id={}", v),
            Locator::XPath(v) => write!(f, "xpath={}", v),
            Locator::Css(v) => write!(f, "css={}", v),
            Locator::LinkText(v) => write!(f, "linkText={}", v),
            Locator::PartialLinkText(v) => write!(f, "partialLinkText={}", v),
        }
    }
}

/// Polling wait configuration.
///
/// Failures whose kind is listed in `ignoring` mean "not ready yet"; any
/// other failure aborts the wait immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitPolicy {
    /// Total time budget (milliseconds)
    pub timeout_ms: u64,

    /// Delay between evaluations (milliseconds)
    pub poll_interval_ms: u64,

    /// Error kinds treated as transient
    pub ignoring: Vec<ErrorKind>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            ignoring: vec![ErrorKind::NotFound],
        }
    }
}

impl WaitPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Add an error kind to the transient set
    pub fn ignoring(mut self, kind: ErrorKind) -> Self {
        if !self.ignoring.contains(&kind) {
            self.ignoring.push(kind);
        }
        self
    }

    pub fn ignores(&self, kind: ErrorKind) -> bool {
        self.ignoring.contains(&kind)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject policies that would spin without sleeping.
    pub fn validate(&self) -> Result<(), ActionError> {
        if self.poll_interval_ms == 0 {
            return Err(ActionError::InvalidPolicy(
                "poll interval must be greater than 0".to_string(),
            ));
        }
        if self.ignores(ErrorKind::WaitTimeout) {
            return Err(ActionError::InvalidPolicy(
                "wait timeouts cannot be ignored".to_string(),
            ));
        }
        Ok(())
    }

    /// A policy whose interval reaches the timeout polls at most twice.
    pub fn is_degenerate(&self) -> bool {
        self.poll_interval_ms >= self.timeout_ms
    }
}

/// Outcome record of one primitive action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionReport {
    /// Unique identifier for correlation in logs
    pub action_id: String,

    /// Primitive name (`click`, `type_text`, ...)
    pub action: String,

    /// Target of the action, if any
    pub target: Option<String>,

    /// Whether the action succeeded
    pub ok: bool,

    /// When the action started
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,

    /// When the action finished
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub finished_at: DateTime<Utc>,

    /// Total latency in milliseconds, including the wait
    pub latency_ms: u64,

    /// Error details (if failed)
    pub error: Option<String>,
}

impl ActionReport {
    /// Create a successful action report
    pub fn success(
        action: &str,
        target: Option<String>,
        started_at: DateTime<Utc>,
        latency_ms: u64,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action: action.to_string(),
            target,
            ok: true,
            started_at,
            finished_at: Utc::now(),
            latency_ms,
            error: None,
        }
    }

    /// Create a failed action report
    pub fn failure(
        action: &str,
        target: Option<String>,
        started_at: DateTime<Utc>,
        latency_ms: u64,
        error: &ActionError,
    ) -> Self {
        Self {
            ok: false,
            error: Some(error.to_string()),
            ..Self::success(action, target, started_at, latency_ms)
        }
    }
}
