//! Error types for action primitives

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discriminant of [`ActionError`], used by wait policies to decide which
/// failures mean "not ready yet" and which are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    WaitTimeout,
    NotDisplayed,
    NotInteractable,
    OptionNotFound,
    LookupFailed,
    Driver,
    InvalidPolicy,
    Internal,
}

/// Part of a primitive that failed: waiting for and checking the target,
/// or interacting with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPhase {
    Locate,
    Act,
}

/// Error types for action primitive operations
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// Target element absent at the time of the query
    #[error("Element not found: {0}")]
    NotFound(String),

    /// Wait operation ran out of time
    #[error(
        "Wait timeout after {elapsed_ms}ms waiting for {what} (last cause: {})",
        describe_cause(.last_cause)
    )]
    WaitTimeout {
        what: String,
        elapsed_ms: u64,
        last_cause: Option<Box<ActionError>>,
    },

    /// Element was found but is not rendered
    #[error("Element not displayed: {0}")]
    NotDisplayed(String),

    /// Element rejected the interaction (click, typing)
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// Dropdown option was not found
    #[error("Option not found in dropdown: {0}")]
    OptionNotFound(String),

    /// Looking the target up failed for a reason other than absence
    #[error("Lookup of {what} failed: {source}")]
    LookupFailed {
        what: String,
        source: Box<ActionError>,
    },

    /// WebDriver communication or protocol error
    #[error("Driver error: {0}")]
    Driver(String),

    /// Wait policy cannot be honoured
    #[error("Invalid wait policy: {0}")]
    InvalidPolicy(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::NotFound(_) => ErrorKind::NotFound,
            ActionError::WaitTimeout { .. } => ErrorKind::WaitTimeout,
            ActionError::NotDisplayed(_) => ErrorKind::NotDisplayed,
            ActionError::NotInteractable(_) => ErrorKind::NotInteractable,
            ActionError::OptionNotFound(_) => ErrorKind::OptionNotFound,
            ActionError::LookupFailed { .. } => ErrorKind::LookupFailed,
            ActionError::Driver(_) => ErrorKind::Driver,
            ActionError::InvalidPolicy(_) => ErrorKind::InvalidPolicy,
            ActionError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Which part of a primitive produced this error.
    pub fn phase(&self) -> ActionPhase {
        match self {
            ActionError::NotFound(_)
            | ActionError::WaitTimeout { .. }
            | ActionError::NotDisplayed(_)
            | ActionError::LookupFailed { .. }
            | ActionError::InvalidPolicy(_) => ActionPhase::Locate,
            ActionError::NotInteractable(_)
            | ActionError::OptionNotFound(_)
            | ActionError::Driver(_)
            | ActionError::Internal(_) => ActionPhase::Act,
        }
    }

    /// Wrap a lookup failure so it reports the locate phase
    pub fn lookup(what: impl Into<String>, err: ActionError) -> Self {
        match err.phase() {
            ActionPhase::Locate => err,
            ActionPhase::Act => ActionError::LookupFailed {
                what: what.into(),
                source: Box::new(err),
            },
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ActionError::WaitTimeout { .. })
    }

    /// The last ignored failure recorded before a timeout, if any.
    pub fn last_cause(&self) -> Option<&ActionError> {
        match self {
            ActionError::WaitTimeout { last_cause, .. } => last_cause.as_deref(),
            _ => None,
        }
    }
}

fn describe_cause(cause: &Option<Box<ActionError>>) -> String {
    match cause {
        Some(cause) => cause.to_string(),
        None => "none recorded".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_carries_last_cause() {
        let err = ActionError::WaitTimeout {
            what: "id=username".to_string(),
            elapsed_ms: 5000,
            last_cause: Some(Box::new(ActionError::NotFound("id=username".to_string()))),
        };
        let message = err.to_string();
        assert!(message.contains("5000ms"));
        assert!(message.contains("Element not found: id=username"));
        assert_eq!(err.kind(), ErrorKind::WaitTimeout);
        assert_eq!(err.last_cause().map(ActionError::kind), Some(ErrorKind::NotFound));
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&ErrorKind::NotDisplayed).unwrap();
        assert_eq!(json, "\"not_displayed\"");
    }

    #[test]
    fn lookup_errors_report_locate_phase() {
        let timeout = ActionError::WaitTimeout {
            what: "id=go".to_string(),
            elapsed_ms: 5000,
            last_cause: None,
        };
        assert_eq!(timeout.phase(), ActionPhase::Locate);
        assert_eq!(
            ActionError::NotDisplayed("id=go".to_string()).phase(),
            ActionPhase::Locate
        );
        assert_eq!(
            ActionError::NotInteractable("id=go".to_string()).phase(),
            ActionPhase::Act
        );

        let wrapped = ActionError::lookup("id=go", ActionError::Driver("session lost".to_string()));
        assert_eq!(wrapped.kind(), ErrorKind::LookupFailed);
        assert_eq!(wrapped.phase(), ActionPhase::Locate);
        assert!(wrapped.to_string().contains("session lost"));

        let kept = ActionError::lookup("id=go", ActionError::NotDisplayed("id=go".to_string()));
        assert!(matches!(kept, ActionError::NotDisplayed(_)));
    }
}
