//! Bounded polling wait

use std::future::Future;

use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, trace, warn};

use crate::{
    errors::{ActionError, ErrorKind},
    session::{BrowserSession, ElementHandle},
    types::{Locator, WaitPolicy},
};

/// Re-evaluates a predicate until it succeeds, fails fatally, or the policy
/// timeout runs out.
///
/// The first evaluation happens immediately. After a transient failure the
/// wait sleeps for the poll interval, clamped to the deadline, so the last
/// evaluation lands on the deadline itself. A single evaluation that hangs
/// is cut off one interval past the deadline.
#[derive(Debug, Clone)]
pub struct FluentWait {
    policy: WaitPolicy,
}

impl Default for FluentWait {
    /// 5000 ms timeout, 10 ms interval, ignoring `NotFound`
    fn default() -> Self {
        Self {
            policy: WaitPolicy::default(),
        }
    }
}

impl FluentWait {
    pub fn new(policy: WaitPolicy) -> Result<Self, ActionError> {
        policy.validate()?;
        if policy.is_degenerate() {
            warn!(
                timeout_ms = policy.timeout_ms,
                poll_interval_ms = policy.poll_interval_ms,
                "poll interval is not shorter than the timeout; the wait retries at most once"
            );
        }
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    /// Poll `predicate` until it yields a value.
    ///
    /// `what` names the target in logs and in the timeout error.
    pub async fn until<T, F, Fut>(&self, what: &str, mut predicate: F) -> Result<T, ActionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ActionError>>,
    {
        let started = Instant::now();
        let deadline = started + self.policy.timeout();
        let hard_stop = deadline + self.policy.poll_interval();
        let mut attempts: u32 = 0;
        let mut last_cause: Option<ActionError> = None;

        loop {
            attempts += 1;
            let outcome = match timeout_at(hard_stop, predicate()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(what, attempts, "predicate evaluation did not return before the deadline");
                    return Err(self.timed_out(what, started, last_cause));
                }
            };

            match outcome {
                Ok(value) => {
                    debug!(
                        what,
                        attempts,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "wait condition satisfied"
                    );
                    return Ok(value);
                }
                Err(err) if self.policy.ignores(err.kind()) => {
                    trace!(what, attempts, error = %err, "condition not ready yet");
                    last_cause = Some(err);
                }
                Err(err) => {
                    debug!(what, attempts, error = %err, "wait aborted by non-ignored error");
                    return Err(err);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(what, attempts, timeout_ms = self.policy.timeout_ms, "wait timed out");
                return Err(self.timed_out(what, started, last_cause));
            }
            sleep(self.policy.poll_interval().min(deadline - now)).await;
        }
    }

    /// Wait until `locator` resolves to an element.
    pub async fn presence_of_element_located<S: BrowserSession>(
        &self,
        session: &S,
        locator: &Locator,
    ) -> Result<S::Element, ActionError> {
        self.until(&locator.to_string(), || session.find_element(locator))
            .await
    }

    /// Wait until `locator` resolves to an element that is displayed.
    ///
    /// Hidden elements count as not ready, on top of the policy's own
    /// ignored kinds.
    pub async fn visibility_of_element_located<S: BrowserSession>(
        &self,
        session: &S,
        locator: &Locator,
    ) -> Result<S::Element, ActionError> {
        let wait = Self {
            policy: self.policy.clone().ignoring(ErrorKind::NotDisplayed),
        };
        wait.until(&locator.to_string(), || async move {
            let element = session.find_element(locator).await?;
            if element.is_displayed().await? {
                Ok(element)
            } else {
                Err(ActionError::NotDisplayed(locator.to_string()))
            }
        })
        .await
    }

    fn timed_out(
        &self,
        what: &str,
        started: Instant,
        last_cause: Option<ActionError>,
    ) -> ActionError {
        ActionError::WaitTimeout {
            what: what.to_string(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            last_cause: last_cause.map(Box::new),
        }
    }
}
