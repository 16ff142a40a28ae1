// ABOUTME: Polling state machine that turns remote status into progress steps.
// ABOUTME: observe() decides one iteration; run() drives it on a fixed interval.

use std::time::Duration;
use tokio::time::Instant;

use crate::config::WatchConfig;
use crate::step::{Step, StepFactory};

use super::error::{PollError, StatusError, TimeoutSnafu, UnexpectedStateSnafu};
use super::source::StatusSource;
use super::state::{Direction, PollOutcome, RemoteState, RemoteStatus};

const RETRY_NOTICE: &str = "Failed to get the installation status. Will retry later...";

/// Watches a remote deployment until it reaches its target state.
///
/// One step is open per distinct remote description. Remote `Error` states
/// are tolerated because the remote installer retries on its own; only the
/// overall timeout or an unknown state ends the watch with an error.
#[derive(Debug)]
pub struct Poller {
    factory: StepFactory,
    direction: Direction,
    interval: Duration,
    timeout: Option<Duration>,
    call_timeout: Duration,
    error_hints: Vec<String>,
    current_step: Option<Step>,
    current_description: String,
    error_seen: bool,
    error_log_failure: Option<StatusError>,
}

impl Poller {
    pub fn new(factory: StepFactory, direction: Direction) -> Self {
        let defaults = WatchConfig::default();
        Self {
            factory,
            direction,
            interval: defaults.interval,
            timeout: defaults.timeout,
            call_timeout: defaults.call_timeout,
            error_hints: Vec::new(),
            current_step: None,
            current_description: String::new(),
            error_seen: false,
            error_log_failure: None,
        }
    }

    pub fn from_config(factory: StepFactory, direction: Direction, config: &WatchConfig) -> Self {
        Self::new(factory, direction)
            .with_interval(config.interval)
            .with_timeout(config.timeout)
            .with_call_timeout(config.call_timeout)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Extra lines logged the first time the remote enters `Error`.
    pub fn with_error_hints(mut self, hints: Vec<String>) -> Self {
        self.error_hints = hints;
        self
    }

    pub fn current_description(&self) -> &str {
        &self.current_description
    }

    /// Why the diagnostic error log could not be fetched after a timeout.
    pub fn error_log_failure(&self) -> Option<&StatusError> {
        self.error_log_failure.as_ref()
    }

    /// Apply one observation and decide what the loop does next.
    pub fn observe(&mut self, observation: Result<RemoteStatus, StatusError>) -> PollOutcome {
        let status = match observation {
            Ok(status) => status,
            Err(e) => {
                tracing::debug!("status query failed: {e}");
                self.log_retry();
                return PollOutcome::Retry;
            }
        };
        tracing::debug!(state = %status.state, description = %status.description, "observed status");

        if status.state == self.direction.target() {
            if let Some(step) = self.current_step.as_mut() {
                step.succeed(None);
            }
            return PollOutcome::Succeed;
        }

        match status.state {
            RemoteState::Error => {
                // Edge-triggered: log once until a non-error state shows up.
                if !self.error_seen {
                    self.error_seen = true;
                    self.log_remote_error(&status.description);
                }
                PollOutcome::Continue
            }
            RemoteState::InProgress => {
                self.error_seen = false;
                if status.description != self.current_description {
                    if let Some(mut previous) = self.current_step.take() {
                        previous.succeed(None);
                    }
                    let mut step = self.factory.new_step(status.description.clone());
                    step.start();
                    self.current_step = Some(step);
                    self.current_description = status.description;
                }
                PollOutcome::Continue
            }
            RemoteState::Empty => {
                self.log_retry();
                PollOutcome::Retry
            }
            other => {
                if let Some(step) = self.current_step.as_mut() {
                    step.fail(None);
                }
                PollOutcome::Fail(
                    UnexpectedStateSnafu {
                        state: other.to_string(),
                    }
                    .build(),
                )
            }
        }
    }

    /// Poll `source` until the target state, an unknown state, or the timeout.
    ///
    /// Status calls and interval sleeps are cut short at the overall
    /// deadline, so only the final error-log fetch can run past it.
    ///
    /// # Errors
    ///
    /// Returns `PollError::Timeout` when the overall timeout elapses and
    /// `PollError::UnexpectedState` for a state outside the known set.
    pub async fn run<S>(&mut self, source: &S) -> Result<(), PollError>
    where
        S: StatusSource + ?Sized,
    {
        let deadline = self.timeout.map(|t| Instant::now() + t);

        loop {
            let call_budget = match remaining(deadline) {
                Some(left) if left.is_zero() => return Err(self.time_out(source).await),
                Some(left) => left.min(self.call_timeout),
                None => self.call_timeout,
            };

            let observation = match tokio::time::timeout(call_budget, source.status()).await {
                Ok(result) => result,
                Err(_elapsed) => Err(StatusError::Timeout(call_budget)),
            };

            match self.observe(observation) {
                PollOutcome::Succeed => return Ok(()),
                PollOutcome::Fail(e) => return Err(e),
                PollOutcome::Continue | PollOutcome::Retry => {}
            }

            let pause = remaining(deadline).map_or(self.interval, |left| left.min(self.interval));
            tokio::time::sleep(pause).await;
        }
    }

    /// Fail the open step, print the remote error log if it can be fetched,
    /// and build the timeout error.
    async fn time_out<S>(&mut self, source: &S) -> PollError
    where
        S: StatusSource + ?Sized,
    {
        if let Some(step) = self.current_step.as_mut() {
            step.fail(None);
        }

        match tokio::time::timeout(self.call_timeout, source.error_log()).await {
            Ok(Ok(log)) => {
                let log = log.trim();
                if !log.is_empty() {
                    self.log_error(&format!("Installation error log:\n{log}"));
                }
            }
            Ok(Err(e)) => {
                tracing::warn!("could not fetch installation error log: {e}");
                self.error_log_failure = Some(e);
            }
            Err(_elapsed) => {
                tracing::warn!("fetching installation error log timed out");
                self.error_log_failure = Some(StatusError::Timeout(self.call_timeout));
            }
        }

        TimeoutSnafu {
            operation: self.direction,
            timeout: self.timeout.unwrap_or_default(),
        }
        .build()
    }

    fn log_retry(&mut self) {
        match self.current_step.as_mut() {
            Some(step) => step.log_info(RETRY_NOTICE),
            None => tracing::warn!("{RETRY_NOTICE}"),
        }
    }

    fn log_remote_error(&mut self, description: &str) {
        self.log_error(&format!(
            "{description} failed, which may be OK. Will retry later..."
        ));
        if let Some(step) = self.current_step.as_mut() {
            for hint in &self.error_hints {
                step.log_info(hint);
            }
        }
    }

    fn log_error(&mut self, text: &str) {
        match self.current_step.as_mut() {
            Some(step) => step.log_error(text),
            None => tracing::error!("{text}"),
        }
    }
}

/// Time left before `deadline`, or `None` when there is no deadline.
fn remaining(deadline: Option<Instant>) -> Option<Duration> {
    deadline.map(|d| d.saturating_duration_since(Instant::now()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poller() -> (Poller, crate::step::StepRecorder) {
        let (factory, recorder) = StepFactory::recording();
        (Poller::new(factory, Direction::Install), recorder)
    }

    fn status(state: &str, description: &str) -> Result<RemoteStatus, StatusError> {
        Ok(RemoteStatus::new(state, description))
    }

    #[test]
    fn unchanged_description_causes_no_step_churn() {
        let (mut poller, recorder) = poller();

        assert!(matches!(
            poller.observe(status("InProgress", "istio")),
            PollOutcome::Continue
        ));
        assert!(matches!(
            poller.observe(status("InProgress", "istio")),
            PollOutcome::Continue
        ));

        let steps = recorder.steps();
        assert_eq!(steps.len(), 1);
        assert!(steps[0].outcome.is_none());
    }

    #[test]
    fn changed_description_closes_previous_step() {
        let (mut poller, recorder) = poller();
        poller.observe(status("InProgress", "istio"));
        poller.observe(status("InProgress", "monitoring"));

        let steps = recorder.steps();
        assert_eq!(steps.len(), 2);
        assert!(steps[0].is_successful());
        assert!(steps[1].started);
        assert!(steps[1].outcome.is_none());
        assert_eq!(poller.current_description(), "monitoring");
    }

    #[test]
    fn remote_error_is_logged_once_per_edge() {
        let (poller, recorder) = poller();
        let mut poller = poller.with_error_hints(vec!["run kubectl logs".to_string()]);
        poller.observe(status("InProgress", "istio"));
        poller.observe(status("Error", "istio"));
        poller.observe(status("Error", "istio"));

        let steps = recorder.steps();
        assert_eq!(steps[0].errors.len(), 1);
        assert_eq!(
            steps[0].errors[0],
            "istio failed, which may be OK. Will retry later..."
        );
        assert_eq!(steps[0].infos, vec!["run kubectl logs"]);
        assert!(steps[0].outcome.is_none());

        // Back to progress re-arms the edge.
        poller.observe(status("InProgress", "istio"));
        poller.observe(status("Error", "istio"));
        assert_eq!(recorder.steps()[0].errors.len(), 2);
    }

    #[test]
    fn empty_state_and_query_failure_retry() {
        let (mut poller, recorder) = poller();
        poller.observe(status("InProgress", "istio"));

        assert!(matches!(poller.observe(status("", "")), PollOutcome::Retry));
        assert!(matches!(
            poller.observe(Err(StatusError::Timeout(Duration::from_secs(1)))),
            PollOutcome::Retry
        ));
        assert_eq!(recorder.steps()[0].infos, vec![RETRY_NOTICE, RETRY_NOTICE]);
    }

    #[test]
    fn unknown_state_fails_open_step() {
        let (mut poller, recorder) = poller();
        poller.observe(status("InProgress", "istio"));

        let outcome = poller.observe(status("Paused", ""));
        assert!(matches!(
            outcome,
            PollOutcome::Fail(PollError::UnexpectedState { ref state }) if state == "Paused"
        ));
        assert!(recorder.steps()[0].is_failed());
    }

    #[test]
    fn opposite_terminal_state_is_unexpected() {
        let (factory, _recorder) = StepFactory::recording();
        let mut poller = Poller::new(factory, Direction::Uninstall);
        assert!(matches!(
            poller.observe(status("Installed", "")),
            PollOutcome::Fail(_)
        ));
    }

    #[test]
    fn target_state_without_open_step_succeeds() {
        let (mut poller, recorder) = poller();
        assert!(matches!(
            poller.observe(status("Installed", "")),
            PollOutcome::Succeed
        ));
        assert!(recorder.is_empty());
    }
}
