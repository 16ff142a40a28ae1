// ABOUTME: Test support utilities.
// ABOUTME: Provides tracing setup and a scripted status source for poller tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use rollwatch::poll::{RemoteStatus, StatusError, StatusSource};
use std::collections::VecDeque;
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("rollwatch=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Answers status queries from a fixed script.
///
/// Once the script runs out, the last answer repeats forever.
#[allow(dead_code)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<RemoteStatus, StatusError>>>,
    last: Mutex<Option<RemoteStatus>>,
    error_log: Mutex<Option<Result<String, StatusError>>>,
    status_calls: AtomicUsize,
    error_log_calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedSource {
    /// Script of `(state, description)` answers.
    pub fn new(answers: &[(&str, &str)]) -> Self {
        Self::from_results(
            answers
                .iter()
                .map(|(state, description)| Ok(RemoteStatus::new(state, description)))
                .collect(),
        )
    }

    pub fn from_results(script: Vec<Result<RemoteStatus, StatusError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            error_log: Mutex::new(Some(Ok(String::new()))),
            status_calls: AtomicUsize::new(0),
            error_log_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_error_log(self, log: Result<String, StatusError>) -> Self {
        *self.error_log.lock() = Some(log);
        self
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn error_log_calls(&self) -> usize {
        self.error_log_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn status(&self) -> Result<RemoteStatus, StatusError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().pop_front();
        match next {
            Some(Ok(status)) => {
                *self.last.lock() = Some(status.clone());
                Ok(status)
            }
            Some(Err(e)) => Err(e),
            None => match self.last.lock().clone() {
                Some(status) => Ok(status),
                None => Ok(RemoteStatus::new("", "")),
            },
        }
    }

    async fn error_log(&self) -> Result<String, StatusError> {
        self.error_log_calls.fetch_add(1, Ordering::SeqCst);
        self.error_log
            .lock()
            .take()
            .unwrap_or_else(|| Ok(String::new()))
    }
}
