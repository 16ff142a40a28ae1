// ABOUTME: Poll errors: transient observation failures and fatal watch outcomes.
// ABOUTME: Fatal outcomes use SNAFU context selectors.

use snafu::Snafu;
use std::time::Duration;

use super::state::Direction;

/// Failure to read the remote status. Always treated as transient.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("status command exited with {}: {stderr}", exit_code(.code))]
    CommandFailed { code: Option<i32>, stderr: String },

    #[error("status query timed out after {0:?}")]
    Timeout(Duration),
}

fn exit_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {c}"),
        None => "signal".to_string(),
    }
}

/// Fatal outcome of a watch.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PollError {
    #[snafu(display("timeout reached while waiting for {operation} to complete (after {timeout:?})"))]
    Timeout {
        operation: Direction,
        timeout: Duration,
    },

    #[snafu(display("unexpected status: {state}"))]
    UnexpectedState { state: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollErrorKind {
    /// The overall timeout elapsed while the remote was still working.
    Timeout,
    /// The remote reported a state this crate does not understand.
    UnexpectedState,
}

impl PollError {
    pub fn kind(&self) -> PollErrorKind {
        match self {
            PollError::Timeout { .. } => PollErrorKind::Timeout,
            PollError::UnexpectedState { .. } => PollErrorKind::UnexpectedState,
        }
    }
}
