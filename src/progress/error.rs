// ABOUTME: Errors returned from dispatching a single update.
// ABOUTME: Separates producer protocol violations from reported deployment failures.

use super::event::{InstallationPhase, ProcessEventKind};

/// Errors that can occur while dispatching an update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// A phase was started twice without being resolved in between.
    #[error("illegal state: start-step for installation phase '{phase}' already exists")]
    DuplicateStart { phase: InstallationPhase },

    /// A phase or component update arrived for a phase that was never started.
    #[error("illegal state: step for installation phase '{phase}' does not exist")]
    StopWithoutStart { phase: InstallationPhase },

    /// A component reported an error status.
    #[error("{message}")]
    ComponentFailed { component: String, message: String },

    /// A phase ended with a failure event.
    #[error("deployment phase '{phase}' failed: {event}{}", detail(.error))]
    PhaseFailed {
        phase: InstallationPhase,
        event: ProcessEventKind,
        error: Option<String>,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchErrorKind {
    /// The producer broke the Start -> updates -> terminal ordering.
    ProtocolViolation,
    /// The deployment itself reported a failure.
    DeploymentFailure,
}

impl DispatchError {
    pub fn kind(&self) -> DispatchErrorKind {
        match self {
            DispatchError::DuplicateStart { .. } | DispatchError::StopWithoutStart { .. } => {
                DispatchErrorKind::ProtocolViolation
            }
            DispatchError::ComponentFailed { .. } | DispatchError::PhaseFailed { .. } => {
                DispatchErrorKind::DeploymentFailure
            }
        }
    }

    pub fn is_protocol_violation(&self) -> bool {
        self.kind() == DispatchErrorKind::ProtocolViolation
    }
}

fn detail(error: &Option<String>) -> String {
    match error {
        Some(e) => format!(" {e}"),
        None => String::new(),
    }
}
