// ABOUTME: Observed remote state and the per-iteration poll outcome.
// ABOUTME: Parses the raw state string read from the cluster resource.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::PollError;

/// State reported by the remote deployment resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteState {
    Installed,
    Uninstalled,
    Error,
    InProgress,
    /// The field was empty, usually because the installer has not picked up
    /// the resource yet.
    Empty,
    Unrecognized(String),
}

impl RemoteState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().trim_matches('\'') {
            "Installed" => RemoteState::Installed,
            "Uninstalled" => RemoteState::Uninstalled,
            "Error" => RemoteState::Error,
            "InProgress" => RemoteState::InProgress,
            "" => RemoteState::Empty,
            other => RemoteState::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RemoteState::Installed => "Installed",
            RemoteState::Uninstalled => "Uninstalled",
            RemoteState::Error => "Error",
            RemoteState::InProgress => "InProgress",
            RemoteState::Empty => "",
            RemoteState::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for RemoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of the remote resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStatus {
    pub state: RemoteState,
    pub description: String,
}

impl RemoteStatus {
    pub fn new(state: &str, description: &str) -> Self {
        Self {
            state: RemoteState::parse(state),
            description: description.trim().trim_matches('\'').to_string(),
        }
    }
}

/// Which way the remote operation is going; decides the success state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Install,
    Uninstall,
}

impl Direction {
    /// The state that ends the watch successfully.
    pub fn target(self) -> RemoteState {
        match self {
            Direction::Install => RemoteState::Installed,
            Direction::Uninstall => RemoteState::Uninstalled,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Install => f.write_str("installation"),
            Direction::Uninstall => f.write_str("uninstallation"),
        }
    }
}

/// What the loop driver should do after one observation.
#[derive(Debug)]
pub enum PollOutcome {
    /// Remote is progressing (or tolerably failing); keep polling.
    Continue,
    /// The observation itself failed; poll again.
    Retry,
    /// Remote reached the target state.
    Succeed,
    /// Stop polling with an error.
    Fail(PollError),
}
