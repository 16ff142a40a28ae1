// ABOUTME: Application-wide error types for rollwatch.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::poll::{PollError, StatusError};
use crate::progress::DispatchError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Poll(#[from] PollError),

    #[error("failed to query deployment status: {0}")]
    Status(#[from] StatusError),

    #[error("{0}")]
    Dispatch(#[from] DispatchError),

    #[error("deployment failed: {0}")]
    DeploymentFailed(String),

    #[error("invalid update on line {line}: {source}")]
    InvalidUpdate {
        line: usize,
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
