// ABOUTME: Status sources the poller queries once per iteration.
// ABOUTME: KubectlStatusSource reads state and description from a cluster resource.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use crate::config::KubectlConfig;
use crate::types::ResourceRef;

use super::error::StatusError;
use super::state::RemoteStatus;

/// Template printing each errorLog entry as "component:\n log [occurrences]".
const ERROR_LOG_TEMPLATE: &str = r#"{{- range .status.errorLog -}}{{printf "%s:\n %s [%v]\n" .component .log .occurrences}}{{- end}}"#;

/// Anything that can report the state of the remote operation.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Read the current state and description.
    async fn status(&self) -> Result<RemoteStatus, StatusError>;

    /// Read the remote error log for diagnostics.
    async fn error_log(&self) -> Result<String, StatusError>;
}

/// Queries a custom resource through the `kubectl` binary.
#[derive(Debug, Clone)]
pub struct KubectlStatusSource {
    binary: String,
    kubeconfig: Option<PathBuf>,
    context: Option<String>,
    namespace: Option<String>,
    resource: ResourceRef,
}

impl KubectlStatusSource {
    pub fn new(kubectl: &KubectlConfig, resource: ResourceRef, namespace: Option<String>) -> Self {
        Self {
            binary: kubectl.binary.clone(),
            kubeconfig: kubectl.kubeconfig.clone(),
            context: kubectl.context.clone(),
            namespace,
            resource,
        }
    }

    fn base_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(kubeconfig) = &self.kubeconfig {
            args.push(format!("--kubeconfig={}", kubeconfig.display()));
        }
        if let Some(context) = &self.context {
            args.push(format!("--context={context}"));
        }
        if let Some(namespace) = &self.namespace {
            args.push(format!("--namespace={namespace}"));
        }
        args.push("get".to_string());
        args.push(self.resource.to_string());
        args
    }

    /// Arguments reading state and description in one call, newline separated.
    pub fn status_args(&self) -> Vec<String> {
        let mut args = self.base_args();
        args.push(r#"-o=jsonpath={.status.state}{"\n"}{.status.description}"#.to_string());
        args
    }

    pub fn error_log_args(&self) -> Vec<String> {
        let mut args = self.base_args();
        args.push("-o=go-template".to_string());
        args.push(format!("--template={ERROR_LOG_TEMPLATE}"));
        args
    }

    async fn run(&self, args: Vec<String>) -> Result<String, StatusError> {
        tracing::debug!(program = %self.binary, ?args, "running status command");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| StatusError::Spawn {
                program: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(StatusError::CommandFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl StatusSource for KubectlStatusSource {
    async fn status(&self) -> Result<RemoteStatus, StatusError> {
        let stdout = self.run(self.status_args()).await?;
        Ok(parse_status_output(&stdout))
    }

    async fn error_log(&self) -> Result<String, StatusError> {
        self.run(self.error_log_args()).await
    }
}

/// Split "state\ndescription" output into a status.
fn parse_status_output(stdout: &str) -> RemoteStatus {
    let (state, description) = stdout.split_once('\n').unwrap_or((stdout, ""));
    RemoteStatus::new(state, description)
}
