// ABOUTME: Status command implementation.
// ABOUTME: Queries the resource once and prints its state and description.

use rollwatch::config::Config;
use rollwatch::error::Result;
use rollwatch::output::{Output, OutputMode};
use rollwatch::poll::{KubectlStatusSource, StatusError, StatusSource};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct StatusReport<'a> {
    resource: String,
    state: &'a str,
    description: &'a str,
}

/// Print the current state of the configured resource.
pub async fn status(mut config: Config, kubeconfig: Option<PathBuf>, output: &Output) -> Result<()> {
    if let Some(kubeconfig) = kubeconfig {
        config.kubectl.kubeconfig = Some(kubeconfig);
    }

    let source = KubectlStatusSource::new(
        &config.kubectl,
        config.resource.clone(),
        config.namespace.clone(),
    );

    let call_timeout = config.watch.call_timeout;
    let status = tokio::time::timeout(call_timeout, source.status())
        .await
        .map_err(|_| StatusError::Timeout(call_timeout))??;

    match output.mode() {
        OutputMode::Text => {
            let state = match status.state.as_str() {
                "" => "(not reported yet)",
                other => other,
            };
            println!("Resource: {}", config.resource);
            println!("State: {state}");
            if !status.description.is_empty() {
                println!("Description: {}", status.description);
            }
        }
        OutputMode::Json => {
            let report = StatusReport {
                resource: config.resource.to_string(),
                state: status.state.as_str(),
                description: &status.description,
            };
            if let Ok(json) = serde_json::to_string(&report) {
                println!("{json}");
            }
        }
    }
    Ok(())
}
