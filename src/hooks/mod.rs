// ABOUTME: Hooks run after a watched operation settles.
// ABOUTME: Discovers scripts in .rollwatch/hooks and runs them with the outcome in env vars.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::diagnostics::{Diagnostics, Warning};
use crate::poll::Direction;
use crate::step::StepFactory;
use crate::types::ResourceRef;

/// Points at which a hook script may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// After the resource reached `Installed`.
    PostInstall,
    /// After the resource reached `Uninstalled`.
    PostUninstall,
    /// After the watch ended with an error.
    OnError,
}

impl HookPoint {
    pub fn filename(&self) -> &'static str {
        match self {
            HookPoint::PostInstall => "post-install",
            HookPoint::PostUninstall => "post-uninstall",
            HookPoint::OnError => "on-error",
        }
    }

    /// The hook that follows a successful operation in `direction`.
    pub fn after_success(direction: Direction) -> Self {
        match direction {
            Direction::Install => HookPoint::PostInstall,
            Direction::Uninstall => HookPoint::PostUninstall,
        }
    }
}

/// Context passed to hooks via environment variables.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub resource: ResourceRef,
    pub operation: Direction,
    pub namespace: Option<String>,
    pub kubeconfig: Option<PathBuf>,
}

impl HookContext {
    pub fn to_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("ROLLWATCH_RESOURCE".to_string(), self.resource.to_string());
        env.insert("ROLLWATCH_OPERATION".to_string(), self.operation.to_string());
        if let Some(ref namespace) = self.namespace {
            env.insert("ROLLWATCH_NAMESPACE".to_string(), namespace.clone());
        }
        if let Some(ref kubeconfig) = self.kubeconfig {
            env.insert(
                "ROLLWATCH_KUBECONFIG".to_string(),
                kubeconfig.display().to_string(),
            );
        }
        env
    }
}

#[derive(Debug)]
pub struct HookResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl HookResult {
    /// One line describing a failed run, for warnings.
    pub fn failure_summary(&self, point: HookPoint) -> String {
        let status = match self.exit_code {
            Some(code) => format!("exit code {code}"),
            None => "no exit code".to_string(),
        };
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("{} hook failed ({status})", point.filename())
        } else {
            format!("{} hook failed ({status}): {stderr}", point.filename())
        }
    }
}

/// Discovers and runs hooks from a project directory.
pub struct HookRunner {
    hooks_dir: PathBuf,
}

impl HookRunner {
    pub fn new(project_dir: &Path) -> Self {
        Self {
            hooks_dir: project_dir.join(".rollwatch").join("hooks"),
        }
    }

    pub fn hook_exists(&self, point: HookPoint) -> bool {
        self.hook_path(point).is_file()
    }

    fn hook_path(&self, point: HookPoint) -> PathBuf {
        self.hooks_dir.join(point.filename())
    }

    /// Run a hook if it exists.
    ///
    /// Returns None if the hook doesn't exist, or Some(HookResult) if it was run.
    pub async fn run(&self, point: HookPoint, context: &HookContext) -> Option<HookResult> {
        let hook_path = self.hook_path(point);

        if !hook_path.is_file() {
            return None;
        }

        tracing::info!("Running {} hook: {}", point.filename(), hook_path.display());

        let output = Command::new(&hook_path)
            .envs(context.to_env())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let result = match output {
            Ok(output) => HookResult {
                success: output.status.success(),
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            },
            Err(e) => {
                tracing::error!("Failed to execute {} hook: {}", point.filename(), e);
                HookResult {
                    success: false,
                    exit_code: None,
                    stdout: String::new(),
                    stderr: e.to_string(),
                }
            }
        };

        if result.success {
            tracing::info!("{} hook completed successfully", point.filename());
        } else {
            tracing::warn!(
                "{} hook failed with exit code {:?}",
                point.filename(),
                result.exit_code
            );
        }

        Some(result)
    }

    /// Run a hook inside its own step. Hook failures never fail the watch.
    ///
    /// With `confirm` set the step asks first; a "no" (or a surface that
    /// cannot ask) skips the hook. A failed run is recorded as a warning.
    pub async fn run_in_step(
        &self,
        point: HookPoint,
        context: &HookContext,
        factory: &StepFactory,
        confirm: bool,
        diag: &mut Diagnostics,
    ) {
        if !self.hook_exists(point) {
            return;
        }

        let mut step = factory.new_step(format!("Running {} hook", point.filename()));
        step.start();

        if confirm && !step.prompt_yes_no(&format!("Run the {} hook?", point.filename())) {
            step.succeed(Some(&format!("Skipped {} hook", point.filename())));
            return;
        }

        match self.run(point, context).await {
            Some(result) if !result.success => {
                let summary = result.failure_summary(point);
                step.fail(Some(&summary));
                diag.warn(Warning::hook_failed(summary));
            }
            _ => step.succeed(None),
        }
    }
}
