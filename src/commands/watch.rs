// ABOUTME: Watch command implementation.
// ABOUTME: Polls the cluster resource, then runs the post-operation or on-error hook.

use rollwatch::config::Config;
use rollwatch::diagnostics::{Diagnostics, Warning};
use rollwatch::error::Result;
use rollwatch::hooks::{HookContext, HookPoint, HookRunner};
use rollwatch::output::Output;
use rollwatch::poll::{Direction, KubectlStatusSource, Poller};
use rollwatch::step::StepFactory;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line overrides for a watch run.
#[derive(Debug, Default)]
pub struct WatchArgs {
    pub direction: Direction,
    pub timeout: Option<Duration>,
    pub interval: Option<Duration>,
    pub kubeconfig: Option<PathBuf>,
}

/// Follow the configured resource until it reaches the target state.
pub async fn watch(
    mut config: Config,
    args: WatchArgs,
    factory: StepFactory,
    mut output: Output,
) -> Result<()> {
    if let Some(kubeconfig) = args.kubeconfig {
        config.kubectl.kubeconfig = Some(kubeconfig);
    }
    if let Some(timeout) = args.timeout {
        config.watch.timeout = Some(timeout);
    }
    if let Some(interval) = args.interval {
        config.watch.interval = interval;
    }
    let direction = args.direction;

    output.start_timer();
    let cwd = env::current_dir()?;
    let hook_runner = HookRunner::new(&cwd);
    let mut diag = Diagnostics::default();

    let source = KubectlStatusSource::new(
        &config.kubectl,
        config.resource.clone(),
        config.namespace.clone(),
    );

    output.progress(&format!("Waiting for {direction} of {}", config.resource));

    let mut poller = Poller::from_config(factory.clone(), direction, &config.watch)
        .with_error_hints(error_hints(&config, &source));
    let result = poller.run(&source).await;

    if let Some(e) = poller.error_log_failure() {
        diag.warn(Warning::error_log_unavailable(format!(
            "could not fetch the installation error log: {e}"
        )));
    }

    let hook_context = HookContext {
        resource: config.resource.clone(),
        operation: direction,
        namespace: config.namespace.clone(),
        kubeconfig: config.kubectl.kubeconfig.clone(),
    };

    let point = match result {
        Ok(()) => HookPoint::after_success(direction),
        Err(_) => HookPoint::OnError,
    };
    hook_runner
        .run_in_step(
            point,
            &hook_context,
            &factory,
            config.hooks.confirm,
            &mut diag,
        )
        .await;

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    result?;

    output.success(match direction {
        Direction::Install => "Installation finished!",
        Direction::Uninstall => "Uninstallation finished!",
    });
    Ok(())
}

/// Commands a user can run to dig into a remote `Error` state.
fn error_hints(config: &Config, source: &KubectlStatusSource) -> Vec<String> {
    let args: Vec<String> = source
        .error_log_args()
        .into_iter()
        .map(|arg| match arg.strip_prefix("--template=") {
            Some(template) => format!("--template='{template}'"),
            None => arg,
        })
        .collect();

    vec![
        format!(
            "To fetch the error logs from the installer, run: {} {}",
            config.kubectl.binary,
            args.join(" ")
        ),
        format!(
            "To fetch the application logs from the installer, run: {} logs -n kyma-installer -l name=kyma-installer",
            config.kubectl.binary
        ),
    ]
}
