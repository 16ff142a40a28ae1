// ABOUTME: Entry point for the rollwatch CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::WatchArgs;
use rollwatch::config::{self, Config};
use rollwatch::error::Result;
use rollwatch::output::{Output, OutputMode};
use rollwatch::poll::Direction;
use rollwatch::step::StepFactory;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let output = Output::new(mode);
    let factory = StepFactory::for_terminal(cli.non_interactive, mode);
    let cwd = env::current_dir()?;

    let load_config = || match &cli.config {
        Some(path) => Config::load(path),
        None => Config::discover_or_default(&cwd),
    };

    match cli.command {
        Commands::Init { ref resource, force } => {
            config::init_config(&cwd, resource.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Watch {
            uninstall,
            timeout,
            interval,
            ref kubeconfig,
        } => {
            let args = WatchArgs {
                direction: if uninstall {
                    Direction::Uninstall
                } else {
                    Direction::Install
                },
                timeout,
                interval,
                kubeconfig: kubeconfig.clone(),
            };
            commands::watch(load_config()?, args, factory, output).await
        }
        Commands::Replay { ref file } => commands::replay(file.clone(), factory, output).await,
        Commands::Status { ref kubeconfig } => {
            commands::status(load_config()?, kubeconfig.clone(), &output).await
        }
    }
}
