// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands, their arguments, and the global output flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rollwatch")]
#[command(about = "Follow long-running cluster installations step by step")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Plain line output without cursor control or prompts
    #[arg(long, global = true)]
    pub non_interactive: bool,

    /// Emit JSON lines instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a config file (default: discover rollwatch.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new rollwatch.yml configuration file
    Init {
        /// Resource to watch, as kind/name
        #[arg(long)]
        resource: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Watch the resource until the installation settles
    Watch {
        /// Wait for the resource to be uninstalled instead
        #[arg(long)]
        uninstall: bool,

        /// Give up after this long (e.g. 30m, 1h)
        #[arg(long, value_parser = parse_duration)]
        timeout: Option<Duration>,

        /// Pause between status queries (e.g. 10s)
        #[arg(long, value_parser = parse_duration)]
        interval: Option<Duration>,

        /// kubeconfig used for every kubectl call
        #[arg(long)]
        kubeconfig: Option<PathBuf>,
    },

    /// Render a stream of JSON-lines process updates as progress steps
    Replay {
        /// File with one update per line (default: stdin)
        file: Option<PathBuf>,
    },

    /// Show the current state of the resource once
    Status {
        /// kubeconfig used for the kubectl call
        #[arg(long)]
        kubeconfig: Option<PathBuf>,
    },
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    let duration = humantime_serde::re::humantime::parse_duration(value)
        .map_err(|e| format!("invalid duration '{value}': {e}"))?;
    if duration.is_zero() {
        return Err("duration must be greater than zero".to_string());
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_humantime_durations() {
        assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("0s").is_err());
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["rollwatch", "watch", "--uninstall", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Watch {
                uninstall: true,
                ..
            }
        ));
    }
}
