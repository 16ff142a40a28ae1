// ABOUTME: Command module aggregator for the rollwatch CLI.
// ABOUTME: Re-exports the watch, replay, and status command handlers.

mod replay;
mod status;
mod watch;

pub use replay::replay;
pub use status::status;
pub use watch::{WatchArgs, watch};
