// ABOUTME: Polling model: watch a remote deployment resource until it settles.
// ABOUTME: Exports the status source seam, the state model, and the Poller.

mod error;
mod poller;
mod source;
mod state;

pub use error::{PollError, PollErrorKind, StatusError};
pub use poller::Poller;
pub use source::{KubectlStatusSource, StatusSource};
pub use state::{Direction, PollOutcome, RemoteState, RemoteStatus};
