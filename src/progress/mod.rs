// ABOUTME: Event-driven progress reporting for push-based deployment engines.
// ABOUTME: Exports the update model, the Dispatcher, and its single-consumer session.

mod dispatcher;
mod error;
mod event;
mod session;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchErrorKind};
pub use event::{Component, ComponentStatus, InstallationPhase, ProcessEventKind, ProcessUpdate};
pub use session::{DEFAULT_CAPACITY, DispatchReport, DispatchSession};
