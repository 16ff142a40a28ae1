// ABOUTME: Single-consumer actor that owns a Dispatcher behind a bounded channel.
// ABOUTME: Producers push updates concurrently; one task applies them in order.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::step::{Step, StepFactory};

use super::dispatcher::Dispatcher;
use super::error::DispatchError;
use super::event::ProcessUpdate;

/// Default queue depth between producers and the consumer.
pub const DEFAULT_CAPACITY: usize = 64;

/// Outcome of a drained dispatch session.
#[derive(Debug)]
pub struct DispatchReport {
    /// Whether any update reported a failure.
    pub failed: bool,
    /// Every error returned by `dispatch`, in arrival order.
    pub errors: Vec<DispatchError>,
    /// Number of phases still open when the stream ended.
    pub unresolved_phases: usize,
}

impl DispatchReport {
    pub fn protocol_violations(&self) -> impl Iterator<Item = &DispatchError> {
        self.errors.iter().filter(|e| e.is_protocol_violation())
    }
}

/// Live error stream, filled in once someone takes it.
type ErrorListener = Arc<Mutex<Option<mpsc::UnboundedSender<DispatchError>>>>;

/// A running dispatcher fed through a bounded queue.
///
/// The dispatcher state lives inside the consumer task only, so updates are
/// applied strictly one at a time no matter how many producers exist.
pub struct DispatchSession {
    updates: Option<mpsc::Sender<ProcessUpdate>>,
    listener: ErrorListener,
    errors_taken: bool,
    factory: StepFactory,
    consumer: JoinHandle<DispatchReport>,
}

impl DispatchSession {
    /// Spawn the consumer task. Must be called within a tokio runtime.
    pub fn start(factory: StepFactory, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<ProcessUpdate>(capacity.max(1));
        let listener: ErrorListener = Arc::new(Mutex::new(None));
        let live = Arc::clone(&listener);
        let mut dispatcher = Dispatcher::new(factory.clone());

        let consumer = tokio::spawn(async move {
            let mut errors = Vec::new();
            while let Some(update) = rx.recv().await {
                if let Err(e) = dispatcher.dispatch(update) {
                    if e.is_protocol_violation() {
                        tracing::warn!("{e}");
                    } else {
                        tracing::debug!("{e}");
                    }
                    {
                        let mut slot = live.lock();
                        if let Some(tx) = slot.as_ref()
                            && tx.send(e.clone()).is_err()
                        {
                            // Receiver dropped; stop copying.
                            *slot = None;
                        }
                    }
                    errors.push(e);
                }
            }
            DispatchReport {
                failed: dispatcher.failed(),
                errors,
                unresolved_phases: dispatcher.ongoing_phases().len(),
            }
        });

        Self {
            updates: Some(tx),
            listener,
            errors_taken: false,
            factory,
            consumer,
        }
    }

    /// A producer handle. Drop it when the producer is done.
    ///
    /// Returns `None` once the session has been finished.
    pub fn sender(&self) -> Option<mpsc::Sender<ProcessUpdate>> {
        self.updates.clone()
    }

    /// Take the live error stream. Available once per session.
    ///
    /// Only errors produced after this call are streamed. Without a listener
    /// errors are kept for the final report alone.
    pub fn take_errors(&mut self) -> Option<mpsc::UnboundedReceiver<DispatchError>> {
        if self.errors_taken {
            return None;
        }
        self.errors_taken = true;
        let (tx, rx) = mpsc::unbounded_channel();
        *self.listener.lock() = Some(tx);
        Some(rx)
    }

    /// Create an extra step outside the phase bookkeeping.
    pub fn add_step(&self, label: impl Into<String>) -> Step {
        self.factory.new_step(label)
    }

    /// Stop accepting updates and wait until every queued update is applied.
    ///
    /// Completes only after all producer handles are dropped.
    pub async fn finish(mut self) -> DispatchReport {
        self.updates.take();
        match self.consumer.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("dispatch consumer task failed: {e}");
                DispatchReport {
                    failed: true,
                    errors: Vec::new(),
                    unresolved_phases: 0,
                }
            }
        }
    }
}
