// ABOUTME: In-memory step capture for tests and embedding callers.
// ABOUTME: Every created step is appended in creation order.

use parking_lot::Mutex;
use std::sync::Arc;

/// How a recorded step was resolved, with its optional message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded(Option<String>),
    Failed(Option<String>),
}

/// Everything a recorded step went through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepRecord {
    pub label: String,
    pub started: bool,
    /// The label followed by every `set_status` text.
    pub statuses: Vec<String>,
    pub infos: Vec<String>,
    pub errors: Vec<String>,
    pub prompts: Vec<String>,
    pub outcome: Option<StepOutcome>,
}

impl StepRecord {
    pub fn is_successful(&self) -> bool {
        matches!(self.outcome, Some(StepOutcome::Succeeded(_)))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Some(StepOutcome::Failed(_)))
    }

    /// Message passed to `succeed`/`fail`, if any.
    pub fn message(&self) -> Option<&str> {
        match &self.outcome {
            Some(StepOutcome::Succeeded(m)) | Some(StepOutcome::Failed(m)) => m.as_deref(),
            None => None,
        }
    }
}

#[derive(Debug, Default)]
struct RecorderState {
    steps: Vec<StepRecord>,
    prompt_answer: bool,
}

/// Shared handle onto the steps created by a recording factory.
#[derive(Debug, Clone, Default)]
pub struct StepRecorder {
    inner: Arc<Mutex<RecorderState>>,
}

impl StepRecorder {
    /// Snapshot of all steps created so far.
    pub fn steps(&self) -> Vec<StepRecord> {
        self.inner.lock().steps.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Labels of all created steps, in creation order.
    pub fn labels(&self) -> Vec<String> {
        self.inner
            .lock()
            .steps
            .iter()
            .map(|s| s.label.clone())
            .collect()
    }

    /// Set the answer recorded steps give to `prompt_yes_no`.
    pub fn answer_prompts(&self, answer: bool) {
        self.inner.lock().prompt_answer = answer;
    }

    pub(super) fn prompt_answer(&self) -> bool {
        self.inner.lock().prompt_answer
    }

    pub(super) fn register(&self, label: &str) -> usize {
        let mut state = self.inner.lock();
        state.steps.push(StepRecord {
            label: label.to_string(),
            statuses: vec![label.to_string()],
            ..StepRecord::default()
        });
        state.steps.len() - 1
    }

    pub(super) fn update(&self, index: usize, f: impl FnOnce(&mut StepRecord)) {
        if let Some(record) = self.inner.lock().steps.get_mut(index) {
            f(record);
        }
    }
}
