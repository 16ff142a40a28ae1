// ABOUTME: Progress steps: start/status/succeed/fail indicators for the terminal.
// ABOUTME: StepFactory picks one rendering variant at construction time.

mod record;
mod render;

pub use record::{StepOutcome, StepRecord, StepRecorder};

use std::io::IsTerminal;

use crate::output::OutputMode;
use render::Renderer;

/// How steps are rendered. Resolved once when the factory is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStyle {
    /// Animated spinner per step on a terminal.
    Interactive,
    /// One plain log line per transition, for CI and pipes.
    Plain,
    /// One JSON object per transition, for scripting.
    Json,
}

/// Lifecycle of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Created,
    Running,
    Succeeded,
    Failed,
}

impl StepState {
    pub fn is_resolved(self) -> bool {
        matches!(self, StepState::Succeeded | StepState::Failed)
    }
}

/// Creates steps for one rendering surface.
#[derive(Debug, Clone)]
pub struct StepFactory {
    backend: Backend,
}

#[derive(Debug, Clone)]
enum Backend {
    Render(StepStyle),
    Recording(StepRecorder),
}

impl StepFactory {
    pub fn new(style: StepStyle) -> Self {
        Self {
            backend: Backend::Render(style),
        }
    }

    /// Pick the style for the current process.
    ///
    /// JSON output wins; otherwise steps are interactive only when the user
    /// allowed it and stderr is a terminal.
    pub fn for_terminal(non_interactive: bool, mode: OutputMode) -> Self {
        let style = match mode {
            OutputMode::Json => StepStyle::Json,
            OutputMode::Text if non_interactive || !std::io::stderr().is_terminal() => {
                StepStyle::Plain
            }
            OutputMode::Text => StepStyle::Interactive,
        };
        Self::new(style)
    }

    /// A factory whose steps are captured in memory instead of rendered.
    pub fn recording() -> (Self, StepRecorder) {
        let recorder = StepRecorder::default();
        let factory = Self {
            backend: Backend::Recording(recorder.clone()),
        };
        (factory, recorder)
    }

    /// The rendering style, or `None` for a recording factory.
    pub fn style(&self) -> Option<StepStyle> {
        match &self.backend {
            Backend::Render(style) => Some(*style),
            Backend::Recording(_) => None,
        }
    }

    /// Whether steps from this factory may ask the user questions.
    pub fn is_interactive(&self) -> bool {
        matches!(self.backend, Backend::Render(StepStyle::Interactive))
    }

    pub fn new_step(&self, label: impl Into<String>) -> Step {
        let label = label.into();
        tracing::debug!(step = %label, "creating step");
        let sink = match &self.backend {
            Backend::Render(style) => Sink::Render(Renderer::new(*style)),
            Backend::Recording(recorder) => {
                let index = recorder.register(&label);
                Sink::Recording {
                    recorder: recorder.clone(),
                    index,
                }
            }
        };
        Step {
            label,
            state: StepState::Created,
            sink,
        }
    }
}

/// A named progress indicator. Resolves at most once.
#[derive(Debug)]
pub struct Step {
    label: String,
    state: StepState,
    sink: Sink,
}

#[derive(Debug)]
enum Sink {
    Render(Renderer),
    Recording { recorder: StepRecorder, index: usize },
}

impl Step {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn is_resolved(&self) -> bool {
        self.state.is_resolved()
    }

    pub fn start(&mut self) {
        if self.state != StepState::Created {
            return;
        }
        self.state = StepState::Running;
        match &mut self.sink {
            Sink::Render(r) => r.start(&self.label),
            Sink::Recording { recorder, index } => recorder.update(*index, |s| s.started = true),
        }
    }

    /// Replace the text shown for a running step.
    pub fn set_status(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.is_resolved() {
            tracing::debug!(step = %self.label, "status update on resolved step ignored");
            return;
        }
        match &mut self.sink {
            Sink::Render(r) => r.status(&text),
            Sink::Recording { recorder, index } => {
                recorder.update(*index, |s| s.statuses.push(text.clone()))
            }
        }
    }

    pub fn succeed(&mut self, message: Option<&str>) {
        self.resolve(StepState::Succeeded, message);
    }

    pub fn fail(&mut self, message: Option<&str>) {
        self.resolve(StepState::Failed, message);
    }

    fn resolve(&mut self, outcome: StepState, message: Option<&str>) {
        if self.is_resolved() {
            tracing::debug!(step = %self.label, ?outcome, "step already resolved");
            return;
        }
        self.state = outcome;
        tracing::debug!(step = %self.label, ?outcome, "step resolved");

        let succeeded = outcome == StepState::Succeeded;
        match &mut self.sink {
            Sink::Render(r) => {
                let text = message.unwrap_or(&self.label);
                if succeeded {
                    r.success(text);
                } else {
                    r.failure(text);
                }
            }
            Sink::Recording { recorder, index } => {
                let message = message.map(str::to_string);
                recorder.update(*index, |s| {
                    s.outcome = Some(if succeeded {
                        StepOutcome::Succeeded(message)
                    } else {
                        StepOutcome::Failed(message)
                    });
                });
            }
        }
    }

    pub fn log_info(&mut self, text: &str) {
        match &mut self.sink {
            Sink::Render(r) => r.info(text, self.state == StepState::Running),
            Sink::Recording { recorder, index } => {
                recorder.update(*index, |s| s.infos.push(text.to_string()))
            }
        }
    }

    pub fn log_error(&mut self, text: &str) {
        match &mut self.sink {
            Sink::Render(r) => r.error(text, self.state == StepState::Running),
            Sink::Recording { recorder, index } => {
                recorder.update(*index, |s| s.errors.push(text.to_string()))
            }
        }
    }

    /// Ask a yes/no question. Non-interactive surfaces answer "no".
    pub fn prompt_yes_no(&mut self, question: &str) -> bool {
        match &mut self.sink {
            Sink::Render(r) => r.prompt_yes_no(question),
            Sink::Recording { recorder, index } => {
                let question = question.to_string();
                recorder.update(*index, |s| s.prompts.push(question));
                recorder.prompt_answer()
            }
        }
    }
}
