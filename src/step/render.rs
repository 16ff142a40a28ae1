// ABOUTME: Terminal renderers behind the interactive, plain, and JSON step styles.
// ABOUTME: Interactive steps are indicatif spinners; plain and JSON lines go to stdout.

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use super::StepStyle;

const TICK: Duration = Duration::from_millis(100);
const SPINNER_TEMPLATE: &str = "  {spinner:.cyan} {msg}";
const SUCCESS_TEMPLATE: &str = "  {prefix:.green} {msg}";
const FAILURE_TEMPLATE: &str = "  {prefix:.red} {msg}";

#[derive(Debug)]
pub(super) struct Renderer {
    style: StepStyle,
    /// Label or latest status of the step.
    current: String,
    /// Live spinner (interactive only).
    bar: Option<ProgressBar>,
}

impl Renderer {
    pub(super) fn new(style: StepStyle) -> Self {
        Self {
            style,
            current: String::new(),
            bar: None,
        }
    }

    pub(super) fn start(&mut self, label: &str) {
        self.current = label.to_string();
        match self.style {
            StepStyle::Interactive => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(template(SPINNER_TEMPLATE, ProgressStyle::default_spinner()));
                bar.set_message(label.to_string());
                bar.enable_steady_tick(TICK);
                self.bar = Some(bar);
            }
            StepStyle::Plain => plain_line("→", label),
            StepStyle::Json => emit("step_started", label, None),
        }
    }

    pub(super) fn status(&mut self, text: &str) {
        self.current = text.to_string();
        match self.style {
            StepStyle::Interactive => {
                if let Some(bar) = &self.bar {
                    bar.set_message(text.to_string());
                }
            }
            StepStyle::Plain => plain_line("→", text),
            StepStyle::Json => emit("step_status", text, None),
        }
    }

    pub(super) fn success(&mut self, text: &str) {
        match self.style {
            StepStyle::Interactive => self.finish(SUCCESS_TEMPLATE, "✓", text),
            StepStyle::Plain => plain_line("✓", text),
            StepStyle::Json => emit("step_succeeded", &self.current, Some(text)),
        }
    }

    pub(super) fn failure(&mut self, text: &str) {
        match self.style {
            StepStyle::Interactive => self.finish(FAILURE_TEMPLATE, "✗", text),
            StepStyle::Plain => plain_line("✗", text),
            StepStyle::Json => emit("step_failed", &self.current, Some(text)),
        }
    }

    pub(super) fn info(&mut self, text: &str, running: bool) {
        match self.style {
            StepStyle::Interactive => self.above(&format!("    {text}"), running),
            StepStyle::Plain => plain_line("", text),
            StepStyle::Json => emit("step_info", &self.current, Some(text)),
        }
    }

    pub(super) fn error(&mut self, text: &str, running: bool) {
        match self.style {
            StepStyle::Interactive => self.above(&format!("    {text}"), running),
            StepStyle::Plain => plain_line("", text),
            StepStyle::Json => emit("step_error", &self.current, Some(text)),
        }
    }

    pub(super) fn prompt_yes_no(&mut self, question: &str) -> bool {
        if self.style != StepStyle::Interactive {
            tracing::debug!(question, "prompt declined on non-interactive output");
            return false;
        }

        let ask = || {
            let mut stderr = io::stderr().lock();
            let _ = write!(stderr, "  ? {question} [y/N]: ");
            let _ = stderr.flush();
            drop(stderr);

            let mut answer = String::new();
            if io::stdin().lock().read_line(&mut answer).is_err() {
                return false;
            }
            matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
        };
        match &self.bar {
            Some(bar) => bar.suspend(ask),
            None => ask(),
        }
    }

    /// Replace the spinner with a final line.
    fn finish(&mut self, pattern: &str, mark: &'static str, text: &str) {
        match self.bar.take() {
            Some(bar) => {
                bar.set_style(template(pattern, ProgressStyle::default_spinner()));
                bar.set_prefix(mark);
                bar.finish_with_message(text.to_string());
            }
            None => eprintln!("  {mark} {text}"),
        }
    }

    /// Print a line above a running spinner, or on its own once resolved.
    fn above(&self, line: &str, running: bool) {
        match &self.bar {
            Some(bar) if running => bar.println(line),
            _ => eprintln!("{line}"),
        }
    }
}

fn template(pattern: &str, fallback: ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(pattern).unwrap_or(fallback)
}

/// Transitions carry a mark; log lines without one are indented under the step.
fn plain_text(mark: &str, text: &str) -> String {
    if mark.is_empty() {
        format!("    {text}")
    } else {
        format!("  {mark} {text}")
    }
}

/// Plain step lines share stdout so they keep their order when piped.
fn plain_line(mark: &str, text: &str) {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", plain_text(mark, text));
}

#[derive(Serialize)]
struct StepEvent<'a> {
    event: &'a str,
    step: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    at: DateTime<Utc>,
}

fn emit(event: &str, step: &str, message: Option<&str>) {
    let event = StepEvent {
        event,
        step,
        message,
        at: Utc::now(),
    };
    if let Ok(json) = serde_json::to_string(&event) {
        println!("{json}");
    }
}
