// ABOUTME: Replay command implementation.
// ABOUTME: Feeds JSON-lines process updates through a dispatch session and reports the outcome.

use rollwatch::diagnostics::{Diagnostics, Warning};
use rollwatch::error::{Error, Result};
use rollwatch::output::Output;
use rollwatch::progress::{DEFAULT_CAPACITY, DispatchSession, ProcessUpdate};
use rollwatch::step::StepFactory;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Render an update stream read from `file`, or stdin when no file is given.
pub async fn replay(file: Option<PathBuf>, factory: StepFactory, mut output: Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &file {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let session = DispatchSession::start(factory, DEFAULT_CAPACITY);
    let sender = session
        .sender()
        .ok_or_else(|| Error::DeploymentFailed("dispatch session closed early".to_string()))?;

    let producer = tokio::spawn(feed(reader, sender));
    let fed = producer.await.map_err(std::io::Error::other)?;

    // Drain everything queued so far, even if reading stopped on a bad line.
    let report = session.finish().await;
    let count = fed?;
    tracing::debug!(updates = count, "replay stream ended");

    for violation in report.protocol_violations() {
        diag.warn(Warning::protocol_violation(violation.to_string()));
    }
    if report.unresolved_phases > 0 {
        diag.warn(Warning::protocol_violation(format!(
            "{} phase(s) never reported a terminal event",
            report.unresolved_phases
        )));
    }

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    if report.failed {
        let reason = report
            .errors
            .iter()
            .find(|e| !e.is_protocol_violation())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "an update reported a failure".to_string());
        return Err(Error::DeploymentFailed(reason));
    }

    output.success(&format!("Replayed {count} update(s)"));
    Ok(())
}

/// Parse one update per non-empty line and push it into the session.
async fn feed<R>(reader: R, sender: mpsc::Sender<ProcessUpdate>) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0;
    let mut count = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let update: ProcessUpdate = serde_json::from_str(line)
            .map_err(|source| Error::InvalidUpdate { line: line_no, source })?;

        if sender.send(update).await.is_err() {
            tracing::warn!("dispatch session closed, dropping remaining updates");
            break;
        }
        count += 1;
    }

    Ok(count)
}
