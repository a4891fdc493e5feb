//! Terminal rendering for one running job.
//!
//! Consumes the orchestrator's event stream until the job's terminal event,
//! driving a progress bar. Ctrl-C cancels the job; the command then ends
//! with the `canceled` event like any other terminal outcome.

use dlpro_core::{JobEvent, JobId, JobOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::bootstrap::CliContext;
use crate::error::CliError;

fn bar_style() -> Option<ProgressStyle> {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}% {msg}")
        .ok()
        .map(|style| style.progress_chars("█▓░"))
}

/// Downloader rates are per second; converter speeds are multipliers (`2.5x`).
fn progress_message(speed: &str, eta: &str) -> String {
    let rate = if speed.ends_with('x') {
        speed.to_string()
    } else {
        format!("{speed}/s")
    };
    match (speed.is_empty(), eta.is_empty()) {
        (false, false) => format!("{rate} ETA {eta}"),
        (false, true) => rate,
        (true, false) => format!("ETA {eta}"),
        (true, true) => String::new(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn position(percent: f64) -> u64 {
    (percent * 10.0).round() as u64
}

/// Follow a job to its terminal event.
///
/// Raw tool output is printed above the bar when `verbose` is set.
pub async fn watch_job(ctx: &mut CliContext, id: JobId, verbose: bool) -> Result<(), CliError> {
    let bar = ProgressBar::new(1000);
    if let Some(style) = bar_style() {
        bar.set_style(style);
    }

    let mut interrupted = false;
    let outcome = loop {
        tokio::select! {
            event = ctx.events.recv() => {
                let Some(event) = event else {
                    break JobOutcome::Error { message: "event stream closed".to_string() };
                };
                if event.job_id() != id {
                    continue;
                }
                if let Some(outcome) = render(&bar, event, verbose) {
                    break outcome;
                }
            }
            result = tokio::signal::ctrl_c(), if !interrupted => {
                interrupted = true;
                if let Err(e) = result {
                    debug!(error = %e, "failed to listen for Ctrl-C");
                    continue;
                }
                bar.println("Cancelling...");
                ctx.orchestrator.cancel(id);
            }
        }
    };

    match outcome {
        JobOutcome::Done => {
            bar.finish_and_clear();
            println!("✓ Job {id} finished");
            Ok(())
        }
        JobOutcome::Error { message } => {
            bar.abandon();
            Err(CliError::Job(message))
        }
        JobOutcome::Canceled => {
            bar.abandon_with_message("cancelled");
            Err(CliError::Cancelled)
        }
    }
}

fn render(bar: &ProgressBar, event: JobEvent, verbose: bool) -> Option<JobOutcome> {
    match event {
        JobEvent::Started { job_id, kind } => {
            bar.println(format!("Started {kind} job {job_id}"));
            None
        }
        JobEvent::Progress {
            percent, speed, eta, ..
        } => {
            if let Some(percent) = percent {
                bar.set_position(position(percent));
            }
            bar.set_message(progress_message(&speed, &eta));
            None
        }
        JobEvent::Log { line, .. } => {
            if verbose {
                bar.println(line);
            }
            None
        }
        terminal => terminal.outcome(),
    }
}
