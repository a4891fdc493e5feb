//! Job events - discriminated union for everything a job reports.
//!
//! Hosts handle this as a tagged union:
//!
//! ```typescript
//! type JobEvent =
//!   | { type: "started"; jobId: number; kind: "download" | "convert" }
//!   | { type: "progress"; jobId: number; percent: number | null; speed: string; eta: string }
//!   | { type: "log"; jobId: number; line: string }
//!   | { type: "done"; jobId: number }
//!   | { type: "error"; jobId: number; message: string }
//!   | { type: "canceled"; jobId: number };
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{JobId, JobKind, JobStatus};
use crate::progress::ProgressUpdate;

/// Single discriminated union for all job events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// The job's process was spawned.
    Started {
        #[serde(rename = "jobId")]
        job_id: JobId,
        kind: JobKind,
    },

    /// A parsed progress line.
    Progress {
        #[serde(rename = "jobId")]
        job_id: JobId,
        /// Completion percentage clamped to 0-100, absent when unknown.
        percent: Option<f64>,
        /// Transfer rate token, empty when unknown.
        speed: String,
        /// Remaining time token, empty when unknown.
        eta: String,
    },

    /// One raw output line from the tool.
    Log {
        #[serde(rename = "jobId")]
        job_id: JobId,
        line: String,
    },

    /// Terminal: the tool exited successfully.
    Done {
        #[serde(rename = "jobId")]
        job_id: JobId,
    },

    /// Terminal: the tool could not run or exited with an error.
    Error {
        #[serde(rename = "jobId")]
        job_id: JobId,
        message: String,
    },

    /// Terminal: the job was cancelled.
    Canceled {
        #[serde(rename = "jobId")]
        job_id: JobId,
    },
}

/// How a job ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    Done,
    Error { message: String },
    Canceled,
}

impl JobOutcome {
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        match self {
            Self::Done => JobStatus::Succeeded,
            Self::Error { .. } => JobStatus::Failed,
            Self::Canceled => JobStatus::Canceled,
        }
    }
}

impl JobEvent {
    pub fn progress(job_id: JobId, update: &ProgressUpdate) -> Self {
        Self::Progress {
            job_id,
            percent: update.clamped_percent(),
            speed: update.speed.clone(),
            eta: update.eta.clone(),
        }
    }

    pub fn log(job_id: JobId, line: impl Into<String>) -> Self {
        Self::Log {
            job_id,
            line: line.into(),
        }
    }

    /// Build the terminal event for an outcome.
    #[must_use]
    pub fn terminal(job_id: JobId, outcome: JobOutcome) -> Self {
        match outcome {
            JobOutcome::Done => Self::Done { job_id },
            JobOutcome::Error { message } => Self::Error { job_id, message },
            JobOutcome::Canceled => Self::Canceled { job_id },
        }
    }

    /// The job this event belongs to.
    #[must_use]
    pub const fn job_id(&self) -> JobId {
        match self {
            Self::Started { job_id, .. }
            | Self::Progress { job_id, .. }
            | Self::Log { job_id, .. }
            | Self::Done { job_id }
            | Self::Error { job_id, .. }
            | Self::Canceled { job_id } => *job_id,
        }
    }

    /// Whether this event ends the job's lifetime.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Done { .. } | Self::Error { .. } | Self::Canceled { .. }
        )
    }

    /// The outcome carried by a terminal event.
    pub fn outcome(&self) -> Option<JobOutcome> {
        match self {
            Self::Done { .. } => Some(JobOutcome::Done),
            Self::Error { message, .. } => Some(JobOutcome::Error {
                message: message.clone(),
            }),
            Self::Canceled { .. } => Some(JobOutcome::Canceled),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_event_wire_format() {
        let update = ProgressUpdate {
            percent: Some(142.0),
            speed: "1.2MiB".to_string(),
            eta: "00:08".to_string(),
        };
        let event = JobEvent::progress(JobId::new(3), &update);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "progress");
        assert_eq!(json["jobId"], 3);
        assert_eq!(json["percent"], 100.0);
        assert_eq!(json["speed"], "1.2MiB");
    }

    #[test]
    fn test_terminal_round_trip_through_outcome() {
        let id = JobId::new(9);
        for outcome in [
            JobOutcome::Done,
            JobOutcome::Error {
                message: "boom".to_string(),
            },
            JobOutcome::Canceled,
        ] {
            let event = JobEvent::terminal(id, outcome.clone());
            assert!(event.is_terminal());
            assert_eq!(event.job_id(), id);
            assert_eq!(event.outcome(), Some(outcome));
        }
    }

    #[test]
    fn test_error_event_json() {
        let event = JobEvent::terminal(
            JobId::new(1),
            JobOutcome::Error {
                message: "exit 1".to_string(),
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"error","jobId":1,"message":"exit 1"}"#);
    }

    #[test]
    fn test_non_terminal_events() {
        let log = JobEvent::log(JobId::new(2), "line");
        assert!(!log.is_terminal());
        assert!(log.outcome().is_none());

        let started = JobEvent::Started {
            job_id: JobId::new(2),
            kind: JobKind::Convert,
        };
        let json = serde_json::to_value(&started).unwrap();
        assert_eq!(json["kind"], "convert");
    }
}
