//! Running-job table.
//!
//! The registry owns every running job's cancellation handle. The emitter is
//! never called with the table lock held, so an emitter may call back into
//! the registry (for example to cancel a job from a log line).
//!
//! Events for a job are emitted by the task that runs it, plus `started` from
//! the submitter before that task exists. The terminal event is the runner
//! task's last emission, so nothing can follow it. `cancel` only removes the
//! entry and fires the token; the runner task then reports `canceled`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use dlpro_core::{
    JobEvent, JobEventEmitterPort, JobId, JobKind, JobOutcome, JobStatus, JobSummary, RequestError,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

struct JobEntry {
    kind: JobKind,
    started_at: DateTime<Utc>,
    pid: Option<u32>,
    cancel: CancellationToken,
}

impl JobEntry {
    fn summary(&self, id: JobId) -> JobSummary {
        JobSummary {
            id,
            kind: self.kind,
            started_at: self.started_at,
            pid: self.pid,
            status: JobStatus::Running,
        }
    }
}

#[derive(Default)]
struct JobTable {
    running: HashMap<JobId, JobEntry>,
    /// Cancelled jobs whose runner task has not reported back yet.
    cancelled: HashSet<JobId>,
}

impl JobTable {
    fn cancel(&mut self, id: JobId) -> bool {
        let Some(entry) = self.running.remove(&id) else {
            return false;
        };
        entry.cancel.cancel();
        self.cancelled.insert(id);
        true
    }
}

/// Assigns job ids and tracks running jobs.
pub struct JobRegistry {
    next_id: AtomicU64,
    jobs: Mutex<JobTable>,
    emitter: Arc<dyn JobEventEmitterPort>,
    max_jobs: Option<usize>,
}

impl std::fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRegistry")
            .field("next_id", &self.next_id)
            .field("running", &self.len())
            .field("max_jobs", &self.max_jobs)
            .finish_non_exhaustive()
    }
}

impl JobRegistry {
    pub fn new(emitter: Arc<dyn JobEventEmitterPort>, max_jobs: Option<usize>) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            jobs: Mutex::new(JobTable::default()),
            emitter,
            max_jobs,
        }
    }

    fn lock(&self) -> MutexGuard<'_, JobTable> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new running job and emit its `started` event.
    ///
    /// Fails with `TooManyJobs` when the concurrent-job limit is reached; no
    /// id is consumed in that case.
    pub fn register(&self, kind: JobKind, cancel: CancellationToken) -> Result<JobId, RequestError> {
        let id = {
            let mut jobs = self.lock();
            if let Some(limit) = self.max_jobs {
                if jobs.running.len() >= limit {
                    return Err(RequestError::TooManyJobs { limit });
                }
            }

            let id = JobId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
            jobs.running.insert(
                id,
                JobEntry {
                    kind,
                    started_at: Utc::now(),
                    pid: None,
                    cancel,
                },
            );
            id
        };

        self.emitter.emit(JobEvent::Started { job_id: id, kind });
        Ok(id)
    }

    /// Record the OS process id once the job's child is spawned.
    pub fn set_pid(&self, id: JobId, pid: Option<u32>) {
        if let Some(entry) = self.lock().running.get_mut(&id) {
            entry.pid = pid;
        }
    }

    /// Emit a non-terminal event if its job is still running.
    ///
    /// Only the job's runner task may call this. Returns whether the event
    /// was emitted.
    pub fn emit_if_live(&self, event: JobEvent) -> bool {
        let live = self.lock().running.contains_key(&event.job_id());
        if live {
            self.emitter.emit(event);
        }
        live
    }

    /// Report how a job's runner task ended and emit the terminal event.
    ///
    /// A job cancelled in the meantime ends as `canceled` whatever the runner
    /// saw. Returns the emitted outcome, or `None` when `id` is unknown or
    /// already finished.
    pub fn finish(&self, id: JobId, outcome: JobOutcome) -> Option<JobOutcome> {
        let outcome = {
            let mut jobs = self.lock();
            if jobs.running.remove(&id).is_some() {
                outcome
            } else if jobs.cancelled.remove(&id) {
                JobOutcome::Canceled
            } else {
                debug!(job_id = %id, "dropping outcome for unregistered job");
                return None;
            }
        };

        self.emitter.emit(JobEvent::terminal(id, outcome.clone()));
        Some(outcome)
    }

    /// Remove a job and signal its termination.
    ///
    /// The `canceled` event follows from the job's runner task. Returns
    /// `false` with no side effects when `id` is not running.
    pub fn cancel(&self, id: JobId) -> bool {
        self.lock().cancel(id)
    }

    /// Cancel every running job, returning the ids that were cancelled.
    pub fn cancel_all(&self) -> Vec<JobId> {
        let mut jobs = self.lock();
        let mut ids: Vec<JobId> = jobs.running.keys().copied().collect();
        ids.sort_unstable();
        for id in &ids {
            jobs.cancel(*id);
        }
        ids
    }

    pub fn is_running(&self, id: JobId) -> bool {
        self.lock().running.contains_key(&id)
    }

    /// Snapshot of running jobs ordered by id.
    pub fn list(&self) -> Vec<JobSummary> {
        let jobs = self.lock();
        let mut summaries: Vec<JobSummary> = jobs
            .running
            .iter()
            .map(|(id, entry)| entry.summary(*id))
            .collect();
        summaries.sort_by_key(|summary| summary.id);
        summaries
    }

    pub fn len(&self) -> usize {
        self.lock().running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().running.is_empty()
    }
}
