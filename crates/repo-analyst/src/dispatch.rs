//! Job submission, lookup and startup recovery.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{DispatchError, StoreError};
use crate::job::{Job, JobId, JobStatus};
use crate::pipeline::PipelineError;
use crate::sanitize::redact_repo_url;
use crate::store::JobStore;
use crate::worker::JobQueue;

const INTERRUPTED_REASON: &str = "the process stopped before the job finished";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub repository_locator: String,
}

impl SubmitRequest {
    pub fn new(repository_locator: impl Into<String>) -> Self {
        Self {
            repository_locator: repository_locator.into(),
        }
    }
}

/// What [`Dispatcher::recover`] did with jobs left over by a previous process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// RUNNING jobs moved to FAILED.
    pub failed: Vec<JobId>,
    /// PENDING jobs handed to the queue again.
    pub requeued: Vec<JobId>,
}

pub struct Dispatcher {
    store: Arc<dyn JobStore>,
    queue: Arc<dyn JobQueue>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn JobStore>, queue: Arc<dyn JobQueue>) -> Self {
        Self { store, queue }
    }

    /// Persists a PENDING job and enqueues it without waiting for the run.
    ///
    /// If the enqueue fails the job stays PENDING and is picked up by the
    /// next [`recover`](Self::recover).
    pub fn submit(&self, request: SubmitRequest) -> Result<Job, DispatchError> {
        let locator = request.repository_locator.trim();
        if locator.is_empty() {
            return Err(DispatchError::EmptyLocator);
        }

        let job = self.store.create(locator)?;
        info!(job_id = %job.id, locator = %redact_repo_url(locator), "Job accepted");

        self.queue
            .enqueue(job.id.clone())
            .map_err(|e| DispatchError::Enqueue {
                id: job.id.clone(),
                source: e,
            })?;

        Ok(job)
    }

    pub fn get_job(&self, id: &JobId) -> Result<Job, DispatchError> {
        self.store
            .get(id)?
            .ok_or_else(|| DispatchError::NotFound(id.clone()))
    }

    /// Fails jobs a dead process left RUNNING and re-enqueues PENDING ones.
    ///
    /// Must run before the pool starts taking new submissions.
    pub fn recover(&self) -> Result<RecoveryReport, DispatchError> {
        let mut report = RecoveryReport::default();
        let narrative = PipelineError::Interrupted(INTERRUPTED_REASON.to_string()).narrative();

        for job in self.store.list_by_status(JobStatus::Running)? {
            match self.store.update_status_and_report(
                &job.id,
                JobStatus::Failed,
                Some(narrative.clone()),
            ) {
                Ok(Some(_)) => report.failed.push(job.id),
                Ok(None) | Err(StoreError::InvalidTransition { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }

        for job in self.store.list_by_status(JobStatus::Pending)? {
            self.queue
                .enqueue(job.id.clone())
                .map_err(|e| DispatchError::Enqueue {
                    id: job.id.clone(),
                    source: e,
                })?;
            report.requeued.push(job.id);
        }

        if !report.failed.is_empty() || !report.requeued.is_empty() {
            warn!(
                failed = report.failed.len(),
                requeued = report.requeued.len(),
                "Recovered jobs from a previous run"
            );
        }

        Ok(report)
    }
}
