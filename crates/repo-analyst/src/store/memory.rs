//! In-process job store.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use super::{check_transition, JobStore};
use crate::error::StoreError;
use crate::job::{Job, JobId, JobStatus};

/// A `JobStore` kept in a `RwLock<HashMap>`. Nothing survives the process.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for MemoryJobStore {
    fn create(&self, repository_locator: &str) -> Result<Job, StoreError> {
        let job = Job::new(repository_locator);
        let mut jobs = self.jobs.write().map_err(|_| StoreError::LockPoisoned)?;
        jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn get(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        let jobs = self.jobs.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(jobs.get(id).cloned())
    }

    fn update_status_and_report(
        &self,
        id: &JobId,
        status: JobStatus,
        report: Option<String>,
    ) -> Result<Option<Job>, StoreError> {
        // The write lock is held across check and mutation.
        let mut jobs = self.jobs.write().map_err(|_| StoreError::LockPoisoned)?;
        let Some(job) = jobs.get_mut(id) else {
            return Ok(None);
        };

        check_transition(id, job.status, status, report.as_deref())?;

        job.status = status;
        job.report_content = report;
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }

    fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, StoreError> {
        let jobs = self.jobs.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut matching: Vec<Job> = jobs
            .values()
            .filter(|job| job.status == status)
            .cloned()
            .collect();
        matching.sort_by_key(|job| job.created_at);
        Ok(matching)
    }
}
