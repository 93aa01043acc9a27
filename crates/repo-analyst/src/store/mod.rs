//! Job Store: the durable mapping from job id to job record.
//!
//! The store is the only shared mutable state in the crate and the only
//! place clients observe job progress. Every write is scoped to one job id
//! and changes status and report together.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryJobStore;
pub use sqlite::SqliteJobStore;

use crate::error::StoreError;
use crate::job::{Job, JobId, JobStatus};

pub trait JobStore: Send + Sync {
    /// Persists a new `Pending` job for `repository_locator`.
    fn create(&self, repository_locator: &str) -> Result<Job, StoreError>;

    fn get(&self, id: &JobId) -> Result<Option<Job>, StoreError>;

    /// Atomically moves a job to `status`, writing `report` in the same step.
    ///
    /// Returns `Ok(None)` when the job does not exist. Illegal transitions
    /// and a report that does not match the target state are rejected
    /// without touching the record.
    fn update_status_and_report(
        &self,
        id: &JobId,
        status: JobStatus,
        report: Option<String>,
    ) -> Result<Option<Job>, StoreError>;

    fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, StoreError>;
}

/// Checks a requested transition against the lifecycle rules shared by
/// every store implementation.
pub(crate) fn check_transition(
    id: &JobId,
    from: JobStatus,
    to: JobStatus,
    report: Option<&str>,
) -> Result<(), StoreError> {
    if !from.can_transition_to(to) {
        return Err(StoreError::InvalidTransition {
            id: id.clone(),
            from,
            to,
        });
    }

    match (to.is_terminal(), report.is_some()) {
        (true, false) => Err(StoreError::ReportMismatch {
            id: id.clone(),
            to,
            expectation: "is required",
        }),
        (false, true) => Err(StoreError::ReportMismatch {
            id: id.clone(),
            to,
            expectation: "is not allowed",
        }),
        _ => Ok(()),
    }
}
