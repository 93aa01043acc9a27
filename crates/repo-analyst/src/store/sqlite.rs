//! Durable job store backed by the SQLite `jobs` table.

use chrono::{DateTime, SecondsFormat, Utc};

use super::{check_transition, JobStore};
use crate::db::job_repo::{self, JobRow};
use crate::db::Database;
use crate::error::StoreError;
use crate::job::{Job, JobId, JobStatus};

pub struct SqliteJobStore {
    db: Database,
}

impl SqliteJobStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// Fixed-width RFC 3339, so `ORDER BY created_at` sorts chronologically.
fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(s: &str, id: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::CorruptRecord {
            id: id.to_string(),
            reason: format!("bad timestamp '{}': {}", s, e),
        })
}

fn to_row(job: &Job) -> JobRow {
    JobRow {
        id: job.id.to_string(),
        repository_locator: job.repository_locator.clone(),
        status: job.status.as_str().to_string(),
        report_content: job.report_content.clone(),
        created_at: format_timestamp(job.created_at),
        updated_at: format_timestamp(job.updated_at),
    }
}

fn from_row(row: JobRow) -> Result<Job, StoreError> {
    let status = row
        .status
        .parse::<JobStatus>()
        .map_err(|reason| StoreError::CorruptRecord {
            id: row.id.clone(),
            reason,
        })?;
    let created_at = parse_timestamp(&row.created_at, &row.id)?;
    let updated_at = parse_timestamp(&row.updated_at, &row.id)?;

    Ok(Job {
        id: JobId::from(row.id),
        repository_locator: row.repository_locator,
        status,
        report_content: row.report_content,
        created_at,
        updated_at,
    })
}

impl JobStore for SqliteJobStore {
    fn create(&self, repository_locator: &str) -> Result<Job, StoreError> {
        let job = Job::new(repository_locator);
        job_repo::insert(&self.db, &to_row(&job))?;
        Ok(job)
    }

    fn get(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        job_repo::find_by_id(&self.db, id.as_str())?
            .map(from_row)
            .transpose()
    }

    fn update_status_and_report(
        &self,
        id: &JobId,
        status: JobStatus,
        report: Option<String>,
    ) -> Result<Option<Job>, StoreError> {
        let Some(current) = self.get(id)? else {
            return Ok(None);
        };

        check_transition(id, current.status, status, report.as_deref())?;

        // The UPDATE is conditional on the status we just read, so a
        // concurrent writer cannot slip a second transition in between.
        let applied = job_repo::transition(
            &self.db,
            id.as_str(),
            current.status.as_str(),
            status.as_str(),
            report.as_deref(),
            &format_timestamp(Utc::now()),
        )?;

        if !applied {
            let from = self.get(id)?.map(|j| j.status).unwrap_or(current.status);
            return Err(StoreError::InvalidTransition {
                id: id.clone(),
                from,
                to: status,
            });
        }

        self.get(id)
    }

    fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, StoreError> {
        job_repo::find_by_status(&self.db, status.as_str())?
            .into_iter()
            .map(from_row)
            .collect()
    }
}
