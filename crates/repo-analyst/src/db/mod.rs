//! SQLite persistence for job records.
//!
//! A process holds one connection, shared by the dispatcher, every worker
//! and status polling. Statements touch a single job row and finish quickly,
//! so one mutex is enough inside the process. Across processes, WAL lets
//! `repo-analyst status` read while workers write, and the busy timeout
//! makes a writer wait out another process instead of failing the
//! transition outright.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;

use crate::error::DatabaseError;

pub mod job_repo;
pub mod migrations;

/// How long a statement waits on a lock held by another connection.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle on the job database. Clones share the same connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens the job database at `path`, creating it and its parent
    /// directories on first use, and brings the schema up to date.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        let journal_mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        if !journal_mode.eq_ignore_ascii_case("wal") {
            log::warn!(
                "Journal mode is '{}', concurrent status reads may block workers",
                journal_mode
            );
        }

        let db = Self::prepare(conn, busy_timeout)?;
        log::info!("Job database opened at {}", path.display());
        Ok(db)
    }

    /// A private database that disappears with the handle.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::prepare(Connection::open_in_memory()?, DEFAULT_BUSY_TIMEOUT)
    }

    fn prepare(conn: Connection, busy_timeout: Duration) -> Result<Self, DatabaseError> {
        conn.busy_timeout(busy_timeout)?;
        migrations::run_all(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` with the connection locked. Keep `f` to one job's statements.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }
}

/// `~/.repo-analyst/data/jobs.db`, or `None` without a home directory.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".repo-analyst").join("data").join("jobs.db"))
}
