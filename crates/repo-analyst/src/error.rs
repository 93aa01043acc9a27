use std::path::PathBuf;
use thiserror::Error;

use crate::job::{JobId, JobStatus};

#[derive(Error, Debug)]
pub enum AnalystError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Summarization error: {0}")]
    Summarization(#[from] SummarizationError),

    #[error("Summarization backend error: {0}")]
    Backend(#[from] crate::summarize::BackendError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

/// Errors raised while materializing a repository into a workspace.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to create workspace under '{root}': {source}")]
    Workspace {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to clone repository: {0}")]
    CloneFailed(String),

    #[error("Clone did not finish within {0}s")]
    TimedOut(u64),
}

/// Errors raised while scanning a workspace for candidate files.
#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Directory scan failed for '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// A single file's summarization failed.
#[derive(Error, Debug)]
pub enum SummarizationError {
    #[error("Failed to read '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Summarization service failed for '{path}': {source}")]
    Backend {
        path: String,
        #[source]
        source: crate::summarize::BackendError,
    },

    #[error("Summarization service returned an empty summary for '{0}'")]
    EmptySummary(String),
}

/// Errors from the SQLite job database.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Migration v{version} failed: {reason}")]
    Migration { version: u32, reason: String },

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Illegal status transition for job {id}: {from} -> {to}")]
    InvalidTransition {
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Report content {expectation} when moving job {id} to {to}")]
    ReportMismatch {
        id: JobId,
        to: JobStatus,
        expectation: &'static str,
    },

    #[error("Corrupt job record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Repository locator must not be empty")]
    EmptyLocator,

    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error("Failed to persist job: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to enqueue job {id}: {source}")]
    Enqueue {
        id: JobId,
        #[source]
        source: WorkerError,
    },
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to spawn worker: {0}")]
    SpawnFailed(String),

    #[error("Worker queue closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, AnalystError>;
