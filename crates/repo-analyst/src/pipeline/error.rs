use thiserror::Error;

use crate::error::{FetchError, SelectionError, SummarizationError};

/// Job-fatal failures. The display text becomes the FAILED report.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Selection(#[from] SelectionError),

    #[error("No supported files found in the repository.")]
    NoEligibleFiles,

    #[error("{0}")]
    Summarization(#[from] SummarizationError),

    #[error("None of the {0} selected files could be summarized.")]
    NoSummaries(usize),

    #[error("Analysis was interrupted: {0}")]
    Interrupted(String),
}

impl PipelineError {
    /// Human-readable failure narrative stored as the report of a FAILED job.
    pub fn narrative(&self) -> String {
        format!("An error occurred: {}", self)
    }
}
