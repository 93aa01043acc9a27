use std::path::{Path, PathBuf};

use crate::fetch::Workspace;
use crate::job::Job;

/// State carried through one pipeline run.
///
/// Owns the run's workspace, so dropping the context removes it.
pub struct PipelineContext {
    pub job: Job,

    // Step 1 result
    pub workspace: Option<Workspace>,

    // Step 2 result, in selector order
    pub selected: Vec<PathBuf>,

    // Number of selected files without a summary (inline policy only)
    pub unavailable: usize,
}

impl PipelineContext {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            workspace: None,
            selected: Vec::new(),
            unavailable: 0,
        }
    }

    pub fn workspace_path(&self) -> Option<&Path> {
        self.workspace.as_ref().map(Workspace::path)
    }
}
