//! Repository acquisition into job-scoped workspaces.

pub mod git;
pub mod workspace;

pub use git::GitFetcher;
pub use workspace::Workspace;

use std::path::Path;

use crate::error::FetchError;

/// Materializes a repository's file tree at a local path.
pub trait RepositoryFetcher: Send + Sync {
    /// Populates `destination`, which must already exist and be empty.
    fn fetch(&self, locator: &str, destination: &Path) -> Result<(), FetchError>;
}
