use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::FetchError;

/// An exclusively-owned scratch directory for one pipeline run.
///
/// The directory and everything in it is removed when the value is dropped,
/// on every exit path of the run.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates a fresh, empty `job-*` directory under `root`, creating `root`
    /// if needed.
    pub fn create_in(root: &Path) -> Result<Self, FetchError> {
        std::fs::create_dir_all(root).map_err(|e| FetchError::Workspace {
            root: root.to_path_buf(),
            source: e,
        })?;

        let dir = tempfile::Builder::new()
            .prefix("job-")
            .tempdir_in(root)
            .map_err(|e| FetchError::Workspace {
                root: root.to_path_buf(),
                source: e,
            })?;

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn to_path_buf(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        log::debug!("Releasing workspace {}", self.dir.path().display());
    }
}
