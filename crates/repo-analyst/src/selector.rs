use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::config::SelectionConfig;
use crate::error::SelectionError;

const VCS_METADATA_DIR: &str = ".git";

/// Picks the largest source files in a materialized repository.
///
/// The walk visits entries sorted by file name, so the result is a pure
/// function of the file system snapshot. Equal sizes keep walk order.
#[derive(Debug, Clone)]
pub struct FileSelector {
    max_files: usize,
    extensions: Vec<String>,
}

impl FileSelector {
    pub fn new(config: &SelectionConfig) -> Self {
        Self {
            max_files: config.max_files,
            extensions: config.extensions.clone(),
        }
    }

    /// Returns at most `max_files` paths, largest first. An empty result
    /// means no eligible file exists.
    pub fn select(&self, root: &Path) -> Result<Vec<PathBuf>, SelectionError> {
        let mut candidates: Vec<(PathBuf, u64)> = Vec::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_vcs_metadata(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(SelectionError::ScanFailed {
                        path: root.to_path_buf(),
                        source: e,
                    })
                }
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.is_allowed(&entry) {
                continue;
            }

            match entry.metadata() {
                Ok(meta) => candidates.push((entry.into_path(), meta.len())),
                Err(e) => debug!("Skipping file without readable size: {}", e),
            }
        }

        candidates.sort_by(|a, b| b.1.cmp(&a.1));

        let selected: Vec<PathBuf> = candidates
            .into_iter()
            .take(self.max_files)
            .map(|(path, _)| path)
            .collect();

        info!("Selected {} file(s) in {}", selected.len(), root.display());
        Ok(selected)
    }

    fn is_allowed(&self, entry: &DirEntry) -> bool {
        entry
            .file_name()
            .to_str()
            .map(|name| self.extensions.iter().any(|ext| name.ends_with(ext.as_str())))
            .unwrap_or(false)
    }
}

fn is_vcs_metadata(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name() == VCS_METADATA_DIR
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn selector(max_files: usize) -> FileSelector {
        FileSelector::new(&SelectionConfig {
            max_files,
            ..SelectionConfig::default()
        })
    }

    fn write_sized(root: &Path, rel: &str, size: usize) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x".repeat(size)).unwrap();
    }

    fn names(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_largest_first_ties_in_walk_order() {
        let dir = tempfile::tempdir().unwrap();
        write_sized(dir.path(), "a.py", 10);
        write_sized(dir.path(), "b.py", 50);
        write_sized(dir.path(), "c.py", 5);
        write_sized(dir.path(), "d.py", 50);
        write_sized(dir.path(), "e.py", 1);

        let selected = selector(3).select(dir.path()).unwrap();
        assert_eq!(names(dir.path(), &selected), vec!["b.py", "d.py", "a.py"]);
    }

    #[test]
    fn test_skips_vcs_metadata_and_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write_sized(dir.path(), ".git/hooks/pre-commit.sh", 500);
        write_sized(dir.path(), "README.md", 400);
        write_sized(dir.path(), "src/main.go", 20);
        write_sized(dir.path(), "Makefile", 300);

        let selected = selector(5).select(dir.path()).unwrap();
        assert_eq!(names(dir.path(), &selected), vec!["src/main.go"]);
    }

    #[test]
    fn test_nested_directories_are_walked() {
        let dir = tempfile::tempdir().unwrap();
        write_sized(dir.path(), "web/static/app.js", 30);
        write_sized(dir.path(), "web/index.html", 40);
        write_sized(dir.path(), "db/schema.sql", 10);

        let selected = selector(5).select(dir.path()).unwrap();
        assert_eq!(
            names(dir.path(), &selected),
            vec!["web/index.html", "web/static/app.js", "db/schema.sql"]
        );
    }

    #[test]
    fn test_no_eligible_files_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        write_sized(dir.path(), "notes.txt", 10);
        assert!(selector(5).select(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        write_sized(dir.path(), "LOUD.PY", 10);
        assert!(selector(5).select(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_root_is_scan_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = selector(5).select(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, SelectionError::ScanFailed { .. }));
    }
}
