use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use super::backend::SummarizationBackend;
use super::fence::strip_code_fence;
use super::prompt::{build_user_prompt, truncate, INSTRUCTION};
use crate::error::SummarizationError;
use crate::report::relative_path;

/// Summarizes one file at a time through an injected backend.
#[derive(Clone)]
pub struct SummarizationClient {
    backend: Arc<dyn SummarizationBackend>,
    max_content_chars: usize,
}

impl SummarizationClient {
    pub fn new(backend: Arc<dyn SummarizationBackend>, max_content_chars: usize) -> Self {
        Self {
            backend,
            max_content_chars,
        }
    }

    /// Returns the markdown summary of `file`, named relative to `repo_root`.
    ///
    /// Undecodable bytes are replaced, and content beyond the character cap
    /// is cut and marked before the request is built.
    pub fn summarize(&self, file: &Path, repo_root: &Path) -> Result<String, SummarizationError> {
        let rel = relative_path(file, repo_root);

        let bytes = read_prefix(file, byte_budget(self.max_content_chars)).map_err(|e| {
            SummarizationError::ReadFile {
                path: file.to_path_buf(),
                source: e,
            }
        })?;
        let content = String::from_utf8_lossy(&bytes);
        let content = truncate(&content, self.max_content_chars);

        let prompt = build_user_prompt(&rel, &content);
        let response = self
            .backend
            .generate(INSTRUCTION, &prompt)
            .map_err(|e| SummarizationError::Backend {
                path: rel.clone(),
                source: e,
            })?;

        let summary = strip_code_fence(&response);
        if summary.is_empty() {
            return Err(SummarizationError::EmptySummary(rel));
        }

        Ok(summary)
    }
}

/// Bytes that always decode to more than `max_chars` characters, so a
/// longer file is still cut by `truncate` at the same place.
fn byte_budget(max_chars: usize) -> u64 {
    (max_chars as u64).saturating_mul(4).saturating_add(4)
}

/// Reads at most `limit` bytes from the start of `path`.
fn read_prefix(path: &Path, limit: u64) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    File::open(path)?.take(limit).read_to_end(&mut bytes)?;
    Ok(bytes)
}
