#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use repo_analyst::{BackendError, FetchError, RepositoryFetcher, SummarizationBackend};

/// A latch that blocks fetches until opened.
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.cond.notify_all();
    }

    fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            let (guard, _) = self
                .cond
                .wait_timeout(open, Duration::from_secs(10))
                .unwrap();
            open = guard;
        }
    }
}

/// Writes a fixed file tree, or fails, instead of cloning.
#[derive(Default)]
pub struct StubFetcher {
    files: Vec<(String, Vec<u8>)>,
    fail_with: Option<String>,
    gate: Option<std::sync::Arc<Gate>>,
    gated_locator: Option<String>,
    destinations: Mutex<Vec<PathBuf>>,
}

impl StubFetcher {
    pub fn with_files(files: &[(&str, usize)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(rel, size)| (rel.to_string(), vec![b'x'; *size]))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing(stderr: &str) -> Self {
        Self {
            fail_with: Some(stderr.to_string()),
            ..Self::default()
        }
    }

    /// Fetches of `locator` wait for `gate` to open.
    pub fn gated(mut self, locator: &str, gate: std::sync::Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self.gated_locator = Some(locator.to_string());
        self
    }

    pub fn destinations(&self) -> Vec<PathBuf> {
        self.destinations.lock().unwrap().clone()
    }
}

impl RepositoryFetcher for StubFetcher {
    fn fetch(&self, locator: &str, destination: &Path) -> Result<(), FetchError> {
        self.destinations
            .lock()
            .unwrap()
            .push(destination.to_path_buf());

        if let (Some(gate), Some(gated)) = (&self.gate, &self.gated_locator) {
            if gated == locator {
                gate.wait();
            }
        }

        // Something lands in the workspace either way, like a partial clone.
        std::fs::create_dir_all(destination.join(".git")).unwrap();
        std::fs::write(destination.join(".git").join("HEAD"), "ref: refs/heads/main").unwrap();

        if let Some(stderr) = &self.fail_with {
            return Err(FetchError::CloneFailed(stderr.clone()));
        }

        for (rel, content) in &self.files {
            let path = destination.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        Ok(())
    }
}

/// Replies per file name, taken from the path quoted in the prompt.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: HashMap<String, Result<String, String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, file: &str, summary: &str) -> Self {
        self.replies
            .insert(file.to_string(), Ok(summary.to_string()));
        self
    }

    pub fn fail(mut self, file: &str, message: &str) -> Self {
        self.replies
            .insert(file.to_string(), Err(message.to_string()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl SummarizationBackend for ScriptedBackend {
    fn generate(&self, _instruction: &str, content: &str) -> Result<String, BackendError> {
        self.prompts.lock().unwrap().push(content.to_string());
        let file = content.split('`').nth(1).unwrap_or_default();
        match self.replies.get(file) {
            Some(Ok(summary)) => Ok(summary.clone()),
            Some(Err(message)) => Err(BackendError::InvalidResponse(message.clone())),
            None => Ok(format!("## Purpose\n\nStub summary for {}.", file)),
        }
    }
}
