//! Repository fetch through the `git` command line client.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::fetch::RepositoryFetcher;
use crate::sanitize::redact_repo_url;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Clones repositories with `git clone`, shallow by default.
#[derive(Debug, Clone)]
pub struct GitFetcher {
    git_binary: String,
    shallow: bool,
    timeout: Option<Duration>,
}

impl GitFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            git_binary: config.git_binary.clone(),
            shallow: config.shallow,
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    fn clone_args<'a>(&self, locator: &'a str, destination: &'a Path) -> Vec<&'a std::ffi::OsStr> {
        let mut args: Vec<&std::ffi::OsStr> = vec!["clone".as_ref(), "--quiet".as_ref()];
        if self.shallow {
            args.push("--depth".as_ref());
            args.push("1".as_ref());
        }
        args.push("--".as_ref());
        args.push(locator.as_ref());
        args.push(destination.as_os_str());
        args
    }

    fn wait_with_deadline(&self, mut child: Child) -> Result<Output, FetchError> {
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let started = Instant::now();
        let status: ExitStatus = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    return Err(FetchError::Spawn {
                        program: self.git_binary.clone(),
                        source: e,
                    })
                }
            }

            if let Some(limit) = self.timeout {
                if started.elapsed() >= limit {
                    if let Err(e) = child.kill() {
                        log::warn!("Failed to kill timed out git process: {}", e);
                    }
                    let _ = child.wait();
                    return Err(FetchError::TimedOut(limit.as_secs()));
                }
            }

            thread::sleep(POLL_INTERVAL);
        };

        Ok(Output {
            status,
            stdout: collect(stdout),
            stderr: collect(stderr),
        })
    }
}

impl RepositoryFetcher for GitFetcher {
    fn fetch(&self, locator: &str, destination: &Path) -> Result<(), FetchError> {
        let _span = tracing::info_span!("git_clone", locator = %redact_repo_url(locator)).entered();

        let child = Command::new(&self.git_binary)
            .args(self.clone_args(locator, destination))
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FetchError::Spawn {
                program: self.git_binary.clone(),
                source: e,
            })?;

        let output = self.wait_with_deadline(child)?;

        if output.status.success() {
            tracing::debug!("Clone finished");
            Ok(())
        } else {
            Err(FetchError::CloneFailed(format_git_error(&output)))
        }
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Formats a failed git invocation from its stderr and stdout.
pub fn format_git_error(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

    match (stderr.is_empty(), stdout.is_empty()) {
        (true, true) => format!(
            "Command failed with exit code {}",
            output.status.code().unwrap_or(-1)
        ),
        (true, false) => stdout,
        (false, true) => stderr,
        (false, false) => format!("{}\n{}", stderr, stdout),
    }
}
