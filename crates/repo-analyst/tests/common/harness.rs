//! Test harness wiring the full dispatch path over stubs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use repo_analyst::config::SelectionConfig;
use repo_analyst::{
    AnalysisPipeline, Dispatcher, FileFailurePolicy, FileSelector, Job, JobId, JobStatus,
    JobStore, MemoryJobStore, PipelineConfig, RepositoryFetcher, SummarizationBackend,
    SummarizationClient, WorkerPool,
};

const POLL_INTERVAL: Duration = Duration::from_millis(5);
const WAIT_LIMIT: Duration = Duration::from_secs(15);

pub struct TestHarness {
    temp_dir: TempDir,
    pub workspace_root: PathBuf,
    pub store: Arc<dyn JobStore>,
    pub dispatcher: Dispatcher,
    pool: Option<WorkerPool>,
}

impl TestHarness {
    pub fn new(
        fetcher: Arc<dyn RepositoryFetcher>,
        backend: Arc<dyn SummarizationBackend>,
    ) -> Self {
        Self::build(
            Arc::new(MemoryJobStore::new()),
            fetcher,
            backend,
            FileFailurePolicy::Fail,
            2,
        )
    }

    pub fn build(
        store: Arc<dyn JobStore>,
        fetcher: Arc<dyn RepositoryFetcher>,
        backend: Arc<dyn SummarizationBackend>,
        policy: FileFailurePolicy,
        workers: usize,
    ) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let workspace_root = temp_dir.path().join("workspaces");

        let config = PipelineConfig {
            workspace_root: workspace_root.clone(),
            on_file_error: policy,
            store_retry_attempts: 3,
            store_retry_delay: Duration::from_millis(5),
        };

        let pipeline = AnalysisPipeline::new(
            Arc::new(config),
            Arc::clone(&store),
            fetcher,
            FileSelector::new(&SelectionConfig::default()),
            SummarizationClient::new(backend, 20_000),
        );

        let pool = WorkerPool::new(Arc::new(pipeline), workers).expect("Failed to start pool");
        let dispatcher = Dispatcher::new(Arc::clone(&store), Arc::new(pool.queue()));

        Self {
            temp_dir,
            workspace_root,
            store,
            dispatcher,
            pool: Some(pool),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Polls until the job is terminal, returning every distinct status seen.
    pub fn wait_for_terminal(&self, id: &JobId) -> (Job, Vec<JobStatus>) {
        let deadline = Instant::now() + WAIT_LIMIT;
        let mut seen: Vec<JobStatus> = Vec::new();

        loop {
            let job = self.dispatcher.get_job(id).expect("job must exist");
            if seen.last() != Some(&job.status) {
                seen.push(job.status);
            }
            if job.status.is_terminal() {
                return (job, seen);
            }
            assert!(Instant::now() < deadline, "job {} never finished", id);
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn wait_for_status(&self, id: &JobId, status: JobStatus) {
        let deadline = Instant::now() + WAIT_LIMIT;
        while self.dispatcher.get_job(id).expect("job must exist").status != status {
            assert!(Instant::now() < deadline, "job {} never reached {}", id, status);
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Number of entries left under the workspace root.
    pub fn leftover_workspaces(&self) -> usize {
        std::fs::read_dir(&self.workspace_root)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub fn stop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.shutdown();
            assert_eq!(pool.wait(), 0, "a worker panicked");
        }
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.shutdown();
            pool.wait();
        }
    }
}

/// Position in the lifecycle, for ordering checks.
pub fn status_rank(status: JobStatus) -> u8 {
    match status {
        JobStatus::Pending => 0,
        JobStatus::Running => 1,
        JobStatus::Complete | JobStatus::Failed => 2,
    }
}
