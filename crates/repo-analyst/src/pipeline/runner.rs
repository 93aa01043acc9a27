use std::sync::Arc;
use std::thread;

use tracing::{debug, error, info, info_span, warn};

use crate::config::{AnalystConfig, FileFailurePolicy};
use crate::error::StoreError;
use crate::fetch::{GitFetcher, RepositoryFetcher, Workspace};
use crate::job::{Job, JobId, JobStatus};
use crate::report::{relative_path, ReportBuilder};
use crate::sanitize;
use crate::selector::FileSelector;
use crate::store::JobStore;
use crate::summarize::{GeminiBackend, SummarizationClient};

use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::error::PipelineError;

/// How a call to [`AnalysisPipeline::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Complete,
    Failed,
    /// The job was missing, already claimed, or could not be moved to RUNNING.
    NotStarted,
    /// The terminal write failed after every retry; the job is still RUNNING.
    Unrecorded,
}

/// Drives one job from PENDING to a terminal state.
pub struct AnalysisPipeline {
    config: Arc<PipelineConfig>,
    store: Arc<dyn JobStore>,
    fetcher: Arc<dyn RepositoryFetcher>,
    selector: FileSelector,
    summarizer: SummarizationClient,
}

impl AnalysisPipeline {
    /// Production constructor: git fetcher and Gemini backend from config.
    pub fn from_config(config: &AnalystConfig, store: Arc<dyn JobStore>) -> crate::Result<Self> {
        let backend = GeminiBackend::from_config(&config.summarizer)?;

        Ok(Self::new(
            Arc::new(PipelineConfig::from_config(config)),
            store,
            Arc::new(GitFetcher::new(&config.fetch)),
            FileSelector::new(&config.selection),
            SummarizationClient::new(Arc::new(backend), config.summarizer.max_content_chars),
        ))
    }

    pub fn new(
        config: Arc<PipelineConfig>,
        store: Arc<dyn JobStore>,
        fetcher: Arc<dyn RepositoryFetcher>,
        selector: FileSelector,
        summarizer: SummarizationClient,
    ) -> Self {
        Self {
            config,
            store,
            fetcher,
            selector,
            summarizer,
        }
    }

    /// Runs the job to completion. Every failure after the RUNNING
    /// transition ends in a FAILED record; nothing is returned to a client.
    pub fn run(&self, id: &JobId) -> RunOutcome {
        let job = match self.store.get(id) {
            Ok(Some(job)) => job,
            Ok(None) => {
                error!(job_id = %id, "Dispatched job does not exist");
                return RunOutcome::NotStarted;
            }
            Err(e) => {
                error!(job_id = %id, error = %e, "Failed to load job");
                return RunOutcome::NotStarted;
            }
        };

        let _pipeline_span = info_span!("pipeline",
            job_id = %job.id,
            locator = %sanitize::redact_repo_url(&job.repository_locator),
        )
        .entered();

        if job.status != JobStatus::Pending {
            debug!(status = %job.status, "Job is not pending, skipping");
            return RunOutcome::NotStarted;
        }

        let claimed = self.write_with_retry("mark job running", || {
            self.store
                .update_status_and_report(id, JobStatus::Running, None)
        });
        match claimed {
            Ok(Some(_)) => info!("Job started"),
            Ok(None) => {
                error!("Job disappeared before it could start");
                return RunOutcome::NotStarted;
            }
            Err(StoreError::InvalidTransition { from, .. }) => {
                debug!(status = %from, "Job was claimed elsewhere");
                return RunOutcome::NotStarted;
            }
            Err(e) => {
                error!(error = %e, "Giving up on marking job running");
                return RunOutcome::NotStarted;
            }
        }

        let mut ctx = PipelineContext::new(job);
        let (status, report) = match self.execute(&mut ctx) {
            Ok(report) => (JobStatus::Complete, report),
            Err(e) => {
                warn!(error = %e, "Job failed");
                (JobStatus::Failed, e.narrative())
            }
        };

        // The workspace is gone before the job is observably finished.
        drop(ctx);
        self.finish(id, status, report)
    }

    /// Moves a job whose run aborted abnormally to FAILED.
    ///
    /// A PENDING job is passed through RUNNING first so the observed
    /// history stays PENDING, RUNNING, FAILED. Terminal jobs are left alone.
    pub fn fail_interrupted(&self, id: &JobId, reason: &str) -> Result<(), StoreError> {
        let Some(job) = self.store.get(id)? else {
            return Ok(());
        };

        if job.status == JobStatus::Pending {
            self.store
                .update_status_and_report(id, JobStatus::Running, None)?;
        } else if job.status.is_terminal() {
            return Ok(());
        }

        let narrative = PipelineError::Interrupted(reason.to_string()).narrative();
        self.store
            .update_status_and_report(id, JobStatus::Failed, Some(narrative))?;
        Ok(())
    }

    fn execute(&self, ctx: &mut PipelineContext) -> Result<String, PipelineError> {
        {
            let _step = info_span!("fetch").entered();
            self.step_fetch(ctx)?;
        }

        {
            let _step = info_span!("select").entered();
            self.step_select(ctx)?;
        }

        let _step = info_span!("summarize", files = ctx.selected.len()).entered();
        self.step_summarize(ctx)
    }

    fn step_fetch(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let workspace = Workspace::create_in(&self.config.workspace_root)?;
        debug!(workspace = %sanitize::redact_path(workspace.path()), "Workspace created");

        // Held in the context before fetching so a failed clone is still cleaned up.
        let workspace = ctx.workspace.insert(workspace);
        self.fetcher
            .fetch(&ctx.job.repository_locator, workspace.path())?;
        Ok(())
    }

    fn step_select(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let root = ctx.workspace_path().ok_or(PipelineError::NoEligibleFiles)?;
        let selected = self.selector.select(root)?;
        if selected.is_empty() {
            return Err(PipelineError::NoEligibleFiles);
        }
        ctx.selected = selected;
        Ok(())
    }

    fn step_summarize(&self, ctx: &mut PipelineContext) -> Result<String, PipelineError> {
        let root = ctx
            .workspace
            .as_ref()
            .map(|w| w.to_path_buf())
            .ok_or(PipelineError::NoEligibleFiles)?;

        let mut report = ReportBuilder::new(&ctx.job.repository_locator);
        let total = ctx.selected.len();

        for (i, file) in ctx.selected.iter().enumerate() {
            let rel = relative_path(file, &root);
            let _file_span = info_span!("summarize_file", file = %rel).entered();
            info!("Analyzing [{}/{}]", i + 1, total);

            match self.summarizer.summarize(file, &root) {
                Ok(summary) => report.add_summary(&rel, &summary),
                Err(e) => match self.config.on_file_error {
                    FileFailurePolicy::Fail => return Err(e.into()),
                    FileFailurePolicy::Inline => {
                        warn!(error = %e, "Summary unavailable");
                        report.add_unavailable(&rel, &e.to_string());
                    }
                },
            }
        }

        ctx.unavailable = report.unavailable();
        if ctx.unavailable == total {
            return Err(PipelineError::NoSummaries(total));
        }

        Ok(report.finish())
    }

    /// Writes the terminal state, retrying transient store failures.
    fn finish(&self, id: &JobId, status: JobStatus, report: String) -> RunOutcome {
        let written = self.write_with_retry("store result", || {
            self.store
                .update_status_and_report(id, status, Some(report.clone()))
        });
        match written {
            Ok(Some(_)) => {
                info!(status = %status, "Job finished");
                match status {
                    JobStatus::Complete => RunOutcome::Complete,
                    _ => RunOutcome::Failed,
                }
            }
            Ok(None) => {
                error!("Job disappeared before its result could be stored");
                RunOutcome::Unrecorded
            }
            Err(e @ StoreError::InvalidTransition { .. }) => {
                error!(error = %e, "Job was finalized elsewhere");
                RunOutcome::Unrecorded
            }
            Err(e) => {
                error!(error = %e, "Giving up on storing result");
                RunOutcome::Unrecorded
            }
        }
    }

    /// Runs one store write up to `store_retry_attempts` times. Only
    /// database and lock failures are retried.
    fn write_with_retry<F>(&self, action: &str, mut write: F) -> Result<Option<Job>, StoreError>
    where
        F: FnMut() -> Result<Option<Job>, StoreError>,
    {
        let attempts = self.config.store_retry_attempts.max(1);
        let mut attempt = 1;

        loop {
            match write() {
                Err(e @ (StoreError::Database(_) | StoreError::LockPoisoned))
                    if attempt < attempts =>
                {
                    warn!(attempt, attempts, error = %e, "Failed to {}, retrying", action);
                    thread::sleep(self.config.store_retry_delay);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
