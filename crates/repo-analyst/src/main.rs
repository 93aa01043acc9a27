use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use repo_analyst::db::Database;
use repo_analyst::worker::JobQueue;
use repo_analyst::{
    init_logging, load_config, AnalysisPipeline, AnalystConfig, Dispatcher, JobId, JobStatus,
    JobStore, SqliteJobStore, SubmitRequest, WorkerError, WorkerPool,
};

const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(
    name = "repo-analyst",
    version,
    about = "Summarize the largest source files of a git repository with an LLM"
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a repository and wait for its report
    Analyze {
        /// Repository URL or local path understood by `git clone`
        locator: String,
        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 500)]
        poll_interval_ms: u64,
    },
    /// Print a job record as JSON
    Status { job_id: String },
    /// Fail jobs left running by a dead process
    Recover,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AnalystConfig::default(),
    };
    init_logging(&config.logging);

    match cli.command {
        Commands::Analyze {
            locator,
            output,
            poll_interval_ms,
        } => analyze(
            &config,
            &locator,
            output.as_deref(),
            Duration::from_millis(poll_interval_ms.max(10)),
        ),
        Commands::Status { job_id } => status(&config, &job_id),
        Commands::Recover => recover(&config),
    }
}

fn open_store(config: &AnalystConfig) -> Result<Arc<SqliteJobStore>> {
    let path = config
        .resolved_database_path()
        .context("Could not determine a database location; set database_path")?;
    let db = Database::open(&path, config.database_busy_timeout())
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    Ok(Arc::new(SqliteJobStore::new(db)))
}

fn analyze(
    config: &AnalystConfig,
    locator: &str,
    output: Option<&Path>,
    poll_interval: Duration,
) -> Result<ExitCode> {
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&interrupted);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .context("Failed to install Ctrl-C handler")?;
    }

    let store = open_store(config)?;
    let pipeline = AnalysisPipeline::from_config(config, store.clone())?;
    let pool = WorkerPool::new(Arc::new(pipeline), config.worker_count)?;
    let dispatcher = Dispatcher::new(store, Arc::new(pool.queue()));

    let recovered = dispatcher.recover()?;
    if !recovered.failed.is_empty() || !recovered.requeued.is_empty() {
        eprintln!(
            "Recovered {} interrupted and {} pending job(s) from a previous run",
            recovered.failed.len(),
            recovered.requeued.len()
        );
    }

    let job = dispatcher.submit(SubmitRequest::new(locator))?;
    eprintln!("Submitted job {}", job.id);

    let finished = loop {
        if interrupted.load(Ordering::SeqCst) {
            eprintln!("Interrupted, waiting for running jobs to stop...");
            pool.shutdown();
            pool.wait();
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }

        let current = dispatcher.get_job(&job.id)?;
        if current.is_finished() {
            break current;
        }
        std::thread::sleep(poll_interval);
    };

    pool.shutdown();
    pool.wait();

    let report = finished.report_content.unwrap_or_default();
    match finished.status {
        JobStatus::Complete => {
            match output {
                Some(path) => {
                    std::fs::write(path, &report)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), "Report written");
                }
                None => print!("{}", report),
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            eprintln!("{}", report);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn status(config: &AnalystConfig, job_id: &str) -> Result<ExitCode> {
    let store = open_store(config)?;
    match store.get(&JobId::from(job_id))? {
        Some(job) => {
            println!("{}", serde_json::to_string_pretty(&job)?);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("Job not found: {}", job_id);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Leaves PENDING jobs in place for the next `analyze`, which runs them.
struct DeferredQueue;

impl JobQueue for DeferredQueue {
    fn enqueue(&self, _id: JobId) -> Result<(), WorkerError> {
        Ok(())
    }
}

fn recover(config: &AnalystConfig) -> Result<ExitCode> {
    let store = open_store(config)?;
    let dispatcher = Dispatcher::new(store, Arc::new(DeferredQueue));
    let report = dispatcher.recover()?;

    println!(
        "{} interrupted job(s) marked FAILED, {} pending job(s) left for the next run",
        report.failed.len(),
        report.requeued.len()
    );
    Ok(ExitCode::SUCCESS)
}
