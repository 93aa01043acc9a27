pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod job;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod sanitize;
pub mod secrets;
pub mod selector;
pub mod store;
pub mod summarize;
pub mod worker;

pub use config::{load_config, AnalystConfig, FileFailurePolicy};
pub use dispatch::{Dispatcher, RecoveryReport, SubmitRequest};
pub use error::{
    AnalystError, ConfigError, DatabaseError, DispatchError, FetchError, Result, SelectionError,
    StoreError, SummarizationError, WorkerError,
};
pub use fetch::{GitFetcher, RepositoryFetcher, Workspace};
pub use job::{Job, JobId, JobStatus};
pub use logging::init_logging;
pub use pipeline::{AnalysisPipeline, PipelineConfig, PipelineError, RunOutcome};
pub use report::ReportBuilder;
pub use secrets::{resolve_secret, SecretError};
pub use selector::FileSelector;
pub use store::{JobStore, MemoryJobStore, SqliteJobStore};
pub use summarize::{
    strip_code_fence, BackendError, GeminiBackend, SummarizationBackend, SummarizationClient,
};
pub use worker::{JobQueue, QueueHandle, WorkerPool};
