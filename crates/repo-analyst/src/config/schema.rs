use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystConfig {
    pub version: String,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default)]
    pub database_path: Option<String>,
    /// How long a job write waits on another process holding the database.
    #[serde(default = "default_database_busy_timeout_ms")]
    pub database_busy_timeout_ms: u64,
    /// Directory under which per-job workspaces are created.
    #[serde(default)]
    pub workspace_root: Option<String>,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

fn default_database_busy_timeout_ms() -> u64 {
    5000
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            worker_count: default_worker_count(),
            database_path: None,
            database_busy_timeout_ms: default_database_busy_timeout_ms(),
            workspace_root: None,
            selection: SelectionConfig::default(),
            summarizer: SummarizerConfig::default(),
            fetch: FetchConfig::default(),
            pipeline: PipelineSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AnalystConfig {
    /// Configured database path, falling back to `~/.repo-analyst/data/jobs.db`.
    pub fn resolved_database_path(&self) -> Option<PathBuf> {
        self.database_path
            .as_deref()
            .map(|p| PathBuf::from(crate::secrets::expand_home(p)))
            .or_else(crate::db::default_database_path)
    }

    pub fn database_busy_timeout(&self) -> Duration {
        Duration::from_millis(self.database_busy_timeout_ms)
    }

    pub fn resolved_workspace_root(&self) -> PathBuf {
        self.workspace_root
            .as_deref()
            .map(|p| PathBuf::from(crate::secrets::expand_home(p)))
            .unwrap_or_else(std::env::temp_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_max_files() -> usize {
    5
}

fn default_extensions() -> Vec<String> {
    [
        ".py", ".js", ".ts", ".jsx", ".go", ".java", ".c", ".cpp", ".h", ".cs", ".rb", ".php",
        ".html", ".css", ".scss", ".sql", ".sh",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            extensions: default_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Inline API key. Prefer `api_key_file` or `api_key_env_var`.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_api_key_env_var")]
    pub api_key_env_var: String,
    /// Content longer than this many characters is truncated before sending.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
    #[serde(default = "default_summarizer_timeout")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash-001".to_string()
}

fn default_api_key_env_var() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_max_content_chars() -> usize {
    20_000
}

fn default_summarizer_timeout() -> u64 {
    60
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_api_key_env_var(),
            max_content_chars: default_max_content_chars(),
            timeout_secs: default_summarizer_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_git_binary")]
    pub git_binary: String,
    /// Clone with `--depth 1`.
    #[serde(default = "default_true")]
    pub shallow: bool,
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: Option<u64>,
}

fn default_git_binary() -> String {
    "git".to_string()
}

fn default_true() -> bool {
    true
}

fn default_fetch_timeout() -> Option<u64> {
    Some(300)
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            git_binary: default_git_binary(),
            shallow: true,
            timeout_secs: default_fetch_timeout(),
        }
    }
}

/// What a pipeline run does when one file cannot be summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFailurePolicy {
    /// Fail the whole job.
    #[default]
    Fail,
    /// Keep going and note the failure in that file's section.
    Inline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default)]
    pub on_file_error: FileFailurePolicy,
    #[serde(default = "default_store_retry_attempts")]
    pub store_retry_attempts: u32,
    #[serde(default = "default_store_retry_delay_ms")]
    pub store_retry_delay_ms: u64,
}

fn default_store_retry_attempts() -> u32 {
    3
}

fn default_store_retry_delay_ms() -> u64 {
    200
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            on_file_error: FileFailurePolicy::default(),
            store_retry_attempts: default_store_retry_attempts(),
            store_retry_delay_ms: default_store_retry_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
