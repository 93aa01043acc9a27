use std::path::PathBuf;
use std::time::Duration;

use crate::config::{AnalystConfig, FileFailurePolicy};

/// Settings the pipeline reads on every run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub workspace_root: PathBuf,
    pub on_file_error: FileFailurePolicy,
    pub store_retry_attempts: u32,
    pub store_retry_delay: Duration,
}

impl PipelineConfig {
    pub fn from_config(config: &AnalystConfig) -> Self {
        Self {
            workspace_root: config.resolved_workspace_root(),
            on_file_error: config.pipeline.on_file_error,
            store_retry_attempts: config.pipeline.store_retry_attempts.max(1),
            store_retry_delay: Duration::from_millis(config.pipeline.store_retry_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut config = AnalystConfig::default();
        config.workspace_root = Some("/srv/analyst/work".to_string());
        config.pipeline.on_file_error = FileFailurePolicy::Inline;
        config.pipeline.store_retry_attempts = 0;
        config.pipeline.store_retry_delay_ms = 15;

        let pipeline = PipelineConfig::from_config(&config);
        assert_eq!(pipeline.workspace_root, PathBuf::from("/srv/analyst/work"));
        assert_eq!(pipeline.on_file_error, FileFailurePolicy::Inline);
        assert_eq!(pipeline.store_retry_attempts, 1);
        assert_eq!(pipeline.store_retry_delay, Duration::from_millis(15));
    }
}
