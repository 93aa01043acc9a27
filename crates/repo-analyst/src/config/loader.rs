use std::path::Path;

use crate::config::schema::{AnalystConfig, CONFIG_VERSION};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AnalystConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<AnalystConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: AnalystConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();

    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

/// Semantic checks; also guards configs built in code rather than parsed.
pub fn validate_config(config: &AnalystConfig) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(invalid(format!(
            "Unsupported config version: {}",
            config.version
        )));
    }

    if config.worker_count == 0 {
        return Err(invalid("worker_count must be at least 1"));
    }

    if config.selection.max_files == 0 {
        return Err(invalid("selection.max_files must be at least 1"));
    }

    if config.selection.extensions.is_empty() {
        return Err(invalid("selection.extensions must not be empty"));
    }

    for ext in &config.selection.extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(invalid(format!(
                "Extension '{}' must start with '.' followed by a suffix",
                ext
            )));
        }
    }

    if config.summarizer.max_content_chars == 0 {
        return Err(invalid("summarizer.max_content_chars must be at least 1"));
    }

    if config.summarizer.timeout_secs == 0 {
        return Err(invalid("summarizer.timeout_secs must be at least 1"));
    }

    if config.fetch.timeout_secs == Some(0) {
        return Err(invalid("fetch.timeout_secs must be at least 1 when set"));
    }

    if config.pipeline.store_retry_attempts == 0 {
        return Err(invalid("pipeline.store_retry_attempts must be at least 1"));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}
