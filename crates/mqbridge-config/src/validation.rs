// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every problem is collected so a single error reports all of them.

use crate::{BridgeConfig, ConfigError, ConfigResult};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["text", "json"];
const MAX_RETENTION_DAYS: u64 = 36_500;
const MAX_RETENTION_RUNS: usize = 10_000;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &BridgeConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_required_fields(config, &mut errors);
    validate_value_ranges(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_required_fields(config: &BridgeConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.collector.thread_name.trim().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "collector.thread_name".to_string(),
        });
    }
    if config.logging.file_logging && config.logging.log_dir.as_os_str().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "logging.log_dir".to_string(),
        });
    }
}

fn validate_value_ranges(config: &BridgeConfig, errors: &mut Vec<ConfigValidationError>) {
    let positive = |field: &str| ConfigValidationError::InvalidValue {
        field: field.to_string(),
        reason: "must be positive".to_string(),
    };

    if config.context.io_threads < 1 {
        errors.push(positive("context.io_threads"));
    }
    if config.poll.cancel_check_interval_ms == 0 {
        errors.push(positive("poll.cancel_check_interval_ms"));
    }
    if config.collector.io_threads < 1 {
        errors.push(positive("collector.io_threads"));
    }
    if config.collector.poll_interval_ms == 0 {
        errors.push(positive("collector.poll_interval_ms"));
    }
    if let Some(hwm) = config.collector.receive_hwm {
        if hwm < 0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: "collector.receive_hwm".to_string(),
                reason: "cannot be negative".to_string(),
            });
        }
    }
    if i32::try_from(config.collector.linger_ms).is_err() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "collector.linger_ms".to_string(),
            reason: "does not fit in a 32-bit integer".to_string(),
        });
    }
}

fn validate_logging(config: &BridgeConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }

    let format = config.logging.format.to_lowercase();
    if !LOG_FORMATS.contains(&format.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.format".to_string(),
            reason: "must be 'text' or 'json'".to_string(),
        });
    }

    if config.logging.retention_days > MAX_RETENTION_DAYS {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.retention_days".to_string(),
            reason: format!("must be at most {}", MAX_RETENTION_DAYS),
        });
    }
    if config.logging.retention_runs > MAX_RETENTION_RUNS {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.retention_runs".to_string(),
            reason: format!("must be at most {}", MAX_RETENTION_RUNS),
        });
    }
}
