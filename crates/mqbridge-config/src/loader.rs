// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones winning:
//! 1. TOML file (base values, missing keys fall back to defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, BridgeConfig, ConfigError, ConfigResult};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File name searched for when no path is given
pub const CONFIG_FILE_NAME: &str = "mqbridge.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `MQBRIDGE_CONFIG_PATH` environment variable
/// 2. Current working directory: `./mqbridge.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("MQBRIDGE_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by MQBRIDGE_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        for ancestor in cwd.ancestors().skip(1).take(5) {
            search_paths.push(ancestor.join(CONFIG_FILE_NAME));
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet MQBRIDGE_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file
///
/// * `config_path` - Path to the file. If `None`, [`find_config_file`] is used.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is not found, contains invalid TOML, or fails
/// validation after overrides were applied
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<BridgeConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: BridgeConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    validate_config(&config)?;
    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `MQBRIDGE_IO_THREADS` -> `context.io_threads`
/// - `MQBRIDGE_POLL_CANCEL_CHECK_MS` -> `poll.cancel_check_interval_ms`
/// - `MQBRIDGE_COLLECTOR_POLL_INTERVAL_MS` -> `collector.poll_interval_ms`
/// - `MQBRIDGE_COLLECTOR_RCVHWM` -> `collector.receive_hwm`
/// - `MQBRIDGE_LOG_LEVEL` -> `logging.level`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut BridgeConfig) {
    let lookup = |key: &str| env::var(key).ok();
    apply_overrides(config, |field| {
        lookup(match field {
            Field::IoThreads => "MQBRIDGE_IO_THREADS",
            Field::CancelCheckMs => "MQBRIDGE_POLL_CANCEL_CHECK_MS",
            Field::CollectorPollMs => "MQBRIDGE_COLLECTOR_POLL_INTERVAL_MS",
            Field::CollectorRcvHwm => "MQBRIDGE_COLLECTOR_RCVHWM",
            Field::LogLevel => "MQBRIDGE_LOG_LEVEL",
        })
    });
}

/// Apply CLI argument overrides to configuration
///
/// `cli_args` maps keys to raw values, e.g.
/// `{"io_threads": "4", "log_level": "debug"}`. Recognized keys:
/// `io_threads`, `cancel_check_ms`, `collector_poll_ms`, `collector_rcvhwm`,
/// `log_level`.
pub fn apply_cli_overrides(config: &mut BridgeConfig, cli_args: &HashMap<String, String>) {
    apply_overrides(config, |field| {
        cli_args
            .get(match field {
                Field::IoThreads => "io_threads",
                Field::CancelCheckMs => "cancel_check_ms",
                Field::CollectorPollMs => "collector_poll_ms",
                Field::CollectorRcvHwm => "collector_rcvhwm",
                Field::LogLevel => "log_level",
            })
            .cloned()
    });
}

/// Overridable fields
#[derive(Clone, Copy)]
enum Field {
    IoThreads,
    CancelCheckMs,
    CollectorPollMs,
    CollectorRcvHwm,
    LogLevel,
}

fn apply_overrides<F>(config: &mut BridgeConfig, mut value_of: F)
where
    F: FnMut(Field) -> Option<String>,
{
    if let Some(threads) = value_of(Field::IoThreads).and_then(|v| v.trim().parse::<i32>().ok()) {
        config.context.io_threads = threads;
    }
    if let Some(ms) = value_of(Field::CancelCheckMs).and_then(|v| v.trim().parse::<u64>().ok()) {
        config.poll.cancel_check_interval_ms = ms;
    }
    if let Some(ms) = value_of(Field::CollectorPollMs).and_then(|v| v.trim().parse::<u64>().ok())
    {
        config.collector.poll_interval_ms = ms;
    }
    if let Some(hwm) = value_of(Field::CollectorRcvHwm).and_then(|v| v.trim().parse::<i32>().ok())
    {
        config.collector.receive_hwm = Some(hwm);
    }
    if let Some(level) = value_of(Field::LogLevel) {
        config.logging.level = level.trim().to_lowercase();
    }
}
