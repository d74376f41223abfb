// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `mqbridge.toml`. Durations are stored as
//! plain millisecond counts so the file stays readable; accessors convert
//! them to [`Duration`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub context: ContextSection,
    pub poll: PollSection,
    pub collector: CollectorSection,
    pub logging: LoggingSection,
}

/// Transport context settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContextSection {
    pub io_threads: i32,
}

impl Default for ContextSection {
    fn default() -> Self {
        Self { io_threads: 1 }
    }
}

/// Poll multiplexer settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollSection {
    /// Longest single wait before cancellation is re-checked
    pub cancel_check_interval_ms: u64,
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            cancel_check_interval_ms: 100,
        }
    }
}

impl PollSection {
    pub fn cancel_check_interval(&self) -> Duration {
        Duration::from_millis(self.cancel_check_interval_ms)
    }
}

/// Background collector settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectorSection {
    pub io_threads: i32,
    pub poll_interval_ms: u64,
    /// Receive high water mark; unset keeps the transport default
    pub receive_hwm: Option<i32>,
    pub linger_ms: u64,
    pub thread_name: String,
}

impl Default for CollectorSection {
    fn default() -> Self {
        Self {
            io_threads: 1,
            poll_interval_ms: 100,
            receive_hwm: None,
            linger_ms: 0,
            thread_name: "mqbridge-collector".to_string(),
        }
    }
}

impl CollectorSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn linger(&self) -> Duration {
        Duration::from_millis(self.linger_ms)
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSection {
    /// trace, debug, info, warn or error
    pub level: String,
    /// text or json
    pub format: String,
    /// Crates to log at debug level regardless of `level`
    pub debug_crates: Vec<String>,
    /// Write JSON log files (requires the `file-logging` feature)
    pub file_logging: bool,
    pub log_dir: PathBuf,
    pub retention_days: u64,
    pub retention_runs: usize,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            debug_crates: Vec::new(),
            file_logging: false,
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_sections_use_defaults() {
        let config: BridgeConfig = toml::from_str(
            r#"
            [collector]
            receive_hwm = 1000

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.context, ContextSection::default());
        assert_eq!(config.collector.receive_hwm, Some(1000));
        assert_eq!(config.collector.thread_name, "mqbridge-collector");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_duration_accessors() {
        let poll = PollSection {
            cancel_check_interval_ms: 250,
        };
        assert_eq!(poll.cancel_check_interval(), Duration::from_millis(250));

        let collector = CollectorSection {
            linger_ms: 1500,
            ..Default::default()
        };
        assert_eq!(collector.linger(), Duration::from_millis(1500));
        assert_eq!(collector.poll_interval(), Duration::from_millis(100));
    }
}
