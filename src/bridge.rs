// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Config-driven entry point
//!
//! [`Bridge`] owns one transport context and applies a loaded
//! [`BridgeConfig`] to everything created through it: poll slicing, collector
//! workers, and logging.

use mqbridge_config::{validate_config, BridgeConfig, ConfigError};
use mqbridge_observability::{LogFormat, LoggingConfig, LoggingGuard};
use mqbridge_transport::{
    Cancellation, Collector, CollectorConfig, Context, ContextConfig, PollConfig, PollItem,
    PollResult, PollTimeout, Poller, Socket, SocketPattern, TransportError, TransportResult,
};
use tracing::info;

/// Errors raised while building a [`Bridge`]
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Transport context plus the configuration applied to it
#[derive(Debug)]
pub struct Bridge {
    context: Context,
    poller: Poller,
    collector_config: CollectorConfig,
}

impl Bridge {
    /// Bridge with default settings
    pub fn new() -> BridgeResult<Self> {
        Self::from_config(&BridgeConfig::default())
    }

    /// Validate `config` and create the context it describes
    pub fn from_config(config: &BridgeConfig) -> BridgeResult<Self> {
        validate_config(config)?;

        let context = Context::with_config(&context_config(config))?;
        let poller = Poller::new(poll_config(config))?;

        info!(
            "[BRIDGE] Ready: {} I/O thread(s), cancel check every {:?}",
            context.io_threads(),
            poller.config().cancel_check_interval
        );

        Ok(Self {
            context,
            poller,
            collector_config: collector_config(config),
        })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn collector_config(&self) -> &CollectorConfig {
        &self.collector_config
    }

    pub fn socket(&self, pattern: SocketPattern) -> TransportResult<Socket> {
        self.context.socket(pattern)
    }

    pub fn socket_by_name(&self, pattern: &str) -> TransportResult<Socket> {
        self.context.socket_by_name(pattern)
    }

    /// Poll with the configured cancellation check interval
    pub fn poll(
        &self,
        items: &[PollItem<'_>],
        timeout: PollTimeout,
        cancel: &dyn Cancellation,
    ) -> TransportResult<PollResult> {
        self.poller.poll(items, timeout, cancel)
    }

    /// Token-based poll, see [`Poller::poll_sockets`]
    pub fn poll_sockets<S: AsRef<str>>(
        &self,
        sockets: &[&Socket],
        interests: &[Vec<S>],
        timeout_ms: i64,
        cancel: &dyn Cancellation,
    ) -> TransportResult<PollResult> {
        self.poller
            .poll_sockets(sockets, interests, timeout_ms, cancel)
    }

    /// Start a collector with the configured worker settings
    pub fn start_collector(
        &self,
        addresses: Vec<String>,
        target_count: usize,
    ) -> TransportResult<Collector> {
        Collector::start(addresses, target_count, self.collector_config.clone())
    }

    /// Close the context; sockets created from it become invalid
    pub fn close(&self) {
        self.context.close();
    }
}

pub fn context_config(config: &BridgeConfig) -> ContextConfig {
    ContextConfig::new(config.context.io_threads)
}

pub fn poll_config(config: &BridgeConfig) -> PollConfig {
    PollConfig::default().with_cancel_check_interval(config.poll.cancel_check_interval())
}

pub fn collector_config(config: &BridgeConfig) -> CollectorConfig {
    let section = &config.collector;
    let mut collector = CollectorConfig::default()
        .with_io_threads(section.io_threads)
        .with_poll_interval(section.poll_interval())
        .with_linger(section.linger())
        .with_thread_name(section.thread_name.clone());
    if let Some(hwm) = section.receive_hwm {
        collector = collector.with_receive_hwm(hwm);
    }
    collector
}

/// Logging settings for the observability crate
pub fn logging_config(config: &BridgeConfig) -> BridgeResult<LoggingConfig> {
    let section = &config.logging;
    let format: LogFormat = section
        .format
        .parse()
        .map_err(ConfigError::InvalidValue)?;

    Ok(LoggingConfig {
        level: section.level.clone(),
        format,
        debug_crates: section.debug_crates.clone(),
        file_logging: section.file_logging,
        log_dir: section.log_dir.clone(),
        retention_days: section.retention_days,
        retention_runs: section.retention_runs,
    })
}

/// Install logging from `config` plus `--debug-*` arguments and `MQBRIDGE_DEBUG`
pub fn init_logging(config: &BridgeConfig) -> anyhow::Result<LoggingGuard> {
    let logging = logging_config(config)?;
    mqbridge_observability::init_logging(&logging, &mqbridge_observability::parse_debug_flags())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_collector_config_from_sections() {
        let mut config = BridgeConfig::default();
        config.collector.receive_hwm = Some(64);
        config.collector.linger_ms = 20;
        config.collector.thread_name = "edge-collector".to_string();

        let collector = collector_config(&config);
        assert_eq!(collector.receive_hwm, Some(64));
        assert_eq!(collector.linger, Duration::from_millis(20));
        assert_eq!(collector.thread_name, "edge-collector");
        assert_eq!(collector.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_logging_config_rejects_unknown_format() {
        let mut config = BridgeConfig::default();
        config.logging.format = "yaml".to_string();
        assert!(matches!(
            logging_config(&config),
            Err(BridgeError::Config(ConfigError::InvalidValue(_)))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = BridgeConfig::default();
        config.context.io_threads = 0;
        assert!(matches!(
            Bridge::from_config(&config),
            Err(BridgeError::Config(ConfigError::ValidationError(_)))
        ));
    }
}
