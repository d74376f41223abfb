//! Runtime configuration types for contexts, polling and collectors

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default upper bound on a single blocking wait slice
pub const DEFAULT_CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Context (I/O engine) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Number of transport I/O threads
    pub io_threads: i32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { io_threads: 1 }
    }
}

impl ContextConfig {
    pub fn new(io_threads: i32) -> Self {
        Self { io_threads }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.io_threads < 1 {
            return Err(format!(
                "I/O thread count must be positive, got {}",
                self.io_threads
            ));
        }
        Ok(())
    }
}

/// Poll multiplexer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Longest single wait before cancellation is re-checked
    pub cancel_check_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            cancel_check_interval: DEFAULT_CANCEL_CHECK_INTERVAL,
        }
    }
}

impl PollConfig {
    /// Set the cancellation check interval
    pub fn with_cancel_check_interval(mut self, interval: Duration) -> Self {
        self.cancel_check_interval = interval;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.cancel_check_interval.is_zero() {
            return Err("Cancellation check interval must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Background collector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// I/O threads of the worker's private context
    pub io_threads: i32,

    /// Longest wait for a message before cancellation is re-checked
    pub poll_interval: Duration,

    /// Receive high water mark of the PULL socket (None = transport default)
    pub receive_hwm: Option<i32>,

    /// Linger time of the PULL socket on close
    pub linger: Duration,

    /// Name given to the worker thread
    pub thread_name: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            io_threads: 1,
            poll_interval: DEFAULT_CANCEL_CHECK_INTERVAL,
            receive_hwm: None,
            linger: Duration::ZERO,
            thread_name: "mqbridge-collector".to_string(),
        }
    }
}

impl CollectorConfig {
    /// Set worker context I/O threads
    pub fn with_io_threads(mut self, io_threads: i32) -> Self {
        self.io_threads = io_threads;
        self
    }

    /// Set readiness wait interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set receive high water mark
    pub fn with_receive_hwm(mut self, hwm: i32) -> Self {
        self.receive_hwm = Some(hwm);
        self
    }

    /// Set linger time
    pub fn with_linger(mut self, linger: Duration) -> Self {
        self.linger = linger;
        self
    }

    /// Set worker thread name
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.io_threads < 1 {
            return Err(format!(
                "Collector I/O thread count must be positive, got {}",
                self.io_threads
            ));
        }
        if self.poll_interval.is_zero() {
            return Err("Collector poll interval must be greater than 0".to_string());
        }
        if let Some(hwm) = self.receive_hwm {
            if hwm < 0 {
                return Err(format!("Receive high water mark cannot be negative: {}", hwm));
            }
        }
        if i32::try_from(self.linger.as_millis()).is_err() {
            return Err("Collector linger does not fit in milliseconds".to_string());
        }
        Ok(())
    }
}
