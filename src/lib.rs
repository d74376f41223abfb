// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # mqbridge
//!
//! Typed bridge over ZeroMQ messaging for hosts that need more than raw
//! sockets:
//!
//! - A **poll multiplexer** that waits on many sockets, survives spurious
//!   interruptions without losing its original deadline, and can be
//!   cancelled from another thread
//! - A **background collector** that gathers a fixed number of messages from
//!   several producers while the caller does other work
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! mqbridge = "0.1"
//! ```
//!
//! ```rust,no_run
//! use mqbridge::prelude::*;
//!
//! let config = mqbridge::config::load_config(None, None)?;
//! let _logging = mqbridge::init_logging(&config)?;
//! let bridge = Bridge::from_config(&config)?;
//!
//! let pull = bridge.socket(SocketPattern::Pull)?;
//! pull.bind("tcp://*:5557")?;
//!
//! let token = CancellationToken::new();
//! let items = [PollItem::new(&pull, Interest::Read.into())];
//! let ready = bridge.poll(&items, PollTimeout::Infinite, &token)?;
//! if ready[0].contains(Interest::Read) {
//!     let frame = pull.receive(true)?;
//!     println!("{:?}", frame);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`file-logging`**: JSON log files in timestamped run folders
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: mqbridge-config, mqbridge-observability    │
//! │  (TOML + overrides, tracing setup)                      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  I/O: mqbridge-transport                                │
//! │  (context, sockets, poll multiplexer, collector)        │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Facade: mqbridge::Bridge                               │
//! │  (config-driven context, poller and collectors)         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub mod bridge;

// Re-export members
pub use mqbridge_config as config;
pub use mqbridge_observability as observability;
pub use mqbridge_transport as transport;

pub use bridge::{
    collector_config, context_config, init_logging, logging_config, poll_config, Bridge,
    BridgeError, BridgeResult,
};

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::bridge::{Bridge, BridgeError, BridgeResult};
    pub use mqbridge_config::BridgeConfig;
    pub use mqbridge_transport::prelude::*;
}
