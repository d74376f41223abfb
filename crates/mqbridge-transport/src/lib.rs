// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # mqbridge-transport
//!
//! Thin, typed bridge over ZeroMQ messaging with two additions the raw
//! library does not provide:
//!
//! - **Poll multiplexer**: waits for readiness on many sockets at once,
//!   transparently retries after spurious interruptions while honoring the
//!   caller's original timeout, and stops early when a cancellation signal
//!   fires
//! - **Collector**: a background worker that connects to N producer addresses
//!   and accumulates a fixed number of messages for later retrieval
//!
//! Everything else is pass-through: contexts, sockets of every standard
//! pattern, bind/connect/disconnect, blocking and non-blocking send/receive,
//! multipart frames and socket options.
//!
//! ## Example: waiting on two sockets
//!
//! ```no_run
//! use mqbridge_transport::prelude::*;
//!
//! let ctx = Context::new(1)?;
//! let commands = ctx.socket(SocketPattern::Pull)?;
//! commands.bind("tcp://*:5557")?;
//! let updates = ctx.socket(SocketPattern::Sub)?;
//! updates.connect("tcp://localhost:5556")?;
//! updates.set_option(SocketOption::Subscribe, "")?;
//!
//! let items = [
//!     PollItem::new(&commands, Interest::Read.into()),
//!     PollItem::new(&updates, Interest::Read.into()),
//! ];
//! let ready = poll(&items, PollTimeout::from_millis(500)?, &NeverCancel)?;
//! if ready[0].contains(Interest::Read) {
//!     let command = commands.receive(true)?;
//!     println!("command: {:?}", command);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Example: background collection
//!
//! ```no_run
//! use mqbridge_transport::prelude::*;
//! use std::time::Duration;
//!
//! let collector = Collector::start(
//!     vec!["tcp://127.0.0.1:5560".into(), "tcp://127.0.0.1:5561".into()],
//!     10,
//!     CollectorConfig::default(),
//! )?;
//! let results = collector.get_results_timeout(Duration::from_secs(30))?;
//! println!("{:?}: {} message(s)", results.state, results.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! 1. **Common**: errors, configuration and message containers
//! 2. **ZMQ**: context, socket, pattern and option wrappers
//! 3. **Poll**: readiness multiplexing with interruption retry
//! 4. **Collector**: background multi-producer accumulation

pub mod cancel;
pub mod collector;
pub mod common;
pub mod poll;
pub mod zmq;

// Re-export commonly used types
pub use cancel::{Cancellation, CancellationToken, NeverCancel};
pub use collector::{Collector, CollectorResults, CollectorState};
pub use common::{
    CollectorConfig, ContextConfig, EndpointOperation, Message, MultipartMessage, PollConfig,
    TransportError, TransportResult, DEFAULT_CANCEL_CHECK_INTERVAL,
};
pub use poll::{poll, Interest, InterestSet, PollItem, PollResult, PollTimeout, Poller};
pub use crate::zmq::{
    version, Context, OptionKind, OptionValue, Socket, SocketOption, SocketPattern,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancel::*;
    pub use crate::collector::*;
    pub use crate::common::*;
    pub use crate::poll::*;
    pub use crate::zmq::{
        version, Context, OptionKind, OptionValue, Socket, SocketOption, SocketPattern,
    };
}
