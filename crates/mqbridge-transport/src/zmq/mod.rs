// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! ZMQ pass-through layer
//!
//! Contexts, sockets of every supported pattern, and socket options as
//! closed enumerations:
//! - **Pair**: PAIR
//! - **Publish-Subscribe**: PUB, SUB, XPUB, XSUB
//! - **Request-Reply**: REQ, REP, DEALER (XREQ), ROUTER (XREP)
//! - **Push-Pull**: PUSH, PULL
//!
//! ## Example
//!
//! ```no_run
//! use mqbridge_transport::zmq::{Context, SocketPattern};
//!
//! let ctx = Context::new(1)?;
//! let server = ctx.socket(SocketPattern::Rep)?;
//! server.bind("tcp://*:5555")?;
//!
//! loop {
//!     if let Some(request) = server.receive(false)? {
//!         println!("Received: {:?}", request);
//!         server.send(b"OK", false)?;
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod context;
pub mod option;
pub mod pattern;
pub mod socket;

pub use context::{version, Context};
pub use option::{OptionKind, OptionValue, SocketOption};
pub use pattern::SocketPattern;
pub use socket::Socket;
