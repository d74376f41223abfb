// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Transport context
//!
//! A [`Context`] is a cheap, clonable handle to one set of transport I/O
//! resources. Every [`Socket`] created from it keeps those resources alive, so
//! the context always outlives its sockets. Closing the context invalidates
//! the handle: no new sockets can be created and every operation on existing
//! sockets reports [`TransportError::HandleInvalid`].

use super::pattern::SocketPattern;
use super::socket::Socket;
use crate::common::{ContextConfig, TransportError, TransportResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) struct ContextInner {
    id: u64,
    io_threads: i32,
    /// `None` once the context was closed
    raw: Mutex<Option<zmq::Context>>,
}

impl ContextInner {
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.raw.lock().is_none()
    }

    pub(crate) fn ensure_open(&self) -> TransportResult<()> {
        if self.is_closed() {
            return Err(TransportError::HandleInvalid(format!(
                "context #{} was closed",
                self.id
            )));
        }
        Ok(())
    }
}

/// Handle to a transport context
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Context {
    /// Create a context with `io_threads` transport I/O threads
    pub fn new(io_threads: i32) -> TransportResult<Self> {
        Self::with_config(&ContextConfig::new(io_threads))
    }

    /// Create a context from configuration
    pub fn with_config(config: &ContextConfig) -> TransportResult<Self> {
        config.validate().map_err(TransportError::InvalidArgument)?;

        let raw = zmq::Context::new();
        raw.set_io_threads(config.io_threads)?;

        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        debug!(
            "[CONTEXT] Created context #{} with {} I/O thread(s)",
            id, config.io_threads
        );

        Ok(Self {
            inner: Arc::new(ContextInner {
                id,
                io_threads: config.io_threads,
                raw: Mutex::new(Some(raw)),
            }),
        })
    }

    /// Process-unique identifier of this context
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn io_threads(&self) -> i32 {
        self.inner.io_threads
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Create a socket of the given pattern
    pub fn socket(&self, pattern: SocketPattern) -> TransportResult<Socket> {
        let raw = {
            let guard = self.inner.raw.lock();
            let ctx = guard.as_ref().ok_or_else(|| {
                TransportError::HandleInvalid(format!(
                    "cannot create {} socket: context #{} was closed",
                    pattern, self.inner.id
                ))
            })?;
            ctx.socket(pattern.socket_type())?
        };

        Ok(Socket::new(raw, pattern, Arc::clone(&self.inner)))
    }

    /// Create a socket from a pattern name such as `"ZMQ_PUB"` or `"pub"`
    pub fn socket_by_name(&self, pattern: &str) -> TransportResult<Socket> {
        self.socket(pattern.parse()?)
    }

    /// Close the context
    ///
    /// Idempotent. Underlying resources are released once the last socket
    /// created from this context is dropped.
    pub fn close(&self) {
        if self.inner.raw.lock().take().is_some() {
            info!("[CONTEXT] Closed context #{}", self.inner.id);
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.inner.id)
            .field("io_threads", &self.inner.io_threads)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Version of the linked transport library, e.g. `"4.3.5"`
pub fn version() -> String {
    let (major, minor, patch) = zmq::version();
    format!("{}.{}.{}", major, minor, patch)
}
