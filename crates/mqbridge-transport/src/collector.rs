// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Background message collector
//!
//! A [`Collector`] owns one worker thread that connects a private PULL socket
//! to every producer address and accumulates exactly `target_count` messages
//! in arrival order. The consumer retrieves them once with
//! [`Collector::get_results`] (or [`Collector::get_results_timeout`]).
//!
//! # Design
//! - The worker creates its own context and socket; nothing transport-related
//!   is shared across threads
//! - Readiness waits go through the poll multiplexer, bounded by
//!   [`CollectorConfig::poll_interval`], so cancellation is observed promptly
//! - The buffer is handed over by value through a one-shot channel and the
//!   worker is joined afterwards
//! - Every run ends in an explicit [`CollectorState`]; connection failures are
//!   reported to the consumer, not only logged
//!
//! ## Example
//!
//! ```no_run
//! use mqbridge_transport::collector::Collector;
//! use mqbridge_transport::CollectorConfig;
//!
//! let collector = Collector::start(
//!     vec!["tcp://127.0.0.1:5558".to_string()],
//!     100,
//!     CollectorConfig::default(),
//! )?;
//!
//! // ... producers push 100 messages ...
//!
//! let results = collector.get_results()?;
//! assert!(results.is_complete());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::cancel::{Cancellation, CancellationToken};
use crate::common::{
    CollectorConfig, ContextConfig, PollConfig, TransportError, TransportResult,
};
use crate::poll::{Interest, InterestSet, PollItem, PollTimeout, Poller};
use crate::zmq::{Context, SocketOption, SocketPattern};
use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How a collector run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorState {
    /// Exactly `target_count` messages were received
    Complete,
    /// The worker stopped on a transport failure (e.g. could not connect)
    Failed { reason: String },
    /// Cancelled before `target_count` was reached
    Cancelled,
}

/// Messages gathered by a collector run, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorResults {
    pub state: CollectorState,
    pub messages: Vec<Vec<u8>>,
}

impl CollectorResults {
    pub fn is_complete(&self) -> bool {
        self.state == CollectorState::Complete
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages if the run completed, otherwise the terminal state as an error
    pub fn into_complete(self) -> TransportResult<Vec<Vec<u8>>> {
        match self.state {
            CollectorState::Complete => Ok(self.messages),
            CollectorState::Failed { reason } => Err(TransportError::ReceiveFailed(format!(
                "collector failed after {} message(s): {}",
                self.messages.len(),
                reason
            ))),
            CollectorState::Cancelled => Err(TransportError::Interrupted),
        }
    }

    pub fn into_messages(self) -> Vec<Vec<u8>> {
        self.messages
    }
}

/// Handle to a running (or finished) collector
pub struct Collector {
    addresses: Vec<String>,
    target_count: usize,
    received: Arc<AtomicUsize>,
    cancel: CancellationToken,
    results_rx: Receiver<CollectorResults>,
    handle: Option<JoinHandle<()>>,
}

impl Collector {
    /// Start collecting `target_count` messages from `addresses`
    ///
    /// The worker thread is running when this returns.
    pub fn start(
        addresses: Vec<String>,
        target_count: usize,
        config: CollectorConfig,
    ) -> TransportResult<Self> {
        if addresses.is_empty() {
            return Err(TransportError::invalid_argument(
                "collector needs at least one producer address",
            ));
        }
        config.validate().map_err(TransportError::InvalidArgument)?;

        let received = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let (results_tx, results_rx) = channel::bounded(1);

        let worker = CollectorWorker {
            addresses: addresses.clone(),
            target_count,
            received: Arc::clone(&received),
            cancel: cancel.clone(),
            config: config.clone(),
        };

        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                let results = worker.run();
                // Receiver gone means the collector was dropped mid-run
                let _ = results_tx.send(results);
            })?;

        info!(
            "[COLLECTOR] Started: {} message(s) from {} address(es)",
            target_count,
            addresses.len()
        );

        Ok(Self {
            addresses,
            target_count,
            received,
            cancel,
            results_rx,
            handle: Some(handle),
        })
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// Messages received so far
    pub fn received_count(&self) -> usize {
        self.received.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Ask the worker to stop; results will report [`CollectorState::Cancelled`]
    /// unless the run already finished
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the worker terminates, then return its messages
    pub fn get_results(mut self) -> TransportResult<CollectorResults> {
        let results = self.results_rx.recv().map_err(|_| {
            TransportError::Other("collector worker exited without reporting results".to_string())
        });
        self.join();
        results
    }

    /// Like [`get_results`](Self::get_results) but waits at most `timeout`
    ///
    /// On expiry the worker is cancelled and the partial buffer is returned
    /// with state [`CollectorState::Cancelled`].
    pub fn get_results_timeout(mut self, timeout: Duration) -> TransportResult<CollectorResults> {
        let results = match self.results_rx.recv_timeout(timeout) {
            Ok(results) => Ok(results),
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "[COLLECTOR] Deadline of {:?} expired with {}/{} message(s), cancelling",
                    timeout,
                    self.received_count(),
                    self.target_count
                );
                self.cancel.cancel();
                self.results_rx.recv().map_err(|_| {
                    TransportError::Other(
                        "collector worker exited without reporting results".to_string(),
                    )
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Other(
                "collector worker exited without reporting results".to_string(),
            )),
        };
        self.join();
        results
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.join() {
                error!("[COLLECTOR] Worker thread panicked: {:?}", e);
            }
        }
    }
}

impl Drop for Collector {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel.cancel();
            self.join();
        }
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("addresses", &self.addresses)
            .field("target_count", &self.target_count)
            .field("received", &self.received_count())
            .finish()
    }
}

/// Upper bound on the buffer reserved before any message arrives
const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// State owned by the worker thread
struct CollectorWorker {
    addresses: Vec<String>,
    target_count: usize,
    received: Arc<AtomicUsize>,
    cancel: CancellationToken,
    config: CollectorConfig,
}

impl CollectorWorker {
    fn run(self) -> CollectorResults {
        let mut messages = Vec::with_capacity(self.target_count.min(INITIAL_BUFFER_CAPACITY));
        let state = match self.receive_into(&mut messages) {
            Ok(state) => state,
            Err(e) => {
                error!(
                    "[COLLECTOR] Stopped after {}/{} message(s): {}",
                    messages.len(),
                    self.target_count,
                    e
                );
                CollectorState::Failed {
                    reason: e.to_string(),
                }
            }
        };

        match &state {
            CollectorState::Complete => {
                info!("[COLLECTOR] Collected {} message(s)", messages.len())
            }
            CollectorState::Cancelled => info!(
                "[COLLECTOR] Cancelled with {}/{} message(s)",
                messages.len(),
                self.target_count
            ),
            CollectorState::Failed { .. } => {}
        }

        CollectorResults { state, messages }
    }

    fn receive_into(&self, messages: &mut Vec<Vec<u8>>) -> TransportResult<CollectorState> {
        let context = Context::with_config(&ContextConfig::new(self.config.io_threads))?;
        let receiver = context.socket(SocketPattern::Pull)?;
        let linger = i64::try_from(self.config.linger.as_millis()).map_err(|_| {
            TransportError::invalid_argument(format!(
                "collector linger {:?} does not fit in milliseconds",
                self.config.linger
            ))
        })?;
        receiver.set_option(SocketOption::Linger, linger)?;
        if let Some(hwm) = self.config.receive_hwm {
            receiver.set_option(SocketOption::RcvHwm, hwm)?;
        }

        for address in &self.addresses {
            receiver.connect(address)?;
        }

        let poller = Poller::new(
            PollConfig::default().with_cancel_check_interval(self.config.poll_interval),
        )?;
        let items = [PollItem::new(&receiver, InterestSet::from(Interest::Read))];

        while messages.len() < self.target_count {
            if self.cancel.is_cancelled() {
                return Ok(CollectorState::Cancelled);
            }

            match poller.poll(&items, PollTimeout::Infinite, &self.cancel) {
                Ok(_) => {}
                Err(TransportError::Interrupted) => return Ok(CollectorState::Cancelled),
                Err(e) => return Err(e),
            }

            // Drain whatever is queued without blocking
            while messages.len() < self.target_count {
                match receiver.receive(true)? {
                    Some(bytes) => {
                        messages.push(bytes);
                        self.received.store(messages.len(), Ordering::Release);
                    }
                    None => break,
                }
            }

            debug!(
                "[COLLECTOR] Progress {}/{}",
                messages.len(),
                self.target_count
            );
        }

        Ok(CollectorState::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_address_list_rejected() {
        let result = Collector::start(Vec::new(), 1, CollectorConfig::default());
        assert!(matches!(result, Err(TransportError::InvalidArgument(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Collector::start(
            vec!["tcp://127.0.0.1:32990".to_string()],
            1,
            CollectorConfig::default().with_io_threads(0),
        );
        assert!(matches!(result, Err(TransportError::InvalidArgument(_))));
    }

    #[test]
    fn test_zero_target_completes_immediately() {
        let collector = Collector::start(
            vec!["tcp://127.0.0.1:32991".to_string()],
            0,
            CollectorConfig::default(),
        )
        .unwrap();

        let results = collector.get_results_timeout(Duration::from_secs(5)).unwrap();
        assert!(results.is_complete());
        assert!(results.is_empty());
    }

    #[test]
    fn test_connect_failure_is_reported() {
        let collector = Collector::start(
            vec!["nosuchproto://producer".to_string()],
            3,
            CollectorConfig::default(),
        )
        .unwrap();

        let results = collector.get_results_timeout(Duration::from_secs(5)).unwrap();
        match &results.state {
            CollectorState::Failed { reason } => assert!(reason.contains("nosuchproto://producer")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(results.is_empty());
        assert!(results.into_complete().is_err());
    }

    #[test]
    fn test_cancel_stops_waiting_worker() {
        let collector = Collector::start(
            vec!["tcp://127.0.0.1:32992".to_string()],
            5,
            CollectorConfig::default().with_poll_interval(Duration::from_millis(20)),
        )
        .unwrap();

        assert!(!collector.is_finished());
        collector.cancel();

        let results = collector.get_results().unwrap();
        assert_eq!(results.state, CollectorState::Cancelled);
        assert!(matches!(
            results.into_complete(),
            Err(TransportError::Interrupted)
        ));
    }

    #[test]
    fn test_huge_target_does_not_reserve_up_front() {
        for target in [1usize << 42, usize::MAX] {
            let collector = Collector::start(
                vec!["tcp://127.0.0.1:32994".to_string()],
                target,
                CollectorConfig::default().with_poll_interval(Duration::from_millis(20)),
            )
            .unwrap();

            let results = collector
                .get_results_timeout(Duration::from_millis(200))
                .unwrap();
            assert_eq!(results.state, CollectorState::Cancelled);
            assert!(results.is_empty());
        }
    }

    #[test]
    fn test_oversized_linger_fails_worker() {
        let worker = CollectorWorker {
            addresses: vec!["tcp://127.0.0.1:32995".to_string()],
            target_count: 1,
            received: Arc::new(AtomicUsize::new(0)),
            cancel: CancellationToken::new(),
            config: CollectorConfig::default().with_linger(Duration::MAX),
        };

        match worker.run().state {
            CollectorState::Failed { reason } => assert!(reason.contains("linger")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_drop_joins_worker() {
        let collector = Collector::start(
            vec!["tcp://127.0.0.1:32993".to_string()],
            5,
            CollectorConfig::default().with_poll_interval(Duration::from_millis(20)),
        )
        .unwrap();
        drop(collector);
    }
}
