// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Multiplexed, interruptible poll across sockets
//!
//! [`Poller::poll`] waits until at least one requested interest is ready on
//! any of the given sockets, the timeout expires, or the caller's
//! [`Cancellation`] fires. The blocking wait is split into slices no longer
//! than [`PollConfig::cancel_check_interval`]; between slices (and after a
//! signal interrupts a slice) the cancellation source is consulted and the
//! remaining time is recomputed against a monotonic deadline.
//!
//! ## Example
//!
//! ```no_run
//! use mqbridge_transport::poll::{poll, Interest, InterestSet, PollItem, PollTimeout};
//! use mqbridge_transport::zmq::{Context, SocketPattern};
//! use mqbridge_transport::CancellationToken;
//!
//! let ctx = Context::new(1)?;
//! let pull = ctx.socket(SocketPattern::Pull)?;
//! pull.bind("tcp://*:5557")?;
//!
//! let token = CancellationToken::new();
//! let items = [PollItem::new(&pull, InterestSet::from(Interest::Read))];
//! let ready = poll(&items, PollTimeout::from_millis(500)?, &token)?;
//! if ready[0].contains(Interest::Read) {
//!     let _frame = pull.receive(true)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::cancel::Cancellation;
use crate::common::{PollConfig, TransportError, TransportResult};
use crate::zmq::Socket;
use std::fmt;
use std::ops::{BitOr, Index};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// A readiness condition a caller can wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interest {
    Read,
    Write,
    Error,
}

impl Interest {
    pub const ALL: [Interest; 3] = [Interest::Read, Interest::Write, Interest::Error];

    /// Token accepted by [`FromStr`]
    pub fn token(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Error => "error",
        }
    }

    fn bit(&self) -> u8 {
        match self {
            Self::Read => 0b001,
            Self::Write => 0b010,
            Self::Error => 0b100,
        }
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Interest {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "error" => Ok(Self::Error),
            other => Err(TransportError::invalid_argument(format!(
                "unrecognized poll event: {}",
                other
            ))),
        }
    }
}

/// Set of [`Interest`]s
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InterestSet(u8);

impl InterestSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Interest::ALL.into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, interest: Interest) -> bool {
        self.0 & interest.bit() != 0
    }

    pub fn insert(&mut self, interest: Interest) {
        self.0 |= interest.bit();
    }

    pub fn with(mut self, interest: Interest) -> Self {
        self.insert(interest);
        self
    }

    /// Interests present in both sets
    pub fn intersection(&self, other: InterestSet) -> InterestSet {
        Self(self.0 & other.0)
    }

    pub fn is_subset(&self, other: InterestSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Interest> + '_ {
        Interest::ALL.into_iter().filter(move |i| self.contains(*i))
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Parse a list of tokens such as `["read", "error"]`
    pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> TransportResult<Self> {
        tokens
            .iter()
            .map(|t| t.as_ref().parse::<Interest>())
            .collect()
    }

    fn to_poll_events(self) -> zmq::PollEvents {
        let mut events = zmq::PollEvents::empty();
        if self.contains(Interest::Read) {
            events |= zmq::POLLIN;
        }
        if self.contains(Interest::Write) {
            events |= zmq::POLLOUT;
        }
        if self.contains(Interest::Error) {
            events |= zmq::POLLERR;
        }
        events
    }

    fn from_poll_item(item: &zmq::PollItem<'_>) -> Self {
        let mut set = Self::empty();
        if item.is_readable() {
            set.insert(Interest::Read);
        }
        if item.is_writable() {
            set.insert(Interest::Write);
        }
        if item.is_error() {
            set.insert(Interest::Error);
        }
        set
    }
}

impl From<Interest> for InterestSet {
    fn from(interest: Interest) -> Self {
        Self(interest.bit())
    }
}

impl BitOr for InterestSet {
    type Output = InterestSet;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<Interest> for InterestSet {
    type Output = InterestSet;

    fn bitor(self, rhs: Interest) -> Self::Output {
        self.with(rhs)
    }
}

impl BitOr for Interest {
    type Output = InterestSet;

    fn bitor(self, rhs: Self) -> Self::Output {
        InterestSet::from(self).with(rhs)
    }
}

impl FromIterator<Interest> for InterestSet {
    fn from_iter<I: IntoIterator<Item = Interest>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, i| set.with(i))
    }
}

impl fmt::Debug for InterestSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// How long a poll may block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTimeout {
    /// Block until something is ready (`-1`)
    Infinite,
    /// Single non-blocking check (`0`)
    Immediate,
    /// Upper bound on total wall-clock wait
    Bounded(Duration),
}

impl PollTimeout {
    /// Convert the `-1` / `0` / `>0` millisecond convention
    pub fn from_millis(timeout_ms: i64) -> TransportResult<Self> {
        match timeout_ms {
            -1 => Ok(Self::Infinite),
            0 => Ok(Self::Immediate),
            ms if ms > 0 => Ok(Self::Bounded(Duration::from_millis(ms as u64))),
            ms => Err(TransportError::invalid_argument(format!(
                "poll timeout must be -1, 0 or a positive number of milliseconds, got {}",
                ms
            ))),
        }
    }

    fn deadline_from(&self, start: Instant) -> Option<Instant> {
        match self {
            Self::Infinite => None,
            Self::Immediate => Some(start),
            // Past the representable range is as good as no deadline
            Self::Bounded(d) => start.checked_add(*d),
        }
    }
}

impl From<Duration> for PollTimeout {
    fn from(d: Duration) -> Self {
        if d.is_zero() {
            Self::Immediate
        } else {
            Self::Bounded(d)
        }
    }
}

impl TryFrom<i64> for PollTimeout {
    type Error = TransportError;

    fn try_from(timeout_ms: i64) -> Result<Self, Self::Error> {
        Self::from_millis(timeout_ms)
    }
}

/// One socket and the interests requested on it
#[derive(Debug, Clone, Copy)]
pub struct PollItem<'a> {
    pub socket: &'a Socket,
    pub interest: InterestSet,
}

impl<'a> PollItem<'a> {
    pub fn new(socket: &'a Socket, interest: InterestSet) -> Self {
        Self { socket, interest }
    }
}

/// Observed readiness, index-correlated with the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResult {
    ready: Vec<InterestSet>,
}

impl PollResult {
    fn timed_out(len: usize) -> Self {
        Self {
            ready: vec![InterestSet::empty(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    /// True when no interest is ready on any item (timeout expired)
    pub fn is_timeout(&self) -> bool {
        self.ready.iter().all(InterestSet::is_empty)
    }

    pub fn get(&self, index: usize) -> Option<InterestSet> {
        self.ready.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = InterestSet> + '_ {
        self.ready.iter().copied()
    }

    /// Per item, every requested interest paired with whether it is ready
    pub fn report(&self, requested: &[InterestSet]) -> Vec<Vec<(Interest, bool)>> {
        requested
            .iter()
            .zip(&self.ready)
            .map(|(asked, ready)| asked.iter().map(|i| (i, ready.contains(i))).collect())
            .collect()
    }

    pub fn into_inner(self) -> Vec<InterestSet> {
        self.ready
    }
}

impl Index<usize> for PollResult {
    type Output = InterestSet;

    fn index(&self, index: usize) -> &Self::Output {
        &self.ready[index]
    }
}

/// Poll multiplexer
#[derive(Debug, Clone, Default)]
pub struct Poller {
    config: PollConfig,
}

impl Poller {
    pub fn new(config: PollConfig) -> TransportResult<Self> {
        config.validate().map_err(TransportError::InvalidArgument)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Wait for readiness on `items`
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty item list
    /// - `HandleInvalid` if a socket's context was closed or terminated
    /// - `Interrupted` if `cancel` fired before anything became ready
    pub fn poll(
        &self,
        items: &[PollItem<'_>],
        timeout: PollTimeout,
        cancel: &dyn Cancellation,
    ) -> TransportResult<PollResult> {
        if items.is_empty() {
            return Err(TransportError::invalid_argument(
                "a non-empty list of sockets is required",
            ));
        }

        let mut raw_items = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let socket = item
                .socket
                .checked()
                .map_err(|e| closed_item_error(index, e))?;
            raw_items.push(socket.as_poll_item(item.interest.to_poll_events()));
        }

        let ready = wait_with_retry(
            timeout,
            self.config.cancel_check_interval,
            cancel,
            |slice_ms| zmq::poll(&mut raw_items, slice_ms),
            || ensure_items_open(items),
        )?;

        if ready == 0 {
            trace!("[POLL] Timed out on {} item(s)", items.len());
            return Ok(PollResult::timed_out(items.len()));
        }

        let ready = items
            .iter()
            .zip(&raw_items)
            .map(|(item, raw)| InterestSet::from_poll_item(raw).intersection(item.interest))
            .collect();

        Ok(PollResult { ready })
    }

    /// Host-boundary variant taking parallel socket and token lists
    ///
    /// `interests[i]` holds the tokens (`"read"`, `"write"`, `"error"`)
    /// requested on `sockets[i]`; `timeout_ms` follows the `-1`/`0`/`>0`
    /// convention.
    pub fn poll_sockets<S: AsRef<str>>(
        &self,
        sockets: &[&Socket],
        interests: &[Vec<S>],
        timeout_ms: i64,
        cancel: &dyn Cancellation,
    ) -> TransportResult<PollResult> {
        let timeout = PollTimeout::from_millis(timeout_ms)?;
        if sockets.is_empty() {
            return Err(TransportError::invalid_argument(
                "a non-empty list of sockets is required",
            ));
        }
        if interests.len() != sockets.len() {
            return Err(TransportError::invalid_argument(format!(
                "event list must be the same length as socket list ({} != {})",
                interests.len(),
                sockets.len()
            )));
        }

        let items = sockets
            .iter()
            .zip(interests)
            .map(|(socket, tokens)| Ok(PollItem::new(socket, InterestSet::parse_tokens(tokens)?)))
            .collect::<TransportResult<Vec<_>>>()?;

        self.poll(&items, timeout, cancel)
    }
}

/// Poll with the default configuration
pub fn poll(
    items: &[PollItem<'_>],
    timeout: PollTimeout,
    cancel: &dyn Cancellation,
) -> TransportResult<PollResult> {
    Poller::default().poll(items, timeout, cancel)
}

fn closed_item_error(index: usize, err: TransportError) -> TransportError {
    match err {
        TransportError::HandleInvalid(msg) => TransportError::HandleInvalid(format!(
            "poll item {} refers to a socket whose context was terminated ({})",
            index, msg
        )),
        other => other,
    }
}

/// Fails if any item's context was closed since the poll started
fn ensure_items_open(items: &[PollItem<'_>]) -> TransportResult<()> {
    for (index, item) in items.iter().enumerate() {
        item.socket
            .checked()
            .map_err(|e| closed_item_error(index, e))?;
    }
    Ok(())
}

/// Run `wait` until it reports readiness, the deadline passes, or `cancel` fires
///
/// `wait` receives the slice length in milliseconds and returns the number
/// of ready items. `still_open` runs after every empty slice. Returns `Ok(0)`
/// when the timeout expired.
pub(crate) fn wait_with_retry<W, V>(
    timeout: PollTimeout,
    check_interval: Duration,
    cancel: &dyn Cancellation,
    mut wait: W,
    mut still_open: V,
) -> TransportResult<usize>
where
    W: FnMut(i64) -> zmq::Result<i32>,
    V: FnMut() -> TransportResult<()>,
{
    let start = Instant::now();
    let deadline = timeout.deadline_from(start);
    let max_slice = ceil_millis(check_interval).max(1);
    let mut interruptions = 0u32;

    loop {
        let slice = match deadline {
            None => max_slice,
            Some(deadline) => {
                ceil_millis(deadline.saturating_duration_since(Instant::now())).min(max_slice)
            }
        };

        match wait(slice) {
            Ok(ready) if ready > 0 => return Ok(ready as usize),
            Ok(_) => {}
            Err(zmq::Error::EINTR) => {
                interruptions += 1;
                debug!(
                    "[POLL] Wait interrupted by signal ({} so far, {:?} elapsed)",
                    interruptions,
                    start.elapsed()
                );
            }
            Err(e) => return Err(e.into()),
        }

        if cancel.is_cancelled() {
            debug!("[POLL] Cancelled after {:?}", start.elapsed());
            return Err(TransportError::Interrupted);
        }

        // Closing a context does not wake a blocked wait
        still_open()?;

        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Ok(0);
            }
        }
    }
}

fn ceil_millis(d: Duration) -> i64 {
    let ms = d.as_micros().div_ceil(1000);
    i64::try_from(ms).unwrap_or(i64::MAX)
}
