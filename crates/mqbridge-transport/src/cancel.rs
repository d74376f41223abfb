// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Cooperative cancellation
//!
//! Blocking operations (poll, the collector's receive loop) never wait longer
//! than one bounded slice without asking their [`Cancellation`] source whether
//! they should give up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Source of a cooperative cancellation request
pub trait Cancellation {
    /// True once the caller wants the blocking operation to stop
    fn is_cancelled(&self) -> bool;
}

/// Shared cancellation flag
///
/// Clones observe the same flag, so one clone can be handed to a blocking
/// call while another is kept by whoever decides to abort it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Clear a previous request so the token can be reused
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

impl Cancellation for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Cancellation source that never fires
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Cancellation for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F> Cancellation for F
where
    F: Fn() -> bool,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_clones_share_flag() {
        let token = CancellationToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());

        token.cancel();
        assert!(observer.is_cancelled());

        observer.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_closure_cancellation() {
        let flag = AtomicBool::new(true);
        let check = || flag.load(Ordering::SeqCst);
        assert!(check.is_cancelled());
        assert!(!NeverCancel.is_cancelled());
    }
}
