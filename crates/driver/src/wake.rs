// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The wake object: an edge-triggered counter linking watch callbacks to
//! the host's dispatch loop.
//!
//! Watch callbacks and the driver call [`Wake::signal`]; the host parks on
//! [`Wake::wait`] and calls `dispatch` once per signal, which consumes one
//! count via [`Wake::consume`].

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Notify;

/// Edge-triggered wake counter.
#[derive(Default)]
pub struct Wake {
    count: AtomicU64,
    notify: Notify,
}

impl Wake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one wake signal and rouse a parked waiter.
    pub fn signal(&self) {
        self.count.fetch_add(1, Ordering::Release);
        self.notify.notify_one();
    }

    /// Consume one signal. Returns false when none are pending.
    pub fn consume(&self) -> bool {
        self.count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1))
            .is_ok()
    }

    /// Pending signal count.
    pub fn pending(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    /// Park until at least one signal is pending.
    pub async fn wait(&self) {
        loop {
            if self.pending() > 0 {
                return;
            }
            let notified = self.notify.notified();
            if self.pending() > 0 {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
#[path = "wake_tests.rs"]
mod tests;
