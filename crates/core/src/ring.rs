// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded FIFO of pending Leave events.
//!
//! Leave events bypass the shared log: watch callbacks push departures
//! here and the dispatcher drains them. The occupancy counter is atomic so
//! the watch side and the dispatch side can observe it without taking the
//! slot lock.

use crate::event::Event;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Returned when a push would exceed the ring's capacity.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("leave ring full (capacity {0})")]
pub struct RingFull(pub usize);

/// Bounded in-memory FIFO of pending Leave events.
///
/// Capacity equals the maximum cluster size; a full ring refuses the push
/// rather than overwrite a pending departure.
pub struct LeaveRing {
    slots: Mutex<VecDeque<Event>>,
    len: AtomicUsize,
    capacity: usize,
}

impl LeaveRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(VecDeque::with_capacity(capacity)),
            len: AtomicUsize::new(0),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of pending leaves. Safe to call from watch callbacks.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a departure. Fails when the ring is at capacity.
    pub fn push(&self, event: Event) -> Result<(), RingFull> {
        let mut slots = self.slots.lock();
        if slots.len() >= self.capacity {
            return Err(RingFull(self.capacity));
        }
        slots.push_back(event);
        self.len.store(slots.len(), Ordering::Release);
        Ok(())
    }

    /// Take the oldest pending departure.
    pub fn pop(&self) -> Option<Event> {
        let mut slots = self.slots.lock();
        let event = slots.pop_front();
        self.len.store(slots.len(), Ordering::Release);
        event
    }
}

#[cfg(test)]
#[path = "ring_tests.rs"]
mod tests;
