// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ordered event log and its process-local read cursor.
//!
//! Events are sequentially-named children under the queue root; the
//! service's sequence assignment gives every non-leave event its global
//! position. Each process reads through its own cursor, armed with
//! one-shot watches so the wake object fires when the next entry appears
//! or a blocked entry is rewritten in place.
//!
//! Leave events never enter the log: the dispatcher drains them from the
//! leave ring ahead of log entries, and a blocked head entry written by
//! the departing node is skipped so a dead process cannot hold the
//! cluster.

use crate::macros::fatal;
use crate::wake::Wake;
use herd_coord::{paths, CoordError, Coordinator, CreateMode, Retry};
use herd_core::{codec, Event, EventKind, LeaveRing};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

pub(crate) struct EventQueue<C> {
    coord: Arc<Retry<C>>,
    /// Next log sequence to read; -1 until the first append bootstraps it.
    cursor: AtomicI32,
    ring: Arc<LeaveRing>,
    wake: Arc<Wake>,
}

impl<C: Coordinator> EventQueue<C> {
    pub(crate) fn new(coord: Arc<Retry<C>>, ring: Arc<LeaveRing>, wake: Arc<Wake>) -> Self {
        Self { coord, cursor: AtomicI32::new(-1), ring, wake }
    }

    #[cfg(test)]
    pub(crate) fn cursor(&self) -> i32 {
        self.cursor.load(Ordering::Acquire)
    }

    /// Append an event, returning its assigned sequence.
    ///
    /// The first append by a process must be the placeholder reserving its
    /// member sequence; it also bootstraps the read cursor, so a fresh
    /// process starts consuming at its own slot instead of scanning
    /// history.
    pub(crate) async fn append(&self, event: &Event) -> i32 {
        let data = match codec::encode(event) {
            Ok(data) => data,
            Err(e) => fatal!(error = %e, "failed to encode event for the log"),
        };
        let created = match self
            .coord
            .create(&paths::queue_prefix(), &data, CreateMode::PersistentSequential)
            .await
        {
            Ok(path) => path,
            Err(e) => fatal!(error = %e, "failed to append to the event log"),
        };
        let Some(seq) = paths::parse_seq(&created) else {
            fatal!(path = %created, "event log assigned an unparsable sequence")
        };
        tracing::debug!(seq, kind = ?event.kind, "appended event");

        if self.cursor.load(Ordering::Acquire) < 0 {
            if event.kind != EventKind::Ignore {
                fatal!(kind = ?event.kind, "first append must be the placeholder event");
            }
            self.cursor.store(seq, Ordering::Release);
            self.wake.signal();
        }
        seq
    }

    /// Deliver the next event, or None when nothing is ready.
    ///
    /// Pending leaves win over log entries. A blocked log entry is
    /// returned without arming the next-slot watch: it will be rewritten
    /// in place and re-read. A Leave entry found in the log is a duplicate
    /// and is dropped.
    pub(crate) async fn pop(&self) -> Option<Event> {
        if let Some(leave) = self.ring.pop() {
            return Some(self.pop_leave(leave).await);
        }

        let cursor = self.cursor.load(Ordering::Acquire);
        if cursor < 0 {
            return None;
        }
        let path = paths::queue_entry(cursor);
        match self.coord.exists(&path, true).await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => fatal!(error = %e, "failed to probe the event log"),
        }
        let event: Event = match self.coord.get(&path, true).await {
            Ok(bytes) => match codec::decode(&bytes) {
                Ok(event) => event,
                Err(e) => fatal!(seq = cursor, error = %e, "undecodable event log entry"),
            },
            Err(CoordError::NoNode(_)) => return None,
            Err(e) => fatal!(error = %e, "failed to read the event log"),
        };
        self.cursor.store(cursor + 1, Ordering::Release);

        if event.blocked {
            return Some(event);
        }

        match self.coord.exists(&paths::queue_entry(cursor + 1), true).await {
            // the entry beat the watch; wake ourselves
            Ok(true) => self.wake.signal(),
            Ok(false) => {}
            Err(e) => fatal!(error = %e, "failed to arm the next log watch"),
        }

        if event.kind == EventKind::Leave {
            tracing::debug!(seq = cursor, "dropping leave entry found in the log");
            return None;
        }
        Some(event)
    }

    /// Deliver a pending leave, skipping a blocked head entry written by
    /// the departing node.
    async fn pop_leave(&self, leave: Event) -> Event {
        let cursor = self.cursor.load(Ordering::Acquire);
        let mut head_ready = false;
        if cursor >= 0 {
            match self.coord.get(&paths::queue_entry(cursor), true).await {
                Ok(bytes) => {
                    head_ready = true;
                    let head: Event = match codec::decode(&bytes) {
                        Ok(event) => event,
                        Err(e) => fatal!(seq = cursor, error = %e, "undecodable event log entry"),
                    };
                    if head.blocked && head.sender.node == leave.sender.node {
                        tracing::debug!(
                            seq = cursor,
                            node = %leave.sender.node,
                            "skipping blocked entry from departed node"
                        );
                        self.cursor.store(cursor + 1, Ordering::Release);
                        match self.coord.exists(&paths::queue_entry(cursor + 1), true).await {
                            Ok(exists) => head_ready = exists,
                            Err(e) => fatal!(error = %e, "failed to arm the next log watch"),
                        }
                    }
                }
                Err(CoordError::NoNode(_)) => {}
                Err(e) => fatal!(error = %e, "failed to read the event log"),
            }
        }
        if !self.ring.is_empty() || head_ready {
            self.wake.signal();
        }
        leave
    }

    /// Rewind the cursor one step; with an event, rewrite that entry in
    /// place.
    pub(crate) async fn push_back(&self, event: Option<&Event>) {
        let cursor = self.cursor.fetch_sub(1, Ordering::AcqRel) - 1;
        let Some(event) = event else {
            return;
        };
        let data = match codec::encode(event) {
            Ok(data) => data,
            Err(e) => fatal!(error = %e, "failed to encode event for the log"),
        };
        if let Err(e) = self.coord.set(&paths::queue_entry(cursor), &data).await {
            fatal!(seq = cursor, error = %e, "failed to rewrite event log entry");
        }
        tracing::debug!(seq = cursor, "rewrote event in place");
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
