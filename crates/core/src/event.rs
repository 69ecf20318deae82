// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster events carried through the ordered log and the leave ring.

use crate::member::MemberRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest payload an event may carry.
pub const MAX_EVENT_PAYLOAD: usize = 64 * 1024;

/// Returned when an event payload exceeds [`MAX_EVENT_PAYLOAD`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("event payload of {0} bytes exceeds the {MAX_EVENT_PAYLOAD}-byte limit")]
pub struct PayloadTooLarge(pub usize);

/// Kinds of cluster events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Join,
    Leave,
    Notify,
    Ignore,
}

/// Outcome of the master's `check_join` decision for a joining node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinResult {
    #[default]
    Success,
    /// The join is rejected outright.
    Fail,
    /// The cluster is not ready; the node should retry later.
    JoinLater,
    /// The joining node must take over as master.
    MasterTransfer,
}

/// A cluster event.
///
/// Join and Notify events travel through the shared ordered log; Leave
/// events travel through the process-local leave ring; Ignore events are
/// placeholders appended to reserve a log sequence.
///
/// `block_cb` is an opaque handle into the originating process's callback
/// table. It is meaningless on any other process; peers only consult
/// `blocked` and `callbacked`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub sender: MemberRecord,
    pub join_result: JoinResult,
    /// Set while the cluster must hold this event at the head of the log.
    pub blocked: bool,
    /// Set once the originator has dispatched the blocking callback.
    pub callbacked: bool,
    pub block_cb: Option<u64>,
    pub payload: Vec<u8>,
}

impl Event {
    fn new(
        kind: EventKind,
        sender: MemberRecord,
        payload: Vec<u8>,
    ) -> Result<Self, PayloadTooLarge> {
        if payload.len() > MAX_EVENT_PAYLOAD {
            return Err(PayloadTooLarge(payload.len()));
        }
        Ok(Self {
            kind,
            sender,
            join_result: JoinResult::default(),
            blocked: false,
            callbacked: false,
            block_cb: None,
            payload,
        })
    }

    /// A join announcement. Always blocked until the master approves it.
    pub fn join(sender: MemberRecord, payload: Vec<u8>) -> Result<Self, PayloadTooLarge> {
        let mut ev = Self::new(EventKind::Join, sender, payload)?;
        ev.blocked = true;
        Ok(ev)
    }

    /// An application notification. Blocked iff a callback handle is
    /// attached.
    pub fn notify(
        sender: MemberRecord,
        payload: Vec<u8>,
        block_cb: Option<u64>,
    ) -> Result<Self, PayloadTooLarge> {
        let mut ev = Self::new(EventKind::Notify, sender, payload)?;
        ev.blocked = block_cb.is_some();
        ev.block_cb = block_cb;
        Ok(ev)
    }

    /// A departure observed for `sender`. Never enters the log.
    pub fn leave(sender: MemberRecord) -> Self {
        Self {
            kind: EventKind::Leave,
            sender,
            join_result: JoinResult::default(),
            blocked: false,
            callbacked: false,
            block_cb: None,
            payload: Vec::new(),
        }
    }

    /// A placeholder appended to reserve a log sequence.
    pub fn placeholder(sender: MemberRecord) -> Self {
        Self {
            kind: EventKind::Ignore,
            sender,
            join_result: JoinResult::default(),
            blocked: false,
            callbacked: false,
            block_cb: None,
            payload: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "property_tests.rs"]
mod property_tests;
