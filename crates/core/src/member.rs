// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Member records: one per live node in the membership registry.

use crate::id::{ClientId, NodeId};
use serde::{Deserialize, Serialize};

/// A node's entry in the membership registry.
///
/// Exactly one exists per live process, stored as the value of its
/// ephemeral member child. `seq` is the slot reserved in the ordered event
/// log at join time and fixes the node's position in every membership
/// view. `joined` is flipped by the master when the node's Join event is
/// approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub seq: i32,
    pub joined: bool,
    pub client: ClientId,
    pub node: NodeId,
}

impl MemberRecord {
    /// A record for a node that has reserved its slot but is not yet
    /// approved by the master.
    pub fn unjoined(node: NodeId, client: ClientId, seq: i32) -> Self {
        Self { seq, joined: false, client, node }
    }
}

#[cfg(test)]
#[path = "member_tests.rs"]
mod tests;
