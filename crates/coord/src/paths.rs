// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed node layout in the coordination service.

use herd_core::NodeId;

/// Base directory (permanent).
pub const BASE: &str = "/herd";
/// Ephemeral lock node serializing joins.
pub const LOCK: &str = "/herd/lock";
/// Root of the ordered event log.
pub const QUEUE: &str = "/herd/queue";
/// Root of the membership registry.
pub const MEMBER: &str = "/herd/member";

/// Prefix handed to sequential create for a new log entry.
pub fn queue_prefix() -> String {
    format!("{QUEUE}/")
}

/// Path of the log entry with sequence `seq` (zero-padded to 10 digits).
pub fn queue_entry(seq: i32) -> String {
    format!("{QUEUE}/{seq:010}")
}

/// Path of the member record for `node`.
pub fn member_entry(node: &NodeId) -> String {
    format!("{MEMBER}/{node}")
}

/// Extract the sequence from a log-entry path.
pub fn parse_seq(path: &str) -> Option<i32> {
    let name = path.strip_prefix(QUEUE)?.strip_prefix('/')?;
    name.parse().ok()
}

/// Extract the node name from a member-record path.
pub fn member_name(path: &str) -> Option<&str> {
    let name = path.strip_prefix(MEMBER)?.strip_prefix('/')?;
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some(name)
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
