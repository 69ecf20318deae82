// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The process-local membership view.
//!
//! An ordered list of member records, sorted ascending by the log sequence
//! each member reserved at join time. Sequences are allocated monotonically
//! by the coordination service, so ties cannot occur.

use crate::id::NodeId;
use crate::member::MemberRecord;

/// A process's authoritative picture of the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipView {
    members: Vec<MemberRecord>,
}

impl MembershipView {
    /// Build a view from an unordered set of records.
    pub fn from_records(mut records: Vec<MemberRecord>) -> Self {
        records.sort_by_key(|r| r.seq);
        Self { members: records }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[MemberRecord] {
        &self.members
    }

    pub fn find(&self, node: &NodeId) -> Option<&MemberRecord> {
        self.members.iter().find(|m| m.node == *node)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&MemberRecord> {
        self.members.iter().find(|m| m.node == name)
    }

    /// Insert a record, keeping the view sorted by `seq`.
    pub fn insert(&mut self, record: MemberRecord) {
        let at = self.members.partition_point(|m| m.seq < record.seq);
        self.members.insert(at, record);
    }

    /// Remove the record for `node`, preserving order.
    pub fn remove(&mut self, node: &NodeId) -> Option<MemberRecord> {
        let at = self.members.iter().position(|m| m.node == *node)?;
        Some(self.members.remove(at))
    }

    /// The master: the first member in view order whose `joined` flag is
    /// set.
    pub fn master(&self) -> Option<&MemberRecord> {
        self.members.iter().find(|m| m.joined)
    }

    /// Whether `node` is the master. An empty view means `node` is
    /// becoming the sole member and counts as master.
    pub fn is_master(&self, node: &NodeId) -> bool {
        if self.members.is_empty() {
            return true;
        }
        self.master().is_some_and(|m| m.node == *node)
    }

    /// Mark `node` as joined in the view. Returns false if absent.
    pub fn mark_joined(&mut self, node: &NodeId) -> bool {
        match self.members.iter_mut().find(|m| m.node == *node) {
            Some(m) => {
                m.joined = true;
                true
            }
            None => false,
        }
    }

    /// Collapse the view to a single record.
    pub fn collapse_to(&mut self, record: MemberRecord) {
        self.members.clear();
        self.members.push(record);
    }

    /// Materialize the flat node list handed to host callbacks.
    pub fn node_list(&self) -> Vec<NodeId> {
        self.members.iter().map(|m| m.node.clone()).collect()
    }
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
