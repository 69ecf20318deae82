// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The membership registry: one ephemeral child per live node.
//!
//! Records are created at join time with `joined = false`; the master
//! flips the flag while approving the Join event. Session expiry deletes
//! the child, which is how peers learn about crashes.

use crate::macros::fatal;
use herd_coord::{paths, CoordError, Coordinator, CreateMode, Retry};
use herd_core::{codec, MemberRecord, MembershipView, NodeId};
use std::time::Duration;

const JOIN_WAIT: Duration = Duration::from_millis(10);

/// Build the initial membership view from the registry.
///
/// Runs under the join lock. A record still carrying `joined = false`
/// belongs to a concurrent joiner the master has not approved yet; it is
/// re-read until the flag flips or the record vanishes.
pub(crate) async fn bootstrap<C: Coordinator>(coord: &Retry<C>) -> MembershipView {
    let names = match coord.children(paths::MEMBER, true).await {
        Ok(names) => names,
        Err(e) => fatal!(error = %e, "failed to list the membership registry"),
    };

    let mut records = Vec::new();
    for name in names {
        let path = format!("{}/{name}", paths::MEMBER);
        loop {
            match coord.get(&path, true).await {
                Ok(bytes) => {
                    let record: MemberRecord = match codec::decode(&bytes) {
                        Ok(record) => record,
                        Err(e) => fatal!(member = %name, error = %e, "undecodable member record"),
                    };
                    if !record.joined {
                        tracing::debug!(member = %name, "waiting for member to finish joining");
                        tokio::time::sleep(JOIN_WAIT).await;
                        continue;
                    }
                    records.push(record);
                    break;
                }
                Err(CoordError::NoNode(_)) => break,
                Err(e) => fatal!(member = %name, error = %e, "failed to read member record"),
            }
        }
    }

    tracing::debug!(members = records.len(), "bootstrapped membership view");
    MembershipView::from_records(records)
}

/// Create this node's ephemeral member record.
pub(crate) async fn create_member<C: Coordinator>(coord: &Retry<C>, record: &MemberRecord) {
    let data = match codec::encode(record) {
        Ok(data) => data,
        Err(e) => fatal!(error = %e, "failed to encode member record"),
    };
    let path = paths::member_entry(&record.node);
    if let Err(e) = coord.create(&path, &data, CreateMode::Ephemeral).await {
        fatal!(path = %path, error = %e, "failed to create member record");
    }
    tracing::debug!(path = %path, seq = record.seq, "created member record");
}

/// Flip a member record to `joined = true` (master side of the blocking
/// protocol).
pub(crate) async fn mark_joined<C: Coordinator>(coord: &Retry<C>, node: &NodeId) {
    let path = paths::member_entry(node);
    let mut record: MemberRecord = match coord.get(&path, false).await {
        Ok(bytes) => match codec::decode(&bytes) {
            Ok(record) => record,
            Err(e) => fatal!(path = %path, error = %e, "undecodable member record"),
        },
        Err(e) => fatal!(path = %path, error = %e, "failed to read member record for approval"),
    };
    record.joined = true;
    let data = match codec::encode(&record) {
        Ok(data) => data,
        Err(e) => fatal!(error = %e, "failed to encode member record"),
    };
    if let Err(e) = coord.set(&path, &data).await {
        fatal!(path = %path, error = %e, "failed to update member record");
    }
}

/// Arm the deletion watch on a member's record.
pub(crate) async fn arm_member_watch<C: Coordinator>(coord: &Retry<C>, node: &NodeId) {
    let path = paths::member_entry(node);
    match coord.exists(&path, true).await {
        Ok(exists) => tracing::debug!(path = %path, exists, "armed member watch"),
        Err(e) => fatal!(path = %path, error = %e, "failed to arm member watch"),
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
