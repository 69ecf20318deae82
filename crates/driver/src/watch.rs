// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The watch pump: turns session watch firings into leave-ring entries
//! and wake signals.
//!
//! Runs as its own task so watch handling never executes host callbacks.
//! Membership deletions come from two sources: the per-member existence
//! watch (armed when a join commits) covers members in the view, and a
//! standing child watch on the registry root covers nodes that crash
//! between creating their record and master approval, before any peer has
//! them in view.

use crate::driver::ClusterState;
use crate::wake::Wake;
use herd_coord::{paths, Coordinator, Retry, WatchEvent};
use herd_core::{ClientId, Event, LeaveRing, MemberRecord, NodeId};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

pub(crate) async fn run_watch_pump<C: Coordinator>(
    coord: Arc<Retry<C>>,
    state: Arc<Mutex<ClusterState>>,
    ring: Arc<LeaveRing>,
    wake: Arc<Wake>,
    mut watch_rx: mpsc::UnboundedReceiver<WatchEvent>,
) {
    let mut known = registry_names(coord.as_ref()).await;

    while let Some(event) = watch_rx.recv().await {
        match event {
            WatchEvent::Session { connected } => {
                tracing::debug!(connected, "coordination session state changed");
            }
            WatchEvent::ChildrenChanged { path } if path == paths::MEMBER => {
                let now = registry_names(coord.as_ref()).await;
                for name in known.difference(&now) {
                    if state.lock().view.find_by_name(name).is_some() {
                        // the member watch owns in-view departures
                        continue;
                    }
                    queue_leave(&ring, &wake, unapproved_record(name));
                }
                known = now;
            }
            WatchEvent::ChildrenChanged { .. } => {}
            WatchEvent::DataChanged { path } => {
                if paths::member_name(&path).is_some() {
                    if let Err(e) = coord.exists(&path, true).await {
                        tracing::warn!(path = %path, error = %e, "failed to re-arm member watch");
                    }
                } else {
                    wake.signal();
                }
            }
            WatchEvent::Deleted { path } => match paths::member_name(&path) {
                Some(name) => {
                    let record = state.lock().view.find_by_name(name).cloned();
                    match record {
                        Some(record) => queue_leave(&ring, &wake, Some(record)),
                        None => wake.signal(),
                    }
                }
                None => wake.signal(),
            },
            WatchEvent::Created { .. } => wake.signal(),
        }
    }
    tracing::debug!("watch channel closed, pump exiting");
}

fn queue_leave(ring: &LeaveRing, wake: &Wake, record: Option<MemberRecord>) {
    let Some(record) = record else {
        return;
    };
    tracing::debug!(member = %record.node, "member vanished, queueing leave");
    match ring.push(Event::leave(record)) {
        Ok(()) => wake.signal(),
        Err(e) => tracing::error!(error = %e, "dropping departure"),
    }
}

/// Record stand-in for a node that vanished before any peer had it in
/// view. Only the node identity matters downstream.
fn unapproved_record(name: &str) -> Option<MemberRecord> {
    match NodeId::new(name) {
        Ok(node) => Some(MemberRecord::unjoined(node, ClientId::default(), 0)),
        Err(e) => {
            tracing::warn!(member = name, error = %e, "ignoring malformed member name");
            None
        }
    }
}

async fn registry_names<C: Coordinator>(coord: &Retry<C>) -> HashSet<String> {
    match coord.children(paths::MEMBER, true).await {
        Ok(names) => names.into_iter().collect(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to list the membership registry");
            HashSet::new()
        }
    }
}
