// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host callbacks the driver invokes from its dispatch path.

use herd_core::{JoinResult, NodeId};

/// A blocking callback attached to a notify event.
///
/// Runs exactly once, on the originating process, on the driver's
/// single-worker task; no peer observes the event unblocked before it
/// completes.
pub type BlockCallback = Box<dyn FnOnce(&[u8]) + Send + 'static>;

/// The host storage layer, as seen by the driver.
///
/// All methods are called from the dispatch path, one at a time, in the
/// same event order on every node. They must not call back into the
/// driver.
pub trait ClusterHandler: Send + Sync + 'static {
    /// Decide whether a joining node may enter the cluster. Called only on
    /// the master.
    fn check_join(&self, node: &NodeId, payload: &[u8]) -> JoinResult;

    /// A node's join committed; `members` is the full view including it.
    fn join_handler(&self, node: &NodeId, members: &[NodeId], result: JoinResult, payload: &[u8]);

    /// A node left; `members` is the full view without it.
    fn leave_handler(&self, node: &NodeId, members: &[NodeId]);

    /// An application notification committed.
    fn notify_handler(&self, node: &NodeId, payload: &[u8]);
}
