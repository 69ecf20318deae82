// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The host-facing driver: init, join, leave, notify.

use crate::config::Config;
use crate::error::DriverError;
use crate::handler::{BlockCallback, ClusterHandler};
use crate::lock::ClusterLock;
use crate::macros::fatal;
use crate::queue::EventQueue;
use crate::wake::Wake;
use crate::{registry, watch, worker};
use herd_coord::{paths, CoordError, Coordinator, CreateMode, Retry, WatchEvent};
use herd_core::{Event, LeaveRing, MemberRecord, MembershipView, NodeId, MAX_NODES};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// View, self record, and bootstrap flag, shared between the dispatcher
/// and the watch pump.
#[derive(Default)]
pub(crate) struct ClusterState {
    pub(crate) view: MembershipView,
    pub(crate) this: Option<MemberRecord>,
    pub(crate) bootstrapped: bool,
}

/// Cluster membership driver over a coordination service session.
///
/// One instance per process. The host polls [`ClusterDriver::wake`] and
/// calls [`ClusterDriver::dispatch`] once per signal; `join`, `leave`, and
/// `notify` may be called from any task.
pub struct ClusterDriver<C: Coordinator, H: ClusterHandler> {
    pub(crate) coord: Arc<Retry<C>>,
    pub(crate) handler: Arc<H>,
    pub(crate) state: Arc<Mutex<ClusterState>>,
    pub(crate) queue: Arc<EventQueue<C>>,
    pub(crate) wake: Arc<Wake>,
    pub(crate) notify_blocked: Arc<AtomicU32>,
    pub(crate) block_tx: mpsc::UnboundedSender<()>,
    ring: Arc<LeaveRing>,
    lock: ClusterLock<C>,
    block_cbs: Arc<Mutex<HashMap<u64, BlockCallback>>>,
    next_cb: AtomicU64,
}

impl<C: Coordinator, H: ClusterHandler> ClusterDriver<C, H> {
    /// Bring the driver up on a connected session.
    ///
    /// Creates the base, queue, and member roots if absent, allocates the
    /// wake object, and spawns the watch pump and the blocking-callback
    /// worker. The session's watch channel must be the one handed out at
    /// connect time.
    pub async fn init(
        config: &Config,
        session: C,
        watch_rx: mpsc::UnboundedReceiver<WatchEvent>,
        handler: H,
    ) -> Result<Self, DriverError> {
        tracing::info!(endpoints = ?config.endpoints(), "initializing cluster driver");
        let coord = Arc::new(Retry::new(session));

        for path in [paths::BASE, paths::QUEUE, paths::MEMBER] {
            match coord.create(path, b"", CreateMode::Persistent).await {
                Ok(_) | Err(CoordError::NodeExists(_)) => {}
                Err(e) => return Err(DriverError::Coord(e)),
            }
        }

        let wake = Arc::new(Wake::new());
        let ring = Arc::new(LeaveRing::new(MAX_NODES));
        let queue = Arc::new(EventQueue::new(
            Arc::clone(&coord),
            Arc::clone(&ring),
            Arc::clone(&wake),
        ));
        let state = Arc::new(Mutex::new(ClusterState::default()));
        let notify_blocked = Arc::new(AtomicU32::new(0));
        let block_cbs = Arc::new(Mutex::new(HashMap::new()));

        let block_tx = worker::spawn_block_worker(
            Arc::clone(&queue),
            Arc::clone(&block_cbs),
            Arc::clone(&notify_blocked),
            Arc::clone(&wake),
        );
        tokio::spawn(watch::run_watch_pump(
            Arc::clone(&coord),
            Arc::clone(&state),
            Arc::clone(&ring),
            Arc::clone(&wake),
            watch_rx,
        ));

        let lock = ClusterLock::new(Arc::clone(&coord));

        Ok(Self {
            coord,
            handler: Arc::new(handler),
            state,
            queue,
            wake,
            notify_blocked,
            block_tx,
            ring,
            lock,
            block_cbs,
            next_cb: AtomicU64::new(1),
        })
    }

    /// The wake handle the host polls between dispatch calls.
    pub fn wake(&self) -> Arc<Wake> {
        Arc::clone(&self.wake)
    }

    /// Snapshot of the current membership view's node list.
    pub fn members(&self) -> Vec<NodeId> {
        self.state.lock().view.node_list()
    }

    /// Join the cluster as `node`, announcing `payload` to the master's
    /// `check_join` and every peer's `join_handler`.
    ///
    /// Serialized cluster-wide by the join lock. Aborts if a previous
    /// session's record for `node` still exists.
    pub async fn join(&self, node: NodeId, payload: &[u8]) -> Result<(), DriverError> {
        self.lock.lock().await;

        if !self.state.lock().bootstrapped {
            let view = registry::bootstrap(self.coord.as_ref()).await;
            let mut state = self.state.lock();
            state.view = view;
            state.bootstrapped = true;
        }

        if self.state.lock().view.find(&node).is_some() {
            fatal!(node = %node, "a previous session for this node still exists");
        }

        let client = self.coord.client_id();
        let seq = self
            .queue
            .append(&Event::placeholder(MemberRecord::unjoined(node.clone(), client, 0)))
            .await;
        let record = MemberRecord::unjoined(node, client, seq);
        tracing::debug!(node = %record.node, seq, client = %client, "reserved member slot");

        let join = match Event::join(record.clone(), payload.to_vec()) {
            Ok(event) => event,
            Err(e) => {
                self.lock.unlock().await;
                return Err(e.into());
            }
        };

        self.state.lock().this = Some(record.clone());
        registry::create_member(self.coord.as_ref(), &record).await;
        self.queue.append(&join).await;

        self.lock.unlock().await;
        Ok(())
    }

    /// Announce this node's departure locally.
    ///
    /// Peers learn of the departure when the session closes and the
    /// ephemeral member record vanishes.
    pub fn leave(&self) -> Result<(), DriverError> {
        let Some(this) = self.state.lock().this.clone() else {
            return Err(DriverError::NotJoined);
        };
        self.ring.push(Event::leave(this))?;
        self.wake.signal();
        Ok(())
    }

    /// Publish a notification to every member, in log order.
    ///
    /// With a callback, the event blocks the cluster until the callback
    /// has run to completion on this node.
    pub async fn notify(
        &self,
        payload: &[u8],
        block_cb: Option<BlockCallback>,
    ) -> Result<(), DriverError> {
        let Some(this) = self.state.lock().this.clone() else {
            return Err(DriverError::NotJoined);
        };
        let token = block_cb.as_ref().map(|_| self.next_cb.fetch_add(1, Ordering::Relaxed));
        let event = Event::notify(this, payload.to_vec(), token)?;
        if let (Some(token), Some(callback)) = (token, block_cb) {
            self.block_cbs.lock().insert(token, callback);
        }
        self.queue.append(&event).await;
        Ok(())
    }
}
