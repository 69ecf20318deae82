// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatcher: the single-threaded consumer of the event queue.

use crate::driver::ClusterDriver;
use crate::handler::ClusterHandler;
use crate::macros::fatal;
use crate::registry;
use herd_coord::Coordinator;
use herd_core::{Event, EventKind, JoinResult};
use std::sync::atomic::Ordering;

impl<C: Coordinator, H: ClusterHandler> ClusterDriver<C, H> {
    /// Process at most one event.
    ///
    /// Non-blocking: consumes one wake signal and returns immediately when
    /// none are pending, when a blocking callback is outstanding, or when
    /// the queue has nothing ready.
    pub async fn dispatch(&self) {
        if !self.wake.consume() {
            return;
        }
        if self.notify_blocked.load(Ordering::Acquire) > 0 {
            return;
        }
        let Some(event) = self.queue.pop().await else {
            return;
        };

        match event.kind {
            EventKind::Ignore => {}
            EventKind::Join if event.blocked => self.on_blocked_join(event).await,
            EventKind::Join => self.on_join(event).await,
            EventKind::Leave => self.on_leave(event),
            EventKind::Notify if event.blocked => self.on_blocked_notify(event).await,
            EventKind::Notify => self.handler.notify_handler(&event.sender.node, &event.payload),
        }
    }

    /// Master side of the join protocol. Everyone else rewinds and waits
    /// for the master's rewrite.
    async fn on_blocked_join(&self, mut event: Event) {
        let approver = {
            let state = self.state.lock();
            match &state.this {
                Some(this) => state.view.is_master(&this.node),
                None => false,
            }
        };
        if !approver {
            self.queue.push_back(None).await;
            return;
        }

        let result = self.handler.check_join(&event.sender.node, &event.payload);
        event.join_result = result;
        event.blocked = false;
        event.sender.joined = true;
        registry::mark_joined(self.coord.as_ref(), &event.sender.node).await;
        tracing::debug!(node = %event.sender.node, result = ?result, "approved join, rewriting event");
        self.queue.push_back(Some(&event)).await;

        if result == JoinResult::MasterTransfer {
            tracing::error!(
                node = %event.sender.node,
                "join requires a master transfer; retry once the new master is up"
            );
            std::process::exit(1);
        }
    }

    /// A committed join: fold the sender into the view and tell the host.
    ///
    /// A master-transfer result instead collapses the view to this node
    /// alone and consumes the event again; no handler fires.
    async fn on_join(&self, event: Event) {
        if event.join_result == JoinResult::MasterTransfer {
            {
                let mut state = self.state.lock();
                let Some(mut this) = state.this.clone() else {
                    fatal!("master transfer delivered to a node that never joined")
                };
                this.joined = true;
                state.this = Some(this.clone());
                state.view.collapse_to(this);
            }
            self.queue.push_back(Some(&event)).await;
            let _ = self.queue.pop().await;
            tracing::debug!("master transferred, continuing as sole member");
            return;
        }

        let members = {
            let mut state = self.state.lock();
            if let Some(this) = state.this.as_mut() {
                if this.node == event.sender.node {
                    this.joined = true;
                }
            }
            state.view.insert(event.sender.clone());
            state.view.node_list()
        };
        registry::arm_member_watch(self.coord.as_ref(), &event.sender.node).await;
        tracing::debug!(node = %event.sender.node, members = members.len(), "member joined");
        self.handler.join_handler(&event.sender.node, &members, event.join_result, &event.payload);
    }

    /// A departure from the leave ring. Unknown senders are dropped.
    fn on_leave(&self, event: Event) {
        let members = {
            let mut state = self.state.lock();
            state.view.remove(&event.sender.node).map(|_| state.view.node_list())
        };
        match members {
            Some(members) => {
                tracing::debug!(node = %event.sender.node, members = members.len(), "member left");
                self.handler.leave_handler(&event.sender.node, &members);
            }
            None => {
                tracing::debug!(node = %event.sender.node, "leave for unknown member, dropping");
            }
        }
    }

    /// Originator side of the blocking-notify protocol. Everyone else
    /// rewinds and waits for the unblocked rewrite.
    async fn on_blocked_notify(&self, mut event: Event) {
        let originator =
            self.state.lock().this.as_ref().is_some_and(|t| t.node == event.sender.node);
        if originator && !event.callbacked {
            event.callbacked = true;
            self.notify_blocked.fetch_add(1, Ordering::AcqRel);
            self.queue.push_back(Some(&event)).await;
            if self.block_tx.send(()).is_err() {
                fatal!("blocking worker is gone");
            }
        } else {
            self.queue.push_back(None).await;
        }
    }
}
