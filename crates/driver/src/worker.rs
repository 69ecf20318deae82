// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The blocking-callback worker.
//!
//! A single task, so the dispatcher never runs host blocking code
//! synchronously and callbacks execute one at a time. Each job pops
//! exactly the event the dispatcher just pushed back, runs the callback,
//! rewrites the event unblocked, and wakes the dispatcher.

use crate::handler::BlockCallback;
use crate::macros::fatal;
use crate::queue::EventQueue;
use crate::wake::Wake;
use herd_coord::Coordinator;
use herd_core::EventKind;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

pub(crate) fn spawn_block_worker<C: Coordinator>(
    queue: Arc<EventQueue<C>>,
    callbacks: Arc<Mutex<HashMap<u64, BlockCallback>>>,
    notify_blocked: Arc<AtomicU32>,
    wake: Arc<Wake>,
) -> mpsc::UnboundedSender<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<()>();
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            let Some(mut event) = queue.pop().await else {
                fatal!("blocking worker found no event at the rewound cursor")
            };
            if event.kind != EventKind::Notify || !event.callbacked {
                fatal!(kind = ?event.kind, "blocking worker popped an unexpected event");
            }

            let callback = event.block_cb.and_then(|token| callbacks.lock().remove(&token));
            match callback {
                Some(callback) => callback(&event.payload),
                None => fatal!("no callback registered for blocking notify"),
            }

            event.blocked = false;
            queue.push_back(Some(&event)).await;
            notify_blocked.fetch_sub(1, Ordering::AcqRel);
            wake.signal();
        }
    });
    tx
}
