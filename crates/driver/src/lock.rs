// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster-wide mutual exclusion for join serialization.
//!
//! An ephemeral node at a fixed path, taken with spin-and-backoff.
//! Deliberately unfair and coarse; join latency does not need to be
//! optimal, and the ephemeral mode releases the lock if the holder dies.

use crate::macros::fatal;
use herd_coord::{paths, CoordError, Coordinator, CreateMode, Retry};
use std::sync::Arc;
use std::time::Duration;

const LOCK_BACKOFF: Duration = Duration::from_millis(10);

pub(crate) struct ClusterLock<C> {
    coord: Arc<Retry<C>>,
}

impl<C: Coordinator> ClusterLock<C> {
    pub(crate) fn new(coord: Arc<Retry<C>>) -> Self {
        Self { coord }
    }

    /// Acquire the lock, retrying until the current holder releases it.
    pub(crate) async fn lock(&self) {
        loop {
            match self.coord.create(paths::LOCK, b"", CreateMode::Ephemeral).await {
                Ok(_) => {
                    tracing::debug!("join lock acquired");
                    return;
                }
                Err(CoordError::NodeExists(_)) => {
                    tokio::time::sleep(LOCK_BACKOFF).await;
                }
                Err(e) => fatal!(error = %e, "failed to create the join lock"),
            }
        }
    }

    /// Release the lock.
    pub(crate) async fn unlock(&self) {
        if let Err(e) = self.coord.delete(paths::LOCK).await {
            fatal!(error = %e, "failed to release the join lock");
        }
        tracing::debug!("join lock released");
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
