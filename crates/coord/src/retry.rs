// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retrying wrapper over a [`Coordinator`].
//!
//! Operation timeouts and connection losses are retried indefinitely with
//! a short sleep; every other outcome passes straight through. Callers
//! therefore never observe transient failures.

use crate::error::CoordError;
use crate::session::{Coordinator, CreateMode};
use async_trait::async_trait;
use herd_core::ClientId;
use std::future::Future;
use std::time::Duration;

const RETRY_DELAY: Duration = Duration::from_millis(10);

/// A [`Coordinator`] that retries transient failures of the wrapped
/// session.
pub struct Retry<C> {
    inner: C,
}

impl<C: Coordinator> Retry<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    async fn run<T, F, Fut>(&self, op: &'static str, mut call: F) -> Result<T, CoordError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CoordError>>,
    {
        loop {
            match call().await {
                Err(e) if e.is_transient() => {
                    tracing::debug!(op, error = %e, "transient coordination error, retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                result => return result,
            }
        }
    }
}

#[async_trait]
impl<C: Coordinator> Coordinator for Retry<C> {
    async fn create(
        &self,
        path: &str,
        data: &[u8],
        mode: CreateMode,
    ) -> Result<String, CoordError> {
        self.run("create", || self.inner.create(path, data, mode)).await
    }

    async fn delete(&self, path: &str) -> Result<(), CoordError> {
        self.run("delete", || self.inner.delete(path)).await
    }

    async fn get(&self, path: &str, watch: bool) -> Result<Vec<u8>, CoordError> {
        self.run("get", || self.inner.get(path, watch)).await
    }

    async fn set(&self, path: &str, data: &[u8]) -> Result<(), CoordError> {
        self.run("set", || self.inner.set(path, data)).await
    }

    async fn exists(&self, path: &str, watch: bool) -> Result<bool, CoordError> {
        self.run("exists", || self.inner.exists(path, watch)).await
    }

    async fn children(&self, path: &str, watch: bool) -> Result<Vec<String>, CoordError> {
        self.run("children", || self.inner.children(path, watch)).await
    }

    fn client_id(&self) -> ClientId {
        self.inner.client_id()
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
