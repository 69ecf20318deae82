// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Coordinator that fails with a scripted error sequence before
/// succeeding.
#[derive(Default)]
struct Flaky {
    failures: Mutex<VecDeque<CoordError>>,
    calls: AtomicUsize,
}

impl Flaky {
    fn with_failures(failures: Vec<CoordError>) -> Self {
        Self { failures: Mutex::new(failures.into()), calls: AtomicUsize::new(0) }
    }

    fn next(&self) -> Result<(), CoordError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self.failures.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Coordinator for Flaky {
    async fn create(
        &self,
        path: &str,
        _data: &[u8],
        _mode: CreateMode,
    ) -> Result<String, CoordError> {
        self.next().map(|_| path.to_string())
    }

    async fn delete(&self, _path: &str) -> Result<(), CoordError> {
        self.next()
    }

    async fn get(&self, _path: &str, _watch: bool) -> Result<Vec<u8>, CoordError> {
        self.next().map(|_| b"value".to_vec())
    }

    async fn set(&self, _path: &str, _data: &[u8]) -> Result<(), CoordError> {
        self.next()
    }

    async fn exists(&self, _path: &str, _watch: bool) -> Result<bool, CoordError> {
        self.next().map(|_| true)
    }

    async fn children(&self, _path: &str, _watch: bool) -> Result<Vec<String>, CoordError> {
        self.next().map(|_| Vec::new())
    }

    fn client_id(&self) -> ClientId {
        ClientId(1)
    }
}

#[tokio::test]
async fn retries_transient_errors_until_success() {
    let retry = Retry::new(Flaky::with_failures(vec![
        CoordError::OperationTimeout,
        CoordError::ConnectionLoss,
    ]));
    let value = retry.get("/x", false).await.unwrap();
    assert_eq!(value, b"value");
    assert_eq!(retry.inner().calls.load(Ordering::Relaxed), 3);
}

#[tokio::test]
async fn passes_domain_errors_through() {
    let retry = Retry::new(Flaky::with_failures(vec![CoordError::NodeExists("/x".into())]));
    let err = retry.create("/x", b"", CreateMode::Ephemeral).await.unwrap_err();
    assert_eq!(err, CoordError::NodeExists("/x".into()));
    assert_eq!(retry.inner().calls.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn success_needs_one_call() {
    let retry = Retry::new(Flaky::default());
    assert!(retry.exists("/x", false).await.unwrap());
    assert_eq!(retry.inner().calls.load(Ordering::Relaxed), 1);
}
