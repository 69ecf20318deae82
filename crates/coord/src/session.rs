// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Coordinator` trait: primitive operations of the coordination
//! service, as seen by one session.
//!
//! Watches are one-shot. A session delivers every watch firing on a
//! single channel handed out at connect time; re-arming is the caller's
//! responsibility.

use crate::error::CoordError;
use async_trait::async_trait;
use herd_core::ClientId;

/// How a node is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    /// Survives the creating session.
    Persistent,
    /// Deleted automatically when the creating session ends.
    Ephemeral,
    /// Persistent, with a service-assigned monotonic sequence suffix.
    PersistentSequential,
}

/// A one-shot watch firing, delivered on the session's watch channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Created { path: String },
    Deleted { path: String },
    DataChanged { path: String },
    ChildrenChanged { path: String },
    Session { connected: bool },
}

/// One session against the coordination service.
///
/// Writes are linearizable; ephemeral nodes vanish when the session
/// expires. All operations are fallible with [`CoordError`]; transient
/// failures are retried by [`crate::Retry`], not here.
#[async_trait]
pub trait Coordinator: Send + Sync + 'static {
    /// Create a node. For [`CreateMode::PersistentSequential`], `path` is
    /// a prefix and the returned path carries the assigned suffix;
    /// otherwise the returned path equals `path`.
    async fn create(&self, path: &str, data: &[u8], mode: CreateMode)
        -> Result<String, CoordError>;

    async fn delete(&self, path: &str) -> Result<(), CoordError>;

    /// Read a node's value. `watch` arms a one-shot watch for a change or
    /// deletion of the node.
    async fn get(&self, path: &str, watch: bool) -> Result<Vec<u8>, CoordError>;

    async fn set(&self, path: &str, data: &[u8]) -> Result<(), CoordError>;

    /// Whether a node exists. `watch` arms a one-shot watch that also
    /// fires on creation of a currently-absent node.
    async fn exists(&self, path: &str, watch: bool) -> Result<bool, CoordError>;

    /// Child names (not full paths) of a node. `watch` arms a one-shot
    /// watch for child creation or deletion.
    async fn children(&self, path: &str, watch: bool) -> Result<Vec<String>, CoordError>;

    /// The session id assigned by the service.
    fn client_id(&self) -> ClientId;
}
