// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node and session identifiers.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;
use thiserror::Error;

/// Errors from constructing a [`NodeId`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidNodeId {
    #[error("node id is empty")]
    Empty,
    #[error("node id '{0}' contains '/'")]
    Slash(String),
}

/// Opaque, totally ordered identity of a cluster node.
///
/// Provided by the host. The string is used verbatim as the member child
/// name in the coordination service, so it must be path-safe: non-empty
/// and free of `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(SmolStr);

impl NodeId {
    /// Create a new NodeId, rejecting values unusable as a path segment.
    pub fn new(id: impl AsRef<str>) -> Result<Self, InvalidNodeId> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(InvalidNodeId::Empty);
        }
        if id.contains('/') {
            return Err(InvalidNodeId::Slash(id.to_string()));
        }
        Ok(Self(SmolStr::new(id)))
    }

    /// Get the string value of this NodeId.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Session id assigned by the coordination service for the lifetime of a
/// connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub i64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
