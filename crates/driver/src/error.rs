// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the driver surface.

use crate::config::ConfigError;
use herd_coord::CoordError;
use herd_core::{PayloadTooLarge, RingFull};
use thiserror::Error;

/// Errors surfaced to the host.
///
/// Invariant violations never appear here; those abort the process.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("coordination error: {0}")]
    Coord(#[from] CoordError),
    #[error(transparent)]
    Payload(#[from] PayloadTooLarge),
    #[error(transparent)]
    RingFull(#[from] RingFull),
    #[error("not joined to the cluster")]
    NotJoined,
}
