// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! herd-driver: cluster membership and event ordering over a coordination
//! service.
//!
//! The driver turns the service's primitives (ephemeral and sequential
//! nodes, one-shot watches, sessions) into a globally ordered event log, a
//! join-serializing lock, crash detection fed by session expiry, and a
//! two-phase block/unblock protocol for events that need master-side or
//! originator-side work before cluster-wide commit.
//!
//! The host polls the driver's wake handle and calls
//! [`ClusterDriver::dispatch`] once per signal; membership changes and
//! notifications come back through its [`ClusterHandler`] in the same
//! order on every node.

mod macros;

pub mod config;
mod dispatch;
pub mod driver;
pub mod error;
pub mod handler;
mod lock;
mod queue;
mod registry;
pub mod wake;
mod watch;
mod worker;

pub use config::{Config, ConfigError};
pub use driver::ClusterDriver;
pub use error::DriverError;
pub use handler::{BlockCallback, ClusterHandler};
pub use wake::Wake;
