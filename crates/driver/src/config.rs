// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver configuration: the coordination-service endpoint list.

use thiserror::Error;

/// Errors from parsing a configuration string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no coordination-service endpoints given")]
    Empty,
    #[error("invalid endpoint '{0}': expected host:port")]
    InvalidEndpoint(String),
}

/// Parsed driver configuration.
///
/// The input is a comma-separated list of `host:port` endpoints, one per
/// coordination-service server. Paths and the session timeout are fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    endpoints: Vec<String>,
}

impl Config {
    /// Parse a comma-separated endpoint list.
    pub fn parse(option: &str) -> Result<Self, ConfigError> {
        let mut endpoints = Vec::new();
        for part in option.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let valid = part
                .rsplit_once(':')
                .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
            if !valid {
                return Err(ConfigError::InvalidEndpoint(part.to_string()));
            }
            endpoints.push(part.to_string());
        }
        if endpoints.is_empty() {
            return Err(ConfigError::Empty);
        }
        Ok(Self { endpoints })
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
