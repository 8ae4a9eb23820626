// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors surfaced by the finlink CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] fl_core::Error),

    #[error("{0}")]
    Config(String),

    #[error("config file not found: {0}\n  hint: pass an existing file to --config or drop the flag")]
    ConfigNotFound(String),

    #[error("invalid JSON in --data: {0}\n  hint: quote the payload, e.g. --data '{{\"amount\": 12.5}}'")]
    InvalidData(String),

    #[error("no cached entry for '{0}'")]
    NotCached(String),

    #[error("no queued write with id '{0}'\n  hint: run `finlink queue list` to see queued ids")]
    NotQueued(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for finlink CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
