// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! The variable name constants are generated by `build.rs` and live in the
//! [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Returns `FINLINK_BASE_URL` if set and non-empty.
pub fn base_url() -> Option<String> {
    non_empty(vars::FINLINK_BASE_URL)
}

/// Returns `FINLINK_TOKEN` if set and non-empty.
pub fn token() -> Option<String> {
    non_empty(vars::FINLINK_TOKEN)
}

/// Returns `FINLINK_DATA_DIR` if set and non-empty.
pub fn data_dir() -> Option<PathBuf> {
    non_empty(vars::FINLINK_DATA_DIR).map(PathBuf::from)
}

/// Returns `FINLINK_LOG` if set: a `tracing` filter directive.
pub fn log_filter() -> Option<String> {
    non_empty(vars::FINLINK_LOG)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
