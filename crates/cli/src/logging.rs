// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Log setup for the CLI process.

use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::env;

/// Filter directive for a `-v` count. `FINLINK_LOG` wins over both.
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info,fl_core=debug",
        _ => "debug",
    }
}

/// Installs the global subscriber. Call once per process. Logs go to
/// `log_file` when it can be opened, otherwise to stderr.
pub fn setup_logging(verbose: u8, log_file: Option<&Path>) {
    let directive = env::log_filter().unwrap_or_else(|| default_directive(verbose).to_string());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let file = log_file.and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
