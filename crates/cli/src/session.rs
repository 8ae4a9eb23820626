// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Token-file session for the CLI.
//!
//! The bearer token comes from `FINLINK_TOKEN` or a file holding just the
//! token. Invalidation deletes the file; an environment token cannot be
//! revoked from here and is only reported.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use fl_core::session::{BoxFuture, Session};

#[derive(Debug, Clone)]
pub struct TokenFileSession {
    path: PathBuf,
    env_token: Option<String>,
}

impl TokenFileSession {
    pub fn new(path: impl Into<PathBuf>, env_token: Option<String>) -> Self {
        TokenFileSession {
            path: path.into(),
            env_token,
        }
    }

    fn read_token(&self) -> Option<String> {
        if let Some(token) = &self.env_token {
            return Some(token.clone());
        }
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read token file");
                None
            }
        }
    }
}

impl Session for TokenFileSession {
    fn token(&self) -> BoxFuture<'_, Option<String>> {
        let token = self.read_token();
        Box::pin(async move { token })
    }

    fn invalidate(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::warn!(path = %self.path.display(), "session expired, token removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove token file")
            }
        }
        if self.env_token.is_some() {
            tracing::warn!("session expired; unset FINLINK_TOKEN and sign in again");
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
