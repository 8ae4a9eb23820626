// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session collaborator seam.
//!
//! The resilience layer reads the bearer token and, on a 401, asks the
//! session owner to invalidate. What invalidation means (clearing stored
//! credentials, sending the UI to a login screen) is the owner's business.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Boxed future returned by the collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Authentication state owned outside this crate.
pub trait Session: Send + Sync {
    /// Current bearer token, if signed in.
    fn token(&self) -> BoxFuture<'_, Option<String>>;

    /// Discards the session. Must be idempotent.
    fn invalidate(&self);
}

/// A session that is never signed in. Requests go out unauthenticated.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSession;

impl Session for NoSession {
    fn token(&self) -> BoxFuture<'_, Option<String>> {
        Box::pin(async { None })
    }

    fn invalidate(&self) {}
}

/// Default window in which repeated 401s for one session coalesce.
pub const DEFAULT_COALESCE_WINDOW: Duration = Duration::from_secs(2);

/// Deduplicates invalidation across concurrently failing requests.
///
/// A burst of 401s carrying the same token within the window results in a
/// single invalidation. A different token (a new sign-in) always passes.
#[derive(Debug)]
pub struct InvalidationGate {
    window: Duration,
    last: Mutex<Option<(Option<String>, Instant)>>,
}

impl InvalidationGate {
    pub fn new(window: Duration) -> Self {
        InvalidationGate {
            window,
            last: Mutex::new(None),
        }
    }

    /// Returns true if the caller should invalidate the session that issued
    /// `token`, recording the decision atomically.
    pub fn should_invalidate(&self, token: Option<&str>) -> bool {
        let now = Instant::now();
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((prev_token, at)) = last.as_ref() {
            if prev_token.as_deref() == token && now.duration_since(*at) < self.window {
                return false;
            }
        }
        *last = Some((token.map(str::to_string), now));
        true
    }
}

impl Default for InvalidationGate {
    fn default() -> Self {
        Self::new(DEFAULT_COALESCE_WINDOW)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
