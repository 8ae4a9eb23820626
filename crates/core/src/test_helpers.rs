// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers: pending-request builders, a scripted transport,
//! and a session that records invalidations.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::queue::PendingRequest;
use crate::request::{Method, ResourceClass};
use crate::session::{BoxFuture, Session};
use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError, TransportResult};

/// Create a pending request for the given method and path.
pub fn make_pending(method: Method, path: &str) -> PendingRequest {
    PendingRequest::new(method, path, None, ResourceClass::from_path(path)).unwrap()
}

/// One scripted transport outcome.
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(HttpResponse),
    Fail(TransportError),
    /// Never completes; exercises the dispatcher's timeout.
    Hang,
}

impl Scripted {
    pub fn json(status: u16, body: &str) -> Self {
        Scripted::Respond(HttpResponse::new(status, Some("application/json"), body))
    }

    pub fn ok() -> Self {
        Scripted::json(200, r#"{"success":true}"#)
    }

    pub fn refused() -> Self {
        Scripted::Fail(TransportError::ConnectionFailed("connection refused".into()))
    }
}

/// Transport that replays scripted outcomes and records every request.
///
/// When the script runs dry it answers `200 {"success":true}`.
#[derive(Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    sent: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, outcome: Scripted) {
        self.script.lock().unwrap().push_back(outcome);
    }

    pub fn push_many(&self, outcome: Scripted, count: usize) {
        for _ in 0..count {
            self.push(outcome.clone());
        }
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, TransportResult<HttpResponse>> {
        self.sent.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        Box::pin(async move {
            match next.unwrap_or_else(Scripted::ok) {
                Scripted::Respond(response) => Ok(response),
                Scripted::Fail(err) => Err(err),
                Scripted::Hang => {
                    tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                    Err(TransportError::ConnectionClosed)
                }
            }
        })
    }
}

/// Session with a fixed token that counts invalidations.
#[derive(Default)]
pub struct RecordingSession {
    token: Mutex<Option<String>>,
    invalidations: AtomicUsize,
}

impl RecordingSession {
    pub fn with_token(token: &str) -> Self {
        RecordingSession {
            token: Mutex::new(Some(token.to_string())),
            invalidations: AtomicUsize::new(0),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn set_token(&self, token: Option<&str>) {
        *self.token.lock().unwrap() = token.map(str::to_string);
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

impl Session for RecordingSession {
    fn token(&self) -> BoxFuture<'_, Option<String>> {
        let token = self.token.lock().unwrap().clone();
        Box::pin(async move { token })
    }

    fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}
