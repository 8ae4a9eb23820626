// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request dispatcher.
//!
//! Orchestrates every call to the backend:
//! - Attaches the session's bearer token
//! - Enforces a per-call timeout
//! - Retries transient and server failures with linear backoff
//! - Captures mutating requests in the offline queue when the network is gone
//! - Keeps the response cache current and serves it for offline reads
//! - Drains the queue, in order, whenever connectivity comes back
//!
//! The dispatcher owns no persisted state of its own; the queue and cache
//! serialize their own read-modify-write sequences, so any number of calls
//! may be in flight at once.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::backoff::{classify_status, next_step, ErrorClass, RetryPolicy, Step};
use crate::cache::ResponseCache;
use crate::connectivity::ConnectivityMonitor;
use crate::error::{Error, Result};
use crate::queue::{OfflineQueue, PendingRequest};
use crate::request::{Body, Method, QueuedWrite, Reply, RequestOptions, ResourceClass};
use crate::session::{InvalidationGate, Session, DEFAULT_COALESCE_WINDOW};
use crate::storage::Storage;
use crate::transport::{HttpRequest, Transport, TransportError};

/// Default hard timeout for a single attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Base URL every request path is appended to.
    pub base_url: Url,
    /// Per-attempt timeout unless a request overrides it.
    pub timeout: Duration,
    /// Retry and backoff policy.
    pub retry: RetryPolicy,
    /// Window in which 401s for one session collapse into one invalidation.
    pub coalesce_window: Duration,
}

impl DispatcherConfig {
    /// Validates `base_url` (http or https) and applies defaults.
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| Error::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        Ok(DispatcherConfig {
            base_url: parsed,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            coalesce_window: DEFAULT_COALESCE_WINDOW,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_coalesce_window(mut self, window: Duration) -> Self {
        self.coalesce_window = window;
        self
    }

    /// Absolute URL for a request path.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        if path.is_empty() {
            base.to_string()
        } else if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

/// Where a [`Dispatcher::read_through`] value came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FetchSource {
    /// Fresh from the network; the cache now holds it.
    Network,
    /// Served from cache without touching the network.
    Offline { stored_at: DateTime<Utc> },
    /// The fetch failed and a cached copy was served instead.
    Fallback {
        stored_at: DateTime<Utc>,
        error: String,
    },
}

/// Result of a read-through lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched {
    pub value: Value,
    #[serde(flatten)]
    pub source: FetchSource,
}

impl Fetched {
    pub fn is_stale(&self) -> bool {
        !matches!(self.source, FetchSource::Network)
    }
}

/// Why a drain ended before the queue was empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DrainStop {
    /// Connectivity dropped mid-drain.
    Offline,
    /// An entry failed again and stays at the head of the queue.
    Failed { id: String, error: String },
}

/// Outcome of one queue drain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Entries the server acknowledged.
    pub delivered: usize,
    /// Entries still queued after the drain.
    pub remaining: usize,
    pub stopped: Option<DrainStop>,
}

/// How a pipeline run ended.
enum Outcome {
    Delivered(Body),
    /// A mutating request that should be captured for later delivery.
    Deferred(Error),
}

struct Inner {
    config: DispatcherConfig,
    transport: Arc<dyn Transport>,
    session: Arc<dyn Session>,
    monitor: ConnectivityMonitor,
    queue: OfflineQueue,
    cache: ResponseCache,
    gate: InvalidationGate,
    /// One drain at a time.
    drain_lock: tokio::sync::Mutex<()>,
    worker_started: AtomicBool,
}

/// Entry point for all backend traffic. Cloning is cheap and clones share
/// state.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Builds a dispatcher over `storage`.
    ///
    /// The queue is read back from storage here; a corrupt queue fails
    /// construction rather than being silently discarded.
    ///
    /// Reconnects drain the queue only once
    /// [`spawn_reconnect_worker`](Self::spawn_reconnect_worker) has been
    /// called. Until then the queue is delivered by explicit
    /// [`drain_queue`](Self::drain_queue) calls.
    pub fn new(
        config: DispatcherConfig,
        transport: Arc<dyn Transport>,
        session: Arc<dyn Session>,
        monitor: ConnectivityMonitor,
        storage: Arc<dyn Storage>,
    ) -> Result<Self> {
        let queue = OfflineQueue::open(Arc::clone(&storage))?;
        let cache = ResponseCache::new(storage);
        let gate = InvalidationGate::new(config.coalesce_window);

        Ok(Dispatcher {
            inner: Arc::new(Inner {
                config,
                transport,
                session,
                monitor,
                queue,
                cache,
                gate,
                drain_lock: tokio::sync::Mutex::new(()),
                worker_started: AtomicBool::new(false),
            }),
        })
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.inner.config
    }

    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.inner.monitor
    }

    pub fn queue(&self) -> &OfflineQueue {
        &self.inner.queue
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    /// Number of writes awaiting delivery.
    pub async fn queue_size(&self) -> Result<usize> {
        self.inner.queue.size().await
    }

    /// Drops every cached response.
    pub async fn clear_cache(&self) -> Result<()> {
        self.inner.cache.clear().await.map(|_| ())
    }

    /// Issues a request through the full pipeline.
    ///
    /// A mutating request that cannot reach the server (offline, or
    /// transient failures exhausted) resolves to [`Reply::Queued`] instead
    /// of failing. A GET in the same situation fails.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<Reply> {
        let request_id = uuid::Uuid::new_v4().simple().to_string();

        match self
            .run(&request_id, method, path, body.as_ref(), &options)
            .await?
        {
            Outcome::Delivered(parsed) => {
                if let Some(key) = &options.cache_key {
                    self.store_cached(key, parsed.clone().into_value()).await;
                }
                Ok(Reply::Delivered(parsed))
            }
            Outcome::Deferred(err) => {
                let class = options
                    .resource_class
                    .unwrap_or_else(|| ResourceClass::from_path(path));
                let pending = PendingRequest::new(method, path, body, class)?;
                let id = pending.id.clone();
                let enqueued_at = pending.enqueued_at;
                let queue_len = self.inner.queue.enqueue(pending).await?;
                tracing::info!(
                    request_id = %request_id,
                    %method,
                    path,
                    queue_len,
                    reason = %err,
                    "write queued for later delivery"
                );
                Ok(Reply::Queued(QueuedWrite {
                    id,
                    enqueued_at,
                    queue_len,
                }))
            }
        }
    }

    /// Offline-first read of `key`.
    ///
    /// Offline with a cached entry: the cache is returned and `fetch` is
    /// never called. Otherwise `fetch` runs; success refreshes the cache,
    /// failure falls back to the cached entry when there is one.
    /// `SessionExpired` is never masked by a cached value.
    pub async fn read_through<F, Fut>(&self, key: &str, fetch: F) -> Result<Fetched>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if !self.inner.monitor.is_online() {
            if let Some(entry) = self.inner.cache.get(key).await? {
                tracing::debug!(key, "offline, serving cached value");
                return Ok(Fetched {
                    value: entry.payload,
                    source: FetchSource::Offline {
                        stored_at: entry.stored_at,
                    },
                });
            }
        }

        match fetch().await {
            Ok(value) => {
                self.store_cached(key, value.clone()).await;
                Ok(Fetched {
                    value,
                    source: FetchSource::Network,
                })
            }
            Err(Error::SessionExpired) => Err(Error::SessionExpired),
            Err(err) => match self.inner.cache.get(key).await? {
                Some(entry) => {
                    tracing::warn!(key, error = %err, "fetch failed, serving cached value");
                    Ok(Fetched {
                        value: entry.payload,
                        source: FetchSource::Fallback {
                            stored_at: entry.stored_at,
                            error: err.to_string(),
                        },
                    })
                }
                None => Err(err),
            },
        }
    }

    /// Read-through GET of `path`, cached under the path itself.
    pub async fn get(&self, path: &str) -> Result<Fetched> {
        self.read_through(path, move || async move {
            let reply = self
                .request(Method::Get, path, None, RequestOptions::default())
                .await?;
            Ok(reply.into_body().map(Body::into_value).unwrap_or(Value::Null))
        })
        .await
    }

    /// Replays the offline queue in order.
    ///
    /// Each acknowledged entry is removed before the next is sent. Any
    /// failure, a 4xx included, leaves the entry at the head of the queue and
    /// ends the drain, so later writes never overtake it. Discarding an entry
    /// the server will never accept is left to the caller
    /// ([`OfflineQueue::remove`]).
    pub async fn drain_queue(&self) -> Result<DrainReport> {
        let _guard = self.inner.drain_lock.lock().await;
        let queue = &self.inner.queue;
        let pending = queue.peek_all().await?;
        let mut report = DrainReport::default();

        if !pending.is_empty() {
            tracing::info!(count = pending.len(), "draining offline queue");
        }

        for entry in pending {
            if !self.inner.monitor.is_online() {
                report.stopped = Some(DrainStop::Offline);
                break;
            }

            match self.replay(&entry).await {
                Ok(()) => {
                    queue.remove(&entry.id).await?;
                    report.delivered += 1;
                }
                Err(err) => {
                    let attempts = queue.record_attempt(&entry.id).await?;
                    tracing::warn!(
                        id = %entry.id,
                        method = %entry.method,
                        path = %entry.path,
                        attempts,
                        error = %err,
                        "replay failed, stopping drain"
                    );
                    report.stopped = Some(if err.is_network() && !self.inner.monitor.is_online() {
                        DrainStop::Offline
                    } else {
                        DrainStop::Failed {
                            id: entry.id.clone(),
                            error: err.to_string(),
                        }
                    });
                    break;
                }
            }
        }

        report.remaining = queue.size().await?;
        tracing::debug!(
            delivered = report.delivered,
            remaining = report.remaining,
            "drain finished"
        );
        Ok(report)
    }

    /// Runs queue drains in response to reconnect notifications until
    /// `cancel` fires. Signals that arrive during a drain collapse into one
    /// follow-up drain.
    ///
    /// Registers the dispatcher as the monitor's reconnect handler. Only one
    /// worker may be spawned per dispatcher.
    pub fn spawn_reconnect_worker(&self, cancel: CancellationToken) -> Result<JoinHandle<()>> {
        if self.inner.worker_started.swap(true, Ordering::SeqCst) {
            return Err(Error::InvalidInput(
                "reconnect worker already running".to_string(),
            ));
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        self.inner.monitor.set_reconnect_handler(Arc::new(move || {
            // A closed channel means the worker has stopped.
            let _ = tx.send(());
        }));

        let dispatcher = self.clone();
        Ok(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    signal = rx.recv() => {
                        if signal.is_none() {
                            break;
                        }
                        while rx.try_recv().is_ok() {}
                        match dispatcher.drain_queue().await {
                            Ok(report) => tracing::debug!(?report, "reconnect drain complete"),
                            Err(e) => tracing::warn!(error = %e, "reconnect drain failed"),
                        }
                    }
                }
            }
            tracing::debug!("reconnect worker stopped");
        }))
    }

    async fn replay(&self, entry: &PendingRequest) -> Result<()> {
        let request_id = uuid::Uuid::new_v4().simple().to_string();
        let options = RequestOptions::default().resource_class(entry.resource_class);
        match self
            .run(
                &request_id,
                entry.method,
                &entry.path,
                entry.payload.as_ref(),
                &options,
            )
            .await?
        {
            Outcome::Delivered(_) => Ok(()),
            Outcome::Deferred(err) => Err(err),
        }
    }

    /// The retry state machine: attempt, classify, then retry, defer,
    /// invalidate, or fail as [`next_step`] decides.
    async fn run(
        &self,
        request_id: &str,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<Outcome> {
        let config = &self.inner.config;
        let policy = match options.max_attempts {
            Some(n) => config.retry.with_max_attempts(n),
            None => config.retry,
        };
        let timeout = options.timeout.unwrap_or(config.timeout);
        let payload = body.map(serde_json::to_string).transpose()?;
        let url = config.endpoint(path);

        let mut attempt = 1;
        loop {
            let token = if options.skip_auth {
                None
            } else {
                self.inner.session.token().await
            };

            let result = if self.inner.monitor.is_online() {
                self.attempt(request_id, method, &url, payload.as_deref(), token.as_deref(), timeout)
                    .await
            } else {
                Err(Error::Offline)
            };

            let err = match result {
                Ok(parsed) => {
                    tracing::debug!(request_id, %method, path, attempt, "request succeeded");
                    return Ok(Outcome::Delivered(parsed));
                }
                Err(err) => err,
            };

            let class = err.class();
            let online = self.inner.monitor.is_online();
            match next_step(&policy, attempt, class, online, method.is_mutating()) {
                Step::Retry(delay) => {
                    tracing::debug!(
                        request_id,
                        %method,
                        path,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "retrying"
                    );
                    self.backoff(delay).await;
                    attempt += 1;
                }
                Step::Queue => return Ok(Outcome::Deferred(err)),
                Step::InvalidateSession if options.skip_auth => {
                    // No credentials were sent, so there is no session to end.
                    return Err(Error::Client {
                        status: 401,
                        message: "unauthorized".to_string(),
                    });
                }
                Step::InvalidateSession => {
                    if self.inner.gate.should_invalidate(token.as_deref()) {
                        tracing::warn!(request_id, %method, path, "session rejected, invalidating");
                        self.inner.session.invalidate();
                    }
                    return Err(Error::SessionExpired);
                }
                Step::Fail => {
                    tracing::debug!(request_id, %method, path, attempt, error = %err, "request failed");
                    return Err(err);
                }
            }
        }
    }

    /// One network attempt with a hard deadline.
    async fn attempt(
        &self,
        request_id: &str,
        method: Method,
        url: &str,
        payload: Option<&str>,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<Body> {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("X-Request-Id".to_string(), request_id.to_string()),
        ];
        if payload.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        let request = HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body: payload.map(str::to_string),
            timeout,
        };

        let response = match tokio::time::timeout(timeout, self.inner.transport.send(request)).await {
            Ok(result) => result?,
            Err(_) => return Err(TransportError::Timeout(timeout).into()),
        };

        let status = response.status;
        let parsed = Body::parse(response.content_type.as_deref(), response.body);
        match classify_status(status) {
            None => match parsed.envelope_failure() {
                Some(message) => Err(Error::Client { status, message }),
                None => Ok(parsed),
            },
            Some(ErrorClass::Unauthorized) => Err(Error::SessionExpired),
            Some(ErrorClass::ServerError) => Err(Error::Server {
                status,
                message: failure_message(&parsed, status),
            }),
            Some(ErrorClass::ClientError | ErrorClass::Transient) => Err(Error::Client {
                status,
                message: failure_message(&parsed, status),
            }),
        }
    }

    /// Sleeps for `delay`, returning early if connectivity drops.
    async fn backoff(&self, delay: Duration) {
        let mut rx = self.inner.monitor.watch();
        let went_offline = async move {
            loop {
                let online = rx.borrow_and_update().is_online();
                if !online {
                    return;
                }
                if rx.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = went_offline => tracing::debug!("connectivity lost during backoff"),
        }
    }

    async fn store_cached(&self, key: &str, value: Value) {
        if let Err(e) = self.inner.cache.set(key, value).await {
            tracing::warn!(key, error = %e, "failed to update response cache");
        }
    }
}

fn failure_message(body: &Body, status: u16) -> String {
    body.message().unwrap_or_else(|| format!("HTTP {status}"))
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
