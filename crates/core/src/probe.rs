// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reachability probe.
//!
//! Issues a GET against the backend's health endpoint to produce a fresh
//! [`ConnectivityState`], either once at startup or on an interval that
//! feeds the [`ConnectivityMonitor`] until cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::connectivity::{ConnectivityMonitor, ConnectivityState, Reachability, TransportType};
use crate::request::Method;
use crate::transport::{HttpRequest, Transport};

/// Default per-probe timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ReachabilityProbe {
    transport: Arc<dyn Transport>,
    url: String,
    timeout: Duration,
    transport_type: TransportType,
}

impl ReachabilityProbe {
    pub fn new(transport: Arc<dyn Transport>, url: impl Into<String>) -> Self {
        ReachabilityProbe {
            transport,
            url: url.into(),
            timeout: DEFAULT_PROBE_TIMEOUT,
            transport_type: TransportType::Unknown,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Link type to stamp on produced states, when the platform knows it.
    pub fn with_transport_type(mut self, transport_type: TransportType) -> Self {
        self.transport_type = transport_type;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Probes once.
    ///
    /// Any answer below 500 means the backend is reachable. A 5xx means the
    /// link works but the backend's health is unknown. No answer at all is
    /// offline.
    pub async fn check(&self) -> ConnectivityState {
        let request = HttpRequest {
            method: Method::Get,
            url: self.url.clone(),
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            body: None,
            timeout: self.timeout,
        };

        match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => {
                let reachable = if response.status < 500 {
                    Reachability::Yes
                } else {
                    tracing::warn!(url = %self.url, status = response.status, "health check failed");
                    Reachability::Unknown
                };
                ConnectivityState {
                    reachable,
                    ..ConnectivityState::online(self.transport_type)
                }
            }
            Ok(Err(e)) => {
                tracing::debug!(url = %self.url, error = %e, "health check unreachable");
                ConnectivityState::offline()
            }
            Err(_) => {
                tracing::debug!(url = %self.url, "health check timed out");
                ConnectivityState::offline()
            }
        }
    }

    /// Probes every `interval` and reports changes to `monitor` until
    /// `cancel` fires. The first probe runs immediately.
    pub async fn run(
        self,
        monitor: ConnectivityMonitor,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        tracing::info!(
            url = %self.url,
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "probe starting"
        );
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let state = self.check().await;
                    let current = monitor.current();
                    if state.is_online() != monitor.is_online() || state.reachable != current.reachable {
                        monitor.report(state);
                    }
                }
            }
        }
        tracing::debug!("probe stopped");
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
