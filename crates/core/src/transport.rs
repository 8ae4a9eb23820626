// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for HTTP calls.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP via reqwest for production
//! - Scripted transports for unit testing

use std::time::Duration;

use crate::request::Method;
use crate::session::BoxFuture;

/// Error type for transport operations. Every variant is a network-level
/// failure and classifies as transient.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// Connection could not be established (refused, DNS, TLS).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// No response within the deadline.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connection dropped mid-exchange.
    #[error("connection closed")]
    ConnectionClosed,

    /// Any other I/O failure while sending or reading.
    #[error("transport failure: {0}")]
    Other(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// An outgoing HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received HTTP response with its body fully read.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<String>) -> Self {
        HttpResponse {
            status,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }
}

/// Fetch-style primitive the dispatcher sends through.
///
/// Implementations should honor `request.timeout`, but the dispatcher also
/// enforces it by dropping the returned future.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, TransportResult<HttpResponse>>;
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("finlink/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(ReqwestTransport { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn map_error(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout)
    } else if err.is_connect() {
        TransportError::ConnectionFailed(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, TransportResult<HttpResponse>> {
        Box::pin(async move {
            let timeout = request.timeout;
            let mut builder = self
                .client
                .request(to_reqwest(request.method), &request.url)
                .timeout(timeout);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| map_error(e, timeout))?;
            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.map_err(|e| map_error(e, timeout))?;

            Ok(HttpResponse {
                status,
                content_type,
                body,
            })
        })
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
