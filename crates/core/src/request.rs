// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request-side vocabulary shared by the dispatcher, queue, and callers.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// HTTP methods the layer issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Mutating methods are eligible for the offline queue; GET never is.
    pub fn is_mutating(self) -> bool {
        !matches!(self, Method::Get)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(Error::InvalidInput(format!(
                "invalid method: '{s}'\n  hint: valid methods are: GET, POST, PUT, DELETE"
            ))),
        }
    }
}

/// The kind of record a queued write touches. Diagnostics only; it never
/// influences ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    Transaction,
    Budget,
    Goal,
    Other,
}

impl ResourceClass {
    /// Infers the class from the first meaningful path segment, e.g.
    /// `/api/budgets/7` is a budget.
    pub fn from_path(path: &str) -> Self {
        let segment = path
            .split(['/', '?'])
            .filter(|s| !s.is_empty())
            .find(|s| !s.eq_ignore_ascii_case("api") && !is_version_segment(s));

        match segment.map(str::to_ascii_lowercase).as_deref() {
            Some("transactions" | "transaction") => ResourceClass::Transaction,
            Some("budgets" | "budget") => ResourceClass::Budget,
            Some("goals" | "goal") => ResourceClass::Goal,
            _ => ResourceClass::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceClass::Transaction => "transaction",
            ResourceClass::Budget => "budget",
            ResourceClass::Goal => "goal",
            ResourceClass::Other => "other",
        }
    }
}

fn is_version_segment(s: &str) -> bool {
    s.len() > 1 && s.starts_with('v') && s[1..].chars().all(|c| c.is_ascii_digit())
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call knobs for [`Dispatcher::request`](crate::Dispatcher::request).
///
/// Unset fields fall back to the dispatcher configuration.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
    pub max_attempts: Option<u32>,
    pub skip_auth: bool,
    /// Store a successful GET response in the cache under this key.
    pub cache_key: Option<String>,
    /// Overrides the class inferred from the path for queued writes.
    pub resource_class: Option<ResourceClass>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    pub fn resource_class(mut self, class: ResourceClass) -> Self {
        self.resource_class = Some(class);
        self
    }
}

/// A parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    /// Parses by declared content type. JSON that fails to parse is kept as
    /// text rather than failing the request.
    pub fn parse(content_type: Option<&str>, raw: String) -> Body {
        let is_json = content_type
            .map(|ct| {
                let mime = ct.split(';').next().unwrap_or("").trim();
                mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
            })
            .unwrap_or(false);

        if !is_json {
            return Body::Text(raw);
        }
        if raw.trim().is_empty() {
            return Body::Json(Value::Null);
        }
        match serde_json::from_str(&raw) {
            Ok(value) => Body::Json(value),
            Err(e) => {
                tracing::debug!(error = %e, "response declared JSON but did not parse");
                Body::Text(raw)
            }
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(v) => Some(v),
            Body::Text(_) => None,
        }
    }

    /// Converts to the JSON form stored in the cache.
    pub fn into_value(self) -> Value {
        match self {
            Body::Json(v) => v,
            Body::Text(s) => Value::String(s),
        }
    }

    /// Returns the failure message when the backend envelope reports
    /// `success: false`.
    pub fn envelope_failure(&self) -> Option<String> {
        let obj = self.as_json()?.as_object()?;
        match obj.get("success") {
            Some(Value::Bool(false)) => {
                Some(self.message().unwrap_or_else(|| "request failed".to_string()))
            }
            _ => None,
        }
    }

    /// Human-readable message carried by the body, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            Body::Json(Value::Object(obj)) => ["message", "error"]
                .iter()
                .find_map(|k| obj.get(*k).and_then(Value::as_str))
                .map(str::to_string),
            Body::Json(_) => None,
            Body::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }
}

/// Receipt for a write captured in the offline queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedWrite {
    pub id: String,
    pub enqueued_at: DateTime<Utc>,
    pub queue_len: usize,
}

/// Successful outcome of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The server acknowledged the request.
    Delivered(Body),
    /// The write was stored for later delivery; the server has not seen it.
    Queued(QueuedWrite),
}

impl Reply {
    pub fn is_queued(&self) -> bool {
        matches!(self, Reply::Queued(_))
    }

    pub fn body(&self) -> Option<&Body> {
        match self {
            Reply::Delivered(body) => Some(body),
            Reply::Queued(_) => None,
        }
    }

    pub fn into_body(self) -> Option<Body> {
        match self {
            Reply::Delivered(body) => Some(body),
            Reply::Queued(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
