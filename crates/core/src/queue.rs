// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queue for writes that could not reach the server.
//!
//! The whole queue is persisted as one JSON array under the
//! `pendingRequests` storage key and rewritten on every change. Each
//! read-modify-write runs under an async mutex, so concurrent enqueues from
//! parallel requests never lose one another's entry. On reconnect the
//! dispatcher replays entries in the order they were enqueued.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::request::{Method, ResourceClass};
use crate::storage::{load_json, store_json, Storage};

/// Storage key holding the persisted queue.
pub const QUEUE_KEY: &str = "pendingRequests";

/// A mutating request waiting for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub id: String,
    pub method: Method,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    pub resource_class: ResourceClass,
    pub enqueued_at: DateTime<Utc>,
}

impl PendingRequest {
    /// Creates an entry with a fresh id. GET requests are rejected because
    /// reads cannot be meaningfully deferred.
    pub fn new(
        method: Method,
        path: impl Into<String>,
        payload: Option<Value>,
        resource_class: ResourceClass,
    ) -> Result<Self> {
        if !method.is_mutating() {
            return Err(Error::InvalidInput(
                "GET requests cannot be queued for later delivery".to_string(),
            ));
        }
        Ok(PendingRequest {
            id: uuid::Uuid::new_v4().to_string(),
            method,
            path: path.into(),
            payload,
            resource_class,
            enqueued_at: Utc::now(),
        })
    }
}

/// On-disk record: the entry plus its replay attempt counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QueueRecord {
    #[serde(flatten)]
    request: PendingRequest,
    #[serde(default)]
    attempts: u32,
}

/// Durable FIFO of pending writes.
pub struct OfflineQueue {
    storage: Arc<dyn Storage>,
    lock: Mutex<()>,
}

impl OfflineQueue {
    /// Opens the queue, reading back any entries left by a previous run.
    pub fn open(storage: Arc<dyn Storage>) -> Result<Self> {
        let records = Self::read(storage.as_ref())?;
        if !records.is_empty() {
            tracing::info!(queue_len = records.len(), "restored pending requests");
        }
        Ok(OfflineQueue {
            storage,
            lock: Mutex::new(()),
        })
    }

    fn read(storage: &dyn Storage) -> Result<Vec<QueueRecord>> {
        load_json::<Vec<QueueRecord>>(storage, QUEUE_KEY)
            .map(Option::unwrap_or_default)
            .map_err(|e| match e {
                Error::Json(err) => Error::CorruptedData(format!("offline queue: {err}")),
                other => other,
            })
    }

    fn write(&self, records: &[QueueRecord]) -> Result<()> {
        if records.is_empty() {
            return self.storage.remove(QUEUE_KEY);
        }
        store_json(self.storage.as_ref(), QUEUE_KEY, &records)
    }

    /// Appends an entry and returns the new queue length.
    ///
    /// `enqueued_at` is clamped so it never precedes the current tail, which
    /// keeps the persisted sequence ordered by timestamp even if the wall
    /// clock steps backwards.
    pub async fn enqueue(&self, mut request: PendingRequest) -> Result<usize> {
        if !request.method.is_mutating() {
            return Err(Error::InvalidInput(
                "GET requests cannot be queued for later delivery".to_string(),
            ));
        }

        let _guard = self.lock.lock().await;
        let mut records = Self::read(self.storage.as_ref())?;

        if records.iter().any(|r| r.request.id == request.id) {
            return Err(Error::InvalidInput(format!(
                "pending request {} is already queued",
                request.id
            )));
        }
        if let Some(tail) = records.last() {
            if request.enqueued_at < tail.request.enqueued_at {
                request.enqueued_at = tail.request.enqueued_at;
            }
        }

        tracing::debug!(
            id = %request.id,
            method = %request.method,
            path = %request.path,
            resource = %request.resource_class,
            "enqueue pending request"
        );
        records.push(QueueRecord {
            request,
            attempts: 0,
        });
        self.write(&records)?;
        Ok(records.len())
    }

    /// Returns every pending entry in replay order.
    pub async fn peek_all(&self) -> Result<Vec<PendingRequest>> {
        let _guard = self.lock.lock().await;
        let records = Self::read(self.storage.as_ref())?;
        Ok(records.into_iter().map(|r| r.request).collect())
    }

    /// Removes the entry with the given id. Returns false if it was absent.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut records = Self::read(self.storage.as_ref())?;
        let before = records.len();
        records.retain(|r| r.request.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write(&records)?;
        Ok(true)
    }

    /// Number of pending entries.
    pub async fn size(&self) -> Result<usize> {
        let _guard = self.lock.lock().await;
        Ok(Self::read(self.storage.as_ref())?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.size().await? == 0)
    }

    /// Bumps the replay attempt counter of an entry, leaving it in place.
    /// Returns the new count, or `None` if the entry is gone.
    pub async fn record_attempt(&self, id: &str) -> Result<Option<u32>> {
        let _guard = self.lock.lock().await;
        let mut records = Self::read(self.storage.as_ref())?;
        let Some(record) = records.iter_mut().find(|r| r.request.id == id) else {
            return Ok(None);
        };
        record.attempts = record.attempts.saturating_add(1);
        let attempts = record.attempts;
        self.write(&records)?;
        Ok(Some(attempts))
    }

    /// Failed replay attempts recorded for an entry.
    pub async fn attempts(&self, id: &str) -> Result<Option<u32>> {
        let _guard = self.lock.lock().await;
        let records = Self::read(self.storage.as_ref())?;
        Ok(records
            .iter()
            .find(|r| r.request.id == id)
            .map(|r| r.attempts))
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
