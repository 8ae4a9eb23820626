// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! fl-core: Network resilience layer for the finlink client
//!
//! This crate provides the connectivity monitor, retry policy, durable
//! offline queue, response cache, and the request dispatcher that ties them
//! together for authenticated calls against the finance backend.

pub mod backoff;
pub mod cache;
pub mod connectivity;
pub mod dispatcher;
pub mod error;
pub mod probe;
pub mod queue;
pub mod request;
pub mod session;
pub mod storage;
pub mod transport;

#[cfg(test)]
mod test_helpers;

pub use backoff::{classify_status, next_step, ErrorClass, RetryPolicy, Step};
pub use cache::{CacheEntry, ResponseCache};
pub use connectivity::{
    ConnectivityMonitor, ConnectivityState, Reachability, Subscription, TransportType,
};
pub use dispatcher::{Dispatcher, DispatcherConfig, DrainReport, DrainStop, FetchSource, Fetched};
pub use error::{Error, Result};
pub use probe::ReachabilityProbe;
pub use queue::{OfflineQueue, PendingRequest};
pub use request::{Body, Method, QueuedWrite, Reply, RequestOptions, ResourceClass};
pub use session::{NoSession, Session};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
