// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity monitor.
//!
//! Platform glue (or the [`ReachabilityProbe`](crate::probe::ReachabilityProbe))
//! reports every network notification through [`ConnectivityMonitor::report`].
//! The monitor keeps the current state, fans it out to subscribers in the
//! reporting task, and fires the reconnect handler on each offline → online
//! edge of the *emitted* online flag, so repeated "online" notifications
//! collapse into one reconnect.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::Result;
use crate::storage::{load_json, store_json, Storage};

/// Storage key of the last reported state. Diagnostics only.
pub const LAST_STATE_KEY: &str = "connectivity_last";

/// Link type the OS reports for the active interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    Wifi,
    Cellular,
    Other,
    Unknown,
}

/// Whether the backend is known to be reachable over the current link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reachability {
    Yes,
    No,
    Unknown,
}

/// Point-in-time connectivity snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityState {
    pub connected: bool,
    pub transport_type: TransportType,
    pub reachable: Reachability,
    pub observed_at: DateTime<Utc>,
}

impl ConnectivityState {
    pub fn online(transport_type: TransportType) -> Self {
        ConnectivityState {
            connected: true,
            transport_type,
            reachable: Reachability::Yes,
            observed_at: Utc::now(),
        }
    }

    pub fn offline() -> Self {
        ConnectivityState {
            connected: false,
            transport_type: TransportType::Unknown,
            reachable: Reachability::No,
            observed_at: Utc::now(),
        }
    }

    /// Connected at the link layer with unknown reachability.
    pub fn connected(transport_type: TransportType) -> Self {
        ConnectivityState {
            reachable: Reachability::Unknown,
            ..Self::online(transport_type)
        }
    }

    /// A link is up and the backend is not known to be unreachable.
    pub fn is_online(&self) -> bool {
        self.connected && self.reachable != Reachability::No
    }
}

type Listener = Arc<dyn Fn(&ConnectivityState) + Send + Sync>;

/// Handler invoked once per offline → online transition.
pub type ReconnectHandler = Arc<dyn Fn() + Send + Sync>;

struct Inner {
    state: watch::Sender<ConnectivityState>,
    /// Last emitted online flag; transitions are computed against this.
    emitted_online: Mutex<bool>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
    reconnect: Mutex<Option<ReconnectHandler>>,
    storage: Option<Arc<dyn Storage>>,
}

/// Shared handle to the connectivity state. Cloning is cheap.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<Inner>,
}

/// Handle returned by [`ConnectivityMonitor::subscribe`].
#[must_use = "dropping a Subscription keeps the listener registered; call unsubscribe to remove it"]
pub struct Subscription {
    id: u64,
    inner: Weak<Inner>,
}

impl Subscription {
    /// Removes the listener. A no-op if the monitor is gone.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl ConnectivityMonitor {
    /// Creates a monitor seeded with a fresh read of the network.
    pub fn new(initial: ConnectivityState) -> Self {
        Self::build(initial, None)
    }

    /// Like [`new`](Self::new), and records every reported state under
    /// [`LAST_STATE_KEY`].
    pub fn with_storage(initial: ConnectivityState, storage: Arc<dyn Storage>) -> Self {
        Self::build(initial, Some(storage))
    }

    fn build(initial: ConnectivityState, storage: Option<Arc<dyn Storage>>) -> Self {
        let online = initial.is_online();
        let (state, _) = watch::channel(initial);
        ConnectivityMonitor {
            inner: Arc::new(Inner {
                state,
                emitted_online: Mutex::new(online),
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
                reconnect: Mutex::new(None),
                storage,
            }),
        }
    }

    /// Last persisted state, if any. Never treat this as ground truth.
    pub fn last_known(storage: &dyn Storage) -> Result<Option<ConnectivityState>> {
        load_json(storage, LAST_STATE_KEY)
    }

    pub fn current(&self) -> ConnectivityState {
        self.inner.state.borrow().clone()
    }

    pub fn is_online(&self) -> bool {
        *self
            .inner
            .emitted_online
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Receiver that observes every reported state.
    pub fn watch(&self) -> watch::Receiver<ConnectivityState> {
        self.inner.state.subscribe()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ConnectivityState) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Installs the reconnect handler, replacing any previous one.
    pub fn set_reconnect_handler(&self, handler: ReconnectHandler) {
        *self
            .inner
            .reconnect
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    /// Records a new state and notifies listeners before returning.
    pub fn report(&self, state: ConnectivityState) {
        let now_online = state.is_online();
        let reconnected = {
            let mut emitted = self
                .inner
                .emitted_online
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let was_online = std::mem::replace(&mut *emitted, now_online);
            self.inner.state.send_replace(state.clone());
            !was_online && now_online
        };

        tracing::debug!(
            connected = state.connected,
            transport = ?state.transport_type,
            reachable = ?state.reachable,
            "connectivity changed"
        );

        if let Some(storage) = &self.inner.storage {
            if let Err(e) = store_json(storage.as_ref(), LAST_STATE_KEY, &state) {
                tracing::warn!(error = %e, "failed to persist connectivity state");
            }
        }

        // Listeners run without any monitor lock held so they may call back in.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(&state);
        }

        if reconnected {
            tracing::info!("connectivity restored");
            let handler = self
                .inner
                .reconnect
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            if let Some(handler) = handler {
                handler();
            }
        }
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
