// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end offline capture, restart, and reconnect replay against
//! on-disk storage.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fl_core::session::BoxFuture;
use fl_core::transport::TransportResult;
use fl_core::{
    ConnectivityMonitor, ConnectivityState, Dispatcher, DispatcherConfig, FetchSource,
    FileStorage, HttpRequest, HttpResponse, Method, NoSession, RequestOptions, Transport,
    TransportType,
};
use serde_json::{json, Value};
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

/// Acknowledges everything and remembers what it saw.
#[derive(Clone, Default)]
struct Backend {
    received: Arc<Mutex<Vec<(Method, String, Option<Value>)>>>,
}

impl Transport for Backend {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, TransportResult<HttpResponse>> {
        let body = request
            .body
            .as_deref()
            .map(|b| serde_json::from_str(b).unwrap());
        self.received
            .lock()
            .unwrap()
            .push((request.method, request.url.clone(), body));
        Box::pin(async {
            Ok(HttpResponse::new(
                200,
                Some("application/json"),
                r#"{"success":true,"data":{"goals":["Emergency fund"]}}"#,
            ))
        })
    }
}

fn dispatcher(dir: &Path, backend: &Backend, online: bool) -> Dispatcher {
    let initial = if online {
        ConnectivityState::online(TransportType::Wifi)
    } else {
        ConnectivityState::offline()
    };
    Dispatcher::new(
        DispatcherConfig::new("https://api.example.com").unwrap(),
        Arc::new(backend.clone()),
        Arc::new(NoSession),
        ConnectivityMonitor::new(initial),
        Arc::new(FileStorage::open(dir).unwrap()),
    )
    .unwrap()
}

#[tokio::test]
async fn offline_writes_survive_restart_and_replay_in_order() {
    let dir = tempdir().unwrap();
    let backend = Backend::default();

    // Session 1: online long enough to cache a read, then the network goes.
    {
        let d = dispatcher(dir.path(), &backend, true);
        let fetched = d.get("/goals").await.unwrap();
        assert_eq!(fetched.source, FetchSource::Network);

        d.monitor().report(ConnectivityState::offline());
        let writes = [
            (Method::Post, "/budgets", Some(json!({"name": "Groceries", "limit": 400}))),
            (Method::Post, "/transactions", Some(json!({"budget": "Groceries", "amount": 52.1}))),
            (Method::Delete, "/goals/11", None),
        ];
        for (method, path, body) in writes {
            let reply = d
                .request(method, path, body, RequestOptions::default())
                .await
                .unwrap();
            assert!(reply.is_queued());
        }
        assert_eq!(d.queue_size().await.unwrap(), 3);
    }
    assert_eq!(backend.received.lock().unwrap().len(), 1);

    // Session 2: cold start offline; reads come from the cache.
    let d = dispatcher(dir.path(), &backend, false);
    assert_eq!(d.queue_size().await.unwrap(), 3);
    let cached = d.get("/goals").await.unwrap();
    assert!(matches!(cached.source, FetchSource::Offline { .. }));
    assert_eq!(cached.value["data"]["goals"][0], json!("Emergency fund"));

    let cancel = CancellationToken::new();
    let worker = d.spawn_reconnect_worker(cancel.clone()).unwrap();
    d.monitor()
        .report(ConnectivityState::online(TransportType::Cellular));

    tokio::time::timeout(Duration::from_secs(5), async {
        while d.queue_size().await.unwrap() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("queue drained after reconnect");
    cancel.cancel();
    worker.await.unwrap();

    let received = backend.received.lock().unwrap().clone();
    let replayed: Vec<(Method, &str)> = received[1..]
        .iter()
        .map(|(m, url, _)| (*m, url.as_str()))
        .collect();
    assert_eq!(
        replayed,
        vec![
            (Method::Post, "https://api.example.com/budgets"),
            (Method::Post, "https://api.example.com/transactions"),
            (Method::Delete, "https://api.example.com/goals/11"),
        ]
    );
    assert_eq!(
        received[2].2,
        Some(json!({"budget": "Groceries", "amount": 52.1}))
    );
}

#[tokio::test]
async fn clearing_cache_forces_network_read() {
    let dir = tempdir().unwrap();
    let backend = Backend::default();
    let d = dispatcher(dir.path(), &backend, true);

    d.get("/summary").await.unwrap();
    d.clear_cache().await.unwrap();
    d.monitor().report(ConnectivityState::offline());

    assert!(d.get("/summary").await.is_err());
    assert_eq!(backend.received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn long_filtered_read_is_served_offline() {
    let dir = tempdir().unwrap();
    let backend = Backend::default();
    let path = format!(
        "/transactions?{}",
        (0..12)
            .map(|i| format!("category=groceries-{i}"))
            .collect::<Vec<_>>()
            .join("&")
    );
    assert!(path.len() > 200);

    {
        let d = dispatcher(dir.path(), &backend, true);
        let fetched = d.get(&path).await.unwrap();
        assert_eq!(fetched.source, FetchSource::Network);
        assert_eq!(d.cache().keys().await.unwrap(), vec![path.clone()]);
    }

    let d = dispatcher(dir.path(), &backend, false);
    let cached = d.get(&path).await.unwrap();
    assert!(matches!(cached.source, FetchSource::Offline { .. }));
    assert_eq!(cached.value["data"]["goals"][0], json!("Emergency fund"));
    assert_eq!(backend.received.lock().unwrap().len(), 1);
}
