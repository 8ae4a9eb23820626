// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the reachability probe.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::test_helpers::{MockTransport, Scripted};
use std::sync::atomic::{AtomicUsize, Ordering};
use yare::parameterized;

fn probe(transport: &MockTransport) -> ReachabilityProbe {
    ReachabilityProbe::new(Arc::new(transport.clone()), "https://api.example.com/health")
}

#[parameterized(
    ok = { Scripted::ok(), true, Reachability::Yes },
    not_found_still_reachable = { Scripted::json(404, "{}"), true, Reachability::Yes },
    backend_down = { Scripted::json(503, "{}"), true, Reachability::Unknown },
    refused = { Scripted::refused(), false, Reachability::No },
)]
#[test_macro(tokio::test)]
async fn test_check(outcome: Scripted, connected: bool, reachable: Reachability) {
    let transport = MockTransport::new();
    transport.push(outcome);

    let state = probe(&transport).check().await;

    assert_eq!(state.connected, connected);
    assert_eq!(state.reachable, reachable);
}

#[tokio::test]
async fn test_check_sends_get_to_health_url() {
    let transport = MockTransport::new();
    probe(&transport).check().await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::Get);
    assert_eq!(sent[0].url, "https://api.example.com/health");
}

#[tokio::test(start_paused = true)]
async fn test_check_times_out_as_offline() {
    let transport = MockTransport::new();
    transport.push(Scripted::Hang);

    let state = probe(&transport)
        .with_timeout(Duration::from_secs(1))
        .check()
        .await;

    assert!(!state.is_online());
}

#[test]
fn test_transport_type_is_stamped() {
    let transport = MockTransport::new();
    let p = probe(&transport).with_transport_type(TransportType::Wifi);
    assert_eq!(p.transport_type, TransportType::Wifi);
    assert_eq!(p.url(), "https://api.example.com/health");
}

#[tokio::test(start_paused = true)]
async fn test_run_reports_transitions_until_cancelled() {
    let transport = MockTransport::new();
    transport.push(Scripted::refused());
    transport.push(Scripted::refused());
    // Script runs dry afterwards, so every later probe succeeds.

    let monitor = ConnectivityMonitor::new(ConnectivityState::online(TransportType::Wifi));
    let reconnects = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&reconnects);
    monitor.set_reconnect_handler(Arc::new(move || {
        r.fetch_add(1, Ordering::SeqCst);
    }));

    let cancel = CancellationToken::new();
    let task = tokio::spawn(probe(&transport).run(
        monitor.clone(),
        Duration::from_secs(10),
        cancel.clone(),
    ));

    tokio::time::sleep(Duration::from_secs(45)).await;
    cancel.cancel();
    task.await.unwrap();

    assert!(monitor.is_online());
    assert_eq!(reconnects.load(Ordering::SeqCst), 1);
    assert!(transport.sent_count() >= 4);
}
