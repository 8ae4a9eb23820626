// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test(start_paused = true)]
async fn gate_coalesces_same_token_within_window() {
    let gate = InvalidationGate::new(Duration::from_secs(2));
    assert!(gate.should_invalidate(Some("t1")));
    for _ in 0..4 {
        assert!(!gate.should_invalidate(Some("t1")));
    }
}

#[tokio::test(start_paused = true)]
async fn gate_reopens_after_window() {
    let gate = InvalidationGate::new(Duration::from_secs(2));
    assert!(gate.should_invalidate(Some("t1")));
    tokio::time::advance(Duration::from_secs(3)).await;
    assert!(gate.should_invalidate(Some("t1")));
}

#[tokio::test(start_paused = true)]
async fn gate_passes_new_session() {
    let gate = InvalidationGate::new(Duration::from_secs(2));
    assert!(gate.should_invalidate(Some("t1")));
    assert!(gate.should_invalidate(Some("t2")));
    assert!(!gate.should_invalidate(Some("t2")));
}

#[tokio::test(start_paused = true)]
async fn gate_coalesces_anonymous_requests() {
    let gate = InvalidationGate::default();
    assert!(gate.should_invalidate(None));
    assert!(!gate.should_invalidate(None));
}

#[tokio::test]
async fn no_session_has_no_token() {
    assert_eq!(NoSession.token().await, None);
    NoSession.invalidate();
}
