// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use fl_core::{Method, ResourceClass};

fn entry() -> PendingRequest {
    let mut request = PendingRequest::new(
        Method::Post,
        "/budgets",
        None,
        ResourceClass::Budget,
    )
    .unwrap();
    request.id = "e1".to_string();
    request.enqueued_at = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
    request
}

#[test]
fn test_format_entry() {
    assert_eq!(
        format_entry(&entry(), 0),
        "2026-03-01 09:30:00 POST   /budgets [budget] (e1)"
    );
}

#[test]
fn test_format_entry_with_attempts() {
    assert!(format_entry(&entry(), 2).ends_with(" attempts=2"));
}

#[test]
fn test_format_report() {
    let done = DrainReport {
        delivered: 3,
        ..DrainReport::default()
    };
    assert_eq!(format_report(&done), "Delivered 3, 0 remaining");

    let offline = DrainReport {
        remaining: 2,
        stopped: Some(DrainStop::Offline),
        ..DrainReport::default()
    };
    assert_eq!(
        format_report(&offline),
        "Delivered 0, 2 remaining (offline)"
    );

    let failed = DrainReport {
        delivered: 1,
        remaining: 1,
        stopped: Some(DrainStop::Failed {
            id: "e2".to_string(),
            error: "server error (500): boom".to_string(),
        }),
    };
    assert_eq!(
        format_report(&failed),
        "Delivered 1, 1 remaining (stopped at e2: server error (500): boom)"
    );
}
