// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    not_cached = { Error::NotCached("/summary".into()), "no cached entry for '/summary'" },
    not_queued = { Error::NotQueued("e1".into()), "no queued write with id 'e1'\n  hint: run `finlink queue list` to see queued ids" },
    config = { Error::Config("failed to parse config: bad".into()), "failed to parse config: bad" },
    session = { Error::Core(fl_core::Error::SessionExpired), "session expired\n  hint: sign in again to continue" },
    offline = { Error::Core(fl_core::Error::Offline), "device is offline" },
)]
fn test_display(err: Error, expected: &str) {
    assert_eq!(err.to_string(), expected);
}

#[test]
fn test_invalid_data_has_hint() {
    let msg = Error::InvalidData("expected value at line 1 column 1".into()).to_string();
    assert!(msg.starts_with("invalid JSON in --data"));
    assert!(msg.contains("hint: quote the payload"));
}
