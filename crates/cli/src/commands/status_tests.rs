// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fl_core::TransportType;
use yare::parameterized;

#[parameterized(
    offline = { ConnectivityState::offline(), "offline" },
    online = { ConnectivityState::online(TransportType::Wifi), "online" },
    unknown = { ConnectivityState::connected(TransportType::Cellular), "online (backend health unknown)" },
)]
fn test_describe(state: ConnectivityState, expected: &str) {
    assert_eq!(describe(&state), expected);
}

#[test]
fn test_describe_unreachable() {
    let state = ConnectivityState {
        reachable: Reachability::No,
        ..ConnectivityState::online(TransportType::Wifi)
    };
    assert_eq!(describe(&state), "connected, backend unreachable");
}
