// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;

use fl_core::{ConnectivityMonitor, ConnectivityState, Reachability};

use crate::cli::OutputFormat;
use crate::error::Result;

use super::{print_json, Context};

#[derive(Serialize)]
struct StatusJson<'a> {
    base_url: &'a str,
    current: &'a ConnectivityState,
    last_known: Option<&'a ConnectivityState>,
    queued: usize,
}

/// Reports the probed state, records it, and shows what was last seen.
pub async fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let last_known = ConnectivityMonitor::last_known(ctx.storage.as_ref())?;
    let current = ctx.dispatcher.monitor().current();
    ctx.dispatcher.monitor().report(current.clone());
    let queued = ctx.dispatcher.queue_size().await?;

    match output {
        OutputFormat::Json => print_json(&StatusJson {
            base_url: &ctx.config.base_url,
            current: &current,
            last_known: last_known.as_ref(),
            queued,
        }),
        OutputFormat::Text => {
            println!("Backend:    {}", ctx.config.base_url);
            println!("Health:     {}", ctx.probe.url());
            println!("Status:     {}", describe(&current));
            if let Some(last) = &last_known {
                println!(
                    "Last seen:  {} at {}",
                    describe(last),
                    last.observed_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
            println!("Queued:     {queued}");
            Ok(())
        }
    }
}

pub fn describe(state: &ConnectivityState) -> &'static str {
    match (state.connected, state.reachable) {
        (false, _) => "offline",
        (true, Reachability::Yes) => "online",
        (true, Reachability::Unknown) => "online (backend health unknown)",
        (true, Reachability::No) => "connected, backend unreachable",
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
