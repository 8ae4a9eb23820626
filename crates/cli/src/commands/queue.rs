// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;

use fl_core::{DrainReport, DrainStop, PendingRequest};

use crate::cli::OutputFormat;
use crate::error::{Error, Result};

use super::{print_json, Context};

/// JSON representation of a queued write.
#[derive(Serialize)]
struct QueueEntryJson<'a> {
    #[serde(flatten)]
    request: &'a PendingRequest,
    attempts: u32,
}

pub async fn list(ctx: &Context, output: OutputFormat) -> Result<()> {
    let queue = ctx.dispatcher.queue();
    let pending = queue.peek_all().await?;

    match output {
        OutputFormat::Json => {
            let mut entries = Vec::with_capacity(pending.len());
            for request in &pending {
                let attempts = queue.attempts(&request.id).await?.unwrap_or(0);
                entries.push(QueueEntryJson { request, attempts });
            }
            print_json(&entries)
        }
        OutputFormat::Text => {
            if pending.is_empty() {
                println!("Queue is empty");
            }
            for request in &pending {
                let attempts = queue.attempts(&request.id).await?.unwrap_or(0);
                println!("{}", format_entry(request, attempts));
            }
            Ok(())
        }
    }
}

pub async fn size(ctx: &Context) -> Result<()> {
    println!("{}", ctx.dispatcher.queue_size().await?);
    Ok(())
}

pub async fn drain(ctx: &Context, output: OutputFormat) -> Result<()> {
    let report = ctx.dispatcher.drain_queue().await?;
    match output {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            println!("{}", format_report(&report));
            Ok(())
        }
    }
}

/// Removes one queued write. Drains stop at a refused write, so this is how a
/// user unblocks the writes queued behind it.
pub async fn discard(ctx: &Context, id: &str) -> Result<()> {
    let queue = ctx.dispatcher.queue();
    let Some(request) = queue.peek_all().await?.into_iter().find(|r| r.id == id) else {
        return Err(Error::NotQueued(id.to_string()));
    };
    queue.remove(id).await?;
    tracing::warn!(id, method = %request.method, path = %request.path, "queued write discarded");
    println!(
        "Discarded {} {} ({} remaining)",
        request.method.as_str(),
        request.path,
        queue.size().await?
    );
    Ok(())
}

/// One line per queued write: `<enqueued_at> <METHOD> <path> [class] (id)`.
pub fn format_entry(request: &PendingRequest, attempts: u32) -> String {
    let mut line = format!(
        "{} {:<6} {} [{}] ({})",
        request.enqueued_at.format("%Y-%m-%d %H:%M:%S"),
        request.method.as_str(),
        request.path,
        request.resource_class,
        request.id
    );
    if attempts > 0 {
        line.push_str(&format!(" attempts={attempts}"));
    }
    line
}

pub fn format_report(report: &DrainReport) -> String {
    let mut line = format!(
        "Delivered {}, {} remaining",
        report.delivered, report.remaining
    );
    match &report.stopped {
        Some(DrainStop::Offline) => line.push_str(" (offline)"),
        Some(DrainStop::Failed { id, error }) => {
            line.push_str(&format!(" (stopped at {id}: {error})"));
        }
        None => {}
    }
    line
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
