// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::OutputFormat;
use crate::error::{Error, Result};

use super::{print_json, Context};

pub async fn get(ctx: &Context, key: &str, output: OutputFormat) -> Result<()> {
    let entry = ctx
        .dispatcher
        .cache()
        .get(key)
        .await?
        .ok_or_else(|| Error::NotCached(key.to_string()))?;

    match output {
        OutputFormat::Json => print_json(&entry),
        OutputFormat::Text => {
            eprintln!("cached at {}", entry.stored_at.to_rfc3339());
            print_json(&entry.payload)
        }
    }
}

pub async fn list(ctx: &Context) -> Result<()> {
    for key in ctx.dispatcher.cache().keys().await? {
        println!("{key}");
    }
    Ok(())
}

pub async fn clear(ctx: &Context) -> Result<()> {
    let removed = ctx.dispatcher.cache().clear().await?;
    println!("Cleared {removed} cached {}", if removed == 1 { "entry" } else { "entries" });
    Ok(())
}
