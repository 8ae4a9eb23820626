// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use serde_json::Value;

use fl_core::{Body, Method, Reply, RequestOptions};

use crate::cli::OutputFormat;
use crate::error::{Error, Result};

use super::{print_json, Context};

/// JSON output for the request command.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum RequestOutputJson<'a> {
    Delivered { body: Value },
    Queued { id: &'a str, queue_len: usize },
}

/// Parses `--data`, rejecting anything that is not JSON.
pub fn parse_data(data: Option<&str>) -> Result<Option<Value>> {
    data.map(|raw| serde_json::from_str(raw).map_err(|e| Error::InvalidData(e.to_string())))
        .transpose()
}

pub struct RequestArgs {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub cache_key: Option<String>,
    pub skip_auth: bool,
}

pub async fn run(ctx: &Context, args: RequestArgs, output: OutputFormat) -> Result<()> {
    let mut options = RequestOptions::default();
    if args.skip_auth {
        options = options.skip_auth();
    }
    if let Some(key) = args.cache_key {
        options = options.cache_key(key);
    }

    let reply = ctx
        .dispatcher
        .request(args.method, &args.path, args.body, options)
        .await?;

    match output {
        OutputFormat::Json => match &reply {
            Reply::Delivered(body) => print_json(&RequestOutputJson::Delivered {
                body: body.clone().into_value(),
            }),
            Reply::Queued(write) => print_json(&RequestOutputJson::Queued {
                id: &write.id,
                queue_len: write.queue_len,
            }),
        },
        OutputFormat::Text => {
            println!("{}", format_reply(&reply)?);
            Ok(())
        }
    }
}

/// Human-readable rendering of a reply.
pub fn format_reply(reply: &Reply) -> Result<String> {
    Ok(match reply {
        Reply::Delivered(Body::Json(value)) => serde_json::to_string_pretty(value)?,
        Reply::Delivered(Body::Text(text)) => text.clone(),
        Reply::Queued(write) => format!(
            "Saved offline as {}, will sync when connected ({} pending)",
            write.id, write.queue_len
        ),
    })
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
