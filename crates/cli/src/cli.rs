// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART_HELP: &str = "\
Get started:
  finlink status                              Check connectivity
  finlink request GET /summary                Fetch a resource
  finlink request POST /transactions \\
      --data '{\"amount\": 12.5}'               Create a transaction (queued if offline)
  finlink queue drain                         Deliver queued writes";

#[derive(Parser, Debug)]
#[command(name = "finlink", version)]
#[command(about = "Offline-first client for the finance API")]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Path to a config file
    #[arg(long, short, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a request through the retry, queue, and cache pipeline
    #[command(after_help = "Examples:\n  \
        finlink request GET /budgets --cache-key budgets     Read and cache\n  \
        finlink request PUT /goals/4 --data '{\"target\": 900}'  Update a goal\n  \
        finlink request DELETE /transactions/9 --offline      Queue a delete")]
    Request {
        /// HTTP method (GET, POST, PUT, DELETE)
        method: String,

        /// Path relative to the configured base URL
        path: String,

        /// JSON request body
        #[arg(long, short)]
        data: Option<String>,

        /// Store a successful response in the cache under this key
        #[arg(long)]
        cache_key: Option<String>,

        /// Send without the bearer token
        #[arg(long)]
        skip_auth: bool,

        /// Assume no connectivity instead of probing
        #[arg(long)]
        offline: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Inspect or deliver queued writes
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Inspect or clear cached responses
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Probe the backend and show connectivity
    Status {
        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum QueueCommand {
    /// List queued writes in delivery order
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Print the number of queued writes
    Size,

    /// Replay queued writes now
    Drain {
        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Give up on a queued write the server keeps refusing
    Discard {
        /// Id shown by `queue list`
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Print the cached response for a key
    Get {
        key: String,

        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// List cached keys
    List,

    /// Drop every cached response
    Clear,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
