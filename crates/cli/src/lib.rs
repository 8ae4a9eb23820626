// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! finlink - command-line front end for the fl-core resilience layer.
//!
//! Drives the same dispatcher an app would embed, against on-disk state, so
//! the offline queue and response cache can be inspected and replayed from a
//! terminal.
//!
//! # Main Components
//!
//! - [`Cli`] - argument definitions
//! - [`Config`] - backend URL, retry tuning, and data directory
//! - [`Error`] - error types for all commands

mod cli;
mod commands;
mod env;
mod logging;
mod session;

pub mod config;
pub mod error;

pub use cli::{CacheCommand, Cli, Command, OutputFormat, QueueCommand};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::setup_logging;

use fl_core::Method;

use commands::request::{parse_data, RequestArgs};
use commands::{Connectivity, Context};

/// Runs a parsed command line to completion.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(config, cli.command))
}

async fn dispatch(config: Config, command: Command) -> Result<()> {
    match command {
        Command::Request {
            method,
            path,
            data,
            cache_key,
            skip_auth,
            offline,
            output,
        } => {
            let method: Method = method.parse()?;
            let body = parse_data(data.as_deref())?;
            let connectivity = if offline {
                Connectivity::Offline
            } else {
                Connectivity::Probe
            };
            let ctx = Context::open(config, connectivity).await?;
            let args = RequestArgs {
                method,
                path,
                body,
                cache_key,
                skip_auth,
            };
            commands::request::run(&ctx, args, output).await
        }
        Command::Queue(QueueCommand::List { output }) => {
            let ctx = Context::open(config, Connectivity::Offline).await?;
            commands::queue::list(&ctx, output).await
        }
        Command::Queue(QueueCommand::Size) => {
            let ctx = Context::open(config, Connectivity::Offline).await?;
            commands::queue::size(&ctx).await
        }
        Command::Queue(QueueCommand::Drain { output }) => {
            let ctx = Context::open(config, Connectivity::Probe).await?;
            commands::queue::drain(&ctx, output).await
        }
        Command::Queue(QueueCommand::Discard { id }) => {
            let ctx = Context::open(config, Connectivity::Offline).await?;
            commands::queue::discard(&ctx, &id).await
        }
        Command::Cache(CacheCommand::Get { key, output }) => {
            let ctx = Context::open(config, Connectivity::Offline).await?;
            commands::cache::get(&ctx, &key, output).await
        }
        Command::Cache(CacheCommand::List) => {
            let ctx = Context::open(config, Connectivity::Offline).await?;
            commands::cache::list(&ctx).await
        }
        Command::Cache(CacheCommand::Clear) => {
            let ctx = Context::open(config, Connectivity::Offline).await?;
            commands::cache::clear(&ctx).await
        }
        Command::Status { output } => {
            let ctx = Context::open(config, Connectivity::Probe).await?;
            commands::status::run(&ctx, output).await
        }
    }
}
