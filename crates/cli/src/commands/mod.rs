// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod cache;
pub mod queue;
pub mod request;
pub mod status;

use std::sync::Arc;

use fl_core::{
    ConnectivityMonitor, ConnectivityState, Dispatcher, FileStorage, ReachabilityProbe,
    ReqwestTransport, Storage, Transport,
};

use crate::config::Config;
use crate::env;
use crate::error::Result;
use crate::session::TokenFileSession;

/// Everything a command needs, wired from the config.
pub struct Context {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub dispatcher: Dispatcher,
    pub probe: ReachabilityProbe,
}

/// How to seed the connectivity monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// Probe the health endpoint once.
    Probe,
    /// Assume the network is gone.
    Offline,
}

impl Context {
    /// Opens storage and builds the dispatcher. The monitor always starts
    /// from a fresh read; the persisted last state is never trusted.
    pub async fn open(config: Config, connectivity: Connectivity) -> Result<Self> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(config.data_dir())?);
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new().map_err(fl_core::Error::from)?);
        let dispatcher_config = config.dispatcher_config()?;
        let probe = ReachabilityProbe::new(
            Arc::clone(&transport),
            dispatcher_config.endpoint(&config.health_path),
        )
        .with_timeout(dispatcher_config.timeout.min(fl_core::probe::DEFAULT_PROBE_TIMEOUT));

        let initial = match connectivity {
            Connectivity::Probe => probe.check().await,
            Connectivity::Offline => ConnectivityState::offline(),
        };
        tracing::debug!(online = initial.is_online(), "initial connectivity");

        let monitor = ConnectivityMonitor::with_storage(initial, Arc::clone(&storage));
        let session = Arc::new(TokenFileSession::new(config.token_path(), env::token()));
        let dispatcher = Dispatcher::new(
            dispatcher_config,
            transport,
            session,
            monitor,
            Arc::clone(&storage),
        )?;

        Ok(Context {
            config,
            storage,
            dispatcher,
            probe,
        })
    }
}

/// Prints a value as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
