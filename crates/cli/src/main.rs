// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use finlink::{Cli, Config};

fn main() {
    let cli = Cli::parse();
    let log_file = Config::load(cli.config.as_deref())
        .ok()
        .and_then(|config| config.log_file);
    finlink::setup_logging(cli.verbose, log_file.as_deref());

    if let Err(e) = finlink::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
