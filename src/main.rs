// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! aiter-client - command line front end for the Aiter call router
//!
//! Every subcommand is routed to either the local host process or a remote
//! Aiter server, depending on the configured remote URL.

use anyhow::Context;
use clap::Parser;

use aiter_client::cli::Cli;
use aiter_client::commands;
use aiter_client::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` turns on routing diagnostics; `RUST_LOG` still takes precedence.
    if cli.verbose > 0 {
        if let Ok(parsed) = "aiter_client=debug".parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load().context("failed to load settings")?;

    commands::execute(cli, settings).await?;
    Ok(())
}
