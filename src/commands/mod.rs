// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI command implementations
//!
//! Each subcommand builds on a [`Session`]: a call router wired to the
//! configured transport, plus the local host process when one is needed.

pub mod ai;
pub mod chat;
pub mod doc;
pub mod llm;
pub mod mem;
pub mod remote;
pub mod skill;
pub mod tool;

use std::sync::Arc;

use serde::Serialize;

use crate::channel::{RemoteChannel, StdioHost};
use crate::cli::{Cli, Commands, OutputFormat};
use crate::config::Settings;
use crate::error::{CallError, ClientError, Result};
use crate::router::CallRouter;
use crate::transport::{
    ConfigSource, SettingsSource, SharedConfig, Transport, TransportConfig, TransportSelector,
};

/// Connection overrides from the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub remote: Option<String>,
    pub token: Option<String>,
    pub host: Option<std::path::PathBuf>,
}

impl Overrides {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            remote: cli.remote.clone(),
            token: cli.token.clone(),
            host: cli.host.clone(),
        }
    }
}

/// A router ready for one CLI run
pub struct Session {
    pub router: CallRouter,
    pub format: OutputFormat,
    host: Option<Arc<StdioHost>>,
}

impl Session {
    /// Wire a router from settings and command-line overrides.
    ///
    /// Without overrides the transport follows the settings file, re-read on
    /// every call. The local host is spawned only in local mode.
    pub async fn connect(
        settings: &Settings,
        overrides: &Overrides,
        format: OutputFormat,
    ) -> Result<Self> {
        settings.validate()?;

        let source: Arc<dyn ConfigSource> = if overrides.remote.is_some() || overrides.token.is_some()
        {
            let mut config = settings.transport_config();
            if let Some(url) = &overrides.remote {
                config = TransportConfig::remote(url.trim_end_matches('/'), config.token);
            }
            if let Some(token) = &overrides.token {
                config.token = Some(token.clone());
            }
            Arc::new(SharedConfig::new(config))
        } else {
            Arc::new(SettingsSource::default_location())
        };

        let remote = RemoteChannel::with_http_config(source.clone(), &settings.http)
            .map_err(|e| ClientError::Config(e.to_string()))?;
        let selector = TransportSelector::configured(source);
        let transport = selector.select().await;
        let mut router = CallRouter::new(selector).with_remote_channel(remote);

        let mut host = None;
        if transport == Transport::Local {
            let mut host_config = settings.local_host.clone();
            if let Some(program) = &overrides.host {
                host_config.program = Some(program.clone());
            }
            if host_config.program.is_none() {
                return Err(ClientError::Config(
                    "no local host configured: pass --host, set local_host.program in settings, \
                     or point the client at a server with `aiter-client remote set <URL>`"
                        .to_string(),
                ));
            }

            let stdio = Arc::new(
                StdioHost::spawn(&host_config).map_err(|e| ClientError::Call(CallError::from(e)))?,
            );
            router = router.with_local_host(stdio.clone());
            host = Some(stdio);
        }

        tracing::debug!("Connected over {}", transport);
        Ok(Self {
            router,
            format,
            host,
        })
    }

    /// Stop the local host, if one was spawned.
    pub async fn close(self) {
        if let Some(host) = self.host {
            if let Err(e) = host.shutdown().await {
                tracing::debug!("Local host shutdown failed: {}", e);
            }
        }
    }

    /// Print `value` as JSON, or run `text` in text mode.
    pub fn render<T: Serialize>(&self, value: &T, text: impl FnOnce(&T)) -> Result<()> {
        render(self.format, value, text)
    }
}

pub(crate) fn render<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(&T),
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(value),
    }
    Ok(())
}

/// Run one parsed command line.
pub async fn execute(cli: Cli, mut settings: Settings) -> Result<()> {
    let format = cli.format;

    // Remote management only touches the settings file.
    if let Commands::Remote(args) = &cli.command {
        return remote::execute(&args.command, &mut settings, format);
    }

    let session = Session::connect(&settings, &Overrides::from_cli(&cli), format).await?;
    let result = dispatch(&session, cli.command).await;
    session.close().await;
    result
}

async fn dispatch(session: &Session, command: Commands) -> Result<()> {
    match command {
        Commands::Version => {
            let version = session.router.core_version().await?;
            session.render(&serde_json::json!({ "version": version }), |_| {
                println!("{}", version)
            })
        }
        Commands::Ai(args) => ai::execute(session, args.command).await,
        Commands::Chat(args) => chat::execute(session, args).await,
        Commands::History(args) => chat::history(session, args).await,
        Commands::Doc(args) => doc::execute(session, args.command).await,
        Commands::Llm(args) => llm::execute(session, args.command).await,
        Commands::Mem(args) => mem::execute(session, args.command).await,
        Commands::Skill(args) => skill::execute(session, args.command).await,
        Commands::Tool(args) => tool::execute(session, args.command).await,
        Commands::Remote(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_overrides_from_cli() {
        let cli = Cli::parse_from([
            "aiter-client",
            "--remote",
            "http://localhost:6868/",
            "--host",
            "/usr/bin/aiter-host",
            "version",
        ]);
        let overrides = Overrides::from_cli(&cli);
        assert_eq!(overrides.remote.as_deref(), Some("http://localhost:6868/"));
        assert!(overrides.token.is_none());
        assert_eq!(
            overrides.host,
            Some(std::path::PathBuf::from("/usr/bin/aiter-host"))
        );
    }

    #[tokio::test]
    async fn test_connect_with_remote_override_skips_host() {
        let overrides = Overrides {
            remote: Some("http://127.0.0.1:1".to_string()),
            ..Default::default()
        };
        let session = Session::connect(&Settings::default(), &overrides, OutputFormat::Text)
            .await
            .unwrap();
        assert!(session.router.is_remote().await);
        assert!(session.host.is_none());
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_settings() {
        let mut settings = Settings::default();
        settings.http.connect_timeout_secs = 0;
        let overrides = Overrides {
            remote: Some("http://127.0.0.1:1".to_string()),
            ..Default::default()
        };
        let result = Session::connect(&settings, &overrides, OutputFormat::Text).await;
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_render_text_runs_closure() {
        let mut called = false;
        render(OutputFormat::Text, &1, |_| called = true).unwrap();
        assert!(called);
    }
}
