// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Transport selection
//!
//! Decides per call whether the local host or the remote server handles
//! an action. The decision is made from the transport configuration read
//! fresh from a [`ConfigSource`] every time; nothing is cached.

pub mod source;

use std::fmt;
use std::sync::Arc;

pub use source::{ConfigSource, HostSource, SettingsSource, SharedConfig, WebSource};

/// Which channel carries a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Local,
    Remote,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Local => "local",
            Transport::Remote => "remote",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote endpoint configuration. An absent or blank base URL means local mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportConfig {
    /// Server root, e.g. `http://127.0.0.1:6868`
    pub base_url: Option<String>,
    /// Bearer token; absent means no auth header
    pub token: Option<String>,
}

impl TransportConfig {
    /// Local-mode configuration.
    pub fn local() -> Self {
        Self::default()
    }

    /// Remote-mode configuration.
    pub fn remote(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            token,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.base_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// API root derived from the base URL (`{base}/api`).
    pub fn api_base(&self) -> Option<String> {
        if !self.is_remote() {
            return None;
        }
        self.base_url
            .as_deref()
            .map(|url| format!("{}/api", url.trim().trim_end_matches('/')))
    }

    /// Token, ignoring blank values.
    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Picks the channel for each call
#[derive(Clone)]
pub enum TransportSelector {
    /// Always the same transport (e.g. a browser client that only has the remote channel)
    Fixed(Transport),
    /// Decided by the presence of a remote base URL in the source
    Configured(Arc<dyn ConfigSource>),
}

impl TransportSelector {
    pub fn fixed(transport: Transport) -> Self {
        Self::Fixed(transport)
    }

    pub fn configured(source: Arc<dyn ConfigSource>) -> Self {
        Self::Configured(source)
    }

    /// Select the transport for one call. Never fails: any problem reading
    /// the configuration falls back to the local channel.
    pub async fn select(&self) -> Transport {
        match self {
            TransportSelector::Fixed(transport) => *transport,
            TransportSelector::Configured(source) => match source.load().await {
                Ok(config) if config.is_remote() => Transport::Remote,
                Ok(_) => Transport::Local,
                Err(e) => {
                    tracing::warn!(
                        "Failed to read transport configuration from {}, using local: {}",
                        source.name(),
                        e
                    );
                    Transport::Local
                }
            },
        }
    }

    pub async fn is_remote(&self) -> bool {
        self.select().await == Transport::Remote
    }
}

impl fmt::Debug for TransportSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportSelector::Fixed(t) => f.debug_tuple("Fixed").field(t).finish(),
            TransportSelector::Configured(source) => {
                f.debug_tuple("Configured").field(&source.name()).finish()
            }
        }
    }
}
