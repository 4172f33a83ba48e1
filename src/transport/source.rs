// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Where the transport configuration comes from
//!
//! Each source is read on every call so a configuration change takes
//! effect on the next call without restarting anything.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::channel::LocalHost;
use crate::config::Settings;
use crate::error::ChannelError;

use super::TransportConfig;

/// Provides the current transport configuration
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Read the configuration as it is right now.
    async fn load(&self) -> Result<TransportConfig, ChannelError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// In-memory configuration owned by the caller, who refreshes it explicitly.
#[derive(Debug, Default)]
pub struct SharedConfig {
    inner: RwLock<TransportConfig>,
}

impl SharedConfig {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    /// Replace the configuration; subsequent calls observe it.
    pub fn set(&self, config: TransportConfig) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Shared transport config lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        *guard = config;
    }

    pub fn get(&self) -> TransportConfig {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => {
                tracing::warn!("Shared transport config lock was poisoned, recovering");
                poisoned.into_inner().clone()
            }
        }
    }
}

#[async_trait]
impl ConfigSource for SharedConfig {
    async fn load(&self) -> Result<TransportConfig, ChannelError> {
        Ok(self.get())
    }

    fn name(&self) -> &'static str {
        "shared"
    }
}

/// Re-reads the persisted settings file on every call.
#[derive(Debug, Clone)]
pub struct SettingsSource {
    path: PathBuf,
}

impl SettingsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Source backed by the default settings location.
    pub fn default_location() -> Self {
        Self::new(Settings::default_path())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl ConfigSource for SettingsSource {
    async fn load(&self) -> Result<TransportConfig, ChannelError> {
        let settings = Settings::load_from(&self.path)
            .map_err(|e| ChannelError::Config(format!("settings unreadable: {}", e)))?;
        Ok(settings.transport_config())
    }

    fn name(&self) -> &'static str {
        "settings"
    }
}

/// Asks the local host for the remote endpoint on every call.
pub struct HostSource {
    host: Arc<dyn LocalHost>,
}

impl HostSource {
    pub fn new(host: Arc<dyn LocalHost>) -> Self {
        Self { host }
    }
}

#[async_trait]
impl ConfigSource for HostSource {
    async fn load(&self) -> Result<TransportConfig, ChannelError> {
        let url = self.host.invoke("app_get_remote_url", json!({})).await?;
        let token = self.host.invoke("app_get_remote_token", json!({})).await?;
        Ok(TransportConfig {
            base_url: non_empty_str(url),
            token: non_empty_str(token),
        })
    }

    fn name(&self) -> &'static str {
        "host"
    }
}

fn non_empty_str(value: Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Statically initialized base for clients served by the remote server itself.
///
/// The token still comes from the settings file so it can change between calls.
pub struct WebSource {
    base_url: RwLock<Option<String>>,
    settings: SettingsSource,
}

impl WebSource {
    pub fn new(settings: SettingsSource) -> Self {
        Self {
            base_url: RwLock::new(None),
            settings,
        }
    }

    /// Fix the server root from the page origin and the injected base path.
    /// Empty, `/` and the unreplaced `/AITER_BASE` placeholder mean the root.
    pub fn init(&self, origin: &str, base: &str) {
        let resolved = resolve_base(origin, base);
        tracing::debug!("Web transport initialized at {}", resolved);
        let mut guard = match self.base_url.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(resolved);
    }

    pub fn is_initialized(&self) -> bool {
        match self.base_url.read() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    fn base_url(&self) -> Option<String> {
        match self.base_url.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl ConfigSource for WebSource {
    async fn load(&self) -> Result<TransportConfig, ChannelError> {
        let base_url = self.base_url().ok_or(ChannelError::NotInitialized)?;
        let token = match self.settings.load().await {
            Ok(config) => config.token,
            Err(e) => {
                tracing::warn!("Failed to read token for web transport: {}", e);
                None
            }
        };
        Ok(TransportConfig {
            base_url: Some(base_url),
            token,
        })
    }

    fn name(&self) -> &'static str {
        "web"
    }
}

fn resolve_base(origin: &str, base: &str) -> String {
    let origin = origin.trim_end_matches('/');
    let base = base.trim();
    if base.is_empty() || base == "/" || base == "/AITER_BASE" {
        return origin.to_string();
    }
    let base = base.trim_end_matches('/');
    if base.starts_with('/') {
        format!("{}{}", origin, base)
    } else {
        format!("{}/{}", origin, base)
    }
}
