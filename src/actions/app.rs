// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! System, configuration and desktop host actions
//!
//! Apart from `core_version` these exist only on the local host; over the
//! remote transport they fail with a transport error naming the action.

use crate::entities::AppConfig;
use crate::error::{CallError, CallResult};
use crate::router::{Action, Args, CallRouter};

use super::parse_text;

impl CallRouter {
    /// Backend version string.
    pub async fn core_version(&self) -> CallResult<String> {
        let value = self.perform(Action::CoreVersion, Args::new()).await?;
        Ok(parse_text(value).unwrap_or_default().trim().to_string())
    }

    /// A value from the backend's key/value configuration.
    pub async fn get_config(&self, key: &str) -> CallResult<Option<String>> {
        let value = self
            .perform(Action::ConfigGet, Args::new().with("key", key))
            .await?;
        Ok(parse_text(value))
    }

    pub async fn set_config(&self, key: &str, value: &str) -> CallResult<()> {
        self.perform(
            Action::ConfigSet,
            Args::new().with("key", key).with("value", value),
        )
        .await
        .map(|_| ())
    }

    pub async fn app_config(&self) -> CallResult<AppConfig> {
        let value = self.perform(Action::AppConfig, Args::new()).await?;
        if value.is_null() {
            return Ok(AppConfig::default());
        }
        serde_json::from_value(value).map_err(|e| {
            CallError::Transport(format!("malformed app_config response: {}", e))
        })
    }

    /// Remote URL the desktop host was configured with.
    pub async fn app_remote_url(&self) -> CallResult<Option<String>> {
        let value = self.perform(Action::AppGetRemoteUrl, Args::new()).await?;
        Ok(parse_text(value))
    }

    pub async fn app_remote_token(&self) -> CallResult<Option<String>> {
        let value = self.perform(Action::AppGetRemoteToken, Args::new()).await?;
        Ok(parse_text(value))
    }

    /// Point the desktop host at a remote server; empty values switch it
    /// back to local mode. Takes effect after the host restarts.
    pub async fn set_app_remote(&self, url: &str, token: &str) -> CallResult<()> {
        self.perform(
            Action::AppSetRemote,
            Args::new().with("url", url).with("token", token),
        )
        .await
        .map(|_| ())
    }

    /// Whether `npx` is available to the host (needed by MCP toolsets).
    pub async fn is_npx_installed(&self) -> CallResult<bool> {
        let value = self.perform(Action::IsNpxInstalled, Args::new()).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub async fn is_uv_installed(&self) -> CallResult<bool> {
        let value = self.perform(Action::IsUvInstalled, Args::new()).await?;
        Ok(value.as_bool().unwrap_or(false))
    }
}
