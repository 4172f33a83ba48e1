// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{ClientError, Result};
use crate::transport::TransportConfig;

use super::Settings;

impl Settings {
    /// Get the remote base URL, checking env var first. Blank values count as unset.
    pub fn get_remote_url(&self) -> Option<String> {
        // Priority: env var > config file.
        non_blank(std::env::var(&self.remote.url_env).ok())
            .or_else(|| non_blank(self.remote.url.clone()))
    }

    /// Get the remote bearer token, checking env var first.
    pub fn get_remote_token(&self) -> Option<String> {
        // Priority: env var > config file.
        non_blank(std::env::var(&self.remote.token_env).ok())
            .or_else(|| non_blank(self.remote.token.clone()))
    }

    /// Whether calls will be routed to the remote channel.
    pub fn is_remote(&self) -> bool {
        self.get_remote_url().is_some()
    }

    /// Snapshot the effective transport configuration.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            base_url: self.get_remote_url(),
            token: self.get_remote_token(),
        }
    }

    /// Store a new remote endpoint. `None` or blank URL switches back to local mode.
    pub fn set_remote(&mut self, url: Option<String>, token: Option<String>) {
        self.remote.url = non_blank(url).map(|u| u.trim_end_matches('/').to_string());
        self.remote.token = non_blank(token);
    }

    /// Check the settings for values that would make every call fail.
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = non_blank(self.remote.url.clone()) {
            let lower = url.to_ascii_lowercase();
            if !lower.starts_with("http://") && !lower.starts_with("https://") {
                return Err(ClientError::Config(format!(
                    "remote url must start with http:// or https://, got '{}'",
                    url
                )));
            }
        }

        if self.http.connect_timeout_secs == 0 {
            return Err(ClientError::Config(
                "http.connect_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if let Some(program) = &self.local_host.program {
            if program.as_os_str().is_empty() {
                return Err(ClientError::Config(
                    "local_host.program must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Whether the user has already seen the notice for this AI.
    pub fn is_noticed(&self, ai_id: &str) -> bool {
        self.noticed.get(ai_id).copied().unwrap_or(false)
    }

    /// Record whether the user has seen the notice for this AI.
    pub fn set_noticed(&mut self, ai_id: &str, noticed: bool) {
        if noticed {
            self.noticed.insert(ai_id.to_string(), true);
        } else {
            self.noticed.remove(ai_id);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
