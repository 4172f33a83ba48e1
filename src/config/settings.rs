// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for aiter-client
//!
//! Handles loading and saving the persisted client state from
//! ~/.aiter-client/settings.json: remote endpoint and token, local host
//! command, HTTP timeouts, language preference and per-AI "noticed" flags.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

mod io;
mod migration;
mod validation;

/// Main settings structure, stored in ~/.aiter-client/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Remote server endpoint; absent URL means local mode
    #[serde(default)]
    pub remote: RemoteConfig,

    /// How to launch the local host process
    #[serde(default)]
    pub local_host: LocalHostConfig,

    /// HTTP client settings for the remote channel
    #[serde(default)]
    pub http: HttpConfig,

    /// UI language preference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Per-AI "noticed" flags, keyed by AI id
    #[serde(default)]
    pub noticed: HashMap<String, bool>,
}

/// Remote server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote server (without the `/api` suffix)
    // Written as null when unset so a save clears the value on disk.
    #[serde(default)]
    pub url: Option<String>,

    /// Bearer token sent with every remote request
    #[serde(default)]
    pub token: Option<String>,

    /// Environment variable overriding the URL
    #[serde(default = "default_remote_url_env")]
    pub url_env: String,

    /// Environment variable overriding the token
    #[serde(default = "default_remote_token_env")]
    pub token_env: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            url_env: default_remote_url_env(),
            token_env: default_remote_token_env(),
        }
    }
}

/// Local host process configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocalHostConfig {
    /// Host program speaking line-delimited JSON on stdio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<PathBuf>,

    /// Extra arguments for the host program
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Extra environment for the host program
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds for unary calls (0 disables)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_remote_url_env() -> String {
    "AITER_REMOTE_URL".to_string()
}

fn default_remote_token_env() -> String {
    "AITER_REMOTE_TOKEN".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}
