// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Backend entities as returned by either transport
//!
//! Fields the backend may omit default to empty values so that a payload
//! from an older backend still deserializes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An AI: a named memory space
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiEntity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// One chat history line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryChatEntity {
    #[serde(default)]
    pub rowid: i64,
    /// `user` or `assistant`
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub created_at: String,
}

impl HistoryChatEntity {
    pub fn is_user(&self) -> bool {
        self.role == "user"
    }
}

/// A learned document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocEntity {
    pub id: String,
    pub source: String,
    pub content_type: String,
    pub title: String,
    pub preview: String,
    pub digest_start: String,
    pub digest_end: String,
    pub digest_retry: u64,
    pub digest_error: String,
    pub created_at: String,
    pub updated_at: String,
}

impl DocEntity {
    /// Digestion finished (successfully or not).
    pub fn is_digested(&self) -> bool {
        !self.digest_end.is_empty()
    }

    pub fn is_digesting(&self) -> bool {
        !self.digest_start.is_empty() && self.digest_end.is_empty()
    }
}

/// Result of learning a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnOutcome {
    pub doc_id: String,
    /// The same content was learned before
    pub doc_exists: bool,
    /// Full entity, when the backend returned one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<DocEntity>,
}

/// A skill binds a tool to a trigger phrase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillEntity {
    pub id: String,
    pub tool_id: String,
    pub trigger: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolEntity {
    pub id: String,
    pub toolset_id: String,
    pub toolset_title: String,
    /// Serialized JSON on some backends, an object on others
    pub toolset_options: Value,
    #[serde(rename = "type")]
    pub tool_type: String,
    pub name: String,
    pub description: String,
    pub parameters: Value,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsetEntity {
    pub id: String,
    pub title: String,
}

/// A configured LLM; secrets in `options` are masked by the remote server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmEntity {
    pub name: String,
    #[serde(rename = "type")]
    pub llm_type: String,
    pub protocol: String,
    pub options: HashMap<String, String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemStats {
    /// Memory size in bytes
    #[serde(default)]
    pub size: u64,
}

/// Desktop host configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub digest_batch: u64,
    pub digest_concurrent: u64,
    pub digest_deep: bool,
    pub remote_url: String,
    pub remote_token: String,
    pub skip_digest: bool,
}
