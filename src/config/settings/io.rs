// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;

use super::migration;
use super::Settings;

/// Environment override for the client home directory.
pub const HOME_ENV: &str = "AITER_CLIENT_HOME";

/// Parsed and migrated file content, `None` when the file does not exist.
fn read_migrated(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    Ok(Some(migration::migrate_on_load(value)))
}

impl Settings {
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("settings.json")
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match read_migrated(path)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Write over the existing file, keeping keys this version does not know.
    /// An unparsable file is replaced outright.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let current = serde_json::to_value(self)?;
        let merged = match read_migrated(path) {
            Ok(Some(existing)) => migration::deep_merge(existing, current),
            Ok(None) => current,
            Err(e) => {
                tracing::warn!("Replacing unreadable settings at {}: {}", path.display(), e);
                current
            }
        };

        std::fs::write(path, serde_json::to_string_pretty(&merged)?)?;
        tracing::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// `$AITER_CLIENT_HOME`, else `~/.aiter-client`.
    pub fn home_dir() -> PathBuf {
        if let Ok(home) = std::env::var(HOME_ENV) {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".aiter-client")
    }
}
