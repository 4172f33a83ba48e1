// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! AI list cache with an active selection

use std::collections::HashMap;

use crate::entities::{AiEntity, MemStats};
use crate::error::CallResult;
use crate::router::CallRouter;

/// Cached AIs, the active one, and memory stats per AI id
#[derive(Debug, Clone, Default)]
pub struct AiStore {
    items: Vec<AiEntity>,
    mem_stats: HashMap<String, MemStats>,
    active_id: Option<String>,
}

impl AiStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[AiEntity] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&AiEntity> {
        self.items.iter().find(|ai| ai.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// Select an AI. Unknown ids are ignored; `None` selects the default AI.
    pub fn activate(&mut self, id: Option<&str>) {
        match id {
            None => self.active_id = None,
            Some(id) => {
                if self.get(id).is_some() {
                    self.active_id = Some(id.to_string());
                }
            }
        }
    }

    pub fn active(&self) -> Option<&AiEntity> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    /// Name of the active AI; `None` means the default AI.
    pub fn active_name(&self) -> Option<&str> {
        self.active().map(|ai| ai.name.as_str())
    }

    /// Replace the entry with the same id, or insert at the front.
    pub fn upsert(&mut self, ai: AiEntity) {
        if let Some(existing) = self.items.iter_mut().find(|item| item.id == ai.id) {
            *existing = ai;
        } else {
            self.items.insert(0, ai);
        }
    }

    /// Remove an AI; clears the selection if it was active.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
        }
        self.mem_stats.remove(id);
        self.items.len() < before
    }

    /// Memory stats of the active AI, or of the default AI.
    pub fn active_mem_stats(&self) -> MemStats {
        let key = self.active_id.clone().unwrap_or_default();
        self.mem_stats.get(&key).copied().unwrap_or_default()
    }

    pub fn set_mem_stats(&mut self, id: Option<&str>, stats: MemStats) {
        self.mem_stats.insert(super::ai_key(id), stats);
    }

    /// Reload the full list from the backend.
    pub async fn fetch(&mut self, router: &CallRouter) -> CallResult<()> {
        self.items = router.list_ais().await?;
        if let Some(id) = self.active_id.clone() {
            if self.get(&id).is_none() {
                self.active_id = None;
            }
        }
        Ok(())
    }

    /// Refresh memory stats of the active AI.
    pub async fn fetch_mem_stats(&mut self, router: &CallRouter) -> CallResult<MemStats> {
        let stats = router.mem_stats(self.active_name()).await?;
        let id = self.active_id.clone();
        self.set_mem_stats(id.as_deref(), stats);
        Ok(stats)
    }
}
