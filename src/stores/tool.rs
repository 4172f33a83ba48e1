// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tool cache

use std::collections::HashMap;

use crate::entities::{ToolEntity, ToolsetEntity};
use crate::error::CallResult;
use crate::router::CallRouter;

#[derive(Debug, Clone, Default)]
pub struct ToolStore {
    toolsets: Vec<ToolsetEntity>,
    tools: HashMap<String, ToolEntity>,
}

impl ToolStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toolsets(&self) -> &[ToolsetEntity] {
        &self.toolsets
    }

    pub fn get(&self, id: &str) -> Option<&ToolEntity> {
        self.tools.get(id)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn upsert(&mut self, tool: ToolEntity) {
        self.tools.insert(tool.id.clone(), tool);
    }

    /// Drop cached tools of a deleted toolset.
    pub fn remove_toolset(&mut self, toolset_id: &str) {
        self.toolsets.retain(|t| t.id != toolset_id);
        self.tools.retain(|_, tool| tool.toolset_id != toolset_id);
    }

    pub async fn fetch_toolsets(&mut self, router: &CallRouter) -> CallResult<()> {
        self.toolsets = router.list_toolsets().await?;
        Ok(())
    }

    /// Load the given tools into the cache. Ids already cached are
    /// refreshed too.
    pub async fn fetch_tools_by_ids(&mut self, router: &CallRouter, ids: &[String]) -> CallResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        for tool in router.list_tools_by_ids(ids).await? {
            self.upsert(tool);
        }
        Ok(())
    }
}
