// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::entities::{ToolEntity, ToolsetEntity};
use crate::error::CallResult;
use crate::router::{Action, Args, CallRouter};

impl CallRouter {
    pub async fn get_tool(&self, id: &str) -> CallResult<Option<ToolEntity>> {
        self.perform_as(Action::ToolGet, Args::new().with("id", id))
            .await
    }

    /// Import a toolset. `options` are the type-specific source lines, e.g.
    /// an MCP server command line or an AHP endpoint.
    pub async fn import_tools(
        &self,
        tool_type: &str,
        title: Option<&str>,
        options: &[String],
    ) -> CallResult<Vec<ToolEntity>> {
        self.perform_as(
            Action::ToolImport,
            Args::new()
                .with("type", tool_type)
                .with_opt("title", title)
                .with("options", options.to_vec()),
        )
        .await
    }

    /// Parse a toolset without saving it.
    pub async fn parse_tools(&self, tool_type: &str, options: &[String]) -> CallResult<Vec<ToolEntity>> {
        self.perform_as(
            Action::ToolParse,
            Args::new()
                .with("type", tool_type)
                .with("options", options.to_vec()),
        )
        .await
    }

    pub async fn list_tools_by_ids(&self, ids: &[String]) -> CallResult<Vec<ToolEntity>> {
        self.perform_as(Action::ToolListByIds, Args::new().with("ids", ids.to_vec()))
            .await
    }

    pub async fn list_toolsets(&self) -> CallResult<Vec<ToolsetEntity>> {
        self.perform_as(Action::ToolListToolsets, Args::new()).await
    }

    /// Delete every tool of a toolset; returns the deleted tools.
    pub async fn delete_tools_by_toolset(&self, toolset_id: &str) -> CallResult<Vec<ToolEntity>> {
        self.perform_as(
            Action::ToolDeleteByToolset,
            Args::new().with("toolset_id", toolset_id),
        )
        .await
    }

    pub async fn query_tools_by_toolset(&self, toolset_id: &str) -> CallResult<Vec<ToolEntity>> {
        self.perform_as(
            Action::ToolQueryByToolset,
            Args::new().with("toolset_id", toolset_id),
        )
        .await
    }
}
