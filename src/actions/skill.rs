// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::entities::SkillEntity;
use crate::error::CallResult;
use crate::router::{Action, Args, CallRouter};

impl CallRouter {
    /// Teach an AI one tool. Without a trigger the backend derives one from
    /// the tool description.
    pub async fn add_skill(
        &self,
        ai: Option<&str>,
        tool_id: &str,
        trigger: Option<&str>,
    ) -> CallResult<Option<SkillEntity>> {
        self.perform_as(
            Action::SkillAdd,
            Args::new()
                .with_opt("ai", ai)
                .with("tool_id", tool_id)
                .with_opt("trigger", trigger),
        )
        .await
    }

    /// Teach an AI every tool of a toolset.
    pub async fn add_skills(
        &self,
        ai: Option<&str>,
        toolset_id: &str,
    ) -> CallResult<Vec<SkillEntity>> {
        self.perform_as(
            Action::SkillAdds,
            Args::new().with_opt("ai", ai).with("toolset_id", toolset_id),
        )
        .await
    }

    pub async fn delete_skill(&self, ai: Option<&str>, id: &str) -> CallResult<Option<SkillEntity>> {
        self.perform_as(
            Action::SkillDelete,
            Args::new().with_opt("ai", ai).with("id", id),
        )
        .await
    }

    pub async fn list_skills(
        &self,
        ai: Option<&str>,
        search: &str,
        limit: u64,
        offset: u64,
    ) -> CallResult<Vec<SkillEntity>> {
        self.perform_as(
            Action::SkillList,
            Args::new()
                .with_opt("ai", ai)
                .with("search", search)
                .with("limit", limit)
                .with("offset", offset),
        )
        .await
    }
}
