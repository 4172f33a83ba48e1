// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::entities::AiEntity;
use crate::error::CallResult;
use crate::router::{Action, Args, CallRouter};

impl CallRouter {
    pub async fn list_ais(&self) -> CallResult<Vec<AiEntity>> {
        self.perform_as(Action::AiList, Args::new()).await
    }

    /// Create an AI. `None` if the backend created nothing.
    pub async fn add_ai(&self, name: &str) -> CallResult<Option<AiEntity>> {
        self.perform_as(Action::AiAdd, Args::new().with("name", name))
            .await
    }

    /// Delete an AI and its memory. Returns the deleted AI.
    pub async fn delete_ai(&self, name: &str) -> CallResult<Option<AiEntity>> {
        self.perform_as(Action::AiDelete, Args::new().with("name", name))
            .await
    }

    pub async fn rename_ai(&self, name: &str, new_name: &str) -> CallResult<Option<AiEntity>> {
        self.perform_as(
            Action::AiRename,
            Args::new().with("name", name).with("new_name", new_name),
        )
        .await
    }
}
