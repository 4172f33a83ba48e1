// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::entities::LlmEntity;
use crate::error::{CallError, CallResult};
use crate::router::{Action, Args, CallRouter};

fn options_value(options: &HashMap<String, String>) -> Value {
    let map: Map<String, Value> = options
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    Value::Object(map)
}

impl CallRouter {
    /// Save a new LLM configuration.
    pub async fn config_llm(
        &self,
        name: &str,
        llm_type: &str,
        protocol: &str,
        options: &HashMap<String, String>,
    ) -> CallResult<Option<LlmEntity>> {
        self.perform_as(
            Action::LlmConfig,
            Args::new()
                .with("name", name)
                .with("type", llm_type)
                .with("protocol", protocol)
                .with("options", options_value(options)),
        )
        .await
    }

    /// Update an LLM configuration, possibly renaming it.
    pub async fn edit_llm(
        &self,
        old_name: &str,
        name: &str,
        protocol: &str,
        options: &HashMap<String, String>,
    ) -> CallResult<Option<LlmEntity>> {
        self.perform_as(
            Action::LlmEdit,
            Args::new()
                .with("old_name", old_name)
                .with("name", name)
                .with("protocol", protocol)
                .with("options", options_value(options)),
        )
        .await
    }

    pub async fn delete_llm(&self, name: &str) -> CallResult<Option<LlmEntity>> {
        self.perform_as(Action::LlmDelete, Args::new().with("name", name))
            .await
    }

    pub async fn list_llms(&self) -> CallResult<Vec<LlmEntity>> {
        self.perform_as(Action::LlmList, Args::new()).await
    }

    /// Make `name` the active LLM for `llm_type` (`chat`, `reasoning`).
    pub async fn activate_llm(&self, llm_type: &str, name: &str) -> CallResult<()> {
        self.perform(
            Action::LlmActive,
            Args::new().with("type", llm_type).with("name", name),
        )
        .await
        .map(|_| ())
    }

    /// Active LLM name per type.
    pub async fn list_actived_llm_names(&self) -> CallResult<HashMap<String, String>> {
        let value = self.perform(Action::LlmListActivedNames, Args::new()).await?;
        if value.is_null() {
            return Ok(HashMap::new());
        }
        serde_json::from_value(value).map_err(|e| {
            CallError::Transport(format!(
                "malformed llm_list_actived_names response: {}",
                e
            ))
        })
    }
}
