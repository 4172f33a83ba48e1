// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! LLM configuration commands

use std::collections::HashMap;

use serde::Serialize;

use crate::actions::LlmTestRequest;
use crate::cli::LlmCommands;
use crate::entities::LlmEntity;
use crate::error::{ClientError, Result};

use super::chat::stream_to_terminal;
use super::Session;

#[derive(Serialize)]
struct LlmListing {
    llms: Vec<LlmEntity>,
    active: HashMap<String, String>,
}

/// Types for which `name` is the active LLM, e.g. `chat,reasoning`.
fn active_types(active: &HashMap<String, String>, name: &str) -> String {
    let mut types: Vec<&str> = active
        .iter()
        .filter(|(_, active_name)| active_name.as_str() == name)
        .map(|(llm_type, _)| llm_type.as_str())
        .collect();
    types.sort_unstable();
    types.join(",")
}

/// Execute the llm command
pub async fn execute(session: &Session, command: LlmCommands) -> Result<()> {
    let router = &session.router;
    match command {
        LlmCommands::List => {
            let listing = LlmListing {
                llms: router.list_llms().await?,
                active: router.list_actived_llm_names().await?,
            };
            session.render(&listing, |listing| {
                if listing.llms.is_empty() {
                    println!("No LLMs configured.");
                }
                for llm in &listing.llms {
                    let active = active_types(&listing.active, &llm.name);
                    let marker = if active.is_empty() { " " } else { "*" };
                    println!(
                        "{} {}  {}/{}  {}",
                        marker, llm.name, llm.llm_type, llm.protocol, active
                    );
                }
            })
        }
        LlmCommands::Active { llm_type, name } => {
            router.activate_llm(&llm_type, &name).await?;
            session.render(&serde_json::json!({ "ok": true }), |_| {
                println!("'{}' is now the active {} LLM", name, llm_type)
            })
        }
        LlmCommands::Test {
            name,
            prompt,
            timeout_secs,
        } => {
            let llm = router
                .list_llms()
                .await?
                .into_iter()
                .find(|llm| llm.name == name)
                .ok_or_else(|| ClientError::InvalidInput(format!("LLM '{}' not found", name)))?;

            let request = LlmTestRequest {
                prompt,
                name: llm.name,
                protocol: llm.protocol,
                options: llm.options,
                timeout_secs,
            };
            stream_to_terminal(router.test_chat_llm(request), session.format).await?;
            Ok(())
        }
        LlmCommands::Delete { name } => {
            let deleted = router
                .delete_llm(&name)
                .await?
                .ok_or_else(|| ClientError::InvalidInput(format!("LLM '{}' not found", name)))?;
            session.render(&deleted, |llm| println!("Deleted LLM '{}'", llm.name))
        }
    }
}
