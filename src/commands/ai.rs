// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! AI management command

use crate::cli::AiCommands;
use crate::entities::AiEntity;
use crate::error::{ClientError, Result};
use crate::stores::AiStore;

use super::Session;

fn print_ai(ai: &AiEntity) {
    println!("{}  {}", ai.id, ai.name);
}

fn found(ai: Option<AiEntity>, name: &str) -> Result<AiEntity> {
    ai.ok_or_else(|| ClientError::InvalidInput(format!("AI '{}' not found", name)))
}

/// Execute the ai command
pub async fn execute(session: &Session, command: AiCommands) -> Result<()> {
    let router = &session.router;
    match command {
        AiCommands::List => {
            let mut store = AiStore::new();
            store.fetch(router).await?;
            session.render(&store.items(), |items| {
                if items.is_empty() {
                    println!("No AIs yet. Create one with `aiter-client ai add <name>`.");
                }
                for ai in items.iter() {
                    print_ai(ai);
                }
            })
        }
        AiCommands::Add { name } => {
            let ai = found(router.add_ai(&name).await?, &name)?;
            session.render(&ai, |ai| println!("Created AI '{}' ({})", ai.name, ai.id))
        }
        AiCommands::Delete { name } => {
            let ai = found(router.delete_ai(&name).await?, &name)?;
            session.render(&ai, |ai| println!("Deleted AI '{}'", ai.name))
        }
        AiCommands::Rename { name, new_name } => {
            let ai = found(router.rename_ai(&name, &new_name).await?, &name)?;
            session.render(&ai, |ai| println!("Renamed '{}' to '{}'", name, ai.name))
        }
    }
}
