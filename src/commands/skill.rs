// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Skill command

use crate::cli::SkillCommands;
use crate::error::Result;

use super::Session;

/// Execute the skill command
pub async fn execute(session: &Session, command: SkillCommands) -> Result<()> {
    match command {
        SkillCommands::List {
            ai,
            search,
            limit,
            offset,
        } => {
            let skills = session
                .router
                .list_skills(ai.as_deref(), &search, limit, offset)
                .await?;
            session.render(&skills, |skills| {
                if skills.is_empty() {
                    println!("No skills.");
                }
                for skill in skills {
                    println!("{}  {}  {}", skill.id, skill.tool_id, skill.trigger);
                }
            })
        }
    }
}
