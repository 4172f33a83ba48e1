// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tool commands

use crate::cli::ToolCommands;
use crate::error::Result;
use crate::stores::ToolStore;

use super::Session;

/// Execute the tool command
pub async fn execute(session: &Session, command: ToolCommands) -> Result<()> {
    let router = &session.router;
    match command {
        ToolCommands::Toolsets => {
            let mut store = ToolStore::new();
            store.fetch_toolsets(router).await?;
            session.render(&store.toolsets(), |toolsets| {
                if toolsets.is_empty() {
                    println!("No toolsets imported.");
                }
                for toolset in toolsets.iter() {
                    println!("{}  {}", toolset.id, toolset.title);
                }
            })
        }
        ToolCommands::List { toolset_id } => {
            let tools = router.query_tools_by_toolset(&toolset_id).await?;
            session.render(&tools, |tools| {
                for tool in tools {
                    println!("{}  {}  {}", tool.id, tool.name, tool.description);
                }
            })
        }
    }
}
