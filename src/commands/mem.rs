// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Memory commands

use crate::cli::MemCommands;
use crate::error::Result;

use super::Session;

/// Human-readable byte size.
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// Execute the mem command
pub async fn execute(session: &Session, command: MemCommands) -> Result<()> {
    let router = &session.router;
    match command {
        MemCommands::Stats { ai } => {
            let stats = router.mem_stats(ai.as_deref()).await?;
            session.render(&stats, |stats| println!("Memory: {}", format_size(stats.size)))
        }
        MemCommands::Vacuum { ai } => {
            router.vacuum_mem(ai.as_deref()).await?;
            let stats = router.mem_stats(ai.as_deref()).await?;
            session.render(&stats, |stats| {
                println!("Vacuumed. Memory: {}", format_size(stats.size))
            })
        }
    }
}
