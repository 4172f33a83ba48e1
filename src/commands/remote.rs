// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Remote server configuration command

use serde::Serialize;

use crate::cli::{OutputFormat, RemoteCommands};
use crate::config::Settings;
use crate::error::Result;

#[derive(Serialize)]
struct RemoteInfo {
    mode: &'static str,
    url: Option<String>,
    token: Option<String>,
}

/// Show at most the first four characters of a secret.
fn mask(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    format!("{}****", visible)
}

fn info(settings: &Settings) -> RemoteInfo {
    RemoteInfo {
        mode: if settings.is_remote() { "remote" } else { "local" },
        url: settings.get_remote_url(),
        token: settings.get_remote_token().map(|t| mask(&t)),
    }
}

/// Execute the remote command
pub fn execute(command: &RemoteCommands, settings: &mut Settings, format: OutputFormat) -> Result<()> {
    match command {
        RemoteCommands::Show => {}
        RemoteCommands::Set { url, token } => {
            let mut updated = settings.clone();
            updated.set_remote(Some(url.clone()), token.clone());
            updated.validate()?;
            updated.save()?;
            *settings = updated;
        }
        RemoteCommands::Clear => {
            settings.set_remote(None, None);
            settings.save()?;
        }
    }

    let info = info(settings);
    super::render(format, &info, |info| {
        println!("Mode: {}", info.mode);
        if let Some(url) = &info.url {
            println!("URL: {}", url);
        }
        if let Some(token) = &info.token {
            println!("Token: {}", token);
        }
    })
}
