// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for aiter-client.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// aiter-client - talk to an Aiter backend, locally or over the network
#[derive(Parser, Debug)]
#[command(name = "aiter-client")]
#[command(version, about = "Talk to an Aiter backend, locally or over the network")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Remote server base URL for this run (overrides settings)
    #[arg(long, global = true, value_name = "URL")]
    pub remote: Option<String>,

    /// Bearer token for the remote server
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Local host program for this run (overrides settings)
    #[arg(long, global = true, value_name = "PATH")]
    pub host: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the backend version
    Version,

    /// Manage AIs
    Ai(AiArgs),

    /// Chat with an AI (Ctrl-C aborts the answer)
    Chat(ChatArgs),

    /// Show or clear chat history
    History(HistoryArgs),

    /// Manage learned documents
    Doc(DocArgs),

    /// Manage LLM configurations
    Llm(LlmArgs),

    /// Memory statistics and maintenance
    Mem(MemArgs),

    /// List an AI's skills
    Skill(SkillArgs),

    /// Inspect imported tools
    Tool(ToolArgs),

    /// Show or change the remote server
    Remote(RemoteArgs),
}

#[derive(clap::Args, Debug)]
pub struct AiArgs {
    #[command(subcommand)]
    pub command: AiCommands,
}

#[derive(Subcommand, Debug)]
pub enum AiCommands {
    /// List AIs
    List,

    /// Create an AI
    Add { name: String },

    /// Delete an AI and its memory
    Delete { name: String },

    /// Rename an AI
    Rename { name: String, new_name: String },
}

/// Arguments for the chat subcommand
#[derive(clap::Args, Debug)]
pub struct ChatArgs {
    /// The message to send
    pub message: String,

    /// AI to chat with (defaults to the default AI)
    #[arg(long)]
    pub ai: Option<String>,

    /// Chat session
    #[arg(long)]
    pub session: Option<String>,

    /// Exchange key (generated when omitted)
    #[arg(long)]
    pub exchange: Option<String>,

    /// LLM used for the answer
    #[arg(long)]
    pub llm: Option<String>,

    /// LLM used for reasoning
    #[arg(long)]
    pub reasoning_llm: Option<String>,

    /// Deep retrieval
    #[arg(long)]
    pub deep: bool,

    /// Reconsider the previous answer
    #[arg(long)]
    pub retrace: bool,

    /// Only answer from memory
    #[arg(long)]
    pub strict: bool,
}

#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    #[arg(long)]
    pub ai: Option<String>,

    #[arg(long)]
    pub session: Option<String>,

    /// Clear the history instead of showing it
    #[arg(long)]
    pub clear: bool,

    /// Delete one exchange
    #[arg(long, value_name = "EXCHANGE", conflicts_with = "clear")]
    pub delete: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DocArgs {
    #[command(subcommand)]
    pub command: DocCommands,
}

#[derive(Subcommand, Debug)]
pub enum DocCommands {
    /// Learn one or more files
    Learn {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long)]
        ai: Option<String>,
    },

    /// List learned documents
    List {
        #[arg(long)]
        ai: Option<String>,

        #[arg(long, default_value = "")]
        search: String,

        #[arg(long, default_value_t = crate::actions::DEFAULT_PAGE_SIZE)]
        limit: u64,

        #[arg(long, default_value_t = 0)]
        offset: u64,
    },

    /// Delete a document
    Delete {
        id: String,

        #[arg(long)]
        ai: Option<String>,
    },

    /// Show a document's parts
    Parts {
        id: String,

        #[arg(long)]
        ai: Option<String>,

        /// Only this part
        #[arg(long)]
        index: Option<u64>,
    },

    /// List documents still being digested
    Digesting {
        #[arg(long)]
        ai: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
pub struct LlmArgs {
    #[command(subcommand)]
    pub command: LlmCommands,
}

#[derive(Subcommand, Debug)]
pub enum LlmCommands {
    /// List configured LLMs and the active one per type
    List,

    /// Make an LLM active for a type (chat, reasoning)
    Active {
        #[arg(value_name = "TYPE")]
        llm_type: String,
        name: String,
    },

    /// Send a test prompt to a configured LLM
    Test {
        name: String,

        #[arg(default_value = "Hello")]
        prompt: String,

        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Delete an LLM configuration
    Delete { name: String },
}

#[derive(clap::Args, Debug)]
pub struct MemArgs {
    #[command(subcommand)]
    pub command: MemCommands,
}

#[derive(Subcommand, Debug)]
pub enum MemCommands {
    /// Show memory size
    Stats {
        #[arg(long)]
        ai: Option<String>,
    },

    /// Compact memory
    Vacuum {
        #[arg(long)]
        ai: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
pub struct SkillArgs {
    #[command(subcommand)]
    pub command: SkillCommands,
}

#[derive(Subcommand, Debug)]
pub enum SkillCommands {
    /// List skills
    List {
        #[arg(long)]
        ai: Option<String>,

        #[arg(long, default_value = "")]
        search: String,

        #[arg(long, default_value_t = crate::actions::DEFAULT_PAGE_SIZE)]
        limit: u64,

        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
}

#[derive(clap::Args, Debug)]
pub struct ToolArgs {
    #[command(subcommand)]
    pub command: ToolCommands,
}

#[derive(Subcommand, Debug)]
pub enum ToolCommands {
    /// List toolsets
    Toolsets,

    /// List the tools of a toolset
    List { toolset_id: String },
}

#[derive(clap::Args, Debug)]
pub struct RemoteArgs {
    #[command(subcommand)]
    pub command: RemoteCommands,
}

#[derive(Subcommand, Debug)]
pub enum RemoteCommands {
    /// Show the configured remote server
    Show,

    /// Use a remote server
    Set {
        url: String,

        #[arg(long)]
        token: Option<String>,
    },

    /// Go back to the local host
    Clear,
}

/// Output format for responses
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Text,

    /// JSON output
    Json,
}
