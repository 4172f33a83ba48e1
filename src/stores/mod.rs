// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Client-side caches of backend state
//!
//! Stores are plain owned values; callers that share one across tasks wrap
//! it in a lock. Concurrent fetches complete in any order, so every write
//! is an upsert keyed by id and the last writer wins.

pub mod ai;
pub mod doc;
pub mod tool;

pub use ai::AiStore;
pub use doc::{DocStore, LearnItem, LearnReport};
pub use tool::ToolStore;

/// Cache key for the default AI (no name).
pub(crate) fn ai_key(ai: Option<&str>) -> String {
    ai.unwrap_or_default().to_string()
}
