// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Typed action facade
//!
//! One async method on [`CallRouter`] per logical backend action. Each one
//! builds [`Args`](crate::router::Args), dispatches through
//! [`CallRouter::perform`] or [`CallRouter::stream`], and maps the payload
//! into an entity. Where the two transports answer with different shapes
//! (plain-text counts, learn results) the mapping here reconciles them.

mod ai;
mod app;
mod chat;
mod doc;
mod llm;
mod mem;
mod skill;
mod tool;

pub use chat::{ChatRequest, LlmTestRequest};

use serde_json::Value;

use crate::entities::{DocEntity, LearnOutcome};
use crate::error::{CallError, CallResult};

/// Default page size for document and skill listings.
pub const DEFAULT_PAGE_SIZE: u64 = 21;

/// Default number of digesting document ids fetched at once.
pub const DEFAULT_DIGESTING_LIMIT: u64 = 100;

/// Interpret a count that may arrive as a number or as text.
///
/// Unparsable values count as zero.
pub(crate) fn parse_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Interpret a text payload; `null` and empty text mean nothing.
pub(crate) fn parse_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Normalize a learn result.
///
/// The local host answers `[doc_id, doc_exists]`; the remote server answers
/// `{"doc": {...}, "doc_exists": bool}`.
pub(crate) fn parse_learn_outcome(value: Value) -> CallResult<LearnOutcome> {
    match value {
        Value::Array(items) => match items.as_slice() {
            [Value::String(doc_id), Value::Bool(doc_exists)] => Ok(LearnOutcome {
                doc_id: doc_id.clone(),
                doc_exists: *doc_exists,
                doc: None,
            }),
            _ => Err(malformed("doc_learn", "expected [doc_id, doc_exists]")),
        },
        Value::Object(mut map) => {
            let doc_exists = map
                .get("doc_exists")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let doc: Option<DocEntity> = match map.remove("doc") {
                Some(doc) => {
                    Some(serde_json::from_value(doc).map_err(|e| malformed("doc_learn", e))?)
                }
                None => None,
            };
            let doc_id = doc
                .as_ref()
                .map(|d| d.id.clone())
                .or_else(|| {
                    map.get("doc_id")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .ok_or_else(|| malformed("doc_learn", "missing document id"))?;
            Ok(LearnOutcome {
                doc_id,
                doc_exists,
                doc,
            })
        }
        _ => Err(malformed("doc_learn", "unexpected payload")),
    }
}

fn malformed(action: &str, detail: impl std::fmt::Display) -> CallError {
    CallError::Transport(format!("malformed {} response: {}", action, detail))
}
