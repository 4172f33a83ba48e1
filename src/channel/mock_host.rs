// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Scripted in-memory host for testing
//!
//! Records every invocation and answers with configured fixtures. Streaming
//! operations push scripted messages, optionally spaced by a delay. Like the
//! real host, a `chat_abort` carrying an exchange key stops the emitter of
//! that exchange.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::ChannelError;

use super::LocalHost;

/// An invocation seen by the mock host
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub op: String,
    pub args: Value,
}

#[derive(Debug, Clone)]
enum Reply {
    Ok(Value),
    Err {
        code: Option<String>,
        message: String,
    },
}

#[derive(Default)]
struct State {
    replies: HashMap<String, Reply>,
    messages: HashMap<String, Vec<String>>,
    delays: HashMap<String, Duration>,
    calls: Vec<RecordedCall>,
    aborted: HashSet<String>,
}

/// In-memory [`LocalHost`]
#[derive(Default)]
pub struct MockHost {
    state: Mutex<State>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Mock host state lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Reply to `op` with a successful payload.
    pub fn respond(&self, op: &str, value: Value) {
        self.lock().replies.insert(op.to_string(), Reply::Ok(value));
    }

    /// Reply to `op` with a host error.
    pub fn fail(&self, op: &str, code: Option<&str>, message: &str) {
        self.lock().replies.insert(
            op.to_string(),
            Reply::Err {
                code: code.map(str::to_string),
                message: message.to_string(),
            },
        );
    }

    /// Messages pushed by a streaming `op` before it replies.
    pub fn push_messages(&self, op: &str, messages: Vec<String>) {
        self.lock().messages.insert(op.to_string(), messages);
    }

    /// Wait this long before each pushed message of `op`.
    pub fn set_message_delay(&self, op: &str, delay: Duration) {
        self.lock().delays.insert(op.to_string(), delay);
    }

    /// All recorded invocations, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Recorded invocations of one operation.
    pub fn calls_to(&self, op: &str) -> Vec<RecordedCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.op == op)
            .cloned()
            .collect()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.lock().calls.last().cloned()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn record(&self, op: &str, args: &Value) -> Reply {
        let mut state = self.lock();
        state.calls.push(RecordedCall {
            op: op.to_string(),
            args: args.clone(),
        });

        if op == "chat_abort" {
            if let Some(exchange) = args.get("exchange").and_then(Value::as_str) {
                state.aborted.insert(exchange.to_string());
            }
        }

        state
            .replies
            .get(op)
            .cloned()
            .unwrap_or(Reply::Ok(Value::Null))
    }

    fn is_aborted(&self, args: &Value) -> bool {
        args.get("exchange")
            .and_then(Value::as_str)
            .is_some_and(|exchange| self.lock().aborted.contains(exchange))
    }

    fn into_result(reply: Reply) -> Result<Value, ChannelError> {
        match reply {
            Reply::Ok(value) => Ok(value),
            Reply::Err { code, message } => Err(ChannelError::Host { code, message }),
        }
    }
}

#[async_trait]
impl LocalHost for MockHost {
    async fn invoke(&self, op: &str, args: Value) -> Result<Value, ChannelError> {
        Self::into_result(self.record(op, &args))
    }

    async fn invoke_with_channel(
        &self,
        op: &str,
        args: Value,
        sender: mpsc::Sender<String>,
    ) -> Result<Value, ChannelError> {
        let reply = self.record(op, &args);
        let (messages, delay) = {
            let state = self.lock();
            (
                state.messages.get(op).cloned().unwrap_or_default(),
                state.delays.get(op).copied(),
            )
        };

        for message in messages {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.is_aborted(&args) {
                break;
            }
            if sender.send(message).await.is_err() {
                break;
            }
        }

        Self::into_result(reply)
    }
}
