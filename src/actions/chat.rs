// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::collections::HashMap;

use serde_json::Value;
use uuid::Uuid;

use crate::entities::HistoryChatEntity;
use crate::error::CallResult;
use crate::router::{Action, Args, CallHandle, CallRouter, StreamCall};

/// One chat turn
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub ai: Option<String>,
    pub message: String,
    /// Key of this question/answer pair; generated when not supplied
    pub exchange: String,
    pub session: Option<String>,
    pub llm_for_chat: Option<String>,
    pub llm_for_reasoning: Option<String>,
    pub llm_options: Option<Value>,
    pub deep: bool,
    pub retrace: bool,
    pub strict: bool,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            ai: None,
            message: message.into(),
            exchange: Uuid::new_v4().to_string(),
            session: None,
            llm_for_chat: None,
            llm_for_reasoning: None,
            llm_options: None,
            deep: false,
            retrace: false,
            strict: false,
        }
    }

    pub fn ai(mut self, ai: Option<impl Into<String>>) -> Self {
        self.ai = ai.map(Into::into);
        self
    }

    pub fn session(mut self, session: Option<impl Into<String>>) -> Self {
        self.session = session.map(Into::into);
        self
    }

    pub fn exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = exchange.into();
        self
    }

    pub fn llms(mut self, chat: Option<String>, reasoning: Option<String>) -> Self {
        self.llm_for_chat = chat;
        self.llm_for_reasoning = reasoning;
        self
    }

    pub fn llm_options(mut self, options: Value) -> Self {
        self.llm_options = Some(options);
        self
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn retrace(mut self, retrace: bool) -> Self {
        self.retrace = retrace;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn into_args(self) -> Args {
        Args::new()
            .with_opt("ai", self.ai)
            .with("message", self.message)
            .with("exchange", self.exchange)
            .with_opt("session", self.session)
            .with_opt("llm_for_chat", self.llm_for_chat)
            .with_opt("llm_for_reasoning", self.llm_for_reasoning)
            .with_opt("llm_options", self.llm_options)
            .with("deep", self.deep)
            .with("retrace", self.retrace)
            .with("strict", self.strict)
    }
}

/// A one-off prompt against an LLM configuration that may not be saved yet
#[derive(Debug, Clone, PartialEq)]
pub struct LlmTestRequest {
    pub prompt: String,
    pub name: String,
    pub protocol: String,
    pub options: HashMap<String, String>,
    pub timeout_secs: Option<u64>,
}

impl LlmTestRequest {
    fn into_args(self) -> Args {
        let options: serde_json::Map<String, Value> = self
            .options
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Args::new()
            .with("prompt", self.prompt)
            .with("name", self.name)
            .with("protocol", self.protocol)
            .with("options", Value::Object(options))
            .with_opt("timeout_secs", self.timeout_secs)
    }
}

impl CallRouter {
    /// Start a chat turn. Events arrive on the returned stream; the answer
    /// is persisted by the backend under the request's exchange key.
    pub fn chat(&self, request: ChatRequest) -> StreamCall {
        self.stream(Action::Chat, request.into_args())
    }

    /// Abort a running chat. Equivalent to [`CallHandle::abort`].
    pub async fn abort_chat(&self, handle: &CallHandle) {
        handle.abort().await;
    }

    /// Ask the local host to stop an exchange that this process did not
    /// start, e.g. one left running by a previous front-end.
    pub async fn abort_exchange(&self, exchange: &str) -> CallResult<()> {
        self.perform(Action::ChatAbort, Args::new().with("exchange", exchange))
            .await
            .map(|_| ())
    }

    pub async fn clear_chat(&self, ai: Option<&str>, session: Option<&str>) -> CallResult<()> {
        self.perform(
            Action::ChatClear,
            Args::new().with_opt("ai", ai).with_opt("session", session),
        )
        .await
        .map(|_| ())
    }

    /// Delete one exchange from the history.
    pub async fn delete_chat(
        &self,
        ai: Option<&str>,
        session: Option<&str>,
        exchange: &str,
    ) -> CallResult<()> {
        self.perform(
            Action::ChatDelete,
            Args::new()
                .with_opt("ai", ai)
                .with_opt("session", session)
                .with("exchange", exchange),
        )
        .await
        .map(|_| ())
    }

    pub async fn chat_history(
        &self,
        ai: Option<&str>,
        session: Option<&str>,
    ) -> CallResult<Vec<HistoryChatEntity>> {
        self.perform_as(
            Action::ChatHistory,
            Args::new().with_opt("ai", ai).with_opt("session", session),
        )
        .await
    }

    /// Stream a test completion; deltas arrive as text events.
    pub fn test_chat_llm(&self, request: LlmTestRequest) -> StreamCall {
        self.stream(Action::LlmTestChat, request.into_args())
    }
}
