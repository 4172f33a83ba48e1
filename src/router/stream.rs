// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Cancellable streaming calls
//!
//! A [`StreamCall`] is created synchronously and does nothing until polled.
//! On first poll it selects the transport and spawns a driver task that
//! pushes raw messages into a bounded queue. Its [`CallHandle`] can abort
//! the call at any time, including before the first poll.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::channel::Channel;
use crate::error::{CallError, CallResult};
use crate::transport::Transport;

use super::{Action, ArgValue, Args, CallRouter};

/// Buffered messages between the driver and the consumer.
pub const STREAM_BUFFER: usize = 64;

/// Sentinel the server sends to end a stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One message of a streaming call
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Answer text delta
    Content(String),
    /// Reasoning text delta
    Reasoning(String),
    /// A tool call started; carries the task as sent by the backend
    ToolCallStart(Value),
    ToolCallEnd { id: String, time: String },
    ToolCallError { id: String, error: String },
    /// Non-JSON data, e.g. LLM test-chat deltas
    Text(String),
}

impl ChatEvent {
    /// Interpret one raw message.
    pub fn parse(raw: &str) -> ChatEvent {
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            _ => return ChatEvent::Text(raw.to_string()),
        };

        if let Some(content) = value.get("content").and_then(Value::as_str) {
            return ChatEvent::Content(content.to_string());
        }
        if let Some(reasoning) = value.get("reasoning").and_then(Value::as_str) {
            return ChatEvent::Reasoning(reasoning.to_string());
        }
        if let Some(task) = value.get("call_tool_start") {
            return ChatEvent::ToolCallStart(task.clone());
        }
        if let Some(end) = value.get("call_tool_end") {
            return ChatEvent::ToolCallEnd {
                id: string_field(end, "id"),
                time: string_field(end, "time"),
            };
        }
        if let Some(failed) = value.get("call_tool_error") {
            return ChatEvent::ToolCallError {
                id: string_field(failed, "id"),
                error: string_field(failed, "error"),
            };
        }

        ChatEvent::Text(raw.to_string())
    }

    /// Text to append to the visible answer, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            ChatEvent::Content(s) | ChatEvent::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn string_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// How a streaming call settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed,
    Aborted,
}

struct HandleState {
    delivery: AbortHandle,
    driver: AbortHandle,
    aborted: AtomicBool,
    finished: AtomicBool,
    transport: OnceLock<Transport>,
    /// `chat_abort` arguments and the local channel to send them on
    local_abort: Option<(Args, Arc<dyn Channel>)>,
}

/// Abort capability for one streaming call
#[derive(Clone)]
pub struct CallHandle {
    state: Arc<HandleState>,
}

impl CallHandle {
    /// Cancel the call. Stops delivery immediately, closes the underlying
    /// connection and, on the local transport, asks the host to stop the
    /// exchange. Safe to call repeatedly and after completion.
    pub async fn abort(&self) {
        if self.state.aborted.swap(true, Ordering::SeqCst) {
            return;
        }
        self.state.delivery.abort();
        self.state.driver.abort();

        if self.state.finished.load(Ordering::SeqCst) {
            return;
        }
        if self.state.transport.get() != Some(&Transport::Local) {
            return;
        }
        let Some((args, local)) = &self.state.local_abort else {
            return;
        };
        if !args.contains("exchange") {
            return;
        }

        tracing::debug!("Aborting local exchange {:?}", args.get_str("exchange"));
        if let Err(e) = local.invoke(Action::ChatAbort.descriptor(), args).await {
            tracing::warn!("Local chat abort failed: {}", e);
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.state.aborted.load(Ordering::SeqCst)
    }

    /// Transport chosen for the call, once it has started.
    pub fn transport(&self) -> Option<Transport> {
        self.state.transport.get().copied()
    }
}

/// Aborts the driver task when the consuming stream goes away.
struct DriverGuard(AbortHandle);

impl Drop for DriverGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A streaming call in progress
pub struct StreamCall {
    inner: Pin<Box<dyn Stream<Item = CallResult<ChatEvent>> + Send>>,
    handle: CallHandle,
}

impl StreamCall {
    /// The abort capability, available before the first event.
    pub fn handle(&self) -> CallHandle {
        self.handle.clone()
    }

    /// Deliver every event to `on_event` until the call settles.
    ///
    /// Returns `Completed` on natural end and `Aborted` after an abort;
    /// errors only for transport or application failures.
    pub async fn run<F>(mut self, mut on_event: F) -> CallResult<StreamOutcome>
    where
        F: FnMut(ChatEvent),
    {
        while let Some(item) = self.next().await {
            match item {
                Ok(event) => on_event(event),
                Err(CallError::Aborted) => return Ok(StreamOutcome::Aborted),
                Err(e) => return Err(e),
            }
        }
        if self.handle.is_aborted() {
            Ok(StreamOutcome::Aborted)
        } else {
            Ok(StreamOutcome::Completed)
        }
    }

    /// Collect all events (tests and non-interactive callers).
    pub async fn collect_events(self) -> CallResult<(Vec<ChatEvent>, StreamOutcome)> {
        let mut events = Vec::new();
        let outcome = self.run(|event| events.push(event)).await?;
        Ok((events, outcome))
    }
}

impl Stream for StreamCall {
    type Item = CallResult<ChatEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.handle.is_aborted() {
            // Release the message queue so the emitter side is not left waiting on it.
            self.inner = Box::pin(stream::empty::<CallResult<ChatEvent>>());
            return Poll::Ready(None);
        }
        self.inner.as_mut().poll_next(cx)
    }
}

/// Build the lazy stream for `action`.
pub(super) fn start(router: CallRouter, action: Action, args: Args) -> StreamCall {
    let (delivery, delivery_reg) = AbortHandle::new_pair();
    let (driver, driver_reg) = AbortHandle::new_pair();

    let local_abort = match (action, router.local_channel()) {
        (Action::Chat, Some(local)) => {
            let mut abort_args = Args::new();
            for key in ["ai", "session", "exchange"] {
                if let Some(ArgValue::Value(value)) = args.get(key) {
                    abort_args.insert(key, value.clone());
                }
            }
            Some((abort_args, local))
        }
        _ => None,
    };

    let state = Arc::new(HandleState {
        delivery,
        driver: driver.clone(),
        aborted: AtomicBool::new(false),
        finished: AtomicBool::new(false),
        transport: OnceLock::new(),
        local_abort,
    });
    let handle = CallHandle {
        state: state.clone(),
    };

    let events = drive(router, action, args, state, driver, driver_reg)
        .map(|item| item.map(|raw| ChatEvent::parse(&raw)));
    let inner = Abortable::new(events, delivery_reg);

    StreamCall {
        inner: Box::pin(inner),
        handle,
    }
}

fn drive(
    router: CallRouter,
    action: Action,
    args: Args,
    state: Arc<HandleState>,
    driver: AbortHandle,
    driver_reg: AbortRegistration,
) -> impl Stream<Item = CallResult<String>> + Send {
    async_stream::stream! {
        let descriptor = action.descriptor();
        if !descriptor.is_streaming() {
            yield Err(CallError::InvalidInput(format!("{} is not a streaming action", descriptor.name)));
            return;
        }

        let transport = router.select().await;
        let _ = state.transport.set(transport);
        tracing::debug!("Streaming {} over {}", descriptor.name, transport);

        let channel = match router.channel(transport) {
            Ok(channel) => channel,
            Err(e) => {
                yield Err(e);
                return;
            }
        };

        let (tx, rx) = mpsc::channel::<String>(STREAM_BUFFER);
        let task = Abortable::new(
            async move { channel.stream(descriptor, &args, tx).await },
            driver_reg,
        );
        let join = tokio::spawn(task);
        let _guard = DriverGuard(driver);

        let mut messages = ReceiverStream::new(rx);
        while let Some(message) = messages.next().await {
            if message == DONE_SENTINEL {
                state.finished.store(true, Ordering::SeqCst);
                return;
            }
            yield Ok(message);
        }

        state.finished.store(true, Ordering::SeqCst);
        match join.await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => yield Err(CallError::from(e)),
            Ok(Err(_aborted)) => yield Err(CallError::Aborted),
            Err(e) => yield Err(CallError::Transport(format!("stream driver failed: {}", e))),
        }
    }
}

/// A stream that fails immediately; used when a call cannot be created.
pub(super) fn failed(err: CallError) -> StreamCall {
    let (delivery, _) = AbortHandle::new_pair();
    let (driver, _) = AbortHandle::new_pair();
    let state = Arc::new(HandleState {
        delivery,
        driver,
        aborted: AtomicBool::new(false),
        finished: AtomicBool::new(true),
        transport: OnceLock::new(),
        local_abort: None,
    });
    StreamCall {
        inner: Box::pin(stream::once(async move { Err(err) })),
        handle: CallHandle { state },
    }
}
