// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Call router
//!
//! One entry point per call shape:
//! - [`CallRouter::perform`] for unary actions
//! - [`CallRouter::stream`] for streaming actions (chat, LLM test-chat)
//!
//! For every call the router selects the transport, hands the action's
//! descriptor and arguments to the matching channel and normalizes whatever
//! comes back. Typed wrappers for each action live in [`crate::actions`].

pub mod action;
pub mod args;
mod normalize;
pub mod stream;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::channel::{Channel, LocalChannel, LocalHost, RemoteChannel};
use crate::error::{CallError, CallResult};
use crate::transport::{Transport, TransportSelector};

pub use action::{Action, ActionDescriptor, CallMode, Method, Param, ParamKind, Route, ACTIONS};
pub use args::{ArgValue, Args, FilePart, FormBody};
pub use stream::{CallHandle, ChatEvent, StreamCall, StreamOutcome};

/// Routes logical actions to the local or remote channel
#[derive(Clone)]
pub struct CallRouter {
    selector: TransportSelector,
    local: Option<Arc<dyn Channel>>,
    remote: Option<Arc<dyn Channel>>,
}

impl CallRouter {
    /// Create a router with no channels attached.
    pub fn new(selector: TransportSelector) -> Self {
        Self {
            selector,
            local: None,
            remote: None,
        }
    }

    /// Attach the local channel.
    pub fn with_local(mut self, channel: Arc<dyn Channel>) -> Self {
        self.local = Some(channel);
        self
    }

    /// Attach a local channel over `host`.
    pub fn with_local_host(self, host: Arc<dyn LocalHost>) -> Self {
        self.with_local(Arc::new(LocalChannel::new(host)))
    }

    /// Attach the remote channel.
    pub fn with_remote(mut self, channel: Arc<dyn Channel>) -> Self {
        self.remote = Some(channel);
        self
    }

    /// Attach a remote channel.
    pub fn with_remote_channel(self, channel: RemoteChannel) -> Self {
        self.with_remote(Arc::new(channel))
    }

    pub fn selector(&self) -> &TransportSelector {
        &self.selector
    }

    /// Transport the next call would use.
    pub async fn select(&self) -> Transport {
        self.selector.select().await
    }

    pub async fn is_remote(&self) -> bool {
        self.selector.is_remote().await
    }

    pub(crate) fn local_channel(&self) -> Option<Arc<dyn Channel>> {
        self.local.clone()
    }

    fn channel(&self, transport: Transport) -> CallResult<Arc<dyn Channel>> {
        let channel = match transport {
            Transport::Local => self.local.clone(),
            Transport::Remote => self.remote.clone(),
        };
        channel.ok_or_else(|| CallError::Config(format!("no {} channel configured", transport)))
    }

    /// Perform a unary action and return its unwrapped payload.
    pub async fn perform(&self, action: Action, args: Args) -> CallResult<Value> {
        let descriptor = action.descriptor();
        if descriptor.is_streaming() {
            return Err(CallError::InvalidInput(format!(
                "{} is a streaming action",
                descriptor.name
            )));
        }

        let transport = self.select().await;
        tracing::debug!("Dispatching {} over {}", descriptor.name, transport);
        let channel = self.channel(transport)?;

        match channel.invoke(descriptor, &args).await {
            Ok(value) => Ok(value),
            Err(e) => {
                let err = CallError::from(e);
                tracing::debug!("{} failed over {}: {}", descriptor.name, transport, err);
                Err(err)
            }
        }
    }

    /// Perform a unary action and deserialize its payload.
    pub async fn perform_as<T: DeserializeOwned>(&self, action: Action, args: Args) -> CallResult<T> {
        let value = self.perform(action, args).await?;
        serde_json::from_value(value).map_err(|e| {
            CallError::Transport(format!("malformed {} response: {}", action.name(), e))
        })
    }

    /// Start a streaming action. Returns immediately; the call begins when
    /// the stream is first polled, and [`StreamCall::handle`] can abort it
    /// at any point.
    pub fn stream(&self, action: Action, args: Args) -> StreamCall {
        if !action.is_streaming() {
            return stream::failed(CallError::InvalidInput(format!(
                "{} is not a streaming action",
                action.name()
            )));
        }
        stream::start(self.clone(), action, args)
    }
}

impl std::fmt::Debug for CallRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallRouter")
            .field("selector", &self.selector)
            .field("local", &self.local.is_some())
            .field("remote", &self.remote.is_some())
            .finish()
    }
}
