// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Channel adapters
//!
//! A [`Channel`] carries one action to the backend. Two implementations exist:
//! - [`LocalChannel`]: invokes a named operation on a [`LocalHost`]
//! - [`RemoteChannel`]: issues HTTP requests or opens an SSE stream
//!
//! Channels report transport-specific [`ChannelError`]s; turning those into
//! caller-facing errors is the router's job.

pub mod local;
pub mod mock_host;
pub mod remote;
pub mod sse;
pub mod stdio_host;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::ChannelError;
use crate::router::{ActionDescriptor, Args};
use crate::transport::Transport;

pub use local::{LocalChannel, LocalHost};
pub use mock_host::{MockHost, RecordedCall};
pub use remote::RemoteChannel;
pub use sse::{SseDecoder, SseEvent};
pub use stdio_host::StdioHost;

/// Carries actions over one transport
#[async_trait]
pub trait Channel: Send + Sync {
    /// Which transport this channel implements.
    fn transport(&self) -> Transport;

    /// Perform a unary action and return its payload.
    async fn invoke(
        &self,
        descriptor: &'static ActionDescriptor,
        args: &Args,
    ) -> Result<Value, ChannelError>;

    /// Perform a streaming action, pushing each raw message into `sink`
    /// in emission order. Returns when the backend finishes the stream.
    async fn stream(
        &self,
        descriptor: &'static ActionDescriptor,
        args: &Args,
        sink: mpsc::Sender<String>,
    ) -> Result<(), ChannelError>;
}
