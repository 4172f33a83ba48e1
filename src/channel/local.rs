// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Local channel: named operations on an embedded host

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::ChannelError;
use crate::router::{ActionDescriptor, Args};
use crate::transport::Transport;

use super::Channel;

/// The embedded backend reachable without a network
#[async_trait]
pub trait LocalHost: Send + Sync {
    /// Invoke an operation and await its single structured response.
    async fn invoke(&self, op: &str, args: Value) -> Result<Value, ChannelError>;

    /// Invoke an operation that pushes messages into `sender` while it runs.
    async fn invoke_with_channel(
        &self,
        op: &str,
        args: Value,
        sender: mpsc::Sender<String>,
    ) -> Result<Value, ChannelError>;
}

/// [`Channel`] over a [`LocalHost`]
#[derive(Clone)]
pub struct LocalChannel {
    host: Arc<dyn LocalHost>,
}

impl LocalChannel {
    pub fn new(host: Arc<dyn LocalHost>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &Arc<dyn LocalHost> {
        &self.host
    }

    fn operation(descriptor: &ActionDescriptor) -> Result<&'static str, ChannelError> {
        descriptor.local_op.ok_or(ChannelError::UnsupportedRoute {
            action: descriptor.name,
            transport: "local",
        })
    }
}

#[async_trait]
impl Channel for LocalChannel {
    fn transport(&self) -> Transport {
        Transport::Local
    }

    async fn invoke(
        &self,
        descriptor: &'static ActionDescriptor,
        args: &Args,
    ) -> Result<Value, ChannelError> {
        let op = Self::operation(descriptor)?;
        self.host.invoke(op, args.to_local(descriptor)).await
    }

    async fn stream(
        &self,
        descriptor: &'static ActionDescriptor,
        args: &Args,
        sink: mpsc::Sender<String>,
    ) -> Result<(), ChannelError> {
        let op = Self::operation(descriptor)?;
        self.host
            .invoke_with_channel(op, args.to_local(descriptor), sink)
            .await?;
        Ok(())
    }
}
