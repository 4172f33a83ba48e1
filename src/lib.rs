// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! aiter-client - dual-transport call router for the Aiter assistant platform.
//!
//! Every operation the Aiter UI can perform is described once in the action
//! table and can be executed against either of two backends:
//! - the local host process, over line-delimited JSON on stdio
//! - a remote Aiter server, over HTTP with SSE for streaming calls
//!
//! The transport is chosen per call from the current configuration, so
//! switching between local and remote never requires rebuilding a router.
//!
//! Modules:
//! - `router`: the action table, argument mapping, unary and streaming calls
//! - `channel`: the local and remote channel implementations
//! - `transport`: transport selection and configuration sources
//! - `actions`: typed operations over the router
//! - `entities`, `stores`: domain records and small client-side caches
//! - `cli`, `commands`: the `aiter-client` command line

pub mod actions;
pub mod channel;
pub mod cli;
pub mod commands;
pub mod config;
pub mod entities;
pub mod error;
pub mod router;
pub mod stores;
pub mod transport;

pub use error::{CallError, CallResult, ClientError, ErrorKind, Result};
pub use router::{Action, Args, CallHandle, CallRouter, ChatEvent, StreamCall, StreamOutcome};
pub use transport::{Transport, TransportConfig, TransportSelector};
