// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for aiter-client
//!
//! Three layers:
//! - [`ChannelError`]: transport-specific failures raised by the channel adapters
//! - [`CallError`]: the normalized, transport-independent outcome callers observe
//! - [`ClientError`]: everything else (settings files, CLI input)

use std::fmt;

use thiserror::Error;

/// Main error type for client-side operations outside the call router
#[derive(Error, Debug)]
pub enum ClientError {
    /// A routed backend call failed
    #[error("Call failed: {0}")]
    Call(#[from] CallError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Normalized error returned by every routed call
///
/// Carries no HTTP status codes or host-specific shapes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// Authorization was rejected by the backend
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The backend executed the call but reported a domain failure
    #[error("{code}: {message}")]
    Application { code: String, message: String },

    /// Network failure, host invocation failure or malformed response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The caller cancelled a streaming call
    #[error("Call aborted")]
    Aborted,

    /// Client-side configuration prevented the call
    #[error("Configuration error: {0}")]
    Config(String),

    /// Arguments could not be shaped into a request
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Classification of a [`CallError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    Application,
    Transport,
    Aborted,
}

impl ErrorKind {
    /// Stable code used by front-ends to decide how to react.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Application => "APPLICATION_ERROR",
            ErrorKind::Transport => "TRANSPORT_ERROR",
            ErrorKind::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CallError {
    /// Classify this error.
    ///
    /// Client-side setup failures are reported as transport failures: the
    /// call never reached the backend and may be retried by the user.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CallError::Unauthorized(_) => ErrorKind::Unauthorized,
            CallError::Application { .. } => ErrorKind::Application,
            CallError::Aborted => ErrorKind::Aborted,
            CallError::Transport(_) | CallError::Config(_) | CallError::InvalidInput(_) => {
                ErrorKind::Transport
            }
        }
    }

    /// Application error code, if the backend supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            CallError::Application { code, .. } => Some(code),
            CallError::Unauthorized(_) => Some("UNAUTHORIZED"),
            _ => None,
        }
    }

    /// Whether the UI should prompt for re-authentication.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CallError::Unauthorized(_))
    }

    /// Whether this is a quiet caller-initiated cancellation.
    pub fn is_aborted(&self) -> bool {
        matches!(self, CallError::Aborted)
    }
}

/// Transport-specific failures raised by channel adapters
///
/// Only the call router interprets these.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// Error envelope embedded in a successful JSON response
    #[error("{code}: {message}")]
    Envelope { code: String, message: String },

    /// Structured error raised by the local host
    #[error("Host error: {message}")]
    Host {
        code: Option<String>,
        message: String,
    },

    /// The local host process went away
    #[error("Local host exited: {0}")]
    HostExited(String),

    /// Remote endpoint settings missing or unreadable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote adapter used before its one-time initialization
    #[error("API_NOT_INITED")]
    NotInitialized,

    /// The action has no route on this transport
    #[error("Action '{action}' is not available over the {transport} channel")]
    UnsupportedRoute {
        action: &'static str,
        transport: &'static str,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Result type alias for routed calls
pub type CallResult<T> = std::result::Result<T, CallError>;
