// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Channel error normalization
//!
//! The only place where transport-specific failures are interpreted.

use crate::error::{CallError, ChannelError};

const UNAUTHORIZED: &str = "UNAUTHORIZED";
const PERMISSION_DENIED: &str = "PERMISSION_DENIED";

impl From<ChannelError> for CallError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Status { status: 401, body } => CallError::Unauthorized(if body.is_empty() {
                "Unauthorized".to_string()
            } else {
                body
            }),
            ChannelError::Envelope { code, message } if code == UNAUTHORIZED => {
                CallError::Unauthorized(message)
            }
            ChannelError::Envelope { code, message } => CallError::Application { code, message },
            ChannelError::Host {
                code: Some(code),
                message,
            } if code == UNAUTHORIZED || code == PERMISSION_DENIED => {
                CallError::Unauthorized(message)
            }
            ChannelError::Host {
                code: Some(code),
                message,
            } => CallError::Application { code, message },
            ChannelError::Host {
                code: None,
                message,
            } => CallError::Transport(message),
            ChannelError::Config(message) => CallError::Config(message),
            other => CallError::Transport(other.to_string()),
        }
    }
}
