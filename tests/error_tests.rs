// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io;

use aiter_client::error::ChannelError;
use aiter_client::{CallError, ClientError, ErrorKind};

#[test]
fn test_io_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
    let client_error: ClientError = io_error.into();

    match client_error {
        ClientError::Io(_) => {} // Expected
        _ => panic!("Expected Io error, got different error type"),
    }
}

#[test]
fn test_config_error_display() {
    let error = ClientError::Config("bad remote url".to_string());
    assert_eq!(error.to_string(), "Configuration error: bad remote url");
}

#[test]
fn test_call_error_wraps_into_client_error() {
    let error: ClientError = CallError::Unauthorized("expired".to_string()).into();
    assert_eq!(error.to_string(), "Call failed: Unauthorized: expired");
}

#[test]
fn test_application_error_display() {
    let error = CallError::Application {
        code: "SERVER_ERROR".to_string(),
        message: "AI not found".to_string(),
    };
    assert_eq!(error.to_string(), "SERVER_ERROR: AI not found");
    assert_eq!(error.kind(), ErrorKind::Application);
    assert_eq!(error.code(), Some("SERVER_ERROR"));
}

#[test]
fn test_aborted_is_quiet() {
    let error = CallError::Aborted;
    assert!(error.is_aborted());
    assert!(!error.is_unauthorized());
    assert_eq!(error.kind(), ErrorKind::Aborted);
}

#[test]
fn test_channel_errors_normalize() {
    let cases = vec![
        (
            ChannelError::Status {
                status: 401,
                body: String::new(),
            },
            ErrorKind::Unauthorized,
        ),
        (
            ChannelError::Host {
                code: Some("PERMISSION_DENIED".to_string()),
                message: "no".to_string(),
            },
            ErrorKind::Unauthorized,
        ),
        (
            ChannelError::Envelope {
                code: "SERVER_ERROR".to_string(),
                message: "boom".to_string(),
            },
            ErrorKind::Application,
        ),
        (
            ChannelError::HostExited("broken pipe".to_string()),
            ErrorKind::Transport,
        ),
        (ChannelError::NotInitialized, ErrorKind::Transport),
    ];

    for (channel_error, kind) in cases {
        let label = channel_error.to_string();
        assert_eq!(CallError::from(channel_error).kind(), kind, "{}", label);
    }
}
