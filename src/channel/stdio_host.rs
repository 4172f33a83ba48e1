// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Child-process host speaking line-delimited JSON over stdio
//!
//! # Request Format
//!
//! ```json
//! {"id": 1, "cmd": "ai_rename", "args": {"name": "a", "newName": "b"}}
//! ```
//!
//! # Reply Format
//!
//! Zero or more channel pushes for streaming operations:
//!
//! ```json
//! {"id": 1, "message": "{\"content\":\"Hel\"}"}
//! ```
//!
//! followed by exactly one of:
//!
//! ```json
//! {"id": 1, "result": {"id": "01J...", "name": "b"}}
//! {"id": 1, "error": {"code": "SERVER_ERROR", "message": "..."}}
//! ```

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot, watch};

use crate::config::LocalHostConfig;
use crate::error::ChannelError;

use super::LocalHost;

/// Request written to the host's stdin.
#[derive(Debug, Clone, Serialize)]
pub struct HostRequest<'a> {
    pub id: u64,
    pub cmd: &'a str,
    pub args: &'a Value,
}

/// Error payload in a host reply.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HostErrorPayload {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

/// One line read from the host's stdout.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HostReply {
    pub id: u64,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<HostErrorPayload>,
}

impl HostReply {
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

struct PendingCall {
    reply: oneshot::Sender<Result<Value, ChannelError>>,
    messages: Option<mpsc::UnboundedSender<String>>,
}

type PendingMap = Arc<Mutex<HashMap<u64, PendingCall>>>;

fn lock_pending(pending: &PendingMap) -> MutexGuard<'_, HashMap<u64, PendingCall>> {
    match pending.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Host pending-call lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Forward host messages into `sink` from a task of their own, so a caller
/// that stops reading never stalls the reply reader. Sending `true` on the
/// returned watch drops whatever is still queued.
fn relay_messages(sink: mpsc::Sender<String>) -> (mpsc::UnboundedSender<String>, watch::Sender<bool>) {
    let (queue_tx, mut queue_rx) = mpsc::unbounded_channel::<String>();
    let (stop_tx, mut stop_rx) = watch::channel(false);

    tokio::spawn(async move {
        while let Some(message) = queue_rx.recv().await {
            tokio::select! {
                sent = sink.send(message) => {
                    if sent.is_err() {
                        break;
                    }
                }
                Ok(()) = stop_rx.changed() => break,
            }
        }
    });

    (queue_tx, stop_tx)
}

/// Unregisters a call whose future is dropped before the host answers.
struct PendingGuard<'a> {
    pending: &'a PendingMap,
    id: u64,
    stop: Option<watch::Sender<bool>>,
    answered: bool,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.answered {
            return;
        }
        if lock_pending(self.pending).remove(&self.id).is_some() {
            tracing::debug!("Host call {} dropped before its reply", self.id);
        }
        if let Some(stop) = &self.stop {
            let _ = stop.send(true);
        }
    }
}

/// [`LocalHost`] backed by a long-lived child process
pub struct StdioHost {
    stdin: tokio::sync::Mutex<ChildStdin>,
    child: tokio::sync::Mutex<Child>,
    pending: PendingMap,
    next_id: AtomicU64,
    closed: Arc<AtomicBool>,
}

impl StdioHost {
    /// Spawn the configured host program.
    pub fn spawn(config: &LocalHostConfig) -> Result<Self, ChannelError> {
        let program = config.program.as_ref().ok_or_else(|| {
            ChannelError::HostExited("no local host program configured".to_string())
        })?;

        let mut child = Command::new(program)
            .args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ChannelError::HostExited(format!(
                    "failed to spawn local host '{}': {}",
                    program.display(),
                    e
                ))
            })?;

        tracing::debug!("Spawned local host {} (pid {:?})", program.display(), child.id());

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChannelError::HostExited("host stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ChannelError::HostExited("host stdout unavailable".to_string()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::debug!(target: "aiter_client::host", "{}", line);
                }
            });
        }

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));
        tokio::spawn(read_replies(stdout, pending.clone(), closed.clone()));

        Ok(Self {
            stdin: tokio::sync::Mutex::new(stdin),
            child: tokio::sync::Mutex::new(child),
            pending,
            next_id: AtomicU64::new(1),
            closed,
        })
    }

    /// Whether the host has stopped answering.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Kill the host process. Pending calls fail once its output closes.
    pub async fn shutdown(&self) -> Result<(), ChannelError> {
        let mut child = self.child.lock().await;
        child.kill().await?;
        Ok(())
    }

    async fn call(
        &self,
        op: &str,
        args: Value,
        messages: Option<mpsc::Sender<String>>,
    ) -> Result<Value, ChannelError> {
        if self.is_closed() {
            return Err(ChannelError::HostExited("local host is not running".to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (reply_tx, reply_rx) = oneshot::channel();
        let (messages, stop) = match messages {
            Some(sink) => {
                let (queue, stop) = relay_messages(sink);
                (Some(queue), Some(stop))
            }
            None => (None, None),
        };
        lock_pending(&self.pending).insert(
            id,
            PendingCall {
                reply: reply_tx,
                messages,
            },
        );
        let mut guard = PendingGuard {
            pending: &self.pending,
            id,
            stop,
            answered: false,
        };

        let request = HostRequest {
            id,
            cmd: op,
            args: &args,
        };
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');

        let written = {
            let mut stdin = self.stdin.lock().await;
            match stdin.write_all(line.as_bytes()).await {
                Ok(()) => stdin.flush().await,
                Err(e) => Err(e),
            }
        };
        if let Err(e) = written {
            return Err(ChannelError::HostExited(format!(
                "failed to write to local host: {}",
                e
            )));
        }

        tracing::trace!("Host request {} sent: {}", id, op);

        let reply = reply_rx.await;
        guard.answered = true;
        reply.map_err(|_| ChannelError::HostExited("local host dropped the call".to_string()))?
    }
}

async fn read_replies(stdout: ChildStdout, pending: PendingMap, closed: Arc<AtomicBool>) {
    let mut lines = BufReader::new(stdout).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read from local host: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match HostReply::parse(&line) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!("Ignoring unparsable host output ({}): {}", e, line);
                continue;
            }
        };

        dispatch_reply(&pending, reply);
    }

    closed.store(true, Ordering::SeqCst);
    let drained: Vec<PendingCall> = lock_pending(&pending).drain().map(|(_, c)| c).collect();
    tracing::debug!("Local host output closed, failing {} pending calls", drained.len());
    for call in drained {
        let _ = call.reply.send(Err(ChannelError::HostExited(
            "local host exited".to_string(),
        )));
    }
}

fn dispatch_reply(pending: &PendingMap, reply: HostReply) {
    if let Some(message) = reply.message {
        let text = match message {
            Value::String(s) => s,
            other => other.to_string(),
        };
        let mut pending = lock_pending(pending);
        let Some(call) = pending.get_mut(&reply.id) else {
            tracing::debug!("Host message for unknown call {}", reply.id);
            return;
        };
        let listening = match &call.messages {
            Some(queue) => queue.send(text).is_ok(),
            None => false,
        };
        // The caller stopped listening; drop later messages for this call.
        if !listening {
            call.messages = None;
        }
        return;
    }

    let Some(call) = lock_pending(pending).remove(&reply.id) else {
        tracing::debug!("Host reply for unknown call {}", reply.id);
        return;
    };

    let outcome = match reply.error {
        Some(error) => Err(ChannelError::Host {
            code: error.code,
            message: error.message,
        }),
        None => Ok(reply.result.unwrap_or(Value::Null)),
    };
    let _ = call.reply.send(outcome);
}

#[async_trait]
impl LocalHost for StdioHost {
    async fn invoke(&self, op: &str, args: Value) -> Result<Value, ChannelError> {
        self.call(op, args, None).await
    }

    async fn invoke_with_channel(
        &self,
        op: &str,
        args: Value,
        sender: mpsc::Sender<String>,
    ) -> Result<Value, ChannelError> {
        self.call(op, args, Some(sender)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ===== Protocol Tests =====

    #[test]
    fn test_request_serialization() {
        let args = json!({"name": "a"});
        let request = HostRequest {
            id: 3,
            cmd: "ai_add",
            args: &args,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"id":3,"cmd":"ai_add","args":{"name":"a"}}"#);
    }

    #[test]
    fn test_reply_parse_result() {
        let reply = HostReply::parse(r#"{"id":1,"result":{"ok":true}}"#).unwrap();
        assert_eq!(reply.id, 1);
        assert_eq!(reply.result, Some(json!({"ok": true})));
        assert!(reply.error.is_none());
    }

    #[test]
    fn test_reply_parse_error() {
        let reply =
            HostReply::parse(r#"{"id":2,"error":{"code":"SERVER_ERROR","message":"bad"}}"#)
                .unwrap();
        let error = reply.error.unwrap();
        assert_eq!(error.code.as_deref(), Some("SERVER_ERROR"));
        assert_eq!(error.message, "bad");
    }

    #[test]
    fn test_reply_parse_message() {
        let reply = HostReply::parse(r#"{"id":5,"message":"{\"content\":\"x\"}"}"#).unwrap();
        assert_eq!(reply.message, Some(json!("{\"content\":\"x\"}")));
    }

    // ===== Dispatch Tests =====

    #[tokio::test]
    async fn test_dispatch_routes_by_id() {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        lock_pending(&pending).insert(1, PendingCall { reply: tx1, messages: None });
        lock_pending(&pending).insert(2, PendingCall { reply: tx2, messages: None });

        dispatch_reply(&pending, HostReply::parse(r#"{"id":2,"result":"two"}"#).unwrap());
        dispatch_reply(&pending, HostReply::parse(r#"{"id":1,"result":"one"}"#).unwrap());

        assert_eq!(rx1.await.unwrap().unwrap(), json!("one"));
        assert_eq!(rx2.await.unwrap().unwrap(), json!("two"));
        assert!(lock_pending(&pending).is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_messages_before_result() {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (reply_tx, reply_rx) = oneshot::channel();
        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
        lock_pending(&pending).insert(
            7,
            PendingCall {
                reply: reply_tx,
                messages: Some(msg_tx),
            },
        );

        dispatch_reply(&pending, HostReply::parse(r#"{"id":7,"message":"a"}"#).unwrap());
        dispatch_reply(&pending, HostReply::parse(r#"{"id":7,"message":{"content":"b"}}"#).unwrap());
        dispatch_reply(&pending, HostReply::parse(r#"{"id":7,"result":null}"#).unwrap());

        assert_eq!(msg_rx.recv().await.unwrap(), "a");
        assert_eq!(msg_rx.recv().await.unwrap(), r#"{"content":"b"}"#);
        assert_eq!(reply_rx.await.unwrap().unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_dispatch_error_reply() {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (tx, rx) = oneshot::channel();
        lock_pending(&pending).insert(1, PendingCall { reply: tx, messages: None });

        dispatch_reply(
            &pending,
            HostReply::parse(r#"{"id":1,"error":{"code":"UNAUTHORIZED","message":"no"}}"#).unwrap(),
        );

        match rx.await.unwrap() {
            Err(ChannelError::Host { code, .. }) => assert_eq!(code.as_deref(), Some("UNAUTHORIZED")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_unregisters_closed_listener() {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (reply_tx, _reply_rx) = oneshot::channel();
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        lock_pending(&pending).insert(
            4,
            PendingCall {
                reply: reply_tx,
                messages: Some(msg_tx),
            },
        );
        drop(msg_rx);

        dispatch_reply(&pending, HostReply::parse(r#"{"id":4,"message":"a"}"#).unwrap());

        let pending = lock_pending(&pending);
        assert!(pending.get(&4).unwrap().messages.is_none());
    }

    #[tokio::test]
    async fn test_relay_stops_on_request_with_full_sink() {
        let (sink, mut rx) = mpsc::channel(1);
        let (queue, stop) = relay_messages(sink);
        for message in ["a", "b", "c"] {
            queue.send(message.to_string()).unwrap();
        }

        // "a" fills the sink and the relay parks on "b".
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        stop.send(true).unwrap();

        let received = tokio::time::timeout(std::time::Duration::from_secs(2), async {
            let mut received = Vec::new();
            while let Some(message) = rx.recv().await {
                received.push(message);
            }
            received
        })
        .await
        .expect("relay task did not release the sink");
        assert_eq!(received, vec!["a".to_string()]);
    }

    #[test]
    fn test_spawn_without_program_fails() {
        let config = LocalHostConfig::default();
        assert!(matches!(
            StdioHost::spawn(&config),
            Err(ChannelError::HostExited(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdio_host_round_trip_with_shell_echo() {
        // `sh` answers every request line with a fixed result for id 1.
        let config = LocalHostConfig {
            program: Some("sh".into()),
            args: vec![
                "-c".to_string(),
                r#"read line; echo '{"id":1,"message":"hi"}'; echo '{"id":1,"result":"done"}'"#
                    .to_string(),
            ],
            env: HashMap::new(),
        };
        let host = StdioHost::spawn(&config).unwrap();

        let (tx, mut rx) = mpsc::channel(4);
        let result = host
            .invoke_with_channel("chat", json!({}), tx)
            .await
            .unwrap();
        assert_eq!(result, json!("done"));
        assert_eq!(rx.recv().await.as_deref(), Some("hi"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdio_host_exit_fails_pending_calls() {
        let config = LocalHostConfig {
            program: Some("sh".into()),
            args: vec!["-c".to_string(), "read line; exit 0".to_string()],
            env: HashMap::new(),
        };
        let host = StdioHost::spawn(&config).unwrap();

        let err = host.invoke("ai_list", json!({})).await.unwrap_err();
        assert!(matches!(err, ChannelError::HostExited(_)));
    }
}
