// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat and history commands

use std::future::Future;
use std::io::{self, Write};

use serde_json::{json, Value};

use crate::actions::ChatRequest;
use crate::cli::{ChatArgs, HistoryArgs, OutputFormat};
use crate::error::{CallResult, Result};
use crate::router::{ChatEvent, StreamCall, StreamOutcome};

use super::Session;

/// JSON line for one event in `--format json` mode.
pub(crate) fn event_json(event: &ChatEvent) -> Value {
    match event {
        ChatEvent::Content(text) => json!({ "content": text }),
        ChatEvent::Reasoning(text) => json!({ "reasoning": text }),
        ChatEvent::ToolCallStart(task) => json!({ "call_tool_start": task }),
        ChatEvent::ToolCallEnd { id, time } => json!({ "call_tool_end": { "id": id, "time": time } }),
        ChatEvent::ToolCallError { id, error } => {
            json!({ "call_tool_error": { "id": id, "error": error } })
        }
        ChatEvent::Text(text) => json!({ "text": text }),
    }
}

fn print_event(format: OutputFormat, event: ChatEvent) {
    if format == OutputFormat::Json {
        println!("{}", event_json(&event));
        return;
    }

    match &event {
        ChatEvent::Content(text) | ChatEvent::Text(text) => {
            print!("{}", text);
            let _ = io::stdout().flush();
        }
        ChatEvent::Reasoning(text) => {
            eprint!("{}", text);
        }
        ChatEvent::ToolCallStart(task) => {
            let name = task
                .get("tool_id")
                .and_then(Value::as_str)
                .unwrap_or("tool");
            eprintln!("\n[calling {}]", name);
        }
        ChatEvent::ToolCallEnd { id, .. } => eprintln!("[tool call {} done]", id),
        ChatEvent::ToolCallError { id, error } => eprintln!("[tool call {} failed: {}]", id, error),
    }
}

/// Drive `call` until it settles, aborting it once `interrupt` yields true.
async fn run_interruptible<I, F>(
    call: StreamCall,
    interrupt: I,
    on_event: F,
) -> CallResult<StreamOutcome>
where
    I: Future<Output = bool> + Send + 'static,
    F: FnMut(ChatEvent),
{
    let handle = call.handle();
    let interrupt = tokio::spawn(async move {
        if interrupt.await {
            handle.abort().await;
        }
    });

    let outcome = call.run(on_event).await;
    if matches!(outcome, Ok(StreamOutcome::Aborted)) {
        // Delivery stops before the host has been told; wait for that too.
        let _ = interrupt.await;
    } else {
        interrupt.abort();
    }
    outcome
}

/// Drive a streaming call to the terminal. Ctrl-C aborts it.
pub(crate) async fn stream_to_terminal(call: StreamCall, format: OutputFormat) -> Result<StreamOutcome> {
    let outcome = run_interruptible(
        call,
        async { tokio::signal::ctrl_c().await.is_ok() },
        |event| print_event(format, event),
    )
    .await?;
    if format == OutputFormat::Text {
        println!();
        if outcome == StreamOutcome::Aborted {
            eprintln!("(aborted)");
        }
    }
    Ok(outcome)
}

/// Execute the chat command
pub async fn execute(session: &Session, args: ChatArgs) -> Result<()> {
    let mut request = ChatRequest::new(args.message)
        .ai(args.ai)
        .session(args.session)
        .llms(args.llm, args.reasoning_llm)
        .deep(args.deep)
        .retrace(args.retrace)
        .strict(args.strict);
    if let Some(exchange) = args.exchange {
        request = request.exchange(exchange);
    }

    tracing::debug!("Chat exchange {}", request.exchange);
    stream_to_terminal(session.router.chat(request), session.format).await?;
    Ok(())
}

/// Execute the history command
pub async fn history(session: &Session, args: HistoryArgs) -> Result<()> {
    let router = &session.router;
    let ai = args.ai.as_deref();
    let chat_session = args.session.as_deref();

    if args.clear {
        router.clear_chat(ai, chat_session).await?;
        return session.render(&json!({ "ok": true }), |_| println!("History cleared."));
    }

    if let Some(exchange) = args.delete {
        router.delete_chat(ai, chat_session, &exchange).await?;
        return session.render(&json!({ "ok": true }), |_| {
            println!("Deleted exchange {}", exchange)
        });
    }

    let lines = router.chat_history(ai, chat_session).await?;
    session.render(&lines, |lines| {
        if lines.is_empty() {
            println!("No chat history.");
        }
        for line in lines {
            let who = if line.is_user() { "you" } else { "ai" };
            println!("[{}] {}: {}", line.created_at, who, line.content);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use crate::channel::LocalHost;
    use crate::error::ChannelError;
    use crate::router::CallRouter;
    use crate::transport::{Transport, TransportSelector};

    /// Streams one message, then stays open; `chat_abort` takes a while.
    #[derive(Default)]
    struct SlowAbortHost {
        aborted: AtomicBool,
    }

    #[async_trait]
    impl LocalHost for SlowAbortHost {
        async fn invoke(&self, op: &str, _args: Value) -> std::result::Result<Value, ChannelError> {
            if op == "chat_abort" {
                tokio::time::sleep(Duration::from_millis(50)).await;
                self.aborted.store(true, Ordering::SeqCst);
            }
            Ok(Value::Null)
        }

        async fn invoke_with_channel(
            &self,
            _op: &str,
            _args: Value,
            sender: mpsc::Sender<String>,
        ) -> std::result::Result<Value, ChannelError> {
            let _ = sender.send(r#"{"content":"a"}"#.to_string()).await;
            futures::future::pending::<()>().await;
            Ok(Value::Null)
        }
    }

    #[tokio::test]
    async fn test_interrupt_waits_for_host_abort() {
        let host = Arc::new(SlowAbortHost::default());
        let router =
            CallRouter::new(TransportSelector::fixed(Transport::Local)).with_local_host(host.clone());
        let call = router.chat(ChatRequest::new("hello").exchange("ex-int"));

        let mut events = Vec::new();
        let outcome = run_interruptible(
            call,
            async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                true
            },
            |event| events.push(event),
        )
        .await
        .unwrap();

        assert_eq!(outcome, StreamOutcome::Aborted);
        assert_eq!(events, vec![ChatEvent::Content("a".to_string())]);
        assert!(host.aborted.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_no_interrupt_on_natural_completion() {
        let host = Arc::new(crate::channel::MockHost::new());
        host.push_messages("chat", vec![r#"{"content":"done"}"#.to_string()]);
        let router =
            CallRouter::new(TransportSelector::fixed(Transport::Local)).with_local_host(host.clone());
        let call = router.chat(ChatRequest::new("hello").exchange("ex-done"));

        let outcome = run_interruptible(call, futures::future::pending::<bool>(), |_| {})
            .await
            .unwrap();

        assert_eq!(outcome, StreamOutcome::Completed);
        assert!(host.calls_to("chat_abort").is_empty());
    }

    #[test]
    fn test_event_json_matches_wire_format() {
        let events = [
            ChatEvent::Content("Hel".to_string()),
            ChatEvent::Reasoning("hmm".to_string()),
            ChatEvent::ToolCallEnd {
                id: "t1".to_string(),
                time: "1s".to_string(),
            },
            ChatEvent::ToolCallError {
                id: "t1".to_string(),
                error: "boom".to_string(),
            },
        ];
        for event in events {
            let line = event_json(&event).to_string();
            assert_eq!(ChatEvent::parse(&line), event);
        }
    }

    #[test]
    fn test_event_json_text() {
        assert_eq!(
            event_json(&ChatEvent::Text("raw".to_string())),
            json!({"text": "raw"})
        );
    }
}
