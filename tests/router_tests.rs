// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Routing tests across both transports: a scripted local host on one side
//! and a wiremock server on the other.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use aiter_client::actions::ChatRequest;
use aiter_client::channel::{MockHost, RemoteChannel, StdioHost};
use aiter_client::config::LocalHostConfig;
use aiter_client::router::{CallMode, ChatEvent, FilePart, Method, ParamKind, ACTIONS};
use aiter_client::transport::{SettingsSource, SharedConfig, WebSource};
use aiter_client::{
    Args, CallError, CallRouter, ErrorKind, StreamOutcome, Transport, TransportConfig,
    TransportSelector,
};

fn local_router(host: &Arc<MockHost>) -> CallRouter {
    CallRouter::new(TransportSelector::fixed(Transport::Local)).with_local_host(host.clone())
}

fn remote_router(server: &MockServer, token: Option<&str>) -> CallRouter {
    let source = SharedConfig::new(TransportConfig::remote(
        server.uri(),
        token.map(str::to_string),
    ));
    CallRouter::new(TransportSelector::fixed(Transport::Remote))
        .with_remote_channel(RemoteChannel::new(Arc::new(source)))
}

async fn requests(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap_or_default()
}

fn keys(value: &Value) -> BTreeSet<String> {
    value
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

// ===== Action Table Parity Tests =====

#[tokio::test]
async fn test_every_local_action_uses_local_names() {
    let host = Arc::new(MockHost::new());
    let router = local_router(&host);

    for descriptor in ACTIONS.iter().filter(|d| d.mode == CallMode::Unary) {
        let Some(op) = descriptor.local_op else {
            continue;
        };
        let mut args = Args::new();
        let mut expected = BTreeSet::new();
        for param in descriptor.params {
            if param.kind == ParamKind::Value {
                args.insert(param.name, format!("v-{}", param.name));
                expected.insert(param.local.to_string());
            }
        }

        host.clear_calls();
        router.perform(descriptor.action, args).await.unwrap();

        let call = host.last_call().unwrap();
        assert_eq!(call.op, op, "operation of {}", descriptor.name);
        assert_eq!(keys(&call.args), expected, "arguments of {}", descriptor.name);
    }
}

#[tokio::test]
async fn test_every_remote_action_uses_remote_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1.0.0"))
        .mount(&server)
        .await;
    let router = remote_router(&server, None);

    for descriptor in ACTIONS.iter().filter(|d| d.mode == CallMode::Unary) {
        let Some(route) = descriptor.remote else {
            continue;
        };
        if route.method == Method::Multipart {
            continue;
        }
        let mut args = Args::new();
        let mut expected = BTreeSet::new();
        for param in descriptor.params {
            args.insert(param.name, format!("v-{}", param.name));
            expected.insert(param.remote.to_string());
        }

        let before = requests(&server).await.len();
        router.perform(descriptor.action, args).await.unwrap();

        let received = requests(&server).await;
        assert_eq!(received.len(), before + 1, "one request for {}", descriptor.name);
        let request = &received[before];
        assert_eq!(
            request.url.path(),
            format!("/api{}", route.path),
            "path of {}",
            descriptor.name
        );
        if route.method == Method::Post {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            assert_eq!(keys(&body), expected, "body of {}", descriptor.name);
        }
    }
}

#[tokio::test]
async fn test_local_only_actions_never_reach_server() {
    let server = MockServer::start().await;
    let router = remote_router(&server, None);

    for descriptor in ACTIONS.iter().filter(|d| d.remote.is_none()) {
        let err = router
            .perform(descriptor.action, Args::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport, "{}", descriptor.name);
    }
    assert!(requests(&server).await.is_empty());
}

// ===== Facade Tests =====

#[tokio::test]
async fn test_rename_ai_on_both_transports() {
    let host = Arc::new(MockHost::new());
    host.respond("ai_rename", json!({"id": "a1", "name": "Beta"}));
    let renamed = local_router(&host)
        .rename_ai("Alpha", "Beta")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "Beta");
    assert_eq!(
        host.last_call().unwrap().args,
        json!({"name": "Alpha", "newName": "Beta"})
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/rename"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "a1", "name": "Beta"})))
        .expect(1)
        .mount(&server)
        .await;
    let renamed = remote_router(&server, Some("secret"))
        .rename_ai("Alpha", "Beta")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.id, "a1");

    let request = &requests(&server).await[0];
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body, json!({"name": "Alpha", "new_name": "Beta"}));
    assert_eq!(
        request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok()),
        Some("Bearer secret")
    );
}

#[tokio::test]
async fn test_envelope_unauthorized_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"error": "UNAUTHORIZED", "message": "bad token"})),
        )
        .mount(&server)
        .await;

    let err = remote_router(&server, Some("stale")).list_ais().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err, CallError::Unauthorized("bad token".to_string()));
}

#[tokio::test]
async fn test_remote_without_endpoint_is_config_error() {
    let source = SharedConfig::new(TransportConfig::local());
    let router = CallRouter::new(TransportSelector::fixed(Transport::Remote))
        .with_remote_channel(RemoteChannel::new(Arc::new(source)));

    let err = router.list_ais().await.unwrap_err();
    assert_eq!(
        err,
        CallError::Config("no remote base URL configured".to_string())
    );
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_envelope_application_error_keeps_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/doc/delete"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"error": "SERVER_ERROR", "message": "no such doc"})),
        )
        .mount(&server)
        .await;

    let err = remote_router(&server, None)
        .delete_doc(None, "d1")
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some("SERVER_ERROR"));
    assert!(err.to_string().contains("no such doc"));
}

#[tokio::test]
async fn test_learn_doc_sends_identical_bytes() {
    let bytes: Vec<u8> = vec![0x25, 0x50, 0x44, 0x46, 0x00, 0xff, 0x9f, 0x0a, 0x80];

    let host = Arc::new(MockHost::new());
    host.respond("doc_learn", json!(["d1", false]));
    let outcome = local_router(&host)
        .learn_doc(Some("a1"), FilePart::new("paper.pdf", bytes.clone()))
        .await
        .unwrap();
    assert_eq!(outcome.doc_id, "d1");
    assert!(!outcome.doc_exists);
    assert!(outcome.doc.is_none());

    let call = host.last_call().unwrap();
    let sent: Vec<u8> = serde_json::from_value(call.args["fileData"].clone()).unwrap();
    assert_eq!(sent, bytes);
    assert_eq!(call.args["fileName"], "paper.pdf");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/doc/learn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "doc": {"id": "d1", "source": "paper.pdf"},
            "doc_exists": true
        })))
        .mount(&server)
        .await;
    let outcome = remote_router(&server, None)
        .learn_doc(Some("a1"), FilePart::new("paper.pdf", bytes.clone()))
        .await
        .unwrap();
    assert_eq!(outcome.doc_id, "d1");
    assert!(outcome.doc_exists);
    assert_eq!(outcome.doc.unwrap().source, "paper.pdf");

    let request = &requests(&server).await[0];
    assert!(request
        .body
        .windows(bytes.len())
        .any(|window| window == bytes.as_slice()));
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("filename=\"paper.pdf\""));
}

#[tokio::test]
async fn test_count_doc_parts_accepts_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/doc/count-part"))
        .respond_with(ResponseTemplate::new(200).set_body_string("7"))
        .mount(&server)
        .await;
    assert_eq!(
        remote_router(&server, None)
            .count_doc_parts(None, "d1")
            .await
            .unwrap(),
        7
    );

    let host = Arc::new(MockHost::new());
    host.respond("doc_count_part", json!(3));
    assert_eq!(
        local_router(&host).count_doc_parts(None, "d1").await.unwrap(),
        3
    );
}

// ===== Transport Selection Tests =====

#[tokio::test]
async fn test_selection_follows_shared_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let shared = Arc::new(SharedConfig::new(TransportConfig::local()));
    let host = Arc::new(MockHost::new());
    host.respond("ai_list", json!([{"id": "a1", "name": "Local"}]));
    let router = CallRouter::new(TransportSelector::configured(shared.clone()))
        .with_local_host(host.clone())
        .with_remote_channel(RemoteChannel::new(shared.clone()));

    assert_eq!(router.list_ais().await.unwrap().len(), 1);
    assert!(requests(&server).await.is_empty());

    shared.set(TransportConfig::remote(server.uri(), None));
    assert!(router.list_ais().await.unwrap().is_empty());
    assert_eq!(requests(&server).await.len(), 1);
    assert_eq!(host.calls_to("ai_list").len(), 1);
}

#[tokio::test]
async fn test_web_source_before_init_sends_nothing() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();
    let web = Arc::new(WebSource::new(SettingsSource::new(
        dir.path().join("settings.json"),
    )));
    let router = CallRouter::new(TransportSelector::fixed(Transport::Remote))
        .with_remote_channel(RemoteChannel::new(web.clone()));

    let err = router.list_ais().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("API_NOT_INITED"));
    assert!(requests(&server).await.is_empty());

    Mock::given(method("POST"))
        .and(path("/api/ai/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    web.init(&server.uri(), "/AITER_BASE");
    assert!(router.list_ais().await.unwrap().is_empty());
}

// ===== Streaming Tests =====

#[tokio::test]
async fn test_remote_chat_stream_until_done() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"reasoning\":\"hmm\"}\n\ndata: {\"content\":\"Hi\"}\n\ndata: [DONE]\n\ndata: {\"content\":\"late\"}\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let (events, outcome) = remote_router(&server, None)
        .chat(ChatRequest::new("hello"))
        .collect_events()
        .await
        .unwrap();
    assert_eq!(
        events,
        vec![
            ChatEvent::Reasoning("hmm".to_string()),
            ChatEvent::Content("Hi".to_string()),
        ]
    );
    assert_eq!(outcome, StreamOutcome::Completed);
}

#[tokio::test]
async fn test_abort_before_first_event() {
    let host = Arc::new(MockHost::new());
    host.push_messages("chat", vec![r#"{"content":"a"}"#.to_string()]);
    let router = local_router(&host);

    let call = router.chat(ChatRequest::new("hello").exchange("ex-0"));
    router.abort_chat(&call.handle()).await;

    let (events, outcome) = call.collect_events().await.unwrap();
    assert!(events.is_empty());
    assert_eq!(outcome, StreamOutcome::Aborted);
    assert!(host.calls_to("chat").is_empty());
}

#[tokio::test]
async fn test_abort_after_events_stops_delivery() {
    let host = Arc::new(MockHost::new());
    host.push_messages(
        "chat",
        (0..6).map(|i| format!(r#"{{"content":"{}"}}"#, i)).collect(),
    );
    host.set_message_delay("chat", Duration::from_millis(10));
    let router = local_router(&host);

    let mut call = router.chat(ChatRequest::new("hello").exchange("ex-1"));
    let handle = call.handle();

    let mut delivered = Vec::new();
    for _ in 0..2 {
        delivered.push(call.next().await.unwrap().unwrap());
    }
    handle.abort().await;
    handle.abort().await;

    assert!(call.next().await.is_none());
    assert_eq!(
        delivered,
        vec![
            ChatEvent::Content("0".to_string()),
            ChatEvent::Content("1".to_string()),
        ]
    );
    assert!(handle.is_aborted());

    let aborts = host.calls_to("chat_abort");
    assert_eq!(aborts.len(), 1);
    assert_eq!(aborts[0].args["exchange"], "ex-1");
}

#[cfg(unix)]
#[tokio::test]
async fn test_abort_with_chatty_stdio_host_keeps_host_usable() {
    // Floods the chat with more messages than the stream buffers, then
    // answers the abort and one later call.
    let script = r#"
read line
i=0
while [ $i -lt 200 ]; do
  echo '{"id":1,"message":{"content":"x"}}'
  i=$((i+1))
done
read line
echo '{"id":2,"result":null}'
read line
echo '{"id":3,"result":[]}'
read line
"#;
    let config = LocalHostConfig {
        program: Some("sh".into()),
        args: vec!["-c".to_string(), script.to_string()],
        ..LocalHostConfig::default()
    };
    let host = Arc::new(StdioHost::spawn(&config).unwrap());
    let router =
        CallRouter::new(TransportSelector::fixed(Transport::Local)).with_local_host(host.clone());

    let mut call = router.chat(ChatRequest::new("hello").exchange("ex-flood"));
    let handle = call.handle();
    assert_eq!(
        call.next().await.unwrap().unwrap(),
        ChatEvent::Content("x".to_string())
    );
    // Let the host fill every buffer before aborting.
    tokio::time::sleep(Duration::from_millis(200)).await;

    tokio::time::timeout(Duration::from_secs(3), handle.abort())
        .await
        .expect("abort did not settle");
    assert!(call.next().await.is_none());

    let ais = tokio::time::timeout(Duration::from_secs(3), router.list_ais())
        .await
        .expect("host stopped answering after abort")
        .unwrap();
    assert!(ais.is_empty());
}

#[tokio::test]
async fn test_abort_while_local_emitter_is_waiting() {
    let host = Arc::new(MockHost::new());
    host.push_messages("chat", vec![r#"{"content":"slow"}"#.to_string()]);
    host.set_message_delay("chat", Duration::from_millis(200));
    let router = local_router(&host);

    let call = router.chat(ChatRequest::new("hello").ai(Some("a1")).exchange("ex-2"));
    let handle = call.handle();
    let consumer = tokio::spawn(call.collect_events());

    while host.calls_to("chat").is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    handle.abort().await;

    let (events, outcome) = consumer.await.unwrap().unwrap();
    assert!(events.is_empty());
    assert_eq!(outcome, StreamOutcome::Aborted);
    assert_eq!(handle.transport(), Some(Transport::Local));

    let abort = &host.calls_to("chat_abort")[0];
    assert_eq!(abort.args, json!({"ai": "a1", "exchange": "ex-2"}));
}

#[tokio::test]
async fn test_remote_abort_sends_no_abort_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("data: {\"content\":\"a\"}\n\n", "text/event-stream")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    let router = remote_router(&server, None);

    let call = router.chat(ChatRequest::new("hello"));
    let handle = call.handle();
    let consumer = tokio::spawn(call.collect_events());
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.abort().await;

    let (events, outcome) = consumer.await.unwrap().unwrap();
    assert!(events.is_empty());
    assert_eq!(outcome, StreamOutcome::Aborted);
    assert!(requests(&server)
        .await
        .iter()
        .all(|request| request.url.path() == "/api/chat/"));
}
