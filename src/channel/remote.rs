// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Remote channel: HTTP requests and SSE streams against the server API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::multipart;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::config::HttpConfig;
use crate::error::ChannelError;
use crate::router::{ActionDescriptor, Args, FormBody, Method};
use crate::transport::{ConfigSource, Transport, TransportConfig};

use super::sse::SseDecoder;
use super::Channel;

/// [`Channel`] over HTTP
#[derive(Clone)]
pub struct RemoteChannel {
    client: Client,
    source: Arc<dyn ConfigSource>,
    request_timeout: Option<Duration>,
}

impl RemoteChannel {
    /// Create a channel with default HTTP settings.
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self {
            client: Client::new(),
            source,
            request_timeout: None,
        }
    }

    /// Create a channel with configured timeouts.
    ///
    /// The request timeout applies to unary calls only; streams stay open
    /// until the server ends them or the caller aborts.
    pub fn with_http_config(
        source: Arc<dyn ConfigSource>,
        http: &HttpConfig,
    ) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
            .build()?;
        let request_timeout =
            (http.request_timeout_secs > 0).then(|| Duration::from_secs(http.request_timeout_secs));
        Ok(Self {
            client,
            source,
            request_timeout,
        })
    }

    async fn resolve(&self) -> Result<(String, TransportConfig), ChannelError> {
        let config = self.source.load().await?;
        let api_base = config.api_base().ok_or_else(|| {
            ChannelError::Config("no remote base URL configured".to_string())
        })?;
        Ok((api_base, config))
    }

    fn authorize(builder: RequestBuilder, config: &TransportConfig) -> RequestBuilder {
        match config.bearer() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn unary(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.request_timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    /// GET `path` with `query` as query string.
    pub async fn get(&self, path: &str, query: &Map<String, Value>) -> Result<Value, ChannelError> {
        let (api_base, config) = self.resolve().await?;
        let url = format!("{}{}", api_base, path);
        tracing::debug!("GET {}", url);

        let pairs: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (k.clone(), query_value(v)))
            .collect();
        let builder = self.unary(self.client.get(&url).query(&pairs));
        let response = Self::authorize(builder, &config).send().await?;
        read_response(response).await
    }

    /// POST `body` as JSON to `path`.
    pub async fn post(&self, path: &str, body: &Map<String, Value>) -> Result<Value, ChannelError> {
        let (api_base, config) = self.resolve().await?;
        let url = format!("{}{}", api_base, path);
        tracing::debug!("POST {}", url);

        let builder = self.unary(self.client.post(&url).json(body));
        let response = Self::authorize(builder, &config).send().await?;
        read_response(response).await
    }

    /// POST a multipart form to `path`.
    pub async fn post_form(&self, path: &str, form: FormBody) -> Result<Value, ChannelError> {
        let (api_base, config) = self.resolve().await?;
        let url = format!("{}{}", api_base, path);
        tracing::debug!("POST (multipart) {}", url);

        let mut multipart_form = multipart::Form::new();
        for (name, file) in form.files {
            let part = multipart::Part::bytes(file.bytes).file_name(file.filename);
            multipart_form = multipart_form.part(name, part);
        }
        for (name, text) in form.texts {
            multipart_form = multipart_form.text(name, text);
        }

        let builder = self.unary(self.client.post(&url).multipart(multipart_form));
        let response = Self::authorize(builder, &config).send().await?;
        read_response(response).await
    }

    /// POST `body` as JSON to `path` and forward each SSE data payload to `sink`.
    ///
    /// Returns when the server closes the stream or the receiver goes away.
    pub async fn open_stream(
        &self,
        path: &str,
        body: &Map<String, Value>,
        sink: mpsc::Sender<String>,
    ) -> Result<(), ChannelError> {
        let (api_base, config) = self.resolve().await?;
        let url = format!("{}{}", api_base, path);
        tracing::debug!("POST (stream) {}", url);

        let builder = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(body);
        let response = Self::authorize(builder, &config).send().await?;

        let status = response.status();
        if !status.is_success() || is_json(response.headers()) {
            // Errors arrive as a regular response instead of a stream.
            read_response(response).await?;
            return Ok(());
        }

        let mut decoder = SseDecoder::new();
        let mut bytes = response.bytes_stream();
        while let Some(chunk) = bytes.next().await {
            let chunk = chunk?;
            for event in decoder.push(&chunk) {
                if sink.send(event.data).await.is_err() {
                    return Ok(());
                }
            }
        }
        if let Some(event) = decoder.finish() {
            let _ = sink.send(event.data).await;
        }
        Ok(())
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().starts_with("application/json"))
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Turn an HTTP response into a payload or a channel error.
///
/// JSON bodies carrying an `error` field are error envelopes regardless of
/// status. Non-JSON success bodies are returned as strings.
async fn read_response(response: Response) -> Result<Value, ChannelError> {
    let status = response.status();
    let json = is_json(response.headers());
    let body = response.text().await?;

    if status == StatusCode::UNAUTHORIZED {
        return Err(ChannelError::Status {
            status: status.as_u16(),
            body,
        });
    }

    if json {
        let value: Value = if body.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&body) {
                Ok(value) => value,
                Err(e) if status.is_success() => return Err(ChannelError::Json(e)),
                Err(_) => {
                    return Err(ChannelError::Status {
                        status: status.as_u16(),
                        body,
                    })
                }
            }
        };

        if let Some(envelope) = parse_envelope(&value) {
            return Err(envelope);
        }
        if !status.is_success() {
            return Err(ChannelError::Status {
                status: status.as_u16(),
                body,
            });
        }
        return Ok(value);
    }

    if !status.is_success() {
        return Err(ChannelError::Status {
            status: status.as_u16(),
            body,
        });
    }

    if body.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::String(body))
    }
}

fn parse_envelope(value: &Value) -> Option<ChannelError> {
    let code = value.get("error")?;
    let code = match code {
        Value::Null | Value::Bool(false) => return None,
        Value::String(s) if s.is_empty() => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(ChannelError::Envelope { code, message })
}

#[async_trait]
impl Channel for RemoteChannel {
    fn transport(&self) -> Transport {
        Transport::Remote
    }

    async fn invoke(
        &self,
        descriptor: &'static ActionDescriptor,
        args: &Args,
    ) -> Result<Value, ChannelError> {
        let route = descriptor.remote.ok_or(ChannelError::UnsupportedRoute {
            action: descriptor.name,
            transport: "remote",
        })?;

        match route.method {
            Method::Get => self.get(route.path, &args.to_remote(descriptor)).await,
            Method::Post => self.post(route.path, &args.to_remote(descriptor)).await,
            Method::Multipart => self.post_form(route.path, args.to_form(descriptor)).await,
        }
    }

    async fn stream(
        &self,
        descriptor: &'static ActionDescriptor,
        args: &Args,
        sink: mpsc::Sender<String>,
    ) -> Result<(), ChannelError> {
        let route = descriptor.remote.ok_or(ChannelError::UnsupportedRoute {
            action: descriptor.name,
            transport: "remote",
        })?;
        self.open_stream(route.path, &args.to_remote(descriptor), sink)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Action;
    use crate::transport::SharedConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn channel_for(server: &MockServer, token: Option<&str>) -> RemoteChannel {
        let shared = SharedConfig::new(TransportConfig::remote(
            server.uri(),
            token.map(str::to_string),
        ));
        RemoteChannel::new(Arc::new(shared))
    }

    // ===== Envelope Tests =====

    #[test]
    fn test_parse_envelope() {
        let err = parse_envelope(&json!({"error": "SERVER_ERROR", "message": "boom"})).unwrap();
        match err {
            ChannelError::Envelope { code, message } => {
                assert_eq!(code, "SERVER_ERROR");
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(parse_envelope(&json!({"ok": true})).is_none());
        assert!(parse_envelope(&json!({"error": null})).is_none());
        assert!(parse_envelope(&json!([1])).is_none());
    }

    // ===== HTTP Tests =====

    #[tokio::test]
    async fn test_post_sends_bearer_and_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ai/add"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({"name": "x"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1", "name": "x"})))
            .expect(1)
            .mount(&server)
            .await;

        let channel = channel_for(&server, Some("tok"));
        let result = channel
            .invoke(Action::AiAdd.descriptor(), &Args::new().with("name", "x"))
            .await
            .unwrap();
        assert_eq!(result["name"], "x");
    }

    #[tokio::test]
    async fn test_get_version_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/version"))
            .respond_with(ResponseTemplate::new(200).set_body_string("0.3.1"))
            .mount(&server)
            .await;

        let channel = channel_for(&server, None);
        let result = channel
            .invoke(Action::CoreVersion.descriptor(), &Args::new())
            .await
            .unwrap();
        assert_eq!(result, json!("0.3.1"));
    }

    #[tokio::test]
    async fn test_envelope_under_200_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ai/list"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"error": "SERVER_ERROR", "message": "db locked"})),
            )
            .mount(&server)
            .await;

        let err = channel_for(&server, None)
            .invoke(Action::AiList.descriptor(), &Args::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::Envelope { ref code, .. } if code == "SERVER_ERROR"));
    }

    #[tokio::test]
    async fn test_401_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ai/list"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let err = channel_for(&server, None)
            .invoke(Action::AiList.descriptor(), &Args::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_500_plain_text_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ai/list"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let err = channel_for(&server, None)
            .invoke(Action::AiList.descriptor(), &Args::new())
            .await
            .unwrap_err();
        match err {
            ChannelError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "oops");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_local_only_action_is_unsupported() {
        let server = MockServer::start().await;
        let err = channel_for(&server, None)
            .invoke(Action::AppConfig.descriptor(), &Args::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::UnsupportedRoute { .. }));
    }

    // ===== Streaming Tests =====

    #[tokio::test]
    async fn test_open_stream_forwards_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/llm/test-chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(
                    "data: Hel\n\ndata: lo\n\ndata: [DONE]\n\n",
                    "text/event-stream",
                ),
            )
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::channel(8);
        channel_for(&server, None)
            .stream(Action::LlmTestChat.descriptor(), &Args::new(), tx)
            .await
            .unwrap();

        let mut received = Vec::new();
        while let Some(data) = rx.recv().await {
            received.push(data);
        }
        assert_eq!(received, vec!["Hel", "lo", "[DONE]"]);
    }

    #[tokio::test]
    async fn test_open_stream_json_envelope_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"error": "UNAUTHORIZED", "message": "token"})),
            )
            .mount(&server)
            .await;

        let (tx, _rx) = mpsc::channel(8);
        let err = channel_for(&server, None)
            .stream(Action::Chat.descriptor(), &Args::new(), tx)
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::Envelope { .. }));
    }
}
