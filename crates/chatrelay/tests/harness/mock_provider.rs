//! Mock provider backend for integration tests
//!
//! Serves minimal OpenAI (`/v1/chat/completions`) and Anthropic (`/v1/messages`)
//! endpoints that return canned responses and record what they received.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// A request as seen by the mock backend
#[derive(Debug, Clone)]
pub struct Captured {
    pub path: &'static str,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct MockProvider {
    addr: SocketAddr,
    server: JoinHandle<()>,
    state: Arc<MockState>,
}

struct MockState {
    requests: Mutex<Vec<Captured>>,
    /// Number of requests to fail before succeeding
    fail_count: AtomicU32,
    failure: Failure,
    content: String,
}

/// How a failing request is answered
#[derive(Clone, Copy)]
enum Failure {
    ServerError,
    RateLimited { retry_after: Option<u64> },
}

impl MockProvider {
    /// Start a mock backend that answers every request with `content`
    pub async fn start(content: &str) -> anyhow::Result<Self> {
        Self::start_inner(0, Failure::ServerError, content).await
    }

    /// Start a mock backend that fails the first `n` requests with 500
    pub async fn start_failing(n: u32) -> anyhow::Result<Self> {
        Self::start_inner(n, Failure::ServerError, "recovered").await
    }

    /// Start a mock backend that answers the first `n` requests with 429,
    /// sending `retry-after` when given
    pub async fn start_rate_limited(n: u32, retry_after: Option<u64>) -> anyhow::Result<Self> {
        Self::start_inner(n, Failure::RateLimited { retry_after }, "recovered").await
    }

    async fn start_inner(fail_count: u32, failure: Failure, content: &str) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            requests: Mutex::new(Vec::new()),
            fail_count: AtomicU32::new(fail_count),
            failure,
            content: content.to_owned(),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_openai))
            .route("/v1/messages", routing::post(handle_anthropic))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            server,
            state,
        })
    }

    /// Base URL for the OpenAI provider (the client appends `/chat/completions`)
    pub fn openai_base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Base URL for the Anthropic provider (the client appends `/v1/messages`)
    pub fn anthropic_base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<Captured> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl MockState {
    fn record(&self, path: &'static str, headers: HeaderMap, body: Value) {
        self.requests.lock().unwrap().push(Captured {
            path,
            headers,
            body,
        });
    }

    /// Consume one pending failure, if any
    fn should_fail(&self) -> bool {
        self.fail_count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn failure(kind: Failure) -> Response {
    match kind {
        Failure::ServerError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"message": "mock upstream failure"}})),
        )
            .into_response(),
        Failure::RateLimited { retry_after } => {
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"error": {"message": "You exceeded your current quota"}})),
            )
                .into_response();
            if let Some(secs) = retry_after {
                response
                    .headers_mut()
                    .insert("retry-after", HeaderValue::from(secs));
            }
            response
        }
    }
}

async fn handle_openai(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let model = body["model"].as_str().unwrap_or_default().to_owned();
    state.record("/v1/chat/completions", headers, body);

    if state.should_fail() {
        return failure(state.failure);
    }

    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "created": 1_700_000_000u64,
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": state.content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 8, "total_tokens": 18}
    }))
    .into_response()
}

async fn handle_anthropic(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let model = body["model"].as_str().unwrap_or_default().to_owned();
    state.record("/v1/messages", headers, body);

    if state.should_fail() {
        return failure(state.failure);
    }

    Json(json!({
        "id": "msg_mock",
        "type": "message",
        "role": "assistant",
        "model": model,
        "content": [{"type": "text", "text": state.content}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 12, "output_tokens": 7}
    }))
    .into_response()
}
