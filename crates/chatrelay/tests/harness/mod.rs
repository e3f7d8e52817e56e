#![allow(dead_code)]

pub mod mock_provider;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use chatrelay::config::{ProvidersConfig, ServerConfig};
use chatrelay::llm::ProviderFactory;
use chatrelay::server::{AppState, build_app};

use mock_provider::MockProvider;

/// Build the relay with both providers pointed at `mock`
pub fn app(mock: &MockProvider, max_retries: u32) -> Router {
    let mut providers = ProvidersConfig::default();
    providers.openai.base_url = mock.openai_base_url();
    providers.openai.max_retries = max_retries;
    providers.anthropic.base_url = mock.anthropic_base_url();
    providers.anthropic.max_retries = max_retries;

    let state = AppState {
        providers: ProviderFactory::new(providers).unwrap(),
    };
    build_app(state, &ServerConfig::default())
}

/// Build the relay with default provider URLs, for requests that never reach a provider
pub fn offline_app() -> Router {
    let state = AppState {
        providers: ProviderFactory::new(ProvidersConfig::default()).unwrap(),
    };
    build_app(state, &ServerConfig::default())
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn error(&self) -> String {
        self.json()["error"].as_str().unwrap().to_owned()
    }
}

/// POST a JSON body to `/` with an optional API key
pub fn chat_request(api_key: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn assert_cors(headers: &HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "GET, POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type, X-API-Key");
    assert_eq!(headers["access-control-max-age"], "3600");
}
