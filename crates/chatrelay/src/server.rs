use std::time::Duration;

use axum::Router;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE,
};
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{any, get};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerConfig;
use crate::handlers;
use crate::llm::ProviderFactory;

/// Shared application state. Immutable once the server starts.
#[derive(Clone)]
pub struct AppState {
    pub providers: ProviderFactory,
}

pub fn build_app(state: AppState, config: &ServerConfig) -> Router {
    let mut app = Router::new()
        .route("/", any(handlers::invoke_chat))
        .route("/invoke_chat_models", any(handlers::invoke_chat))
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .with_state(state);

    if let Some(secs) = config.request_timeout_seconds {
        app = app.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(secs),
        ));
    }

    // Outermost, so timeouts and errors carry CORS headers too.
    app.layer(SetResponseHeaderLayer::overriding(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, X-API-Key"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from(config.cors_max_age_seconds),
    ))
}
