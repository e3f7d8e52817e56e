//! Liveness and readiness probes.
//!
//! The relay holds no connections or caches, so once the listener is bound it
//! is both alive and ready.

use axum::http::StatusCode;

const OK: (StatusCode, &str) = (StatusCode::OK, "ok");

pub async fn livez() -> (StatusCode, &'static str) {
    OK
}

/// Ready as soon as the router serves; provider reachability is not checked.
pub async fn readyz() -> (StatusCode, &'static str) {
    OK
}
