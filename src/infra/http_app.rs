use axum::{
    routing::{get, post},
    Router,
};

use crate::api::mcp::Dispatcher;

/// `/healthz` plus single-request JSON-RPC at `POST /mcp`.
pub fn build_app(dispatcher: Dispatcher) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/mcp", post(crate::api::http::http))
        .with_state(dispatcher)
}
