use axum::extract::State;
use axum::Json;

use crate::api::mcp::Dispatcher;
use crate::core::mcp::{RpcReq, RpcResp};
use crate::infra::http::json as http_json;

/// `POST /mcp`: one JSON-RPC request per body, same semantics as one stdio line.
///
/// The body is taken as text so a malformed request still gets a JSON-RPC answer
/// instead of an extractor rejection.
pub async fn http(State(dispatcher): State<Dispatcher>, body: String) -> Json<RpcResp> {
    let req: RpcReq = match serde_json::from_str(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "HTTP body is not a JSON-RPC request");
            return http_json::parse_error(e.to_string());
        }
    };
    tracing::debug!(method = %req.method_label(), id = ?req.id, "HTTP handler invoked");
    let resp = dispatcher.handle(req).await;
    tracing::trace!(response = ?resp, "HTTP handler completed");
    Json(resp)
}
