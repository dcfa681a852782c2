use axum::Json;

use crate::core::mcp::{internal_error, RpcResp};

/// Body that is not a JSON-RPC request: same answer as an unparseable stdio line.
pub fn parse_error(message: impl Into<String>) -> Json<RpcResp> {
    Json(internal_error(serde_json::Value::Null, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json as AxumJson;

    #[test]
    fn builds_parse_error_with_null_id_and_internal_code() {
        let AxumJson(resp) = parse_error("bad json");
        assert_eq!(resp.jsonrpc, "2.0");
        assert!(resp.id.is_null());
        assert!(resp.result.is_none());
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32603);
        assert_eq!(err.message, "Internal error: bad json");
    }
}
