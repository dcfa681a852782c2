//! Shared MCP protocol surface: JSON-RPC envelopes and the static initialize result.

use serde::{Deserialize, Serialize};
use serde_json::Value as J;

pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INTERNAL_ERROR: i32 = -32603;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "aihehuo-search-mcp";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

// --- JSON-RPC structures ---

#[derive(Deserialize, Debug)]
pub struct RpcReq {
    #[serde(default)]
    pub jsonrpc: J,
    #[serde(default)]
    pub id: J,
    /// Kept untyped so a non-string method still answers with the caller's id.
    #[serde(default)]
    pub method: J,
    #[serde(default)]
    pub params: J,
}

impl RpcReq {
    pub fn method(&self) -> Option<&str> {
        self.method.as_str()
    }

    /// Method name for log lines and "unknown method" messages.
    pub fn method_label(&self) -> String {
        match &self.method {
            J::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Field of `params`, tolerating absent or non-object params.
    pub fn param(&self, key: &str) -> Option<&J> {
        self.params.get(key).filter(|v| !v.is_null())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcResp {
    pub jsonrpc: String,
    pub id: J,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<J>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErr>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcErr {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<J>,
}

pub fn ok(id: J, result: J) -> RpcResp {
    RpcResp { jsonrpc: "2.0".into(), id, result: Some(result), error: None }
}

pub fn err(id: J, code: i32, msg: impl Into<String>, data: Option<J>) -> RpcResp {
    RpcResp {
        jsonrpc: "2.0".into(),
        id,
        result: None,
        error: Some(RpcErr { code, message: msg.into(), data }),
    }
}

pub fn not_found(id: J, msg: impl Into<String>) -> RpcResp {
    err(id, METHOD_NOT_FOUND, msg, None)
}

/// Top-level failure for a line that could not be read as a request.
pub fn internal_error(id: J, msg: impl Into<String>) -> RpcResp {
    err(id, INTERNAL_ERROR, format!("Internal error: {}", msg.into()), None)
}

// --- Initialize result ---

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: Capabilities,
    pub server_info: ServerInfo,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Capabilities {
    pub tools: ListChanged,
    pub prompts: ListChanged,
    pub resources: ListChanged,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListChanged {
    pub list_changed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl InitializeResult {
    pub fn current() -> Self {
        let flag = || ListChanged { list_changed: true };
        Self {
            protocol_version: PROTOCOL_VERSION.into(),
            capabilities: Capabilities { tools: flag(), prompts: flag(), resources: flag() },
            server_info: ServerInfo { name: SERVER_NAME.into(), version: SERVER_VERSION.into() },
        }
    }
}
