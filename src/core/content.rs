//! Content blocks: the double-encoded text payloads carried inside results.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

const FALLBACK_TEXT: &str =
    "{\n  \"error\": \"serialization failure\",\n  \"message\": \"Failed to encode result\"\n}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ContentBlock {
    /// Pretty-printed JSON text block. Never fails; a value that cannot be
    /// encoded degrades to a fixed error document.
    pub fn json(value: &JsonValue) -> Self {
        let text = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
            tracing::error!(error = %e, "content serialization failed");
            FALLBACK_TEXT.to_string()
        });
        Self { kind: "text".into(), text }
    }
}

/// `tools/call` result: `{"content": [block]}`.
pub fn tool_result(value: &JsonValue) -> JsonValue {
    json!({ "content": [ContentBlock::json(value)] })
}

/// `resources/read` result: `{"contents": [block]}`.
pub fn resource_result(value: &JsonValue) -> JsonValue {
    json!({ "contents": [ContentBlock::json(value)] })
}
