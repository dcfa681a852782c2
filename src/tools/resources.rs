//! The single readable resource: a brief current-user profile.

use serde_json::{json, Value};

use crate::clients::aihehuo::Payload;
use crate::clients::{Upstream, UpstreamRequest};
use crate::infra::config::ApiConfig;
use crate::tools::catalog::DEFAULT_TIMEOUT_SECS;

pub const PROFILE_URI: &str = "aihehuo://current_user/profile";

const PROFILE_TOOL_HINT: &str = "Use this tool to get complete user profile information";

/// `resources/list` result body.
pub fn list_json() -> Value {
    json!({
        "resources": [{
            "uri": PROFILE_URI,
            "name": "Current User Profile (Brief)",
            "description": "Get brief current user profile information with tool reference for complete data",
            "mimeType": "application/json",
        }]
    })
}

/// Brief projection of the current user. Never fails; problems become an error brief.
pub async fn read_profile(api: &ApiConfig, upstream: &dyn Upstream) -> Value {
    let Some(user_id) = api.current_user() else {
        return not_configured();
    };

    let req = UpstreamRequest {
        label: "resources/read",
        method: reqwest::Method::GET,
        segments: vec!["users".into(), user_id.to_string()],
        query: Vec::new(),
        payload: Payload::Empty,
        timeout: std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    };
    match upstream.send(req).await {
        Ok(body) => brief(body.get("data").unwrap_or(&body)),
        Err(e) => {
            tracing::warn!(uri = PROFILE_URI, error = %e, "profile resource read failed");
            json!({
                "id": "error",
                "name": "Error",
                "industry": "Unknown",
                "city": "Unknown",
                "bio": format!("Failed to fetch user data: {e}"),
                "error": e.to_string(),
                "message": "Failed to fetch current user profile brief info",
            })
        }
    }
}

fn brief(data: &Value) -> Value {
    let field = |key: &str, default: &str| data.get(key).filter(|v| !v.is_null()).cloned().unwrap_or_else(|| json!(default));
    json!({
        "id": field("id", "unknown"),
        "name": field("name", "Unknown"),
        "industry": field("industry", "Unknown"),
        "city": field("city", "Unknown"),
        "bio": field("bio", "No bio available"),
        "available_tools": { "get_current_user_profile": PROFILE_TOOL_HINT },
        "note": "This is a brief resource. Use the 'get_current_user_profile' tool for complete profile data.",
    })
}

fn not_configured() -> Value {
    json!({
        "id": "not_configured",
        "name": "Unknown",
        "industry": "Unknown",
        "city": "Unknown",
        "bio": "CURRENT_USER_ID not configured",
        "status": "Please set CURRENT_USER_ID environment variable",
        "available_tools": { "get_current_user_profile": PROFILE_TOOL_HINT },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::GatewayError;
    use crate::infra::config::PLACEHOLDER;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        reply: Option<Value>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Upstream for Fixed {
        async fn send(&self, req: UpstreamRequest) -> Result<Value, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(req.segments, vec!["users", "1234"]);
            self.reply.clone().ok_or_else(|| GatewayError::Status { status: 500, body: "oops".into() })
        }
    }

    fn api(user: &str) -> ApiConfig {
        ApiConfig::new("http://upstream.test", "k", user)
    }

    #[tokio::test]
    async fn projects_profile_with_defaults() {
        let up = Fixed { reply: Some(json!({"data": {"id": "1234", "name": "赵六", "phone": "x"}})), calls: AtomicUsize::new(0) };
        let v = read_profile(&api("1234"), &up).await;
        assert_eq!(v["name"], "赵六");
        assert_eq!(v["city"], "Unknown");
        assert_eq!(v["bio"], "No bio available");
        assert!(v.get("phone").is_none());
        assert!(v["note"].as_str().unwrap().contains("get_current_user_profile"));
    }

    #[tokio::test]
    async fn placeholder_user_is_not_fetched() {
        let up = Fixed { reply: None, calls: AtomicUsize::new(0) };
        let v = read_profile(&api(PLACEHOLDER), &up).await;
        assert_eq!(v["id"], "not_configured");
        assert_eq!(up.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn gateway_failure_becomes_error_brief() {
        let up = Fixed { reply: None, calls: AtomicUsize::new(0) };
        let v = read_profile(&api("1234"), &up).await;
        assert_eq!(v["id"], "error");
        assert_eq!(v["message"], "Failed to fetch current user profile brief info");
        assert!(v["error"].as_str().unwrap().contains("500"));
    }
}
