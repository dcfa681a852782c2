use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::RequestBuilder;

/// Fixed user agent the upstream API uses to recognise agent traffic.
pub const AGENT_USER_AGENT: &str = "LLM_AGENT";

/// Generate a simple request id suitable for logging/correlation.
pub fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("ahh-{}-{}", now.as_secs(), now.subsec_nanos())
}

/// Add the headers every upstream call carries: bearer token, JSON accept,
/// the agent user agent and a correlation id. Returns the builder and the id used.
pub fn add_standard_headers(
    builder: RequestBuilder,
    api_key: &str,
    request_id: Option<String>,
) -> (RequestBuilder, String) {
    let rid = request_id.unwrap_or_else(generate_request_id);
    let b = builder
        .bearer_auth(api_key)
        .header(ACCEPT, "application/json")
        .header(USER_AGENT, AGENT_USER_AGENT)
        .header("x-request-id", rid.as_str());
    (b, rid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_prefixed() {
        assert!(generate_request_id().starts_with("ahh-"));
    }

    #[test]
    fn builds_request_with_fixed_headers() {
        let client = reqwest::Client::new();
        let (b, rid) = add_standard_headers(client.get("http://localhost/x"), "secret", Some("rid-1".into()));
        assert_eq!(rid, "rid-1");
        let req = b.build().unwrap();
        let h = req.headers();
        assert_eq!(h["authorization"], "Bearer secret");
        assert_eq!(h["accept"], "application/json");
        assert_eq!(h["user-agent"], "LLM_AGENT");
        assert_eq!(h["x-request-id"], "rid-1");
    }
}
