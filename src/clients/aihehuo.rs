use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Url};
use serde_json::Value;

use crate::core::error::GatewayError;
use crate::infra::config::ApiConfig;
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::make_http_client;

const BODY_SNIPPET_CHARS: usize = 200;

/// One fully-resolved outbound call.
#[derive(Debug)]
pub struct UpstreamRequest {
    /// Tool name, for logs and metrics.
    pub label: &'static str,
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub payload: Payload,
    pub timeout: Duration,
}

#[derive(Debug)]
pub enum Payload {
    Empty,
    Json(Value),
    Multipart(MultipartSpec),
}

/// Multipart body description. Built into a `reqwest` form only at send time,
/// because the file part streams from disk.
#[derive(Debug, Default)]
pub struct MultipartSpec {
    pub fields: Vec<(String, String)>,
    pub file: Option<FilePart>,
}

#[derive(Debug)]
pub struct FilePart {
    pub name: String,
    pub path: PathBuf,
    pub mime: &'static str,
}

/// The single seam to the upstream REST API.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn send(&self, req: UpstreamRequest) -> Result<Value, GatewayError>;
}

#[derive(Clone)]
pub struct AihehuoRemote {
    base: Url,
    api_key: String,
    http: Client,
}

impl AihehuoRemote {
    pub fn new(base: &str, api_key: impl Into<String>) -> Result<Self, GatewayError> {
        let base = Url::parse(base)
            .map_err(|e| GatewayError::Transport(format!("invalid base url {base}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::Transport(format!("invalid base url {base}")));
        }
        let http = make_http_client()?;
        Ok(Self { base, api_key: api_key.into(), http })
    }

    pub fn from_config(cfg: &ApiConfig) -> Result<Self, GatewayError> {
        Self::new(&cfg.base_url, cfg.api_key.clone())
    }

    fn url_for(&self, segments: &[String]) -> Result<Url, GatewayError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Transport(format!("invalid base url {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute(builder: reqwest::RequestBuilder, timeout: Duration) -> Result<Value, GatewayError> {
        let map_send = |e: reqwest::Error| {
            if e.is_timeout() {
                GatewayError::Timeout(timeout)
            } else {
                GatewayError::from(e)
            }
        };
        let resp = builder.send().await.map_err(map_send)?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(map_send)?;
        if !status.is_success() {
            return Err(GatewayError::Status { status: status.as_u16(), body: snippet(&bytes) });
        }
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Upstream for AihehuoRemote {
    async fn send(&self, req: UpstreamRequest) -> Result<Value, GatewayError> {
        let url = self.url_for(&req.segments)?;
        tracing::debug!(tool = req.label, method = %req.method, url = %url, "upstream request");

        let (builder, rid) =
            add_standard_headers(self.http.request(req.method, url), &self.api_key, None);
        let mut builder = builder.timeout(req.timeout);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        builder = match req.payload {
            Payload::Empty => builder,
            Payload::Json(body) => builder.json(&body),
            Payload::Multipart(spec) => builder.multipart(build_form(spec).await?),
        };

        let start = Instant::now();
        let res = Self::execute(builder, req.timeout).await;
        match &res {
            Ok(_) => {
                let elapsed_ms = start.elapsed().as_millis() as f64;
                crate::infra::logging::log_metric(req.label, "upstream_latency_ms", elapsed_ms);
            }
            Err(e) => {
                tracing::warn!(tool = req.label, request_id = %rid, error = %e, "upstream call failed");
                crate::infra::logging::log_metric(req.label, "upstream_error_total", 1.0);
            }
        }
        res
    }
}

async fn build_form(spec: MultipartSpec) -> Result<Form, GatewayError> {
    let mut form = Form::new();
    for (name, value) in spec.fields {
        form = form.text(name, value);
    }
    if let Some(file) = spec.file {
        let shown = file.path.display().to_string();
        let file_err = |message: String| GatewayError::File { path: shown.clone(), message };

        let handle = tokio::fs::File::open(&file.path).await.map_err(|e| file_err(e.to_string()))?;
        let meta = handle.metadata().await.map_err(|e| file_err(e.to_string()))?;
        if !meta.is_file() {
            return Err(file_err("not a regular file".into()));
        }
        let file_name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".into());
        let part = Part::stream_with_length(reqwest::Body::from(handle), meta.len())
            .file_name(file_name)
            .mime_str(file.mime)?;
        form = form.part(file.name, part);
    }
    Ok(form)
}

fn snippet(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut out: String = text.chars().take(BODY_SNIPPET_CHARS).collect();
    if text.chars().count() > BODY_SNIPPET_CHARS {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn get(segments: &[&str]) -> UpstreamRequest {
        UpstreamRequest {
            label: "test",
            method: Method::GET,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            payload: Payload::Empty,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn sends_fixed_headers_and_decodes_json() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/users/42")
                .header("authorization", "Bearer k3y")
                .header("accept", "application/json")
                .header("user-agent", "LLM_AGENT")
                .header_exists("x-request-id");
            then.status(200).json_body(json!({"data": {"id": "42"}}));
        });

        let cli = AihehuoRemote::new(&server.base_url(), "k3y").unwrap();
        let out = cli.send(get(&["users", "42"])).await.unwrap();
        m.assert();
        assert_eq!(out["data"]["id"], "42");
    }

    #[tokio::test]
    async fn appends_segments_to_a_base_with_a_path() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/api/ideas/7");
            then.status(200).json_body(json!({}));
        });
        let cli = AihehuoRemote::new(&format!("{}/api/", server.base_url()), "k").unwrap();
        cli.send(get(&["ideas", "7"])).await.unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn non_success_status_is_a_gateway_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users/1");
            then.status(404).body("not found");
        });
        let cli = AihehuoRemote::new(&server.base_url(), "k").unwrap();
        let err = cli.send(get(&["users", "1"])).await.unwrap_err();
        assert!(matches!(err, GatewayError::Status { status: 404, .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn non_json_body_is_a_gateway_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users/1");
            then.status(200).body("<html>oops</html>");
        });
        let cli = AihehuoRemote::new(&server.base_url(), "k").unwrap();
        let err = cli.send(get(&["users", "1"])).await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn connection_failure_is_a_gateway_error() {
        let cli = AihehuoRemote::new("http://127.0.0.1:9", "k").unwrap();
        let err = cli.send(get(&["users", "1"])).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_) | GatewayError::Timeout(_)));
    }

    #[tokio::test]
    async fn sends_query_and_json_body() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(PUT)
                .path("/users/update_bio")
                .query_param("a", "1")
                .json_body(json!({"bio": "连续创业者"}));
            then.status(200).json_body(json!({"ok": true}));
        });
        let cli = AihehuoRemote::new(&server.base_url(), "k").unwrap();
        let mut req = get(&["users", "update_bio"]);
        req.method = Method::PUT;
        req.query = vec![("a".into(), "1".into())];
        req.payload = Payload::Json(json!({"bio": "连续创业者"}));
        let out = cli.send(req).await.unwrap();
        m.assert();
        assert_eq!(out["ok"], true);
    }

    #[tokio::test]
    async fn streams_file_part_and_repeated_fields() {
        let dir = std::env::temp_dir().join(format!("ahh-upload-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("report.html");
        std::fs::write(&path, "<h1>季度报告</h1>").unwrap();

        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/ai_reports")
                .header_exists("content-type")
                .body_contains("name=\"html_file\"; filename=\"report.html\"")
                .body_contains("季度报告")
                .body_contains("name=\"mentioned_user_ids[]\"");
            then.status(201).json_body(json!({"id": "r1"}));
        });

        let cli = AihehuoRemote::new(&server.base_url(), "k").unwrap();
        let mut req = get(&["ai_reports"]);
        req.method = Method::POST;
        req.payload = Payload::Multipart(MultipartSpec {
            fields: vec![
                ("title".into(), "t".into()),
                ("mentioned_user_ids[]".into(), "u1".into()),
                ("mentioned_user_ids[]".into(), "u2".into()),
            ],
            file: Some(FilePart { name: "html_file".into(), path: path.clone(), mime: "text/html" }),
        });
        let out = cli.send(req).await.unwrap();
        m.assert();
        assert_eq!(out["id"], "r1");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_upload_file_fails_before_any_call() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/ai_reports");
            then.status(201).json_body(json!({}));
        });
        let cli = AihehuoRemote::new(&server.base_url(), "k").unwrap();
        let mut req = get(&["ai_reports"]);
        req.method = Method::POST;
        req.payload = Payload::Multipart(MultipartSpec {
            fields: vec![],
            file: Some(FilePart {
                name: "html_file".into(),
                path: PathBuf::from("/definitely/not/here.html"),
                mime: "text/html",
            }),
        });
        let err = cli.send(req).await.unwrap_err();
        assert!(matches!(err, GatewayError::File { .. }));
        m.assert_hits(0);
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(AihehuoRemote::new("not a url", "k").is_err());
        assert!(AihehuoRemote::new("mailto:someone@example.com", "k").is_err());
    }

    #[test]
    fn snippet_truncates_long_bodies() {
        let long = "x".repeat(500);
        let s = snippet(long.as_bytes());
        assert_eq!(s.chars().count(), BODY_SNIPPET_CHARS + 1);
    }
}
