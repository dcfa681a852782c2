//! Generic `tools/call` pipeline: bind, guard, build the upstream request,
//! send, shape. Failures become an error payload here and nowhere else.

use serde_json::{json, Map, Value};

use crate::clients::aihehuo::{FilePart, MultipartSpec, Payload};
use crate::clients::{Upstream, UpstreamRequest};
use crate::core::error::{GatewayError, ToolFailure, ValidationError};
use crate::core::mcp::{SERVER_NAME, SERVER_VERSION};
use crate::core::tool::{Echo, Encoding, Fallback, OperationDescriptor, Route, Scope, Shape};
use crate::domain::{AiReport, Pagination, ToolParams};
use crate::infra::config::Config;
use crate::tools::binder::bind;
use crate::tools::{new_users, transcript};

const CURRENT_USER_VAR: &str = "current_user";
const CURRENT_USER_ENV: &str = "CURRENT_USER_ID";
const REPORT_FILE_PART: &str = "html_file";

/// Run one tool call to a JSON value that is always safe to wrap in a content block.
pub async fn run(desc: &OperationDescriptor, raw: &Value, cfg: &Config, upstream: &dyn Upstream) -> Value {
    match execute(desc, raw, cfg, upstream).await {
        Ok(body) => body,
        Err(failure) => {
            tracing::warn!(tool = desc.name, error = %failure, "tool call failed");
            failure_payload(desc, &failure, raw, cfg)
        }
    }
}

pub async fn execute(
    desc: &OperationDescriptor,
    raw: &Value,
    cfg: &Config,
    upstream: &dyn Upstream,
) -> Result<Value, ToolFailure> {
    let current_user = match desc.scope {
        Scope::CurrentUser => {
            Some(cfg.api.current_user().ok_or(ToolFailure::NotConfigured(CURRENT_USER_ENV))?)
        }
        Scope::Public => None,
    };
    let params = bind(desc, raw)?;

    match desc.shape {
        Shape::ServerInfo => Ok(server_info(cfg)),
        Shape::Verbatim => {
            let req = build_request(desc, routed(desc)?, &params, current_user)?;
            Ok(upstream.send(req).await?)
        }
        Shape::NewUsersSweep => {
            Ok(new_users::sweep(desc.name, routed(desc)?, cfg.new_users, upstream).await?)
        }
        Shape::Transcript => {
            let req = build_request(desc, routed(desc)?, &params, current_user)?;
            let body = upstream.send(req).await?;
            let group_id = params.path_var("group_id").unwrap_or("unknown");
            transcript::export(group_id, &body, &cfg.scratch_dir).await
        }
    }
}

fn routed(desc: &OperationDescriptor) -> Result<&Route, GatewayError> {
    desc.route
        .as_ref()
        .ok_or_else(|| GatewayError::Transport(format!("{} has no upstream route", desc.name)))
}

fn server_info(cfg: &Config) -> Value {
    json!({
        "name": SERVER_NAME,
        "version": SERVER_VERSION,
        "api_base": cfg.api.base_url,
    })
}

/// Resolve a route template against the bound record.
pub fn build_request(
    desc: &OperationDescriptor,
    route: &Route,
    params: &ToolParams,
    current_user: Option<&str>,
) -> Result<UpstreamRequest, ValidationError> {
    let segments = route
        .path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| fill_segment(s, params, current_user))
        .collect::<Result<Vec<_>, _>>()?;

    let mut query: Vec<(String, String)> =
        route.fixed_query.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();

    let payload = match route.encoding {
        Encoding::Bare => Payload::Empty,
        Encoding::Json => params.json_body().map(Payload::Json).unwrap_or(Payload::Empty),
        Encoding::Query => {
            query.extend(params.query_pairs());
            Payload::Empty
        }
        Encoding::JsonOrMultipart => match params {
            ToolParams::Report(r) if r.html_file_path.is_some() => Payload::Multipart(report_form(r)),
            _ => params.json_body().map(Payload::Json).unwrap_or(Payload::Empty),
        },
    };

    Ok(UpstreamRequest {
        label: desc.name,
        method: route.verb.method(),
        segments,
        query,
        payload,
        timeout: route.timeout(),
    })
}

/// Fill at most one `{var}` placeholder inside a path segment.
fn fill_segment(seg: &str, params: &ToolParams, current_user: Option<&str>) -> Result<String, ValidationError> {
    let (Some(open), Some(close)) = (seg.find('{'), seg.find('}')) else {
        return Ok(seg.to_string());
    };
    let var = &seg[open + 1..close];
    let value = if var == CURRENT_USER_VAR { current_user } else { params.path_var(var) };
    let value = value.ok_or_else(|| ValidationError::Malformed(format!("no value for path variable {var}")))?;
    Ok(format!("{}{}{}", &seg[..open], value, &seg[close + 1..]))
}

fn report_form(r: &AiReport) -> MultipartSpec {
    let mut fields = vec![("title".to_string(), r.title.clone()), ("abstract".to_string(), r.summary.clone())];
    fields.extend(r.mentioned_user_ids.iter().map(|id| ("mentioned_user_ids[]".to_string(), id.clone())));
    fields.extend(r.mentioned_idea_ids.iter().map(|id| ("mentioned_idea_ids[]".to_string(), id.clone())));
    MultipartSpec {
        fields,
        file: r.html_file_path.clone().map(|path| FilePart {
            name: REPORT_FILE_PART.to_string(),
            path,
            mime: "text/html",
        }),
    }
}

/// Operation error payload: always `error` and `message`, plus echoed inputs.
pub fn failure_payload(desc: &OperationDescriptor, failure: &ToolFailure, raw: &Value, cfg: &Config) -> Value {
    if let ToolFailure::Validation(ValidationError::TooShort { length, minimum, .. }) = failure {
        return json!({
            "error": "Query too short",
            "message": format!("搜索关键词长度必须大于{}个字符", minimum.saturating_sub(1)),
            "query_length": length,
            "minimum_length": minimum,
        });
    }

    let message = match failure {
        ToolFailure::NotConfigured(var) => format!("Please set {var} environment variable"),
        ToolFailure::Validation(v) => v.detail().unwrap_or_else(|| desc.failure_message.to_string()),
        _ => desc.failure_message.to_string(),
    };

    let mut out = Map::new();
    out.insert("error".into(), Value::String(failure.to_string()));
    out.insert("message".into(), Value::String(message));
    for echo in desc.echo {
        echo_into(&mut out, *echo, raw, cfg);
    }
    Value::Object(out)
}

fn echo_into(out: &mut Map<String, Value>, echo: Echo, raw: &Value, cfg: &Config) {
    match echo {
        Echo::Arg(key, fallback) => {
            let v = raw.get(key).filter(|v| !v.is_null()).cloned().unwrap_or_else(|| match fallback {
                Fallback::Unknown => Value::String("unknown".into()),
                Fallback::Empty => Value::String(String::new()),
            });
            out.insert(key.into(), v);
        }
        Echo::PageWindow => {
            let defaults = Pagination::default();
            let given = raw.get("paginate");
            let page = given.and_then(|p| p.get("page")).cloned().unwrap_or(json!(defaults.page));
            let per = given.and_then(|p| p.get("per")).cloned().unwrap_or(json!(defaults.per));
            out.insert("page".into(), page);
            out.insert("page_size".into(), per);
        }
        Echo::CurrentUser => {
            out.insert("user_id".into(), Value::String(cfg.api.current_user_id.clone()));
        }
        Echo::Zero(key) => {
            out.insert(key.into(), json!(0));
        }
        Echo::EmptyList(key) => {
            out.insert(key.into(), json!([]));
        }
    }
}
