//! Sequential page sweep over the new-users listing.

use serde_json::{json, Map, Value};

use crate::clients::aihehuo::Payload;
use crate::clients::{Upstream, UpstreamRequest};
use crate::core::error::GatewayError;
use crate::core::tool::Route;
use crate::domain::Pagination;
use crate::infra::config::PageSweep;

/// Fields kept from each upstream user record.
pub const USER_FIELDS: &[&str] = &[
    "created_at_actual",
    "last_accessed_at_actual",
    "id",
    "name",
    "description",
    "page_url",
];

/// Fetch up to `plan.pages` pages, stopping after the first short page.
///
/// A failed page is logged and skipped. The result lists skipped pages under
/// `failed_pages`; only when every attempted page failed is the sweep an error.
pub async fn sweep(
    label: &'static str,
    route: &Route,
    plan: PageSweep,
    upstream: &dyn Upstream,
) -> Result<Value, GatewayError> {
    let mut users = Vec::new();
    let mut failed_pages = Vec::new();
    let mut last_error = None;
    let mut pages_fetched = 0;

    for page in 1..=plan.pages {
        pages_fetched = page;
        let req = UpstreamRequest {
            label,
            method: route.verb.method(),
            segments: route.path.split('/').filter(|s| !s.is_empty()).map(String::from).collect(),
            query: Vec::new(),
            payload: Payload::Json(json!({ "paginate": Pagination::new(page, plan.per_page) })),
            timeout: route.timeout(),
        };

        let body = match upstream.send(req).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(tool = label, page, error = %e, "skipping failed page");
                failed_pages.push(page);
                last_error = Some(e);
                continue;
            }
        };

        let Some(items) = body.get("data").and_then(Value::as_array) else {
            tracing::debug!(tool = label, page, "page without a data array");
            continue;
        };
        users.extend(items.iter().map(filter_user));
        if items.len() < plan.per_page as usize {
            break;
        }
    }

    if failed_pages.len() as u32 == pages_fetched {
        if let Some(e) = last_error {
            return Err(e);
        }
    }

    Ok(json!({
        "total_users": users.len(),
        "pages_fetched": pages_fetched,
        "failed_pages": failed_pages,
        "users": users,
    }))
}

fn filter_user(user: &Value) -> Value {
    let kept: Map<String, Value> = USER_FIELDS
        .iter()
        .map(|k| (k.to_string(), user.get(*k).cloned().unwrap_or(Value::Null)))
        .collect();
    Value::Object(kept)
}
