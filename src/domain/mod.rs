//! Typed parameter records produced by the binder, one shape per operation family.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::core::error::ValidationError;
use crate::core::tool::RecordKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, per: 10 }
    }
}

impl Pagination {
    pub fn new(page: u32, per: u32) -> Self {
        Self { page, per }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default)]
    pub paginate: Pagination,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupRef {
    pub group_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BioUpdate {
    pub bio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalUpdate {
    pub goal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub paginate: Pagination,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdeaRef {
    pub idea_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRef {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    pub digest: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiReport {
    pub title: String,
    #[serde(rename = "abstract")]
    pub summary: String,
    #[serde(default)]
    pub html_body: Option<String>,
    #[serde(default)]
    pub html_file_path: Option<PathBuf>,
    #[serde(default)]
    pub mentioned_user_ids: Vec<String>,
    #[serde(default)]
    pub mentioned_idea_ids: Vec<String>,
}

/// Bound, validated input for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolParams {
    Empty,
    Search(SearchQuery),
    Group(GroupRef),
    Bio(BioUpdate),
    Goal(GoalUpdate),
    Page(PageRequest),
    Idea(IdeaRef),
    User(UserRef),
    Article(ArticleDraft),
    Report(AiReport),
}

impl ToolParams {
    /// Convert a normalized argument map into the record for `kind`.
    pub fn from_map(kind: RecordKind, map: Map<String, Value>) -> Result<Self, ValidationError> {
        fn typed<T: serde::de::DeserializeOwned>(map: Map<String, Value>) -> Result<T, ValidationError> {
            serde_json::from_value(Value::Object(map)).map_err(|e| ValidationError::Malformed(e.to_string()))
        }
        Ok(match kind {
            RecordKind::Empty => ToolParams::Empty,
            RecordKind::Search => ToolParams::Search(typed(map)?),
            RecordKind::Group => ToolParams::Group(typed(map)?),
            RecordKind::Bio => ToolParams::Bio(typed(map)?),
            RecordKind::Goal => ToolParams::Goal(typed(map)?),
            RecordKind::Page => ToolParams::Page(typed(map)?),
            RecordKind::Idea => ToolParams::Idea(typed(map)?),
            RecordKind::User => ToolParams::User(typed(map)?),
            RecordKind::Article => ToolParams::Article(typed(map)?),
            RecordKind::Report => ToolParams::Report(typed(map)?),
        })
    }

    /// Value for a `{name}` placeholder in a route path.
    pub fn path_var(&self, name: &str) -> Option<&str> {
        match (self, name) {
            (ToolParams::Group(g), "group_id") => Some(&g.group_id),
            (ToolParams::Idea(i), "idea_id") => Some(&i.idea_id),
            (ToolParams::User(u), "user_id") => Some(&u.user_id),
            _ => None,
        }
    }

    pub fn pagination(&self) -> Option<Pagination> {
        match self {
            ToolParams::Search(s) => Some(s.paginate),
            ToolParams::Page(p) => Some(p.paginate),
            _ => None,
        }
    }

    /// JSON request body for the record, if it has one.
    pub fn json_body(&self) -> Option<Value> {
        match self {
            ToolParams::Search(s) => Some(json!({
                "query": s.query,
                "paginate": s.paginate,
                "vector_search": true,
            })),
            ToolParams::Bio(b) => serde_json::to_value(b).ok(),
            ToolParams::Goal(g) => serde_json::to_value(g).ok(),
            ToolParams::Page(p) => serde_json::to_value(p).ok(),
            ToolParams::Article(a) => serde_json::to_value(a).ok(),
            ToolParams::Report(r) => Some(json!({
                "title": r.title,
                "abstract": r.summary,
                "html_body": r.html_body,
                "mentioned_user_ids": r.mentioned_user_ids,
                "mentioned_idea_ids": r.mentioned_idea_ids,
            })),
            _ => None,
        }
    }

    /// Query-string pairs for records sent as query parameters.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        match self.pagination() {
            Some(p) => vec![("page".into(), p.page.to_string()), ("per".into(), p.per.to_string())],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn search_body_carries_vector_flag_and_pagination() {
        let p = ToolParams::from_map(
            RecordKind::Search,
            map(json!({"query": "寻找医疗方向的技术合伙人", "paginate": {"page": 2, "per": 5}})),
        )
        .unwrap();
        let body = p.json_body().unwrap();
        assert_eq!(body["vector_search"], true);
        assert_eq!(body["paginate"], json!({"page": 2, "per": 5}));
    }

    #[test]
    fn page_request_defaults_pagination() {
        let p = ToolParams::from_map(RecordKind::Page, Map::new()).unwrap();
        assert_eq!(p.pagination(), Some(Pagination::default()));
        assert_eq!(p.json_body().unwrap(), json!({"paginate": {"page": 1, "per": 10}}));
        assert_eq!(
            p.query_pairs(),
            vec![("page".to_string(), "1".to_string()), ("per".to_string(), "10".to_string())]
        );
    }

    #[test]
    fn report_renames_abstract_field() {
        let p = ToolParams::from_map(
            RecordKind::Report,
            map(json!({"title": "t", "abstract": "a", "html_body": "<p>x</p>", "mentioned_user_ids": ["1"]})),
        )
        .unwrap();
        let body = p.json_body().unwrap();
        assert_eq!(body["abstract"], "a");
        assert_eq!(body["mentioned_user_ids"], json!(["1"]));
        assert_eq!(body["mentioned_idea_ids"], json!([]));
    }

    #[test]
    fn exposes_path_vars_per_record() {
        let p = ToolParams::from_map(RecordKind::Group, map(json!({"group_id": "42"}))).unwrap();
        assert_eq!(p.path_var("group_id"), Some("42"));
        assert_eq!(p.path_var("idea_id"), None);
    }

    #[test]
    fn malformed_map_is_a_validation_error() {
        let err = ToolParams::from_map(RecordKind::Idea, Map::new()).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }
}
