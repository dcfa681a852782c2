//! Declarative operation descriptors. Everything the generic pipeline needs to
//! know about a tool (input contract, route, encoding, timeout, error echo and
//! response shaping) lives here as static data.

use std::time::Duration;

use serde_json::{json, Map, Value};

/// Minimal metadata every listed tool must expose.
pub trait ToolSpec {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> Value;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// String; `min_len` is measured in characters on the trimmed value.
    Text { min_len: Option<usize> },
    TextList,
    /// `{page, per}` object deep-merged over `{1, 10}`.
    Pagination,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

impl FieldSpec {
    pub const fn required(name: &'static str, description: &'static str) -> Self {
        Self { name, kind: FieldKind::Text { min_len: None }, required: true, description }
    }

    pub const fn optional(name: &'static str, description: &'static str) -> Self {
        Self { name, kind: FieldKind::Text { min_len: None }, required: false, description }
    }

    pub const fn min_len(self, n: usize) -> Self {
        Self { kind: FieldKind::Text { min_len: Some(n) }, ..self }
    }

    pub const fn list(name: &'static str, description: &'static str) -> Self {
        Self { name, kind: FieldKind::TextList, required: false, description }
    }

    pub const fn paginate() -> Self {
        Self { name: "paginate", kind: FieldKind::Pagination, required: false, description: "分页参数" }
    }

    fn schema(&self) -> Value {
        match self.kind {
            FieldKind::Text { min_len } => {
                let mut s = json!({ "type": "string", "description": self.description });
                if let Some(n) = min_len {
                    s["minLength"] = json!(n);
                }
                s
            }
            FieldKind::TextList => json!({
                "type": "array",
                "items": { "type": "string" },
                "description": self.description,
                "default": []
            }),
            FieldKind::Pagination => json!({
                "type": "object",
                "description": self.description,
                "properties": {
                    "page": { "type": "integer", "default": 1 },
                    "per": { "type": "integer", "default": 10 }
                },
                "default": { "page": 1, "per": 10 }
            }),
        }
    }
}

/// Two optional fields of which exactly one must be present.
#[derive(Debug, Clone, Copy)]
pub struct OneOf {
    pub first: &'static str,
    pub second: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
}

impl Verb {
    pub fn method(self) -> reqwest::Method {
        match self {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// No body; path (and fixed query) only.
    Bare,
    Json,
    Query,
    /// JSON body, or multipart form-data when a file path replaces inline content.
    JsonOrMultipart,
}

/// Upstream call template. `{name}` placeholders in `path` are filled from the
/// bound record; `{current_user}` from configuration.
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub verb: Verb,
    pub path: &'static str,
    pub encoding: Encoding,
    pub fixed_query: &'static [(&'static str, &'static str)],
    pub timeout_secs: u64,
}

impl Route {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Typed record the binder produces for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Empty,
    Search,
    Group,
    Bio,
    Goal,
    Page,
    Idea,
    User,
    Article,
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Public,
    /// Needs the configured current user; short-circuits on the placeholder.
    CurrentUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Unknown,
    Empty,
}

/// Identifying field echoed into an operation's error payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    Arg(&'static str, Fallback),
    /// `page` / `page_size` taken from the raw `paginate` argument.
    PageWindow,
    CurrentUser,
    Zero(&'static str),
    EmptyList(&'static str),
}

/// How a successful upstream body becomes the tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Verbatim,
    /// Local answer, no upstream call.
    ServerInfo,
    /// Sequential page sweep with field filtering.
    NewUsersSweep,
    /// Markdown written to the scratch directory; path returned.
    Transcript,
}

#[derive(Debug, Clone, Copy)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldSpec],
    pub one_of: Option<OneOf>,
    pub record: RecordKind,
    pub route: Option<Route>,
    pub scope: Scope,
    pub shape: Shape,
    pub failure_message: &'static str,
    pub echo: &'static [Echo],
}

impl OperationDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields listed under JSON-schema `required`. One-of pairs are not listed
    /// because either side alone satisfies the contract.
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields.iter().filter(|f| f.required).map(|f| f.name).collect()
    }
}

impl ToolSpec for OperationDescriptor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn input_schema(&self) -> Value {
        let properties: Map<String, Value> =
            self.fields.iter().map(|f| (f.name.to_string(), f.schema())).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_fields(),
        })
    }
}
