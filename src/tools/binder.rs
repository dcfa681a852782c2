//! Generic parameter binder: raw `arguments` + descriptor -> typed record.
//!
//! All checks are driven by the descriptor's field list, so adding a tool never
//! means writing validation code. The binder is pure; it performs no I/O.

use serde_json::{Map, Value};

use crate::core::error::ValidationError;
use crate::core::tool::{FieldKind, FieldSpec, OperationDescriptor};
use crate::domain::{Pagination, ToolParams};

pub fn bind(desc: &OperationDescriptor, raw: &Value) -> Result<ToolParams, ValidationError> {
    let empty = Map::new();
    let args = match raw {
        Value::Null => &empty,
        Value::Object(m) => m,
        other => {
            return Err(ValidationError::Type {
                field: "arguments".into(),
                expected: "object",
                actual: json_type(other),
            })
        }
    };

    if let Some(pair) = desc.one_of {
        let has_first = present(args, pair.first).is_some();
        let has_second = present(args, pair.second).is_some();
        match (has_first, has_second) {
            (true, true) => {
                return Err(ValidationError::Conflicting { first: pair.first, second: pair.second })
            }
            (false, false) => {
                return Err(ValidationError::MissingOneOf { first: pair.first, second: pair.second })
            }
            _ => {}
        }
    }

    let mut out = Map::new();
    for field in desc.fields {
        match present(args, field.name) {
            Some(v) => {
                out.insert(field.name.to_string(), check_field(field, v)?);
            }
            None if field.required => return Err(ValidationError::Missing { field: field.name }),
            None => {
                if let Some(default) = default_for(field) {
                    out.insert(field.name.to_string(), default);
                }
            }
        }
    }

    ToolParams::from_map(desc.record, out)
}

/// Present and not `null`.
fn present<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    args.get(key).filter(|v| !v.is_null())
}

fn default_for(field: &FieldSpec) -> Option<Value> {
    match field.kind {
        FieldKind::Text { .. } => None,
        FieldKind::TextList => Some(Value::Array(Vec::new())),
        FieldKind::Pagination => serde_json::to_value(Pagination::default()).ok(),
    }
}

fn check_field(field: &FieldSpec, v: &Value) -> Result<Value, ValidationError> {
    match field.kind {
        FieldKind::Text { min_len } => {
            let s = v.as_str().ok_or_else(|| mismatch(field.name, "string", v))?;
            if let Some(minimum) = min_len {
                let length = s.trim().chars().count();
                if length < minimum {
                    return Err(ValidationError::TooShort { field: field.name, length, minimum });
                }
            }
            Ok(v.clone())
        }
        FieldKind::TextList => {
            let items = v.as_array().ok_or_else(|| mismatch(field.name, "array", v))?;
            for (i, item) in items.iter().enumerate() {
                if !item.is_string() {
                    return Err(mismatch(&format!("{}[{i}]", field.name), "string", item));
                }
            }
            Ok(v.clone())
        }
        FieldKind::Pagination => {
            let given = v.as_object().ok_or_else(|| mismatch(field.name, "object", v))?;
            let defaults = Pagination::default();
            let page = page_value(given, "page", defaults.page)?;
            let per = page_value(given, "per", defaults.per)?;
            serde_json::to_value(Pagination::new(page, per))
                .map_err(|e| ValidationError::Malformed(e.to_string()))
        }
    }
}

/// Deep-merge one pagination key over its default.
fn page_value(given: &Map<String, Value>, key: &str, default: u32) -> Result<u32, ValidationError> {
    let field = format!("paginate.{key}");
    let Some(v) = present(given, key) else {
        return Ok(default);
    };
    let n = v.as_i64().ok_or_else(|| mismatch(&field, "integer", v))?;
    if n <= 0 {
        return Err(ValidationError::NotPositive { field, value: n });
    }
    u32::try_from(n).map_err(|_| ValidationError::Malformed(format!("{field} out of range: {n}")))
}

fn mismatch(field: &str, expected: &'static str, got: &Value) -> ValidationError {
    ValidationError::Type { field: field.to_string(), expected, actual: json_type(got) }
}

pub fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
