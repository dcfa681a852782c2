use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::core::tool::{OperationDescriptor, ToolSpec};
use crate::tools::catalog::OPERATIONS;

/// Read-only tool registry: declaration order for listing, name index for lookup.
#[derive(Clone)]
pub struct ToolRegistry {
    ordered: Arc<Vec<&'static OperationDescriptor>>,
    by_name: Arc<HashMap<&'static str, &'static OperationDescriptor>>,
}

impl ToolRegistry {
    pub fn with_tools<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = &'static OperationDescriptor>,
    {
        let ordered: Vec<_> = iter.into_iter().collect();
        let by_name = ordered.iter().map(|d| (d.name, *d)).collect();
        Self { ordered: Arc::new(ordered), by_name: Arc::new(by_name) }
    }

    pub fn lookup(&self, name: &str) -> Option<&'static OperationDescriptor> {
        self.by_name.get(name).copied()
    }

    pub fn list(&self) -> Vec<ToolMeta> {
        self.ordered
            .iter()
            .map(|t| ToolMeta {
                name: t.name(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// `tools/list` result body.
    pub fn list_json(&self) -> Value {
        let tools: Vec<Value> = self
            .list()
            .into_iter()
            .map(|t| json!({ "name": t.name, "description": t.description, "inputSchema": t.input_schema }))
            .collect();
        json!({ "tools": tools })
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Registry over the full static catalog.
pub fn build_registry() -> ToolRegistry {
    ToolRegistry::with_tools(OPERATIONS.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_in_declaration_order() {
        let reg = build_registry();
        let metas = reg.list();
        assert_eq!(metas.len(), OPERATIONS.len());
        assert_eq!(metas[0].name, "server_info");
        assert_eq!(metas[1].name, "search_members");
        assert_eq!(metas.last().unwrap().name, "create_ai_report");
    }

    #[test]
    fn lookup_unknown_is_none() {
        let reg = build_registry();
        assert!(reg.lookup("get_user_details").is_some());
        assert!(reg.lookup("does.not.exist").is_none());
    }

    #[test]
    fn list_json_uses_input_schema_key() {
        let v = build_registry().list_json();
        let tools = v["tools"].as_array().unwrap();
        assert!(!tools.is_empty());
        assert_eq!(tools[1]["inputSchema"]["required"], json!(["query"]));
    }
}
