use std::sync::Arc;

use serde_json::Value as J;

use crate::clients::{AihehuoRemote, Upstream};
use crate::core::content::{resource_result, tool_result};
use crate::core::error::GatewayError;
use crate::core::mcp::{internal_error, not_found, ok as rpc_ok, InitializeResult, RpcReq, RpcResp};
use crate::infra::config::Config;
use crate::tools::registry::{build_registry, ToolRegistry};
use crate::tools::{pipeline, prompts, resources};

/// Routes JSON-RPC methods. Cheap to clone; shared by both transports.
#[derive(Clone)]
pub struct Dispatcher {
    cfg: Arc<Config>,
    tools: ToolRegistry,
    upstream: Arc<dyn Upstream>,
}

impl Dispatcher {
    pub fn new(cfg: Config, upstream: Arc<dyn Upstream>) -> Self {
        Self { cfg: Arc::new(cfg), tools: build_registry(), upstream }
    }

    /// Dispatcher backed by the real upstream client.
    pub fn from_config(cfg: Config) -> Result<Self, GatewayError> {
        let remote = AihehuoRemote::from_config(&cfg.api)?;
        Ok(Self::new(cfg, Arc::new(remote)))
    }

    /// One raw line in, one response out. Unparseable input answers with `id: null`.
    pub async fn handle_line(&self, line: &str) -> RpcResp {
        match serde_json::from_str::<RpcReq>(line) {
            Ok(req) => self.handle(req).await,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable request");
                internal_error(J::Null, e.to_string())
            }
        }
    }

    pub async fn handle(&self, req: RpcReq) -> RpcResp {
        tracing::debug!(method = %req.method_label(), id = ?req.id, "dispatch");
        let id = req.id.clone();
        match req.method() {
            Some("initialize") => match serde_json::to_value(InitializeResult::current()) {
                Ok(v) => rpc_ok(id, v),
                Err(e) => internal_error(id, e.to_string()),
            },
            Some("tools/list") => rpc_ok(id, self.tools.list_json()),
            Some("tools/call") => self.call_tool(id, &req).await,
            Some("prompts/list") => rpc_ok(id, prompts::list_json()),
            Some("prompts/get") => {
                let name = req.param("name").and_then(J::as_str).unwrap_or("null");
                match prompts::find(name) {
                    Some(p) => rpc_ok(id, p.messages()),
                    None => not_found(id, format!("Unknown prompt: {name}")),
                }
            }
            Some("resources/list") => rpc_ok(id, resources::list_json()),
            Some("resources/read") => {
                let uri = req.param("uri").and_then(J::as_str).unwrap_or("null");
                if uri == resources::PROFILE_URI {
                    let brief = resources::read_profile(&self.cfg.api, self.upstream.as_ref()).await;
                    rpc_ok(id, resource_result(&brief))
                } else {
                    not_found(id, format!("Unknown resource: {uri}"))
                }
            }
            _ => not_found(id, format!("Unknown method: {}", req.method_label())),
        }
    }

    async fn call_tool(&self, id: J, req: &RpcReq) -> RpcResp {
        let name = req.param("name").and_then(J::as_str).unwrap_or("null");
        let Some(desc) = self.tools.lookup(name) else {
            return not_found(id, format!("Unknown tool: {name}"));
        };
        let args = req.param("arguments").cloned().unwrap_or(J::Null);
        let out = pipeline::run(desc, &args, &self.cfg, self.upstream.as_ref()).await;
        rpc_ok(id, tool_result(&out))
    }

    /// Convenience for the admin CLI: run one tool and return its payload.
    pub async fn call_tool_value(&self, name: &str, args: &J) -> Option<J> {
        let desc = self.tools.lookup(name)?;
        Some(pipeline::run(desc, args, &self.cfg, self.upstream.as_ref()).await)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("api_base", &self.cfg.api.base_url)
            .field("tools", &self.tools.len())
            .finish()
    }
}
