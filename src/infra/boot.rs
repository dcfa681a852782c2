use std::net::SocketAddr;

use crate::api::mcp::Dispatcher;
use crate::infra::config::Config;

pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    tracing::info!(
        mode = %cfg.mode,
        port = cfg.port,
        api_base = %cfg.api.base_url,
        current_user_configured = cfg.api.current_user().is_some(),
        "BOOT aihehuo-mcp"
    );
    if !cfg.api.has_api_key() {
        tracing::warn!("AIHEHUO_API_KEY is not configured; upstream calls will be rejected");
    }

    let mode = cfg.mode.clone();
    let port = cfg.port;
    let dispatcher = Dispatcher::from_config(cfg)?;

    if mode == "server" {
        let app = crate::infra::http_app::build_app(dispatcher);
        let addr: SocketAddr = ([0, 0, 0, 0], port).into();
        tracing::info!(%addr, "mode=server");
        axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
        return Ok(());
    }

    crate::infra::runtime::mcp_transport::serve_stdio(&dispatcher).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::ApiConfig;

    #[tokio::test]
    async fn invalid_base_url_fails_at_boot() {
        let cfg = Config::with_api(ApiConfig::new("not a url", "k", "u"));
        let err = run_server(cfg).await.unwrap_err();
        assert!(err.to_string().contains("invalid base url"));
    }
}
