use aihehuo_mcp::infra;
use infra::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    infra::logging::init();

    let cfg = Config::from_env_and_toml()?;
    infra::boot::run_server(cfg).await
}
