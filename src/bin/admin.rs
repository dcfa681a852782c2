use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    aihehuo_mcp::infra::logging::init();
    aihehuo_mcp::cli::run().await
}
