pub fn init() {
    // Initialize tracing subscriber once, honoring RUST_LOG if set.
    // stdout carries the protocol, so log lines go to stderr.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Simple helper to log a metrics-like line until a real sink/exporter is added.
pub fn log_metric(tool: &str, metric: &str, value: f64) {
    tracing::info!(tool = tool, metric = metric, value = value, "metric");
}
