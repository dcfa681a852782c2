use std::time::Duration;

/// Connect timeout shared by every upstream call; the overall per-call
/// timeout is set per request from the operation's route.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on any single call when a request does not set its own.
pub const FALLBACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Build a reqwest client with sane defaults (connect and overall timeouts).
pub fn make_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(FALLBACK_TIMEOUT)
        .build()
}
