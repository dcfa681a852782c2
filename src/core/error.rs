use std::time::Duration;

use thiserror::Error;

/// Input rejected by the binder before any upstream call is made.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required parameter: {field}")]
    Missing { field: &'static str },

    #[error("invalid type for parameter '{field}': expected {expected}, got {actual}")]
    Type { field: String, expected: &'static str, actual: &'static str },

    #[error("parameter '{field}' is too short: {length} characters, minimum {minimum}")]
    TooShort { field: &'static str, length: usize, minimum: usize },

    #[error("parameter '{field}' must be a positive integer, got {value}")]
    NotPositive { field: String, value: i64 },

    #[error("conflicting parameters")]
    Conflicting { first: &'static str, second: &'static str },

    #[error("missing required parameter")]
    MissingOneOf { first: &'static str, second: &'static str },

    #[error("malformed parameters: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// Human-readable sentence for failures that carry their own wording.
    pub fn detail(&self) -> Option<String> {
        match self {
            ValidationError::Conflicting { first, second } => {
                Some(format!("Only one of {first} or {second} should be provided, not both"))
            }
            ValidationError::MissingOneOf { first, second } => {
                Some(format!("Either {first} or {second} must be provided"))
            }
            _ => None,
        }
    }
}

/// Anything that went wrong talking to the upstream API.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("upstream status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream call timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("upstream returned a non-JSON body: {0}")]
    Decode(String),

    #[error("cannot read upload file {path}: {message}")]
    File { path: String, message: String },
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}

/// Operation-level failure: always reported inside a successful JSON-RPC envelope.
#[derive(Debug, Error)]
pub enum ToolFailure {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("{0} not configured")]
    NotConfigured(&'static str),

    #[error("failed to write transcript {path}: {message}")]
    Export { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_displays_validation_messages() {
        let e = ValidationError::Missing { field: "query" };
        assert_eq!(e.to_string(), "missing required parameter: query");

        let e = ValidationError::Type { field: "bio".into(), expected: "string", actual: "number" };
        assert_eq!(e.to_string(), "invalid type for parameter 'bio': expected string, got number");
    }

    #[test]
    fn exclusive_failures_carry_detail_sentences() {
        let both = ValidationError::Conflicting { first: "html_body", second: "html_file_path" };
        assert_eq!(both.to_string(), "conflicting parameters");
        assert_eq!(
            both.detail().unwrap(),
            "Only one of html_body or html_file_path should be provided, not both"
        );

        let neither = ValidationError::MissingOneOf { first: "html_body", second: "html_file_path" };
        assert_eq!(neither.to_string(), "missing required parameter");
        assert_eq!(neither.detail().unwrap(), "Either html_body or html_file_path must be provided");
        assert!(ValidationError::Missing { field: "x" }.detail().is_none());
    }

    #[test]
    fn tool_failure_is_transparent_over_sources() {
        let f: ToolFailure = GatewayError::Status { status: 502, body: "bad gateway".into() }.into();
        assert_eq!(f.to_string(), "upstream status 502: bad gateway");

        let f = ToolFailure::NotConfigured("CURRENT_USER_ID");
        assert_eq!(f.to_string(), "CURRENT_USER_ID not configured");
    }

    #[test]
    fn timeout_reports_seconds() {
        let e = GatewayError::Timeout(Duration::from_secs(15));
        assert_eq!(e.to_string(), "upstream call timed out after 15s");
    }
}
