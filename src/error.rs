//! Error types for the briefpress library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ApiError`] — any remote-call failure (network error, non-2xx,
//!   malformed body, missing expected field, protocol violation, polling
//!   timeout, job-reported failure). Deliberately a single flat value
//!   rather than a hierarchy: every call site needs the same correlation
//!   fields (url, status code, request id, truncated body), so one shape
//!   serves them all.
//!
//! * [`CredentialResolutionError`] — no usable credential source. Carries
//!   every attempted source with its specific reason, since there is no
//!   single canonical place credentials live and the operator has to see
//!   the whole chain to diagnose.
//!
//! Failing compliance is *not* an error: the preflight verifier returns a
//! normal [`crate::preflight::ComplianceReport`] with a `FAIL` verdict.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// A remote-call failure, normalized at the transport boundary.
///
/// Invariant: immutable once constructed, and carries enough context
/// (url + request id + truncated body) to correlate with server-side
/// logs. It never contains a full secret or bearer token.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status_code: Option<u16>,
    /// `x-request-id` response header, when the server sent one.
    pub request_id: Option<String>,
    /// First ~400 chars of the response body, newlines flattened.
    pub body_excerpt: Option<String>,
    pub url: Option<String>,
    /// Free-form diagnostic context (e.g. poll attempts, last status).
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
            request_id: None,
            body_excerpt: None,
            url: None,
            details: serde_json::Map::new(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn with_body_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.body_excerpt = Some(excerpt.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_detail(mut self, key: &str, value: serde_json::Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }
}

/// No credential source yielded a usable `client_id`/`client_secret` pair.
///
/// Always fatal, never retried. `attempts` lists every source tried, in
/// order, with its specific failure reason.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CredentialResolutionError {
    pub message: String,
    pub attempts: Vec<String>,
}

impl CredentialResolutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attempts: Vec::new(),
        }
    }

    pub fn with_attempts(mut self, attempts: Vec<String>) -> Self {
        self.attempts = attempts;
        self
    }
}

/// All fatal errors returned by the briefpress library.
#[derive(Debug, Error)]
pub enum BriefpressError {
    /// No credential source yielded a usable pair.
    #[error(transparent)]
    Credentials(#[from] CredentialResolutionError),

    /// A remote call failed. Nothing is retried automatically except the
    /// polling loop's own `in progress` continuation.
    #[error(transparent)]
    Api(#[from] Box<ApiError>),

    /// Input could not be normalized into a valid brief payload.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// A rule document failed to parse.
    #[error("Invalid rule set: {0}")]
    InvalidRules(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input file was not found at the given path.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Could not read an input file.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output file.
    #[error("Failed to write '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ApiError> for BriefpressError {
    fn from(e: ApiError) -> Self {
        BriefpressError::Api(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_is_message() {
        let e = ApiError::new("HTTP 503 from https://example.test/assets")
            .with_status(503)
            .with_url("https://example.test/assets");
        assert_eq!(e.to_string(), "HTTP 503 from https://example.test/assets");
    }

    #[test]
    fn api_error_serializes_correlation_fields() {
        let e = ApiError::new("Token response missing access_token")
            .with_status(200)
            .with_request_id(Some("req-42".into()))
            .with_detail("attempts", serde_json::json!(3));
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["status_code"], 200);
        assert_eq!(v["request_id"], "req-42");
        assert_eq!(v["details"]["attempts"], 3);
    }

    #[test]
    fn credential_error_keeps_attempt_order() {
        let e = CredentialResolutionError::new("no usable source").with_attempts(vec![
            "override: not found".into(),
            "default: not found".into(),
        ]);
        assert_eq!(e.attempts.len(), 2);
        assert!(e.attempts[0].starts_with("override"));
    }
}
