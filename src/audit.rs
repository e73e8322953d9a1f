//! Structured run records.
//!
//! Every render run leaves a JSON audit trail: a [`RunLog`] on success,
//! an error record carrying the full normalized failure otherwise.
//! Secrets never enter these records; credential and token fields hold
//! masked summaries only.

use crate::api::{DownloadReceipt, TokenSummary};
use crate::credentials::CredentialsSummary;
use crate::error::BriefpressError;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Outcome of one pipeline step, keyed by step name in the run log.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub detail: serde_json::Value,
}

/// Audit record for a completed render.
#[derive(Debug, Clone, Serialize)]
pub struct RunLog {
    pub operation: String,
    pub mode: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CredentialsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenSummary>,
    /// Step outcomes in a sorted map so serialization is stable.
    pub steps: BTreeMap<String, StepRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputRecord>,
}

/// Where the artifact landed and what came over the wire.
#[derive(Debug, Clone, Serialize)]
pub struct OutputRecord {
    pub path: PathBuf,
    pub bytes_written: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl RunLog {
    pub fn new(operation: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            mode: mode.into(),
            timestamp: utc_timestamp(),
            credentials: None,
            token: None,
            steps: BTreeMap::new(),
            output: None,
        }
    }

    pub fn record_step(&mut self, name: &str, elapsed_ms: u64, detail: serde_json::Value) {
        self.steps
            .insert(name.to_string(), StepRecord { elapsed_ms, detail });
    }

    pub fn record_output(&mut self, path: &Path, receipt: &DownloadReceipt) {
        self.output = Some(OutputRecord {
            path: path.to_path_buf(),
            bytes_written: receipt.bytes_written,
            content_type: receipt.content_type.clone(),
        });
    }
}

/// Persisted shape of a failed run.
#[derive(Debug, Serialize)]
pub struct ErrorRecord<'a> {
    pub operation: &'a str,
    pub mode: &'a str,
    pub timestamp: String,
    pub error: serde_json::Value,
}

/// Write a run log next to the artifact (or wherever the caller points).
pub fn write_run_log(path: &Path, log: &RunLog) -> Result<(), BriefpressError> {
    write_json(path, log)
}

/// Persist a failure as a structured error record. API errors keep their
/// full normalized shape; other errors are recorded as a message.
pub fn write_error_record(
    path: &Path,
    operation: &str,
    mode: &str,
    error: &BriefpressError,
) -> Result<(), BriefpressError> {
    let error_value = match error {
        BriefpressError::Api(api) => serde_json::to_value(api.as_ref())
            .unwrap_or_else(|_| serde_json::json!({ "message": api.to_string() })),
        other => serde_json::json!({ "message": other.to_string() }),
    };
    write_json(
        path,
        &ErrorRecord {
            operation,
            mode,
            timestamp: utc_timestamp(),
            error: error_value,
        },
    )
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), BriefpressError> {
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| BriefpressError::Internal(format!("run record serialization failed: {e}")))?;
    std::fs::write(path, body).map_err(|e| BriefpressError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Current time as an RFC 3339 UTC string with second precision.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn timestamps_are_rfc3339_utc() {
        let ts = utc_timestamp();
        assert!(ts.ends_with('Z'), "got: {ts}");
        let parsed = chrono::DateTime::parse_from_rfc3339(&ts).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
    }

    #[test]
    fn run_log_serializes_stable_step_order() {
        let mut log = RunLog::new("render", "remote");
        log.record_step("upload", 12, serde_json::Value::Null);
        log.record_step("asset", 5, serde_json::json!({"asset_id": "a-1"}));
        let json = serde_json::to_string(&log).unwrap();
        assert!(json.find("\"asset\"").unwrap() < json.find("\"upload\"").unwrap());
        assert!(!json.contains("\"detail\":null"));
    }

    #[test]
    fn error_record_keeps_api_shape() {
        let api = ApiError::new("job polling failed").with_status(502);
        let err = BriefpressError::from(api);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error.json");
        write_error_record(&path, "render", "remote", &err).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["error"]["status_code"], 502);
        assert_eq!(value["operation"], "render");
    }
}
