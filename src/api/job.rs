//! Job submission and polling.

use super::transport::{ensure_success, read_json, request_id_of, transport_error};
use super::{AccessToken, ApiClient};
use crate::error::ApiError;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A submitted job, identified by the status URL the service returned.
#[derive(Debug, Clone, Serialize)]
pub struct JobHandle {
    pub status_url: String,
    pub request_id: Option<String>,
}

/// The three states the service reports while a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    InProgress,
    Done,
    Failed,
}

impl JobStatus {
    /// Parse the wire status string, normalizing case and surrounding
    /// whitespace first. Anything unrecognized is `None`; the poll loop
    /// treats that as a hard failure rather than retrying against a
    /// contract it no longer understands.
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "in progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A job that reached `done`, with the artifact ready to fetch.
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub status: JobStatus,
    pub download_uri: String,
    /// Number of status responses received before the terminal one,
    /// inclusive of it.
    pub attempts: u32,
    pub request_id: Option<String>,
}

impl ApiClient {
    /// Submit a createpdf job for an uploaded asset.
    ///
    /// The status URL comes back in the `Location` header. A relative
    /// location is resolved against the API base URL. A missing header
    /// aborts before any polling happens.
    pub async fn submit_createpdf(
        &self,
        token: &AccessToken,
        asset_id: &str,
    ) -> Result<JobHandle, ApiError> {
        let url = format!("{}/operation/createpdf", self.config.api_base_url);
        debug!(%url, asset_id, "submitting createpdf job");

        let mut payload = serde_json::json!({ "assetID": asset_id });
        if let Some(lang) = &self.config.document_language {
            payload["documentLanguage"] = serde_json::json!(lang);
        }

        let response = self
            .http
            .post(&url)
            .header("Authorization", token.bearer())
            .header("x-api-key", &self.client_id)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error("job submission", &url, e))?;

        let response = ensure_success("job submission", response).await?;
        let request_id = request_id_of(&response);

        let location = response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .ok_or_else(|| {
                ApiError::new("job submission response had no Location header")
                    .with_status(response.status().as_u16())
                    .with_url(&url)
                    .with_request_id(request_id.clone())
            })?;

        let status_url = if location.starts_with('/') {
            format!("{}{location}", self.config.api_base_url)
        } else {
            location
        };

        Ok(JobHandle {
            status_url,
            request_id,
        })
    }

    /// Poll a job until it reaches a terminal state or the deadline
    /// passes.
    ///
    /// The deadline clock starts when the loop is entered, not at
    /// submission. An attempt is counted once a status response has been
    /// parsed, so a timeout error reports how many responses were
    /// actually seen.
    pub async fn poll_to_completion(
        &self,
        token: &AccessToken,
        handle: &JobHandle,
    ) -> Result<JobResult, ApiError> {
        let deadline = Instant::now() + Duration::from_secs(self.config.poll_timeout_secs);
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let mut attempts: u32 = 0;
        let mut last_status: Option<JobStatus> = None;

        loop {
            if Instant::now() >= deadline {
                warn!(attempts, "job polling timed out");
                return Err(ApiError::new(format!(
                    "job did not finish within {} seconds",
                    self.config.poll_timeout_secs
                ))
                .with_url(&handle.status_url)
                .with_detail("attempts", serde_json::json!(attempts))
                .with_detail(
                    "last_status",
                    serde_json::to_value(last_status).unwrap_or(serde_json::Value::Null),
                ));
            }

            let response = self
                .http
                .get(&handle.status_url)
                .header("Authorization", token.bearer())
                .header("x-api-key", &self.client_id)
                .send()
                .await
                .map_err(|e| transport_error("job polling", &handle.status_url, e))?;

            let response = ensure_success("job polling", response).await?;
            let request_id = request_id_of(&response);
            let body = read_json("job polling", response).await?;

            let raw_status = body.get("status").and_then(|v| v.as_str()).unwrap_or("");
            let status = JobStatus::parse(raw_status).ok_or_else(|| {
                ApiError::new(format!("job reported unknown status '{raw_status}'"))
                    .with_url(&handle.status_url)
                    .with_detail("attempts", serde_json::json!(attempts + 1))
            })?;
            attempts += 1;
            last_status = Some(status);
            debug!(attempts, ?status, "job status");

            match status {
                JobStatus::InProgress => {
                    tokio::time::sleep(interval).await;
                }
                JobStatus::Failed => {
                    let message = body
                        .pointer("/error/message")
                        .or_else(|| body.get("message"))
                        .and_then(|v| v.as_str())
                        .unwrap_or("job failed without an error message");
                    let mut err = ApiError::new(message)
                        .with_url(&handle.status_url)
                        .with_detail("attempts", serde_json::json!(attempts))
                        .with_request_id(request_id);
                    if let Some(code) = body.pointer("/error/status").and_then(|v| v.as_u64()) {
                        err = err.with_status(code as u16);
                    }
                    if let Some(code) = body.pointer("/error/code").and_then(|v| v.as_str()) {
                        err = err.with_detail("code", serde_json::json!(code));
                    }
                    return Err(err);
                }
                JobStatus::Done => {
                    let download_uri = body
                        .pointer("/asset/downloadUri")
                        .or_else(|| body.get("downloadUri"))
                        .and_then(|v| v.as_str())
                        .filter(|s| !s.is_empty())
                        .ok_or_else(|| {
                            ApiError::new("job finished but no downloadUri was provided")
                                .with_url(&handle.status_url)
                                .with_detail("attempts", serde_json::json!(attempts))
                        })?;
                    return Ok(JobResult {
                        status,
                        download_uri: download_uri.to_string(),
                        attempts,
                        request_id,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_only_known_values() {
        assert_eq!(JobStatus::parse("in progress"), Some(JobStatus::InProgress));
        assert_eq!(JobStatus::parse("done"), Some(JobStatus::Done));
        assert_eq!(JobStatus::parse("failed"), Some(JobStatus::Failed));
        assert_eq!(JobStatus::parse("queued"), None);
        assert_eq!(JobStatus::parse(""), None);
    }

    #[test]
    fn status_parsing_normalizes_case_and_whitespace() {
        assert_eq!(JobStatus::parse("Done"), Some(JobStatus::Done));
        assert_eq!(JobStatus::parse(" In Progress "), Some(JobStatus::InProgress));
        assert_eq!(JobStatus::parse("FAILED"), Some(JobStatus::Failed));
    }
}
