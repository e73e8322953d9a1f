//! Asset upload and download around the job itself.

use super::transport::{ensure_success, read_json, request_id_of, transport_error};
use super::{AccessToken, ApiClient};
use crate::error::ApiError;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// A provisioned upload slot: the asset id the job will reference and
/// the presigned URI the bytes go to.
#[derive(Debug, Clone, Serialize)]
pub struct UploadTarget {
    pub asset_id: String,
    pub upload_uri: String,
    pub request_id: Option<String>,
}

/// Outcome of a completed download.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadReceipt {
    pub bytes_written: u64,
    pub content_type: Option<String>,
}

impl ApiClient {
    /// Ask the service for an upload slot for the given media type.
    pub async fn create_upload_target(
        &self,
        token: &AccessToken,
        media_type: &str,
    ) -> Result<UploadTarget, ApiError> {
        let url = format!("{}/assets", self.config.api_base_url);
        debug!(%url, media_type, "creating upload target");

        let response = self
            .http
            .post(&url)
            .header("Authorization", token.bearer())
            .header("x-api-key", &self.client_id)
            .json(&serde_json::json!({ "mediaType": media_type }))
            .send()
            .await
            .map_err(|e| transport_error("asset creation", &url, e))?;

        let response = ensure_success("asset creation", response).await?;
        let request_id = request_id_of(&response);
        let body = read_json("asset creation", response).await?;

        let field = |name: &str| {
            body.get(name)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .ok_or_else(|| {
                    ApiError::new(format!("asset creation response missing '{name}'"))
                        .with_url(&url)
                })
        };

        Ok(UploadTarget {
            asset_id: field("assetID")?,
            upload_uri: field("uploadUri")?,
            request_id,
        })
    }

    /// PUT the source bytes to the presigned upload URI.
    ///
    /// The presigned URI carries its own authorization, so no API headers
    /// are attached. Uses the transfer timeout rather than the shorter
    /// request timeout.
    pub async fn upload_bytes(
        &self,
        target: &UploadTarget,
        bytes: Vec<u8>,
        media_type: &str,
    ) -> Result<(), ApiError> {
        debug!(asset_id = %target.asset_id, len = bytes.len(), "uploading source bytes");

        let response = self
            .http
            .put(&target.upload_uri)
            .header("Content-Type", media_type)
            .timeout(Duration::from_secs(self.config.transfer_timeout_secs()))
            .body(bytes)
            .send()
            .await
            .map_err(|e| transport_error("upload", &target.upload_uri, e))?;

        ensure_success("upload", response).await?;
        Ok(())
    }

    /// Stream a finished asset to `output_path`, creating parent
    /// directories as needed.
    pub async fn download_asset(
        &self,
        download_uri: &str,
        output_path: &Path,
    ) -> Result<DownloadReceipt, ApiError> {
        debug!(url = download_uri, path = %output_path.display(), "downloading result");

        let response = self
            .http
            .get(download_uri)
            .timeout(Duration::from_secs(self.config.transfer_timeout_secs()))
            .send()
            .await
            .map_err(|e| transport_error("download", download_uri, e))?;

        let response = ensure_success("download", response).await?;
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error("download", download_uri, e))?;

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ApiError::new(format!(
                        "could not create output directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        std::fs::write(output_path, &bytes).map_err(|e| {
            ApiError::new(format!(
                "could not write output file {}: {e}",
                output_path.display()
            ))
        })?;

        Ok(DownloadReceipt {
            bytes_written: bytes.len() as u64,
            content_type,
        })
    }
}
