//! Remote rendering API client.
//!
//! The wire flow is a fixed sequence: obtain an access token, create an
//! upload target, upload the source bytes, submit the createpdf job,
//! poll it to a terminal state, then download the result. Each step gets
//! its own typed request/response pair, and every failure is normalized
//! into [`crate::error::ApiError`] before it leaves this module.

mod assets;
mod auth;
mod job;
mod transport;

pub use assets::{DownloadReceipt, UploadTarget};
pub use auth::{AccessToken, TokenSummary};
pub use job::{JobHandle, JobResult, JobStatus};

use crate::config::RenderConfig;
use crate::error::ApiError;
use std::time::Duration;

/// Authenticated HTTP client for the rendering service.
///
/// Holds the client id because every API request after authentication
/// carries it as the `x-api-key` header.
pub struct ApiClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: RenderConfig,
    pub(crate) client_id: String,
}

impl ApiClient {
    /// Build a client with the configured request timeout.
    pub fn new(config: RenderConfig, client_id: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::new(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            config,
            client_id: client_id.into(),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }
}
