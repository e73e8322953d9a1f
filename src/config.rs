//! Configuration for a remote render run.
//!
//! All run behaviour is controlled through [`RenderConfig`], built via its
//! [`RenderConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to serialise a run's settings into the audit log and to diff
//! two runs to understand why their outcomes differ.

use crate::error::BriefpressError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default token endpoint for Adobe PDF Services.
pub const DEFAULT_TOKEN_URL: &str = "https://pdf-services.adobe.io/token";

/// Default API base URL for Adobe PDF Services.
pub const DEFAULT_API_BASE_URL: &str = "https://pdf-services.adobe.io";

/// Configuration for a remote create-pdf run.
///
/// Built via [`RenderConfig::builder()`] or [`RenderConfig::default()`].
///
/// # Example
/// ```rust
/// use briefpress::RenderConfig;
///
/// let config = RenderConfig::builder()
///     .poll_timeout_secs(120)
///     .poll_interval_ms(500)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Token endpoint URL. Default: [`DEFAULT_TOKEN_URL`].
    pub token_url: String,

    /// API base URL against which `/assets`, `/operation/createpdf` and
    /// relative `Location` headers are resolved. Default:
    /// [`DEFAULT_API_BASE_URL`].
    pub api_base_url: String,

    /// Media type declared for the uploaded source content.
    /// Default: `text/plain`.
    pub media_type: String,

    /// Optional `documentLanguage` hint sent with the job submission.
    /// Default: `en-US`.
    pub document_language: Option<String>,

    /// Wall-clock bound on the polling loop, measured from loop entry and
    /// independent of attempt count. Default: 300.
    pub poll_timeout_secs: u64,

    /// Delay between polling attempts while the job is `in progress`.
    /// Clamped to a 100 ms floor. Default: 2000.
    pub poll_interval_ms: u64,

    /// Per-request network timeout in seconds. Applies to every single
    /// HTTP exchange; upload and download use at least 120 s regardless.
    /// Default: 60.
    pub request_timeout_secs: u64,

    /// Explicit credentials-JSON path, checked before the env-named and
    /// default candidates.
    pub credentials_json: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            media_type: "text/plain".to_string(),
            document_language: Some("en-US".to_string()),
            poll_timeout_secs: 300,
            poll_interval_ms: 2000,
            request_timeout_secs: 60,
            credentials_json: None,
        }
    }
}

impl RenderConfig {
    /// Create a new builder for `RenderConfig`.
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder {
            config: Self::default(),
        }
    }

    /// Timeout for the upload and download exchanges, which move whole
    /// artifacts and may legitimately outlast the general request timeout.
    pub fn transfer_timeout_secs(&self) -> u64 {
        self.request_timeout_secs.max(120)
    }
}

/// Builder for [`RenderConfig`].
#[derive(Debug)]
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.config.token_url = url.into();
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.config.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.config.media_type = media_type.into();
        self
    }

    pub fn document_language(mut self, lang: Option<String>) -> Self {
        self.config.document_language = lang;
        self
    }

    pub fn poll_timeout_secs(mut self, secs: u64) -> Self {
        self.config.poll_timeout_secs = secs;
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms.max(100);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn credentials_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.credentials_json = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RenderConfig, BriefpressError> {
        let c = &self.config;
        if c.token_url.is_empty() {
            return Err(BriefpressError::InvalidConfig(
                "token_url must not be empty".into(),
            ));
        }
        if c.api_base_url.is_empty() {
            return Err(BriefpressError::InvalidConfig(
                "api_base_url must not be empty".into(),
            ));
        }
        if c.poll_timeout_secs == 0 {
            return Err(BriefpressError::InvalidConfig(
                "poll_timeout_secs must be >= 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_adobe_endpoints() {
        let c = RenderConfig::default();
        assert_eq!(c.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(c.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(c.media_type, "text/plain");
        assert_eq!(c.poll_timeout_secs, 300);
    }

    #[test]
    fn builder_trims_trailing_slash_on_base_url() {
        let c = RenderConfig::builder()
            .api_base_url("https://pdf.example.test/")
            .build()
            .unwrap();
        assert_eq!(c.api_base_url, "https://pdf.example.test");
    }

    #[test]
    fn poll_interval_has_a_floor() {
        let c = RenderConfig::builder().poll_interval_ms(1).build().unwrap();
        assert_eq!(c.poll_interval_ms, 100);
    }

    #[test]
    fn zero_poll_timeout_is_rejected() {
        let err = RenderConfig::builder().poll_timeout_secs(0).build();
        assert!(matches!(err, Err(BriefpressError::InvalidConfig(_))));
    }

    #[test]
    fn transfer_timeout_never_below_120s() {
        let c = RenderConfig::builder()
            .request_timeout_secs(30)
            .build()
            .unwrap();
        assert_eq!(c.transfer_timeout_secs(), 120);
        let c = RenderConfig::builder()
            .request_timeout_secs(240)
            .build()
            .unwrap();
        assert_eq!(c.transfer_timeout_secs(), 240);
    }
}
