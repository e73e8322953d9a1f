//! OAuth server-to-server token exchange.

use super::transport::{ensure_success, read_json, request_id_of, transport_error};
use super::ApiClient;
use crate::credentials::{mask_secret, Credentials};
use crate::error::ApiError;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// A bearer token for subsequent API calls.
///
/// Serialization deliberately excludes the raw token so the struct can be
/// embedded in run logs.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub request_id: Option<String>,
    pub obtained_at: Instant,
}

/// Log-safe view of an [`AccessToken`].
#[derive(Debug, Clone, Serialize)]
pub struct TokenSummary {
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub token_preview: String,
    pub request_id: Option<String>,
}

impl AccessToken {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    pub fn summary(&self) -> TokenSummary {
        TokenSummary {
            token_type: self.token_type.clone(),
            expires_in: self.expires_in,
            token_preview: mask_secret(&self.access_token),
            request_id: self.request_id.clone(),
        }
    }
}

impl ApiClient {
    /// Exchange client credentials for an access token.
    ///
    /// The token endpoint takes a form-encoded body, unlike the JSON API
    /// surface behind it.
    pub async fn request_access_token(
        &self,
        credentials: &Credentials,
    ) -> Result<AccessToken, ApiError> {
        let url = &self.config.token_url;
        debug!(%url, client_id = %mask_secret(&credentials.client_id), "requesting access token");

        let response = self
            .http
            .post(url)
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport_error("token exchange", url, e))?;

        let response = ensure_success("token exchange", response).await?;
        let request_id = request_id_of(&response);
        let body = read_json("token exchange", response).await?;

        let access_token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ApiError::new("token response did not contain an access_token")
                    .with_url(url)
            })?
            .to_string();

        Ok(AccessToken {
            access_token,
            token_type: body
                .get("token_type")
                .and_then(|v| v.as_str())
                .unwrap_or("bearer")
                .to_string(),
            expires_in: body.get("expires_in").and_then(|v| v.as_u64()),
            request_id,
            obtained_at: Instant::now(),
        })
    }
}
