//! Shared response handling for the API client.

use crate::error::ApiError;
use reqwest::Response;

/// Maximum length of the response body carried inside an [`ApiError`].
const BODY_EXCERPT_MAX: usize = 400;

/// Header the service echoes for support correlation.
const REQUEST_ID_HEADER: &str = "x-request-id";

pub(crate) fn request_id_of(response: &Response) -> Option<String> {
    response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Collapse whitespace and truncate a body for inclusion in an error.
pub(crate) fn sanitize_excerpt(body: &str) -> String {
    let collapsed: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.len() <= BODY_EXCERPT_MAX {
        return collapsed;
    }
    let mut cut = BODY_EXCERPT_MAX;
    while !collapsed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &collapsed[..cut])
}

/// Map a transport-level failure (DNS, TLS, timeout) into an [`ApiError`].
pub(crate) fn transport_error(step: &str, url: &str, err: reqwest::Error) -> ApiError {
    ApiError::new(format!("{step} request failed: {err}")).with_url(url)
}

/// Check the status and, on a non-2xx response, consume the body into a
/// normalized error. On success the response is returned untouched.
pub(crate) async fn ensure_success(step: &str, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let request_id = request_id_of(&response);
    let body = response.text().await.unwrap_or_default();
    Err(
        ApiError::new(format!("{step} failed: HTTP {} from {url}", status.as_u16()))
            .with_status(status.as_u16())
            .with_url(&url)
            .with_body_excerpt(sanitize_excerpt(&body))
            .with_request_id(request_id),
    )
}

/// Read a response body as JSON, normalizing parse failures.
pub(crate) async fn read_json(step: &str, response: Response) -> Result<serde_json::Value, ApiError> {
    let url = response.url().to_string();
    let request_id = request_id_of(&response);
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(step, &url, e))?;
    serde_json::from_str(&body).map_err(|e| {
        ApiError::new(format!("{step} returned a non-JSON body: {e}"))
            .with_url(&url)
            .with_body_excerpt(sanitize_excerpt(&body))
            .with_request_id(request_id)
    })
}
