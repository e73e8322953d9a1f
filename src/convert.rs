//! Remote render orchestration.
//!
//! Drives the full wire sequence for one payload: resolve credentials,
//! stage the composed source in a temp file, authenticate, upload,
//! submit, poll, download. Produces a [`RunLog`] describing every step.

use crate::api::ApiClient;
use crate::audit::RunLog;
use crate::compose::compose_text;
use crate::config::RenderConfig;
use crate::credentials::resolve_credentials;
use crate::error::BriefpressError;
use crate::payload::BriefPayload;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::info;

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}

/// Render a payload through the remote service, writing the PDF to
/// `output_path` and returning the audit log of the run.
///
/// The composed source text is staged in a [`tempfile::NamedTempFile`]
/// that is removed on every exit path when it drops.
pub async fn render_remote(
    payload: &BriefPayload,
    output_path: &Path,
    config: &RenderConfig,
) -> Result<RunLog, BriefpressError> {
    let mut log = RunLog::new("createpdf", "remote");

    let credentials = resolve_credentials(config.credentials_json.as_deref())?;
    log.credentials = Some(credentials.summary());
    info!(source = %credentials.source, "credentials resolved");

    let mut source = tempfile::NamedTempFile::new().map_err(|e| {
        BriefpressError::Internal(format!("could not create temp source file: {e}"))
    })?;
    source
        .write_all(compose_text(payload).as_bytes())
        .map_err(|e| BriefpressError::Internal(format!("could not stage source text: {e}")))?;
    let source_bytes = std::fs::read(source.path()).map_err(|e| BriefpressError::ReadFailed {
        path: source.path().to_path_buf(),
        source: e,
    })?;

    let client = ApiClient::new(config.clone(), credentials.client_id.clone())?;

    let step = Instant::now();
    let token = client.request_access_token(&credentials).await?;
    log.token = Some(token.summary());
    log.record_step("token", elapsed_ms(step), serde_json::Value::Null);

    let step = Instant::now();
    let target = client.create_upload_target(&token, &config.media_type).await?;
    log.record_step(
        "asset",
        elapsed_ms(step),
        serde_json::json!({ "asset_id": target.asset_id, "request_id": target.request_id }),
    );

    let step = Instant::now();
    client
        .upload_bytes(&target, source_bytes, &config.media_type)
        .await?;
    log.record_step("upload", elapsed_ms(step), serde_json::Value::Null);

    let step = Instant::now();
    let handle = client.submit_createpdf(&token, &target.asset_id).await?;
    let result = client.poll_to_completion(&token, &handle).await?;
    info!(attempts = result.attempts, "job finished");
    log.record_step(
        "job",
        elapsed_ms(step),
        serde_json::json!({
            "status": result.status,
            "attempts": result.attempts,
            "request_id": result.request_id,
        }),
    );

    let step = Instant::now();
    let receipt = client.download_asset(&result.download_uri, output_path).await?;
    log.record_step(
        "download",
        elapsed_ms(step),
        serde_json::json!({ "bytes": receipt.bytes_written }),
    );
    log.record_output(output_path, &receipt);
    info!(path = %output_path.display(), bytes = receipt.bytes_written, "artifact written");

    Ok(log)
}
