//! Credential resolution: produce a client id/secret pair from an ordered
//! list of sources.
//!
//! There is no single canonical place PDF Services credentials live —
//! developer machines carry the downloaded credentials JSON, CI carries
//! env vars, and older deployments still use the legacy variable names.
//! Resolution therefore walks an ordered, deduplicated candidate chain
//! and, when every source fails, reports *all* of them with their
//! specific reasons so the operator can see exactly what was tried:
//!
//! 1. explicit override path (CLI flag / [`crate::RenderConfig`])
//! 2. the path named by `PDF_SERVICES_CREDENTIALS_JSON`
//! 3. the fixed default `~/.config/briefpress/pdfservices-api-credentials.json`
//! 4. env pair `PDF_SERVICES_CLIENT_ID` / `PDF_SERVICES_CLIENT_SECRET`
//! 5. legacy env pair `ADOBE_PDF_SERVICES_CLIENT_ID` / `_CLIENT_SECRET`
//!
//! A *partially* set env pair (id without secret, or vice versa) is a
//! distinct, immediately reported error rather than a silent fall-through
//! — it almost always means a typo'd variable name, and "no sources
//! found" would send the operator looking in the wrong place.

use crate::error::CredentialResolutionError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Env var naming an alternative credentials-JSON path.
pub const CREDENTIALS_JSON_ENV: &str = "PDF_SERVICES_CREDENTIALS_JSON";

const PRIMARY_ID_ENV: &str = "PDF_SERVICES_CLIENT_ID";
const PRIMARY_SECRET_ENV: &str = "PDF_SERVICES_CLIENT_SECRET";
const LEGACY_ID_ENV: &str = "ADOBE_PDF_SERVICES_CLIENT_ID";
const LEGACY_SECRET_ENV: &str = "ADOBE_PDF_SERVICES_CLIENT_SECRET";

/// A resolved credential pair.
///
/// Constructed once per run, held only in memory, never persisted.
/// `source` is a provenance label used only for diagnostics and the audit
/// log — never for authorization decisions.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub organization_id: Option<String>,
    pub source: String,
}

/// Provenance summary safe to persist in the run log: the secret is never
/// included and the client id is masked.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialsSummary {
    pub source: String,
    pub client_id_masked: String,
    pub organization_id: Option<String>,
}

impl Credentials {
    pub fn summary(&self) -> CredentialsSummary {
        CredentialsSummary {
            source: self.source.clone(),
            client_id_masked: mask_secret(&self.client_id),
            organization_id: self.organization_id.clone(),
        }
    }
}

/// Mask a secret for display: keep the first and last 4 chars, star the
/// middle. Short values are fully starred.
pub fn mask_secret(value: &str) -> String {
    const KEEP: usize = 4;
    if value.is_empty() {
        return String::new();
    }
    if value.chars().count() <= KEEP * 2 {
        return "*".repeat(value.chars().count());
    }
    let head: String = value.chars().take(KEEP).collect();
    let tail: String = value
        .chars()
        .rev()
        .take(KEEP)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{head}...{tail}")
}

/// Default credentials-JSON location.
fn default_credentials_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config/briefpress/pdfservices-api-credentials.json")
}

/// Resolve credentials from the candidate chain described in the module
/// docs. `override_path` is checked first when given.
pub fn resolve_credentials(
    override_path: Option<&Path>,
) -> Result<Credentials, CredentialResolutionError> {
    let mut candidates: Vec<(&str, PathBuf)> = Vec::new();

    if let Some(path) = override_path {
        candidates.push(("override", path.to_path_buf()));
    }

    if let Ok(env_json) = std::env::var(CREDENTIALS_JSON_ENV) {
        let env_json = env_json.trim();
        if !env_json.is_empty() {
            let env_path = PathBuf::from(env_json);
            if !candidates.iter().any(|(_, p)| *p == env_path) {
                candidates.push((CREDENTIALS_JSON_ENV, env_path));
            }
        }
    }

    let default_path = default_credentials_path();
    if !candidates.iter().any(|(_, p)| *p == default_path) {
        candidates.push(("default", default_path));
    }

    let mut attempts: Vec<String> = Vec::new();
    for (label, path) in &candidates {
        if !path.exists() {
            attempts.push(format!(
                "{label}: credentials file not found at {}",
                path.display()
            ));
            continue;
        }
        match load_json_credentials(path) {
            Ok(creds) => {
                debug!(source = %creds.source, "resolved credentials");
                return Ok(creds);
            }
            Err(e) => {
                attempts.push(format!("{label}: {e}"));
                continue;
            }
        }
    }

    match load_env_credentials() {
        Ok(creds) => {
            debug!(source = %creds.source, "resolved credentials");
            Ok(creds)
        }
        Err(env_err) => {
            let json_detail = attempts
                .iter()
                .map(|m| format!("- {m}"))
                .collect::<Vec<_>>()
                .join("\n");
            let mut all_attempts = attempts.clone();
            all_attempts.push(format!("environment: {env_err}"));
            Err(CredentialResolutionError::new(format!(
                "Could not resolve PDF Services credentials from JSON or environment.\n\
                 JSON attempts:\n{json_detail}\n\
                 Environment fallback: {env_err}"
            ))
            .with_attempts(all_attempts))
        }
    }
}

/// Expected file shape:
/// `{"client_credentials": {"client_id", "client_secret"},
///   "service_principal_credentials": {"organization_id"}?}`.
fn load_json_credentials(path: &Path) -> Result<Credentials, CredentialResolutionError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CredentialResolutionError::new(format!(
            "Unable to read credentials JSON at {}: {e}",
            path.display()
        ))
    })?;

    let doc: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
        CredentialResolutionError::new(format!(
            "Unable to parse credentials JSON at {}: {e}",
            path.display()
        ))
    })?;

    let client_credentials = doc.get("client_credentials").and_then(|v| v.as_object());
    let Some(client_credentials) = client_credentials else {
        return Err(CredentialResolutionError::new(format!(
            "Credentials JSON at {} must contain object 'client_credentials'",
            path.display()
        )));
    };

    let field = |key: &str| -> String {
        client_credentials
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim()
            .to_string()
    };

    let client_id = field("client_id");
    let client_secret = field("client_secret");

    let mut missing = Vec::new();
    if client_id.is_empty() {
        missing.push("client_credentials.client_id");
    }
    if client_secret.is_empty() {
        missing.push("client_credentials.client_secret");
    }
    if !missing.is_empty() {
        return Err(CredentialResolutionError::new(format!(
            "Credentials JSON at {} missing required keys: {}",
            path.display(),
            missing.join(", ")
        )));
    }

    let organization_id = doc
        .get("service_principal_credentials")
        .and_then(|v| v.get("organization_id"))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(Credentials {
        client_id,
        client_secret,
        organization_id,
        source: format!("json:{}", path.display()),
    })
}

fn env_var(name: &str) -> String {
    std::env::var(name).unwrap_or_default().trim().to_string()
}

fn load_env_credentials() -> Result<Credentials, CredentialResolutionError> {
    let primary_id = env_var(PRIMARY_ID_ENV);
    let primary_secret = env_var(PRIMARY_SECRET_ENV);
    let legacy_id = env_var(LEGACY_ID_ENV);
    let legacy_secret = env_var(LEGACY_SECRET_ENV);

    if !primary_id.is_empty() && !primary_secret.is_empty() {
        return Ok(Credentials {
            client_id: primary_id,
            client_secret: primary_secret,
            organization_id: None,
            source: format!("env:{PRIMARY_ID_ENV}/{PRIMARY_SECRET_ENV}"),
        });
    }

    if !legacy_id.is_empty() && !legacy_secret.is_empty() {
        return Ok(Credentials {
            client_id: legacy_id,
            client_secret: legacy_secret,
            organization_id: None,
            source: format!("env:{LEGACY_ID_ENV}/{LEGACY_SECRET_ENV}"),
        });
    }

    // A half-set pair is a configuration mistake, not an absent source.
    let mut partial = Vec::new();
    for (set, missing) in [
        (PRIMARY_ID_ENV, PRIMARY_SECRET_ENV),
        (PRIMARY_SECRET_ENV, PRIMARY_ID_ENV),
        (LEGACY_ID_ENV, LEGACY_SECRET_ENV),
        (LEGACY_SECRET_ENV, LEGACY_ID_ENV),
    ] {
        if !env_var(set).is_empty() && env_var(missing).is_empty() {
            partial.push(format!("{set} is set but {missing} is missing"));
        }
    }
    if !partial.is_empty() {
        return Err(CredentialResolutionError::new(partial.join("; ")));
    }

    Err(CredentialResolutionError::new(format!(
        "No usable environment credentials found. Expected either \
         {PRIMARY_ID_ENV}/{PRIMARY_SECRET_ENV} or {LEGACY_ID_ENV}/{LEGACY_SECRET_ENV}."
    )))
}
