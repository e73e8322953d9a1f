//! Renderer routing.
//!
//! Chooses a backend for a render request: the local writer, the remote
//! orchestrator, or the human-in-the-loop connector. Automatic mode
//! tries the local backend and falls through to the remote one. Every
//! backend attempt is appended to the report's attempts log whether it
//! succeeded or not, so the report is a complete audit of what was
//! tried.

use crate::audit::RunLog;
use crate::config::RenderConfig;
use crate::connector::{build_connector_prompt, PromptProfile};
use crate::convert::render_remote;
use crate::error::BriefpressError;
use crate::mock::render_local;
use crate::payload::BriefPayload;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Local first, remote on failure.
    #[default]
    Auto,
    Local,
    Remote,
    Connector,
}

impl RenderMode {
    pub fn parse(name: &str) -> Result<Self, BriefpressError> {
        match name.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            "connector" => Ok(Self::Connector),
            other => Err(BriefpressError::InvalidConfig(format!(
                "unknown render mode '{other}' (expected auto, local, remote, or connector)"
            ))),
        }
    }
}

/// Terminal outcome of a routing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Rendered,
    /// Connector mode: a prompt was produced, a human still has to run it.
    PendingManualRun,
    Failed,
}

/// One backend attempt, recorded regardless of outcome.
#[derive(Debug, Clone, Serialize)]
pub struct RouteAttempt {
    pub backend: &'static str,
    pub succeeded: bool,
    pub detail: String,
}

/// The routing report: what was tried, what happened, what came out.
#[derive(Debug, Serialize)]
pub struct RouteReport {
    pub mode: RenderMode,
    pub status: RouteStatus,
    pub attempts: Vec<RouteAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Present only in connector mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_log: Option<RunLog>,
}

impl RouteReport {
    fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            status: RouteStatus::Failed,
            attempts: Vec::new(),
            output: None,
            prompt: None,
            run_log: None,
        }
    }
}

fn attempt_local(payload: &BriefPayload, output: &Path, report: &mut RouteReport) -> bool {
    match render_local(payload, output) {
        Ok(bytes) => {
            info!(bytes, "local render succeeded");
            report.attempts.push(RouteAttempt {
                backend: "local",
                succeeded: true,
                detail: format!("wrote {bytes} bytes"),
            });
            report.status = RouteStatus::Rendered;
            report.output = Some(output.to_path_buf());
            true
        }
        Err(err) => {
            warn!(error = %err, "local render failed");
            report.attempts.push(RouteAttempt {
                backend: "local",
                succeeded: false,
                detail: err.to_string(),
            });
            false
        }
    }
}

async fn attempt_remote(
    payload: &BriefPayload,
    output: &Path,
    config: &RenderConfig,
    report: &mut RouteReport,
) -> bool {
    match render_remote(payload, output, config).await {
        Ok(run_log) => {
            info!("remote render succeeded");
            report.attempts.push(RouteAttempt {
                backend: "remote",
                succeeded: true,
                detail: format!("job finished, artifact at {}", output.display()),
            });
            report.status = RouteStatus::Rendered;
            report.output = Some(output.to_path_buf());
            report.run_log = Some(run_log);
            true
        }
        Err(err) => {
            warn!(error = %err, "remote render failed");
            report.attempts.push(RouteAttempt {
                backend: "remote",
                succeeded: false,
                detail: err.to_string(),
            });
            false
        }
    }
}

/// Route a render request to a backend per `mode`.
///
/// Always returns a report; backend failures are recorded in it rather
/// than raised, so the attempts log survives every branch.
pub async fn route_render(
    payload: &BriefPayload,
    output_path: &Path,
    config: &RenderConfig,
    mode: RenderMode,
    profile: PromptProfile,
) -> RouteReport {
    let mut report = RouteReport::new(mode);

    match mode {
        RenderMode::Local => {
            attempt_local(payload, output_path, &mut report);
        }
        RenderMode::Remote => {
            attempt_remote(payload, output_path, config, &mut report).await;
        }
        RenderMode::Auto => {
            if !attempt_local(payload, output_path, &mut report) {
                attempt_remote(payload, output_path, config, &mut report).await;
            }
        }
        RenderMode::Connector => {
            let prompt = build_connector_prompt(payload, profile);
            report.attempts.push(RouteAttempt {
                backend: "connector",
                succeeded: true,
                detail: format!("prompt prepared under '{profile}' profile"),
            });
            report.status = RouteStatus::PendingManualRun;
            report.prompt = Some(prompt);
        }
    }

    report
}
