//! # briefpress
//!
//! Renders normalized executive briefs to PDF and verifies the artifact
//! against a compliance rule set before release.
//!
//! ```text
//! payload (JSON/YAML/Markdown)
//!        │ normalize
//!        ▼
//!   BriefPayload ──compose──▶ document lines
//!        │                        │
//!        │ router         local writer │ remote job orchestrator
//!        ▼                        ▼    ▼
//!            artifact.pdf ──extract──▶ text / metadata / pages
//!                                           │ evaluate(rules)
//!                                           ▼
//!                                   ComplianceReport PASS/FAIL
//! ```
//!
//! The remote path drives a five-step asynchronous job (authenticate,
//! create asset, upload, submit, poll, download) and normalizes every
//! remote failure into a single [`ApiError`] shape. The preflight side
//! is a pure rule engine: all checks always run and the report carries
//! every check's detail, pass or fail.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use briefpress::{preflight_artifact, RuleSet};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), briefpress::BriefpressError> {
//! let rules = RuleSet::load(Path::new("rules.json"))?;
//! let report = preflight_artifact(Path::new("brief.pdf"), &rules)?;
//! println!("{}", serde_json::to_string_pretty(&report).unwrap());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod audit;
pub mod compose;
pub mod config;
pub mod connector;
pub mod convert;
pub mod credentials;
pub mod error;
pub mod mock;
pub mod payload;
pub mod preflight;
pub mod router;

pub use api::{AccessToken, ApiClient, DownloadReceipt, JobHandle, JobResult, JobStatus, UploadTarget};
pub use audit::{write_error_record, write_run_log, RunLog};
pub use compose::{compose_lines, compose_text, CONFIDENTIALITY_BANNER};
pub use config::{RenderConfig, DEFAULT_API_BASE_URL, DEFAULT_TOKEN_URL};
pub use connector::{build_connector_prompt, PromptProfile};
pub use convert::render_remote;
pub use credentials::{resolve_credentials, Credentials, CredentialsSummary};
pub use error::{ApiError, BriefpressError, CredentialResolutionError};
pub use mock::{render_local, write_basic_pdf, PdfInfo};
pub use payload::{load_payload, normalize, BriefPayload, Citation, InputFormat, RiskEntry};
pub use preflight::{evaluate, preflight_artifact, ComplianceReport, RuleSet, Verdict};
pub use router::{route_render, RenderMode, RouteReport, RouteStatus};
