//! Compliance preflight: extract text, metadata, and page count from a
//! produced artifact, then evaluate a declarative rule set against it.
//!
//! Verification is deliberately split from extraction. [`checks`] is a
//! pure rule engine over `(text, metadata, page_count)` and knows nothing
//! about PDF; [`extract`] supplies those inputs from the artifact on
//! disk. Failing compliance is a report value, never an error.

pub mod checks;
pub mod extract;
pub mod rules;

pub use checks::{evaluate, CheckResult, ComplianceReport, Verdict};
pub use extract::{ArtifactExtractor, ExtractedArtifact, RawTextExtractor};
pub use rules::{RedactionRules, RuleSet};

use crate::error::BriefpressError;
use std::path::Path;

/// Run the full preflight: extract the artifact and evaluate the rules.
pub fn preflight_artifact(
    artifact: &Path,
    rules: &RuleSet,
) -> Result<ComplianceReport, BriefpressError> {
    let extractor = RawTextExtractor;
    let extracted = extractor.extract(artifact)?;
    Ok(evaluate(
        &extracted.text,
        &extracted.metadata,
        extracted.page_count,
        rules,
    ))
}
