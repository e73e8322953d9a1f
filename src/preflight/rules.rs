//! Declarative compliance rule set.
//!
//! Every field is optional; an absent field makes its check trivially
//! pass. Rules are plain case-insensitive substrings, not regexes, so a
//! rule author cannot accidentally write a pattern that panics or scans
//! pathologically.

use crate::error::BriefpressError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Redaction-specific pattern sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionRules {
    /// Markers meaning redaction was started but not finished.
    #[serde(default)]
    pub pending_patterns: Vec<String>,
    /// Content that should no longer appear once redaction is complete.
    #[serde(default)]
    pub sensitive_terms: Vec<String>,
}

/// The full rule document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    #[serde(default)]
    pub required_phrases: Vec<String>,
    #[serde(default)]
    pub required_citations: Vec<String>,
    #[serde(default)]
    pub prohibited_patterns: Vec<String>,
    #[serde(default)]
    pub redaction: RedactionRules,
    #[serde(default)]
    pub forbidden_metadata_keys: Vec<String>,
    #[serde(default)]
    pub forbidden_metadata_patterns: Vec<String>,
    #[serde(default)]
    pub min_pages: Option<u32>,
}

impl RuleSet {
    /// Load a rule document from a JSON or YAML file (by extension).
    pub fn load(path: &Path) -> Result<Self, BriefpressError> {
        if !path.exists() {
            return Err(BriefpressError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|e| BriefpressError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            serde_yaml::from_str(&text)
                .map_err(|e| BriefpressError::InvalidRules(format!("invalid rule YAML: {e}")))
        } else {
            serde_json::from_str(&text)
                .map_err(|e| BriefpressError::InvalidRules(format!("invalid rule JSON: {e}")))
        }
    }
}
