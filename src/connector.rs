//! Connector prompt builder: emit the instruction block a human operator
//! pastes into a document connector when neither renderer can run.
//!
//! The connector path never executes anything itself. It produces a
//! deterministic prompt describing the exact document to produce, so the
//! manual step stays auditable.

use crate::compose::compose_lines;
use crate::error::BriefpressError;
use crate::payload::BriefPayload;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prompt strictness profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptProfile {
    /// Maximum fidelity: verbatim lines, no paraphrasing, citation ids
    /// must be preserved character for character.
    StrictLegal,
    /// Faithful content with layout left to the connector.
    #[default]
    Standard,
    /// Condensed single-page rendering for quick turnarounds.
    Fast,
}

impl PromptProfile {
    pub fn parse(name: &str) -> Result<Self, BriefpressError> {
        match name.trim().to_lowercase().as_str() {
            "strict-legal" | "strict_legal" | "strict" => Ok(Self::StrictLegal),
            "standard" => Ok(Self::Standard),
            "fast" => Ok(Self::Fast),
            other => Err(BriefpressError::InvalidConfig(format!(
                "unknown prompt profile '{other}' (expected strict-legal, standard, or fast)"
            ))),
        }
    }

    fn instructions(self) -> &'static str {
        match self {
            Self::StrictLegal => {
                "Reproduce every line below verbatim. Do not paraphrase, reorder, \
                 or summarize. Citation ids in square brackets must appear exactly \
                 as written. The confidentiality banner must be the first visible \
                 line on page one."
            }
            Self::Standard => {
                "Produce a professionally formatted PDF containing all of the \
                 content below. Keep the section order and every citation id. \
                 Layout, typography, and pagination are at your discretion."
            }
            Self::Fast => {
                "Produce a single-page PDF covering the content below. You may \
                 tighten phrasing, but the banner, the title, and every citation \
                 id must survive unchanged."
            }
        }
    }
}

impl fmt::Display for PromptProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StrictLegal => "strict-legal",
            Self::Standard => "standard",
            Self::Fast => "fast",
        };
        f.write_str(name)
    }
}

/// Build the connector prompt for a payload under the given profile.
pub fn build_connector_prompt(payload: &BriefPayload, profile: PromptProfile) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== DOCUMENT CONNECTOR REQUEST (profile: {profile}) ===\n\n"
    ));
    out.push_str(profile.instructions());
    out.push_str("\n\n--- DOCUMENT CONTENT ---\n");
    for line in compose_lines(payload) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("--- END DOCUMENT CONTENT ---\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::CONFIDENTIALITY_BANNER;
    use crate::payload::{BriefPayload, Citation};

    fn payload() -> BriefPayload {
        BriefPayload {
            title: "T".into(),
            executive_summary: vec!["s".into()],
            strategic_priorities: vec!["p".into()],
            risk_matrix: vec![],
            citations: vec![Citation {
                id: "SR-9".into(),
                source: "src".into(),
                note: String::new(),
            }],
            annexes: vec![],
        }
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(
            PromptProfile::parse("strict_legal").unwrap(),
            PromptProfile::StrictLegal
        );
        assert_eq!(PromptProfile::parse("FAST").unwrap(), PromptProfile::Fast);
        assert!(PromptProfile::parse("loose").is_err());
    }

    #[test]
    fn prompt_carries_banner_and_citations() {
        let prompt = build_connector_prompt(&payload(), PromptProfile::StrictLegal);
        assert!(prompt.contains("profile: strict-legal"));
        assert!(prompt.contains(CONFIDENTIALITY_BANNER));
        assert!(prompt.contains("[SR-9] src"));
        assert!(prompt.contains("verbatim"));
    }
}
