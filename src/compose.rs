//! Document composition: flatten a normalized payload into the ordered
//! text lines both renderers print.
//!
//! Local and remote rendering must produce the same logical document, so
//! the line layout lives here and nowhere else.

use crate::payload::BriefPayload;

/// Classification banner stamped on every rendered brief. Preflight rules
/// typically require this exact phrase.
pub const CONFIDENTIALITY_BANNER: &str = "PRIVILEGED & CONFIDENTIAL";

/// Flatten a payload into the line sequence of the rendered document.
///
/// Order is fixed: banner, title, executive summary, strategic priorities,
/// risk matrix, annexes when present, then the citation register last so
/// citation ids always appear in the artifact body.
pub fn compose_lines(payload: &BriefPayload) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(CONFIDENTIALITY_BANNER.to_string());
    lines.push(payload.title.clone());
    lines.push(String::new());

    lines.push("EXECUTIVE SUMMARY".to_string());
    for item in &payload.executive_summary {
        lines.push(format!("  - {item}"));
    }
    lines.push(String::new());

    lines.push("STRATEGIC PRIORITIES".to_string());
    for (index, item) in payload.strategic_priorities.iter().enumerate() {
        lines.push(format!("  {}. {item}", index + 1));
    }
    lines.push(String::new());

    lines.push("RISK MATRIX".to_string());
    for entry in &payload.risk_matrix {
        lines.push(format!(
            "  - {} | impact: {} | mitigation: {} | owner: {}",
            entry.risk, entry.impact, entry.mitigation, entry.owner
        ));
    }

    for annex in &payload.annexes {
        lines.push(String::new());
        lines.push(format!("ANNEX: {}", annex.title.to_uppercase()));
        if !annex.summary.is_empty() {
            lines.push(format!("  {}", annex.summary));
        }
        for item in &annex.items {
            lines.push(format!("  - {item}"));
        }
    }

    lines.push(String::new());
    lines.push("CITATIONS".to_string());
    for citation in &payload.citations {
        let mut line = format!("  [{}] {}", citation.id, citation.source);
        if !citation.note.is_empty() {
            line.push_str(&format!(" ({})", citation.note));
        }
        lines.push(line);
    }

    lines
}

/// The composed document as a single string, one line per entry.
pub fn compose_text(payload: &BriefPayload) -> String {
    compose_lines(payload).join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{Annex, Citation, RiskEntry};

    fn sample() -> BriefPayload {
        BriefPayload {
            title: "Board Brief".into(),
            executive_summary: vec!["All clear".into()],
            strategic_priorities: vec!["Ship it".into(), "Review it".into()],
            risk_matrix: vec![RiskEntry {
                risk: "Delay".into(),
                impact: "Low".into(),
                mitigation: "Buffer".into(),
                owner: "PM".into(),
            }],
            citations: vec![Citation {
                id: "SR-1".into(),
                source: "Minutes".into(),
                note: "final".into(),
            }],
            annexes: vec![Annex {
                title: "Annex A".into(),
                summary: "Supporting data".into(),
                items: vec!["table 1".into()],
            }],
        }
    }

    #[test]
    fn banner_is_first_line() {
        let lines = compose_lines(&sample());
        assert_eq!(lines[0], CONFIDENTIALITY_BANNER);
        assert_eq!(lines[1], "Board Brief");
    }

    #[test]
    fn priorities_are_numbered() {
        let text = compose_text(&sample());
        assert!(text.contains("  1. Ship it"));
        assert!(text.contains("  2. Review it"));
    }

    #[test]
    fn citation_ids_appear_in_body() {
        let text = compose_text(&sample());
        assert!(text.contains("[SR-1] Minutes (final)"));
    }

    #[test]
    fn annexes_render_between_risks_and_citations() {
        let text = compose_text(&sample());
        let annex = text.find("ANNEX: ANNEX A").unwrap();
        let risks = text.find("RISK MATRIX").unwrap();
        let cites = text.find("CITATIONS").unwrap();
        assert!(risks < annex && annex < cites);
    }
}
