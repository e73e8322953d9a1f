//! Preflight over real artifacts: render with the local writer, then
//! verify the file on disk end to end.

use briefpress::preflight::{evaluate, preflight_artifact, RuleSet};
use briefpress::{normalize, render_local, Verdict};
use std::collections::BTreeMap;

fn payload() -> briefpress::BriefPayload {
    normalize(serde_json::json!({
        "title": "Quarterly Legal Posture",
        "executive_summary": ["Exposure contained.", "No new filings."],
        "strategic_priorities": ["Close discovery", "Brief the board"],
        "risk_matrix": [
            {"risk": "Venue change", "impact": "High", "mitigation": "Motion filed", "owner": "GC"}
        ],
        "citations": ["[SR-1]: Smith v. Jones", "[SR-2]: Board minutes"],
    }))
    .unwrap()
}

#[test]
fn rendered_brief_passes_standard_rules() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("brief.pdf");
    render_local(&payload(), &artifact).unwrap();

    let rules: RuleSet = serde_json::from_value(serde_json::json!({
        "required_phrases": ["PRIVILEGED & CONFIDENTIAL", "Quarterly Legal Posture"],
        "required_citations": ["SR-1", "SR-2"],
        "prohibited_patterns": ["TBD", "lorem ipsum", "[INSERT"],
        "redaction": {
            "pending_patterns": ["[REDACT]"],
            "sensitive_terms": []
        },
        "min_pages": 1
    }))
    .unwrap();

    let report = preflight_artifact(&artifact, &rules).unwrap();
    assert_eq!(report.status, Verdict::Pass);
    assert_eq!(report.checks.len(), 6);
    assert!(report.checks.iter().all(|c| c.passed));
    assert_eq!(report.page_count, 1);
}

#[test]
fn unresolved_placeholder_fails_only_its_check() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("draft.pdf");
    let mut p = payload();
    p.executive_summary.push("Figures: [INSERT Q3 NUMBERS]".into());
    render_local(&p, &artifact).unwrap();

    let rules: RuleSet = serde_json::from_value(serde_json::json!({
        "required_phrases": ["PRIVILEGED & CONFIDENTIAL"],
        "prohibited_patterns": ["[INSERT"],
    }))
    .unwrap();

    let report = preflight_artifact(&artifact, &rules).unwrap();
    assert_eq!(report.status, Verdict::Fail);
    let placeholder = report
        .checks
        .iter()
        .find(|c| c.name == "placeholder_rejection")
        .unwrap();
    assert!(!placeholder.passed);
    let watermark = report
        .checks
        .iter()
        .find(|c| c.name == "privilege_watermark")
        .unwrap();
    assert!(watermark.passed);
}

#[test]
fn forbidden_author_metadata_fails_hygiene() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("brief.pdf");
    render_local(&payload(), &artifact).unwrap();

    // The local writer stamps a real author, so forbidding the key fails.
    let rules: RuleSet = serde_json::from_value(serde_json::json!({
        "forbidden_metadata_keys": ["author"]
    }))
    .unwrap();
    let report = preflight_artifact(&artifact, &rules).unwrap();
    let hygiene = report
        .checks
        .iter()
        .find(|c| c.name == "metadata_hygiene")
        .unwrap();
    assert!(!hygiene.passed);
}

#[test]
fn clean_three_page_document_passes_all_six_checks() {
    let mut metadata = BTreeMap::new();
    metadata.insert("title".to_string(), "Clean Brief".to_string());
    let rules: RuleSet = serde_json::from_value(serde_json::json!({
        "required_phrases": ["privileged & confidential", "clean brief"],
        "min_pages": 1
    }))
    .unwrap();

    let text = "PRIVILEGED & CONFIDENTIAL\nClean Brief\nbody";
    let report = evaluate(text, &metadata, 3, &rules);
    assert_eq!(report.status, Verdict::Pass);
    assert_eq!(report.page_count, 3);
    assert_eq!(report.checks.len(), 6);
    assert!(report.checks.iter().all(|c| c.passed));
}

#[test]
fn missing_artifact_is_operational_error_not_fail() {
    let rules = RuleSet::default();
    let err = preflight_artifact(std::path::Path::new("/no/such/brief.pdf"), &rules).unwrap_err();
    assert!(matches!(err, briefpress::BriefpressError::FileNotFound { .. }));
}
