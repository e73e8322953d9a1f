//! The compliance rule engine.
//!
//! `evaluate` is a pure function over `(text, metadata, page_count,
//! rules)`. Each check runs unconditionally and contributes a
//! [`CheckResult`] with its full detail payload, so a failing report
//! still shows which checks passed. Determinism matters: identical
//! inputs must serialize to byte-identical reports, which is why detail
//! maps are `BTreeMap` and check order is fixed.

use super::rules::RuleSet;
use serde::Serialize;
use std::collections::BTreeMap;

/// Overall verdict. PASS iff every check passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
}

/// Outcome of a single check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub details: BTreeMap<String, serde_json::Value>,
}

impl CheckResult {
    fn new(name: &'static str, passed: bool) -> Self {
        Self {
            name,
            passed,
            details: BTreeMap::new(),
        }
    }

    fn detail(mut self, key: &str, value: serde_json::Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }
}

/// The itemized verification report.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub status: Verdict,
    pub page_count: u32,
    pub checks: Vec<CheckResult>,
}

impl ComplianceReport {
    pub fn passed(&self) -> bool {
        self.status == Verdict::Pass
    }
}

/// Values extracted PDF metadata uses to mean "nothing here".
fn is_effectively_empty(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v.is_empty() || v == "nullobject" || v == "null" || v == "none"
}

fn contains_ci(haystack_lower: &str, needle: &str) -> bool {
    haystack_lower.contains(&needle.to_lowercase())
}

/// Evaluate all six checks. Never short-circuits.
pub fn evaluate(
    text: &str,
    metadata: &BTreeMap<String, String>,
    page_count: u32,
    rules: &RuleSet,
) -> ComplianceReport {
    let text_lower = text.to_lowercase();

    let checks = vec![
        check_required(
            "privilege_watermark",
            &text_lower,
            &rules.required_phrases,
            "missing_phrases",
        ),
        check_required(
            "citation_integrity",
            &text_lower,
            &rules.required_citations,
            "missing_citations",
        ),
        check_prohibited(&text_lower, &rules.prohibited_patterns),
        check_redaction(&text_lower, rules),
        check_metadata(metadata, rules),
        check_min_pages(page_count, rules.min_pages),
    ];

    let status = if checks.iter().all(|c| c.passed) {
        Verdict::Pass
    } else {
        Verdict::Fail
    };
    ComplianceReport {
        status,
        page_count,
        checks,
    }
}

fn check_required(
    name: &'static str,
    text_lower: &str,
    required: &[String],
    missing_key: &str,
) -> CheckResult {
    let missing: Vec<&String> = required
        .iter()
        .filter(|needle| !contains_ci(text_lower, needle))
        .collect();
    CheckResult::new(name, missing.is_empty())
        .detail("required", serde_json::json!(required.len()))
        .detail(missing_key, serde_json::json!(missing))
}

fn check_prohibited(text_lower: &str, prohibited: &[String]) -> CheckResult {
    let hits: Vec<&String> = prohibited
        .iter()
        .filter(|needle| contains_ci(text_lower, needle))
        .collect();
    CheckResult::new("placeholder_rejection", hits.is_empty())
        .detail("hits", serde_json::json!(hits))
}

fn check_redaction(text_lower: &str, rules: &RuleSet) -> CheckResult {
    let pending: Vec<&String> = rules
        .redaction
        .pending_patterns
        .iter()
        .filter(|needle| contains_ci(text_lower, needle))
        .collect();
    let leaked: Vec<&String> = rules
        .redaction
        .sensitive_terms
        .iter()
        .filter(|needle| contains_ci(text_lower, needle))
        .collect();
    CheckResult::new(
        "redaction_verification",
        pending.is_empty() && leaked.is_empty(),
    )
    .detail("pending_hits", serde_json::json!(pending))
    .detail("sensitive_hits", serde_json::json!(leaked))
}

fn check_metadata(metadata: &BTreeMap<String, String>, rules: &RuleSet) -> CheckResult {
    let mut violations: Vec<String> = Vec::new();

    for key in &rules.forbidden_metadata_keys {
        let key_lower = key.to_lowercase();
        if let Some(value) = metadata.get(&key_lower) {
            if !is_effectively_empty(value) {
                violations.push(format!("forbidden key '{key_lower}' has value '{value}'"));
            }
        }
    }

    for pattern in &rules.forbidden_metadata_patterns {
        if pattern.trim().is_empty() {
            continue;
        }
        for (key, value) in metadata {
            // Sentinel values carry no real content to match against.
            if is_effectively_empty(value) {
                continue;
            }
            if contains_ci(&value.to_lowercase(), pattern) {
                violations.push(format!("metadata '{key}' matches forbidden pattern '{pattern}'"));
            }
        }
    }

    CheckResult::new("metadata_hygiene", violations.is_empty())
        .detail("violations", serde_json::json!(violations))
}

fn check_min_pages(page_count: u32, min_pages: Option<u32>) -> CheckResult {
    let required = min_pages.unwrap_or(1);
    CheckResult::new("min_page_count", page_count >= required)
        .detail("pages", serde_json::json!(page_count))
        .detail("required", serde_json::json!(required))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_rules_pass_anything() {
        let report = evaluate("whatever", &meta(&[]), 1, &RuleSet::default());
        assert!(report.passed());
        assert_eq!(report.checks.len(), 6);
        assert!(report.checks.iter().all(|c| c.passed));
    }

    #[test]
    fn missing_phrase_lists_exact_difference() {
        let rules = RuleSet {
            required_phrases: vec!["PRIVILEGED & CONFIDENTIAL".into(), "DRAFT".into()],
            ..Default::default()
        };
        let report = evaluate("This is privileged & confidential.", &meta(&[]), 1, &rules);
        let check = &report.checks[0];
        assert_eq!(check.name, "privilege_watermark");
        assert!(!check.passed);
        assert_eq!(
            check.details["missing_phrases"],
            serde_json::json!(["DRAFT"])
        );
        assert_eq!(report.status, Verdict::Fail);
    }

    #[test]
    fn all_checks_run_even_after_a_failure() {
        let rules = RuleSet {
            required_phrases: vec!["absent".into()],
            prohibited_patterns: vec!["TBD".into()],
            ..Default::default()
        };
        let report = evaluate("clean text", &meta(&[]), 1, &rules);
        assert!(!report.passed());
        assert_eq!(report.checks.len(), 6);
        // placeholder check still ran and passed
        let placeholder = report
            .checks
            .iter()
            .find(|c| c.name == "placeholder_rejection")
            .unwrap();
        assert!(placeholder.passed);
    }

    #[test]
    fn sentinel_metadata_counts_as_empty() {
        let rules = RuleSet {
            forbidden_metadata_keys: vec!["author".into()],
            ..Default::default()
        };
        let report = evaluate("", &meta(&[("author", "NullObject")]), 1, &rules);
        assert!(report.checks.iter().find(|c| c.name == "metadata_hygiene").unwrap().passed);

        let report = evaluate("", &meta(&[("author", "Jane Doe")]), 1, &rules);
        assert!(!report.checks.iter().find(|c| c.name == "metadata_hygiene").unwrap().passed);
    }

    #[test]
    fn pattern_scan_skips_sentinel_values_and_empty_patterns() {
        let rules = RuleSet {
            forbidden_metadata_patterns: vec!["null".into()],
            ..Default::default()
        };
        let report = evaluate("", &meta(&[("author", "NullObject")]), 1, &rules);
        assert!(report.checks.iter().find(|c| c.name == "metadata_hygiene").unwrap().passed);

        let rules = RuleSet {
            forbidden_metadata_patterns: vec![String::new(), "  ".into()],
            ..Default::default()
        };
        let report = evaluate("", &meta(&[("title", "any value at all")]), 1, &rules);
        assert!(report.checks.iter().find(|c| c.name == "metadata_hygiene").unwrap().passed);
    }

    #[test]
    fn metadata_patterns_scan_every_value() {
        let rules = RuleSet {
            forbidden_metadata_patterns: vec!["internal".into()],
            ..Default::default()
        };
        let report = evaluate(
            "",
            &meta(&[("producer", "Internal Build 7"), ("title", "ok")]),
            1,
            &rules,
        );
        let check = report.checks.iter().find(|c| c.name == "metadata_hygiene").unwrap();
        assert!(!check.passed);
        let violations = check.details["violations"].as_array().unwrap();
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn redaction_sets_fail_independently() {
        let rules = RuleSet {
            redaction: super::super::rules::RedactionRules {
                pending_patterns: vec!["[REDACT]".into()],
                sensitive_terms: vec!["project nightfall".into()],
            },
            ..Default::default()
        };
        let report = evaluate("still says Project Nightfall", &meta(&[]), 1, &rules);
        let check = report
            .checks
            .iter()
            .find(|c| c.name == "redaction_verification")
            .unwrap();
        assert!(!check.passed);
        assert_eq!(check.details["pending_hits"], serde_json::json!([]));
        assert_eq!(
            check.details["sensitive_hits"],
            serde_json::json!(["project nightfall"])
        );
    }

    #[test]
    fn min_pages_defaults_to_one() {
        let report = evaluate("", &meta(&[]), 0, &RuleSet::default());
        let check = report.checks.iter().find(|c| c.name == "min_page_count").unwrap();
        assert!(!check.passed);

        let rules = RuleSet {
            min_pages: Some(3),
            ..Default::default()
        };
        let report = evaluate("", &meta(&[]), 3, &rules);
        assert!(report.checks.iter().find(|c| c.name == "min_page_count").unwrap().passed);
    }

    #[test]
    fn identical_inputs_yield_byte_identical_reports() {
        let rules = RuleSet {
            required_phrases: vec!["a".into()],
            prohibited_patterns: vec!["b".into()],
            min_pages: Some(2),
            ..Default::default()
        };
        let m = meta(&[("author", "x"), ("title", "y")]);
        let one = serde_json::to_vec(&evaluate("a text", &m, 2, &rules)).unwrap();
        let two = serde_json::to_vec(&evaluate("a text", &m, 2, &rules)).unwrap();
        assert_eq!(one, two);
    }
}
