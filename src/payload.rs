//! Payload normalization: turn JSON, YAML, or Markdown input into the
//! canonical [`BriefPayload`] shape the renderers consume.
//!
//! Authors hand over briefs in whatever form their tooling produces —
//! structured JSON from upstream systems, YAML from templates, Markdown
//! from drafting. Normalization flattens all three into one strict value
//! type so the composition, connector-prompt, and preflight layers never
//! have to care about input shape. Anything missing one of the five
//! required sections is rejected here, before any network call is made.

use crate::error::BriefpressError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The five sections every brief must carry.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "title",
    "executive_summary",
    "strategic_priorities",
    "risk_matrix",
    "citations",
];

/// One row of the risk matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskEntry {
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub mitigation: String,
    #[serde(default)]
    pub owner: String,
}

impl RiskEntry {
    fn is_empty(&self) -> bool {
        self.risk.is_empty()
            && self.impact.is_empty()
            && self.mitigation.is_empty()
            && self.owner.is_empty()
    }
}

/// A citation register entry. IDs must survive rendering verbatim — the
/// preflight citation-integrity check looks for them in the artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub id: String,
    pub source: String,
    #[serde(default)]
    pub note: String,
}

/// An optional annex section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annex {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub items: Vec<String>,
}

/// The normalized brief payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefPayload {
    pub title: String,
    pub executive_summary: Vec<String>,
    pub strategic_priorities: Vec<String>,
    pub risk_matrix: Vec<RiskEntry>,
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub annexes: Vec<Annex>,
}

/// Input format selector for [`load_payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Pick by file extension: `.json` → Json, `.yaml`/`.yml` → Yaml,
    /// anything else → Markdown.
    #[default]
    Auto,
    Json,
    Yaml,
    Markdown,
}

impl InputFormat {
    fn effective(self, path: &Path) -> InputFormat {
        if self != InputFormat::Auto {
            return self;
        }
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => InputFormat::Json,
            Some("yaml") | Some("yml") => InputFormat::Yaml,
            _ => InputFormat::Markdown,
        }
    }
}

/// Load and normalize a payload from disk.
pub fn load_payload(path: &Path, format: InputFormat) -> Result<BriefPayload, BriefpressError> {
    if !path.exists() {
        return Err(BriefpressError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|e| BriefpressError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let raw: serde_json::Value = match format.effective(path) {
        InputFormat::Json | InputFormat::Auto => serde_json::from_str(&text)
            .map_err(|e| BriefpressError::InvalidPayload(format!("not valid JSON: {e}")))?,
        InputFormat::Yaml => serde_yaml::from_str(&text)
            .map_err(|e| BriefpressError::InvalidPayload(format!("not valid YAML: {e}")))?,
        InputFormat::Markdown => parse_markdown(&text),
    };

    normalize(raw)
}

/// Parse an already-loaded JSON/YAML-shaped value into a normalized payload.
///
/// String fields are coerced (a bare string becomes a one-item list),
/// citation strings of the form `[SR-1]: source` keep their id, other
/// strings get sequential `CIT-n` ids, and empty risk rows are dropped.
/// Fails when any of [`REQUIRED_FIELDS`] ends up empty.
pub fn normalize(raw: serde_json::Value) -> Result<BriefPayload, BriefpressError> {
    let serde_json::Value::Object(map) = raw else {
        return Err(BriefpressError::InvalidPayload(
            "input must parse to an object".into(),
        ));
    };

    let title = map
        .get("title")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .trim()
        .to_string();

    let payload = BriefPayload {
        title,
        executive_summary: coerce_string_list(map.get("executive_summary"), "executive_summary")?,
        strategic_priorities: coerce_string_list(
            map.get("strategic_priorities"),
            "strategic_priorities",
        )?,
        risk_matrix: normalize_risk_matrix(map.get("risk_matrix"))?,
        citations: normalize_citations(map.get("citations"))?,
        annexes: normalize_annexes(map.get("annexes"))?,
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .filter(|&&field| match field {
            "title" => payload.title.is_empty(),
            "executive_summary" => payload.executive_summary.is_empty(),
            "strategic_priorities" => payload.strategic_priorities.is_empty(),
            "risk_matrix" => payload.risk_matrix.is_empty(),
            "citations" => payload.citations.is_empty(),
            _ => false,
        })
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(BriefpressError::InvalidPayload(format!(
            "missing required sections after normalization: {}",
            missing.join(", ")
        )));
    }

    Ok(payload)
}

fn coerce_string_list(
    value: Option<&serde_json::Value>,
    field: &str,
) -> Result<Vec<String>, BriefpressError> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            Ok(if s.is_empty() {
                Vec::new()
            } else {
                vec![s.to_string()]
            })
        }
        Some(serde_json::Value::Array(items)) => Ok(items
            .iter()
            .map(value_as_trimmed_string)
            .filter(|s| !s.is_empty())
            .collect()),
        Some(_) => Err(BriefpressError::InvalidPayload(format!(
            "field '{field}' must be a string or list of strings"
        ))),
    }
}

fn value_as_trimmed_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn normalize_risk_matrix(
    value: Option<&serde_json::Value>,
) -> Result<Vec<RiskEntry>, BriefpressError> {
    let rows = match value {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(serde_json::Value::Array(rows)) => rows,
        Some(_) => {
            return Err(BriefpressError::InvalidPayload(
                "field 'risk_matrix' must be a list".into(),
            ))
        }
    };

    let mut normalized = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let Some(obj) = row.as_object() else {
            return Err(BriefpressError::InvalidPayload(format!(
                "risk_matrix[{}] must be an object",
                index + 1
            )));
        };
        let get = |key: &str| {
            obj.get(key)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .trim()
                .to_string()
        };
        let entry = RiskEntry {
            risk: get("risk"),
            impact: get("impact"),
            mitigation: get("mitigation"),
            owner: get("owner"),
        };
        if !entry.is_empty() {
            normalized.push(entry);
        }
    }
    Ok(normalized)
}

static RE_CITATION_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[?([A-Za-z]+-?\d+)\]?\s*[:\-]\s*(.+)$").unwrap());

fn normalize_citations(
    value: Option<&serde_json::Value>,
) -> Result<Vec<Citation>, BriefpressError> {
    let items = match value {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(serde_json::Value::Array(items)) => items,
        Some(_) => {
            return Err(BriefpressError::InvalidPayload(
                "field 'citations' must be a list".into(),
            ))
        }
    };

    let mut normalized = Vec::new();
    let mut counter = 1usize;
    for item in items {
        match item {
            serde_json::Value::String(text) => {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if let Some(caps) = RE_CITATION_ID.captures(text) {
                    normalized.push(Citation {
                        id: caps[1].trim().to_string(),
                        source: caps[2].trim().to_string(),
                        note: String::new(),
                    });
                } else {
                    normalized.push(Citation {
                        id: format!("CIT-{counter}"),
                        source: text.to_string(),
                        note: String::new(),
                    });
                    counter += 1;
                }
            }
            serde_json::Value::Object(obj) => {
                let get = |key: &str| {
                    obj.get(key)
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .trim()
                        .to_string()
                };
                let source = get("source");
                if source.is_empty() {
                    continue;
                }
                let id = {
                    let id = get("id");
                    if id.is_empty() {
                        format!("CIT-{counter}")
                    } else {
                        id
                    }
                };
                normalized.push(Citation {
                    id,
                    source,
                    note: get("note"),
                });
                counter += 1;
            }
            _ => {
                return Err(BriefpressError::InvalidPayload(
                    "each citation must be a string or object".into(),
                ))
            }
        }
    }
    Ok(normalized)
}

fn normalize_annexes(value: Option<&serde_json::Value>) -> Result<Vec<Annex>, BriefpressError> {
    let items = match value {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(serde_json::Value::Array(items)) => items,
        Some(_) => {
            return Err(BriefpressError::InvalidPayload(
                "field 'annexes' must be a list when provided".into(),
            ))
        }
    };

    let mut normalized = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            return Err(BriefpressError::InvalidPayload(format!(
                "annexes[{}] must be an object",
                index + 1
            )));
        };
        let get = |key: &str| {
            obj.get(key)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .trim()
                .to_string()
        };
        let annex_items = match obj.get("items") {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(serde_json::Value::String(s)) => vec![s.trim().to_string()],
            Some(serde_json::Value::Array(list)) => list
                .iter()
                .map(value_as_trimmed_string)
                .filter(|s| !s.is_empty())
                .collect(),
            Some(_) => {
                return Err(BriefpressError::InvalidPayload(format!(
                    "annexes[{}].items must be a list or string",
                    index + 1
                )))
            }
        };
        normalized.push(Annex {
            title: get("title"),
            summary: get("summary"),
            items: annex_items,
        });
    }
    Ok(normalized)
}

// ── Markdown parsing ─────────────────────────────────────────────────────

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s{0,3}#{1,6}\s+(.+?)\s*$").unwrap());
static RE_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*+]\s+|\d+[.)]\s+)(.+)$").unwrap());

/// Parse a Markdown draft into the raw payload shape that [`normalize`]
/// accepts. The first heading becomes the title; known section headings
/// are matched case-insensitively with a few aliases each.
pub fn parse_markdown(text: &str) -> serde_json::Value {
    let mut sections: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut headings: Vec<String> = Vec::new();
    let mut current = "__preamble__".to_string();
    sections.insert(current.clone(), Vec::new());

    for raw_line in text.lines() {
        if let Some(caps) = RE_HEADING.captures(raw_line) {
            let heading = caps[1].trim().to_string();
            current = heading.to_lowercase();
            headings.push(heading);
            sections.entry(current.clone()).or_default();
            continue;
        }
        sections
            .entry(current.clone())
            .or_default()
            .push(raw_line.trim_end().to_string());
    }

    let title = headings
        .first()
        .cloned()
        .or_else(|| {
            sections.get("__preamble__").and_then(|lines| {
                lines
                    .iter()
                    .find(|l| !l.trim().is_empty())
                    .map(|l| l.trim().trim_start_matches('#').trim().to_string())
            })
        })
        .unwrap_or_default();

    let summary_lines = pick_section(&sections, &["executive summary", "summary", "brief summary"]);
    let priorities_lines = pick_section(
        &sections,
        &["strategic priorities", "priorities", "action priorities"],
    );
    let risk_lines = pick_section(&sections, &["risk matrix", "risks"]);
    let citation_lines = pick_section(&sections, &["citations", "references", "sources"]);
    let annex_lines = pick_section(&sections, &["annexes", "appendices"]);

    let mut risk_matrix = parse_table_rows(&risk_lines);
    if risk_matrix.is_empty() {
        // `Risk | Impact | Mitigation | Owner` bullets as a table fallback.
        for entry in parse_bullets(&risk_lines) {
            let parts: Vec<&str> = entry.split('|').map(str::trim).collect();
            risk_matrix.push(serde_json::json!({
                "risk": parts.first().copied().unwrap_or(entry.as_str()),
                "impact": parts.get(1).copied().unwrap_or(""),
                "mitigation": parts.get(2).copied().unwrap_or(""),
                "owner": parts.get(3).copied().unwrap_or(""),
            }));
        }
    }

    let annexes: Vec<serde_json::Value> = parse_bullets(&annex_lines)
        .into_iter()
        .map(|bullet| {
            let (title, summary) = match bullet.split_once(':') {
                Some((t, s)) => (t.trim().to_string(), s.trim().to_string()),
                None => (bullet.trim().to_string(), String::new()),
            };
            serde_json::json!({"title": title, "summary": summary, "items": []})
        })
        .collect();

    let summary = non_empty_or_lines(parse_bullets(&summary_lines), &summary_lines);
    let priorities = non_empty_or_lines(parse_bullets(&priorities_lines), &priorities_lines);

    serde_json::json!({
        "title": title,
        "executive_summary": summary,
        "strategic_priorities": priorities,
        "risk_matrix": risk_matrix,
        "citations": parse_bullets(&citation_lines),
        "annexes": annexes,
    })
}

fn pick_section(sections: &BTreeMap<String, Vec<String>>, names: &[&str]) -> Vec<String> {
    for name in names {
        if let Some(lines) = sections.get(*name) {
            if lines.iter().any(|l| !l.trim().is_empty()) {
                return lines.clone();
            }
        }
    }
    Vec::new()
}

fn parse_bullets(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| RE_BULLET.captures(line))
        .map(|caps| caps[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty_or_lines(bullets: Vec<String>, lines: &[String]) -> Vec<String> {
    if !bullets.is_empty() {
        return bullets;
    }
    lines
        .iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Parse GFM table lines into risk-row objects, mapping recognised header
/// names onto the four risk fields.
fn parse_table_rows(lines: &[String]) -> Vec<serde_json::Value> {
    let table_lines: Vec<&str> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| l.contains('|'))
        .collect();
    if table_lines.len() < 2 || !table_lines[1].contains("---") {
        return Vec::new();
    }

    let header: Vec<String> = table_lines[0]
        .trim_matches('|')
        .split('|')
        .map(|c| c.trim().to_lowercase())
        .collect();

    let known = ["risk", "impact", "mitigation", "owner"];

    let mut rows = Vec::new();
    for raw_line in &table_lines[2..] {
        let cells: Vec<&str> = raw_line.trim_matches('|').split('|').map(str::trim).collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        let mut row = serde_json::Map::new();
        for key in known {
            row.insert(key.to_string(), serde_json::Value::String(String::new()));
        }
        for (idx, head) in header.iter().enumerate() {
            if let (true, Some(cell)) = (known.contains(&head.as_str()), cells.get(idx)) {
                row.insert(head.clone(), serde_json::Value::String(cell.to_string()));
            }
        }
        if row.values().any(|v| v.as_str().is_some_and(|s| !s.is_empty())) {
            rows.push(serde_json::Value::Object(row));
        }
    }
    rows
}
