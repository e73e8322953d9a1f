//! Artifact text/metadata extraction.
//!
//! The verifier only needs three things from an artifact: its visible
//! text, a lowercase metadata map, and a page count. [`ArtifactExtractor`]
//! is the seam; [`RawTextExtractor`] is the built-in backend that reads
//! literal-string PDFs (including the local renderer's output) without a
//! full PDF parser. Compressed-stream PDFs need a different backend.

use crate::error::BriefpressError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

/// What the verifier consumes.
#[derive(Debug, Clone, Default)]
pub struct ExtractedArtifact {
    pub text: String,
    /// Keys lowercased; values as written in the document.
    pub metadata: BTreeMap<String, String>,
    pub page_count: u32,
}

/// Pluggable extraction backend.
pub trait ArtifactExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedArtifact, BriefpressError>;
}

/// Extracts from uncompressed PDFs by scanning for literal `Tj` strings
/// and `/Info`-style metadata entries.
pub struct RawTextExtractor;

static RE_TJ: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(((?:[^()\\]|\\.)*)\)\s*Tj").unwrap());

static RE_METADATA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)/(Title|Author|Creator|Producer|Subject|Keywords)\s*\(((?:[^()\\]|\\.)*)\)")
        .unwrap()
});

// `/Type /Pages` (the page tree node) must not count as a page, hence
// the word boundary.
static RE_PAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/Type\s*/Page\b").unwrap());

/// Undo PDF literal-string escaping.
fn unescape_pdf_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

impl ArtifactExtractor for RawTextExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedArtifact, BriefpressError> {
        if !path.exists() {
            return Err(BriefpressError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(path).map_err(|e| BriefpressError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let raw = String::from_utf8_lossy(&bytes);

        let text = RE_TJ
            .captures_iter(&raw)
            .map(|caps| unescape_pdf_text(&caps[1]))
            .collect::<Vec<_>>()
            .join("\n");

        let mut metadata = BTreeMap::new();
        for caps in RE_METADATA.captures_iter(&raw) {
            let key = caps[1].to_lowercase();
            let value = unescape_pdf_text(&caps[2]);
            // First occurrence wins; later stray matches in content
            // streams must not override the Info dictionary.
            metadata.entry(key).or_insert(value);
        }

        // Every artifact that parses at all renders at least one page.
        let page_count = (RE_PAGE.find_iter(&raw).count() as u32).max(1);

        Ok(ExtractedArtifact {
            text,
            metadata,
            page_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{write_basic_pdf, PdfInfo};

    #[test]
    fn reads_back_local_renderer_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.pdf");
        let info = PdfInfo {
            title: "Extraction Check".into(),
            author: "OGC".into(),
            creator: "briefpress".into(),
            producer: "briefpress local renderer".into(),
        };
        write_basic_pdf(
            &path,
            &["PRIVILEGED & CONFIDENTIAL".to_string(), "body (quoted)".to_string()],
            Some(&info),
        )
        .unwrap();

        let out = RawTextExtractor.extract(&path).unwrap();
        assert!(out.text.contains("PRIVILEGED & CONFIDENTIAL"));
        assert!(out.text.contains("body (quoted)"));
        assert_eq!(out.metadata.get("author").map(String::as_str), Some("OGC"));
        assert_eq!(out.metadata.get("title").map(String::as_str), Some("Extraction Check"));
        assert_eq!(out.page_count, 1);
    }

    #[test]
    fn page_tree_node_does_not_inflate_page_count() {
        let raw = b"%PDF-1.4\n<< /Type /Pages /Count 2 >>\n<< /Type /Page >>\n<< /Type /Page >>\n%%EOF";
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.pdf");
        std::fs::write(&path, raw).unwrap();
        let out = RawTextExtractor.extract(&path).unwrap();
        assert_eq!(out.page_count, 2);
    }

    #[test]
    fn missing_artifact_is_an_error() {
        let err = RawTextExtractor
            .extract(Path::new("/nonexistent/artifact.pdf"))
            .unwrap_err();
        assert!(matches!(err, BriefpressError::FileNotFound { .. }));
    }

    #[test]
    fn unescape_handles_parens_and_backslashes() {
        assert_eq!(unescape_pdf_text(r"a \(b\) \\ c"), r"a (b) \ c");
    }
}
