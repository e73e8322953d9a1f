//! Local fallback renderer: a dependency-free single-page PDF writer.
//!
//! Produces the smallest well-formed PDF that still carries the composed
//! text as literal `Tj` strings, so the preflight extractor can read the
//! content back without a full PDF parser. Used when the remote service
//! is unreachable or deliberately skipped.

use crate::compose::compose_lines;
use crate::error::BriefpressError;
use crate::payload::BriefPayload;
use std::path::Path;

const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;
const MARGIN_TOP: u32 = 760;
const LINE_HEIGHT: u32 = 14;

/// Document metadata written into the PDF `/Info` dictionary.
#[derive(Debug, Clone, Default)]
pub struct PdfInfo {
    pub title: String,
    pub author: String,
    pub creator: String,
    pub producer: String,
}

impl PdfInfo {
    /// Info dictionary for a rendered brief.
    pub fn for_brief(title: &str) -> Self {
        Self {
            title: title.to_string(),
            author: "Office of the General Counsel".to_string(),
            creator: "briefpress".to_string(),
            producer: "briefpress local renderer".to_string(),
        }
    }
}

/// Escape a string for use inside a PDF literal string.
fn escape_pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            c if c.is_ascii() => out.push(c),
            // Non-ASCII falls outside the base font encoding.
            _ => out.push('?'),
        }
    }
    out
}

/// Write a minimal single-page PDF containing the given text lines.
///
/// Objects: catalog, page tree, page, Helvetica font, content stream,
/// and an optional `/Info` dictionary referenced from the trailer. The
/// xref table carries byte-accurate offsets so strict readers accept it.
pub fn write_basic_pdf(
    path: &Path,
    lines: &[String],
    info: Option<&PdfInfo>,
) -> Result<u64, BriefpressError> {
    let mut content = String::from("BT\n/F1 11 Tf\n");
    let mut y = MARGIN_TOP;
    for line in lines {
        content.push_str(&format!("1 0 0 1 54 {y} Tm\n({}) Tj\n", escape_pdf_text(line)));
        y = y.saturating_sub(LINE_HEIGHT);
        if y < LINE_HEIGHT {
            // Single page only; overflow is clipped rather than paginated.
            break;
        }
    }
    content.push_str("ET\n");

    let objects: Vec<String> = {
        let mut objs = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
            format!("<< /Length {} >>\nstream\n{content}endstream", content.len()),
        ];
        if let Some(info) = info {
            objs.push(format!(
                "<< /Title ({}) /Author ({}) /Creator ({}) /Producer ({}) >>",
                escape_pdf_text(&info.title),
                escape_pdf_text(&info.author),
                escape_pdf_text(&info.creator),
                escape_pdf_text(&info.producer),
            ));
        }
        objs
    };

    let mut pdf: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets: Vec<usize> = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", index + 1).as_bytes());
    }

    let xref_offset = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    let mut trailer = format!(
        "trailer\n<< /Size {} /Root 1 0 R",
        objects.len() + 1
    );
    if info.is_some() {
        trailer.push_str(&format!(" /Info {} 0 R", objects.len()));
    }
    trailer.push_str(&format!(" >>\nstartxref\n{xref_offset}\n%%EOF\n"));
    pdf.extend_from_slice(trailer.as_bytes());

    std::fs::write(path, &pdf).map_err(|e| BriefpressError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(pdf.len() as u64)
}

/// Render a payload to a PDF at `path` using the local writer.
pub fn render_local(payload: &BriefPayload, path: &Path) -> Result<u64, BriefpressError> {
    let lines = compose_lines(payload);
    let info = PdfInfo::for_brief(&payload.title);
    write_basic_pdf(path, &lines, Some(&info))
}
