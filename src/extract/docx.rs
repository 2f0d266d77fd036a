use std::fs;
use std::path::Path;

use docx_rs::{read_docx, DocumentChild};

use super::ExtractError;

/// Joins the document's top-level paragraphs with newlines.
///
/// Tables, headers and footers are not part of the body paragraph list and
/// are skipped.
pub fn extract_docx(path: &Path) -> Result<String, ExtractError> {
    let bytes = fs::read(path).map_err(|e| ExtractError::io(path, e))?;
    let docx = read_docx(&bytes).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph.raw_text()),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}
