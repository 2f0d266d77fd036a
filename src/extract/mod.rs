//! Text extraction from uploaded documents and web pages.
//!
//! File extraction is synchronous and CPU/IO bound; callers run it on a
//! blocking thread. Web extraction is async.

mod docx;
mod pdf;
mod table;
mod text;
pub mod web;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use table::render_table;
pub use web::WebExtractor;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to extract PDF text: {0}")]
    Pdf(String),
    #[error("failed to parse DOCX: {0}")]
    Docx(String),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),
    #[error("{0} is not valid UTF-8 text")]
    InvalidUtf8(PathBuf),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("{0}")]
    Fetch(String),
}

impl ExtractError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ExtractError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Document formats accepted by `/upload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Csv,
    Txt,
    Excel,
}

impl DocumentKind {
    /// Picks the kind from the text after the last `.` of `file_name`.
    ///
    /// A name without a dot is treated as having an extension equal to the
    /// whole name, so it is rejected unless it literally is e.g. `pdf`.
    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractError> {
        let extension = file_name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            "csv" => Ok(DocumentKind::Csv),
            "txt" => Ok(DocumentKind::Txt),
            "xls" | "xlsx" => Ok(DocumentKind::Excel),
            _ => Err(ExtractError::UnsupportedFileType(extension)),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
            DocumentKind::Csv => "csv",
            DocumentKind::Txt => "txt",
            DocumentKind::Excel => "excel",
        };
        f.write_str(name)
    }
}

/// Returns the full text content of the file at `path`.
pub fn extract(path: &Path, kind: DocumentKind) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Pdf => pdf::extract_pdf(path),
        DocumentKind::Docx => docx::extract_docx(path),
        DocumentKind::Csv => table::extract_csv(path),
        DocumentKind::Txt => text::extract_txt(path),
        DocumentKind::Excel => table::extract_spreadsheet(path),
    }
}
