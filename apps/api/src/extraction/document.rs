//! Document-to-text conversion for uploaded resumes (PDF / DOCX only).

use std::path::Path;

use thiserror::Error;
use tracing::warn;

pub const UNSUPPORTED_FORMAT_MESSAGE: &str = "Unsupported file format. Please upload PDF or DOCX.";

const ERROR_PREFIXES: &[&str] = &[
    "Error processing PDF file:",
    "Error processing DOCX file:",
    "Error reading file:",
    UNSUPPORTED_FORMAT_MESSAGE,
];

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Error reading file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file format. Please upload PDF or DOCX.")]
    UnsupportedFormat(String),

    #[error("Error processing PDF file: {0}")]
    Pdf(String),

    #[error("Error processing DOCX file: {0}")]
    Docx(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Case-insensitive extension check.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }
}

/// Converts document bytes to text, dispatching on the filename's extension.
pub fn extract_document(bytes: &[u8], filename: &str) -> Result<String, ExtractionError> {
    match DocumentKind::from_filename(filename) {
        Some(DocumentKind::Pdf) => extract_pdf(bytes),
        Some(DocumentKind::Docx) => extract_docx(bytes),
        None => Err(ExtractionError::UnsupportedFormat(filename.to_string())),
    }
}

/// Reads and converts a file. Never fails: errors come back as a descriptive
/// string in place of the text (see `is_extraction_error`).
pub fn extract_text(path: &Path) -> String {
    let filename = path.to_string_lossy();
    let result = if DocumentKind::from_filename(&filename).is_none() {
        Err(ExtractionError::UnsupportedFormat(filename.to_string()))
    } else {
        std::fs::read(path)
            .map_err(ExtractionError::from)
            .and_then(|bytes| extract_document(&bytes, &filename))
    };

    result.unwrap_or_else(|e| {
        warn!("Text extraction failed for {}: {e}", path.display());
        e.to_string()
    })
}

/// True when `text` is one of the error strings produced by `extract_text`.
pub fn is_extraction_error(text: &str) -> bool {
    ERROR_PREFIXES.iter().any(|prefix| text.starts_with(prefix))
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    // pdf-extract panics on some malformed files
    std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| ExtractionError::Pdf("parser panicked on malformed input".to_string()))?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for paragraph_child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = paragraph_child {
                    for run_child in run.children {
                        if let docx_rs::RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}
