// Document Ingestor
// Implements: upload validation (extension allow-list, size ceiling), signature checks,
// and text/structure extraction for PDF, DOCX and legacy DOC uploads.
// Extraction is CPU-bound and must run inside tokio::task::spawn_blocking.

pub mod doc;
pub mod docx;
pub mod models;
pub mod pdf;
pub mod text;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

use thiserror::Error;
use tracing::debug;

pub use models::{DocumentFormat, ExtractedContent, NonTextElement, UploadedDocument};
pub use validation::validate_extension;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file type '{extension}': upload a PDF, DOC or DOCX file")]
    InvalidFormat { extension: String },

    #[error("file exceeds the {limit} byte limit ({size} bytes received)")]
    TooLarge { size: usize, limit: usize },

    #[error("{0}")]
    Unreadable(String),
}

/// Extracts text and structural markers from a validated upload.
///
/// Takes ownership of the document: the raw bytes are released as soon as
/// this returns, whatever the outcome.
pub fn extract(document: UploadedDocument) -> Result<ExtractedContent, IngestError> {
    let format = document.format();
    let bytes = document.into_bytes();

    if !format.signature_matches(&bytes) {
        return Err(IngestError::Unreadable(format!(
            "file content is not a valid {} document",
            format.as_str().to_uppercase()
        )));
    }

    let content = match format {
        DocumentFormat::Pdf => pdf::extract_pdf(&bytes)?,
        DocumentFormat::Docx => docx::extract_docx(&bytes)?,
        DocumentFormat::Doc => doc::extract_doc(&bytes)?,
    };

    debug!(
        format = format.as_str(),
        words = content.word_count,
        labels = content.section_labels.len(),
        "Extraction complete"
    );
    Ok(content)
}
