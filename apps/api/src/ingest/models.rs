use std::collections::BTreeSet;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ingest::text::{count_words, detect_section_labels, looks_multi_column};
use crate::ingest::validation::validate_upload;
use crate::ingest::IngestError;

const PDF_SIGNATURE: &[u8] = b"%PDF-";
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";
const OLE_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Accepted upload formats. The extension decides the format; the content
/// signature is verified at extraction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Doc,
    Docx,
}

impl DocumentFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "doc" => Some(DocumentFormat::Doc),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Doc => "doc",
            DocumentFormat::Docx => "docx",
        }
    }

    /// Leading magic bytes expected for this format.
    pub fn signature(&self) -> &'static [u8] {
        match self {
            DocumentFormat::Pdf => PDF_SIGNATURE,
            DocumentFormat::Docx => ZIP_SIGNATURE,
            DocumentFormat::Doc => OLE_SIGNATURE,
        }
    }

    pub fn signature_matches(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(self.signature())
    }
}

/// A validated upload. Only constructible through [`UploadedDocument::new`],
/// so holding one proves the extension and size checks passed.
#[derive(Debug)]
pub struct UploadedDocument {
    file_name: String,
    content_type: Option<String>,
    format: DocumentFormat,
    bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Bytes,
        limit: usize,
    ) -> Result<Self, IngestError> {
        let file_name = file_name.into();
        let format = validate_upload(&file_name, bytes.len(), limit)?;
        Ok(Self {
            file_name,
            content_type,
            format,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type declared by the client. Informational only; the extension is authoritative.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// Elements that ATS parsers commonly fail to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonTextElement {
    Table,
    Image,
    TextBox,
}

impl NonTextElement {
    pub fn plural_label(&self) -> &'static str {
        match self {
            NonTextElement::Table => "tables",
            NonTextElement::Image => "images",
            NonTextElement::TextBox => "text boxes",
        }
    }
}

/// Text and structural markers pulled out of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    pub text: String,
    /// Candidate section header lines, in document order.
    pub section_labels: Vec<String>,
    pub non_text_elements: BTreeSet<NonTextElement>,
    pub multi_column: bool,
    pub page_count: Option<u32>,
    pub word_count: usize,
}

impl ExtractedContent {
    /// Builds content from plain text using the line-based header heuristics.
    /// Used for formats that carry no reliable style information.
    pub fn from_plain_text(text: String, page_count: Option<u32>) -> Self {
        let section_labels = detect_section_labels(&text);
        let multi_column = looks_multi_column(&text);
        let word_count = count_words(&text);
        Self {
            text,
            section_labels,
            non_text_elements: BTreeSet::new(),
            multi_column,
            page_count,
            word_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension_is_case_insensitive() {
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("Docx"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension("doc"), Some(DocumentFormat::Doc));
        assert_eq!(DocumentFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_signatures() {
        assert!(DocumentFormat::Pdf.signature_matches(b"%PDF-1.7\n..."));
        assert!(DocumentFormat::Docx.signature_matches(b"PK\x03\x04rest"));
        assert!(!DocumentFormat::Doc.signature_matches(b"PK\x03\x04rest"));
        assert!(!DocumentFormat::Pdf.signature_matches(b""));
    }

    #[test]
    fn test_uploaded_document_keeps_metadata() {
        let doc = UploadedDocument::new(
            "cv.PDF",
            Some("application/pdf".to_string()),
            Bytes::from_static(b"%PDF-1.4"),
            1024,
        )
        .unwrap();
        assert_eq!(doc.file_name(), "cv.PDF");
        assert_eq!(doc.content_type(), Some("application/pdf"));
        assert_eq!(doc.format(), DocumentFormat::Pdf);
        assert_eq!(doc.size(), 8);
    }

    #[test]
    fn test_from_plain_text_detects_labels_and_words() {
        let content = ExtractedContent::from_plain_text(
            "EXPERIENCE\nBuilt things for people.\nEducation:\nBSc Computer Science, 2015.".to_string(),
            Some(1),
        );
        assert_eq!(content.section_labels, vec!["EXPERIENCE", "Education:"]);
        assert_eq!(content.word_count, 10);
        assert!(!content.multi_column);
        assert_eq!(content.page_count, Some(1));
    }
}
