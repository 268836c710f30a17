//! PDF extraction.
//!
//! `lopdf` loads the object graph (page count, encryption, image XObjects,
//! vector drawing density); `pdf-extract` produces the text.

use std::collections::BTreeSet;
use std::panic;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::warn;

use crate::ingest::models::{ExtractedContent, NonTextElement};
use crate::ingest::text::meaningful_chars;
use crate::ingest::IngestError;

/// Below this many non-whitespace characters the PDF is treated as a scan.
const MIN_TEXT_CHARS: usize = 50;
/// Rectangle (`re`) operators on one page above which the page is assumed to hold a table grid.
const TABLE_RECT_THRESHOLD: usize = 12;
/// Line segment (`l`) operators on one page above which the page is assumed to hold a ruled table.
const TABLE_SEGMENT_THRESHOLD: usize = 24;
/// Guards against reference cycles in malformed page trees.
const MAX_PARENT_DEPTH: usize = 32;

pub fn extract_pdf(bytes: &[u8]) -> Result<ExtractedContent, IngestError> {
    let document = Document::load_mem(bytes)
        .map_err(|e| IngestError::Unreadable(format!("PDF could not be parsed: {e}")))?;

    if document.trailer.get(b"Encrypt").is_ok() {
        return Err(IngestError::Unreadable(
            "PDF is password-protected; remove the password and upload again".to_string(),
        ));
    }

    let pages = document.get_pages();
    let mut non_text_elements = BTreeSet::new();
    for page_id in pages.values() {
        if page_has_images(&document, *page_id) {
            non_text_elements.insert(NonTextElement::Image);
        }
        if page_has_table_drawing(&document, *page_id) {
            non_text_elements.insert(NonTextElement::Table);
        }
    }

    let raw_text = extract_text(bytes)?;
    let text = raw_text.replace('\x0c', "\n");
    if meaningful_chars(&text) < MIN_TEXT_CHARS {
        return Err(IngestError::Unreadable(
            "PDF contains no extractable text; scanned documents are not supported".to_string(),
        ));
    }

    let mut content = ExtractedContent::from_plain_text(text, Some(pages.len() as u32));
    content.non_text_elements = non_text_elements;
    Ok(content)
}

/// Runs `pdf-extract`, containing any panic raised on malformed input.
fn extract_text(bytes: &[u8]) -> Result<String, IngestError> {
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => {
            let message = e.to_string();
            let lower = message.to_lowercase();
            if lower.contains("encrypt") || lower.contains("password") {
                return Err(IngestError::Unreadable(
                    "PDF is password-protected; remove the password and upload again".to_string(),
                ));
            }
            Err(IngestError::Unreadable(format!(
                "PDF text could not be extracted: {message}"
            )))
        }
        Err(_) => {
            warn!("pdf-extract panicked while reading an uploaded PDF");
            Err(IngestError::Unreadable(
                "PDF text could not be extracted".to_string(),
            ))
        }
    }
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn resolve_dict<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match resolve(document, object)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Finds the page's `/Resources`, walking up `/Parent` for inherited resources.
fn page_resources(document: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = document.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..MAX_PARENT_DEPTH {
        if let Ok(resources) = node.get(b"Resources") {
            return resolve_dict(document, resources);
        }
        let parent = node.get(b"Parent").ok()?;
        node = resolve_dict(document, parent)?;
    }
    None
}

fn page_has_images(document: &Document, page_id: ObjectId) -> bool {
    let Some(resources) = page_resources(document, page_id) else {
        return false;
    };
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|obj| resolve_dict(document, obj))
    else {
        return false;
    };

    xobjects.iter().any(|(_, obj)| match resolve(document, obj) {
        Some(Object::Stream(stream)) => {
            matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name.as_slice() == b"Image")
        }
        _ => false,
    })
}

fn page_has_table_drawing(document: &Document, page_id: ObjectId) -> bool {
    let Ok(raw) = document.get_page_content(page_id) else {
        return false;
    };
    let Ok(content) = Content::decode(&raw) else {
        return false;
    };

    let rects = content
        .operations
        .iter()
        .filter(|op| op.operator == "re")
        .count();
    let segments = content
        .operations
        .iter()
        .filter(|op| op.operator == "l")
        .count();
    rects >= TABLE_RECT_THRESHOLD || segments >= TABLE_SEGMENT_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::{pdf_bytes, PdfOptions};

    const RESUME_LINES: &[&str] = &[
        "Jane Doe",
        "jane.doe@example.com",
        "EXPERIENCE",
        "Reduced infrastructure costs by 30% across 12 services",
        "EDUCATION",
        "BSc Computer Science, University of Somewhere",
    ];

    #[test]
    fn test_extracts_text_and_page_count() {
        let bytes = pdf_bytes(RESUME_LINES, PdfOptions::default());
        let content = extract_pdf(&bytes).unwrap();
        assert_eq!(content.page_count, Some(1));
        assert!(content.text.contains("infrastructure"), "text: {}", content.text);
        assert!(content.non_text_elements.is_empty());
    }

    #[test]
    fn test_image_xobject_is_flagged() {
        let bytes = pdf_bytes(
            RESUME_LINES,
            PdfOptions {
                with_image: true,
                ..PdfOptions::default()
            },
        );
        let content = extract_pdf(&bytes).unwrap();
        assert!(content.non_text_elements.contains(&NonTextElement::Image));
    }

    #[test]
    fn test_ruled_grid_is_flagged_as_table() {
        let bytes = pdf_bytes(
            RESUME_LINES,
            PdfOptions {
                table_cells: 16,
                ..PdfOptions::default()
            },
        );
        let content = extract_pdf(&bytes).unwrap();
        assert!(content.non_text_elements.contains(&NonTextElement::Table));
    }

    #[test]
    fn test_encrypted_pdf_is_unreadable() {
        let bytes = pdf_bytes(
            RESUME_LINES,
            PdfOptions {
                encrypted: true,
                ..PdfOptions::default()
            },
        );
        let err = extract_pdf(&bytes).unwrap_err();
        assert!(matches!(err, IngestError::Unreadable(_)));
    }

    #[test]
    fn test_textless_pdf_is_unreadable() {
        let bytes = pdf_bytes(&[], PdfOptions::default());
        let err = extract_pdf(&bytes).unwrap_err();
        assert!(matches!(err, IngestError::Unreadable(_)));
    }

    #[test]
    fn test_truncated_pdf_is_unreadable() {
        let err = extract_pdf(b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog").unwrap_err();
        assert!(matches!(err, IngestError::Unreadable(_)));
    }
}
