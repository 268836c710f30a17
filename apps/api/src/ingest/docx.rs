//! DOCX extraction: opens the OOXML package with `zip` and streams
//! `word/document.xml` with `quick-xml`.

use std::collections::BTreeSet;
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::ingest::models::{ExtractedContent, NonTextElement};
use crate::ingest::text::{count_words, is_header_candidate, meaningful_chars};
use crate::ingest::IngestError;

const DOCUMENT_XML: &str = "word/document.xml";
const MEDIA_PREFIX: &str = "word/media/";

pub fn extract_docx(bytes: &[u8]) -> Result<ExtractedContent, IngestError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| IngestError::Unreadable(format!("DOCX package could not be opened: {e}")))?;

    let has_media = archive.file_names().any(|name| name.starts_with(MEDIA_PREFIX));

    let xml = {
        let mut entry = archive.by_name(DOCUMENT_XML).map_err(|_| {
            IngestError::Unreadable("DOCX package has no word/document.xml".to_string())
        })?;
        let mut xml = String::new();
        entry
            .read_to_string(&mut xml)
            .map_err(|e| IngestError::Unreadable(format!("DOCX body could not be read: {e}")))?;
        xml
    };

    let mut content = parse_document_xml(&xml)?;
    if has_media {
        content.non_text_elements.insert(NonTextElement::Image);
    }
    if meaningful_chars(&content.text) == 0 {
        return Err(IngestError::Unreadable("DOCX contains no text".to_string()));
    }
    Ok(content)
}

#[derive(Default)]
struct Paragraph {
    text: String,
    style: Option<String>,
}

impl Paragraph {
    fn is_heading_style(&self) -> bool {
        self.style.as_deref().is_some_and(|style| {
            let style = style.to_ascii_lowercase();
            style.starts_with("heading") || style == "title" || style == "subtitle"
        })
    }
}

/// Streaming walker over `document.xml`.
#[derive(Default)]
struct BodyWalker {
    /// Open paragraphs; text boxes nest paragraphs inside a run of the outer one.
    paragraphs: Vec<Paragraph>,
    lines: Vec<String>,
    labels: Vec<String>,
    non_text_elements: BTreeSet<NonTextElement>,
    multi_column: bool,
    in_text_run: bool,
    /// Depth inside `mc:Fallback`, whose content duplicates the preferred branch.
    fallback_depth: usize,
}

impl BodyWalker {
    fn open(&mut self, element: &BytesStart<'_>) {
        let name = element.name();
        let name = name.as_ref();
        if name == b"mc:Fallback" {
            self.fallback_depth += 1;
        }
        if self.fallback_depth > 0 {
            return;
        }
        match name {
            b"w:p" => self.paragraphs.push(Paragraph::default()),
            b"w:t" => self.in_text_run = true,
            b"w:tab" => self.push_text("\t"),
            b"w:br" | b"w:cr" => self.push_text("\n"),
            b"w:pStyle" => {
                let style = attribute(element, b"w:val");
                if let Some(paragraph) = self.paragraphs.last_mut() {
                    paragraph.style = style;
                }
            }
            b"w:tbl" => {
                self.non_text_elements.insert(NonTextElement::Table);
            }
            b"w:drawing" | b"w:pict" | b"v:imagedata" => {
                self.non_text_elements.insert(NonTextElement::Image);
            }
            b"w:txbxContent" => {
                self.non_text_elements.insert(NonTextElement::TextBox);
            }
            b"w:cols" => {
                let columns = attribute(element, b"w:num")
                    .and_then(|n| n.parse::<u32>().ok())
                    .unwrap_or(1);
                if columns > 1 {
                    self.multi_column = true;
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        if name == b"mc:Fallback" {
            self.fallback_depth = self.fallback_depth.saturating_sub(1);
            return;
        }
        if self.fallback_depth > 0 {
            return;
        }
        match name {
            b"w:t" => self.in_text_run = false,
            b"w:p" => {
                if let Some(paragraph) = self.paragraphs.pop() {
                    self.finish_paragraph(paragraph);
                }
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(paragraph) = self.paragraphs.last_mut() {
            paragraph.text.push_str(text);
        }
    }

    fn finish_paragraph(&mut self, paragraph: Paragraph) {
        let line = paragraph.text.trim();
        if line.is_empty() {
            return;
        }
        let styled_heading = paragraph.is_heading_style() && line.split_whitespace().count() <= 8;
        if styled_heading || is_header_candidate(line) {
            self.labels.push(line.to_string());
        }
        self.lines.push(line.to_string());
    }

    fn into_content(self) -> ExtractedContent {
        let text = self.lines.join("\n");
        let word_count = count_words(&text);
        ExtractedContent {
            text,
            section_labels: self.labels,
            non_text_elements: self.non_text_elements,
            multi_column: self.multi_column,
            page_count: None,
            word_count,
        }
    }
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .try_get_attribute(key)
        .ok()
        .flatten()
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Parses the WordprocessingML body into lines, header labels and layout markers.
pub fn parse_document_xml(xml: &str) -> Result<ExtractedContent, IngestError> {
    let mut reader = Reader::from_str(xml);
    let mut walker = BodyWalker::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => walker.open(&element),
            Ok(Event::Empty(element)) => {
                walker.open(&element);
                walker.close(element.name().as_ref());
            }
            Ok(Event::End(element)) => walker.close(element.name().as_ref()),
            Ok(Event::Text(text)) => {
                if walker.in_text_run && walker.fallback_depth == 0 {
                    let text = text.unescape().map_err(|e| {
                        IngestError::Unreadable(format!("DOCX body has invalid text: {e}"))
                    })?;
                    walker.push_text(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(IngestError::Unreadable(format!(
                    "DOCX body is malformed at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(walker.into_content())
}
