//! In-memory document builders for tests.

use std::io::{Cursor, Write};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use zip::write::FileOptions;
use zip::ZipWriter;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Builds a minimal `.docx` package around a `word/document.xml` body.
#[derive(Default)]
pub(crate) struct DocxBuilder {
    body: String,
    media: Vec<String>,
    skip_document_xml: bool,
}

impl DocxBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn styled(mut self, style: &str, text: &str) -> Self {
        self.body.push_str(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape(text)
        ));
        self
    }

    pub(crate) fn heading(self, text: &str) -> Self {
        self.styled("Heading1", text)
    }

    pub(crate) fn para(mut self, text: &str) -> Self {
        self.body.push_str(&format!(
            r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape(text)
        ));
        self
    }

    pub(crate) fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    pub(crate) fn media(mut self, name: &str) -> Self {
        self.media.push(name.to_string());
        self
    }

    pub(crate) fn without_document_xml(mut self) -> Self {
        self.skip_document_xml = true;
        self
    }

    pub(crate) fn build(self) -> Vec<u8> {
        let document_xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"><w:body>{}<w:sectPr/></w:body></w:document>"#,
            self.body
        );

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES_XML.as_bytes()).unwrap();
        if !self.skip_document_xml {
            zip.start_file("word/document.xml", options).unwrap();
            zip.write_all(document_xml.as_bytes()).unwrap();
        }
        for name in &self.media {
            zip.start_file(format!("word/media/{name}"), options).unwrap();
            zip.write_all(&[0x89, b'P', b'N', b'G']).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }
}

/// A well-formed resume: contact line, all canonical sections, quantified bullets,
/// and every keyword of the `general` profile.
pub(crate) fn complete_resume_docx() -> Vec<u8> {
    DocxBuilder::new()
        .styled("Title", "Jordan Rivera")
        .para("jordan.rivera@example.com | +1 555 0100 | Portland, OR")
        .heading("Summary")
        .para("Delivery lead with eight years of project management and data analysis experience across fintech and logistics teams.")
        .heading("Work Experience")
        .para("Led Agile delivery for 4 squads, cutting release lead time by 35% within two quarters.")
        .para("Managed budget planning for a $2M platform program and reported variance monthly to finance partners.")
        .para("Owned stakeholder management for 12 executive sponsors and ran quarterly risk assessment reviews.")
        .para("Built a data analysis pipeline that reduced weekly reporting effort by 10 hours.")
        .heading("Education")
        .para("MBA, Operations Management, Portland State University")
        .heading("Skills")
        .para("Project Management, Scrum, Budget Planning, Risk Assessment, SQL, Tableau, Stakeholder Management")
        .heading("Projects")
        .para("Launched an internal capacity planner adopted by 300 staff within 6 months.")
        .heading("Certifications")
        .para("PMP, Certified ScrumMaster")
        .build()
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PdfOptions {
    pub(crate) with_image: bool,
    pub(crate) table_cells: usize,
    pub(crate) encrypted: bool,
}

/// Builds a one-page PDF with one Helvetica text line per entry.
pub(crate) fn pdf_bytes(lines: &[&str], options: PdfOptions) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut resources = dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    };
    if options.with_image {
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0u8],
        ));
        resources.set("XObject", dictionary! { "Im1" => image_id });
    }
    let resources_id = doc.add_object(resources);

    let mut operations = Vec::new();
    for cell in 0..options.table_cells {
        let x = 50 + (cell as i64 % 4) * 120;
        let y = 100 + (cell as i64 / 4) * 20;
        operations.push(Operation::new(
            "re",
            vec![x.into(), y.into(), 120.into(), 20.into()],
        ));
        operations.push(Operation::new("S", vec![]));
    }
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tf", vec!["F1".into(), 11.into()]));
    operations.push(Operation::new("TL", vec![14.into()]));
    operations.push(Operation::new("Td", vec![50.into(), 750.into()]));
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    if options.encrypted {
        doc.trailer.set(
            "Encrypt",
            dictionary! {
                "Filter" => "Standard",
                "V" => 1,
                "R" => 2,
            },
        );
    }

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Builds bytes that look like a legacy Word 97 file: OLE header, then the
/// given paragraphs stored as UTF-16LE (or 8-bit when `wide` is false),
/// separated by paragraph marks.
pub(crate) fn doc_bytes(paragraphs: &[&str], wide: bool) -> Vec<u8> {
    let mut bytes = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
    bytes.resize(512, 0);
    // Binary noise ahead of the text stream.
    bytes.extend_from_slice(&[0x01, 0x02, 0xFF, 0x00, 0x7F, 0x10, 0x03, 0x00]);
    let text = paragraphs.join("\r");
    if wide {
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
    } else {
        bytes.extend_from_slice(text.as_bytes());
    }
    bytes.extend_from_slice(&[0x00, 0x00, 0x05, 0xFE, 0x00, 0x00]);
    bytes.extend_from_slice(b"Times New Roman");
    bytes.resize(bytes.len() + 64, 0);
    bytes
}
