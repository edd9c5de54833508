//! Plain-text extraction for uploaded forms.

use quick_xml::{Reader, events::Event};
use std::io::{Cursor, Read};
use thiserror::Error;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Entry inside a DOCX archive that holds the document body.
const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("could not read PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("could not open DOCX archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("could not parse DOCX body: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("could not read DOCX body: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is not valid UTF-8 text: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// How an upload is read, decided by its declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        // Ignore parameters such as "; charset=utf-8"
        let essence = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());
        match essence.as_deref() {
            Some(PDF_CONTENT_TYPE) => DocumentKind::Pdf,
            Some(DOCX_CONTENT_TYPE) => DocumentKind::Docx,
            _ => DocumentKind::PlainText,
        }
    }
}

/// Extracts plain text from an uploaded document.
pub fn extract_text(bytes: &[u8], content_type: Option<&str>) -> Result<String, DocumentError> {
    match DocumentKind::from_content_type(content_type) {
        DocumentKind::Pdf => extract_pdf_text(bytes),
        DocumentKind::Docx => extract_docx_text(bytes),
        DocumentKind::PlainText => Ok(String::from_utf8(bytes.to_vec())?),
    }
}

/// Text of every page, in page order, joined with single spaces. Pages without text are skipped.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let document = lopdf::Document::load_mem(bytes)?;

    let mut pages = Vec::new();
    for page_number in document.get_pages().keys() {
        let text = document.extract_text(&[*page_number])?;
        let text = text.trim();
        if !text.is_empty() {
            pages.push(text.to_string());
        }
    }

    Ok(pages.join(" "))
}

/// Text of every paragraph in the document body, joined with single spaces.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name(DOCX_BODY)?.read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Event::End(e) if e.name().as_ref() == b"w:t" => in_text_run = false,
            Event::Text(e) if in_text_run => current.push_str(&e.unescape()?),
            Event::Empty(e) if matches!(e.name().as_ref(), b"w:tab" | b"w:br") => {
                current.push(' ')
            }
            Event::End(e) if e.name().as_ref() == b"w:p" => {
                let paragraph = current.trim();
                if !paragraph.is_empty() {
                    paragraphs.push(paragraph.to_string());
                }
                current.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file(DOCX_BODY, options).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn test_content_type_detection() {
        assert_eq!(DocumentKind::from_content_type(Some("application/pdf")), DocumentKind::Pdf);
        assert_eq!(
            DocumentKind::from_content_type(Some(DOCX_CONTENT_TYPE)),
            DocumentKind::Docx
        );
        assert_eq!(
            DocumentKind::from_content_type(Some("text/plain; charset=utf-8")),
            DocumentKind::PlainText
        );
        assert_eq!(DocumentKind::from_content_type(None), DocumentKind::PlainText);
    }

    #[test]
    fn test_plain_text_passthrough() {
        let text = extract_text("Funding: one-time".as_bytes(), Some("text/plain")).unwrap();
        assert_eq!(text, "Funding: one-time");
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let result = extract_text(&[0xff, 0xfe, 0x00], None);
        assert!(matches!(result, Err(DocumentError::Encoding(_))));
    }

    #[test]
    fn test_docx_paragraphs_joined_with_spaces() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Club: Chess</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">Amount: </w:t></w:r><w:r><w:t>$300 &amp; snacks</w:t></w:r></w:p>
    <w:p></w:p>
    <w:p><w:r><w:t>Date: 2025-03-01</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
        let text = extract_text(&docx_with_body(body), Some(DOCX_CONTENT_TYPE)).unwrap();
        assert_eq!(text, "Club: Chess Amount: $300 & snacks Date: 2025-03-01");
    }

    #[test]
    fn test_garbage_docx_is_an_error() {
        let result = extract_text(b"not a zip archive", Some(DOCX_CONTENT_TYPE));
        assert!(matches!(result, Err(DocumentError::Archive(_))));
    }

    #[test]
    fn test_garbage_pdf_is_an_error() {
        let result = extract_text(b"%PDF-broken", Some(PDF_CONTENT_TYPE));
        assert!(matches!(result, Err(DocumentError::Pdf(_))));
    }
}
