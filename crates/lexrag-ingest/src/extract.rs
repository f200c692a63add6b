//! Plain-text extraction from uploaded documents.
//!
//! Dispatch is by filename extension, case-insensitive. All extractors
//! consume byte slices directly; nothing is written to disk, so there is
//! no temporary file to clean up or race on under concurrent uploads.
//!
//! Extraction that succeeds but yields no characters returns `Ok("")`.
//! The pipeline treats that as "no chunks produced", not as a failure.

use std::io::Read;

use lexrag_core::{Error, Result};

/// Maximum decompressed bytes read from a single ZIP entry.
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Document formats the extractor recognizes explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Docx,
    PlainText,
    /// Unrecognized extension — falls back to a UTF-8 decode attempt.
    Other,
}

impl SourceFormat {
    /// Detect format from a filename's extension, case-insensitive.
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, e)| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "txt" => Self::PlainText,
            _ => Self::Other,
        }
    }
}

/// Extract plain text from file bytes.
///
/// Returns the full extracted text, or an empty string when parsing
/// succeeded but the document contains no extractable characters.
pub fn extract(bytes: &[u8], filename: &str) -> Result<String> {
    match SourceFormat::from_filename(filename) {
        SourceFormat::Pdf => extract_pdf(bytes),
        SourceFormat::Docx => extract_docx(bytes),
        SourceFormat::PlainText | SourceFormat::Other => decode_utf8(bytes),
    }
}

/// All pages in order; a page with no text contributes nothing.
fn extract_pdf(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| Error::Extraction(format!("PDF parse failed: {}", e)))
}

/// Paragraph texts from `word/document.xml`, separated by a single space.
fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| Error::Extraction(format!("DOCX archive invalid: {}", e)))?;

    let mut doc_xml = Vec::new();
    {
        let entry = archive
            .by_name("word/document.xml")
            .map_err(|e| Error::Extraction(format!("word/document.xml missing: {}", e)))?;
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut doc_xml)
            .map_err(|e| Error::Extraction(format!("DOCX read failed: {}", e)))?;
    }
    if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(Error::Extraction(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }

    collect_paragraph_text(&doc_xml)
}

/// Walk the document XML collecting `<w:t>` runs; a closed `<w:p>`
/// ends a paragraph and contributes the single-space separator.
fn collect_paragraph_text(xml: &[u8]) -> Result<String> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(quick_xml::events::Event::Text(t)) if in_text_run => {
                out.push_str(t.unescape().unwrap_or_default().as_ref());
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => {
                    if !out.is_empty() && !out.ends_with(' ') {
                        out.push(' ');
                    }
                }
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(Error::Extraction(format!("DOCX XML invalid: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(out.trim_end().to_string())
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|e| Error::Extraction(format!("not valid UTF-8 text: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection_case_insensitive() {
        assert_eq!(SourceFormat::from_filename("contract.PDF"), SourceFormat::Pdf);
        assert_eq!(SourceFormat::from_filename("brief.Docx"), SourceFormat::Docx);
        assert_eq!(SourceFormat::from_filename("notes.txt"), SourceFormat::PlainText);
        assert_eq!(SourceFormat::from_filename("data.csv"), SourceFormat::Other);
        assert_eq!(SourceFormat::from_filename("no_extension"), SourceFormat::Other);
    }

    #[test]
    fn test_txt_verbatim() {
        let text = extract("Article 12. Everyone has rights.".as_bytes(), "law.txt").unwrap();
        assert_eq!(text, "Article 12. Everyone has rights.");
    }

    #[test]
    fn test_unknown_extension_falls_back_to_utf8() {
        let text = extract(b"plain content", "notes.log").unwrap();
        assert_eq!(text, "plain content");
    }

    #[test]
    fn test_invalid_utf8_is_extraction_error() {
        let err = extract(&[0xff, 0xfe, 0x00], "raw.txt").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn test_corrupt_pdf_is_extraction_error() {
        let err = extract(b"not a pdf at all", "statute.pdf").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn test_corrupt_docx_is_extraction_error() {
        let err = extract(b"not a zip archive", "filing.docx").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn test_empty_txt_is_ok_and_empty() {
        let text = extract(b"", "empty.txt").unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn test_docx_paragraphs_joined_with_space() {
        // Minimal OOXML: two paragraphs, each with one text run.
        let doc_xml = r#"<?xml version="1.0"?>
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
              <w:body>
                <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>
                <w:p><w:r><w:t>Second paragraph.</w:t></w:r></w:p>
              </w:body>
            </w:document>"#;

        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file::<_, ()>("word/document.xml", Default::default())
                .unwrap();
            std::io::Write::write_all(&mut writer, doc_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }

        let text = extract(cursor.get_ref(), "pleading.docx").unwrap();
        assert_eq!(text, "First paragraph. Second paragraph.");
    }
}
