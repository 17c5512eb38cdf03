//! PDF file parser implementation.

use crate::text::page_text;
use lopdf::{Dictionary, Document, Object, ObjectId};
use rsvp_core::{Error, ExtractedDocument, ExtractedPage, Result, SourceFormat};
use std::io::Read;

/// Parser for PDF files.
pub struct PdfParser;

impl PdfParser {
    /// Create a new PDF parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PDF from a reader.
    pub fn parse<R: Read>(&self, mut reader: R, filename: &str) -> Result<ExtractedDocument> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.parse_bytes(&bytes, filename)
    }

    /// Parse a PDF held in memory.
    pub fn parse_bytes(&self, bytes: &[u8], filename: &str) -> Result<ExtractedDocument> {
        if SourceFormat::from_magic(bytes).is_none() {
            return Err(Error::UnsupportedFormat(format!(
                "{} does not start with a PDF header",
                filename
            )));
        }

        let document = Document::load_mem(bytes)
            .map_err(|e| Error::PdfError(format!("Failed to load {}: {}", filename, e)))?;

        if document.is_encrypted() {
            return Err(Error::Encrypted(filename.to_string()));
        }

        let mut extracted = ExtractedDocument::new(filename, SourceFormat::Pdf);
        extracted.title = self.read_title(&document);

        // get_pages is keyed by page number, so iteration is in reading order
        for (number, page_id) in document.get_pages() {
            let page = self.extract_page(&document, number, page_id);
            extracted.add_page(page);
        }

        log::debug!(
            "Extracted {} pages from {} ({} blank)",
            extracted.page_count(),
            filename,
            extracted.pages.iter().filter(|p| p.is_blank()).count()
        );

        Ok(extracted)
    }

    /// Extract the text of one page. Failures yield an empty page so one
    /// damaged page does not lose the rest of the document.
    fn extract_page(&self, document: &Document, number: u32, page_id: ObjectId) -> ExtractedPage {
        match page_text(document, page_id) {
            Ok(text) => ExtractedPage::new(number as usize, text),
            Err(e) => {
                log::warn!("Failed to extract text from page {} (continuing): {}", number, e);
                ExtractedPage::new(number as usize, String::new())
            }
        }
    }

    /// Read `/Title` from the document information dictionary.
    fn read_title(&self, document: &Document) -> Option<String> {
        let info: &Dictionary = match document.trailer.get(b"Info").ok()? {
            Object::Reference(id) => document.get_dictionary(*id).ok()?,
            Object::Dictionary(dict) => dict,
            _ => return None,
        };

        match info.get(b"Title").ok()? {
            Object::String(bytes, _) => {
                let title = decode_text_string(bytes);
                let title = title.trim();
                (!title.is_empty()).then(|| title.to_string())
            }
            _ => None,
        }
    }
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a PDF text string.
///
/// Strings starting with the `FE FF` byte order mark are UTF-16BE; anything
/// else is PDFDocEncoding, which matches Latin-1 for printable text.
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_latin1_title() {
        assert_eq!(decode_text_string(b"Moby Dick"), "Moby Dick");
        assert_eq!(decode_text_string(b"Caf\xE9"), "Caf\u{e9}");
    }

    #[test]
    fn test_decode_utf16_title() {
        let bytes = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69, 0x4F, 0x60, 0x59, 0x7D];
        assert_eq!(decode_text_string(&bytes), "Hi你好");
    }

    #[test]
    fn test_decode_utf16_odd_trailing_byte_ignored() {
        let bytes = [0xFE, 0xFF, 0x00, 0x41, 0x00];
        assert_eq!(decode_text_string(&bytes), "A");
    }

    #[test]
    fn test_rejects_non_pdf_bytes() {
        let parser = PdfParser::new();
        let err = parser.parse_bytes(b"PK\x03\x04 not a pdf", "book.epub").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_rejects_truncated_pdf() {
        let parser = PdfParser::new();
        let err = parser.parse_bytes(b"%PDF-1.7\n", "broken.pdf").unwrap_err();
        assert!(matches!(err, Error::PdfError(_)));
    }
}
