//! Domain types for representing extracted document content.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Regex to match common file suffixes that aren't part of a document title.
static FILENAME_SUFFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\s_-]+(final|draft|scanned|scan|print|copy|v\d+)\s*$").unwrap()
});

/// How far into a file a `%PDF-` header may start.
const PDF_HEADER_SEARCH_LIMIT: usize = 1024;

/// Represents an entire document with its extracted page text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Original filename (without path).
    pub filename: String,

    /// Detected format of the source file.
    pub format: SourceFormat,

    /// Title from the document metadata, if present.
    pub title: Option<String>,

    /// Pages in document order.
    pub pages: Vec<ExtractedPage>,
}

impl ExtractedDocument {
    /// Create a new document with the given filename and format.
    pub fn new(filename: impl Into<String>, format: SourceFormat) -> Self {
        Self {
            filename: filename.into(),
            format,
            title: None,
            pages: Vec::new(),
        }
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: ExtractedPage) {
        self.pages.push(page);
    }

    /// Number of pages extracted.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All page text, joined by newlines.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Title to show for this document.
    ///
    /// Prefers the metadata title and falls back to a cleaned-up filename.
    pub fn display_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => title_from_filename(&self.filename),
        }
    }
}

/// Derive a readable title from a filename.
///
/// Removes the extension and trailing suffixes like "final" or "v2", and turns
/// underscores into spaces.
pub fn title_from_filename(filename: &str) -> String {
    let name = filename
        .rsplit_once('.')
        .map(|(name, _)| name)
        .filter(|name| !name.is_empty())
        .unwrap_or(filename);

    let cleaned = FILENAME_SUFFIX_REGEX.replace_all(name, "");
    let title = cleaned
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        filename.to_string()
    } else {
        title
    }
}

/// The format of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    /// Portable Document Format.
    Pdf,
}

impl SourceFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Detect format from file magic bytes.
    ///
    /// Readers accept a `%PDF-` header preceded by some garbage, so the
    /// first kilobyte is searched rather than just the start.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        let window = &bytes[..bytes.len().min(PDF_HEADER_SEARCH_LIMIT)];
        if window.windows(5).any(|w| w == b"%PDF-") {
            return Some(Self::Pdf);
        }
        None
    }
}

/// Text extracted from a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedPage {
    /// 1-based page number.
    pub number: usize,

    /// Page text in content-stream order.
    pub text: String,
}

impl ExtractedPage {
    /// Create a new page.
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// Whether the page has no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(SourceFormat::from_extension("pdf"), Some(SourceFormat::Pdf));
        assert_eq!(SourceFormat::from_extension("PDF"), Some(SourceFormat::Pdf));
        assert_eq!(SourceFormat::from_extension("epub"), None);
    }

    #[test]
    fn test_from_magic() {
        assert_eq!(SourceFormat::from_magic(b"%PDF-1.7\n"), Some(SourceFormat::Pdf));
        assert_eq!(
            SourceFormat::from_magic(b"\xEF\xBB\xBF%PDF-1.4"),
            Some(SourceFormat::Pdf)
        );
        assert_eq!(SourceFormat::from_magic(b"PK\x03\x04"), None);
        assert_eq!(SourceFormat::from_magic(b""), None);
    }

    #[test]
    fn test_title_from_filename() {
        assert_eq!(title_from_filename("Moby Dick.pdf"), "Moby Dick");
        assert_eq!(title_from_filename("moby_dick_final.pdf"), "moby dick");
        assert_eq!(title_from_filename("Thesis - v2.pdf"), "Thesis");
        assert_eq!(title_from_filename("notes"), "notes");
        assert_eq!(title_from_filename(".pdf"), ".pdf");
    }

    #[test]
    fn test_display_title_prefers_metadata() {
        let mut doc = ExtractedDocument::new("scan_0001.pdf", SourceFormat::Pdf);
        assert_eq!(doc.display_title(), "scan 0001");

        doc.title = Some("  ".to_string());
        assert_eq!(doc.display_title(), "scan 0001");

        doc.title = Some("The Odyssey".to_string());
        assert_eq!(doc.display_title(), "The Odyssey");
    }

    #[test]
    fn test_full_text_joins_pages() {
        let mut doc = ExtractedDocument::new("a.pdf", SourceFormat::Pdf);
        doc.add_page(ExtractedPage::new(1, "first page"));
        doc.add_page(ExtractedPage::new(2, "second page"));
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.full_text(), "first page\nsecond page");
    }
}
