//! Word tokenization for extracted document text.
//!
//! Handles Unicode normalization, removal of invisible characters, rejoining
//! words hyphenated across line breaks, and splitting into display words.

use crate::ExtractedPage;
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex matching a word broken across a line break by a trailing hyphen.
///
/// Only joins when the continuation starts lowercase, so "Jean-\nPaul" and
/// list dashes are left alone.
static LINE_BREAK_HYPHEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\p{L})-[ \t]*\n[ \t]*(\p{Ll})").unwrap());

/// Characters that render as nothing but would otherwise split or pollute words.
const INVISIBLE_CHARS: &[char] = &[
    '\u{00AD}', // Soft hyphen
    '\u{200B}', '\u{200C}', '\u{200D}', // Zero-width space and joiners
    '\u{FEFF}', // Byte order mark
];

/// Splits extracted text into the ordered word sequence shown during playback.
#[derive(Debug, Clone)]
pub struct TextTokenizer {
    /// Whether to rejoin words hyphenated at a line break.
    join_hyphenated: bool,

    /// Whether to keep tokens that contain no letters or digits.
    keep_symbols: bool,
}

impl Default for TextTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextTokenizer {
    /// Create a new tokenizer with default settings.
    pub fn new() -> Self {
        Self {
            join_hyphenated: true,
            keep_symbols: false,
        }
    }

    /// Set whether to rejoin words hyphenated across line breaks.
    pub fn with_join_hyphenated(mut self, join: bool) -> Self {
        self.join_hyphenated = join;
        self
    }

    /// Set whether to keep symbol-only tokens such as bullets and dashes.
    pub fn with_keep_symbols(mut self, keep: bool) -> Self {
        self.keep_symbols = keep;
        self
    }

    /// Clean raw extracted text without splitting it.
    ///
    /// - Normalizes line endings to `\n`
    /// - Applies NFC normalization
    /// - Strips invisible characters
    /// - Rejoins line-break hyphenation (if enabled)
    pub fn clean(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");

        let mut cleaned: String = text
            .as_str()
            .nfc()
            .filter(|c| !INVISIBLE_CHARS.contains(c))
            .collect();

        if self.join_hyphenated {
            cleaned = LINE_BREAK_HYPHEN_REGEX
                .replace_all(&cleaned, "$1$2")
                .into_owned();
        }

        cleaned
    }

    /// Split text into words.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.clean(text)
            .split_whitespace()
            .filter(|word| self.keep_symbols || word.chars().any(char::is_alphanumeric))
            .map(str::to_string)
            .collect()
    }

    /// Tokenize all pages of a document in page order.
    ///
    /// Pages are joined with line breaks so a word hyphenated at the bottom
    /// of one page joins with the first word of the next.
    pub fn tokenize_pages(&self, pages: &[ExtractedPage]) -> Vec<String> {
        let text = pages
            .iter()
            .map(|p| p.text.trim_end())
            .collect::<Vec<_>>()
            .join("\n");

        let words = self.tokenize(&text);
        log::debug!("Tokenized {} pages into {} words", pages.len(), words.len());
        words
    }
}
