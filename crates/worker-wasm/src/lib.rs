//! WASM-compatible wrapper for PDF word extraction.
//!
//! This crate exposes extraction, bilingual pairing and pacing to JavaScript
//! so a web front-end can run the reader entirely in the browser.

use rsvp_core::{bilingual, player, PairedText, TextTokenizer};
use rsvp_pdf::PdfParser;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of extracting a document.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Metadata title, or one derived from the filename.
    pub title: String,
    /// Number of pages in the source.
    pub page_count: usize,
    /// Ordered word sequence.
    pub words: Vec<String>,
    /// Whether the words use two scripts and can be paired.
    pub bilingual: bool,
    /// Index-aligned pairs when `bilingual` is true.
    pub pairs: Option<PairedText>,
    /// Warning message if extraction partially failed.
    pub warning: Option<String>,
}

/// Extract the word sequence from a PDF.
///
/// # Arguments
/// * `data` - The raw bytes of the PDF file
/// * `filename` - The original filename (used for the fallback title)
///
/// # Returns
/// A JavaScript object with the extraction result, or throws on error.
#[wasm_bindgen]
pub fn extract_document(data: &[u8], filename: &str) -> Result<JsValue, JsValue> {
    let result = extract_document_impl(data, filename).map_err(|e| JsValue::from_str(&e))?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn extract_document_impl(data: &[u8], filename: &str) -> Result<ExtractionResult, String> {
    let document = PdfParser::new()
        .parse_bytes(data, filename)
        .map_err(|e| e.to_string())?;

    let words = TextTokenizer::new().tokenize_pages(&document.pages);
    if words.is_empty() {
        return Err(format!("No readable text found in {}", filename));
    }

    let blank_pages = document.pages.iter().filter(|p| p.is_blank()).count();
    let warning = (blank_pages > 0).then(|| {
        format!(
            "{} of {} pages had no extractable text",
            blank_pages,
            document.page_count()
        )
    });

    let pairs = bilingual::pair(&words);

    Ok(ExtractionResult {
        title: document.display_title(),
        page_count: document.page_count(),
        bilingual: pairs.is_some(),
        pairs,
        words,
        warning,
    })
}

/// Pair an array of words by script.
///
/// # Returns
/// The paired text, or `undefined` when the words use a single script.
#[wasm_bindgen]
pub fn pair_words(words: JsValue) -> Result<JsValue, JsValue> {
    let words: Vec<String> = serde_wasm_bindgen::from_value(words)
        .map_err(|e| JsValue::from_str(&format!("Invalid words array: {}", e)))?;

    let paired = bilingual::pair(&words);

    serde_wasm_bindgen::to_value(&paired)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Milliseconds each word stays on screen at `wpm`, after clamping the rate.
#[wasm_bindgen]
pub fn interval_ms(wpm: u32) -> u32 {
    player::interval_for(wpm).as_millis() as u32
}
