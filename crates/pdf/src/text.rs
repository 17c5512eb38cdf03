//! Page text reconstruction from content stream operators.
//!
//! Text positioning operators become line breaks or spaces so that words on
//! separate lines stay separate and line-end hyphens reach the tokenizer.

use lopdf::{Document, Encoding, Object, ObjectId};
use std::collections::BTreeMap;

/// `TJ` adjustments (thousandths of an em) below this are a word gap.
const TJ_WORD_GAP: f32 = -100.0;

/// Extract the text of one page, in content stream order.
pub fn page_text(document: &Document, page_id: ObjectId) -> lopdf::Result<String> {
    let encodings = font_encodings(document, page_id)?;
    let content = document.get_and_decode_page_content(page_id)?;

    let mut text = PageText::default();
    let mut encoding: Option<&Encoding> = None;

    for operation in &content.operations {
        let operands = &operation.operands;
        match operation.operator.as_str() {
            "Tf" => {
                encoding = operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .and_then(|name| encodings.get(name));
            }
            "Td" | "TD" => {
                let ty = operands.get(1).and_then(|v| v.as_float().ok()).unwrap_or(0.0);
                if ty == 0.0 {
                    text.space();
                } else {
                    text.line_break();
                }
            }
            "Tm" => {
                let ty = operands.get(5).and_then(|v| v.as_float().ok());
                text.move_to(ty);
            }
            "T*" | "ET" => text.line_break(),
            "Tj" => text.show(encoding, operands),
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    text.show(encoding, items);
                }
            }
            "'" => {
                text.line_break();
                text.show(encoding, operands);
            }
            "\"" => {
                text.line_break();
                text.show(encoding, operands.get(2..).unwrap_or_default());
            }
            _ => {}
        }
    }

    Ok(text.finish())
}

/// Encodings of the fonts a page uses, keyed by resource name.
fn font_encodings(
    document: &Document,
    page_id: ObjectId,
) -> lopdf::Result<BTreeMap<Vec<u8>, Encoding<'_>>> {
    let mut encodings = BTreeMap::new();
    for (name, font) in document.get_page_fonts(page_id)? {
        match font.get_font_encoding(document) {
            Ok(encoding) => {
                encodings.insert(name, encoding);
            }
            Err(e) => log::warn!(
                "Skipping font {} with unreadable encoding: {}",
                String::from_utf8_lossy(&name),
                e
            ),
        }
    }
    Ok(encodings)
}

/// Text accumulated for a page.
#[derive(Debug, Default)]
struct PageText {
    text: String,
    /// Vertical position of the last `Tm`.
    last_y: Option<f32>,
}

impl PageText {
    fn show(&mut self, encoding: Option<&Encoding>, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => match encoding {
                    Some(encoding) => match Document::decode_text(encoding, bytes) {
                        Ok(decoded) => self.text.push_str(&decoded),
                        Err(e) => log::debug!("Could not decode text string: {}", e),
                    },
                    None => log::debug!("Text shown without a known font"),
                },
                Object::Integer(_) | Object::Real(_) => {
                    if operand.as_float().is_ok_and(|gap| gap < TJ_WORD_GAP) {
                        self.space();
                    }
                }
                _ => {}
            }
        }
    }

    fn move_to(&mut self, y: Option<f32>) {
        match (self.last_y, y) {
            (Some(last), Some(y)) if last == y => self.space(),
            _ => self.line_break(),
        }
        self.last_y = y;
    }

    fn space(&mut self) {
        if !self.text.is_empty() && !self.text.ends_with(char::is_whitespace) {
            self.text.push(' ');
        }
    }

    fn line_break(&mut self) {
        let trimmed = self.text.trim_end_matches(' ').len();
        self.text.truncate(trimmed);
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
    }

    fn finish(mut self) -> String {
        self.line_break();
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_break_replaces_trailing_space() {
        let mut text = PageText::default();
        text.text.push_str("exam- ");
        text.line_break();
        text.line_break();
        assert_eq!(text.finish(), "exam-\n");
    }

    #[test]
    fn test_no_leading_separators() {
        let mut text = PageText::default();
        text.space();
        text.line_break();
        assert_eq!(text.finish(), "");
    }

    fn utf16(text: &str) -> Object {
        let bytes = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        Object::String(bytes, lopdf::StringFormat::Hexadecimal)
    }

    #[test]
    fn test_tj_gap_becomes_space() {
        let mut text = PageText::default();
        let encoding = Encoding::SimpleEncoding("UniGB-UCS2-H");
        text.show(
            Some(&encoding),
            &[
                utf16("Call"),
                Object::Integer(-250),
                utf16("me"),
                Object::Real(-20.0),
                utf16("!"),
            ],
        );
        assert_eq!(text.finish(), "Call me!\n");
    }

    #[test]
    fn test_text_without_font_is_skipped() {
        let mut text = PageText::default();
        text.show(None, &[Object::string_literal("lost")]);
        assert_eq!(text.finish(), "");
    }

    #[test]
    fn test_tm_on_same_baseline_is_a_space() {
        let mut text = PageText::default();
        text.move_to(Some(700.0));
        text.text.push_str("left");
        text.move_to(Some(700.0));
        text.text.push_str("right");
        text.move_to(Some(680.0));
        text.text.push_str("below");
        assert_eq!(text.finish(), "left right\nbelow\n");
    }
}
