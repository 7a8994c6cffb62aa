//! Positioned text runs from a page's content stream.
//!
//! Only the text state needed to place runs on the page is tracked: the
//! graphics matrix stack (`q`, `Q`, `cm`), the text and line matrices (`BT`,
//! `Td`, `TD`, `Tm`, `T*`, `TL`), the font (`Tf`) and the spacing operators
//! (`Tc`, `Tw`, `Tz`). Glyph widths are not read from font programs; a run's
//! width is estimated from its character count, which is enough to find the
//! gaps between columns.

use lopdf::content::Operation;
use lopdf::{Document, Object};
use std::collections::BTreeMap;

/// Kerning in a `TJ` array beyond this many thousandths of an em reads as a
/// word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// One shown string, placed in page space (origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub text: String,
    /// Left edge of the run.
    pub x: f32,
    /// Baseline.
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
}

impl TextBox {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f32, ty: f32) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn horizontal_scale(&self) -> f32 {
        let [a, b, ..] = self.0;
        (a * a + b * b).sqrt()
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        if operands.len() < 6 {
            return None;
        }
        let mut m = [0.0; 6];
        for (slot, obj) in m.iter_mut().zip(operands) {
            *slot = number(obj)?;
        }
        Some(Matrix(m))
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn operand(operands: &[Object], idx: usize) -> Option<f32> {
    operands.get(idx).and_then(number)
}

/// Decodes a PDF string operand without font information: UTF-16BE when it
/// carries a BOM, WinAnsi otherwise.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units)
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
    }
    Document::decode_text(Some("WinAnsiEncoding"), bytes)
}

/// Encoding of every font resource on a page, keyed by resource name.
#[derive(Debug, Clone, Default)]
pub struct PageFonts {
    encodings: BTreeMap<Vec<u8>, String>,
}

impl PageFonts {
    pub fn insert(&mut self, name: impl Into<Vec<u8>>, encoding: &str) {
        self.encodings.insert(name.into(), encoding.to_string());
    }

    /// Decodes `bytes` shown in `font`. Simple encodings go through lopdf's
    /// tables, the same ones text extraction uses; unknown fonts and
    /// encodings lopdf cannot map (e.g. `Identity-H`) fall back to
    /// [`decode_pdf_string`].
    pub fn decode(&self, font: Option<&[u8]>, bytes: &[u8]) -> String {
        if bytes.starts_with(&[0xFE, 0xFF]) {
            return decode_pdf_string(bytes);
        }
        let encoding = font
            .and_then(|name| self.encodings.get(name))
            .map(String::as_str);
        match encoding {
            Some(
                enc @ ("StandardEncoding" | "MacRomanEncoding" | "MacExpertEncoding"
                | "WinAnsiEncoding" | "UniGB-UCS2-H"),
            ) => Document::decode_text(Some(enc), bytes),
            _ => decode_pdf_string(bytes),
        }
    }
}

/// The parts of the graphics state saved by `q` and restored by `Q`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font: Option<Vec<u8>>,
    font_size: f32,
    leading: f32,
    char_spacing: f32,
    word_spacing: f32,
    /// `Tz` as a fraction (100% is 1.0).
    horizontal_scaling: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            font: None,
            font_size: 0.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
        }
    }
}

struct TextState<'a> {
    gs: GraphicsState,
    stack: Vec<GraphicsState>,
    tm: Matrix,
    tlm: Matrix,
    fonts: &'a PageFonts,
    glyph_width_ratio: f32,
}

impl<'a> TextState<'a> {
    fn new(fonts: &'a PageFonts, glyph_width_ratio: f32) -> Self {
        Self {
            gs: GraphicsState::default(),
            stack: Vec::new(),
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            fonts,
            glyph_width_ratio,
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translate(tx, ty).then(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.gs.leading);
    }

    fn advance(&mut self, text_space_dx: f32) {
        self.tm = Matrix::translate(text_space_dx, 0.0).then(&self.tm);
    }

    /// Estimated advance of `text` in text space, spacing operators included.
    fn glyph_advance(&self, text: &str) -> f32 {
        let glyph = self.gs.font_size * self.glyph_width_ratio;
        let unscaled: f32 = text
            .chars()
            .map(|ch| {
                let word = if ch == ' ' { self.gs.word_spacing } else { 0.0 };
                glyph + self.gs.char_spacing + word
            })
            .sum();
        unscaled * self.gs.horizontal_scaling
    }

    /// Shows `parts` (strings and `TJ` kerning numbers) as one run.
    fn show(&mut self, parts: &[Object]) -> Option<TextBox> {
        let start = self.tm.then(&self.gs.ctm);
        let mut text = String::new();
        let mut advance = 0.0;

        for part in parts {
            match part {
                Object::String(bytes, _) => {
                    let piece = self.fonts.decode(self.gs.font.as_deref(), bytes);
                    let dx = self.glyph_advance(&piece);
                    self.advance(dx);
                    advance += dx;
                    text.push_str(&piece);
                }
                other => {
                    if let Some(kern) = number(other) {
                        let dx = -kern * self.gs.font_size / 1000.0 * self.gs.horizontal_scaling;
                        self.advance(dx);
                        advance += dx;
                        if kern <= -TJ_SPACE_THRESHOLD && !text.is_empty() && !text.ends_with(' ') {
                            text.push(' ');
                        }
                    }
                }
            }
        }

        if text.trim().is_empty() {
            return None;
        }

        let scale = start.horizontal_scale();
        let [.., x, y] = start.0;
        Some(TextBox {
            text,
            x,
            y,
            width: advance * scale,
            font_size: (self.gs.font_size * scale).abs(),
        })
    }
}

/// Interprets content-stream operators into positioned text runs, in
/// content-stream order. Strings are decoded through `fonts`.
pub fn layout_text(
    operations: &[Operation],
    fonts: &PageFonts,
    glyph_width_ratio: f32,
) -> Vec<TextBox> {
    let mut state = TextState::new(fonts, glyph_width_ratio);
    let mut boxes = Vec::new();

    for op in operations {
        let operands = op.operands.as_slice();
        let shown = match op.operator.as_str() {
            "q" => {
                state.stack.push(state.gs.clone());
                None
            }
            "Q" => {
                if let Some(gs) = state.stack.pop() {
                    state.gs = gs;
                }
                None
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    state.gs.ctm = m.then(&state.gs.ctm);
                }
                None
            }
            "BT" => {
                state.tm = Matrix::IDENTITY;
                state.tlm = Matrix::IDENTITY;
                None
            }
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    state.gs.font = Some(name.clone());
                }
                if let Some(size) = operand(operands, 1) {
                    state.gs.font_size = size;
                }
                None
            }
            "TL" => {
                if let Some(leading) = operand(operands, 0) {
                    state.gs.leading = leading;
                }
                None
            }
            "Tc" => {
                if let Some(spacing) = operand(operands, 0) {
                    state.gs.char_spacing = spacing;
                }
                None
            }
            "Tw" => {
                if let Some(spacing) = operand(operands, 0) {
                    state.gs.word_spacing = spacing;
                }
                None
            }
            "Tz" => {
                if let Some(percent) = operand(operands, 0) {
                    state.gs.horizontal_scaling = percent / 100.0;
                }
                None
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (operand(operands, 0), operand(operands, 1)) {
                    if op.operator == "TD" {
                        state.gs.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
                None
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    state.tlm = m;
                    state.tm = m;
                }
                None
            }
            "T*" => {
                state.next_line();
                None
            }
            "Tj" => state.show(operands),
            "TJ" => match operands.first() {
                Some(Object::Array(parts)) => state.show(parts),
                _ => None,
            },
            "'" => {
                state.next_line();
                state.show(operands)
            }
            "\"" => {
                if let (Some(aw), Some(ac)) = (operand(operands, 0), operand(operands, 1)) {
                    state.gs.word_spacing = aw;
                    state.gs.char_spacing = ac;
                }
                state.next_line();
                state.show(operands.get(2..).unwrap_or(&[]))
            }
            _ => None,
        };

        if let Some(text_box) = shown {
            boxes.push(text_box);
        }
    }

    boxes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn text(s: &str) -> Object {
        Object::string_literal(s)
    }

    #[test]
    fn test_td_positions_runs() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 10.into()]),
            op("Td", vec![50.into(), 700.into()]),
            op("Tj", vec![text("Date")]),
            op("ET", vec![]),
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 10.into()]),
            op("Td", vec![150.into(), 700.into()]),
            op("Tj", vec![text("Amount")]),
            op("ET", vec![]),
        ];

        let boxes = layout_text(&ops, &PageFonts::default(), 0.5);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].text, "Date");
        assert_eq!((boxes[0].x, boxes[0].y), (50.0, 700.0));
        assert_eq!(boxes[0].width, 20.0);
        assert_eq!(boxes[1].x, 150.0);
        assert_eq!(boxes[1].font_size, 10.0);
    }

    #[test]
    fn test_cm_and_tm_compose() {
        let ops = vec![
            op("q", vec![]),
            op("cm", vec![1.into(), 0.into(), 0.into(), 1.into(), 100.into(), 200.into()]),
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 10.into(), 20.into()]),
            op("Tj", vec![text("Inside")]),
            op("ET", vec![]),
            op("Q", vec![]),
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("Td", vec![10.into(), 20.into()]),
            op("Tj", vec![text("Outside")]),
            op("ET", vec![]),
        ];

        let boxes = layout_text(&ops, &PageFonts::default(), 0.5);
        assert_eq!((boxes[0].x, boxes[0].y), (110.0, 220.0));
        assert_eq!((boxes[1].x, boxes[1].y), (10.0, 20.0));
    }

    #[test]
    fn test_consecutive_tj_advance_and_next_line() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 10.into()]),
            op("TL", vec![12.into()]),
            op("Td", vec![0.into(), 100.into()]),
            op("Tj", vec![text("ab")]),
            op("Tj", vec![text("cd")]),
            op("T*", vec![]),
            op("Tj", vec![text("ef")]),
            op("ET", vec![]),
        ];

        let boxes = layout_text(&ops, &PageFonts::default(), 0.5);
        assert_eq!(boxes[1].x, 10.0);
        assert_eq!((boxes[2].x, boxes[2].y), (0.0, 88.0));
    }

    #[test]
    fn test_tj_array_kerning_inserts_space() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 10.into()]),
            op(
                "TJ",
                vec![Object::Array(vec![text("Gas"), (-300).into(), text("Station")])],
            ),
            op("ET", vec![]),
        ];

        let boxes = layout_text(&ops, &PageFonts::default(), 0.5);
        assert_eq!(boxes[0].text, "Gas Station");
        // 3 + 7 glyphs at 5pt each, plus 3pt of kerning.
        assert!((boxes[0].width - 53.0).abs() < 1e-3);
    }

    #[test]
    fn test_blank_runs_are_skipped() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 10.into()]),
            op("Tj", vec![text("   ")]),
            op("ET", vec![]),
        ];
        assert!(layout_text(&ops, &PageFonts::default(), 0.5).is_empty());
    }

    #[test]
    fn test_spacing_operators_widen_runs() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 10.into()]),
            op("q", vec![]),
            op("Tf", vec!["F1".into(), 20.into()]),
            op("Q", vec![]),
            op("Tc", vec![1.into()]),
            op("Tw", vec![2.into()]),
            op("Tz", vec![50.into()]),
            op("Tj", vec![text("a b")]),
            op("ET", vec![]),
        ];

        let boxes = layout_text(&ops, &PageFonts::default(), 0.5);
        assert_eq!(boxes[0].font_size, 10.0);
        // (3 glyphs x (5 + 1) + 2 for the space) at 50% scaling.
        assert!((boxes[0].width - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_strings_decode_through_current_font() {
        let mut fonts = PageFonts::default();
        fonts.insert("F1", "MacRomanEncoding");
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 10.into()]),
            op("Tj", vec![Object::string_literal(vec![0x8A])]),
            op("Tf", vec!["F9".into(), 10.into()]),
            op("Td", vec![100.into(), 0.into()]),
            op("Tj", vec![Object::string_literal(vec![0x8A])]),
            op("ET", vec![]),
        ];

        let boxes = layout_text(&ops, &fonts, 0.5);
        assert_eq!(boxes[0].text, "ä");
        assert_eq!(boxes[1].text, "Š");
    }

    #[test]
    fn test_winansi_punctuation_without_font() {
        assert_eq!(
            decode_pdf_string(b"Payment \x96 Thank You \x80"),
            "Payment – Thank You €"
        );
    }

    #[test]
    fn test_decode_utf16_with_bom() {
        let bytes = [0xFE, 0xFF, 0x00, 0x41, 0x20, 0xB9];
        assert_eq!(decode_pdf_string(&bytes), "A₹");
        assert_eq!(decode_pdf_string(b"CR"), "CR");
    }
}
