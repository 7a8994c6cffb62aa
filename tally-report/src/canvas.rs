//! Minimal page builder on top of `lopdf`, enough for text reports.
//!
//! Coordinates are integer points on US Letter pages, origin bottom-left.
//! Only the standard Helvetica faces are used, so no font program is embedded.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::io::Write;
use std::path::Path;

use crate::error::ReportError;

pub const PAGE_WIDTH: i64 = 612;
pub const PAGE_HEIGHT: i64 = 792;
pub const MARGIN: i64 = 56;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }
}

/// Maps text onto WinAnsi bytes. Characters outside the encoding are
/// transliterated where a common spelling exists, `?` otherwise.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{20}'..='\u{7e}' => out.push(ch as u8),
            '\u{a0}'..='\u{ff}' => out.push(ch as u32 as u8),
            '€' => out.push(0x80),
            '•' => out.push(0x95),
            '–' => out.push(0x96),
            '—' => out.push(0x97),
            '‘' => out.push(0x91),
            '’' => out.push(0x92),
            '“' => out.push(0x93),
            '”' => out.push(0x94),
            '₹' => out.extend_from_slice(b"Rs."),
            '\t' => out.push(b' '),
            _ => out.push(b'?'),
        }
    }
    out
}

/// Pages of drawing operations, turned into a document on [`Canvas::finish`].
#[derive(Debug, Default)]
pub struct Canvas {
    pages: Vec<Vec<Operation>>,
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
        }
    }

    pub fn new_page(&mut self) {
        self.pages.push(Vec::new());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Draws one string with its baseline starting at `(x, y)`.
    ///
    /// Each call is its own text object, so text extraction sees every call
    /// as a separate line.
    pub fn text(&mut self, font: Font, size: i64, x: i64, y: i64, text: &str) {
        let ops = self.current();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.resource_name().into()), size.into()],
        ));
        ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    /// Horizontal rule from `x0` to `x1`.
    pub fn rule(&mut self, x0: i64, x1: i64, y: i64) {
        let ops = self.current();
        ops.push(Operation::new("w", vec![1.into()]));
        ops.push(Operation::new("m", vec![x0.into(), y.into()]));
        ops.push(Operation::new("l", vec![x1.into(), y.into()]));
        ops.push(Operation::new("S", vec![]));
    }

    pub fn finish(self) -> Result<Document, ReportError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = add_font(&mut doc, Font::Regular);
        let bold = add_font(&mut doc, Font::Bold);
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                Font::Regular.resource_name() => regular,
                Font::Bold.resource_name() => bold,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        Ok(doc)
    }

    pub fn to_bytes(self) -> Result<Vec<u8>, ReportError> {
        let mut doc = self.finish()?;
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    pub fn save(self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let bytes = self.to_bytes()?;
        let mut file = std::fs::File::create(path.as_ref())?;
        file.write_all(&bytes)?;
        Ok(())
    }
}

fn add_font(doc: &mut Document, font: Font) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_ansi_transliteration() {
        assert_eq!(to_win_ansi("Total ₹1,234.56"), b"Total Rs.1,234.56".to_vec());
        assert_eq!(to_win_ansi("€5"), vec![0x80, b'5']);
        assert_eq!(to_win_ansi("ü"), vec![0xFC]);
        assert_eq!(to_win_ansi("日"), b"?".to_vec());
    }

    #[test]
    fn test_canvas_round_trips_through_lopdf() {
        let mut canvas = Canvas::new();
        canvas.text(Font::Bold, 14, MARGIN, 700, "Hello");
        canvas.new_page();
        canvas.text(Font::Regular, 10, MARGIN, 700, "World");
        assert_eq!(canvas.page_count(), 2);

        let bytes = canvas.to_bytes().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
        let text = doc.extract_text(&[1]).unwrap();
        assert!(text.contains("Hello"));
        let text = doc.extract_text(&[2]).unwrap();
        assert!(text.contains("World"));
    }
}
