//! Raw text extraction.

use tally_core::{Diagnostic, Outcome};

use crate::document::StatementDocument;

/// Concatenates every page's text in page order.
///
/// A page that cannot be decoded is a hard failure. A document with no
/// printable text at all (typically a scanned, image-only PDF) yields empty
/// text and [`Diagnostic::NoExtractableText`].
pub fn extract_text(doc: &StatementDocument) -> Outcome<String> {
    let pages = doc.page_numbers();
    let mut text = String::new();

    for page in &pages {
        match doc.page_text(*page) {
            Ok(page_text) => {
                text.push_str(&page_text);
                if !page_text.ends_with('\n') {
                    text.push('\n');
                }
            }
            Err(e) => return Outcome::Err(e),
        }
    }

    if text.trim().is_empty() {
        log::warn!(
            "PDF found, but no text could be extracted from {}; it might be an image-based PDF",
            doc.source()
        );
        return Outcome::partial(
            String::new(),
            Diagnostic::NoExtractableText { pages: pages.len() },
        );
    }

    log::debug!(
        "extracted {} characters of text from {} page(s) of {}",
        text.len(),
        pages.len(),
        doc.source()
    );
    Outcome::Ok(text)
}
