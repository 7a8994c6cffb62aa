//! The document handle the pipeline reads from.

use lopdf::Document;
use lopdf::content::{Content, Operation};
use std::path::Path;
use tally_core::StatementError;

use crate::layout::PageFonts;

/// A loaded PDF. Read-only; released when dropped.
#[derive(Debug)]
pub struct StatementDocument {
    inner: Document,
    source: String,
}

impl StatementDocument {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StatementError> {
        let path = path.as_ref();
        let source = path.display().to_string();
        if !path.exists() {
            return Err(StatementError::Open {
                path: source,
                reason: "file not found".to_string(),
            });
        }

        let inner = Document::load(path).map_err(|e| StatementError::Open {
            path: source.clone(),
            reason: e.to_string(),
        })?;
        log::debug!("opened {source} ({} pages)", inner.get_pages().len());
        Ok(Self { inner, source })
    }

    /// Loads a PDF already held in memory (e.g. read from stdin).
    pub fn from_bytes(bytes: &[u8], source: &str) -> Result<Self, StatementError> {
        let inner = Document::load_mem(bytes).map_err(|e| StatementError::Open {
            path: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            inner,
            source: source.to_string(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// 1-based page numbers in page order.
    pub fn page_numbers(&self) -> Vec<u32> {
        self.inner.get_pages().into_keys().collect()
    }

    /// The page's text in content-stream order.
    pub fn page_text(&self, page: u32) -> Result<String, StatementError> {
        self.inner
            .extract_text(&[page])
            .map_err(|e| StatementError::TextExtraction {
                page,
                reason: e.to_string(),
            })
    }

    /// Encodings of the fonts a page's resources declare, inherited ones
    /// included. Unknown pages have none.
    pub fn page_fonts(&self, page: u32) -> PageFonts {
        let mut fonts = PageFonts::default();
        if let Some(page_id) = self.inner.get_pages().get(&page) {
            for (name, font) in self.inner.get_page_fonts(*page_id) {
                fonts.insert(name, font.get_font_encoding());
            }
        }
        fonts
    }

    /// The decoded content-stream operators of one page.
    pub fn page_operations(&self, page: u32) -> Result<Vec<Operation>, StatementError> {
        let page_id = *self.inner.get_pages().get(&page).ok_or_else(|| {
            StatementError::TableDetection(format!("page {page} not found"))
        })?;
        let data = self
            .inner
            .get_page_content(page_id)
            .map_err(|e| StatementError::TableDetection(format!("page {page}: {e}")))?;
        let content = Content::decode(&data)
            .map_err(|e| StatementError::TableDetection(format!("page {page}: {e}")))?;
        Ok(content.operations)
    }
}
