use crate::error::{DatasheetError, Result};
use log::debug;
use lopdf::Document;

/// Turns raw document bytes into plain text.
pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// PDF text extraction backed by `lopdf`.
///
/// Pages are read in page-number order and concatenated without separators.
/// Only the final concatenation is trimmed. Any page failure discards the
/// whole result.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let doc = Document::load_mem(bytes).map_err(|e| DatasheetError::extraction(e.to_string()))?;

        let pages = doc.get_pages();
        debug!("PDF loaded with {} page(s)", pages.len());

        let mut text = String::new();
        for page_number in pages.keys() {
            let page_text = doc.extract_text(&[*page_number]).map_err(|e| {
                DatasheetError::extraction(format!("page {}: {}", page_number, e))
            })?;
            text.push_str(&page_text);
        }

        Ok(text.trim().to_string())
    }
}
