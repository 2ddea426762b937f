//! Page structures shared by extraction and the matching pipeline

use serde::{Deserialize, Serialize};

/// One page of extracted text, as handed over by an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub document_id: String,
    /// 1-based page number within the source document.
    pub page_number: u32,
    pub raw_text: String,
}

/// A page after normalization. Pages with no text left are excluded from matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPage {
    pub page_number: u32,
    pub text: String,
}

impl Page {
    pub fn new(document_id: impl Into<String>, page_number: u32, raw_text: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            page_number,
            raw_text: raw_text.into(),
        }
    }

    /// Build a page from raw bytes. Invalid UTF-8 sequences become U+FFFD instead of failing.
    pub fn from_bytes(document_id: impl Into<String>, page_number: u32, bytes: &[u8]) -> Self {
        Self::new(document_id, page_number, String::from_utf8_lossy(bytes).into_owned())
    }

    /// Split a whole-document string into pages on form feed characters.
    /// Text without form feeds becomes a single page.
    pub fn split_pages(document_id: &str, text: &str) -> Vec<Page> {
        text.split('\x0C')
            .enumerate()
            .map(|(i, page_text)| Page::new(document_id, (i + 1) as u32, page_text))
            .collect()
    }
}

impl NormalizedPage {
    pub fn is_excluded(&self) -> bool {
        self.text.is_empty()
    }
}
