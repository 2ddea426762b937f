//! Input manager for handling different file types

use crate::error::{CheckerError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PageExtractor, PdfExtractor, PlainTextExtractor};
use crate::processing::document::Page;
use log::info;
use std::collections::HashMap;
use std::path::Path;

pub struct InputManager {
    cache: HashMap<String, Vec<Page>>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Extract the ordered pages of a PDF, plain text or Markdown file.
    pub async fn extract_pages(&mut self, path: &Path) -> Result<Vec<Page>> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached_pages) = self.cache.get(&path_str) {
                info!("Using cached pages for: {}", path.display());
                return Ok(cached_pages.clone());
            }
        }

        if !path.exists() {
            return Err(CheckerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let pages = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting pages from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Unknown => {
                return Err(CheckerError::UnsupportedFormat(format!(
                    "Unsupported file type for: {}",
                    path.display()
                )));
            }
        };

        info!("Extracted {} page(s) from {}", pages.len(), path.display());

        if self.enable_cache {
            self.cache.insert(path_str, pages.clone());
        }

        Ok(pages)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
