//! Page extraction from various file formats

use crate::error::{CheckerError, Result};
use crate::processing::document::Page;
use lopdf::Document;
use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};
use pulldown_cmark::{Event, Parser, Tag};
use std::path::Path;
use tokio::fs;

/// Produces the ordered pages of one document.
pub trait PageExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<Vec<Page>>> + Send;
}

/// Identifier used for pages of a file: its file name, or the full path if it has none.
pub fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub struct PdfExtractor;

impl PageExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<Page>> {
        let bytes = fs::read(path).await?;

        let doc = Document::load_mem(&bytes).map_err(|e| pdf_error(path, e))?;
        let mut output = PageTextOutput::default();
        pdf_extract::output_doc(&doc, &mut output).map_err(|e| pdf_error(path, e))?;

        let document_id = document_id(path);
        Ok(output
            .pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| Page::new(document_id.as_str(), (i + 1) as u32, text))
            .collect())
    }
}

fn pdf_error(path: &Path, e: impl std::fmt::Display) -> CheckerError {
    CheckerError::PdfExtraction(format!("Failed to extract text from PDF '{}': {}", path.display(), e))
}

/// Plain text layout like `pdf_extract::PlainTextOutput`, but one buffer per page.
#[derive(Default)]
struct PageTextOutput {
    pages: Vec<String>,
    page_height: f64,
    last_end: f64,
    last_y: f64,
    first_char: bool,
}

impl PageTextOutput {
    fn current(&mut self) -> &mut String {
        if self.pages.is_empty() {
            self.pages.push(String::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }
}

impl OutputDev for PageTextOutput {
    fn begin_page(
        &mut self,
        _page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.pages.push(String::new());
        self.page_height = media_box.ury - media_box.lly;
        self.last_end = 100000.0;
        self.last_y = 0.0;
        self.first_char = false;
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        text: &str,
    ) -> std::result::Result<(), OutputError> {
        // Page space is flipped so y grows downwards
        let (x, y) = (trm.m31, self.page_height - trm.m32);
        let scaled_x = font_size * (trm.m11 + trm.m21);
        let scaled_y = font_size * (trm.m12 + trm.m22);
        let scaled_font_size = (scaled_x * scaled_y).abs().sqrt();

        if self.first_char {
            let dy = (y - self.last_y).abs();
            let (last_end, buffer_empty) = (self.last_end, self.current().is_empty());
            if !buffer_empty && (dy > scaled_font_size * 1.5 || (x < last_end && dy > scaled_font_size * 0.5)) {
                self.current().push('\n');
            } else if x > last_end + scaled_font_size * 0.1 {
                self.current().push(' ');
            }
        }

        self.current().push_str(text);
        self.first_char = false;
        self.last_y = y;
        self.last_end = x + width * scaled_font_size;
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        self.first_char = true;
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }
}

/// Plain text; invalid UTF-8 is replaced rather than rejected. Form feeds mark page breaks.
pub struct PlainTextExtractor;

impl PageExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<Page>> {
        let bytes = fs::read(path).await?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(Page::split_pages(&document_id(path), &text))
    }
}

pub struct MarkdownExtractor;

impl PageExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<Page>> {
        let bytes = fs::read(path).await?;
        let markdown_content = String::from_utf8_lossy(&bytes);
        let text = markdown_to_text(&markdown_content);
        Ok(Page::split_pages(&document_id(path), &text))
    }
}

/// Strip markup, keeping one block per line.
pub fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak | Event::Rule => text.push('\n'),
            Event::End(Tag::Paragraph)
            | Event::End(Tag::Heading(..))
            | Event::End(Tag::Item)
            | Event::End(Tag::CodeBlock(_))
            | Event::End(Tag::TableRow)
            | Event::End(Tag::TableHead) => text.push('\n'),
            Event::End(Tag::TableCell) => text.push(' '),
            _ => {}
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
