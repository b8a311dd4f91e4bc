//! Text extraction from various file formats

use crate::error::{Result, ResumeMatcherError};
use crate::processing::text_processor::TextProcessor;
use log::debug;
use pulldown_cmark::{Event, Parser, Tag};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Extracts page text from PDFs and normalizes it.
#[derive(Default)]
pub struct PdfExtractor {
    processor: TextProcessor,
}

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)
            .await
            .map_err(|e| ResumeMatcherError::document_read(path, e.to_string()))?;

        self.extract_from_bytes(&bytes, path)
    }
}

impl PdfExtractor {
    /// Extract from an in-memory PDF. `path` is only used for error reporting.
    pub fn extract_from_bytes(&self, bytes: &[u8], path: &Path) -> Result<String> {
        let pages = Self::pages_from_bytes(bytes, path)?;
        debug!("Extracted {} page(s) from {}", pages.len(), path.display());

        let mut full_text = String::new();
        for page in &pages {
            full_text.push_str(page);
            full_text.push('\n');
        }

        Ok(self.processor.normalize(&full_text))
    }

    fn pages_from_bytes(bytes: &[u8], path: &Path) -> Result<Vec<String>> {
        // pdf-extract panics on some malformed inputs instead of returning an error.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }));

        match outcome {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(ResumeMatcherError::document_read(
                path,
                format!("not a valid PDF: {}", e),
            )),
            Err(_) => Err(ResumeMatcherError::document_read(
                path,
                "PDF parser aborted on malformed input",
            )),
        }
    }
}

#[derive(Default)]
pub struct PlainTextExtractor {
    processor: TextProcessor,
}

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ResumeMatcherError::document_read(path, e.to_string()))?;
        Ok(self.processor.normalize(&content))
    }
}

/// Renders Markdown to plain text, one line per block element.
#[derive(Default)]
pub struct MarkdownExtractor {
    processor: TextProcessor,
}

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path)
            .await
            .map_err(|e| ResumeMatcherError::document_read(path, e.to_string()))?;
        Ok(self.processor.normalize(&Self::markdown_to_text(&markdown_content)))
    }
}

impl MarkdownExtractor {
    pub fn markdown_to_text(markdown: &str) -> String {
        let mut text = String::new();

        for event in Parser::new(markdown) {
            match event {
                Event::Text(t) | Event::Code(t) => text.push_str(&t),
                Event::SoftBreak => text.push(' '),
                Event::HardBreak | Event::Rule => text.push('\n'),
                Event::End(Tag::Paragraph)
                | Event::End(Tag::Heading(..))
                | Event::End(Tag::Item)
                | Event::End(Tag::CodeBlock(_))
                | Event::End(Tag::TableRow) => text.push('\n'),
                Event::End(Tag::TableCell) => text.push(' '),
                _ => {}
            }
        }

        text
    }
}
