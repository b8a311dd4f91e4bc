//! Input processing module
//! Handles file detection, text extraction, and input management

pub mod file_detector;
pub mod manager;
pub mod text_extractor;

use crate::error::Result;
use std::path::Path;
use text_extractor::{PdfExtractor, TextExtractor};

/// Extract normalized plain text from a PDF file.
///
/// An empty string means the PDF has no extractable text; callers skip such
/// documents instead of treating them as failures.
pub async fn extract(path: &Path) -> Result<String> {
    PdfExtractor::default().extract(path).await
}
