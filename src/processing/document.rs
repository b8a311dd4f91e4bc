//! Extracted documents

use crate::processing::text_processor::TextProcessor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extracted text plus the name it came from. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    content: String,
    document_type: DocumentType,
    metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Resume,
    JobDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub word_count: usize,
    pub character_count: usize,
    pub extracted_at: DateTime<Utc>,
}

impl Document {
    pub fn new(source: impl Into<String>, content: String, document_type: DocumentType) -> Self {
        let metadata = DocumentMetadata {
            word_count: TextProcessor::word_count(&content),
            character_count: content.chars().count(),
            extracted_at: Utc::now(),
        };

        Self {
            source: source.into(),
            path: None,
            content,
            document_type,
            metadata,
        }
    }

    /// A resume shown by its file name. The canonical path is kept to tell
    /// apart files that share a name.
    pub fn resume_from_path(path: &Path, content: String) -> Self {
        let mut document = Self::new(source_name(path), content, DocumentType::Resume);
        document.path = Some(std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()));
        document
    }

    pub fn job_description(content: String) -> Self {
        Self::new("job-description", content, DocumentType::JobDescription)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Documents without text are skipped rather than scored.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
