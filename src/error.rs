//! Error handling for the resume matcher

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeMatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not a readable, valid document. Callers skip the
    /// document and carry on with the rest of the batch.
    #[error("Failed to read document '{}': {reason}", path.display())]
    DocumentRead { path: PathBuf, reason: String },

    /// The embedding backend failed. Not retried here.
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, ResumeMatcherError>;

impl ResumeMatcherError {
    pub fn document_read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ResumeMatcherError::DocumentRead {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// model2vec reports failures through anyhow; they only surface while
/// loading or running the embedding model.
impl From<anyhow::Error> for ResumeMatcherError {
    fn from(err: anyhow::Error) -> Self {
        ResumeMatcherError::Embedding(err.to_string())
    }
}

impl From<reqwest::Error> for ResumeMatcherError {
    fn from(err: reqwest::Error) -> Self {
        ResumeMatcherError::Llm(err.to_string())
    }
}
