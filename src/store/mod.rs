//! Persistent document store for extracted resumes

pub mod vector_store;

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use vector_store::{SearchHit, VectorStore};

/// Free-form key/value metadata stored alongside a document.
pub type Metadata = BTreeMap<String, String>;

/// Metadata key naming the document's origin (its file name).
pub const SOURCE_KEY: &str = "source";

/// Metadata key holding the canonical path a document was read from.
pub const PATH_KEY: &str = "path";

/// Anything that can take a document's text plus metadata and keep it.
pub trait DocumentStore {
    /// Store `text`, returning the id of the record.
    fn add(&mut self, text: &str, metadata: Metadata) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    pub embedding: Vec<f32>,
    pub embedding_model: String,
    pub added_at: DateTime<Utc>,
}

impl StoredDocument {
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).map(String::as_str)
    }

    pub fn path(&self) -> Option<&str> {
        self.metadata.get(PATH_KEY).map(String::as_str)
    }
}
