//! JSON-backed vector store
//!
//! One collection lives in `<persist_dir>/<collection>.json`. Records are
//! kept in memory and written back with [`VectorStore::persist`].

use crate::error::{Result, ResumeMatcherError};
use crate::processing::document::Document;
use crate::processing::embeddings::{cosine_similarity, Embedder};
use crate::store::{DocumentStore, Metadata, StoredDocument, PATH_KEY, SOURCE_KEY};
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::io::Write;
use std::path::{Path, PathBuf};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CollectionFile {
    version: u32,
    collection: String,
    next_id: u64,
    documents: Vec<StoredDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub source: Option<String>,
    pub score: f32,
}

pub struct VectorStore<'e> {
    path: PathBuf,
    collection: String,
    next_id: u64,
    documents: Vec<StoredDocument>,
    embedder: Option<&'e dyn Embedder>,
    dirty: bool,
}

impl<'e> VectorStore<'e> {
    /// Open a collection, creating the directory and an empty store if needed.
    pub fn open(persist_dir: &Path, collection: &str) -> Result<Self> {
        std::fs::create_dir_all(persist_dir)?;
        let path = persist_dir.join(format!("{}.json", collection));

        let (next_id, documents) = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let file: CollectionFile = serde_json::from_str(&content).map_err(|e| {
                ResumeMatcherError::Store(format!("Corrupt store {}: {}", path.display(), e))
            })?;
            if file.version != FORMAT_VERSION {
                return Err(ResumeMatcherError::Store(format!(
                    "Unsupported store version {} in {}",
                    file.version,
                    path.display()
                )));
            }
            (file.next_id, file.documents)
        } else {
            (1, Vec::new())
        };

        debug!(
            "Opened collection '{}' with {} document(s)",
            collection,
            documents.len()
        );

        Ok(Self {
            path,
            collection: collection.to_string(),
            next_id,
            documents,
            embedder: None,
            dirty: false,
        })
    }

    /// Attach the embedding model used by `add` and `search`.
    pub fn with_embedder(mut self, embedder: &'e dyn Embedder) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn documents(&self) -> &[StoredDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get_by_source(&self, source: &str) -> Option<&StoredDocument> {
        self.documents.iter().find(|d| d.source() == Some(source))
    }

    fn embedder(&self) -> Result<&'e dyn Embedder> {
        self.embedder.ok_or_else(|| {
            ResumeMatcherError::Store("no embedding model attached to the store".to_string())
        })
    }

    /// Store an extracted document, embedding it with the attached model.
    pub fn add_document(&mut self, document: &Document) -> Result<String> {
        let embedder = self.embedder()?;
        let embedding = embedder.embed(document.content())?;
        Ok(self.insert(
            document.content(),
            document_metadata(document),
            embedding,
            embedder.model_name(),
        ))
    }

    /// Store an extracted document with an embedding computed by the caller.
    pub fn add_embedded(&mut self, document: &Document, embedding: Vec<f32>, model: &str) -> String {
        self.insert(document.content(), document_metadata(document), embedding, model)
    }

    /// Records are matched by path when one is known. Path-less records fall
    /// back to matching by source.
    fn find_existing(&self, metadata: &Metadata) -> Option<usize> {
        let source = metadata.get(SOURCE_KEY).map(String::as_str);
        match metadata.get(PATH_KEY) {
            Some(path) => self.documents.iter().position(|d| match d.path() {
                Some(stored) => stored == path.as_str(),
                None => source.is_some() && d.source() == source,
            }),
            None => source.and_then(|source| {
                self.documents
                    .iter()
                    .position(|d| d.path().is_none() && d.source() == Some(source))
            }),
        }
    }

    fn insert(&mut self, text: &str, metadata: Metadata, embedding: Vec<f32>, model: &str) -> String {
        let id = match self.find_existing(&metadata) {
            Some(index) => {
                let replaced = self.documents.remove(index);
                debug!("Replacing stored record {}", replaced.id);
                replaced.id
            }
            None => {
                let id = format!("doc-{}", self.next_id);
                self.next_id += 1;
                id
            }
        };

        self.documents.push(StoredDocument {
            id: id.clone(),
            content: text.to_string(),
            metadata,
            embedding,
            embedding_model: model.to_string(),
            added_at: Utc::now(),
        });
        self.dirty = true;
        id
    }

    /// The `k` stored documents most similar to `query`, best first.
    ///
    /// Records embedded with a different model are skipped.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let embedder = self.embedder()?;
        let query_embedding = embedder.embed(query)?;

        let mut hits = Vec::new();
        for doc in &self.documents {
            if doc.embedding_model != embedder.model_name() {
                warn!(
                    "Skipping '{}': embedded with {}, not {}",
                    doc.id,
                    doc.embedding_model,
                    embedder.model_name()
                );
                continue;
            }
            hits.push(SearchHit {
                id: doc.id.clone(),
                source: doc.source().map(str::to_string),
                score: cosine_similarity(&query_embedding, &doc.embedding)?,
            });
        }

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }

    pub fn clear(&mut self) {
        self.documents.clear();
        self.next_id = 1;
        self.dirty = true;
    }

    /// Write the collection to disk if it changed. The file is replaced
    /// atomically so a crash never leaves a half-written store.
    pub fn persist(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let file = CollectionFile {
            version: FORMAT_VERSION,
            collection: self.collection.clone(),
            next_id: self.next_id,
            documents: self.documents.clone(),
        };
        let json = serde_json::to_vec_pretty(&file)?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| ResumeMatcherError::Store(format!("Failed to persist store: {}", e)))?;

        info!(
            "Persisted {} document(s) to {}",
            self.documents.len(),
            self.path.display()
        );
        self.dirty = false;
        Ok(())
    }
}

impl DocumentStore for VectorStore<'_> {
    /// A record for the same path (or, lacking a path, the same source)
    /// replaces the earlier one and keeps its id.
    fn add(&mut self, text: &str, metadata: Metadata) -> Result<String> {
        let embedder = self.embedder()?;
        let embedding = embedder.embed(text)?;
        Ok(self.insert(text, metadata, embedding, embedder.model_name()))
    }
}

fn document_metadata(document: &Document) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(SOURCE_KEY.to_string(), document.source().to_string());
    if let Some(path) = document.path() {
        metadata.insert(PATH_KEY.to_string(), path.to_string_lossy().to_string());
    }
    metadata.insert(
        "word_count".to_string(),
        document.metadata().word_count.to_string(),
    );
    metadata.insert(
        "extracted_at".to_string(),
        document.metadata().extracted_at.to_rfc3339(),
    );
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::document::DocumentType;
    use tempfile::TempDir;

    struct KeywordEmbedder;

    impl Embedder for KeywordEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(["python", "aws", "pastry", "chef"]
                .iter()
                .map(|k| lower.matches(k).count() as f32 + 0.01)
                .collect())
        }

        fn model_name(&self) -> &str {
            "keywords"
        }
    }

    fn resume(source: &str, text: &str) -> Document {
        Document::new(source, text.to_string(), DocumentType::Resume)
    }

    #[test]
    fn test_add_persist_and_reopen() {
        let dir = TempDir::new().unwrap();
        let embedder = KeywordEmbedder;

        let mut store = VectorStore::open(dir.path(), "resumes")
            .unwrap()
            .with_embedder(&embedder);
        let id = store.add_document(&resume("jane.pdf", "Python and AWS")).unwrap();
        store.persist().unwrap();

        let reopened = VectorStore::open(dir.path(), "resumes").unwrap();
        assert_eq!(reopened.len(), 1);
        let stored = reopened.get_by_source("jane.pdf").unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.content, "Python and AWS");
        assert_eq!(stored.embedding_model, "keywords");
    }

    #[test]
    fn test_same_source_replaces_record() {
        let dir = TempDir::new().unwrap();
        let embedder = KeywordEmbedder;
        let mut store = VectorStore::open(dir.path(), "resumes")
            .unwrap()
            .with_embedder(&embedder);

        let first = store.add_document(&resume("jane.pdf", "Python")).unwrap();
        store.add_document(&resume("raj.pdf", "Pastry chef")).unwrap();
        let second = store.add_document(&resume("jane.pdf", "Python and AWS")).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get_by_source("jane.pdf").unwrap().content,
            "Python and AWS"
        );
    }

    #[test]
    fn test_same_name_in_different_directories_is_kept_apart() {
        let docs = TempDir::new().unwrap();
        let db = TempDir::new().unwrap();
        let embedder = KeywordEmbedder;
        let mut store = VectorStore::open(db.path(), "resumes")
            .unwrap()
            .with_embedder(&embedder);

        let a = docs.path().join("a").join("resume.pdf");
        let b = docs.path().join("b").join("resume.pdf");
        let first = store
            .add_document(&Document::resume_from_path(&a, "Python".to_string()))
            .unwrap();
        let second = store
            .add_document(&Document::resume_from_path(&b, "Pastry chef".to_string()))
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(store.len(), 2);

        let again = store
            .add_document(&Document::resume_from_path(&a, "Python and AWS".to_string()))
            .unwrap();
        assert_eq!(again, first);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_embedded_uses_given_vector() {
        let dir = TempDir::new().unwrap();
        let mut store = VectorStore::open(dir.path(), "resumes").unwrap();

        let id = store.add_embedded(&resume("jane.pdf", "Python"), vec![1.0, 0.0], "keywords");

        let stored = store.get_by_source("jane.pdf").unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.embedding, vec![1.0, 0.0]);
        assert_eq!(stored.embedding_model, "keywords");
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let dir = TempDir::new().unwrap();
        let embedder = KeywordEmbedder;
        let mut store = VectorStore::open(dir.path(), "resumes")
            .unwrap()
            .with_embedder(&embedder);
        store.add_document(&resume("chef.pdf", "Pastry chef, pastry school")).unwrap();
        store.add_document(&resume("dev.pdf", "Python developer on AWS")).unwrap();

        let hits = store.search("python aws engineer", 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source.as_deref(), Some("dev.pdf"));
    }

    #[test]
    fn test_add_without_embedder_fails() {
        let dir = TempDir::new().unwrap();
        let mut store = VectorStore::open(dir.path(), "resumes").unwrap();
        let err = store.add("text", Metadata::new()).unwrap_err();
        assert!(matches!(err, ResumeMatcherError::Store(_)));
    }

    #[test]
    fn test_clear_and_persist() {
        let dir = TempDir::new().unwrap();
        let embedder = KeywordEmbedder;
        let mut store = VectorStore::open(dir.path(), "resumes")
            .unwrap()
            .with_embedder(&embedder);
        store.add_document(&resume("jane.pdf", "Python")).unwrap();
        store.persist().unwrap();

        store.clear();
        store.persist().unwrap();

        assert!(VectorStore::open(dir.path(), "resumes").unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_a_store_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("resumes.json"), "{ not json").unwrap();
        let err = VectorStore::open(dir.path(), "resumes").err().unwrap();
        assert!(matches!(err, ResumeMatcherError::Store(_)));
    }
}
