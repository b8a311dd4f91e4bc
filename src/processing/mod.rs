//! Text processing, embeddings and scoring

pub mod document;
pub mod embedding_manager;
pub mod embeddings;
pub mod pipeline;
pub mod scorer;
pub mod text_processor;
