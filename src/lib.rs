//! Resume matcher library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod processing;
pub mod store;

pub use config::Config;
pub use error::{Result, ResumeMatcherError};
pub use input::extract;
pub use processing::scorer::{FitLabel, SimilarityScorer};
