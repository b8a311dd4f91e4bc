//! LLM integration module

pub mod analyzer;
pub mod client;
pub mod prompts;

use crate::error::Result;
use async_trait::async_trait;

/// Single-turn prompt completion.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}
