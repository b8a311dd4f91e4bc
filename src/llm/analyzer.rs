//! Qualitative fit assessment of a resume against a job description

use crate::error::Result;
use crate::llm::prompts::PromptTemplates;
use crate::llm::LlmBackend;
use crate::processing::document::Document;
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmAssessment {
    pub analysis: String,
    /// Parsed from the answer's closing "Recommendation: Yes/No" line.
    pub recommended: Option<bool>,
    pub model_used: String,
    pub processing_time_ms: u64,
}

pub struct FitAssessor<'a> {
    backend: &'a dyn LlmBackend,
    templates: PromptTemplates,
}

impl<'a> FitAssessor<'a> {
    pub fn new(backend: &'a dyn LlmBackend) -> Self {
        Self {
            backend,
            templates: PromptTemplates::default(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    pub async fn assess(&self, resume: &Document, job_description: &str) -> Result<LlmAssessment> {
        let start_time = Instant::now();
        info!("Requesting LLM assessment for {}", resume.source());

        let prompt = self
            .templates
            .render_fit_assessment(resume.content(), job_description);
        let analysis = self.backend.generate(&prompt).await?;
        let recommended = self.templates.parse_recommendation(&analysis);

        Ok(LlmAssessment {
            analysis: analysis.trim().to_string(),
            recommended,
            model_used: self.backend.model_name().to_string(),
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}
