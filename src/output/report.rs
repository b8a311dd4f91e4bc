//! Match report structures shared by every output format

use crate::llm::analyzer::LlmAssessment;
use crate::processing::scorer::FitLabel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Result of matching a batch of resumes against one job description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    /// First few hundred characters of the job description
    pub job_preview: String,

    pub threshold: f32,

    /// One entry per scored resume, in the order the resumes were given
    pub entries: Vec<ResumeMatch>,

    /// Resumes that produced no text or could not be read
    pub skipped: Vec<SkippedDocument>,

    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeMatch {
    pub source: String,
    pub score: f32,
    pub fit: FitLabel,
    pub word_count: usize,

    /// Vector store record id, when the resume was stored
    pub stored_id: Option<String>,

    pub assessment: Option<LlmAssessment>,

    /// Why the LLM assessment is missing, when it was requested but failed
    pub llm_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub source: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub embedding_model: String,
    pub llm_model: Option<String>,
    pub processing_time_ms: u64,
    pub version: String,
}

impl ReportMetadata {
    pub fn new(embedding_model: &str, llm_model: Option<&str>, processing_time_ms: u64) -> Self {
        Self {
            generated_at: Utc::now(),
            embedding_model: embedding_model.to_string(),
            llm_model: llm_model.map(str::to_string),
            processing_time_ms,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl MatchReport {
    /// Entries sorted by score, best first. Ties keep input order.
    pub fn ranked(&self) -> Vec<&ResumeMatch> {
        let mut ranked: Vec<&ResumeMatch> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked
    }

    pub fn best_match(&self) -> Option<&ResumeMatch> {
        self.ranked().into_iter().next()
    }

    pub fn fit_count(&self) -> usize {
        self.entries.iter().filter(|e| e.fit.is_fit()).count()
    }

    pub fn has_assessments(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.assessment.is_some() || e.llm_error.is_some())
    }
}

impl ResumeMatch {
    /// Score as a whole percentage, clamped to 0..=100 for display.
    pub fn percentage(&self) -> u8 {
        (self.score.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}
