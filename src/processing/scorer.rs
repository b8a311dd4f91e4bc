//! Resume / job description similarity scoring

use crate::error::Result;
use crate::processing::embeddings::{check_vector, cosine_similarity, Embedder};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_FIT_THRESHOLD: f32 = 0.6;

/// Scores text pairs with one shared embedding model.
pub struct SimilarityScorer<'a> {
    embedder: &'a dyn Embedder,
}

impl<'a> SimilarityScorer<'a> {
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self { embedder }
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// Cosine similarity of the two texts' embeddings, rounded to two decimals.
    ///
    /// Returns 0.0 without embedding anything when either text is blank.
    pub fn score(&self, text_a: &str, text_b: &str) -> Result<f32> {
        if text_a.trim().is_empty() || text_b.trim().is_empty() {
            debug!("Blank input, scoring as 0.0");
            return Ok(0.0);
        }

        let a = self.embed(text_a)?;
        let b = self.embed(text_b)?;
        Ok(round_score(cosine_similarity(&a, &b)?))
    }

    /// Score `text` against an embedding computed earlier with [`Self::embed`].
    pub fn score_against(&self, text: &str, reference: &[f32]) -> Result<f32> {
        if text.trim().is_empty() {
            return Ok(0.0);
        }

        let embedding = self.embed(text)?;
        self.score_embeddings(&embedding, reference)
    }

    /// Score two embeddings that were both computed with [`Self::embed`].
    pub fn score_embeddings(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        Ok(round_score(cosine_similarity(a, b)?))
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.embedder.embed(text)?;
        check_vector(&embedding)?;
        Ok(embedding)
    }
}

/// Round to two decimal places. Negative zero comes back as 0.0.
pub fn round_score(raw: f32) -> f32 {
    let rounded = (raw * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitLabel {
    #[serde(rename = "Fit")]
    Fit,
    #[serde(rename = "Not Fit")]
    NotFit,
}

impl FitLabel {
    pub fn from_score(score: f32, threshold: f32) -> Self {
        if score >= threshold {
            FitLabel::Fit
        } else {
            FitLabel::NotFit
        }
    }

    pub fn is_fit(self) -> bool {
        matches!(self, FitLabel::Fit)
    }
}

impl fmt::Display for FitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitLabel::Fit => write!(f, "Fit"),
            FitLabel::NotFit => write!(f, "Not Fit"),
        }
    }
}
