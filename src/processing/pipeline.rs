//! Batch matching of resumes against a job description

use crate::error::{Result, ResumeMatcherError};
use crate::input::manager::InputManager;
use crate::llm::analyzer::FitAssessor;
use crate::llm::LlmBackend;
use crate::output::report::{MatchReport, ReportMetadata, ResumeMatch, SkippedDocument};
use crate::processing::document::{source_name, Document};
use crate::processing::embeddings::Embedder;
use crate::processing::scorer::{FitLabel, SimilarityScorer};
use crate::processing::text_processor::TextProcessor;
use crate::store::VectorStore;
use log::{info, warn};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

const JOB_PREVIEW_CHARS: usize = 300;

/// Extracts, stores, scores and optionally assesses each resume in turn.
pub struct MatchPipeline<'a> {
    scorer: SimilarityScorer<'a>,
    threshold: f32,
    inputs: InputManager,
    processor: TextProcessor,
    store: Option<VectorStore<'a>>,
    assessor: Option<FitAssessor<'a>>,
}

impl<'a> MatchPipeline<'a> {
    pub fn new(embedder: &'a dyn Embedder, threshold: f32) -> Self {
        Self {
            scorer: SimilarityScorer::new(embedder),
            threshold,
            inputs: InputManager::new(),
            processor: TextProcessor::default(),
            store: None,
            assessor: None,
        }
    }

    /// Keep every extracted resume in `store`. Its embedder should be the
    /// one the pipeline scores with.
    pub fn with_store(mut self, store: VectorStore<'a>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_llm(mut self, backend: &'a dyn LlmBackend) -> Self {
        self.assessor = Some(FitAssessor::new(backend));
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub async fn run(&mut self, resumes: &[PathBuf], job_description: &str) -> Result<MatchReport> {
        let start_time = Instant::now();

        let job = Document::job_description(self.processor.normalize(job_description));
        if job.is_empty() {
            return Err(ResumeMatcherError::InvalidInput(
                "Job description is empty".to_string(),
            ));
        }
        let job_text = job.content();
        let job_embedding = self.scorer.embed(job_text)?;

        let mut entries = Vec::new();
        let mut skipped = Vec::new();
        let mut seen_sources = HashSet::new();

        for path in resumes {
            let text = match self.inputs.extract_text(path).await {
                Ok(text) => text,
                Err(ResumeMatcherError::DocumentRead { reason, .. })
                | Err(ResumeMatcherError::UnsupportedFormat(reason)) => {
                    warn!("Skipping {}: {}", path.display(), reason);
                    skipped.push(SkippedDocument {
                        source: source_name(path),
                        reason,
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            let document = Document::resume_from_path(path, text);
            if document.is_empty() {
                warn!("Skipping {}: no extractable text", document.source());
                skipped.push(SkippedDocument {
                    source: document.source().to_string(),
                    reason: "no extractable text".to_string(),
                });
                continue;
            }

            if !seen_sources.insert(document.source().to_string()) {
                warn!(
                    "More than one resume is named {}; they are stored by path",
                    document.source()
                );
            }

            let embedding = self.scorer.embed(document.content())?;
            let score = self.scorer.score_embeddings(&embedding, &job_embedding)?;
            let stored_id = self.store.as_mut().map(|store| {
                store.add_embedded(&document, embedding, self.scorer.model_name())
            });
            let fit = FitLabel::from_score(score, self.threshold);
            info!("{}: score {:.2} ({})", document.source(), score, fit);

            let (assessment, llm_error) = match &self.assessor {
                Some(assessor) => match assessor.assess(&document, job_text).await {
                    Ok(assessment) => (Some(assessment), None),
                    Err(e) => {
                        warn!("LLM assessment failed for {}: {}", document.source(), e);
                        (None, Some(e.to_string()))
                    }
                },
                None => (None, None),
            };

            entries.push(ResumeMatch {
                source: document.source().to_string(),
                score,
                fit,
                word_count: document.metadata().word_count,
                stored_id,
                assessment,
                llm_error,
            });
        }

        if let Some(store) = self.store.as_mut() {
            store.persist()?;
        }

        info!(
            "Matched {} resume(s), skipped {}",
            entries.len(),
            skipped.len()
        );

        Ok(MatchReport {
            job_preview: TextProcessor::preview(job_text, JOB_PREVIEW_CHARS),
            threshold: self.threshold,
            entries,
            skipped,
            metadata: ReportMetadata::new(
                self.scorer.model_name(),
                self.assessor.as_ref().map(|a| a.model_name()),
                start_time.elapsed().as_millis() as u64,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct KeywordEmbedder;

    impl Embedder for KeywordEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(["python", "aws", "pastry", "chef", "docker"]
                .iter()
                .map(|k| lower.matches(k).count() as f32 + 0.01)
                .collect())
        }

        fn model_name(&self) -> &str {
            "keywords"
        }
    }

    #[derive(Default)]
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    impl Embedder for CountingEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            KeywordEmbedder.embed(text)
        }

        fn model_name(&self) -> &str {
            "keywords"
        }
    }

    struct FlakyBackend;

    #[async_trait]
    impl LlmBackend for FlakyBackend {
        async fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.contains("Pastry") {
                Err(ResumeMatcherError::Llm("quota exceeded".to_string()))
            } else {
                Ok("Good fit.\nRecommendation: Yes".to_string())
            }
        }

        fn model_name(&self) -> &str {
            "flaky"
        }
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    const JD: &str = "Looking for Python backend engineer with AWS experience";

    #[tokio::test]
    async fn test_scores_and_labels_each_resume() {
        let dir = TempDir::new().unwrap();
        let dev = write(&dir, "dev.txt", "Senior Python engineer, 5 years, AWS, Docker");
        let chef = write(&dir, "chef.txt", "Pastry chef with 10 years in French bakeries");

        let embedder = KeywordEmbedder;
        let mut pipeline = MatchPipeline::new(&embedder, 0.6);
        let report = pipeline.run(&[dev, chef], JD).await.unwrap();

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].source, "dev.txt");
        assert!(report.entries[0].score > report.entries[1].score);
        assert_eq!(report.entries[0].fit, FitLabel::Fit);
        assert_eq!(report.entries[1].fit, FitLabel::NotFit);
        assert!(report.entries.iter().all(|e| e.assessment.is_none()));
        assert_eq!(report.metadata.embedding_model, "keywords");
        assert!(report.metadata.llm_model.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_and_blank_resumes_are_skipped() {
        let dir = TempDir::new().unwrap();
        let dev = write(&dir, "dev.txt", "Python and AWS");
        let blank = write(&dir, "blank.txt", "   \n\n  ");
        let broken = write(&dir, "broken.pdf", "not really a pdf");
        let missing = dir.path().join("missing.pdf");

        let embedder = KeywordEmbedder;
        let mut pipeline = MatchPipeline::new(&embedder, 0.6);
        let report = pipeline
            .run(&[blank, dev, broken, missing], JD)
            .await
            .unwrap();

        assert_eq!(report.entries.len(), 1);
        let skipped: Vec<&str> = report.skipped.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(skipped, vec!["blank.txt", "broken.pdf", "missing.pdf"]);
        assert_eq!(report.skipped[0].reason, "no extractable text");
    }

    #[tokio::test]
    async fn test_blank_job_description_is_rejected() {
        let embedder = KeywordEmbedder;
        let mut pipeline = MatchPipeline::new(&embedder, 0.6);
        let err = pipeline.run(&[], "  \n ").await.unwrap_err();
        assert!(matches!(err, ResumeMatcherError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_llm_failure_is_recorded_per_resume() {
        let dir = TempDir::new().unwrap();
        let dev = write(&dir, "dev.txt", "Python engineer on AWS");
        let chef = write(&dir, "chef.txt", "Pastry chef");

        let embedder = KeywordEmbedder;
        let backend = FlakyBackend;
        let mut pipeline = MatchPipeline::new(&embedder, 0.6).with_llm(&backend);
        let report = pipeline.run(&[dev, chef], JD).await.unwrap();

        let dev_entry = &report.entries[0];
        assert_eq!(
            dev_entry.assessment.as_ref().unwrap().recommended,
            Some(true)
        );
        assert!(dev_entry.llm_error.is_none());

        let chef_entry = &report.entries[1];
        assert!(chef_entry.assessment.is_none());
        assert!(chef_entry.llm_error.as_ref().unwrap().contains("quota"));
        assert_eq!(report.metadata.llm_model.as_deref(), Some("flaky"));
    }

    #[tokio::test]
    async fn test_resumes_are_stored_and_persisted() {
        let docs = TempDir::new().unwrap();
        let db = TempDir::new().unwrap();
        let dev = write(&docs, "dev.txt", "Python engineer on AWS");

        let embedder = KeywordEmbedder;
        let store = VectorStore::open(db.path(), "resumes")
            .unwrap()
            .with_embedder(&embedder);
        let mut pipeline = MatchPipeline::new(&embedder, 0.6).with_store(store);
        let report = pipeline.run(&[dev], JD).await.unwrap();

        assert_eq!(report.entries[0].stored_id.as_deref(), Some("doc-1"));
        let reopened = VectorStore::open(db.path(), "resumes").unwrap();
        assert_eq!(reopened.len(), 1);
        assert!(reopened.get_by_source("dev.txt").is_some());
    }

    #[tokio::test]
    async fn test_same_named_resumes_are_stored_separately() {
        let docs = TempDir::new().unwrap();
        let db = TempDir::new().unwrap();
        std::fs::create_dir_all(docs.path().join("a")).unwrap();
        std::fs::create_dir_all(docs.path().join("b")).unwrap();
        let first = write(&docs, "a/resume.txt", "Python engineer on AWS");
        let second = write(&docs, "b/resume.txt", "Pastry chef");

        let embedder = KeywordEmbedder;
        let store = VectorStore::open(db.path(), "resumes")
            .unwrap()
            .with_embedder(&embedder);
        let mut pipeline = MatchPipeline::new(&embedder, 0.6).with_store(store);
        let report = pipeline.run(&[first.clone(), second], JD).await.unwrap();

        let ids: Vec<&str> = report
            .entries
            .iter()
            .map(|e| e.stored_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["doc-1", "doc-2"]);
        assert_eq!(VectorStore::open(db.path(), "resumes").unwrap().len(), 2);

        let rerun = pipeline.run(&[first], JD).await.unwrap();
        assert_eq!(rerun.entries[0].stored_id.as_deref(), Some("doc-1"));
        assert_eq!(VectorStore::open(db.path(), "resumes").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_each_resume_is_embedded_once() {
        let docs = TempDir::new().unwrap();
        let db = TempDir::new().unwrap();
        let dev = write(&docs, "dev.txt", "Python engineer on AWS");
        let chef = write(&docs, "chef.txt", "Pastry chef");

        let embedder = CountingEmbedder::default();
        let store = VectorStore::open(db.path(), "resumes")
            .unwrap()
            .with_embedder(&embedder);
        let mut pipeline = MatchPipeline::new(&embedder, 0.6).with_store(store);
        let report = pipeline.run(&[dev, chef], JD).await.unwrap();

        assert_eq!(report.entries.len(), 2);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
    }
}
