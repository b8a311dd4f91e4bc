//! Integration tests for the resume matcher

use printpdf::{BuiltinFont, Mm, PdfDocument};
use resume_matcher::input::manager::InputManager;
use resume_matcher::processing::embeddings::Embedder;
use resume_matcher::processing::pipeline::MatchPipeline;
use resume_matcher::store::VectorStore;
use resume_matcher::{extract, FitLabel, Result, ResumeMatcherError, SimilarityScorer};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a PDF with one page per entry; each page holds the given lines.
fn write_pdf(dir: &Path, name: &str, pages: &[&[&str]]) -> PathBuf {
    let (doc, first_page, first_layer) =
        PdfDocument::new(name, Mm(210.0), Mm(297.0), "Layer 1");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).unwrap();

    for (index, lines) in pages.iter().enumerate() {
        let (page, layer) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(210.0), Mm(297.0), format!("Layer {}", index + 1))
        };
        let layer = doc.get_page(page).get_layer(layer);
        for (line, text) in lines.iter().enumerate() {
            layer.use_text(*text, 12.0, Mm(10.0), Mm(280.0 - 10.0 * line as f32), &font);
        }
    }

    let path = dir.join(name);
    doc.save(&mut BufWriter::new(File::create(&path).unwrap()))
        .unwrap();
    path
}

/// Bag-of-words over a fixed vocabulary; every word gets its own dimension.
struct VocabEmbedder {
    vocab: Vec<&'static str>,
}

impl VocabEmbedder {
    fn new() -> Self {
        Self {
            vocab: vec![
                "python", "aws", "docker", "engineer", "backend", "senior", "experience",
                "pastry", "chef", "bakery", "french", "desserts", "kitchen", "years",
            ],
        }
    }
}

impl Embedder for VocabEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.01; self.vocab.len()];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            if let Some(index) = self.vocab.iter().position(|v| *v == word) {
                v[index] += 1.0;
            }
        }
        Ok(v)
    }

    fn model_name(&self) -> &str {
        "vocab"
    }
}

const PYTHON_JD: &str = "Looking for Python backend engineer with AWS experience";
const CHEF_JD: &str = "French bakery hiring a pastry chef for desserts and kitchen work";

#[tokio::test]
async fn test_extract_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(
        dir.path(),
        "jane.pdf",
        &[&["Jane Doe", "Senior Python engineer", "AWS and Docker"]],
    );

    let first = extract(&path).await.unwrap();
    let second = extract(&path).await.unwrap();

    assert_eq!(first, second);
    assert!(first.contains("Python"));
    assert!(first.contains("Docker"));
}

#[tokio::test]
async fn test_extracted_text_is_normalized() {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(
        dir.path(),
        "spaced.pdf",
        &[&["Skills", "", "", "Python", "AWS"], &["Education"]],
    );

    let text = extract(&path).await.unwrap();

    assert!(!text.contains("\n\n"));
    assert!(!text.contains("  "));
    assert_eq!(text, text.trim());
}

#[tokio::test]
async fn test_multi_page_text_keeps_page_order() {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(
        dir.path(),
        "two-pages.pdf",
        &[&["Jane Doe"], &["Kubernetes"]],
    );

    let text = extract(&path).await.unwrap();
    let jane = text.find("Jane").unwrap();
    let kube = text.find("Kubernetes").unwrap();
    assert!(jane < kube);
}

#[tokio::test]
async fn test_blank_pdf_yields_empty_text() {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(dir.path(), "blank.pdf", &[&[], &[]]);

    assert_eq!(extract(&path).await.unwrap(), "");
}

#[tokio::test]
async fn test_corrupt_and_missing_pdfs_are_document_read_errors() {
    let dir = TempDir::new().unwrap();
    let corrupt = dir.path().join("corrupt.pdf");
    std::fs::write(&corrupt, b"%PDF-1.4 truncated garbage").unwrap();

    let err = extract(&corrupt).await.unwrap_err();
    assert!(matches!(err, ResumeMatcherError::DocumentRead { .. }));

    let err = extract(&dir.path().join("missing.pdf")).await.unwrap_err();
    assert!(matches!(err, ResumeMatcherError::DocumentRead { .. }));
}

#[tokio::test]
async fn test_input_manager_caches_extractions() {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(dir.path(), "jane.pdf", &[&["Python engineer"]]);

    let mut manager = InputManager::new();
    let first = manager.extract_text(&path).await.unwrap();
    let second = manager.extract_text(&path).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(manager.cache_size(), 1);
}

#[test]
fn test_score_properties() {
    let embedder = VocabEmbedder::new();
    let scorer = SimilarityScorer::new(&embedder);
    let resume = "Senior Python backend engineer with AWS experience and Docker";

    let ab = scorer.score(resume, PYTHON_JD).unwrap();
    let ba = scorer.score(PYTHON_JD, resume).unwrap();
    assert_eq!(ab, ba);
    assert_eq!(ab, scorer.score(resume, PYTHON_JD).unwrap());
    assert!((0.0..=1.0).contains(&ab));
    assert_eq!(ab, (ab * 100.0).round() / 100.0);

    let chef = scorer.score(resume, CHEF_JD).unwrap();
    assert!(ab > chef);
    assert_eq!(FitLabel::from_score(ab, 0.6), FitLabel::Fit);
    assert_eq!(FitLabel::from_score(chef, 0.6), FitLabel::NotFit);
}

#[tokio::test]
async fn test_pipeline_over_pdfs() {
    let docs = TempDir::new().unwrap();
    let db = TempDir::new().unwrap();

    let dev = write_pdf(
        docs.path(),
        "dev.pdf",
        &[&["Senior Python backend engineer, AWS, Docker"]],
    );
    let chef = write_pdf(
        docs.path(),
        "chef.pdf",
        &[&["Pastry chef, French bakery, desserts"]],
    );
    let blank = write_pdf(docs.path(), "blank.pdf", &[&[]]);
    let corrupt = docs.path().join("corrupt.pdf");
    std::fs::write(&corrupt, b"not a pdf at all").unwrap();

    let embedder = VocabEmbedder::new();
    let store = VectorStore::open(db.path(), "resumes")
        .unwrap()
        .with_embedder(&embedder);
    let mut pipeline = MatchPipeline::new(&embedder, 0.6).with_store(store);

    let report = pipeline
        .run(&[dev, blank, chef, corrupt], PYTHON_JD)
        .await
        .unwrap();

    let sources: Vec<&str> = report.entries.iter().map(|e| e.source.as_str()).collect();
    assert_eq!(sources, vec!["dev.pdf", "chef.pdf"]);
    assert_eq!(report.entries[0].fit, FitLabel::Fit);
    assert_eq!(report.entries[1].fit, FitLabel::NotFit);
    assert_eq!(report.best_match().unwrap().source, "dev.pdf");

    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.source.as_str()).collect();
    assert_eq!(skipped, vec!["blank.pdf", "corrupt.pdf"]);

    let reopened = VectorStore::open(db.path(), "resumes")
        .unwrap()
        .with_embedder(&embedder);
    assert_eq!(reopened.len(), 2);
    assert!(reopened.get_by_source("blank.pdf").is_none());

    let hits = reopened.search("pastry chef", 1).unwrap();
    assert_eq!(hits[0].source.as_deref(), Some("chef.pdf"));
}

/// Needs the default embedding model under ~/.resume-matcher/models.
#[tokio::test]
#[ignore]
async fn test_relative_ordering_with_real_model() {
    use resume_matcher::processing::embedding_manager::EmbeddingModelManager;
    use resume_matcher::processing::embeddings::Model2VecEmbedder;

    let config = resume_matcher::Config::default();
    let mut manager = EmbeddingModelManager::new(config.models.models_dir.clone())
        .await
        .unwrap();
    let path = manager
        .ensure_model_available(&config.models.default_embedding_model)
        .await
        .unwrap();
    let embedder = Model2VecEmbedder::load(&path, &config.models.default_embedding_model).unwrap();
    let scorer = SimilarityScorer::new(&embedder);

    let resume = "Senior Python engineer, 5 years, AWS, Docker";
    let python = scorer.score(resume, PYTHON_JD).unwrap();
    let pastry = scorer
        .score(resume, "Pastry chef wanted for a French bakery")
        .unwrap();

    assert!(python > pastry);
    assert!((0.0..=1.0).contains(&python));
}
