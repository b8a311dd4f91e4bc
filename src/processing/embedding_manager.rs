//! Embedding model management: registry, download and local lookup

use crate::error::{Result, ResumeMatcherError};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A Model2Vec model the tool knows how to fetch.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub repo_id: &'static str,
    pub size_mb: u64,
    pub dimensions: u32,
    pub description: &'static str,
}

const KNOWN_MODELS: &[EmbeddingModelInfo] = &[
    EmbeddingModelInfo {
        id: "potion-base-8M",
        name: "Potion Base 8M",
        repo_id: "minishlab/potion-base-8M",
        size_mb: 30,
        dimensions: 256,
        description: "Small general-purpose static embeddings (default)",
    },
    EmbeddingModelInfo {
        id: "potion-retrieval-32M",
        name: "Potion Retrieval 32M",
        repo_id: "minishlab/potion-retrieval-32M",
        size_mb: 130,
        dimensions: 512,
        description: "Larger model tuned for retrieval and similarity",
    },
    EmbeddingModelInfo {
        id: "m2v-base",
        name: "Model2Vec Base",
        repo_id: "minishlab/M2V_base_output",
        size_mb: 90,
        dimensions: 256,
        description: "Original Model2Vec base output model",
    },
];

/// Files every Model2Vec model directory must contain.
const REQUIRED_FILES: &[&str] = &["tokenizer.json", "model.safetensors", "config.json"];

pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    downloaded: BTreeSet<String>,
}

impl EmbeddingModelManager {
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&models_dir).await.map_err(|e| {
            ResumeMatcherError::ModelError(format!(
                "Failed to create models directory {}: {}",
                models_dir.display(),
                e
            ))
        })?;

        let mut manager = Self {
            models_dir,
            downloaded: BTreeSet::new(),
        };
        manager.scan_downloaded_models().await?;
        Ok(manager)
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() && is_model_directory(&entry.path()).await {
                self.downloaded
                    .insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    pub fn list_available_models(&self) -> &'static [EmbeddingModelInfo] {
        KNOWN_MODELS
    }

    pub fn list_downloaded_models(&self) -> Vec<String> {
        self.downloaded.iter().cloned().collect()
    }

    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.downloaded.contains(model_id)
    }

    pub fn get_model_info(&self, model_id: &str) -> Option<&'static EmbeddingModelInfo> {
        KNOWN_MODELS.iter().find(|m| m.id == model_id)
    }

    pub fn get_model_path(&self, model_id: &str) -> Option<PathBuf> {
        self.is_model_downloaded(model_id)
            .then(|| self.models_dir.join(model_id))
    }

    /// Accepts a model id, a Hugging Face repo id, or a display name.
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        let lower = input.to_lowercase();
        KNOWN_MODELS
            .iter()
            .find(|m| m.id == input || m.repo_id == input || m.name.to_lowercase() == lower)
            .map(|m| m.id.to_string())
            .or_else(|| self.is_model_downloaded(input).then(|| input.to_string()))
    }

    /// Download a known model into `<models_dir>/<id>`.
    pub async fn download_model(&mut self, model_id: &str, force: bool) -> Result<PathBuf> {
        let info = self
            .get_model_info(model_id)
            .ok_or_else(|| ResumeMatcherError::ModelNotFound(model_id.to_string()))?;

        let model_dir = self.models_dir.join(model_id);
        if !force && self.is_model_downloaded(model_id) {
            return Ok(model_dir);
        }

        info!(
            "Downloading embedding model {} ({} MB) from {}",
            info.name, info.size_mb, info.repo_id
        );

        let api = Api::new().map_err(|e| {
            ResumeMatcherError::ModelError(format!("Failed to initialize HF API: {}", e))
        })?;
        let repo = api.model(info.repo_id.to_string());

        fs::create_dir_all(&model_dir).await?;
        for file in REQUIRED_FILES {
            let cached = repo.get(file).await.map_err(|e| {
                ResumeMatcherError::ModelError(format!(
                    "Failed to download {} from {}: {}",
                    file, info.repo_id, e
                ))
            })?;
            fs::copy(&cached, model_dir.join(file)).await?;
            info!("  downloaded {}", file);
        }

        self.downloaded.insert(model_id.to_string());
        Ok(model_dir)
    }

    /// Path of a usable model, downloading it first when needed.
    pub async fn ensure_model_available(&mut self, model_id: &str) -> Result<PathBuf> {
        let resolved = self
            .resolve_model_id(model_id)
            .ok_or_else(|| ResumeMatcherError::ModelNotFound(model_id.to_string()))?;

        match self.get_model_path(&resolved) {
            Some(path) => Ok(path),
            None => {
                warn!("Embedding model '{}' not found locally", resolved);
                self.download_model(&resolved, false).await
            }
        }
    }

    /// Remove a downloaded model given by id, repo id or display name.
    pub async fn remove_model(&mut self, model: &str) -> Result<bool> {
        let Some(model_id) = self.resolve_model_id(model) else {
            return Ok(false);
        };
        let Some(path) = self.get_model_path(&model_id) else {
            return Ok(false);
        };

        fs::remove_dir_all(&path).await.map_err(|e| {
            ResumeMatcherError::ModelError(format!(
                "Failed to remove model directory {}: {}",
                path.display(),
                e
            ))
        })?;
        self.downloaded.remove(&model_id);
        Ok(true)
    }
}

async fn is_model_directory(path: &Path) -> bool {
    for file in REQUIRED_FILES {
        if fs::metadata(path.join(file)).await.is_err() {
            return false;
        }
    }
    true
}
