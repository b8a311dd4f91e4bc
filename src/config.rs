//! Configuration management for the resume matcher

use crate::error::{Result, ResumeMatcherError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound for `llm.max_retries`.
pub const MAX_LLM_RETRIES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub store: StoreConfig,
    pub scoring: ScoringConfig,
    pub llm: LlmConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub default_embedding_model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub enabled: bool,
    pub persist_dir: PathBuf,
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Scores at or above this value are labelled `Fit`.
    pub fit_threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub enabled: bool,
    pub model: String,
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!(
                "Invalid output format: {}. Supported: console, json, markdown, html",
                s
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-matcher");

        Self {
            models: ModelConfig {
                models_dir: base_dir.join("models"),
                default_embedding_model: "potion-base-8M".to_string(),
            },
            store: StoreConfig {
                enabled: true,
                persist_dir: base_dir.join("vectordb"),
                collection: "resumes".to_string(),
            },
            scoring: ScoringConfig { fit_threshold: 0.6 },
            llm: LlmConfig {
                enabled: true,
                model: "gemini-2.0-flash".to_string(),
                api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                api_key_env: "GOOGLE_API_KEY".to_string(),
                temperature: 0.7,
                max_output_tokens: 4096,
                timeout_secs: 120,
                max_retries: 2,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, creating it with defaults when absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                ResumeMatcherError::Configuration(format!(
                    "Failed to parse config {}: {}",
                    path.display(),
                    e
                ))
            })?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            ResumeMatcherError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-matcher")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.scoring.fit_threshold) {
            return Err(ResumeMatcherError::Configuration(format!(
                "scoring.fit_threshold must be within [0, 1], got {}",
                self.scoring.fit_threshold
            )));
        }
        if self.store.collection.trim().is_empty() {
            return Err(ResumeMatcherError::Configuration(
                "store.collection must not be empty".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ResumeMatcherError::Configuration(format!(
                "llm.temperature must be within [0, 2], got {}",
                self.llm.temperature
            )));
        }
        if self.llm.max_retries > MAX_LLM_RETRIES {
            return Err(ResumeMatcherError::Configuration(format!(
                "llm.max_retries must be at most {}, got {}",
                MAX_LLM_RETRIES, self.llm.max_retries
            )));
        }
        Ok(())
    }

    /// Set a single value by dotted key, e.g. `scoring.fit_threshold`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            "models.models_dir" => updated.models.models_dir = PathBuf::from(value),
            "models.default_embedding_model" => {
                updated.models.default_embedding_model = value.to_string()
            }
            "store.enabled" => updated.store.enabled = parse_value(key, value)?,
            "store.persist_dir" => updated.store.persist_dir = PathBuf::from(value),
            "store.collection" => updated.store.collection = value.to_string(),
            "scoring.fit_threshold" => updated.scoring.fit_threshold = parse_value(key, value)?,
            "llm.enabled" => updated.llm.enabled = parse_value(key, value)?,
            "llm.model" => updated.llm.model = value.to_string(),
            "llm.api_base" => updated.llm.api_base = value.trim_end_matches('/').to_string(),
            "llm.api_key_env" => updated.llm.api_key_env = value.to_string(),
            "llm.temperature" => updated.llm.temperature = parse_value(key, value)?,
            "llm.max_output_tokens" => updated.llm.max_output_tokens = parse_value(key, value)?,
            "llm.timeout_secs" => updated.llm.timeout_secs = parse_value(key, value)?,
            "llm.max_retries" => updated.llm.max_retries = parse_value(key, value)?,
            "output.format" => {
                updated.output.format = value
                    .parse()
                    .map_err(ResumeMatcherError::Configuration)?
            }
            "output.detailed" => updated.output.detailed = parse_value(key, value)?,
            "output.color_output" => updated.output.color_output = parse_value(key, value)?,
            _ => {
                return Err(ResumeMatcherError::Configuration(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        ResumeMatcherError::Configuration(format!("Invalid value '{}' for {}: {}", value, key, e))
    })
}
