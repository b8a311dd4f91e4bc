//! CLI interface for the resume matcher

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-matcher")]
#[command(about = "Match PDF resumes against a job description")]
#[command(
    long_about = "Extract text from PDF resumes, score each one against a job description with sentence embeddings, label it Fit or Not Fit, and optionally ask an LLM for a recruiter-style assessment"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score resumes against a job description
    Match {
        /// Resume PDF(s) to score
        #[arg(short, long = "resume", required = true, num_args = 1..)]
        resumes: Vec<PathBuf>,

        /// Job description text
        #[arg(short, long, conflicts_with = "jd_file", required_unless_present = "jd_file")]
        jd: Option<String>,

        /// Read the job description from a file (TXT, MD, PDF)
        #[arg(long)]
        jd_file: Option<PathBuf>,

        /// Fit threshold; defaults to scoring.fit_threshold from the config
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Embedding model to use
        #[arg(short, long)]
        embedding: Option<String>,

        /// Skip the LLM assessment
        #[arg(long)]
        no_llm: bool,

        /// Don't add the resumes to the vector store
        #[arg(long)]
        no_store: bool,

        /// Output format: console, json, markdown, html
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Show full LLM answers and job description
        #[arg(short, long)]
        detailed: bool,
    },

    /// Embedding model management
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Inspect the vector store
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List available embedding models
    List,

    /// Download a model
    Download {
        /// Model id or Hugging Face repo id
        model: String,

        /// Force re-download if model exists
        #[arg(short, long)]
        force: bool,
    },

    /// Remove a downloaded model
    Remove {
        model: String,
    },

    /// Show model information
    Info {
        model: String,
    },
}

#[derive(Subcommand)]
pub enum StoreAction {
    /// List stored resumes
    List,

    /// Find the stored resumes closest to a query
    Search {
        query: String,

        /// Number of results
        #[arg(short, long, default_value_t = 5)]
        k: usize,
    },

    /// Remove every stored resume
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "scoring.fit_threshold")
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print the configuration file path
    Path,
}

pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    format.parse()
}

pub fn validate_threshold(threshold: f32) -> Result<f32, String> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(format!("Threshold must be within [0, 1], got {}", threshold))
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_match_accepts_several_resumes() {
        let cli = Cli::try_parse_from([
            "resume-matcher",
            "match",
            "--resume",
            "a.pdf",
            "b.pdf",
            "--jd",
            "Python engineer",
            "--no-llm",
        ])
        .unwrap();

        match cli.command {
            Commands::Match {
                resumes,
                jd,
                no_llm,
                ..
            } => {
                assert_eq!(resumes.len(), 2);
                assert_eq!(jd.as_deref(), Some("Python engineer"));
                assert!(no_llm);
            }
            _ => panic!("expected match command"),
        }
    }

    #[test]
    fn test_match_requires_a_job_description() {
        assert!(Cli::try_parse_from(["resume-matcher", "match", "--resume", "a.pdf"]).is_err());
        assert!(Cli::try_parse_from([
            "resume-matcher",
            "match",
            "--resume",
            "a.pdf",
            "--jd",
            "x",
            "--jd-file",
            "jd.txt",
        ])
        .is_err());
    }

    #[test]
    fn test_store_search_default_k() {
        let cli = Cli::try_parse_from(["resume-matcher", "store", "search", "python"]).unwrap();
        match cli.command {
            Commands::Store {
                action: StoreAction::Search { query, k },
            } => {
                assert_eq!(query, "python");
                assert_eq!(k, 5);
            }
            _ => panic!("expected store search"),
        }
    }

    #[test]
    fn test_validators() {
        assert!(validate_file_extension(Path::new("cv.PDF"), &["pdf"]).is_ok());
        assert!(validate_file_extension(Path::new("cv.docx"), &["pdf"]).is_err());
        assert!(validate_file_extension(Path::new("cv"), &["pdf"]).is_err());
        assert!(validate_threshold(0.6).is_ok());
        assert!(validate_threshold(1.2).is_err());
        assert_eq!(parse_output_format("html").unwrap(), OutputFormat::Html);
    }
}
