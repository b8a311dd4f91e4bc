//! Resume matcher: score PDF resumes against a job description

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use resume_matcher::cli::{self, Cli, Commands, ConfigAction, ModelAction, StoreAction};
use resume_matcher::config::Config;
use resume_matcher::input::manager::InputManager;
use resume_matcher::llm::client::GeminiClient;
use resume_matcher::llm::LlmBackend;
use resume_matcher::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use resume_matcher::processing::embedding_manager::EmbeddingModelManager;
use resume_matcher::processing::embeddings::{Embedder, Model2VecEmbedder};
use resume_matcher::processing::pipeline::MatchPipeline;
use resume_matcher::store::VectorStore;
use resume_matcher::{Result, ResumeMatcherError};
use std::path::Path;
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if !config.output.color_output {
        colored::control::set_override(false);
    }

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Match {
            resumes,
            jd,
            jd_file,
            threshold,
            embedding,
            no_llm,
            no_store,
            output,
            save,
            detailed,
        } => {
            for resume in &resumes {
                cli::validate_file_extension(resume, &["pdf", "txt", "md"]).map_err(|e| {
                    ResumeMatcherError::InvalidInput(format!("{}: {}", resume.display(), e))
                })?;
            }

            let threshold = match threshold {
                Some(t) => cli::validate_threshold(t).map_err(ResumeMatcherError::InvalidInput)?,
                None => config.scoring.fit_threshold,
            };
            let output_format = match output {
                Some(o) => cli::parse_output_format(&o).map_err(ResumeMatcherError::InvalidInput)?,
                None => config.output.format,
            };

            let job_description = match (jd, jd_file) {
                (Some(text), _) => text,
                (None, Some(path)) => InputManager::new().extract_text(&path).await?,
                (None, None) => {
                    return Err(ResumeMatcherError::InvalidInput(
                        "Provide --jd or --jd-file".to_string(),
                    ))
                }
            };

            println!("{}", "🚀 Resume matching".bold());
            println!("📄 Resumes: {}", resumes.len());
            println!("🎯 Fit threshold: {:.2}", threshold);

            let embedder = load_embedder(&config, embedding.as_deref()).await?;

            let llm = if no_llm || !config.llm.enabled {
                println!("⚠️  LLM assessment disabled");
                None
            } else {
                let client = GeminiClient::from_config(&config.llm)?;
                println!("🤖 LLM: {}", client.model_name());
                Some(client)
            };

            let mut pipeline = MatchPipeline::new(&embedder, threshold);
            if !no_store && config.store.enabled {
                let store = VectorStore::open(&config.store.persist_dir, &config.store.collection)?
                    .with_embedder(&embedder);
                pipeline = pipeline.with_store(store);
            }
            if let Some(client) = &llm {
                pipeline = pipeline.with_llm(client);
            }

            let progress = spinner(&format!("Scoring {} resume(s)...", resumes.len()));
            let result = pipeline.run(&resumes, &job_description).await;
            progress.finish_and_clear();
            let report = result?;

            let detailed = detailed || config.output.detailed;
            match save {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(suggest_filename(&output_format, "match_report", true))
                    } else {
                        path
                    };
                    let content = ReportGenerator::with_options(false, detailed)
                        .generate_report(&report, &output_format)?;
                    save_report_to_file(&content, &path)?;
                    println!("💾 Report saved to {}", path.display());
                }
                None => {
                    let generator =
                        ReportGenerator::with_options(config.output.color_output, detailed);
                    println!("{}", generator.generate_report(&report, &output_format)?);
                }
            }

            info!(
                "Done: {} of {} resume(s) fit",
                report.fit_count(),
                report.entries.len()
            );
        }

        Commands::Models { action } => {
            let mut manager = EmbeddingModelManager::new(config.models.models_dir.clone()).await?;

            match action {
                ModelAction::List => {
                    println!("🧠 Embedding Models\n");
                    for model in manager.list_available_models() {
                        let status = if manager.is_model_downloaded(model.id) {
                            "✅ Downloaded".green()
                        } else {
                            "⬇️  Available".normal()
                        };
                        let default = if model.id == config.models.default_embedding_model {
                            " (default)"
                        } else {
                            ""
                        };
                        println!(
                            "  • {}{} [{}] - {} MB, {} dims",
                            model.id.bold(),
                            default,
                            status,
                            model.size_mb,
                            model.dimensions
                        );
                        println!("    {}", model.description);
                    }

                    if manager.list_downloaded_models().is_empty() {
                        println!("\n💡 No models downloaded yet. Get started with:");
                        println!(
                            "   resume-matcher models download {}",
                            config.models.default_embedding_model
                        );
                    }
                }

                ModelAction::Download { model, force } => {
                    let id = manager
                        .resolve_model_id(&model)
                        .ok_or_else(|| ResumeMatcherError::ModelNotFound(model.clone()))?;

                    if !force && manager.is_model_downloaded(&id) {
                        println!("✅ Model '{}' is already downloaded!", id);
                        println!("💡 Use --force to re-download");
                        return Ok(());
                    }

                    let progress = spinner(&format!("Downloading {}...", id));
                    let result = manager.download_model(&id, force).await;
                    progress.finish_and_clear();
                    let path = result?;

                    println!("✅ Model '{}' downloaded successfully!", id);
                    println!("📁 Location: {}", path.display());
                }

                ModelAction::Remove { model } => {
                    if manager.remove_model(&model).await? {
                        println!("✅ Model '{}' removed", model);
                    } else {
                        println!("⚠️  Model '{}' is not downloaded", model);
                    }
                }

                ModelAction::Info { model } => {
                    let id = manager
                        .resolve_model_id(&model)
                        .ok_or_else(|| ResumeMatcherError::ModelNotFound(model.clone()))?;
                    let info = manager
                        .get_model_info(&id)
                        .ok_or_else(|| ResumeMatcherError::ModelNotFound(model.clone()))?;

                    println!("📋 Model Information for '{}'\n", info.id);
                    println!("Name: {}", info.name);
                    println!("Repository: {}", info.repo_id);
                    println!("Size: {} MB", info.size_mb);
                    println!("Dimensions: {}", info.dimensions);
                    println!("Description: {}", info.description);
                    match manager.get_model_path(&id) {
                        Some(path) => println!("Status: ✅ Downloaded ({})", path.display()),
                        None => {
                            println!("Status: ⬇️  Available for download");
                            println!("\n💡 To download this model, run:");
                            println!("   resume-matcher models download {}", info.id);
                        }
                    }
                }
            }
        }

        Commands::Store { action } => {
            let store_dir = &config.store.persist_dir;
            let collection = &config.store.collection;

            match action {
                StoreAction::List => {
                    let store = VectorStore::open(store_dir, collection)?;
                    println!(
                        "🗄️  Collection '{}' ({} document(s))\n",
                        store.collection(),
                        store.len()
                    );
                    for doc in store.documents() {
                        println!(
                            "  • {} {} [{} words, {}] added {}",
                            doc.id.bold(),
                            doc.source().unwrap_or("<unknown>"),
                            doc.metadata.get("word_count").map(String::as_str).unwrap_or("?"),
                            doc.embedding_model,
                            doc.added_at.format("%Y-%m-%d %H:%M")
                        );
                    }
                }

                StoreAction::Search { query, k } => {
                    let embedder = load_embedder(&config, None).await?;
                    let store = VectorStore::open(store_dir, collection)?.with_embedder(&embedder);
                    let hits = store.search(&query, k)?;

                    if hits.is_empty() {
                        println!("No stored resumes to search.");
                    }
                    for (index, hit) in hits.iter().enumerate() {
                        println!(
                            "{:>3}. {:.2}  {} ({})",
                            index + 1,
                            hit.score,
                            hit.source.as_deref().unwrap_or("<unknown>"),
                            hit.id
                        );
                    }
                }

                StoreAction::Clear => {
                    let mut store = VectorStore::open(store_dir, collection)?;
                    let removed = store.len();
                    store.clear();
                    store.persist()?;
                    println!("🗑️  Removed {} document(s) from '{}'", removed, collection);
                }
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let content = toml::to_string_pretty(&config).map_err(|e| {
                    ResumeMatcherError::Configuration(format!("Failed to serialize config: {}", e))
                })?;
                println!("⚙️  Current Configuration ({})\n", config_path.display());
                println!("{}", content);
            }

            Some(ConfigAction::Reset) => {
                Config::default().save_to(config_path)?;
                println!("✅ Configuration reset to defaults");
            }

            Some(ConfigAction::Set { key, value }) => {
                let mut config = config;
                config.set(&key, &value)?;
                config.save_to(config_path)?;
                println!("✅ {} = {}", key, value);
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }
        },
    }

    Ok(())
}

/// Load the requested embedding model, downloading it on first use.
async fn load_embedder(config: &Config, model: Option<&str>) -> Result<Model2VecEmbedder> {
    let requested = model.unwrap_or(&config.models.default_embedding_model);
    let mut manager = EmbeddingModelManager::new(config.models.models_dir.clone()).await?;
    let model_id = manager
        .resolve_model_id(requested)
        .ok_or_else(|| ResumeMatcherError::ModelNotFound(requested.to_string()))?;

    let path = match manager.get_model_path(&model_id) {
        Some(path) => path,
        None => {
            warn!("Embedding model '{}' is not downloaded yet", model_id);
            let progress = spinner(&format!("Downloading embedding model {}...", model_id));
            let result = manager.ensure_model_available(&model_id).await;
            progress.finish_and_clear();
            result?
        }
    };

    let progress = spinner("Loading embedding model...");
    let embedder = Model2VecEmbedder::load(&path, &model_id);
    progress.finish_and_clear();
    let embedder = embedder?;

    println!("🧠 Embedding model: {}", embedder.model_name());
    Ok(embedder)
}

fn spinner(message: &str) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.set_message(message.to_string());
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}
