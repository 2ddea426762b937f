//! Submission checker: checklist compliance for FDA device submission summaries

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use submission_checker::checklist::{BuiltinChecklists, ChecklistSource, DirectoryChecklists};
use submission_checker::cli::{self, ChecklistAction, Cli, Commands, ConfigAction, ModelAction};
use submission_checker::config::{Config, OutputFormat};
use submission_checker::error::{CheckerError, Result};
use submission_checker::input::InputManager;
use submission_checker::output::{save_report_to_file, suggest_filename, DocumentReport, PathwaySource, ReportGenerator};
use submission_checker::processing::embedding_manager::{resolve_model_id, EmbeddingModelManager};
use submission_checker::processing::embeddings::StaticEmbedder;
use submission_checker::processing::pathway::PathwayClassifier;
use submission_checker::processing::text_processor::TextProcessor;
use submission_checker::processing::{ChecklistEvaluator, Pathway};

const SUPPORTED_EXTENSIONS: [&str; 5] = ["pdf", "txt", "text", "md", "markdown"];

/// Options of the `check` command after CLI parsing.
struct CheckOptions {
    files: Vec<PathBuf>,
    pathway: Option<Pathway>,
    output_format: OutputFormat,
    save: Option<PathBuf>,
    detailed: bool,
    strict: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    match run_command(cli.command, config, cli.config).await {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(e) => {
            error!("Command failed: {}", e);
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command succeeded but the process should exit non-zero.
async fn run_command(command: Commands, mut config: Config, config_path: Option<PathBuf>) -> Result<bool> {
    match command {
        Commands::Check {
            files,
            pathway,
            output,
            save,
            detailed,
            checklists,
            fuzzy_threshold,
            semantic_threshold,
            embedding,
            strict,
        } => {
            if let Some(dir) = checklists {
                config.checklists.directory = Some(dir);
            }
            if let Some(fuzzy) = fuzzy_threshold {
                config.matching.fuzzy_threshold = fuzzy;
            }
            if let Some(semantic) = semantic_threshold {
                config.matching.semantic_threshold = semantic;
            }
            if let Some(model) = embedding {
                config.models.embedding_model = model;
            }
            config.validate()?;

            for file in &files {
                cli::validate_file_extension(file, &SUPPORTED_EXTENSIONS)
                    .map_err(|e| CheckerError::InvalidInput(format!("{}: {}", file.display(), e)))?;
            }

            let options = CheckOptions {
                files,
                pathway: pathway.as_deref().map(str::parse::<Pathway>).transpose()?,
                output_format: match output {
                    Some(format) => cli::parse_output_format(&format).map_err(CheckerError::InvalidInput)?,
                    None => config.output.format,
                },
                save,
                detailed: detailed || config.output.detailed,
                strict,
            };

            run_check(&config, options).await
        }

        Commands::Classify { file } => {
            cli::validate_file_extension(&file, &SUPPORTED_EXTENSIONS).map_err(CheckerError::InvalidInput)?;

            let pages = InputManager::new().extract_pages(&file).await?;
            let text_processor = TextProcessor::with_banner_patterns(
                config.normalization.unicode_form,
                &config.normalization.banner_patterns,
            )?;
            let normalized: Vec<_> = pages.iter().map(|p| text_processor.normalize_page(p)).collect();
            let pathway = PathwayClassifier::new().classify_pages(&normalized);

            println!("{}\t{}", pathway.id(), pathway.display_name());
            Ok(true)
        }

        Commands::Checklist { action } => {
            match action {
                ChecklistAction::Show { pathway, checklists } => {
                    let pathway: Pathway = pathway.parse()?;
                    let source: Box<dyn ChecklistSource> = match checklists.or(config.checklists.directory) {
                        Some(dir) => Box::new(DirectoryChecklists::new(dir)),
                        None => Box::new(BuiltinChecklists),
                    };

                    let fields = source.load(pathway)?;
                    println!("📋 {} checklist ({} fields)\n", pathway.display_name(), fields.len());
                    for (i, field) in fields.iter().enumerate() {
                        println!("  {}. {} - {}", i + 1, field.id, field.question);
                        println!("     Key phrases: {}", field.key_phrases.join(" | "));
                    }
                }
            }
            Ok(true)
        }

        Commands::Models { action } => {
            let mut model_manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;

            match action {
                ModelAction::List => {
                    println!("📚 Available Embedding Models\n");
                    for (id, model) in model_manager.list_available_models() {
                        let status = if model_manager.is_model_downloaded(id) {
                            "✅ Downloaded"
                        } else {
                            "⬇️  Available"
                        };
                        println!("  • {} ({}) - {} MB [{}]", id, model.repo_id, model.size_mb, status);
                        println!("    {}", model.description);
                    }

                    if model_manager.list_downloaded_models().is_empty() {
                        println!("\n💡 No models downloaded yet. Get started with:");
                        println!("   submission-checker models download {}", config.models.embedding_model);
                    }
                }

                ModelAction::Download { model, force } => {
                    println!("⬇️  Downloading model: {}", model);
                    let model_path = model_manager.download_model(&model, force).await?;
                    println!("✅ Model '{}' ready", model);
                    println!("📁 Location: {}", model_path.display());
                }

                ModelAction::Info { model } => {
                    let model_info = model_manager
                        .get_model_info(&model)
                        .ok_or_else(|| CheckerError::ModelNotFound(model.clone()))?;
                    let model_id = resolve_model_id(&model).unwrap_or_else(|| model.clone());

                    println!("📋 Model Information for '{}'\n", model_id);
                    println!("Name: {}", model_info.name);
                    println!("Repository: {}", model_info.repo_id);
                    println!("Dimensions: {}", model_info.dimensions);
                    println!("Size: {} MB", model_info.size_mb);
                    println!("Description: {}", model_info.description);

                    match model_manager.get_model_path(&model_id) {
                        Some(path) => println!("Status: ✅ Downloaded ({})", path.display()),
                        None => {
                            println!("Status: ⬇️  Available for download");
                            println!("\n💡 To download this model, run:");
                            println!("   submission-checker models download {}", model_id);
                        }
                    }
                }
            }
            Ok(true)
        }

        Commands::Config { action } => {
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("⚙️  Current Configuration\n");
                    println!("Models Directory: {}", config.models_dir().display());
                    println!("Embedding Model: {}", config.models.embedding_model);
                    println!("Batch Size: {}", config.models.batch_size);
                    println!("\nMatching Thresholds:");
                    println!("  Fuzzy: {:.1}", config.matching.fuzzy_threshold);
                    println!("  Semantic: {:.2}", config.matching.semantic_threshold);
                    println!("\nNormalization:");
                    println!("  Unicode form: {:?}", config.normalization.unicode_form);
                    for pattern in &config.normalization.banner_patterns {
                        println!("  Banner pattern: {}", pattern);
                    }
                    println!("\nChecklists: {}", match &config.checklists.directory {
                        Some(dir) => dir.display().to_string(),
                        None => "built-in".to_string(),
                    });
                    println!("Output Format: {:?}", config.output.format);
                }

                Some(ConfigAction::Reset) => {
                    println!("🔄 Resetting configuration to defaults...");
                    let path = config_path.unwrap_or_else(Config::config_path);
                    Config::default().save_to(&path)?;
                    println!("✅ Configuration reset: {}", path.display());
                }

                Some(ConfigAction::Path) => {
                    println!("{}", config_path.unwrap_or_else(Config::config_path).display());
                }
            }
            Ok(true)
        }
    }
}

/// Evaluate every file, render its report and report whether all were complete.
async fn run_check(config: &Config, options: CheckOptions) -> Result<bool> {
    let embedder = load_embedder(config).await?;
    let model_name = embedder.model_name().to_string();
    let evaluator = ChecklistEvaluator::from_config(config, Box::new(embedder))?;

    let generator = ReportGenerator::with_options(config.output.color_output, options.detailed, true, true);
    let mut input_manager = InputManager::new();

    let progress = if options.files.len() > 1 {
        let bar = ProgressBar::new(options.files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                .map_err(|e| CheckerError::OutputFormatting(e.to_string()))?
                .progress_chars("=> "),
        );
        Some(bar)
    } else {
        None
    };

    let mut all_complete = true;

    for file in &options.files {
        if let Some(bar) = &progress {
            bar.set_message(file.display().to_string());
        }

        let start_time = Instant::now();
        let pages = input_manager.extract_pages(file).await?;
        let report = evaluator.evaluate(&pages, options.pathway)?;
        all_complete &= report.complete;

        let document_report = DocumentReport::new(
            &file.display().to_string(),
            pages.len(),
            report,
            &model_name,
            evaluator.thresholds(),
            if options.pathway.is_some() {
                PathwaySource::Overridden
            } else {
                PathwaySource::Detected
            },
            start_time.elapsed().as_millis() as u64,
        );

        let rendered = generator.generate_report(&document_report, &options.output_format)?;

        match &options.save {
            Some(target) => {
                let path = save_path(target, file, &options.output_format, options.files.len() > 1);
                save_report_to_file(&rendered, &path)?;
                info!("Report saved to {}", path.display());
            }
            None => match &progress {
                Some(bar) => bar.suspend(|| println!("{}", rendered)),
                None => println!("{}", rendered),
            },
        }

        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }

    if let Some(bar) = progress {
        bar.finish_with_message("done");
    }

    Ok(all_complete || !options.strict)
}

/// Catalog models are downloaded into the models directory on first use.
async fn load_embedder(config: &Config) -> Result<StaticEmbedder> {
    let model = &config.models.embedding_model;

    match resolve_model_id(model) {
        Some(model_id) => {
            let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
            let path = manager.ensure_model_available(&model_id).await?;
            StaticEmbedder::new(&path, &model_id, config.models.batch_size)
        }
        None => StaticEmbedder::from_config(config),
    }
}

/// With several documents `--save` names a directory; each report gets a suggested file name.
fn save_path(target: &Path, document: &Path, format: &OutputFormat, multiple: bool) -> PathBuf {
    if multiple || target.is_dir() {
        target.join(suggest_filename(format, &document.to_string_lossy(), false))
    } else {
        target.to_path_buf()
    }
}
