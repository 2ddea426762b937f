//! CLI interface for the submission checker

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "submission-checker")]
#[command(about = "Checklist compliance checker for FDA device submission summaries")]
#[command(long_about = "Locate required informational fields in 510(k), De Novo and PMA decision summaries using exact, fuzzy and semantic matching, with page-level evidence")]
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
    /// Check one or more submission documents against their pathway checklist
    Check {
        /// Documents to check (PDF, TXT, MD)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Force a pathway instead of detecting it: 510k, denovo, pma
        #[arg(short, long)]
        pathway: Option<String>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to a file (single document) or directory (several documents)
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Show questions, matched phrases and thresholds
        #[arg(short, long)]
        detailed: bool,

        /// Directory of <pathway>.json checklists to use instead of the built-in ones
        #[arg(long)]
        checklists: Option<PathBuf>,

        /// Minimum fuzzy score, 0-100
        #[arg(long)]
        fuzzy_threshold: Option<f64>,

        /// Minimum cosine similarity, -1.0 to 1.0
        #[arg(long)]
        semantic_threshold: Option<f32>,

        /// Embedding model to use
        #[arg(short, long)]
        embedding: Option<String>,

        /// Exit with a non-zero status when any document is incomplete
        #[arg(long)]
        strict: bool,
    },

    /// Print the detected pathway of a document
    Classify {
        /// Document to classify (PDF, TXT, MD)
        file: PathBuf,
    },

    /// Checklist inspection
    Checklist {
        #[command(subcommand)]
        action: ChecklistAction,
    },

    /// Embedding model management commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ChecklistAction {
    /// List the fields of a pathway checklist
    Show {
        /// Pathway: 510k, denovo, pma
        pathway: String,

        /// Directory of <pathway>.json checklists
        #[arg(long)]
        checklists: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List available embedding models
    List,

    /// Download an embedding model
    Download {
        /// Model id, name or HuggingFace repo ID
        model: String,

        /// Force re-download if model exists
        #[arg(short, long)]
        force: bool,
    },

    /// Show model information
    Info {
        /// Model name
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
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

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(parse_output_format("md").unwrap(), OutputFormat::Markdown);
        assert!(parse_output_format("html").is_err());
    }

    #[test]
    fn test_check_command_parses() {
        let cli = Cli::try_parse_from([
            "submission-checker",
            "check",
            "a.pdf",
            "b.txt",
            "--pathway",
            "510k",
            "--fuzzy-threshold",
            "80",
            "--strict",
        ])
        .unwrap();

        match cli.command {
            Commands::Check {
                files,
                pathway,
                fuzzy_threshold,
                strict,
                ..
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(pathway.as_deref(), Some("510k"));
                assert_eq!(fuzzy_threshold, Some(80.0));
                assert!(strict);
            }
            _ => panic!("expected check command"),
        }
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("K123456.PDF"), &["pdf", "txt", "md"]).is_ok());
        assert!(validate_file_extension(Path::new("summary.docx"), &["pdf", "txt", "md"]).is_err());
        assert!(validate_file_extension(Path::new("summary"), &["pdf"]).is_err());
    }
}
