//! Configuration management for the submission checker

use crate::error::{CheckerError, Result};
use crate::processing::embedding_manager::DEFAULT_EMBEDDING_MODEL;
use crate::processing::field_matcher::{MatchThresholds, DEFAULT_FUZZY_THRESHOLD, DEFAULT_SEMANTIC_THRESHOLD};
use crate::processing::text_processor::{UnicodeForm, DEFAULT_BANNER_PATTERN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub matching: MatchingConfig,
    pub normalization: NormalizationConfig,
    pub checklists: ChecklistConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    /// Catalog id, HuggingFace repo id, or directory name under `models_dir`.
    pub embedding_model: String,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub fuzzy_threshold: f64,
    pub semantic_threshold: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationConfig {
    pub unicode_form: UnicodeForm,
    /// Lines matching any of these (case-insensitive) are dropped as page headers/footers.
    pub banner_patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecklistConfig {
    /// Directory holding `<pathway>.json` files. Built-in checklists when unset.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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
}

impl MatchingConfig {
    pub fn thresholds(&self) -> MatchThresholds {
        MatchThresholds {
            fuzzy: self.fuzzy_threshold,
            semantic: self.semantic_threshold,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".submission-checker")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
                batch_size: 64,
            },
            matching: MatchingConfig {
                fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
                semantic_threshold: DEFAULT_SEMANTIC_THRESHOLD,
            },
            normalization: NormalizationConfig {
                unicode_form: UnicodeForm::Nfc,
                banner_patterns: vec![DEFAULT_BANNER_PATTERN.to_string()],
            },
            checklists: ChecklistConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults there on first use.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CheckerError::Configuration(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| CheckerError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CheckerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.matching.thresholds().validate()?;
        if self.models.batch_size == 0 {
            return Err(CheckerError::Configuration("models.batch_size must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("submission-checker")
            .join("config.toml")
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }
}
