//! Embedding model catalog, download and local cache for Model2Vec models

use crate::error::{CheckerError, Result};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files Model2Vec needs to load a model from a local directory.
const REQUIRED_FILES: [&str; 3] = ["model.safetensors", "tokenizer.json", "config.json"];
const OPTIONAL_FILES: [&str; 1] = ["README.md"];

pub const DEFAULT_EMBEDDING_MODEL: &str = "potion-base-8M";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub description: String,
    pub dimensions: u32,
}

/// Models offered by `models list` and `models download`, keyed by short id.
pub fn model_catalog() -> BTreeMap<String, EmbeddingModelInfo> {
    let mut models = BTreeMap::new();

    models.insert(
        "potion-base-8M".to_string(),
        EmbeddingModelInfo {
            name: "Potion Base 8M".to_string(),
            repo_id: "minishlab/potion-base-8M".to_string(),
            size_mb: 33,
            description: "Compact static embeddings; recommended default".to_string(),
            dimensions: 256,
        },
    );

    models.insert(
        "potion-base-32M".to_string(),
        EmbeddingModelInfo {
            name: "Potion Base 32M".to_string(),
            repo_id: "minishlab/potion-base-32M".to_string(),
            size_mb: 130,
            description: "Larger vocabulary, better recall on technical wording".to_string(),
            dimensions: 512,
        },
    );

    models.insert(
        "m2v-base".to_string(),
        EmbeddingModelInfo {
            name: "Model2Vec Base".to_string(),
            repo_id: "minishlab/M2V_base_output".to_string(),
            size_mb: 90,
            description: "Legacy Model2Vec base embeddings model".to_string(),
            dimensions: 256,
        },
    );

    models
}

/// Map a short id, repo id or display name onto a catalog id.
pub fn resolve_model_id(input: &str) -> Option<String> {
    let catalog = model_catalog();
    if catalog.contains_key(input) {
        return Some(input.to_string());
    }

    let input_lower = input.to_lowercase();
    catalog
        .iter()
        .find(|(_, info)| info.repo_id == input || info.name.to_lowercase() == input_lower)
        .map(|(id, _)| id.clone())
}

/// Downloads catalog models into `<models_dir>/<id>` and tracks what is present.
pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    available_models: BTreeMap<String, EmbeddingModelInfo>,
    downloaded_models: BTreeSet<String>,
}

impl EmbeddingModelManager {
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        if !models_dir.exists() {
            fs::create_dir_all(&models_dir).await.map_err(|e| {
                CheckerError::Configuration(format!(
                    "Failed to create models directory {}: {}",
                    models_dir.display(),
                    e
                ))
            })?;
        }

        let mut manager = Self {
            models_dir,
            available_models: model_catalog(),
            downloaded_models: BTreeSet::new(),
        };

        manager.scan_downloaded_models().await?;

        Ok(manager)
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if is_model_directory(&entry.path()).await {
                self.downloaded_models
                    .insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    /// Download a catalog model. Existing copies are kept unless `force` is set.
    pub async fn download_model(&mut self, model: &str, force: bool) -> Result<PathBuf> {
        let model_id = resolve_model_id(model)
            .ok_or_else(|| CheckerError::ModelNotFound(format!("Unknown embedding model: {}", model)))?;
        let model_info = self.available_models[&model_id].clone();
        let model_dir = self.models_dir.join(&model_id);

        if self.downloaded_models.contains(&model_id) && !force {
            info!("Embedding model {} already present at {}", model_id, model_dir.display());
            return Ok(model_dir);
        }

        info!(
            "Downloading embedding model {} ({} MB) from {}",
            model_info.name, model_info.size_mb, model_info.repo_id
        );

        fs::create_dir_all(&model_dir).await?;

        let api = Api::new().map_err(|e| CheckerError::embedding(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.model(model_info.repo_id.clone());

        for file in REQUIRED_FILES {
            let cached = repo.get(file).await.map_err(|e| {
                CheckerError::embedding(format!("Failed to download required file {}: {}", file, e))
            })?;
            fs::copy(&cached, model_dir.join(file)).await?;
            info!("Downloaded {}", file);
        }

        for file in OPTIONAL_FILES {
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await?;
                }
                Err(e) => warn!("Optional file {} not available: {}", file, e),
            }
        }

        self.downloaded_models.insert(model_id.clone());
        info!("Embedding model {} ready at {}", model_id, model_dir.display());

        Ok(model_dir)
    }

    pub fn get_model_path(&self, model_id: &str) -> Option<PathBuf> {
        self.downloaded_models
            .contains(model_id)
            .then(|| self.models_dir.join(model_id))
    }

    pub async fn ensure_model_available(&mut self, model: &str) -> Result<PathBuf> {
        if let Some(path) = self.get_model_path(model) {
            return Ok(path);
        }
        self.download_model(model, false).await
    }

    pub fn list_available_models(&self) -> Vec<(&String, &EmbeddingModelInfo)> {
        self.available_models.iter().collect()
    }

    pub fn list_downloaded_models(&self) -> Vec<String> {
        self.downloaded_models.iter().cloned().collect()
    }

    pub fn get_model_info(&self, model: &str) -> Option<&EmbeddingModelInfo> {
        resolve_model_id(model).and_then(|id| self.available_models.get(&id))
    }

    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.downloaded_models.contains(model_id)
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_manager_creates_models_dir() {
        let temp_dir = TempDir::new().unwrap();
        let models_dir = temp_dir.path().join("models");
        let manager = EmbeddingModelManager::new(models_dir.clone()).await.unwrap();

        assert!(models_dir.exists());
        assert!(manager.list_downloaded_models().is_empty());
        assert!(!manager.list_available_models().is_empty());
    }

    #[tokio::test]
    async fn test_scan_requires_all_model_files() {
        let temp_dir = TempDir::new().unwrap();

        let complete = temp_dir.path().join("potion-base-8M");
        std::fs::create_dir_all(&complete).unwrap();
        for file in REQUIRED_FILES {
            std::fs::write(complete.join(file), b"{}").unwrap();
        }

        let partial = temp_dir.path().join("m2v-base");
        std::fs::create_dir_all(&partial).unwrap();
        std::fs::write(partial.join("tokenizer.json"), b"{}").unwrap();

        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();
        assert!(manager.is_model_downloaded("potion-base-8M"));
        assert!(!manager.is_model_downloaded("m2v-base"));
        assert_eq!(manager.get_model_path("potion-base-8M"), Some(complete));
    }

    #[tokio::test]
    async fn test_unknown_model_download_fails_fast() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();
        let result = manager.download_model("no-such-model", false).await;
        assert!(matches!(result, Err(CheckerError::ModelNotFound(_))));
    }

    #[test]
    fn test_resolve_model_id() {
        assert_eq!(resolve_model_id("potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(resolve_model_id("minishlab/potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(resolve_model_id("potion base 8m"), Some("potion-base-8M".to_string()));
        assert_eq!(resolve_model_id("bert-base-uncased"), None);
    }
}
