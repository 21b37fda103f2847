//! Embedding model management: resolving, locating and downloading Model2Vec models

use crate::error::{Result, SkillGapError};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files a Model2Vec model directory must contain
const REQUIRED_FILES: [&str; 3] = ["model.safetensors", "tokenizer.json", "config.json"];
const OPTIONAL_FILES: [&str; 1] = ["README.md"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub description: String,
    pub dimensions: u32,
}

/// Handles download, caching and selection of embedding models
pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    available_models: BTreeMap<String, EmbeddingModelInfo>,
    downloaded_models: HashSet<String>,
    api: Api,
}

impl EmbeddingModelManager {
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        if !models_dir.exists() {
            fs::create_dir_all(&models_dir).await.map_err(|e| {
                SkillGapError::Configuration(format!("Failed to create models directory: {}", e))
            })?;
        }

        let api = Api::new()
            .map_err(|e| SkillGapError::scoring(format!("Failed to initialize HF API: {}", e)))?;

        let mut manager = Self {
            models_dir,
            available_models: BTreeMap::new(),
            downloaded_models: HashSet::new(),
            api,
        };
        manager.init_available_models();
        manager.scan_downloaded_models().await?;

        Ok(manager)
    }

    fn init_available_models(&mut self) {
        self.available_models.insert(
            "potion-base-8M".to_string(),
            EmbeddingModelInfo {
                name: "Potion Base 8M".to_string(),
                repo_id: "minishlab/potion-base-8M".to_string(),
                size_mb: 33,
                description: "Compact Model2Vec embeddings, recommended default".to_string(),
                dimensions: 256,
            },
        );
        self.available_models.insert(
            "potion-base-32M".to_string(),
            EmbeddingModelInfo {
                name: "Potion Base 32M".to_string(),
                repo_id: "minishlab/potion-base-32M".to_string(),
                size_mb: 130,
                description: "Larger Model2Vec embeddings with better recall".to_string(),
                dimensions: 512,
            },
        );
        self.available_models.insert(
            "m2v-base".to_string(),
            EmbeddingModelInfo {
                name: "Model2Vec Base".to_string(),
                repo_id: "minishlab/M2V_base_output".to_string(),
                size_mb: 90,
                description: "Legacy Model2Vec base embeddings model".to_string(),
                dimensions: 256,
            },
        );
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() && Self::is_complete_model_dir(&entry.path()).await {
                self.downloaded_models
                    .insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    async fn is_complete_model_dir(path: &Path) -> bool {
        for file in REQUIRED_FILES {
            if fs::metadata(path.join(file)).await.is_err() {
                return false;
            }
        }
        true
    }

    /// Download a model from the Hugging Face Hub into the models directory
    pub async fn download_model(&mut self, model_id: &str) -> Result<PathBuf> {
        let model_info = self.available_models.get(model_id).ok_or_else(|| {
            SkillGapError::Configuration(format!(
                "Unknown embedding model: {} (run `models list` for the registered models)",
                model_id
            ))
        })?;

        let model_dir = self.models_dir.join(model_id);
        if self.downloaded_models.contains(model_id) {
            return Ok(model_dir);
        }

        info!(
            "Downloading embedding model {} ({} MB) from {}",
            model_info.name, model_info.size_mb, model_info.repo_id
        );
        fs::create_dir_all(&model_dir).await?;

        let repo = self.api.repo(hf_hub::Repo::model(model_info.repo_id.clone()));

        for file in REQUIRED_FILES {
            let cached = repo.get(file).await.map_err(|e| {
                SkillGapError::scoring(format!("Failed to download required file {}: {}", file, e))
            })?;
            fs::copy(&cached, model_dir.join(file)).await?;
            info!("  downloaded {}", file);
        }
        for file in OPTIONAL_FILES {
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await?;
                }
                Err(e) => warn!("Optional file {} not found: {}", file, e),
            }
        }

        self.downloaded_models.insert(model_id.to_string());
        info!("Embedding model {} downloaded", model_info.name);
        Ok(model_dir)
    }

    pub fn get_model_path(&self, model_id: &str) -> Option<PathBuf> {
        if self.downloaded_models.contains(model_id) {
            Some(self.models_dir.join(model_id))
        } else {
            None
        }
    }

    pub async fn ensure_model_available(&mut self, model_id: &str) -> Result<PathBuf> {
        if let Some(path) = self.get_model_path(model_id) {
            return Ok(path);
        }
        self.download_model(model_id).await
    }

    pub fn list_available_models(&self) -> Vec<(&str, &EmbeddingModelInfo)> {
        self.available_models
            .iter()
            .map(|(id, info)| (id.as_str(), info))
            .collect()
    }

    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.downloaded_models.contains(model_id)
    }

    /// Resolve a model ID from an ID, a repo ID, or a display name (case-insensitive)
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        if self.available_models.contains_key(input) {
            return Some(input.to_string());
        }

        let input_lower = input.to_lowercase();
        self.available_models
            .iter()
            .find(|(_, info)| info.repo_id == input || info.name.to_lowercase() == input_lower)
            .map(|(id, _)| id.clone())
    }
}
