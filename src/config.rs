//! Configuration management for the skill gap analyzer

use crate::error::{Result, SkillGapError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub scoring: ScoringConfig,
    pub jobs: JobsConfig,
    pub embedding: EmbeddingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub embedding_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Added to the semantic score of a skill whose aliases occur in the text
    pub keyword_boost: f32,
    /// A skill is only reported as a gap when demand exceeds evidence by more than this
    pub min_gap: f32,
    pub default_job_threshold: f32,
    /// Optional TOML skill catalog replacing the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    pub endpoint: String,
    pub default_num_jobs: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    pub top_k: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".skill-gap")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                embedding_model: "potion-base-8M".to_string(),
            },
            scoring: ScoringConfig {
                keyword_boost: 0.25,
                min_gap: 0.05,
                default_job_threshold: 0.40,
                catalog_path: None,
            },
            jobs: JobsConfig {
                endpoint: "https://remotive.com/api/remote-jobs".to_string(),
                default_num_jobs: 10,
                timeout_secs: 20,
            },
            embedding: EmbeddingConfig { timeout_secs: 60 },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
                top_k: 10,
            },
        }
    }
}

impl Config {
    /// Load the config from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SkillGapError::Configuration(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| SkillGapError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SkillGapError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("skill-gap")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f32| -> Result<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(SkillGapError::Configuration(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )))
            }
        };
        unit("scoring.keyword_boost", self.scoring.keyword_boost)?;
        unit("scoring.min_gap", self.scoring.min_gap)?;
        unit("scoring.default_job_threshold", self.scoring.default_job_threshold)?;

        if self.jobs.timeout_secs == 0 || self.embedding.timeout_secs == 0 {
            return Err(SkillGapError::Configuration(
                "timeouts must be at least one second".to_string(),
            ));
        }
        if self.jobs.endpoint.trim().is_empty() {
            return Err(SkillGapError::Configuration("jobs.endpoint is empty".to_string()));
        }
        Ok(())
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }
}
