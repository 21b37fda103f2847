//! Input manager: reads documents from disk and routes them to the right extractor

use crate::error::{Result, SkillGapError};
use crate::input::text_extractor::extract_text;
use log::info;
use std::collections::HashMap;
use std::path::Path;

pub struct InputManager {
    cache: HashMap<String, String>,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Inline text wins over a resume file; one of the two must yield non-blank text.
    /// Any existing file is accepted, the extractor is picked from its extension.
    pub async fn resolve_resume_text(&mut self, text: Option<String>, resume: Option<&Path>) -> Result<String> {
        if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
            return Ok(text);
        }

        let path = resume.ok_or_else(|| {
            SkillGapError::Input("provide resume text with --text or a file with --resume".to_string())
        })?;
        let text = self.extract_text(path).await?;
        if text.trim().is_empty() {
            return Err(SkillGapError::Input(format!(
                "no text could be extracted from {}",
                path.display()
            )));
        }

        info!("Extracted {} characters from {}", text.chars().count(), path.display());
        Ok(text)
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy().to_string();

        if let Some(cached_text) = self.cache.get(&path_str) {
            info!("Using cached text for: {}", path.display());
            return Ok(cached_text.clone());
        }

        if !path.exists() {
            return Err(SkillGapError::Extraction(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            SkillGapError::Extraction(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        info!("Extracting text from: {}", path.display());
        let text = tokio::task::spawn_blocking(move || extract_text(&file_name, &bytes))
            .await
            .map_err(|e| SkillGapError::Extraction(format!("Extraction task failed: {}", e)))??;

        self.cache.insert(path_str, text.clone());

        Ok(text)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
