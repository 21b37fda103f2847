//! Semantic skill scoring on top of a pluggable embedding model (Model2Vec by default)

use crate::config::Config;
use crate::error::{Result, SkillGapError};
use crate::processing::catalog::SkillCatalog;
use crate::processing::embedding_manager::EmbeddingModelManager;
use crate::processing::SkillScoreMap;
use anyhow::Context;
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// External embedding collaborator.
///
/// Implementations return one unit-norm vector per input string, all of the same
/// dimension, and must be deterministic for identical input and model version.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn model_name(&self) -> &str;
}

/// Model2Vec static embeddings, normalized to unit length
pub struct Model2VecEmbedder {
    model: StaticModel,
    model_name: String,
}

impl Model2VecEmbedder {
    pub fn load(model_path: &Path, model_name: &str) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None,       // token
            Some(true), // normalize
            None,       // subfolder
        )
        .context("Failed to load embedding model")?;

        info!("Embedding model loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: model_name.to_string(),
        })
    }

    /// Resolve the configured model, downloading it on first use
    pub async fn from_config(config: &Config) -> Result<Self> {
        let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
        let requested = &config.models.embedding_model;
        let model_id = manager
            .resolve_model_id(requested)
            .ok_or_else(|| {
                SkillGapError::Configuration(format!("Unknown embedding model: {}", requested))
            })?;
        let model_path = manager.ensure_model_available(&model_id).await?;

        tokio::task::spawn_blocking(move || Self::load(&model_path, &model_id))
            .await
            .map_err(|e| SkillGapError::scoring(format!("Model loading task failed: {}", e)))?
    }
}

impl Embedder for Model2VecEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.model.encode(texts))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Scores each catalog skill by cosine similarity between a text and the skill's name.
///
/// Skill-name vectors are embedded on first use and cached for the scorer's lifetime.
/// Concurrent first callers block on a single computation; a failed computation is
/// not cached.
pub struct SemanticScorer {
    embedder: Arc<dyn Embedder>,
    catalog: Arc<SkillCatalog>,
    skill_vectors: OnceCell<Vec<Vec<f32>>>,
}

impl SemanticScorer {
    pub fn new(embedder: Arc<dyn Embedder>, catalog: Arc<SkillCatalog>) -> Self {
        Self {
            embedder,
            catalog,
            skill_vectors: OnceCell::new(),
        }
    }

    /// Similarity of `text` to every catalog skill, rescaled into [0, 1].
    /// Empty or whitespace-only text yields an empty map.
    pub fn score(&self, text: &str) -> Result<SkillScoreMap> {
        let mut scores = SkillScoreMap::new();
        if text.trim().is_empty() {
            return Ok(scores);
        }

        let skill_vectors = self.skill_vectors()?;
        let document = self.embed_checked(&[text.to_string()])?;
        let document = &document[0];

        for (name, skill_vector) in self.catalog.names().zip(skill_vectors) {
            let similarity = dot(document, skill_vector)?;
            scores.insert(name.to_string(), rescale_similarity(similarity));
        }

        Ok(scores)
    }

    fn skill_vectors(&self) -> Result<&[Vec<f32>]> {
        self.skill_vectors
            .get_or_try_init(|| {
                let start_time = Instant::now();
                let phrases: Vec<String> = self.catalog.names().map(str::to_string).collect();
                let vectors = self.embed_checked(&phrases)?;
                info!(
                    "Embedded {} catalog skills with {} in {:.2?}",
                    phrases.len(),
                    self.embedder.model_name(),
                    start_time.elapsed()
                );
                Ok(vectors)
            })
            .map(Vec::as_slice)
    }

    /// Embed and verify the collaborator kept its contract
    fn embed_checked(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let vectors = self.embedder.embed(texts)?;

        if vectors.len() != texts.len() {
            return Err(SkillGapError::scoring(format!(
                "embedding model returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        if let Some(first) = vectors.first() {
            let dim = first.len();
            if dim == 0 || vectors.iter().any(|v| v.len() != dim) {
                return Err(SkillGapError::scoring(
                    "embedding model returned vectors of inconsistent dimension",
                ));
            }
        }

        debug!("Embedded {} text(s)", texts.len());
        Ok(vectors)
    }

    pub fn is_warm(&self) -> bool {
        self.skill_vectors.get().is_some()
    }

    pub fn embedding_dimension(&self) -> Option<usize> {
        self.skill_vectors
            .get()
            .and_then(|vectors| vectors.first())
            .map(Vec::len)
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    pub fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }
}

/// Dot product of two vectors; equals cosine similarity for unit-norm inputs
pub fn dot(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(SkillGapError::scoring(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    if !product.is_finite() {
        return Err(SkillGapError::scoring("embedding model produced non-finite values"));
    }
    Ok(product)
}

/// Map a cosine similarity in [-1, 1] onto [0, 1]
pub fn rescale_similarity(similarity: f32) -> f32 {
    ((similarity + 1.0) / 2.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::testing::{CountingEmbedder, FailingEmbedder, VocabEmbedder};
    use std::sync::atomic::Ordering;

    fn scorer_with(embedder: Arc<dyn Embedder>) -> SemanticScorer {
        SemanticScorer::new(embedder, Arc::new(SkillCatalog::default()))
    }

    #[test]
    fn test_scores_cover_catalog_and_stay_in_unit_range() {
        let catalog = Arc::new(SkillCatalog::default());
        let scorer = SemanticScorer::new(Arc::new(VocabEmbedder::for_catalog(&catalog)), catalog.clone());

        let scores = scorer.score("Python, pandas and a little docker").unwrap();
        assert_eq!(scores.len(), catalog.len());
        assert!(scores.values().all(|s| (0.0..=1.0).contains(s)));
        assert!(scores["python"] > scores["kubernetes"]);
    }

    #[test]
    fn test_blank_text_yields_empty_map() {
        let scorer = scorer_with(Arc::new(FailingEmbedder));
        assert!(scorer.score("").unwrap().is_empty());
        assert!(scorer.score("  \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_skill_vectors_computed_once() {
        let catalog = Arc::new(SkillCatalog::default());
        let counting = Arc::new(CountingEmbedder::new(VocabEmbedder::for_catalog(&catalog)));
        let scorer = SemanticScorer::new(counting.clone(), catalog);

        assert!(!scorer.is_warm());
        scorer.score("python").unwrap();
        scorer.score("sql").unwrap();
        assert!(scorer.is_warm());

        // one catalog batch plus one call per document
        assert_eq!(counting.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_concurrent_first_callers_share_one_initialization() {
        let catalog = Arc::new(SkillCatalog::default());
        let counting = Arc::new(CountingEmbedder::new(VocabEmbedder::for_catalog(&catalog)));
        let scorer = Arc::new(SemanticScorer::new(counting.clone(), catalog.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let scorer = scorer.clone();
                std::thread::spawn(move || scorer.score("docker").unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let batch_calls = counting.batch_calls(catalog.len());
        assert_eq!(batch_calls, 1);
    }

    #[test]
    fn test_collaborator_failure_is_service_unavailable() {
        let scorer = scorer_with(Arc::new(FailingEmbedder));
        let err = scorer.score("python").unwrap_err();
        assert!(err.is_service_unavailable());
        assert!(!scorer.is_warm());
    }

    #[test]
    fn test_dot_dimension_mismatch() {
        assert!(dot(&[1.0, 0.0], &[1.0]).is_err());
        assert!((dot(&[0.6, 0.8], &[0.6, 0.8]).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rescale_similarity_bounds() {
        assert_eq!(rescale_similarity(-1.0), 0.0);
        assert_eq!(rescale_similarity(0.0), 0.5);
        assert_eq!(rescale_similarity(1.0), 1.0);
        assert_eq!(rescale_similarity(1.0001), 1.0);
    }
}
