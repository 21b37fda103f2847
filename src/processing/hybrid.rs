//! Hybrid scoring: semantic similarity plus a fixed boost for explicit alias evidence

use crate::error::Result;
use crate::processing::alias_matcher::{AliasMatcher, KeywordMatch};
use crate::processing::catalog::SkillCatalog;
use crate::processing::embeddings::SemanticScorer;
use crate::processing::{clamp01, SkillScoreMap};

pub const DEFAULT_KEYWORD_BOOST: f32 = 0.25;

pub struct HybridScorer {
    semantic: SemanticScorer,
    matcher: AliasMatcher,
    keyword_boost: f32,
}

impl HybridScorer {
    pub fn new(semantic: SemanticScorer, keyword_boost: f32) -> Result<Self> {
        let matcher = AliasMatcher::new(semantic.catalog())?;
        Ok(Self {
            semantic,
            matcher,
            keyword_boost: clamp01(keyword_boost),
        })
    }

    /// `clamp01(semantic + boost)` per skill, the boost applying when any alias occurs.
    /// Skills without a semantic score are absent, so blank text yields an empty map.
    pub fn score(&self, text: &str) -> Result<SkillScoreMap> {
        let semantic = self.semantic.score(text)?;
        if semantic.is_empty() {
            return Ok(semantic);
        }

        let hits = self.matcher.count(text);
        Ok(semantic
            .into_iter()
            .map(|(skill, value)| {
                let boost = if hits.contains_key(&skill) {
                    self.keyword_boost
                } else {
                    0.0
                };
                (skill, clamp01(value + boost))
            })
            .collect())
    }

    pub fn semantic_scores(&self, text: &str) -> Result<SkillScoreMap> {
        self.semantic.score(text)
    }

    pub fn keyword_matches(&self, text: &str) -> Vec<KeywordMatch> {
        self.matcher.find_matches(text)
    }

    pub fn keyword_boost(&self) -> f32 {
        self.keyword_boost
    }

    pub fn model_name(&self) -> &str {
        self.semantic.model_name()
    }

    pub fn embedding_dimension(&self) -> Option<usize> {
        self.semantic.embedding_dimension()
    }

    pub fn catalog(&self) -> &SkillCatalog {
        self.semantic.catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::testing::VocabEmbedder;
    use std::sync::Arc;

    fn scorer() -> HybridScorer {
        let catalog = Arc::new(SkillCatalog::default());
        let embedder = Arc::new(VocabEmbedder::for_catalog(&catalog));
        HybridScorer::new(SemanticScorer::new(embedder, catalog), DEFAULT_KEYWORD_BOOST).unwrap()
    }

    #[test]
    fn test_hybrid_never_below_semantic() {
        let scorer = scorer();
        let text = "Built ETL in PySpark and Airflow, deployed with Docker on k8s";
        let semantic = scorer.semantic_scores(text).unwrap();
        let hybrid = scorer.score(text).unwrap();

        assert_eq!(semantic.len(), hybrid.len());
        for (skill, value) in &semantic {
            assert!(hybrid[skill] >= *value, "{} dropped", skill);
            assert!((0.0..=1.0).contains(&hybrid[skill]));
        }
    }

    #[test]
    fn test_boost_applies_only_to_matched_skills() {
        let scorer = scorer();
        let text = "docker compose files";
        let semantic = scorer.semantic_scores(text).unwrap();
        let hybrid = scorer.score(text).unwrap();

        assert!((hybrid["docker"] - clamp01(semantic["docker"] + 0.25)).abs() < 1e-6);
        assert_eq!(hybrid["pandas"], semantic["pandas"]);
    }

    #[test]
    fn test_keyword_matches_name_the_evidence() {
        let matches = scorer().keyword_matches("Shipped on k8s and Kubernetes, tracked in GitHub");
        let found: Vec<(&str, &str, usize)> = matches
            .iter()
            .map(|m| (m.skill.as_str(), m.alias.as_str(), m.count))
            .collect();
        assert_eq!(
            found,
            vec![("git", "github", 1), ("kubernetes", "kubernetes", 1), ("kubernetes", "k8s", 1)]
        );
    }

    #[test]
    fn test_blank_text_yields_empty_map() {
        assert!(scorer().score("   ").unwrap().is_empty());
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let scorer = scorer();
        let text = "SQL, Excel pivot tables and some Python";
        assert_eq!(scorer.score(text).unwrap(), scorer.score(text).unwrap());
    }
}
