//! Job demand: average hybrid score per skill across a collection of postings

use crate::error::Result;
use crate::jobs::JobPosting;
use crate::processing::hybrid::HybridScorer;
use crate::processing::{clamp01, SkillScoreMap};
use log::debug;
use rayon::prelude::*;

pub struct DemandAggregator<'a> {
    scorer: &'a HybridScorer,
}

impl<'a> DemandAggregator<'a> {
    pub fn new(scorer: &'a HybridScorer) -> Self {
        Self { scorer }
    }

    /// Mean hybrid score per skill. A posting without a score for a skill contributes 0.
    /// Zero postings yield an empty map.
    pub fn aggregate(&self, postings: &[JobPosting]) -> Result<SkillScoreMap> {
        let mut totals = SkillScoreMap::new();
        if postings.is_empty() {
            return Ok(totals);
        }

        // postings are independent; collect keeps input order so the sum below is stable
        let per_posting: Vec<SkillScoreMap> = postings
            .par_iter()
            .map(|posting| self.scorer.score(&posting.description))
            .collect::<Result<Vec<_>>>()?;

        for scores in &per_posting {
            for (skill, value) in scores {
                *totals.entry(skill.clone()).or_insert(0.0) += *value;
            }
        }

        let count = postings.len() as f32;
        debug!("Aggregated skill demand over {} postings", postings.len());

        Ok(totals
            .into_iter()
            .map(|(skill, total)| (skill, clamp01(total / count)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::catalog::SkillCatalog;
    use crate::processing::embeddings::SemanticScorer;
    use crate::processing::hybrid::DEFAULT_KEYWORD_BOOST;
    use crate::processing::testing::{FailingEmbedder, VocabEmbedder};
    use std::sync::Arc;

    fn scorer() -> HybridScorer {
        let catalog = Arc::new(SkillCatalog::default());
        let embedder = Arc::new(VocabEmbedder::for_catalog(&catalog));
        HybridScorer::new(SemanticScorer::new(embedder, catalog), DEFAULT_KEYWORD_BOOST).unwrap()
    }

    fn posting(description: &str) -> JobPosting {
        JobPosting {
            title: "Data Engineer".to_string(),
            description: description.to_string(),
            ..JobPosting::default()
        }
    }

    #[test]
    fn test_no_postings_yields_empty_map() {
        let scorer = scorer();
        assert!(DemandAggregator::new(&scorer).aggregate(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_identical_postings_average_to_single_score() {
        let scorer = scorer();
        let p = posting("Kubernetes, Docker and Terraform on AWS");
        let single = scorer.score(&p.description).unwrap();

        for n in [1, 3, 7] {
            let postings = vec![p.clone(); n];
            let demand = DemandAggregator::new(&scorer).aggregate(&postings).unwrap();
            for (skill, value) in &single {
                assert!((demand[skill] - value).abs() < 1e-5, "n={} skill={}", n, skill);
            }
        }
    }

    #[test]
    fn test_blank_descriptions_count_towards_denominator() {
        let scorer = scorer();
        let p = posting("docker");
        let docker = scorer.score("docker").unwrap()["docker"];

        let demand = DemandAggregator::new(&scorer)
            .aggregate(&[p, posting("")])
            .unwrap();
        assert!((demand["docker"] - docker / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_embedding_failure_aborts_aggregation() {
        let catalog = Arc::new(SkillCatalog::default());
        let scorer = HybridScorer::new(
            SemanticScorer::new(Arc::new(FailingEmbedder), catalog),
            DEFAULT_KEYWORD_BOOST,
        )
        .unwrap();

        let err = DemandAggregator::new(&scorer)
            .aggregate(&[posting("python")])
            .unwrap_err();
        assert!(err.is_service_unavailable());
    }
}
