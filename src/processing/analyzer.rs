//! Analysis engine: the scoring service shared by every request

use crate::config::Config;
use crate::error::{Result, SkillGapError};
use crate::jobs::{JobPosting, JobSource};
use crate::output::report::{GapReport, ReportMetadata, SkillScore, SkillsReport};
use crate::processing::alias_matcher::KeywordMatch;
use crate::processing::catalog::SkillCatalog;
use crate::processing::demand::DemandAggregator;
use crate::processing::embeddings::{Embedder, Model2VecEmbedder, SemanticScorer};
use crate::processing::gap::{validate_threshold, GapAnalyzer};
use crate::processing::hybrid::HybridScorer;
use crate::processing::{round3, SkillScoreMap};
use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Parameters of one resume-vs-job-demand analysis
#[derive(Debug, Clone)]
pub struct GapRequest {
    pub resume_text: String,
    pub job_query: String,
    pub num_jobs: usize,
    pub job_threshold: f32,
    /// Number of rows to keep, 0 keeps all
    pub top_k: usize,
}

/// Owns the model handle and the cached skill embeddings. Built once at startup and
/// shared by reference; requests never mutate it.
pub struct AnalysisEngine {
    scorer: Arc<HybridScorer>,
    gap_analyzer: GapAnalyzer,
    embedding_timeout: Duration,
    fetch_timeout: Duration,
}

impl AnalysisEngine {
    pub fn new(embedder: Arc<dyn Embedder>, catalog: Arc<SkillCatalog>, config: &Config) -> Result<Self> {
        let semantic = SemanticScorer::new(embedder, catalog);
        let scorer = HybridScorer::new(semantic, config.scoring.keyword_boost)?;

        Ok(Self {
            scorer: Arc::new(scorer),
            gap_analyzer: GapAnalyzer::new(config.scoring.min_gap),
            embedding_timeout: Duration::from_secs(config.embedding.timeout_secs),
            fetch_timeout: Duration::from_secs(config.jobs.timeout_secs),
        })
    }

    /// Load the catalog and embedding model named by the configuration
    pub async fn from_config(config: &Config) -> Result<Self> {
        let catalog = load_catalog(config)?;
        let embedder = Model2VecEmbedder::from_config(config).await?;
        Self::new(Arc::new(embedder), Arc::new(catalog), config)
    }

    pub fn with_timeouts(mut self, embedding: Duration, fetch: Duration) -> Self {
        self.embedding_timeout = embedding;
        self.fetch_timeout = fetch;
        self
    }

    /// Run CPU-bound scoring off the async runtime, bounded by the embedding timeout
    async fn run_scoring<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&HybridScorer) -> Result<T> + Send + 'static,
    {
        let scorer = Arc::clone(&self.scorer);
        let task = tokio::task::spawn_blocking(move || job(scorer.as_ref()));

        match tokio::time::timeout(self.embedding_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(SkillGapError::scoring(format!(
                "embedding task failed: {}",
                join_error
            ))),
            Err(_) => Err(SkillGapError::scoring(format!(
                "embedding model did not respond within {:?}",
                self.embedding_timeout
            ))),
        }
    }

    /// Hybrid score of every catalog skill for `text`
    pub async fn score_text(&self, text: &str) -> Result<SkillScoreMap> {
        let text = text.to_string();
        self.run_scoring(move |scorer| scorer.score(&text)).await
    }

    /// Top-K skills evidenced by `text`, best first (`top_k == 0` keeps all)
    pub async fn detect_skills(&self, text: &str, top_k: usize) -> Result<SkillsReport> {
        let start_time = Instant::now();
        let owned = text.to_string();
        let (scores, matches) = self
            .run_scoring(move |scorer| Ok((scorer.score(&owned)?, scorer.keyword_matches(&owned))))
            .await?;

        let mut skills: Vec<SkillScore> = scores
            .into_iter()
            .map(|(skill, score)| {
                let evidence: Vec<&KeywordMatch> = matches.iter().filter(|m| m.skill == skill).collect();
                SkillScore {
                    keyword_hits: evidence.iter().map(|m| m.count).sum(),
                    matched_aliases: evidence.iter().map(|m| m.alias.clone()).collect(),
                    score: round3(score),
                    skill,
                }
            })
            .collect();
        skills.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.skill.cmp(&b.skill)));

        let total_scored = skills.len();
        if top_k > 0 {
            skills.truncate(top_k);
        }

        Ok(SkillsReport {
            skills,
            total_scored,
            text_length: text.chars().count(),
            metadata: self.metadata(start_time, None),
        })
    }

    /// Fetch postings, failing the request when the source exceeds the fetch timeout
    pub async fn fetch_postings(
        &self,
        source: &dyn JobSource,
        query: &str,
        limit: usize,
    ) -> Result<Vec<JobPosting>> {
        match tokio::time::timeout(self.fetch_timeout, source.fetch(query, limit)).await {
            Ok(result) => result,
            Err(_) => Err(SkillGapError::fetch(format!(
                "{} did not respond within {:?}",
                source.name(),
                self.fetch_timeout
            ))),
        }
    }

    /// Average hybrid score per skill across `postings`
    pub async fn job_demand(&self, postings: Vec<JobPosting>) -> Result<(Vec<JobPosting>, SkillScoreMap)> {
        self.run_scoring(move |scorer| {
            let demand = DemandAggregator::new(scorer).aggregate(&postings)?;
            Ok((postings, demand))
        })
        .await
    }

    /// Full pipeline: resume scores, fetch postings, aggregate demand, rank gaps
    pub async fn gap_analysis(&self, request: &GapRequest, source: &dyn JobSource) -> Result<GapReport> {
        let start_time = Instant::now();

        if request.resume_text.trim().is_empty() {
            return Err(SkillGapError::Input("resume text is empty".to_string()));
        }
        if request.job_query.trim().is_empty() {
            return Err(SkillGapError::Input("job query is empty".to_string()));
        }
        validate_threshold(request.job_threshold)?;

        let resume_scores = self.score_text(&request.resume_text).await?;
        let postings = self
            .fetch_postings(source, request.job_query.trim(), request.num_jobs)
            .await?;
        info!("Analyzing {} job postings", postings.len());
        let (postings, job_scores) = self.job_demand(postings).await?;

        let mut rows = self.gap_analyzer.analyze(
            self.scorer.catalog(),
            &resume_scores,
            &job_scores,
            request.job_threshold,
        )?;
        let total_gaps = rows.len();
        if request.top_k > 0 {
            rows.truncate(request.top_k);
        }

        Ok(GapReport {
            job_query: request.job_query.trim().to_string(),
            job_threshold: request.job_threshold,
            num_jobs_requested: request.num_jobs,
            postings,
            rows,
            total_gaps,
            resume_scores,
            job_scores,
            metadata: self.metadata(start_time, Some(source.name().to_string())),
        })
    }

    fn metadata(&self, start_time: Instant, job_source: Option<String>) -> ReportMetadata {
        ReportMetadata {
            generated_at: chrono::Utc::now(),
            processing_time_ms: start_time.elapsed().as_millis() as u64,
            embedding_model: self.scorer.model_name().to_string(),
            embedding_dimension: self.scorer.embedding_dimension(),
            catalog_size: self.scorer.catalog().len(),
            keyword_boost: self.scorer.keyword_boost(),
            min_gap: self.gap_analyzer.min_gap(),
            job_source,
        }
    }

    pub fn catalog(&self) -> &SkillCatalog {
        self.scorer.catalog()
    }
}

pub fn load_catalog(config: &Config) -> Result<SkillCatalog> {
    match &config.scoring.catalog_path {
        Some(path) => {
            info!("Loading skill catalog from {}", path.display());
            SkillCatalog::from_toml_file(path)
        }
        None => Ok(SkillCatalog::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::testing::{FailingEmbedder, VocabEmbedder};
    use async_trait::async_trait;

    struct FixedJobs(Vec<JobPosting>);

    #[async_trait]
    impl JobSource for FixedJobs {
        async fn fetch(&self, _query: &str, limit: usize) -> Result<Vec<JobPosting>> {
            Ok(self.0.iter().take(limit.max(1)).cloned().collect())
        }

        fn name(&self) -> &str {
            "fixture"
        }
    }

    struct SlowJobs;

    #[async_trait]
    impl JobSource for SlowJobs {
        async fn fetch(&self, _query: &str, _limit: usize) -> Result<Vec<JobPosting>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "slow board"
        }
    }

    fn engine() -> AnalysisEngine {
        let catalog = Arc::new(SkillCatalog::default());
        let embedder = Arc::new(VocabEmbedder::for_catalog(&catalog));
        AnalysisEngine::new(embedder, catalog, &Config::default()).unwrap()
    }

    fn devops_postings(n: usize) -> Vec<JobPosting> {
        (0..n)
            .map(|i| JobPosting {
                title: format!("Platform Engineer {}", i),
                company: "Acme".to_string(),
                description: "Senior platform engineer: Kubernetes and Docker required.".to_string(),
                ..JobPosting::default()
            })
            .collect()
    }

    fn request(resume: &str) -> GapRequest {
        GapRequest {
            resume_text: resume.to_string(),
            job_query: "platform engineer".to_string(),
            num_jobs: 5,
            job_threshold: 0.4,
            top_k: 0,
        }
    }

    #[tokio::test]
    async fn test_gap_analysis_end_to_end() {
        let engine = engine();
        let report = engine
            .gap_analysis(&request("I use Python and SQL"), &FixedJobs(devops_postings(5)))
            .await
            .unwrap();

        assert_eq!(report.postings.len(), 5);
        let skills: Vec<&str> = report.rows.iter().map(|r| r.skill.as_str()).collect();
        assert!(skills.contains(&"kubernetes"));
        assert!(skills.contains(&"docker"));
        assert!(!skills.contains(&"python"));
        assert!(!skills.contains(&"sql"));

        for row in report.rows.iter().filter(|r| r.skill == "kubernetes" || r.skill == "docker") {
            assert!(row.gap > 0.0);
            assert!(row.resume_score <= 0.5 + 1e-6);
        }
    }

    #[tokio::test]
    async fn test_gap_analysis_with_no_postings_reports_nothing() {
        let report = engine()
            .gap_analysis(&request("Python"), &FixedJobs(Vec::new()))
            .await
            .unwrap();
        assert!(report.postings.is_empty());
        assert!(report.job_scores.is_empty());
        assert!(report.rows.is_empty());
    }

    #[tokio::test]
    async fn test_missing_inputs_are_rejected_before_fetching() {
        let engine = engine();
        let mut blank_resume = request("  ");
        let err = engine.gap_analysis(&blank_resume, &SlowJobs).await.unwrap_err();
        assert!(matches!(err, SkillGapError::Input(_)));

        blank_resume.resume_text = "Python".to_string();
        blank_resume.job_query = String::new();
        let err = engine.gap_analysis(&blank_resume, &SlowJobs).await.unwrap_err();
        assert!(matches!(err, SkillGapError::Input(_)));
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_service_unavailable() {
        let engine = engine().with_timeouts(Duration::from_secs(5), Duration::from_millis(50));
        let err = engine.gap_analysis(&request("Python"), &SlowJobs).await.unwrap_err();
        assert!(err.is_service_unavailable());
        assert_eq!(err.stage(), crate::error::Stage::Fetch);
    }

    #[tokio::test]
    async fn test_embedding_failure_yields_no_partial_report() {
        let catalog = Arc::new(SkillCatalog::default());
        let engine = AnalysisEngine::new(Arc::new(FailingEmbedder), catalog, &Config::default()).unwrap();
        let err = engine
            .gap_analysis(&request("Python"), &FixedJobs(devops_postings(2)))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), crate::error::Stage::Scoring);
    }

    #[tokio::test]
    async fn test_detect_skills_top_k() {
        let engine = engine();
        let report = engine
            .detect_skills("Python, pandas and SQL for analytics", 3)
            .await
            .unwrap();

        assert_eq!(report.skills.len(), 3);
        assert_eq!(report.total_scored, engine.catalog().len());
        let top: Vec<&str> = report.skills.iter().map(|s| s.skill.as_str()).collect();
        assert!(top.contains(&"python"));
        assert!(top.contains(&"pandas"));
        assert!(top.contains(&"sql"));
        assert!(report.skills.windows(2).all(|w| w[0].score >= w[1].score));

        let sql = report.skills.iter().find(|s| s.skill == "sql").unwrap();
        assert_eq!(sql.keyword_hits, 1);
        assert_eq!(sql.matched_aliases, vec!["sql".to_string()]);
    }

    #[tokio::test]
    async fn test_detect_skills_reports_matched_aliases() {
        let report = engine()
            .detect_skills("Ran Postgres and MySQL, plus a little numpy", 0)
            .await
            .unwrap();

        let sql = report.skills.iter().find(|s| s.skill == "sql").unwrap();
        assert_eq!(sql.keyword_hits, 2);
        assert_eq!(sql.matched_aliases, vec!["postgres".to_string(), "mysql".to_string()]);

        let docker = report.skills.iter().find(|s| s.skill == "docker").unwrap();
        assert_eq!(docker.keyword_hits, 0);
        assert!(docker.matched_aliases.is_empty());
    }

    #[tokio::test]
    async fn test_detect_skills_blank_text() {
        let report = engine().detect_skills("   ", 10).await.unwrap();
        assert!(report.skills.is_empty());
    }
}
