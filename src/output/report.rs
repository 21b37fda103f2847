//! Report structures produced by the analysis engine

use crate::jobs::JobPosting;
use crate::processing::gap::GapRow;
use crate::processing::SkillScoreMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One detected skill with its hybrid score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillScore {
    pub skill: String,
    /// Hybrid score rounded to 3 decimals
    pub score: f32,
    /// Number of alias occurrences found in the text
    pub keyword_hits: usize,
    /// Aliases that occurred, in catalog order
    pub matched_aliases: Vec<String>,
}

/// Skill detection over a single text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsReport {
    /// Best first, ties broken by skill name
    pub skills: Vec<SkillScore>,

    /// Skills scored before the top-K cut
    pub total_scored: usize,

    /// Length of the analyzed text in characters
    pub text_length: usize,

    pub metadata: ReportMetadata,
}

/// Resume-vs-job-demand gap analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapReport {
    pub job_query: String,
    pub job_threshold: f32,
    pub num_jobs_requested: usize,

    /// Postings the demand profile was built from
    pub postings: Vec<JobPosting>,

    /// Ranked gap rows, already cut to top-K
    pub rows: Vec<GapRow>,

    /// Rows found before the top-K cut
    pub total_gaps: usize,

    pub resume_scores: SkillScoreMap,
    pub job_scores: SkillScoreMap,

    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub embedding_model: String,
    pub embedding_dimension: Option<usize>,
    pub catalog_size: usize,
    pub keyword_boost: f32,
    pub min_gap: f32,
    /// Where postings came from; absent for skill detection
    pub job_source: Option<String>,
}

impl GapReport {
    pub fn has_gaps(&self) -> bool {
        !self.rows.is_empty()
    }
}

impl SkillsReport {
    /// Skills with explicit alias evidence in the text
    pub fn keyword_supported(&self) -> impl Iterator<Item = &SkillScore> {
        self.skills.iter().filter(|s| s.keyword_hits > 0)
    }
}
