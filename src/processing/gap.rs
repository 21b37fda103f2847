//! Gap analysis: which skills the job market asks for that the resume does not evidence

use crate::error::{Result, SkillGapError};
use crate::processing::catalog::SkillCatalog;
use crate::processing::{round3, SkillScoreMap};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_MIN_GAP: f32 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapRow {
    pub skill: String,
    pub resume_score: f32,
    pub job_score: f32,
    pub gap: f32,
}

pub struct GapAnalyzer {
    min_gap: f32,
}

impl GapAnalyzer {
    pub fn new(min_gap: f32) -> Self {
        Self { min_gap }
    }

    /// Rank catalog skills by `job_score - resume_score`.
    ///
    /// A skill is included when `job_score >= threshold` and the gap exceeds the minimum gap,
    /// both tested on unrounded values. Missing map entries count as 0. Rows carry values
    /// rounded to 3 decimals and are sorted by gap desc, job score desc, then skill name.
    pub fn analyze(
        &self,
        catalog: &SkillCatalog,
        resume_scores: &SkillScoreMap,
        job_scores: &SkillScoreMap,
        threshold: f32,
    ) -> Result<Vec<GapRow>> {
        validate_threshold(threshold)?;

        let mut rows: Vec<GapRow> = catalog
            .names()
            .filter_map(|skill| {
                let resume = resume_scores.get(skill).copied().unwrap_or(0.0);
                let job = job_scores.get(skill).copied().unwrap_or(0.0);
                let gap = job - resume;

                (job >= threshold && gap > self.min_gap).then(|| GapRow {
                    skill: skill.to_string(),
                    resume_score: round3(resume),
                    job_score: round3(job),
                    gap: round3(gap),
                })
            })
            .collect();

        rows.sort_by(compare_rows);
        Ok(rows)
    }

    pub fn min_gap(&self) -> f32 {
        self.min_gap
    }
}

impl Default for GapAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_GAP)
    }
}

pub fn validate_threshold(threshold: f32) -> Result<()> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(SkillGapError::Input(format!(
            "job threshold must be within [0, 1], got {}",
            threshold
        )))
    }
}

fn compare_rows(a: &GapRow, b: &GapRow) -> Ordering {
    b.gap
        .total_cmp(&a.gap)
        .then_with(|| b.job_score.total_cmp(&a.job_score))
        .then_with(|| a.skill.cmp(&b.skill))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SkillCatalog {
        SkillCatalog::from_entries(vec![
            ("docker", vec!["docker"]),
            ("kubernetes", vec!["kubernetes"]),
            ("python", vec!["python"]),
            ("sql", vec!["sql"]),
        ])
        .unwrap()
    }

    fn scores(entries: &[(&str, f32)]) -> SkillScoreMap {
        entries.iter().map(|(s, v)| (s.to_string(), *v)).collect()
    }

    #[test]
    fn test_threshold_controls_inclusion() {
        let analyzer = GapAnalyzer::default();
        let resume = scores(&[("docker", 0.0)]);
        let jobs = scores(&[("docker", 0.5)]);

        let rows = analyzer.analyze(&catalog(), &resume, &jobs, 0.4).unwrap();
        assert_eq!(
            rows,
            vec![GapRow {
                skill: "docker".to_string(),
                resume_score: 0.0,
                job_score: 0.5,
                gap: 0.5,
            }]
        );
        assert_eq!(format!("{:.3}", rows[0].gap), "0.500");

        assert!(analyzer.analyze(&catalog(), &resume, &jobs, 0.6).unwrap().is_empty());
    }

    #[test]
    fn test_small_gaps_are_excluded() {
        let analyzer = GapAnalyzer::default();
        let resume = scores(&[("python", 0.7), ("sql", 0.6)]);
        let jobs = scores(&[("python", 0.74), ("sql", 0.9)]);

        let rows = analyzer.analyze(&catalog(), &resume, &jobs, 0.0).unwrap();
        let skills: Vec<&str> = rows.iter().map(|r| r.skill.as_str()).collect();
        assert_eq!(skills, vec!["sql"]);
    }

    #[test]
    fn test_missing_entries_default_to_zero() {
        let rows = GapAnalyzer::default()
            .analyze(&catalog(), &SkillScoreMap::new(), &scores(&[("kubernetes", 0.8)]), 0.4)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].resume_score, 0.0);
        assert_eq!(rows[0].gap, 0.8);
    }

    #[test]
    fn test_ordering_and_tie_break() {
        let resume = SkillScoreMap::new();
        let jobs = scores(&[
            ("sql", 0.6),
            ("python", 0.6),
            ("kubernetes", 0.9),
            ("docker", 0.6),
        ]);

        let rows = GapAnalyzer::default().analyze(&catalog(), &resume, &jobs, 0.0).unwrap();
        let skills: Vec<&str> = rows.iter().map(|r| r.skill.as_str()).collect();
        assert_eq!(skills, vec!["kubernetes", "docker", "python", "sql"]);
    }

    #[test]
    fn test_equal_gap_orders_by_job_score() {
        let resume = scores(&[("docker", 0.2), ("python", 0.4)]);
        let jobs = scores(&[("docker", 0.5), ("python", 0.7)]);

        let rows = GapAnalyzer::default().analyze(&catalog(), &resume, &jobs, 0.0).unwrap();
        let skills: Vec<&str> = rows.iter().map(|r| r.skill.as_str()).collect();
        assert_eq!(skills, vec!["python", "docker"]);
    }

    #[test]
    fn test_threshold_out_of_range_is_input_error() {
        let analyzer = GapAnalyzer::default();
        let empty = SkillScoreMap::new();
        for bad in [-0.1, 1.5, f32::NAN] {
            let err = analyzer.analyze(&catalog(), &empty, &empty, bad).unwrap_err();
            assert!(matches!(err, SkillGapError::Input(_)));
        }
    }
}
