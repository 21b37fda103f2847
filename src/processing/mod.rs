//! Skill scoring and gap analysis

pub mod catalog;
pub mod alias_matcher;
pub mod embeddings;
pub mod embedding_manager;
pub mod hybrid;
pub mod demand;
pub mod gap;
pub mod analyzer;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

use std::collections::BTreeMap;

/// Score in [0, 1] per canonical skill, ordered by skill name
pub type SkillScoreMap = BTreeMap<String, f32>;

pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Round to 3 decimal places for reporting
pub fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}
