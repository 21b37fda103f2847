//! Shared helpers for integration tests

use skill_gap::config::Config;
use skill_gap::processing::analyzer::AnalysisEngine;
use skill_gap::processing::catalog::SkillCatalog;
use skill_gap::processing::testing::VocabEmbedder;
use std::path::PathBuf;
use std::sync::Arc;

pub fn engine_with(catalog: SkillCatalog) -> AnalysisEngine {
    let catalog = Arc::new(catalog);
    let embedder = Arc::new(VocabEmbedder::for_catalog(&catalog));
    AnalysisEngine::new(embedder, catalog, &Config::default()).unwrap()
}

pub fn engine() -> AnalysisEngine {
    engine_with(SkillCatalog::default())
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}
