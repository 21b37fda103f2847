//! Skill catalog: canonical skill names and the alias phrases that evidence them

use crate::error::{Result, SkillGapError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One canonical skill and its surface forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    pub name: String,
    pub aliases: Vec<String>,
}

/// Immutable, ordered set of canonical skills. Every skill carries at least one alias.
#[derive(Debug, Clone)]
pub struct SkillCatalog {
    skills: Vec<Skill>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    skills: BTreeMap<String, Vec<String>>,
}

impl SkillCatalog {
    /// Build a catalog from `(name, aliases)` pairs, keeping their order
    pub fn from_entries<I, S, A>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, A)>,
        S: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let mut skills: Vec<Skill> = Vec::new();

        for (name, aliases) in entries {
            let name: String = name.into();
            let name = name.trim().to_lowercase();
            if name.is_empty() {
                return Err(SkillGapError::Configuration(
                    "skill catalog contains an empty skill name".to_string(),
                ));
            }
            if skills.iter().any(|s| s.name == name) {
                return Err(SkillGapError::Configuration(format!(
                    "skill '{}' is defined twice",
                    name
                )));
            }

            let aliases: Vec<String> = aliases
                .into_iter()
                .map(|a| {
                    let alias: String = a.into();
                    alias.trim().to_string()
                })
                .filter(|a| !a.is_empty())
                .collect();
            if aliases.is_empty() {
                return Err(SkillGapError::Configuration(format!(
                    "skill '{}' has no aliases",
                    name
                )));
            }

            skills.push(Skill { name, aliases });
        }

        if skills.is_empty() {
            return Err(SkillGapError::Configuration("skill catalog is empty".to_string()));
        }

        Ok(Self { skills })
    }

    /// Load a catalog from a TOML file with a `[skills]` table of `name = ["alias", ...]`.
    /// Skills are ordered by name.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SkillGapError::Configuration(format!(
                "Failed to read skill catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        let file: CatalogFile = toml::from_str(&content).map_err(|e| {
            SkillGapError::Configuration(format!("Failed to parse skill catalog: {}", e))
        })?;
        Self::from_entries(file.skills)
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(|s| s.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl Default for SkillCatalog {
    fn default() -> Self {
        let entries: &[(&str, &[&str])] = &[
            // Core data & Python
            ("python", &["python", "py"]),
            ("pandas", &["pandas"]),
            ("numpy", &["numpy", "np"]),
            (
                "sql",
                &[
                    "sql", "postgres", "postgresql", "mysql", "sqlite", "snowflake", "bigquery",
                    "mssql", "sql server",
                ],
            ),
            ("excel", &["excel", "microsoft excel", "pivot table", "vlookup"]),
            ("git", &["git", "github", "gitlab"]),
            // ML / AI
            ("scikit-learn", &["scikit-learn", "sklearn"]),
            ("tensorflow", &["tensorflow", "tf"]),
            ("pytorch", &["pytorch", "torch"]),
            ("xgboost", &["xgboost"]),
            ("lightgbm", &["lightgbm", "lgbm"]),
            ("nlp", &["nlp", "natural language processing"]),
            ("computer vision", &["computer vision", "cv"]),
            // GenAI / RAG
            ("openai api", &["openai", "chatgpt api", "gpt-4", "gpt4", "gpt-3.5"]),
            ("hugging face", &["huggingface", "hugging face", "transformers"]),
            ("vector db", &["faiss", "pinecone", "weaviate", "milvus", "chromadb"]),
            // Apps / Web
            ("streamlit", &["streamlit"]),
            ("fastapi", &["fastapi"]),
            ("flask", &["flask"]),
            ("rest api", &["rest", "rest api", "http api"]),
            // Cloud / Infra
            (
                "aws",
                &["aws", "amazon web services", "s3", "lambda", "ec2", "athena", "redshift"],
            ),
            ("gcp", &["gcp", "google cloud", "bigquery", "vertex ai"]),
            ("azure", &["azure", "azure ml"]),
            ("docker", &["docker"]),
            ("kubernetes", &["kubernetes", "k8s"]),
            // Data platforms
            ("spark", &["spark", "pyspark"]),
            ("airflow", &["airflow", "apache airflow"]),
            ("dbt", &["dbt"]),
        ];

        let skills = entries
            .iter()
            .map(|(name, aliases)| Skill {
                name: name.to_string(),
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
            })
            .collect();

        Self { skills }
    }
}
