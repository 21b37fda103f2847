//! Error handling for the skill gap analyzer

use std::fmt;
use thiserror::Error;

/// Pipeline stage an error originated from, reported to the user alongside the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Extraction,
    Scoring,
    Fetch,
    Parse,
    Config,
    Output,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Input => "input",
            Stage::Extraction => "extraction",
            Stage::Scoring => "scoring",
            Stage::Fetch => "fetch",
            Stage::Parse => "parse",
            Stage::Config => "config",
            Stage::Output => "output",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SkillGapError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Text extraction error: {0}")]
    Extraction(String),

    #[error("Service unavailable ({stage}): {message}")]
    ServiceUnavailable { stage: Stage, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SkillGapError>;

impl SkillGapError {
    /// The embedding collaborator failed, timed out, or broke its contract
    pub fn scoring(message: impl Into<String>) -> Self {
        SkillGapError::ServiceUnavailable {
            stage: Stage::Scoring,
            message: message.into(),
        }
    }

    /// The job-postings collaborator failed, timed out, or returned a non-success status
    pub fn fetch(message: impl Into<String>) -> Self {
        SkillGapError::ServiceUnavailable {
            stage: Stage::Fetch,
            message: message.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            SkillGapError::Input(_) => Stage::Input,
            SkillGapError::Extraction(_) => Stage::Extraction,
            SkillGapError::ServiceUnavailable { stage, .. } => *stage,
            SkillGapError::Parse(_) => Stage::Parse,
            SkillGapError::Configuration(_) => Stage::Config,
            SkillGapError::Io(_) | SkillGapError::Serialization(_) => Stage::Output,
        }
    }

    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, SkillGapError::ServiceUnavailable { .. })
    }
}

/// model2vec-rs reports load and encode failures through anyhow
impl From<anyhow::Error> for SkillGapError {
    fn from(err: anyhow::Error) -> Self {
        SkillGapError::scoring(format!("{:#}", err))
    }
}

impl From<reqwest::Error> for SkillGapError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SkillGapError::fetch(format!("job postings request timed out: {}", err))
        } else if err.is_decode() {
            SkillGapError::Parse(format!("malformed job postings payload: {}", err))
        } else {
            SkillGapError::fetch(err.to_string())
        }
    }
}
