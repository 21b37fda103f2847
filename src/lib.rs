//! Hybrid skill scoring and resume-vs-job-demand gap analysis

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod jobs;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{Result, SkillGapError};
