//! CLI interface for the skill gap analyzer

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skill-gap")]
#[command(about = "Hybrid skill scoring and resume-vs-job-market gap analysis")]
#[command(long_about = "Score resumes against a skill catalog using static embeddings plus alias keyword evidence, and rank the skills live job postings demand that the resume does not show")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: console, json
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Save output to file
    #[arg(short, long, global = true)]
    pub save: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect the skills evidenced by a text or resume
    Skills {
        /// Text to analyze (takes precedence over --resume)
        #[arg(short, long)]
        text: Option<String>,

        /// Path to resume file (PDF or text; other files are decoded best-effort)
        #[arg(short, long)]
        resume: Option<PathBuf>,

        /// Number of skills to show (0 shows all)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Compare a resume against the skills job postings demand
    Gap {
        /// Resume text (takes precedence over --resume)
        #[arg(short, long)]
        text: Option<String>,

        /// Path to resume file (PDF or text; other files are decoded best-effort)
        #[arg(short, long)]
        resume: Option<PathBuf>,

        /// Job search query, e.g. "data engineer"
        #[arg(short = 'q', long)]
        job_query: String,

        /// Number of postings to analyze
        #[arg(short, long)]
        num_jobs: Option<usize>,

        /// Minimum average job score for a skill to count as demanded, in [0, 1]
        #[arg(long)]
        job_threshold: Option<f32>,

        /// Read postings from a local JSON / JSON-lines file instead of the job board
        #[arg(long)]
        jobs_file: Option<PathBuf>,

        /// Number of gap rows to show (0 shows all)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// List the analyzed postings
        #[arg(long)]
        show_jobs: bool,

        /// Show the full resume score table
        #[arg(long)]
        show_resume_scores: bool,
    },

    /// Model management commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List available embedding models
    List,

    /// Download an embedding model
    Download {
        /// Model ID, display name or repo ID of a registered model (see `models list`)
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        _ => Err(format!("Invalid output format: {}. Supported: console, json", format)),
    }
}
