//! Job-postings collaborators: the live job board and local posting files

use crate::config::JobsConfig;
use crate::error::{Result, SkillGapError};
use crate::jobs::posting::{parse_job_file, parse_jobs_payload, JobPosting};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetch at most `max(1, limit)` postings matching `query`
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<JobPosting>>;

    fn name(&self) -> &str;
}

fn truncate_postings(mut postings: Vec<JobPosting>, limit: usize) -> Vec<JobPosting> {
    postings.truncate(limit.max(1));
    postings
}

/// Remote job board client (Remotive-compatible API)
pub struct RemotiveClient {
    client: Client,
    endpoint: String,
}

impl RemotiveClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("skill-gap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SkillGapError::fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &JobsConfig) -> Result<Self> {
        Self::new(config.endpoint.clone(), Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl JobSource for RemotiveClient {
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<JobPosting>> {
        info!("Fetching job postings for '{}' from {}", query, self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("search", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkillGapError::fetch(format!(
                "job board returned status {}",
                status
            )));
        }

        let body = response.text().await?;
        let postings = truncate_postings(parse_jobs_payload(&body)?, limit);
        debug!("Job board returned {} usable postings", postings.len());
        Ok(postings)
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}

/// Postings read from a local JSON list, `{"jobs": [...]}` envelope, or JSON-lines file.
/// The query is not used for filtering; the file is taken as the result of that query.
pub struct FileJobSource {
    path: PathBuf,
    label: String,
}

impl FileJobSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }
}

#[async_trait]
impl JobSource for FileJobSource {
    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<JobPosting>> {
        info!("Reading job postings for '{}' from {}", query, self.path.display());

        let payload = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SkillGapError::Input(format!(
                "cannot read jobs file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(truncate_postings(parse_job_file(&payload)?, limit))
    }

    fn name(&self) -> &str {
        &self.label
    }
}
