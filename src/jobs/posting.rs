//! Job postings and the payload formats they arrive in

use crate::error::{Result, SkillGapError};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));
static ENVELOPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*\{\s*"jobs"\s*:"#).expect("valid envelope pattern"));

/// One job posting, description already reduced to plain text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub url: String,
    pub location: String,
    pub date: String,
    pub description: String,
}

/// A posting as published by the job board. Also accepts the normalized field names.
#[derive(Debug, Deserialize)]
struct RawJob {
    title: Option<String>,
    #[serde(alias = "company_name")]
    company: Option<String>,
    url: Option<String>,
    #[serde(alias = "candidate_required_location")]
    location: Option<String>,
    #[serde(alias = "publication_date")]
    date: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobsEnvelope {
    #[serde(default)]
    jobs: Vec<RawJob>,
}

impl From<RawJob> for JobPosting {
    fn from(raw: RawJob) -> Self {
        let date: String = raw.date.unwrap_or_default().chars().take(10).collect();
        JobPosting {
            title: raw.title.unwrap_or_default(),
            company: raw.company.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
            location: raw.location.unwrap_or_default(),
            date,
            description: strip_html(&raw.description.unwrap_or_default()),
        }
    }
}

/// Plain text of an HTML fragment: entities decoded, tags removed, whitespace collapsed
pub fn strip_html(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    // escaped markup ("&lt;li&gt;") decodes into tags, drop those too
    let text = TAG_PATTERN.replace_all(&text, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `{"jobs": [...]}` as returned by the job board. Any malformed entry fails the whole payload.
pub fn parse_jobs_payload(payload: &str) -> Result<Vec<JobPosting>> {
    let envelope: JobsEnvelope = serde_json::from_str(payload)
        .map_err(|e| SkillGapError::Parse(format!("malformed job postings payload: {}", e)))?;
    Ok(envelope.jobs.into_iter().map(JobPosting::from).collect())
}

/// A JSON list of postings. Any malformed entry fails the whole list.
pub fn parse_job_list(payload: &str) -> Result<Vec<JobPosting>> {
    let jobs: Vec<RawJob> = serde_json::from_str(payload)
        .map_err(|e| SkillGapError::Parse(format!("malformed job postings list: {}", e)))?;
    Ok(jobs.into_iter().map(JobPosting::from).collect())
}

/// One JSON posting per line. Malformed lines are skipped, blank lines ignored.
pub fn parse_job_lines(payload: &str) -> Vec<JobPosting> {
    payload
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str::<RawJob>(line) {
            Ok(raw) => Some(JobPosting::from(raw)),
            Err(e) => {
                warn!("Skipping malformed job posting on line {}: {}", index + 1, e);
                None
            }
        })
        .collect()
}

/// Parse a postings file: a JSON list, a `{"jobs": [...]}` envelope, or JSON lines
pub fn parse_job_file(payload: &str) -> Result<Vec<JobPosting>> {
    if payload.trim_start().starts_with('[') {
        parse_job_list(payload)
    } else if ENVELOPE_PATTERN.is_match(payload) || is_envelope_document(payload) {
        parse_jobs_payload(payload)
    } else {
        Ok(parse_job_lines(payload))
    }
}

/// A single JSON object carrying a `jobs` key, e.g. a saved job board response
fn is_envelope_document(payload: &str) -> bool {
    matches!(
        serde_json::from_str::<serde_json::Value>(payload),
        Ok(serde_json::Value::Object(map)) if map.contains_key("jobs")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_removes_tags_and_entities() {
        let text = strip_html("<p>We use <b>Python</b> &amp; SQL</p><ul><li>Docker&nbsp;skills</li></ul>");
        assert_eq!(text, "We use Python & SQL Docker skills");
    }

    #[test]
    fn test_strip_html_handles_escaped_markup() {
        assert_eq!(strip_html("&lt;li&gt;Kubernetes&lt;/li&gt;"), "Kubernetes");
    }

    #[test]
    fn test_payload_maps_board_fields() {
        let payload = r#"{"job-count": 1, "jobs": [{
            "title": "ML Engineer",
            "company_name": "Acme",
            "url": "https://example.com/1",
            "candidate_required_location": "Worldwide",
            "publication_date": "2024-05-01T10:00:00",
            "description": "<p>PyTorch</p>",
            "salary": "n/a"
        }]}"#;

        let jobs = parse_jobs_payload(payload).unwrap();
        assert_eq!(
            jobs,
            vec![JobPosting {
                title: "ML Engineer".to_string(),
                company: "Acme".to_string(),
                url: "https://example.com/1".to_string(),
                location: "Worldwide".to_string(),
                date: "2024-05-01".to_string(),
                description: "PyTorch".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_and_null_fields_default_to_empty() {
        let jobs = parse_jobs_payload(r#"{"jobs": [{"title": null}]}"#).unwrap();
        assert_eq!(jobs, vec![JobPosting::default()]);
        assert!(parse_jobs_payload("{}").unwrap().is_empty());
    }

    #[test]
    fn test_structured_payload_fails_as_a_whole() {
        let err = parse_jobs_payload(r#"{"jobs": [{"title": "ok"}, {"title": 42}]}"#).unwrap_err();
        assert!(matches!(err, SkillGapError::Parse(_)));
        assert!(parse_job_list("[{\"title\": \"a\"},").is_err());
    }

    #[test]
    fn test_line_delimited_skips_malformed_lines() {
        let payload = "{\"title\": \"a\", \"description\": \"docker\"}\nnot json\n\n{\"title\": \"b\"}\n";
        let jobs = parse_job_lines(payload);
        let titles: Vec<&str> = jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn test_job_file_format_detection() {
        assert_eq!(parse_job_file("[{\"title\": \"a\"}]").unwrap().len(), 1);
        assert_eq!(parse_job_file("  {\n \"jobs\": [{\"title\": \"a\"}]}").unwrap().len(), 1);
        assert_eq!(parse_job_file("{\"title\": \"a\"}\n{\"title\": \"b\"}").unwrap().len(), 2);
        assert!(parse_job_file("{\"jobs\": [oops]}").is_err());

        let saved = "{\n  \"job-count\": 1,\n  \"jobs\": [\n    {\"title\": \"a\"}\n  ]\n}";
        assert_eq!(parse_job_file(saved).unwrap().len(), 1);
    }
}
