//! Output formatters: colored console tables and JSON

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::{GapReport, SkillsReport};
use colored::{Color, Colorize};
use std::path::Path;

pub const NO_SKILLS_HINT: &str = "No skills detected.";
pub const NO_GAPS_HINT: &str = "No clear gaps found. Try a broader query or lower threshold.";

pub trait OutputFormatter {
    fn format_skills(&self, report: &SkillsReport) -> Result<String>;
    fn format_gap(&self, report: &GapReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    show_jobs: bool,
    show_resume_scores: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            show_jobs: false,
            show_resume_scores: false,
        }
    }

    /// List the postings the demand profile was built from
    pub fn with_jobs(mut self, show: bool) -> Self {
        self.show_jobs = show;
        self
    }

    /// Append the full resume score table
    pub fn with_resume_scores(mut self, show: bool) -> Self {
        self.show_resume_scores = show;
        self
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{} {}\n", "█".color(Color::Blue).bold(), title.color(Color::Blue).bold())
        } else {
            format!("\n█ {}\n", title)
        }
    }

    fn score_color(score: f32) -> Color {
        if score >= 0.75 {
            Color::Green
        } else if score >= 0.5 {
            Color::Yellow
        } else {
            Color::Red
        }
    }

    fn format_footer(&self, generated_at: &str, processing_time_ms: u64, model: &str) -> String {
        self.colorize(
            &format!(
                "\nGenerated {} in {}ms with {}\n",
                generated_at, processing_time_ms, model
            ),
            Color::BrightBlack,
        )
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_skills(&self, report: &SkillsReport) -> Result<String> {
        let mut output = String::new();
        output.push_str(&self.format_header("DETECTED SKILLS"));

        if report.skills.is_empty() {
            output.push_str(&format!("{}\n", NO_SKILLS_HINT));
        } else {
            output.push_str(&format!("{:<4} {:<18} {:>7} {:>6}\n", "#", "Skill", "Score", "Hits"));
            for (rank, skill) in report.skills.iter().enumerate() {
                let score = format!("{:>7.3}", skill.score);
                output.push_str(&format!(
                    "{:<4} {:<18} {} {:>6}\n",
                    rank + 1,
                    skill.skill,
                    self.colorize(&score, Self::score_color(skill.score)),
                    skill.keyword_hits
                ));
            }

            let explicit: Vec<String> = report
                .keyword_supported()
                .map(|s| format!("{} ({})", s.skill, s.matched_aliases.join(", ")))
                .collect();
            if !explicit.is_empty() {
                output.push_str(&format!("\nMentioned explicitly: {}\n", explicit.join("; ")));
            }
        }

        output.push_str(&self.format_footer(
            &report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            report.metadata.processing_time_ms,
            &report.metadata.embedding_model,
        ));
        Ok(output)
    }

    fn format_gap(&self, report: &GapReport) -> Result<String> {
        let mut output = String::new();
        output.push_str(&self.format_header("SKILL GAP ANALYSIS"));
        output.push_str(&format!(
            "Query: {} | Postings analyzed: {} | Job threshold: {:.2}\n",
            report.job_query,
            report.postings.len(),
            report.job_threshold
        ));

        if self.show_jobs && !report.postings.is_empty() {
            output.push_str(&self.format_header("JOB POSTINGS"));
            for posting in &report.postings {
                let company = if posting.company.is_empty() {
                    String::new()
                } else {
                    format!(" @ {}", posting.company)
                };
                output.push_str(&format!("  • {}{}", posting.title, company));
                if !posting.location.is_empty() {
                    output.push_str(&format!(" ({})", posting.location));
                }
                output.push('\n');
                if !posting.url.is_empty() {
                    output.push_str(&format!("    {}\n", self.colorize(&posting.url, Color::BrightBlack)));
                }
            }
        }

        output.push_str(&self.format_header("TOP GAPS"));
        if !report.has_gaps() {
            output.push_str(&format!("{}\n", NO_GAPS_HINT));
        } else {
            output.push_str(&format!(
                "{:<18} {:>8} {:>8} {:>8}\n",
                "Skill", "Resume", "Jobs", "Gap"
            ));
            for row in &report.rows {
                let gap = format!("{:>8.3}", row.gap);
                output.push_str(&format!(
                    "{:<18} {:>8.3} {:>8.3} {}\n",
                    row.skill,
                    row.resume_score,
                    row.job_score,
                    self.colorize(&gap, Color::Red)
                ));
            }
            if report.total_gaps > report.rows.len() {
                output.push_str(&format!(
                    "... {} more gaps not shown\n",
                    report.total_gaps - report.rows.len()
                ));
            }
        }

        if self.show_resume_scores && !report.resume_scores.is_empty() {
            output.push_str(&self.format_header("RESUME SCORES"));
            let mut scores: Vec<(&String, &f32)> = report.resume_scores.iter().collect();
            scores.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (skill, score) in scores {
                output.push_str(&format!("{:<18} {:>8.3}\n", skill, score));
            }
        }

        output.push_str(&self.format_footer(
            &report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            report.metadata.processing_time_ms,
            &report.metadata.embedding_model,
        ));
        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_skills(&self, report: &SkillsReport) -> Result<String> {
        self.render(report)
    }

    fn format_gap(&self, report: &GapReport) -> Result<String> {
        self.render(report)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

/// Pick the formatter for `format`
pub fn formatter_for(
    format: &OutputFormat,
    use_colors: bool,
    show_jobs: bool,
    show_resume_scores: bool,
) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Console => Box::new(
            ConsoleFormatter::new(use_colors)
                .with_jobs(show_jobs)
                .with_resume_scores(show_resume_scores),
        ),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(file_path, content)?;
    Ok(())
}
