//! skill-gap: hybrid skill scoring and resume-vs-job-market gap analysis

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use skill_gap::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use skill_gap::config::{Config, OutputFormat};
use skill_gap::error::{Result, SkillGapError};
use skill_gap::input::InputManager;
use skill_gap::jobs::{FileJobSource, JobSource, RemotiveClient};
use skill_gap::output::{formatter_for, save_report_to_file};
use skill_gap::processing::analyzer::{AnalysisEngine, GapRequest};
use skill_gap::processing::embedding_manager::EmbeddingModelManager;
use std::path::Path;
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error ({}): {}", e.stage(), e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    // config management must work even when the current file is broken
    if let Commands::Config { action: Some(action @ (ConfigAction::Reset | ConfigAction::Path)) } = &cli.command {
        return match action {
            ConfigAction::Reset => {
                Config::default().save_to(&config_path)?;
                println!("Configuration reset to defaults at {}", config_path.display());
                Ok(())
            }
            _ => {
                println!("{}", config_path.display());
                Ok(())
            }
        };
    }

    let config = load_config(cli.config.as_deref())?;
    let format = match &cli.output {
        Some(format) => cli::parse_output_format(format).map_err(SkillGapError::Input)?,
        None => config.output.format,
    };
    let save = cli.save.as_deref();

    match cli.command {
        Commands::Skills { text, resume, top_k } => {
            let text = InputManager::new().resolve_resume_text(text, resume.as_deref()).await?;
            let engine = load_engine(&config, format).await?;

            let spinner = spinner(format, "Scoring skills...");
            let report = engine
                .detect_skills(&text, top_k.unwrap_or(config.output.top_k))
                .await;
            finish(spinner);

            let formatter = formatter_for(&format, use_colors(&config, save), false, false);
            emit(formatter.format_skills(&report?)?, save)
        }

        Commands::Gap {
            text,
            resume,
            job_query,
            num_jobs,
            job_threshold,
            jobs_file,
            top_k,
            show_jobs,
            show_resume_scores,
        } => {
            let request = GapRequest {
                resume_text: InputManager::new().resolve_resume_text(text, resume.as_deref()).await?,
                job_query,
                num_jobs: num_jobs.unwrap_or(config.jobs.default_num_jobs),
                job_threshold: job_threshold.unwrap_or(config.scoring.default_job_threshold),
                top_k: top_k.unwrap_or(config.output.top_k),
            };
            skill_gap::processing::gap::validate_threshold(request.job_threshold)?;

            let source: Box<dyn JobSource> = match jobs_file {
                Some(path) => Box::new(FileJobSource::new(path)),
                None => Box::new(RemotiveClient::from_config(&config.jobs)?),
            };
            let engine = load_engine(&config, format).await?;

            let spinner = spinner(format, "Analyzing job demand...");
            let report = engine.gap_analysis(&request, source.as_ref()).await;
            finish(spinner);

            let formatter = formatter_for(
                &format,
                use_colors(&config, save),
                show_jobs,
                show_resume_scores,
            );
            emit(formatter.format_gap(&report?)?, save)
        }

        Commands::Models { action } => {
            let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
            match action {
                ModelAction::List => {
                    println!("Embedding models ({})\n", config.models_dir().display());
                    for (id, model) in manager.list_available_models() {
                        let status = if manager.is_model_downloaded(id) {
                            "downloaded"
                        } else {
                            "available"
                        };
                        let marker = if id == config.models.embedding_model { "*" } else { " " };
                        println!(
                            "{} {:<16} {:<28} {:>4} MB  {}d  [{}]",
                            marker, id, model.repo_id, model.size_mb, model.dimensions, status
                        );
                        println!("    {}", model.description);
                    }
                    Ok(())
                }
                ModelAction::Download { model } => {
                    let model_id = manager.resolve_model_id(&model).unwrap_or(model);
                    let spinner = spinner(OutputFormat::Console, &format!("Downloading {}...", model_id));
                    let result = manager.download_model(&model_id).await;
                    finish(spinner);

                    let path = result?;
                    println!("Model '{}' ready at {}", model_id, path.display());
                    Ok(())
                }
            }
        }

        Commands::Config { .. } => {
            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&config)?,
                OutputFormat::Console => toml::to_string_pretty(&config).map_err(|e| {
                    SkillGapError::Configuration(format!("Failed to serialize config: {}", e))
                })?,
            };
            if format == OutputFormat::Console {
                println!("# {}", config_path.display());
            }
            emit(rendered, save)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) if path.exists() => Config::load_from(path),
        Some(path) => {
            warn!("Config file {} not found, using defaults", path.display());
            Ok(Config::default())
        }
        None => Config::load(),
    }
}

async fn load_engine(config: &Config, format: OutputFormat) -> Result<AnalysisEngine> {
    let spinner = spinner(format, "Loading embedding model...");
    let engine = AnalysisEngine::from_config(config).await;
    finish(spinner);
    engine
}

fn use_colors(config: &Config, save: Option<&Path>) -> bool {
    config.output.color_output && save.is_none()
}

fn emit(content: String, save: Option<&Path>) -> Result<()> {
    if let Some(path) = save {
        save_report_to_file(&content, path)?;
        info!("Report saved to {}", path.display());
    }
    println!("{}", content);
    Ok(())
}

/// Spinner on stderr for console output; JSON output stays machine-readable
fn spinner(format: OutputFormat, message: &str) -> Option<ProgressBar> {
    if format != OutputFormat::Console {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    Some(bar)
}

fn finish(spinner: Option<ProgressBar>) {
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
}
