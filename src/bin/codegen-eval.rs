//! codegen-eval CLI — run a benchmark file through a model.

use codegen_eval::config::{Config, RunSettings};
use codegen_eval::dispatch::{Dispatcher, FailurePolicy};
use codegen_eval::llm::{DEFAULT_MODEL, RigService};
use codegen_eval::sink::OutputSink;
use codegen_eval::source::{input_path, read_work_items};
use codegen_eval::telemetry::{TelemetryConfig, init_telemetry};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "codegen-eval",
    about = "Collect model completions for a code-generation benchmark"
)]
struct Cli {
    /// Model identifier sent with every request
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,
    /// Benchmark file (defaults to <base-dir>/data/HumanEval.jsonl)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Directory input and results paths are resolved against
    #[arg(long)]
    base_dir: Option<PathBuf>,
    /// TOML file with batch, retry, and failure settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Items dispatched concurrently per batch
    #[arg(long)]
    batch_size: Option<usize>,
    /// Attempts per item before giving up
    #[arg(long)]
    max_attempts: Option<u32>,
    /// Abort the run when an item exhausts its retries instead of skipping it
    #[arg(long)]
    fail_batch: bool,
    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "codegen-eval".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let mut settings = match &cli.config {
        Some(path) => RunSettings::load(path)?,
        None => RunSettings::default(),
    };
    if let Some(batch_size) = cli.batch_size {
        settings.batch_size = batch_size;
    }
    if let Some(max_attempts) = cli.max_attempts {
        settings.retry.max_attempts = max_attempts;
    }
    if cli.fail_batch {
        settings.failure_policy = FailurePolicy::FailBatch;
    }

    let base_dir = cli.base_dir.unwrap_or(config.base_dir);
    let input = cli.input.unwrap_or_else(|| input_path(&base_dir));
    let items = read_work_items(&input)?;
    info!(
        input = %input.display(),
        items = items.len(),
        model = %cli.model,
        provider = %config.provider,
        "benchmark loaded"
    );

    let progress = if cli.no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(items.len() as u64);
        bar.set_style(ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}<{eta_precise}]",
        )?);
        bar
    };

    let service = Arc::new(RigService::new(config.provider, &config.api_key)?);
    let dispatcher = Dispatcher::from_settings(service, &settings)?.with_progress(progress.clone());

    let sink = OutputSink::for_model(&base_dir, &cli.model);
    let summary = dispatcher.run(items, &cli.model, &sink).await?;
    progress.finish();

    info!(
        model = %summary.model,
        started_at = %summary.started_at.to_rfc3339(),
        elapsed_ms = (summary.finished_at - summary.started_at).num_milliseconds(),
        "run complete"
    );
    if !summary.failed.is_empty() {
        warn!(
            failed = summary.failed.len(),
            task_ids = ?summary.failed,
            "some tasks produced no completion"
        );
    }

    println!("Tests complete at: {}", sink.path().display());
    Ok(())
}
