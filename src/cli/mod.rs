// src/cli/mod.rs
//
// Command-line interface: collect inputs, analyze them on a bounded pool,
// print per-file results and a batch summary.

mod args;
mod output;

pub use args::Args;
pub use output::{format_prediction, format_summary, FileRecord};

use anyhow::{Context, Result};
use colorful::Colorful;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use walkdir::WalkDir;

use crate::config::{default_model_path, PipelineConfig};
use crate::core::{Analysis, EmotionDetectionService, ServiceBuilder};
use crate::detection::EmotionSummary;

/// File extensions picked up when walking directories
pub const AUDIO_EXTENSIONS: [&str; 6] = ["wav", "flac", "mp3", "ogg", "m4a", "aac"];

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expand inputs into audio files. Explicit files are kept whatever their
/// extension; directories are walked for known audio extensions.
pub fn collect_audio_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_audio_file(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    files
}

fn build_service(args: &Args) -> Result<EmotionDetectionService> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let mut builder = ServiceBuilder::new().config(config);
    match &args.model {
        Some(path) => builder = builder.model_path(path),
        None => match default_model_path() {
            Some(path) if path.exists() => builder = builder.model_path(path),
            Some(path) => info!("No artifact at {}", path.display()),
            None => {}
        },
    }

    builder.build().context("Failed to build inference service")
}

/// Run the CLI
pub fn run(args: Args) -> Result<()> {
    let service = Arc::new(build_service(&args)?);
    let files = collect_audio_files(&args.inputs);

    if files.is_empty() {
        println!("{}", "No audio files found!".red());
        return Ok(());
    }
    debug!("{} input file(s)", files.len());

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = args.jobs {
        pool = pool.num_threads(jobs.max(1));
    }
    let pool = pool.build().context("Failed to create thread pool")?;

    let progress = if files.len() > 1 && !args.json {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {elapsed_precise}")
                .context("Invalid progress template")?,
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let timeout = args.timeout_secs.map(Duration::from_secs);
    let analyses: Vec<Analysis> = pool.install(|| {
        files
            .par_iter()
            .progress_with(progress.clone())
            .map(|path| match timeout {
                Some(limit) => service.analyze_path_with_timeout(path, limit),
                None => service.analyze_path_with_diagnostics(path),
            })
            .collect()
    });
    progress.finish_and_clear();

    let mut summary = EmotionSummary::new();
    for analysis in &analyses {
        summary.add(&analysis.prediction, analysis.diagnostics.degraded);
    }

    if args.json {
        let records: Vec<FileRecord> = files
            .iter()
            .zip(&analyses)
            .map(|(path, a)| FileRecord {
                path: path.display().to_string(),
                prediction: &a.prediction,
                diagnostics: args.diagnostics.then_some(&a.diagnostics),
            })
            .collect();
        let text = match records.as_slice() {
            [single] => output::to_json(single),
            _ => output::to_json(&records),
        }
        .context("Failed to serialize results")?;
        println!("{}", text);
        return Ok(());
    }

    for (path, analysis) in files.iter().zip(&analyses) {
        let diagnostics = args.diagnostics.then_some(&analysis.diagnostics);
        println!("{}", format_prediction(path, &analysis.prediction, diagnostics));
    }
    if files.len() > 1 {
        print!("{}", format_summary(&summary));
    }

    Ok(())
}
