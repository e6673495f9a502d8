//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

use crate::config::MODEL_PATH_ENV;

#[derive(Parser, Debug)]
#[command(name = "emovoice")]
#[command(version, about = "Infer the emotional state of spoken audio clips")]
pub struct Args {
    /// Audio files or directories (searched recursively)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Classifier artifact (JSON linear model); heuristic mode when absent
    #[arg(short, long, env = MODEL_PATH_ENV)]
    pub model: Option<PathBuf>,

    /// Pipeline configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Report classifier kind, raw scores and failure causes
    #[arg(short, long)]
    pub diagnostics: bool,

    /// Worker threads for multi-file runs (default: one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Per-file wall-clock budget in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}
