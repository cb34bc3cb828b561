//! chatrow - Entry Point

use chatrow::config::{self, ResolvedConfig};
use chatrow::model::AppError;
use chatrow::row::RowMetrics;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// chatrow - terminal viewer for grouped chat transcripts
#[derive(Parser, Debug)]
#[command(name = "chatrow")]
#[command(version)]
#[command(about = "Scroll through a JSONL chat transcript grouped by author and day")]
pub struct Args {
    /// Path to JSONL transcript (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Font size used to estimate row heights
    #[arg(long)]
    pub font_size: Option<f32>,

    /// Seconds between two messages that still group them
    #[arg(long, value_name = "SECS")]
    pub group_window: Option<u64>,
}

/// Defaults merged with the config file, before env and CLI overrides.
fn load_file_config(args: &Args) -> Result<ResolvedConfig, AppError> {
    let config_file = config::load_config_with_precedence(args.config.clone())?;
    Ok(config::merge_config(config_file))
}

/// Apply Env Vars → CLI Args on top of the file configuration.
fn apply_overrides(config: ResolvedConfig, args: &Args) -> ResolvedConfig {
    let with_env = config::apply_env_overrides(config);
    config::apply_cli_overrides(with_env, args.font_size, args.group_window)
}

/// Resolve configuration through Defaults → Config File → Env Vars → CLI Args.
///
/// Logging starts between the file and the overrides so rejected override
/// values are logged.
fn init_config_and_logging(args: &Args) -> Result<ResolvedConfig, AppError> {
    let file_config = load_file_config(args)?;
    chatrow::logging::init(&file_config.log_file_path)?;

    let config = apply_overrides(file_config, args);
    info!(config = ?config, "Configuration loaded and resolved");
    Ok(config)
}

fn run(args: Args) -> Result<(), AppError> {
    let config = init_config_and_logging(&args)?;

    // Installed before any row exists so every height estimate agrees.
    let metrics = RowMetrics::install(config.row_metrics()?)?;
    info!(
        font_size = metrics.default_font_size(),
        minimum_row_height = metrics.minimum_row_height(),
        "Row metrics installed"
    );

    let source = chatrow::source::detect_input_source(args.file)?;
    let transcript = source.load()?;

    chatrow::view::run_with_transcript(transcript, &config)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    run(Args::parse())?;
    Ok(())
}
