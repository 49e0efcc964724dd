use anyhow::{Context, Result};
use clap::Parser;
use jumpcut::{print_summary, Config, Ffmpeg, JumpcutJob, Pipeline, Workspace};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "jumpcut")]
#[command(version, about = "Speed up the silent parts of a video")]
#[command(
    long_about = "Detect silences with FFmpeg, cut the video into silent and spoken segments, \
                  re-time each kind at its own speed and join the result into <name>-final.mp4."
)]
struct Cli {
    /// Input video file
    video_file: PathBuf,

    /// Noise level in dB below which audio counts as silence (e.g. 30 or -30)
    #[arg(allow_negative_numbers = true)]
    silence_threshold: f64,

    /// Speed factor for silent segments
    #[arg(allow_negative_numbers = true)]
    silence_speed: f64,

    /// Speed factor for spoken segments
    #[arg(allow_negative_numbers = true)]
    normal_speed: f64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log every FFmpeg command before it runs
    #[arg(long)]
    print_commands: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    config.verbose |= cli.verbose;
    config.print_commands |= cli.print_commands;
    config.validate().context("Configuration validation failed")?;

    init_logging(config.verbose);

    let job = JumpcutJob::new(
        cli.video_file,
        cli.silence_threshold,
        cli.silence_speed,
        cli.normal_speed,
    )
    .context("Invalid arguments")?;

    let ffmpeg = Ffmpeg::from_config(&config);
    ffmpeg.check().context(
        "FFmpeg not found. Install it with: brew install ffmpeg (macOS) or apt install ffmpeg (Linux)",
    )?;

    let workspace = Workspace::current().context("Failed to resolve working directory")?;

    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = cancelled.clone();
        if let Err(e) = ctrlc::set_handler(move || cancelled.store(true, Ordering::Relaxed)) {
            warn!("Could not install Ctrl+C handler: {}", e);
        }
    }

    info!("Input:     {}", job.input.display());
    info!("Threshold: -{}dB", job.threshold_db.abs());
    info!(
        "Speeds:    silence x{}, normal x{}",
        job.speeds.silence, job.speeds.normal
    );

    let result = Pipeline::default()
        .with_cancel(cancelled)
        .run(&ffmpeg, &config, &workspace, &job)
        .with_context(|| format!("Failed to jump-cut {}", job.input.display()))?;

    print_summary(&result);
    Ok(())
}
