//! CLI entry point for the screen recording compressor
//!
//! Parses command line arguments, sets up logging and runs the daemon until Ctrl-C.

use clap::Parser;
use screen_compress::{Config, Daemon};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Screen recording compressor - shrinks new recordings with ffmpeg
#[derive(Parser, Debug)]
#[command(name = "screen-compress")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to watch (overrides config)
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Directory for compressed files (overrides config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// ffmpeg executable (overrides config)
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Skip the ffmpeg probe at startup
    #[arg(long, default_value = "false")]
    skip_checks: bool,
}

fn load_config(args: &Args) -> Result<Config, screen_compress::config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };

    if let Some(dir) = &args.input_dir {
        config.paths.input_dir = Some(dir.clone());
    }
    if let Some(dir) = &args.output_dir {
        config.paths.output_dir = Some(dir.clone());
    }
    if let Some(ffmpeg) = &args.ffmpeg {
        config.ffmpeg.path = ffmpeg.clone();
    }

    // Command line overrides go through the same checks as file values
    config.validate()?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the daemon runs until killed
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let daemon_result = if args.skip_checks {
        warn!("Skipping ffmpeg probe (--skip-checks enabled)");
        Daemon::new_without_checks(config)
    } else {
        Daemon::new(config)
    };

    match daemon_result {
        Ok(daemon) => {
            info!("Screen recording compressor starting");

            if let Err(e) = daemon.run(shutdown_signal()).await {
                error!("Daemon error: {}", e);
                return ExitCode::FAILURE;
            }

            info!("Screen recording compressor stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to initialize daemon: {}", e);
            ExitCode::FAILURE
        }
    }
}
