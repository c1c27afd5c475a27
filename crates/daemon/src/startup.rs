//! Startup checks module
//!
//! Preflight checks run before the watcher starts:
//! - The watched directory must exist (fatal)
//! - The output directory is created if absent
//! - ffmpeg is probed with `-version` (advisory; a missing binary only fails individual jobs)

use std::path::Path;
use std::process::Command;
use thiserror::Error;
use tracing::{info, warn};

/// Error types for startup checks
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Watched directory does not exist: {0}")]
    InputDirMissing(String),

    #[error("Failed to create output directory {path}: {source}")]
    OutputDirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ffmpeg not available: {0}")]
    FfmpegUnavailable(String),
}

/// Fail fast when the watched directory is missing or not a directory.
pub fn ensure_input_dir(path: &Path) -> Result<(), StartupError> {
    if !path.is_dir() {
        return Err(StartupError::InputDirMissing(path.display().to_string()));
    }
    Ok(())
}

/// Create the output directory (and parents) if it does not exist yet.
pub fn ensure_output_dir(path: &Path) -> Result<(), StartupError> {
    if !path.is_dir() {
        info!(path = %path.display(), "Creating output directory");
    }
    std::fs::create_dir_all(path).map_err(|source| StartupError::OutputDirCreation {
        path: path.display().to_string(),
        source,
    })
}

/// Parse the major version out of `ffmpeg -version` output
///
/// Handles `ffmpeg version 7.1 ...` and git builds such as `ffmpeg version n7.1-12-g...`.
/// Returns None for builds without a numeric version (e.g. `N-113000-g...`).
pub fn parse_ffmpeg_version(version_output: &str) -> Option<u32> {
    let version_line = version_output
        .lines()
        .find(|line| line.to_lowercase().contains("ffmpeg version"))?;

    let version_part = version_line
        .to_lowercase()
        .split("ffmpeg version")
        .nth(1)?
        .split_whitespace()
        .next()?
        .to_string();

    let version_str = version_part.trim_start_matches('n');

    version_str
        .split(|c| c == '.' || c == '-')
        .next()?
        .parse()
        .ok()
}

/// Run `<ffmpeg> -version` and return the detected major version, if any
pub fn check_ffmpeg_available(ffmpeg_path: &Path) -> Result<Option<u32>, StartupError> {
    let output = Command::new(ffmpeg_path)
        .arg("-version")
        .output()
        .map_err(|e| {
            StartupError::FfmpegUnavailable(format!(
                "{} -version failed; is ffmpeg installed? Error: {}",
                ffmpeg_path.display(),
                e
            ))
        })?;

    if !output.status.success() {
        return Err(StartupError::FfmpegUnavailable(format!(
            "{} -version exited with {}",
            ffmpeg_path.display(),
            output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_ffmpeg_version(&stdout))
}

/// Probe ffmpeg, logging the result. Never fails startup.
pub fn probe_ffmpeg(ffmpeg_path: &Path) {
    match check_ffmpeg_available(ffmpeg_path) {
        Ok(Some(major)) => info!(path = %ffmpeg_path.display(), major, "ffmpeg detected"),
        Ok(None) => info!(path = %ffmpeg_path.display(), "ffmpeg detected (unknown version)"),
        Err(e) => warn!(error = %e, "compressions will fail until ffmpeg is available"),
    }
}
