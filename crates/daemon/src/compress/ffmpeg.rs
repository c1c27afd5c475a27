//! FFmpeg compression module
//!
//! Builds and runs the fixed libx264/aac ffmpeg invocation that shrinks a
//! screen recording.

use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// Video codec passed to `-c:v`
pub const VIDEO_CODEC: &str = "libx264";

/// Audio codec passed to `-c:a`
pub const AUDIO_CODEC: &str = "aac";

/// Error type for compression operations
#[derive(Debug, Error)]
pub enum CompressError {
    /// The ffmpeg process could not be started at all
    #[error("Couldn't start {path}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// ffmpeg exited with non-zero status
    #[error("ffmpeg failed with exit code: {0}")]
    Failed(i32),

    /// ffmpeg was terminated by a signal
    #[error("ffmpeg process was terminated by signal")]
    Terminated,
}

impl CompressError {
    /// Exit code of the ffmpeg process, if it ran and exited normally
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CompressError::Failed(code) => Some(*code),
            _ => None,
        }
    }
}

/// Parameters for one ffmpeg compression
#[derive(Debug, Clone)]
pub struct FfmpegParams {
    /// Path to the ffmpeg executable
    pub ffmpeg_path: PathBuf,
    /// Path to the input video file
    pub input_path: PathBuf,
    /// Path for the compressed output file
    pub output_path: PathBuf,
    /// Value for `-b:v`
    pub video_bitrate: String,
    /// Value for `-b:a`
    pub audio_bitrate: String,
}

/// Build the ffmpeg command
///
/// Produces:
/// `-loglevel error -hide_banner -nostats -i <in> -c:v libx264 -b:v <vb> -c:a aac -b:a <ab> <out>`
///
/// Paths are passed as separate arguments, so names with spaces need no quoting.
pub fn build_ffmpeg_command(params: &FfmpegParams) -> Command {
    let mut cmd = Command::new(&params.ffmpeg_path);

    // Quiet output: errors only, no banner, no progress stats
    cmd.arg("-loglevel").arg("error");
    cmd.arg("-hide_banner");
    cmd.arg("-nostats");

    cmd.arg("-i").arg(&params.input_path);

    cmd.arg("-c:v").arg(VIDEO_CODEC);
    cmd.arg("-b:v").arg(&params.video_bitrate);

    cmd.arg("-c:a").arg(AUDIO_CODEC);
    cmd.arg("-b:a").arg(&params.audio_bitrate);

    cmd.arg(&params.output_path);

    cmd
}

/// Run ffmpeg and wait for it to exit
///
/// Blocks the calling thread for the whole encode.
///
/// # Errors
/// Returns an error if:
/// - The ffmpeg process fails to start
/// - The ffmpeg process exits with non-zero status
/// - The ffmpeg process is terminated by a signal
pub fn run_ffmpeg(params: &FfmpegParams) -> Result<(), CompressError> {
    let mut cmd = build_ffmpeg_command(params);

    let status = cmd.status().map_err(|source| CompressError::Launch {
        path: params.ffmpeg_path.clone(),
        source,
    })?;

    if status.success() {
        Ok(())
    } else {
        match status.code() {
            Some(code) => Err(CompressError::Failed(code)),
            None => Err(CompressError::Terminated),
        }
    }
}
