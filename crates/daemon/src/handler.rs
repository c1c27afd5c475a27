//! Compression handler
//!
//! Turns one [`FileEvent`] into at most one ffmpeg run and, on success, one
//! deletion of the original recording. Nothing is retried.

use crate::compress::{run_ffmpeg, CompressError, FfmpegParams};
use crate::config::Config;
use crate::stability::wait_until_settled;
use crate::watcher::FileEvent;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// The only extension that is compressed (case-sensitive).
pub const ACCEPTED_EXTENSION: &str = ".mp4";

/// Terminal state of one handled event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Extension was not `.mp4`; nothing was done
    Rejected,
    /// The file disappeared while waiting for it to settle
    Vanished,
    /// ffmpeg could not be started; original kept
    LaunchFailed,
    /// ffmpeg ran but did not exit with status zero; original kept
    Failed { code: Option<i32> },
    /// ffmpeg succeeded and the original was removed
    Deleted,
    /// ffmpeg succeeded but removing the original failed
    DeleteFailed,
}

impl HandlerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerOutcome::Rejected => "rejected",
            HandlerOutcome::Vanished => "vanished",
            HandlerOutcome::LaunchFailed => "launch_failed",
            HandlerOutcome::Failed { .. } => "failed",
            HandlerOutcome::Deleted => "deleted",
            HandlerOutcome::DeleteFailed => "delete_failed",
        }
    }
}

/// Everything the handler needs, resolved once at startup
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    /// Directory receiving compressed files
    pub output_dir: PathBuf,
    /// ffmpeg executable
    pub ffmpeg_path: PathBuf,
    pub video_bitrate: String,
    pub audio_bitrate: String,
    /// Poll interval for the settle check; `None` compresses immediately
    pub settle_interval: Option<Duration>,
}

impl HandlerSettings {
    pub fn from_config(config: &Config, output_dir: PathBuf) -> Self {
        let settle_interval = match config.watcher.settle_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Self {
            output_dir,
            ffmpeg_path: config.ffmpeg.path.clone(),
            video_bitrate: config.encoding.video_bitrate.clone(),
            audio_bitrate: config.encoding.audio_bitrate.clone(),
            settle_interval,
        }
    }
}

/// Exact, case-sensitive match on the text after the last `.` of the name.
pub fn has_accepted_extension(file_name: &OsStr) -> bool {
    file_name
        .to_str()
        .and_then(|name| name.rfind('.').map(|idx| &name[idx..]))
        == Some(ACCEPTED_EXTENSION)
}

#[derive(Debug, Clone)]
pub struct CompressionHandler {
    settings: HandlerSettings,
}

impl CompressionHandler {
    pub fn new(settings: HandlerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &HandlerSettings {
        &self.settings
    }

    /// Same file name, output directory.
    pub fn output_path_for(&self, event: &FileEvent) -> PathBuf {
        self.settings.output_dir.join(&event.file_name)
    }

    /// Handle one creation event to completion.
    ///
    /// Blocks (asynchronously) for the whole ffmpeg run. The original file is
    /// only deleted when ffmpeg launched and exited with status zero.
    pub async fn handle(&self, event: &FileEvent) -> HandlerOutcome {
        let span = info_span!(
            "compress",
            job = %Uuid::new_v4(),
            file = %event.file_name.to_string_lossy()
        );
        self.handle_inner(event).instrument(span).await
    }

    async fn handle_inner(&self, event: &FileEvent) -> HandlerOutcome {
        if !has_accepted_extension(&event.file_name) {
            info!("Not {} file, skipping compression", ACCEPTED_EXTENSION);
            return HandlerOutcome::Rejected;
        }

        if let Some(interval) = self.settings.settle_interval {
            match wait_until_settled(&event.full_path, interval).await {
                Ok(size) => info!(size_bytes = size, "recording settled"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(path = %event.full_path.display(), "file removed before compression");
                    return HandlerOutcome::Vanished;
                }
                Err(e) => warn!(error = %e, "could not check file size, compressing anyway"),
            }
        }

        let params = FfmpegParams {
            ffmpeg_path: self.settings.ffmpeg_path.clone(),
            input_path: event.full_path.clone(),
            output_path: self.output_path_for(event),
            video_bitrate: self.settings.video_bitrate.clone(),
            audio_bitrate: self.settings.audio_bitrate.clone(),
        };

        info!(
            input = %params.input_path.display(),
            output = %params.output_path.display(),
            "Beginning compression"
        );

        let result = tokio::task::spawn_blocking(move || run_ffmpeg(&params)).await;

        match result {
            Ok(Ok(())) => {
                info!("Compression succeeded. Deleting larger video file.");
                match tokio::fs::remove_file(&event.full_path).await {
                    Ok(()) => HandlerOutcome::Deleted,
                    Err(e) => {
                        error!(
                            error = %e,
                            path = %event.full_path.display(),
                            "Failed to delete original"
                        );
                        HandlerOutcome::DeleteFailed
                    }
                }
            }
            Ok(Err(e @ CompressError::Launch { .. })) => {
                error!(error = %e, "Couldn't start ffmpeg");
                HandlerOutcome::LaunchFailed
            }
            Ok(Err(e)) => {
                error!(error = %e, path = %event.full_path.display(), "Failed to compress");
                HandlerOutcome::Failed {
                    code: e.exit_code(),
                }
            }
            Err(join_err) => {
                error!(error = %join_err, "compression task did not complete");
                HandlerOutcome::LaunchFailed
            }
        }
    }
}
