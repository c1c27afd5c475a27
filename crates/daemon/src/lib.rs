//! Screen recording compressor
//!
//! Watches a recordings directory and shrinks each new `.mp4` with ffmpeg,
//! deleting the original once the compressed copy has been written.

pub mod compress;
pub mod daemon;
pub mod folders;
pub mod handler;
pub mod stability;
pub mod startup;
pub mod watcher;

pub use compress::{build_ffmpeg_command, run_ffmpeg, CompressError, FfmpegParams};
pub use daemon::{process_events, Daemon, DaemonError};
pub use folders::{
    default_input_dir, derive_output_dir, resolve_directories, FolderError, ResolvedDirs,
};
pub use handler::{has_accepted_extension, CompressionHandler, HandlerOutcome, HandlerSettings};
pub use screen_compress_config as config;
pub use screen_compress_config::Config;
pub use stability::{compare_sizes, wait_until_settled, StabilityResult};
pub use startup::{
    check_ffmpeg_available, ensure_input_dir, ensure_output_dir, parse_ffmpeg_version,
    probe_ffmpeg, StartupError,
};
pub use watcher::{file_events_from, DirectoryWatcher, FileEvent, WatchError};
