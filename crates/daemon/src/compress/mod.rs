//! Transcoding modules for the screen recording compressor

pub mod ffmpeg;

pub use ffmpeg::{build_ffmpeg_command, run_ffmpeg, CompressError, FfmpegParams};
