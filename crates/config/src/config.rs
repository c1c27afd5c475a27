//! Core configuration structures and loading logic

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    Io(std::io::Error),
    /// TOML parsing error
    Parse(toml::de::Error),
    /// A value was parsed but failed validation
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Directory layout configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    /// Directory to watch (defaults to `<Videos>/Screen Recordings`)
    #[serde(default)]
    pub input_dir: Option<PathBuf>,
    /// Directory for compressed output (derived from `input_dir` if None)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Suffix appended to the input directory to name the output directory
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
}

fn default_output_suffix() -> String {
    " Compressed".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: None,
            output_dir: None,
            output_suffix: default_output_suffix(),
        }
    }
}

/// Location of the transcoding executable
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FfmpegConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub path: PathBuf,
}

#[cfg(windows)]
fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from(r"C:\Program Files\ffmpeg\ffmpeg.exe")
}

#[cfg(not(windows))]
fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            path: default_ffmpeg_path(),
        }
    }
}

/// Target bitrates handed to ffmpeg. Codecs are fixed (libx264 / aac).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncodingConfig {
    /// Video bitrate in ffmpeg notation (default "1.2M")
    #[serde(default = "default_video_bitrate")]
    pub video_bitrate: String,
    /// Audio bitrate in ffmpeg notation (default "64k")
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,
}

fn default_video_bitrate() -> String {
    "1.2M".to_string()
}

fn default_audio_bitrate() -> String {
    "64k".to_string()
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            video_bitrate: default_video_bitrate(),
            audio_bitrate: default_audio_bitrate(),
        }
    }
}

/// Watcher behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WatcherConfig {
    /// Seconds between size polls while waiting for a new file to settle (0 = don't wait)
    #[serde(default)]
    pub settle_secs: u64,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub ffmpeg: FfmpegConfig,
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub watcher: WatcherConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing sections and optional fields fall back to their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Overrides the following values if environment variables are set:
    /// - SCREEN_COMPRESS_INPUT_DIR -> paths.input_dir
    /// - SCREEN_COMPRESS_OUTPUT_DIR -> paths.output_dir
    /// - SCREEN_COMPRESS_OUTPUT_SUFFIX -> paths.output_suffix
    /// - SCREEN_COMPRESS_FFMPEG_PATH -> ffmpeg.path
    /// - SCREEN_COMPRESS_VIDEO_BITRATE -> encoding.video_bitrate
    /// - SCREEN_COMPRESS_AUDIO_BITRATE -> encoding.audio_bitrate
    /// - SCREEN_COMPRESS_SETTLE_SECS -> watcher.settle_secs
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("SCREEN_COMPRESS_INPUT_DIR") {
            self.paths.input_dir = Some(PathBuf::from(val));
        }

        if let Ok(val) = env::var("SCREEN_COMPRESS_OUTPUT_DIR") {
            self.paths.output_dir = Some(PathBuf::from(val));
        }

        if let Ok(val) = env::var("SCREEN_COMPRESS_OUTPUT_SUFFIX") {
            self.paths.output_suffix = val;
        }

        if let Ok(val) = env::var("SCREEN_COMPRESS_FFMPEG_PATH") {
            self.ffmpeg.path = PathBuf::from(val);
        }

        if let Ok(val) = env::var("SCREEN_COMPRESS_VIDEO_BITRATE") {
            self.encoding.video_bitrate = val;
        }

        if let Ok(val) = env::var("SCREEN_COMPRESS_AUDIO_BITRATE") {
            self.encoding.audio_bitrate = val;
        }

        // Invalid numbers keep the existing value
        if let Ok(val) = env::var("SCREEN_COMPRESS_SETTLE_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                self.watcher.settle_secs = secs;
            }
        }
    }

    /// Check values that cannot be expressed through the type system
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_bitrate("encoding.video_bitrate", &self.encoding.video_bitrate)?;
        check_bitrate("encoding.audio_bitrate", &self.encoding.audio_bitrate)?;

        if self.paths.output_suffix.is_empty() {
            return Err(ConfigError::Invalid(
                "paths.output_suffix must not be empty".to_string(),
            ));
        }

        if self.ffmpeg.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "ffmpeg.path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from file, apply environment overrides and validate
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a config file
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

fn check_bitrate(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Invalid(format!(
            "{} must not contain whitespace: {:?}",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Mutex;

    // Env var tests share process state
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env_vars() {
        env::remove_var("SCREEN_COMPRESS_INPUT_DIR");
        env::remove_var("SCREEN_COMPRESS_OUTPUT_DIR");
        env::remove_var("SCREEN_COMPRESS_OUTPUT_SUFFIX");
        env::remove_var("SCREEN_COMPRESS_FFMPEG_PATH");
        env::remove_var("SCREEN_COMPRESS_VIDEO_BITRATE");
        env::remove_var("SCREEN_COMPRESS_AUDIO_BITRATE");
        env::remove_var("SCREEN_COMPRESS_SETTLE_SECS");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_config_parses_all_sections(
            input in "/[a-z]{1,12}/[a-z]{1,12}",
            suffix in "[A-Za-z _-]{1,12}",
            video in "[0-9]{1,4}(k|M)",
            audio in "[0-9]{1,3}k",
            settle in 0u64..600,
        ) {
            let toml_str = format!(
                r#"
[paths]
input_dir = "{}"
output_suffix = "{}"

[ffmpeg]
path = "/opt/ffmpeg/bin/ffmpeg"

[encoding]
video_bitrate = "{}"
audio_bitrate = "{}"

[watcher]
settle_secs = {}
"#,
                input, suffix, video, audio, settle
            );

            let config = Config::parse_toml(&toml_str).expect("Valid TOML should parse");

            prop_assert_eq!(config.paths.input_dir, Some(PathBuf::from(&input)));
            prop_assert_eq!(config.paths.output_dir, None);
            prop_assert_eq!(&config.paths.output_suffix, &suffix);
            prop_assert_eq!(config.ffmpeg.path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
            prop_assert_eq!(&config.encoding.video_bitrate, &video);
            prop_assert_eq!(&config.encoding.audio_bitrate, &audio);
            prop_assert_eq!(config.watcher.settle_secs, settle);
        }

        #[test]
        fn prop_env_overrides_settle_secs(
            initial in 0u64..60,
            override_secs in 0u64..600,
        ) {
            let _guard = ENV_MUTEX.lock().unwrap();
            clear_env_vars();

            let toml_str = format!("[watcher]\nsettle_secs = {}\n", initial);
            let mut config = Config::parse_toml(&toml_str).expect("Valid TOML");

            env::set_var("SCREEN_COMPRESS_SETTLE_SECS", override_secs.to_string());
            config.apply_env_overrides();
            clear_env_vars();

            prop_assert_eq!(config.watcher.settle_secs, override_secs);
        }

        #[test]
        fn prop_whitespace_bitrate_rejected(
            head in "[0-9]{1,3}",
            tail in "[0-9]{0,3}k",
        ) {
            let mut config = Config::default();
            config.encoding.video_bitrate = format!("{} {}", head, tail);
            prop_assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse_toml("").expect("Empty TOML should parse");

        assert_eq!(config.paths.input_dir, None);
        assert_eq!(config.paths.output_dir, None);
        assert_eq!(config.paths.output_suffix, " Compressed");
        assert_eq!(config.encoding.video_bitrate, "1.2M");
        assert_eq!(config.encoding.audio_bitrate, "64k");
        assert_eq!(config.watcher.settle_secs, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let toml_str = r#"
[encoding]
video_bitrate = "2M"
"#;
        let config = Config::parse_toml(toml_str).expect("Partial TOML should parse");

        assert_eq!(config.encoding.video_bitrate, "2M");
        assert_eq!(config.encoding.audio_bitrate, "64k"); // default
        assert_eq!(config.paths.output_suffix, " Compressed"); // default
        assert_eq!(config.ffmpeg, FfmpegConfig::default());
    }

    #[test]
    fn test_env_overrides_paths() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env_vars();

        let mut config = Config::default();
        env::set_var("SCREEN_COMPRESS_INPUT_DIR", "/srv/recordings");
        env::set_var("SCREEN_COMPRESS_OUTPUT_DIR", "/srv/small");
        env::set_var("SCREEN_COMPRESS_FFMPEG_PATH", "/usr/local/bin/ffmpeg");
        config.apply_env_overrides();
        clear_env_vars();

        assert_eq!(config.paths.input_dir, Some(PathBuf::from("/srv/recordings")));
        assert_eq!(config.paths.output_dir, Some(PathBuf::from("/srv/small")));
        assert_eq!(config.ffmpeg.path, PathBuf::from("/usr/local/bin/ffmpeg"));
    }

    #[test]
    fn test_invalid_settle_secs_env_is_ignored() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env_vars();

        let mut config = Config::default();
        config.watcher.settle_secs = 5;
        env::set_var("SCREEN_COMPRESS_SETTLE_SECS", "soon");
        config.apply_env_overrides();
        clear_env_vars();

        assert_eq!(config.watcher.settle_secs, 5);
    }

    #[test]
    fn test_validate_rejects_empty_values() {
        let mut config = Config::default();
        config.encoding.audio_bitrate.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.paths.output_suffix.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.ffmpeg.path = PathBuf::new();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = Config::load("/definitely/not/here/screen-compress.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = Config::parse_toml("[encoding\nvideo_bitrate = 1");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
