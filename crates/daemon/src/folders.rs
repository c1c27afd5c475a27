//! Folder resolution for the watched and output directories.
//!
//! The watched directory defaults to `<Videos>/Screen Recordings`. The output
//! directory is a sibling whose name is the watched directory's name with a
//! suffix appended, e.g. `<Videos>/Screen Recordings Compressed`.

use crate::config::PathsConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the recordings folder inside the platform videos folder.
pub const SCREEN_RECORDINGS_DIR: &str = "Screen Recordings";

/// Errors that can occur while resolving directories.
#[derive(Debug, Error)]
pub enum FolderError {
    /// The platform does not report a videos folder.
    #[error("Could not locate the platform videos folder")]
    NoVideosDir,

    /// The input path has no final component to derive a sibling from.
    #[error("Cannot derive an output directory from {0:?}")]
    NoDirectoryName(PathBuf),
}

/// Watched and output directories after defaults and derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDirs {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// `<platform videos folder>/Screen Recordings`
pub fn default_input_dir() -> Result<PathBuf, FolderError> {
    dirs::video_dir()
        .map(|videos| videos.join(SCREEN_RECORDINGS_DIR))
        .ok_or(FolderError::NoVideosDir)
}

/// Derive the output directory by appending `suffix` to the input directory path.
///
/// Trailing separators are dropped first, so `/v/Screen Recordings/` and
/// `/v/Screen Recordings` both give `/v/Screen Recordings Compressed`.
pub fn derive_output_dir(input_dir: &Path, suffix: &str) -> Result<PathBuf, FolderError> {
    // Collecting components normalises away trailing separators and `.` segments
    let normalized: PathBuf = input_dir.components().collect();

    if normalized.file_name().is_none() {
        return Err(FolderError::NoDirectoryName(input_dir.to_path_buf()));
    }

    let mut output = normalized.into_os_string();
    output.push(suffix);
    Ok(PathBuf::from(output))
}

/// Resolve both directories from configuration, filling in defaults.
pub fn resolve_directories(paths: &PathsConfig) -> Result<ResolvedDirs, FolderError> {
    let input_dir = match &paths.input_dir {
        Some(dir) => dir.clone(),
        None => default_input_dir()?,
    };

    let output_dir = match &paths.output_dir {
        Some(dir) => dir.clone(),
        None => derive_output_dir(&input_dir, &paths.output_suffix)?,
    };

    Ok(ResolvedDirs {
        input_dir,
        output_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_output_dir_is_sibling_with_suffix(
            parent in "[a-z]{1,8}(/[a-z]{1,8}){0,3}",
            name in "[A-Za-z][A-Za-z0-9 ]{0,15}",
            trailing_slash: bool,
        ) {
            let mut raw = format!("/{}/{}", parent, name);
            if trailing_slash {
                raw.push('/');
            }
            let input = PathBuf::from(&raw);

            let output = derive_output_dir(&input, " Compressed").unwrap();

            let expected_parent = PathBuf::from(format!("/{}", parent));
            let expected_name = format!("{} Compressed", name);
            prop_assert_eq!(output.parent(), Some(expected_parent.as_path()));
            prop_assert_eq!(
                output.file_name().and_then(|n| n.to_str()),
                Some(expected_name.as_str())
            );
        }
    }

    #[test]
    fn test_derive_output_dir_screen_recordings() {
        let input = Path::new("/home/ana/Videos/Screen Recordings/");
        let output = derive_output_dir(input, " Compressed").unwrap();
        assert_eq!(
            output,
            PathBuf::from("/home/ana/Videos/Screen Recordings Compressed")
        );
    }

    #[test]
    fn test_derive_output_dir_rejects_root() {
        let result = derive_output_dir(Path::new("/"), " Compressed");
        assert!(matches!(result, Err(FolderError::NoDirectoryName(_))));
    }

    #[test]
    fn test_resolve_uses_explicit_output_dir() {
        let paths = PathsConfig {
            input_dir: Some(PathBuf::from("/rec")),
            output_dir: Some(PathBuf::from("/elsewhere/out")),
            output_suffix: " Compressed".to_string(),
        };
        let dirs = resolve_directories(&paths).unwrap();
        assert_eq!(dirs.input_dir, PathBuf::from("/rec"));
        assert_eq!(dirs.output_dir, PathBuf::from("/elsewhere/out"));
    }

    #[test]
    fn test_resolve_derives_output_dir() {
        let paths = PathsConfig {
            input_dir: Some(PathBuf::from("/media/clips")),
            output_dir: None,
            output_suffix: "-small".to_string(),
        };
        let dirs = resolve_directories(&paths).unwrap();
        assert_eq!(dirs.output_dir, PathBuf::from("/media/clips-small"));
    }
}
