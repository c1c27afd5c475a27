//! Settle check for newly created recordings.
//!
//! A creation event fires as soon as the file exists, often while the
//! recorder is still writing. When a settle interval is configured the
//! handler waits until the file size stops changing between two polls.

use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Result of comparing two size samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StabilityResult {
    /// File size remained unchanged during the interval.
    Stable,
    /// File size changed during the interval.
    Unstable {
        /// Size at the previous poll.
        initial_size: u64,
        /// Size at this poll.
        current_size: u64,
    },
}

/// Compare two file sizes and return the appropriate StabilityResult.
#[inline]
pub fn compare_sizes(initial_size: u64, current_size: u64) -> StabilityResult {
    if initial_size == current_size {
        StabilityResult::Stable
    } else {
        StabilityResult::Unstable {
            initial_size,
            current_size,
        }
    }
}

/// Poll the file size every `interval` until two consecutive reads match.
///
/// Returns the settled size, or the IO error from `metadata` (typically
/// `NotFound` when the file was removed while waiting).
pub async fn wait_until_settled(path: &Path, interval: Duration) -> Result<u64, std::io::Error> {
    let mut last = tokio::fs::metadata(path).await?.len();

    loop {
        sleep(interval).await;
        let current = tokio::fs::metadata(path).await?.len();

        match compare_sizes(last, current) {
            StabilityResult::Stable => return Ok(current),
            StabilityResult::Unstable {
                initial_size,
                current_size,
            } => {
                debug!(
                    path = %path.display(),
                    initial_size,
                    current_size,
                    "file still growing"
                );
                last = current_size;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    proptest! {
        #[test]
        fn prop_stability_size_comparison(initial_size: u64, current_size: u64) {
            let result = compare_sizes(initial_size, current_size);

            if initial_size == current_size {
                prop_assert_eq!(result, StabilityResult::Stable);
            } else {
                prop_assert_eq!(
                    result,
                    StabilityResult::Unstable { initial_size, current_size }
                );
            }
        }
    }

    #[tokio::test]
    async fn test_wait_until_settled_returns_size() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("done.mp4");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let size = wait_until_settled(&path, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(size, 2048);
    }

    #[tokio::test]
    async fn test_wait_until_settled_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = wait_until_settled(&temp.path().join("gone.mp4"), Duration::from_millis(10))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
