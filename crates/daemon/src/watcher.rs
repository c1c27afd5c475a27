//! Directory watcher that turns file-creation notifications into [`FileEvent`]s.
//!
//! The watcher is a producer only: it does no filtering and pushes every
//! creation in the watched directory onto a channel drained by the daemon.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Error type for watcher operations
#[derive(Debug, Error)]
pub enum WatchError {
    /// The directory to watch does not exist
    #[error("Watched directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    /// The platform notification backend failed
    #[error("File watching error: {0}")]
    Notify(#[from] notify::Error),
}

/// A file that just appeared in the watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Absolute path of the new file
    pub full_path: PathBuf,
    /// Final path component
    pub file_name: OsString,
}

impl FileEvent {
    /// Build an event from a path; `None` when the path has no file name.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_owned();
        Some(Self {
            full_path: path.to_path_buf(),
            file_name,
        })
    }
}

/// Extract creation events from a raw notification.
///
/// Anything other than a create (modify, remove, access) yields nothing.
pub fn file_events_from(event: &Event) -> Vec<FileEvent> {
    if !matches!(event.kind, EventKind::Create(_)) {
        return Vec::new();
    }

    event
        .paths
        .iter()
        .filter_map(|path| FileEvent::from_path(path))
        .collect()
}

/// Watches one directory (non-recursively) for new files.
///
/// Event delivery stops when this value is dropped.
pub struct DirectoryWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
}

impl DirectoryWatcher {
    /// Start monitoring `dir`, sending each creation to `tx`.
    ///
    /// Notifications arrive on the backend's own thread; sending on an
    /// unbounded channel never blocks it and keeps events in arrival order.
    pub fn start(dir: &Path, tx: UnboundedSender<FileEvent>) -> Result<Self, WatchError> {
        if !dir.is_dir() {
            return Err(WatchError::MissingDirectory(dir.to_path_buf()));
        }

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    for file_event in file_events_from(&event) {
                        info!(path = %file_event.full_path.display(), "File creation detected");
                        if tx.send(file_event).is_err() {
                            debug!("event receiver dropped, discarding notification");
                            return;
                        }
                    }
                }
                Err(e) => warn!(error = %e, "watch error"),
            }
        })?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        info!(path = %dir.display(), "Started watching directory");

        Ok(Self {
            path: dir.to_path_buf(),
            _watcher: watcher,
        })
    }

    /// The monitored directory
    pub fn path(&self) -> &Path {
        &self.path
    }
}
