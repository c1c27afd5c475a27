//! Daemon startup and main loop
//!
//! Resolves directories, runs the startup checks, then feeds watcher events
//! through the compression handler one at a time until shutdown.

use crate::config::{Config, ConfigError};
use crate::folders::{resolve_directories, FolderError, ResolvedDirs};
use crate::handler::{CompressionHandler, HandlerSettings};
use crate::startup::{ensure_input_dir, ensure_output_dir, probe_ffmpeg, StartupError};
use crate::watcher::{DirectoryWatcher, FileEvent, WatchError};
use std::future::Future;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{info, warn};

/// Error type for daemon operations
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Directory resolution failed
    #[error("Folder error: {0}")]
    Folder(#[from] FolderError),

    /// Startup check failed
    #[error("Startup check failed: {0}")]
    Startup(#[from] StartupError),

    /// Watcher could not be started
    #[error("Watcher error: {0}")]
    Watch(#[from] WatchError),
}

/// Daemon state containing all runtime components
pub struct Daemon {
    /// Configuration loaded from file and environment
    pub config: Config,
    /// Watched and output directories
    pub dirs: ResolvedDirs,
    handler: CompressionHandler,
}

impl Daemon {
    /// Initialize the daemon
    ///
    /// 1. Resolve input/output directories
    /// 2. Fail if the input directory is missing
    /// 3. Create the output directory
    /// 4. Probe ffmpeg (logged only)
    pub fn new(config: Config) -> Result<Self, DaemonError> {
        let daemon = Self::new_without_checks(config)?;
        probe_ffmpeg(&daemon.config.ffmpeg.path);
        Ok(daemon)
    }

    /// Initialize the daemon without probing ffmpeg
    ///
    /// Directory checks still run; they are preconditions of every job.
    pub fn new_without_checks(config: Config) -> Result<Self, DaemonError> {
        let dirs = resolve_directories(&config.paths)?;

        ensure_input_dir(&dirs.input_dir)?;
        ensure_output_dir(&dirs.output_dir)?;

        info!(
            input = %dirs.input_dir.display(),
            output = %dirs.output_dir.display(),
            "Directories resolved"
        );

        let settings = HandlerSettings::from_config(&config, dirs.output_dir.clone());
        let handler = CompressionHandler::new(settings);

        Ok(Self {
            config,
            dirs,
            handler,
        })
    }

    pub fn handler(&self) -> &CompressionHandler {
        &self.handler
    }

    /// Run until `shutdown` resolves
    ///
    /// Starts the watcher, then processes events serially. An in-flight
    /// compression is allowed to finish; shutdown is observed between jobs.
    pub async fn run<F>(&self, shutdown: F) -> Result<(), DaemonError>
    where
        F: Future<Output = ()>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = DirectoryWatcher::start(&self.dirs.input_dir, tx)?;

        let handled = process_events(&self.handler, rx, shutdown).await;

        drop(watcher);
        info!(handled, "Watcher stopped");
        Ok(())
    }
}

/// Drain `rx` through `handler` one event at a time until `shutdown`
/// resolves or every sender is gone. Returns the number of events handled.
pub async fn process_events<F>(
    handler: &CompressionHandler,
    mut rx: UnboundedReceiver<FileEvent>,
    shutdown: F,
) -> usize
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut handled = 0;

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            event = rx.recv() => match event {
                Some(event) => {
                    let outcome = handler.handle(&event).await;
                    info!(
                        path = %event.full_path.display(),
                        outcome = outcome.as_str(),
                        "Event handled"
                    );
                    handled += 1;
                }
                None => {
                    warn!("Event channel closed");
                    break;
                }
            },
        }
    }

    handled
}
