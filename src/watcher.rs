//! Non-recursive directory watching.
//!
//! A [`DirectoryWatcher`] subscribes to OS notifications for one directory and
//! forwards "created" and "renamed to" paths into a [`ChangeDebouncer`].
//! Modify and delete notifications are not needed and are discarded.

use crate::debouncer::{ChangeDebouncer, NotificationSender};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors raised when a directory cannot be watched.
#[derive(Debug)]
pub enum WatchSetupError {
    /// The directory does not exist.
    NotFound { path: PathBuf },
    /// The path exists but is not a directory.
    NotADirectory { path: PathBuf },
    /// The directory cannot be accessed.
    Inaccessible { path: PathBuf, source: io::Error },
    /// The OS notification backend refused the watch.
    WatcherFailed {
        path: PathBuf,
        source: notify::Error,
    },
}

impl std::fmt::Display for WatchSetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "Directory {} does not exist", path.display()),
            Self::NotADirectory { path } => write!(f, "{} is not a directory", path.display()),
            Self::Inaccessible { path, source } => {
                write!(f, "Cannot access {}: {}", path.display(), source)
            }
            Self::WatcherFailed { path, source } => {
                write!(f, "Failed to watch {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for WatchSetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Inaccessible { source, .. } => Some(source),
            Self::WatcherFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Watches one directory and dispatches settled files.
///
/// Dropping the watcher stops the OS subscription first, then cancels every
/// pending settle window.
pub struct DirectoryWatcher {
    root: PathBuf,
    // Field order matters: the OS watcher must be dropped before the debouncer.
    watcher: RecommendedWatcher,
    debouncer: ChangeDebouncer,
}

impl DirectoryWatcher {
    /// Starts watching `root`. `dispatch` receives each settled file path.
    pub fn start<F>(root: &Path, settle_delay: Duration, dispatch: F) -> Result<Self, WatchSetupError>
    where
        F: FnMut(PathBuf) + Send + 'static,
    {
        let root = validate_root(root)?;
        let debouncer = ChangeDebouncer::spawn(settle_delay, dispatch);
        let sender = debouncer.sender();
        let watched_root = root.clone();

        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            match result {
                Ok(event) => forward(&event, &watched_root, &sender),
                Err(e) => log::warn!("Watcher error on {}: {}", watched_root.display(), e),
            }
        })
        .map_err(|e| WatchSetupError::WatcherFailed {
            path: root.clone(),
            source: e,
        })?;

        watcher
            .watch(&root, RecursiveMode::NonRecursive)
            .map_err(|e| WatchSetupError::WatcherFailed {
                path: root.clone(),
                source: e,
            })?;

        log::info!("Watching {}", root.display());
        Ok(Self {
            root,
            watcher,
            debouncer,
        })
    }

    /// The watched directory, canonicalized.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stops the OS subscription and cancels pending settle windows.
    pub fn stop(self) {
        let Self {
            root,
            mut watcher,
            debouncer,
        } = self;
        if let Err(e) = watcher.unwatch(&root) {
            log::debug!("Unwatch of {} failed: {}", root.display(), e);
        }
        drop(watcher);
        debouncer.stop();
        log::info!("Stopped watching {}", root.display());
    }
}

fn validate_root(root: &Path) -> Result<PathBuf, WatchSetupError> {
    let metadata = fs::metadata(root).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            WatchSetupError::NotFound {
                path: root.to_path_buf(),
            }
        } else {
            WatchSetupError::Inaccessible {
                path: root.to_path_buf(),
                source: e,
            }
        }
    })?;
    if !metadata.is_dir() {
        return Err(WatchSetupError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    fs::read_dir(root).map_err(|e| WatchSetupError::Inaccessible {
        path: root.to_path_buf(),
        source: e,
    })?;
    // Backends such as FSEvents report canonical paths.
    root.canonicalize()
        .map_err(|e| WatchSetupError::Inaccessible {
            path: root.to_path_buf(),
            source: e,
        })
}

fn forward(event: &Event, root: &Path, sender: &NotificationSender) {
    for path in notification_paths(event) {
        if path.parent() == Some(root) {
            sender.notify(path);
        }
    }
}

/// Paths worth settling for one notification: created entries and the new
/// name of renamed entries.
pub fn notification_paths(event: &Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(_) => event.paths.clone(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event.paths.clone(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.last().cloned().into_iter().collect()
        }
        // Backends that cannot tell the two sides apart; the settle check
        // drops whichever side no longer exists.
        EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => event.paths.clone(),
        _ => Vec::new(),
    }
}
