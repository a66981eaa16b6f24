//! Entry points for a front end: pick a directory and a strategy, sweep,
//! preview, and receive the outcomes of automatic reorganization.
//!
//! # Examples
//!
//! ```no_run
//! use autosort::{Organizer, Session, Strategy};
//!
//! let mut session = Session::new(Organizer::default(), Strategy::ByCategory);
//! let events = session.subscribe().expect("first subscriber");
//! session.set_watched_root("/home/me/Downloads").expect("watchable directory");
//! session.run_full_sweep().expect("sweep");
//!
//! for outcome in events {
//!     println!("{:?}", outcome);
//! }
//! ```

use crate::classifier::Strategy;
use crate::debouncer::SETTLE_DELAY;
use crate::organizer::{FileOutcome, OrganizeError, OrganizeResult, Organizer, PreviewEntry, SweepReport};
use crate::watcher::{DirectoryWatcher, WatchSetupError};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// The current selection. Each operation works on a copy taken when it starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub root: Option<PathBuf>,
    pub strategy: Strategy,
}

/// Owns the organizer, the current selection and the active watch.
pub struct Session {
    organizer: Arc<Organizer>,
    settings: Arc<RwLock<Settings>>,
    settle_delay: Duration,
    watcher: Option<DirectoryWatcher>,
    outcomes_tx: Sender<FileOutcome>,
    outcomes_rx: Option<Receiver<FileOutcome>>,
}

impl Session {
    pub fn new(organizer: Organizer, strategy: Strategy) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::channel();
        Self {
            organizer: Arc::new(organizer),
            settings: Arc::new(RwLock::new(Settings {
                root: None,
                strategy,
            })),
            settle_delay: SETTLE_DELAY,
            watcher: None,
            outcomes_tx,
            outcomes_rx: Some(outcomes_rx),
        }
    }

    /// Overrides the settle delay used by watches started afterwards.
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Takes the receiving end of the event-driven outcome stream.
    ///
    /// There is a single consumer: only the first call returns `Some`.
    pub fn subscribe(&mut self) -> Option<Receiver<FileOutcome>> {
        self.outcomes_rx.take()
    }

    /// Snapshot of the current selection.
    pub fn settings(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn strategy(&self) -> Strategy {
        self.settings().strategy
    }

    pub fn watched_root(&self) -> Option<PathBuf> {
        self.settings().root
    }

    /// Selects the strategy for every classification that starts from now on.
    pub fn set_strategy(&self, strategy: Strategy) {
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .strategy = strategy;
        log::info!("Strategy set to {}", strategy);
    }

    /// Replaces the watched directory.
    ///
    /// The previous watch is stopped first and its pending settle windows are
    /// cancelled. If the new directory cannot be watched, nothing is watched
    /// and the error is returned.
    pub fn set_watched_root(&mut self, path: impl AsRef<Path>) -> Result<(), WatchSetupError> {
        self.stop_watching();

        let organizer = Arc::clone(&self.organizer);
        let settings = Arc::clone(&self.settings);
        let outcomes = self.outcomes_tx.clone();
        let watcher = DirectoryWatcher::start(path.as_ref(), self.settle_delay, move |file| {
            let strategy = settings
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .strategy;
            let outcome = organizer.handle_single_file(&file, strategy);
            // Nobody listening is fine.
            let _ = outcomes.send(outcome);
        })?;

        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .root = Some(watcher.root().to_path_buf());
        self.watcher = Some(watcher);
        Ok(())
    }

    /// Stops the current watch, if any.
    pub fn stop_watching(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.stop();
        }
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .root = None;
    }

    /// Sweeps the watched directory with the current strategy.
    pub fn run_full_sweep(&self) -> OrganizeResult<SweepReport> {
        let Settings { root, strategy } = self.settings();
        let root = root.ok_or(OrganizeError::NoRootSelected)?;
        self.organizer.run_full_sweep(&root, strategy)
    }

    /// Previews the watched directory with the current strategy.
    pub fn preview(&self) -> OrganizeResult<Vec<PreviewEntry>> {
        let Settings { root, strategy } = self.settings();
        let root = root.ok_or(OrganizeError::NoRootSelected)?;
        self.organizer.preview(&root, strategy)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_watching();
    }
}
