//! Settling of raw filesystem notifications.
//!
//! Every notification for a path opens a settle window. When the window
//! expires the path is checked again, on its state *after* the delay: a file
//! that was renamed away, deleted, or still carries an in-progress download
//! extension is dropped; anything else is dispatched exactly once.
//!
//! ```text
//! Received -> Settling -> Dispatch
//!                      \-> Dropped
//! ```

use crate::ignore::should_ignore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Time a file must be left alone before it is organized.
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Why a settled path was not dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The path no longer exists.
    Vanished,
    /// The path is a directory or another non-regular entry.
    NotAFile,
    /// The path still has an ignored extension.
    Ignored,
}

/// Result of re-checking a path once its settle window has expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    Dispatch(PathBuf),
    Dropped(PathBuf, DropReason),
}

/// Checks the post-delay state of `path`.
pub fn settle_check(path: &Path) -> Settled {
    if should_ignore(path) {
        return Settled::Dropped(path.to_path_buf(), DropReason::Ignored);
    }
    match std::fs::symlink_metadata(path) {
        Err(_) => Settled::Dropped(path.to_path_buf(), DropReason::Vanished),
        Ok(metadata) if !metadata.is_file() => {
            Settled::Dropped(path.to_path_buf(), DropReason::NotAFile)
        }
        Ok(_) => Settled::Dispatch(path.to_path_buf()),
    }
}

/// Pending settle windows, keyed by path.
///
/// Time is passed in explicitly so the state machine can be driven without
/// waiting.
#[derive(Debug)]
pub struct SettleQueue {
    delay: Duration,
    pending: HashMap<PathBuf, Instant>,
}

impl SettleQueue {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    /// Records a notification for `path` received at `now`.
    ///
    /// A path that is already settling keeps its current window, so a burst of
    /// notifications produces a single dispatch.
    pub fn note(&mut self, path: PathBuf, now: Instant) {
        self.pending.entry(path).or_insert(now + self.delay);
    }

    /// Earliest expiry among pending windows.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Removes and returns every path whose window has expired at `now`,
    /// in expiry order.
    pub fn take_due(&mut self, now: Instant) -> Vec<PathBuf> {
        let mut due: Vec<(Instant, PathBuf)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(path, deadline)| (*deadline, path.clone()))
            .collect();
        due.sort();
        for (_, path) in &due {
            self.pending.remove(path);
        }
        due.into_iter().map(|(_, path)| path).collect()
    }

    /// Cancels every pending window, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

enum Command {
    Notify(PathBuf),
    Stop,
}

/// Cloneable handle for feeding notifications into a [`ChangeDebouncer`].
#[derive(Clone)]
pub struct NotificationSender {
    tx: mpsc::Sender<Command>,
}

impl NotificationSender {
    /// Queues a notification. Returns `false` once the debouncer has stopped.
    pub fn notify(&self, path: PathBuf) -> bool {
        self.tx.send(Command::Notify(path)).is_ok()
    }
}

/// Worker thread that settles notifications and dispatches stable files.
///
/// Dispatches run one at a time on the worker, in window expiry order.
/// Stopping the debouncer (or dropping it) cancels all pending windows.
pub struct ChangeDebouncer {
    sender: NotificationSender,
    cancelled: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ChangeDebouncer {
    /// Starts the worker. `dispatch` is called once per settled file.
    pub fn spawn<F>(settle_delay: Duration, mut dispatch: F) -> Self
    where
        F: FnMut(PathBuf) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Command>();
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = Arc::clone(&cancelled);

        let worker = thread::spawn(move || {
            let mut queue = SettleQueue::new(settle_delay);
            loop {
                let message = match queue.next_deadline() {
                    Some(deadline) => {
                        rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                    }
                    None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                };

                match message {
                    Ok(Command::Notify(path)) => queue.note(path, Instant::now()),
                    Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }

                for path in queue.take_due(Instant::now()) {
                    if worker_cancelled.load(Ordering::SeqCst) {
                        break;
                    }
                    match settle_check(&path) {
                        Settled::Dispatch(path) => dispatch(path),
                        Settled::Dropped(path, reason) => {
                            log::debug!("Dropped {} after settling: {:?}", path.display(), reason);
                        }
                    }
                }

                if worker_cancelled.load(Ordering::SeqCst) {
                    break;
                }
            }

            let cancelled_windows = queue.clear();
            if cancelled_windows > 0 {
                log::debug!("Cancelled {} pending settle windows", cancelled_windows);
            }
        });

        Self {
            sender: NotificationSender { tx },
            cancelled,
            worker: Some(worker),
        }
    }

    /// Handle for feeding notifications from another thread.
    pub fn sender(&self) -> NotificationSender {
        self.sender.clone()
    }

    /// Queues a notification for `path`.
    pub fn notify(&self, path: PathBuf) {
        self.sender.notify(path);
    }

    /// Cancels pending windows and waits for a running dispatch to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _ = self.sender.tx.send(Command::Stop);
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::warn!("Debouncer worker panicked");
        }
    }
}

impl Drop for ChangeDebouncer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
