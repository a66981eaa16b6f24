//! Sweep, single-file and preview pipelines.
//!
//! Every pipeline runs the same steps on the immediate files of one directory:
//! in-progress download check, user exclusion rules, classification, and a
//! collision-safe move into the target folder. Callers pass the root and the
//! strategy explicitly; the organizer itself holds no selection state.

use crate::classifier::{FileRecord, Strategy, target_folder};
use crate::config::CompiledFilters;
use crate::ignore::should_ignore;
use crate::mover::{CollisionSafeMover, MoveError, validate_folder_name};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Why a file was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IgnoreReason {
    /// The extension marks an unfinished download or temp file.
    InProgressDownload,
    /// A configured exclusion rule matched.
    ExcludedByFilter,
    /// The entry is a directory, symlink or other non-regular file.
    NotAFile,
}

impl IgnoreReason {
    pub fn describe(&self) -> &'static str {
        match self {
            IgnoreReason::InProgressDownload => "download in progress",
            IgnoreReason::ExcludedByFilter => "excluded by configuration",
            IgnoreReason::NotAFile => "not a regular file",
        }
    }
}

/// What happened to one file.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was moved into `folder`.
    Moved {
        source: PathBuf,
        destination: PathBuf,
        folder: String,
    },
    /// The file was skipped.
    Ignored { path: PathBuf, reason: IgnoreReason },
    /// The move failed; the file is still at `path`.
    Failed { path: PathBuf, error: MoveError },
}

impl FileOutcome {
    /// The path the outcome is about, before any move.
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Moved { source, .. } => source,
            FileOutcome::Ignored { path, .. } | FileOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self, FileOutcome::Moved { .. })
    }
}

/// Aggregated outcomes of one sweep.
#[derive(Debug)]
pub struct SweepReport {
    pub root: PathBuf,
    pub strategy: Strategy,
    pub outcomes: Vec<FileOutcome>,
}

impl SweepReport {
    pub fn moved(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_moved()).count()
    }

    pub fn ignored(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Ignored { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Failed { .. }))
            .count()
    }

    /// Number of moved files per target folder, sorted by folder name.
    pub fn folder_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for outcome in &self.outcomes {
            if let FileOutcome::Moved { folder, .. } = outcome {
                *counts.entry(folder.clone()).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// One row of a preview: where a file would go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewEntry {
    pub file_name: String,
    pub target_folder: String,
}

/// Progress notification passed to [`Organizer::sweep_with`].
#[derive(Debug)]
pub struct SweepProgress<'a> {
    /// Index of this file among the listed entries.
    pub index: usize,
    /// Number of listed entries.
    pub total: usize,
    pub outcome: &'a FileOutcome,
}

/// Errors that affect a whole directory rather than one file.
#[derive(Debug)]
pub enum OrganizeError {
    /// No directory has been selected yet.
    NoRootSelected,
    /// The directory does not exist or cannot be accessed.
    InvalidRoot { path: PathBuf, source: io::Error },
    /// The path exists but is not a directory.
    NotADirectory { path: PathBuf },
    /// Listing the directory failed.
    ReadDirFailed { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRootSelected => write!(f, "No directory selected"),
            Self::InvalidRoot { path, source } => {
                write!(f, "Invalid directory {}: {}", path.display(), source)
            }
            Self::NotADirectory { path } => write!(f, "{} is not a directory", path.display()),
            Self::ReadDirFailed { path, source } => {
                write!(f, "Error reading directory {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRoot { source, .. } | Self::ReadDirFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for directory-level operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Classifies and moves files.
///
/// All moves go through one [`CollisionSafeMover`], so a sweep and an
/// event-driven move running at the same time are serialized.
#[derive(Debug, Default)]
pub struct Organizer {
    mover: CollisionSafeMover,
    filters: CompiledFilters,
}

impl Organizer {
    pub fn new(filters: CompiledFilters) -> Self {
        Self {
            mover: CollisionSafeMover::new(),
            filters,
        }
    }

    /// Moves every eligible file directly inside `root` into its target folder.
    ///
    /// Individual failures are recorded in the report and never stop the sweep.
    pub fn run_full_sweep(&self, root: &Path, strategy: Strategy) -> OrganizeResult<SweepReport> {
        self.sweep_with(root, strategy, |_| {})
    }

    /// Like [`run_full_sweep`](Self::run_full_sweep), calling `progress` after each file.
    pub fn sweep_with<F>(
        &self,
        root: &Path,
        strategy: Strategy,
        mut progress: F,
    ) -> OrganizeResult<SweepReport>
    where
        F: FnMut(SweepProgress<'_>),
    {
        let entries = list_files(root)?;
        let total = entries.len();
        log::info!(
            "Sweeping {} ({} files, {})",
            root.display(),
            total,
            strategy
        );

        let mut outcomes = Vec::with_capacity(total);
        for (index, path) in entries.into_iter().enumerate() {
            let outcome = self.organize_file(root, &path, strategy);
            progress(SweepProgress {
                index,
                total,
                outcome: &outcome,
            });
            outcomes.push(outcome);
        }

        let report = SweepReport {
            root: root.to_path_buf(),
            strategy,
            outcomes,
        };
        log::info!(
            "Sweep of {} done: {} moved, {} ignored, {} failed",
            root.display(),
            report.moved(),
            report.ignored(),
            report.failed()
        );
        Ok(report)
    }

    /// Runs the classify-then-move pipeline for one file.
    ///
    /// The target folder is created next to the file, in its parent directory.
    pub fn handle_single_file(&self, path: &Path, strategy: Strategy) -> FileOutcome {
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        self.organize_file(root, path, strategy)
    }

    /// Lists where each eligible file in `root` would go, without moving anything.
    ///
    /// Files that disappear while the listing is in progress are left out.
    pub fn preview(&self, root: &Path, strategy: Strategy) -> OrganizeResult<Vec<PreviewEntry>> {
        let entries = list_files(root)?;
        let preview = entries
            .iter()
            .filter(|path| self.ignore_reason(path).is_none())
            .filter_map(|path| FileRecord::from_path(path).ok())
            .map(|record| PreviewEntry {
                target_folder: target_folder(&record, strategy),
                file_name: record.file_name,
            })
            .collect();
        Ok(preview)
    }

    fn ignore_reason(&self, path: &Path) -> Option<IgnoreReason> {
        if should_ignore(path) {
            Some(IgnoreReason::InProgressDownload)
        } else if self.filters.excludes(path) {
            Some(IgnoreReason::ExcludedByFilter)
        } else {
            None
        }
    }

    fn organize_file(&self, root: &Path, path: &Path, strategy: Strategy) -> FileOutcome {
        if let Some(reason) = self.ignore_reason(path) {
            log::debug!("Ignoring {} ({})", path.display(), reason.describe());
            return FileOutcome::Ignored {
                path: path.to_path_buf(),
                reason,
            };
        }

        let record = match fs::symlink_metadata(path) {
            Ok(metadata) if !metadata.is_file() => {
                return FileOutcome::Ignored {
                    path: path.to_path_buf(),
                    reason: IgnoreReason::NotAFile,
                };
            }
            Ok(_) => FileRecord::from_path(path),
            Err(e) => Err(e),
        };
        let record = match record {
            Ok(record) => record,
            Err(e) => return failed(path, read_error(path, e)),
        };

        let folder = target_folder(&record, strategy);
        if let Err(e) = validate_folder_name(&folder) {
            return failed(path, e);
        }

        match self.mover.move_file(path, &root.join(&folder)) {
            Ok(destination) => {
                log::info!("Moved {} -> {}", path.display(), destination.display());
                FileOutcome::Moved {
                    source: path.to_path_buf(),
                    destination,
                    folder,
                }
            }
            Err(e) => failed(path, e),
        }
    }
}

fn failed(path: &Path, error: MoveError) -> FileOutcome {
    log::warn!("Could not organize {}: {}", path.display(), error);
    FileOutcome::Failed {
        path: path.to_path_buf(),
        error,
    }
}

fn read_error(path: &Path, e: io::Error) -> MoveError {
    if e.kind() == io::ErrorKind::NotFound {
        MoveError::SourceMissing {
            path: path.to_path_buf(),
        }
    } else {
        MoveError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        }
    }
}

/// Immediate regular files of `root`, sorted by name.
fn list_files(root: &Path) -> OrganizeResult<Vec<PathBuf>> {
    let metadata = fs::metadata(root).map_err(|e| OrganizeError::InvalidRoot {
        path: root.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_dir() {
        return Err(OrganizeError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let entries = fs::read_dir(root).map_err(|e| OrganizeError::ReadDirFailed {
        path: root.to_path_buf(),
        source: e,
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect();
    files.sort();
    Ok(files)
}
