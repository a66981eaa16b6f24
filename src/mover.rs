//! Collision-safe moves of single files into folders.
//!
//! A move never overwrites an existing entry. When the file's name is already
//! taken in the destination folder, a numeric disambiguator is inserted before
//! the extension: `copy.txt`, `copy (1).txt`, `copy (2).txt`, ...

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Highest disambiguator tried before giving up on a name.
pub const MAX_DISAMBIGUATOR: u32 = 10_000;

/// Errors that can occur while moving a file.
///
/// Every variant leaves the source file where it was.
#[derive(Debug)]
pub enum MoveError {
    /// The destination folder name is not a single plain path component.
    InvalidDestination { folder: String },
    /// Failed to create the destination folder.
    DirectoryCreationFailed {
        path: PathBuf,
        source: io::Error,
    },
    /// The source file disappeared before it could be moved.
    SourceMissing { path: PathBuf },
    /// The source path has no file name component.
    InvalidFileName { path: PathBuf },
    /// The source file exists but its metadata could not be read.
    Unreadable { path: PathBuf, source: io::Error },
    /// The filesystem refused the move (permissions, path length, other volume, ...).
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
    /// Every candidate name up to [`MAX_DISAMBIGUATOR`] is taken.
    NamesExhausted { folder: PathBuf, file_name: PathBuf },
}

impl MoveError {
    /// Returns `true` when the source vanished before the move.
    pub fn is_source_missing(&self) -> bool {
        matches!(self, Self::SourceMissing { .. })
    }
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDestination { folder } => {
                write!(f, "'{}' is not a usable folder name", folder)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(f, "Failed to create folder {}: {}", path.display(), source)
            }
            Self::SourceMissing { path } => {
                write!(f, "{} no longer exists", path.display())
            }
            Self::InvalidFileName { path } => {
                write!(f, "{} has no file name", path.display())
            }
            Self::Unreadable { path, source } => {
                write!(f, "Cannot read {}: {}", path.display(), source)
            }
            Self::MoveFailed {
                source,
                destination,
                source_error,
            } => write!(
                f,
                "Failed to move {} to {}: {}",
                source.display(),
                destination.display(),
                source_error
            ),
            Self::NamesExhausted { folder, file_name } => write!(
                f,
                "No free name for {} in {} after {} attempts",
                file_name.display(),
                folder.display(),
                MAX_DISAMBIGUATOR
            ),
        }
    }
}

impl std::error::Error for MoveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DirectoryCreationFailed { source, .. } | Self::Unreadable { source, .. } => {
                Some(source)
            }
            Self::MoveFailed { source_error, .. } => Some(source_error),
            _ => None,
        }
    }
}

/// Result type for move operations.
pub type MoveResult<T> = Result<T, MoveError>;

/// Checks that `folder` can be used as a single sub-folder name.
///
/// Rejects empty names, `.`, `..`, and anything containing a path separator.
pub fn validate_folder_name(folder: &str) -> MoveResult<()> {
    let mut components = Path::new(folder).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(MoveError::InvalidDestination {
            folder: folder.to_string(),
        }),
    }
}

/// Returns `"<stem> (<n>)<ext>"` for `file_name`.
///
/// The name is handled as an OS string, so names that are not valid UTF-8
/// keep their exact bytes.
///
/// # Examples
///
/// ```
/// use autosort::mover::disambiguated_name;
///
/// assert_eq!(disambiguated_name("copy.txt", 1), "copy (1).txt");
/// assert_eq!(disambiguated_name("archive.tar.gz", 2), "archive.tar (2).gz");
/// assert_eq!(disambiguated_name("README", 3), "README (3)");
/// ```
pub fn disambiguated_name(file_name: impl AsRef<OsStr>, n: u32) -> OsString {
    let file_name = file_name.as_ref();
    let path = Path::new(file_name);
    let mut name = path.file_stem().unwrap_or(file_name).to_os_string();
    name.push(format!(" ({})", n));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

/// Moves files into folders without ever overwriting anything.
///
/// Moves through the same mover are serialized, so two files with the same
/// name handed over at the same moment always end up under distinct names.
#[derive(Debug, Default)]
pub struct CollisionSafeMover {
    lock: Mutex<()>,
}

impl CollisionSafeMover {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves `source` into `destination_folder` and returns the final path.
    ///
    /// The folder (and its parents) is created if missing. The file keeps its
    /// name unless that name is taken, in which case the first free
    /// `"<stem> (<n>)<ext>"` is used.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use autosort::mover::CollisionSafeMover;
    /// use std::path::Path;
    ///
    /// let mover = CollisionSafeMover::new();
    /// match mover.move_file(Path::new("/downloads/copy.txt"), Path::new("/downloads/Documents")) {
    ///     Ok(path) => println!("Moved to {}", path.display()),
    ///     Err(e) => eprintln!("Move failed: {}", e),
    /// }
    /// ```
    pub fn move_file(&self, source: &Path, destination_folder: &Path) -> MoveResult<PathBuf> {
        let file_name = source
            .file_name()
            .ok_or_else(|| MoveError::InvalidFileName {
                path: source.to_path_buf(),
            })?;

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        match fs::symlink_metadata(source) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(MoveError::SourceMissing {
                    path: source.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(MoveError::Unreadable {
                    path: source.to_path_buf(),
                    source: e,
                });
            }
        }

        // create_dir_all succeeds if another actor created the folder first.
        fs::create_dir_all(destination_folder).map_err(|e| {
            MoveError::DirectoryCreationFailed {
                path: destination_folder.to_path_buf(),
                source: e,
            }
        })?;

        for n in 0..=MAX_DISAMBIGUATOR {
            let candidate = if n == 0 {
                destination_folder.join(file_name)
            } else {
                destination_folder.join(disambiguated_name(file_name, n))
            };

            match place(source, &candidate) {
                Ok(()) => return Ok(candidate),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) if e.kind() == io::ErrorKind::NotFound && !source.exists() => {
                    return Err(MoveError::SourceMissing {
                        path: source.to_path_buf(),
                    });
                }
                Err(e) => {
                    return Err(MoveError::MoveFailed {
                        source: source.to_path_buf(),
                        destination: candidate,
                        source_error: e,
                    });
                }
            }
        }

        Err(MoveError::NamesExhausted {
            folder: destination_folder.to_path_buf(),
            file_name: PathBuf::from(file_name),
        })
    }
}

/// Moves `source` to `destination`, failing with `AlreadyExists` if the name is taken.
///
/// The hard link claims the destination name atomically, even against other
/// processes. Filesystems without hard links get a checked rename instead,
/// which is only race-free against callers holding the mover lock.
fn place(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::hard_link(source, destination) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(source) {
                // Roll back so the source is the only copy again.
                let _ = fs::remove_file(destination);
                return Err(e);
            }
            Ok(())
        }
        Err(e) if matches!(
            e.kind(),
            io::ErrorKind::AlreadyExists | io::ErrorKind::NotFound
        ) =>
        {
            Err(e)
        }
        Err(e) => {
            log::debug!(
                "Hard link to {} failed ({}), falling back to rename",
                destination.display(),
                e
            );
            if fs::symlink_metadata(destination).is_ok() {
                return Err(io::Error::from(io::ErrorKind::AlreadyExists));
            }
            fs::rename(source, destination)
        }
    }
}
