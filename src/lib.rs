//! autosort - keep a directory organized
//!
//! This library sorts the files of one directory into sub-folders chosen by a
//! strategy (extension, category, creation month or first letter), moves them
//! without ever overwriting anything, and watches the directory so new files
//! are sorted once they have settled.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod debouncer;
pub mod file_category;
pub mod ignore;
pub mod mover;
pub mod organizer;
pub mod output;
pub mod session;
pub mod watcher;

pub use classifier::{FileRecord, Strategy, target_folder};
pub use config::{AppConfig, CompiledFilters, ConfigError};
pub use debouncer::{ChangeDebouncer, SETTLE_DELAY};
pub use file_category::{Category, CategoryTable};
pub use ignore::should_ignore;
pub use mover::{CollisionSafeMover, MoveError};
pub use organizer::{FileOutcome, IgnoreReason, OrganizeError, Organizer, PreviewEntry, SweepReport};
pub use session::Session;
pub use watcher::{DirectoryWatcher, WatchSetupError};

pub use cli::{OrganizeCommand, run_cli};
