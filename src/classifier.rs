//! Folder assignment for files.
//!
//! [`target_folder`] is a pure function of a [`FileRecord`] and a [`Strategy`]:
//! it never fails, never touches the filesystem and never moves anything.

use crate::file_category::CategoryTable;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Folder used by [`Strategy::ByExtension`] for files without an extension.
pub const NO_EXTENSION_FOLDER: &str = "NOEXT";

/// The rule set used to compute a file's target folder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// `report.pdf` goes to `PDF/`.
    #[value(alias = "extension")]
    ByExtension,
    /// `report.pdf` goes to `Documents/`.
    #[default]
    #[value(alias = "category")]
    ByCategory,
    /// A file created in July 2025 goes to `2025-07/`.
    #[value(alias = "date")]
    ByCreationDate,
    /// `apple.txt` goes to `A/`.
    #[value(alias = "letter")]
    ByFirstLetter,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::ByExtension,
        Strategy::ByCategory,
        Strategy::ByCreationDate,
        Strategy::ByFirstLetter,
    ];

    /// Kebab-case name, as used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::ByExtension => "by-extension",
            Strategy::ByCategory => "by-category",
            Strategy::ByCreationDate => "by-creation-date",
            Strategy::ByFirstLetter => "by-first-letter",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "by-extension" | "extension" => Ok(Strategy::ByExtension),
            "by-category" | "category" => Ok(Strategy::ByCategory),
            "by-creation-date" | "date" => Ok(Strategy::ByCreationDate),
            "by-first-letter" | "letter" => Ok(Strategy::ByFirstLetter),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// Read-only snapshot of one file, taken on demand and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path of the file.
    pub path: PathBuf,
    /// Final path component.
    pub file_name: String,
    /// Lower-cased extension with its leading dot, or empty.
    pub extension: String,
    /// Creation time in local time.
    pub created: DateTime<Local>,
}

impl FileRecord {
    /// Builds a record from a path and a known creation time, without any I/O.
    pub fn new(path: impl Into<PathBuf>, created: DateTime<Local>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = extension_of(&path);
        Self {
            path,
            file_name,
            extension,
            created,
        }
    }

    /// Reads the metadata of `path` and builds a record.
    ///
    /// Falls back to the modification time where the platform or filesystem
    /// does not record creation times.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let timestamp = metadata.created().or_else(|_| metadata.modified())?;
        Ok(Self::new(path, DateTime::<Local>::from(timestamp)))
    }
}

/// Lower-cased extension of `path` with its leading dot, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Computes the folder a file belongs in under `strategy`.
///
/// # Examples
///
/// ```
/// use autosort::classifier::{target_folder, FileRecord, Strategy};
/// use chrono::{Local, TimeZone};
///
/// let created = Local.with_ymd_and_hms(2025, 7, 14, 9, 30, 0).unwrap();
/// let file = FileRecord::new("/tmp/report.pdf", created);
///
/// assert_eq!(target_folder(&file, Strategy::ByExtension), "PDF");
/// assert_eq!(target_folder(&file, Strategy::ByCategory), "Documents");
/// assert_eq!(target_folder(&file, Strategy::ByCreationDate), "2025-07");
/// assert_eq!(target_folder(&file, Strategy::ByFirstLetter), "R");
/// ```
pub fn target_folder(file: &FileRecord, strategy: Strategy) -> String {
    match strategy {
        Strategy::ByExtension => {
            let ext = file.extension.trim_start_matches('.');
            if ext.is_empty() {
                NO_EXTENSION_FOLDER.to_string()
            } else {
                ext.to_uppercase()
            }
        }
        Strategy::ByCategory => CategoryTable::standard()
            .lookup(&file.extension)
            .dir_name()
            .to_string(),
        Strategy::ByCreationDate => file.created.format("%Y-%m").to_string(),
        // Unicode case mapping does not depend on the process locale.
        Strategy::ByFirstLetter => file
            .file_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn created(y: i32, m: u32, d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn record(name: &str) -> FileRecord {
        FileRecord::new(PathBuf::from("/data").join(name), created(2025, 7, 14))
    }

    #[test]
    fn test_record_fields() {
        let file = record("Report.Final.PDF");
        assert_eq!(file.file_name, "Report.Final.PDF");
        assert_eq!(file.extension, ".pdf");
        assert_eq!(record("Makefile").extension, "");
    }

    #[test]
    fn test_by_extension() {
        assert_eq!(target_folder(&record("report.pdf"), Strategy::ByExtension), "PDF");
        assert_eq!(target_folder(&record("a.tar.gz"), Strategy::ByExtension), "GZ");
        assert_eq!(target_folder(&record("photo.JpEg"), Strategy::ByExtension), "JPEG");
    }

    #[test]
    fn test_by_extension_without_extension() {
        assert_eq!(
            target_folder(&record("Makefile"), Strategy::ByExtension),
            NO_EXTENSION_FOLDER
        );
        assert_eq!(
            target_folder(&record(".bashrc"), Strategy::ByExtension),
            NO_EXTENSION_FOLDER
        );
    }

    #[test]
    fn test_by_category() {
        let cases = [
            ("x.jpg", "Images"),
            ("x.mp3", "Audio"),
            ("x.pdf", "Documents"),
            ("x.torrent", "Torrents"),
            ("x.unknown", "Others"),
            ("X.JPG", "Images"),
            ("noext", "Others"),
        ];
        for (name, folder) in cases {
            assert_eq!(target_folder(&record(name), Strategy::ByCategory), folder, "{}", name);
        }
    }

    #[test]
    fn test_by_creation_date() {
        assert_eq!(target_folder(&record("a.txt"), Strategy::ByCreationDate), "2025-07");

        let january = FileRecord::new("/data/b.txt", created(2024, 1, 31));
        assert_eq!(target_folder(&january, Strategy::ByCreationDate), "2024-01");
    }

    #[test]
    fn test_by_first_letter() {
        assert_eq!(target_folder(&record("apple.txt"), Strategy::ByFirstLetter), "A");
        assert_eq!(target_folder(&record("Zebra.png"), Strategy::ByFirstLetter), "Z");
        assert_eq!(target_folder(&record("ébauche.doc"), Strategy::ByFirstLetter), "É");
    }

    #[test]
    fn test_by_first_letter_keeps_non_letters() {
        assert_eq!(target_folder(&record("2024-report.pdf"), Strategy::ByFirstLetter), "2");
        assert_eq!(target_folder(&record("_draft.txt"), Strategy::ByFirstLetter), "_");
        assert_eq!(target_folder(&record("日記.txt"), Strategy::ByFirstLetter), "日");
    }

    #[test]
    fn test_classification_is_deterministic() {
        let file = record("Holiday Photo.JPG");
        for strategy in Strategy::ALL {
            assert_eq!(target_folder(&file, strategy), target_folder(&file, strategy));
        }
    }

    #[test]
    fn test_strategy_names_round_trip() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.name().parse::<Strategy>(), Ok(strategy));
        }
        assert_eq!("category".parse::<Strategy>(), Ok(Strategy::ByCategory));
        assert!("by-size".parse::<Strategy>().is_err());
        assert_eq!(Strategy::default(), Strategy::ByCategory);
    }

    #[test]
    fn test_from_path_reads_metadata() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("Notes.TXT");
        std::fs::write(&path, "hello").expect("Failed to write test file");

        let file = FileRecord::from_path(&path).expect("Failed to read metadata");
        assert_eq!(file.file_name, "Notes.TXT");
        assert_eq!(file.extension, ".txt");
        assert_eq!(target_folder(&file, Strategy::ByCategory), "Documents");
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = FileRecord::from_path(Path::new("/non/existent/file.txt")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
