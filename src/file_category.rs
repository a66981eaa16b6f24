//! Category table for the by-category strategy.
//!
//! This module maps file extensions to broad categories ("Images", "Audio",
//! "Documents", ...). The table is fixed: it is built once and shared by every
//! classification call.
//!
//! # Examples
//!
//! ```
//! use autosort::file_category::{Category, CategoryTable};
//!
//! let table = CategoryTable::standard();
//! assert_eq!(table.lookup(".jpg"), Category::Images);
//! assert_eq!(table.lookup("MP3"), Category::Audio);
//! assert_eq!(table.lookup(".unknown"), Category::Others);
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

/// Represents a broad file category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Image files (JPG, PNG, GIF, ...)
    Images,
    /// Video files (MP4, MOV, MKV, ...)
    Videos,
    /// Document files (PDF, DOCX, TXT, ...)
    Documents,
    /// Audio files (MP3, WAV, FLAC, ...)
    Audio,
    /// Archive files (ZIP, RAR, 7Z, ...)
    Archives,
    /// Source code and markup files
    Code,
    /// BitTorrent metadata files
    Torrents,
    /// Installers, binaries and scripts
    Executables,
    /// Everything the table does not know
    Others,
}

impl Category {
    /// Returns the folder name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use autosort::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "Images");
    /// assert_eq!(Category::Others.dir_name(), "Others");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Videos => "Videos",
            Category::Documents => "Documents",
            Category::Audio => "Audio",
            Category::Archives => "Archives",
            Category::Code => "Code",
            Category::Torrents => "Torrents",
            Category::Executables => "Executables",
            Category::Others => "Others",
        }
    }
}

/// Extensions per category, lower-cased with leading dot.
const STANDARD_EXTENSIONS: &[(Category, &[&str])] = &[
    (
        Category::Images,
        &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff"],
    ),
    (
        Category::Videos,
        &[".mp4", ".mov", ".avi", ".mkv", ".wmv", ".m4a"],
    ),
    (
        Category::Documents,
        &[
            ".doc", ".docx", ".pdf", ".txt", ".xls", ".xlsx", ".ppt", ".pptx",
        ],
    ),
    (Category::Audio, &[".mp3", ".wav", ".flac", ".aac", ".ogg"]),
    (Category::Archives, &[".zip", ".rar", ".7z", ".tar", ".gz"]),
    (
        Category::Code,
        &[
            ".cs", ".js", ".py", ".java", ".html", ".css", ".cpp", ".json", ".xml",
        ],
    ),
    (Category::Torrents, &[".torrent"]),
    (Category::Executables, &[".exe", ".msi", ".bat", ".cmd"]),
];

static STANDARD_TABLE: LazyLock<CategoryTable> = LazyLock::new(CategoryTable::new);

/// Maps file extensions to categories.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    extension_map: HashMap<String, Category>,
}

impl CategoryTable {
    /// Creates a table holding the standard mappings.
    pub fn new() -> Self {
        let mut table = Self {
            extension_map: HashMap::new(),
        };
        for (category, extensions) in STANDARD_EXTENSIONS {
            for ext in *extensions {
                table.extension_map.insert(normalize(ext), *category);
            }
        }
        table
    }

    /// Returns the shared standard table.
    pub fn standard() -> &'static CategoryTable {
        &STANDARD_TABLE
    }

    /// Looks up the category for an extension, falling back to `Others`.
    ///
    /// The leading dot is optional and case is ignored.
    pub fn lookup(&self, ext: &str) -> Category {
        self.extension_map
            .get(&normalize(ext))
            .copied()
            .unwrap_or(Category::Others)
    }

    /// Number of known extensions.
    pub fn len(&self) -> usize {
        self.extension_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extension_map.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_dir_names() {
        assert_eq!(Category::Images.dir_name(), "Images");
        assert_eq!(Category::Videos.dir_name(), "Videos");
        assert_eq!(Category::Documents.dir_name(), "Documents");
        assert_eq!(Category::Audio.dir_name(), "Audio");
        assert_eq!(Category::Archives.dir_name(), "Archives");
        assert_eq!(Category::Code.dir_name(), "Code");
        assert_eq!(Category::Torrents.dir_name(), "Torrents");
        assert_eq!(Category::Executables.dir_name(), "Executables");
        assert_eq!(Category::Others.dir_name(), "Others");
    }

    #[test]
    fn test_lookup_known_extensions() {
        let table = CategoryTable::standard();
        assert_eq!(table.lookup(".jpg"), Category::Images);
        assert_eq!(table.lookup(".mp3"), Category::Audio);
        assert_eq!(table.lookup(".pdf"), Category::Documents);
        assert_eq!(table.lookup(".torrent"), Category::Torrents);
        assert_eq!(table.lookup(".7z"), Category::Archives);
        assert_eq!(table.lookup(".json"), Category::Code);
        assert_eq!(table.lookup(".msi"), Category::Executables);
        assert_eq!(table.lookup(".mkv"), Category::Videos);
    }

    #[test]
    fn test_m4a_is_filed_with_videos() {
        assert_eq!(CategoryTable::standard().lookup(".m4a"), Category::Videos);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = CategoryTable::standard();
        assert_eq!(table.lookup(".JPG"), Category::Images);
        assert_eq!(table.lookup(".Pdf"), Category::Documents);
    }

    #[test]
    fn test_lookup_accepts_missing_dot() {
        assert_eq!(CategoryTable::standard().lookup("png"), Category::Images);
    }

    #[test]
    fn test_unknown_and_empty_fall_back_to_others() {
        let table = CategoryTable::standard();
        assert_eq!(table.lookup(".unknown"), Category::Others);
        assert_eq!(table.lookup(""), Category::Others);
        // Extensions the table deliberately leaves out.
        assert_eq!(table.lookup(".rs"), Category::Others);
        assert_eq!(table.lookup(".webp"), Category::Others);
    }

    #[test]
    fn test_table_size() {
        let expected: usize = STANDARD_EXTENSIONS.iter().map(|(_, e)| e.len()).sum();
        assert_eq!(CategoryTable::new().len(), expected);
        assert!(!CategoryTable::default().is_empty());
    }
}
