//! Detection of files that must never be touched.
//!
//! Browsers and download managers write into a temporary name and rename the
//! file once it is complete. Those in-progress files are skipped by every sweep
//! and every watched event.

use std::path::Path;

/// Extensions (lower-cased, with leading dot) of files that are never organized.
pub const IGNORED_EXTENSIONS: [&str; 2] = [".crdownload", ".tmp"];

/// Returns `true` if the file at `path` is an in-progress download or temp file.
///
/// The comparison is case-insensitive and looks only at the final extension.
///
/// # Examples
///
/// ```
/// use autosort::ignore::should_ignore;
/// use std::path::Path;
///
/// assert!(should_ignore(Path::new("movie.mp4.crdownload")));
/// assert!(should_ignore(Path::new("a.CRDOWNLOAD")));
/// assert!(!should_ignore(Path::new("a.txt")));
/// ```
pub fn should_ignore(path: &Path) -> bool {
    let Some(ext) = path.extension() else {
        return false;
    };
    let ext = ext.to_string_lossy().to_lowercase();
    IGNORED_EXTENSIONS
        .iter()
        .any(|ignored| ignored.trim_start_matches('.') == ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignores_partial_downloads() {
        assert!(should_ignore(Path::new("a.crdownload")));
        assert!(should_ignore(Path::new("/downloads/video.mp4.crdownload")));
        assert!(should_ignore(Path::new("scratch.tmp")));
    }

    #[test]
    fn test_ignore_is_case_insensitive() {
        assert!(should_ignore(Path::new("a.CRDOWNLOAD")));
        assert!(should_ignore(Path::new("a.CrDownload")));
        assert!(should_ignore(Path::new("a.TMP")));
    }

    #[test]
    fn test_regular_files_are_not_ignored() {
        assert!(!should_ignore(Path::new("a.txt")));
        assert!(!should_ignore(Path::new("video.mp4")));
        assert!(!should_ignore(Path::new("no_extension")));
        // Only the final extension counts.
        assert!(!should_ignore(Path::new("notes.tmp.txt")));
        // A bare dotfile has no extension.
        assert!(!should_ignore(Path::new(".tmp")));
    }
}
