//! Output formatting and styling module.
//!
//! All terminal output goes through [`OutputFormatter`] so colours, symbols and
//! table layout stay consistent between commands.

use crate::organizer::{FileOutcome, PreviewEntry, SweepReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::Path;

/// Manages CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for a sweep over `total` files.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Prints one outcome as a single line, relative to `root`.
    pub fn outcome(root: &Path, outcome: &FileOutcome) {
        let name = |path: &Path| {
            path.strip_prefix(root)
                .unwrap_or(path)
                .display()
                .to_string()
        };
        match outcome {
            FileOutcome::Moved {
                source,
                destination,
                ..
            } => Self::success(&format!("{} → {}", name(source), name(destination))),
            FileOutcome::Ignored { path, reason } => {
                println!("{} {} ({})", "·".dimmed(), name(path), reason.describe());
            }
            FileOutcome::Failed { path, error } => {
                Self::error(&format!("{}: {}", name(path), error));
            }
        }
    }

    /// Prints the full result of a sweep: failures, then a per-folder table.
    pub fn sweep_report(report: &SweepReport) {
        for outcome in &report.outcomes {
            if matches!(outcome, FileOutcome::Failed { .. }) {
                Self::outcome(&report.root, outcome);
            }
        }

        Self::summary_table(&report.folder_counts(), report.moved());

        if report.ignored() > 0 {
            Self::info(&format!("{} file(s) left alone", report.ignored()));
        }
        if report.failed() > 0 {
            Self::warning(&format!(
                "{} file(s) could not be moved and were left in place",
                report.failed()
            ));
        }
    }

    /// Prints a preview as a two-column table.
    pub fn preview_table(entries: &[PreviewEntry]) {
        if entries.is_empty() {
            Self::info("No files to organize.");
            return;
        }

        let width = entries
            .iter()
            .map(|e| e.file_name.chars().count())
            .max()
            .unwrap_or(0)
            .max(4);

        println!("{:<width$}   {}", "File".bold(), "Folder".bold(), width = width);
        println!("{}", "-".repeat(width + 12));
        for entry in entries {
            println!(
                "{:<width$} → {}/",
                entry.file_name,
                entry.target_folder.cyan(),
                width = width
            );
        }
    }

    /// Prints a summary table with moved-file counts by folder.
    pub fn summary_table(folder_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let max_folder_len = folder_counts
            .keys()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0)
            .max(6);

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = max_folder_len
        );
        println!("{}", "-".repeat(max_folder_len + 10));

        for (folder, count) in folder_counts {
            println!(
                "{:<width$} | {} {}",
                folder,
                count.to_string().green(),
                plural(*count),
                width = max_folder_len
            );
        }

        println!("{}", "-".repeat(max_folder_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = max_folder_len
        );
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
