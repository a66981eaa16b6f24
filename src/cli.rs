//! Command-line interface module for autosort.
//!
//! This module handles all CLI-related functionality including:
//! - Command parsing (`sweep`, `preview`, `watch`)
//! - Configuration loading and strategy selection
//! - Rendering results as text or JSON

use crate::classifier::Strategy;
use crate::config::AppConfig;
use crate::organizer::{FileOutcome, Organizer, PreviewEntry, SweepReport};
use crate::output::OutputFormatter;
use crate::session::Session;
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Sorts the files of a directory into sub-folders and keeps it sorted.
#[derive(Debug, Parser)]
#[command(name = "autosort", version, about)]
pub struct Cli {
    /// Configuration file (default: ./.autosortrc.toml, then ~/.config/autosort/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// How to choose each file's folder (overrides the configuration file)
    #[arg(short, long, global = true, value_enum)]
    pub strategy: Option<Strategy>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: OrganizeCommand,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Subcommand)]
pub enum OrganizeCommand {
    /// Move every file in the directory into its folder once.
    Sweep { dir: PathBuf },
    /// Show where each file would go, without moving anything.
    Preview { dir: PathBuf },
    /// Sweep, then keep organizing new files as they appear.
    Watch {
        dir: PathBuf,
        /// Do not sweep existing files before watching.
        #[arg(long)]
        no_initial_sweep: bool,
    },
}

/// Runs the CLI application.
///
/// # Examples
///
/// ```no_run
/// use autosort::cli::{run_cli, Cli};
/// use clap::Parser;
///
/// let cli = Cli::parse_from(["autosort", "preview", "/path/to/directory"]);
/// if let Err(e) = run_cli(cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(cli: Cli) -> Result<(), String> {
    let config = AppConfig::load(cli.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let filters = config
        .compile_filters()
        .map_err(|e| format!("Error compiling filters: {}", e))?;
    let strategy = cli.strategy.unwrap_or(config.organize.strategy);
    let organizer = Organizer::new(filters);

    match cli.command {
        OrganizeCommand::Sweep { dir } => sweep(&organizer, &dir, strategy, cli.json),
        OrganizeCommand::Preview { dir } => preview(&organizer, &dir, strategy, cli.json),
        OrganizeCommand::Watch {
            dir,
            no_initial_sweep,
        } => watch(organizer, &dir, strategy, !no_initial_sweep, cli.json),
    }
}

fn sweep(organizer: &Organizer, dir: &Path, strategy: Strategy, as_json: bool) -> Result<(), String> {
    if !as_json {
        OutputFormatter::info(&format!(
            "Organizing contents of {} ({})",
            dir.display(),
            strategy
        ));
    }

    let mut progress: Option<ProgressBar> = None;
    let report = organizer
        .sweep_with(dir, strategy, |p| {
            if as_json {
                return;
            }
            let bar = progress
                .get_or_insert_with(|| OutputFormatter::create_progress_bar(p.total as u64));
            if let Some(name) = p.outcome.path().file_name() {
                bar.set_message(name.to_string_lossy().into_owned());
            }
            bar.inc(1);
        })
        .map_err(|e| e.to_string())?;
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    if as_json {
        println!("{}", to_pretty(&report_json(&report))?);
    } else {
        OutputFormatter::sweep_report(&report);
    }
    Ok(())
}

fn preview(organizer: &Organizer, dir: &Path, strategy: Strategy, as_json: bool) -> Result<(), String> {
    let entries = organizer.preview(dir, strategy).map_err(|e| e.to_string())?;

    if as_json {
        println!("{}", to_pretty(&preview_json(&entries))?);
    } else {
        OutputFormatter::header(&format!("Preview of {} ({})", dir.display(), strategy));
        OutputFormatter::preview_table(&entries);
        OutputFormatter::info("Nothing was moved.");
    }
    Ok(())
}

fn watch(
    organizer: Organizer,
    dir: &Path,
    strategy: Strategy,
    initial_sweep: bool,
    as_json: bool,
) -> Result<(), String> {
    let mut session = Session::new(organizer, strategy);
    let outcomes = session
        .subscribe()
        .ok_or_else(|| "Outcome stream already taken".to_string())?;
    session.set_watched_root(dir).map_err(|e| e.to_string())?;
    let root = session.watched_root().unwrap_or_else(|| dir.to_path_buf());

    if initial_sweep {
        let report = session.run_full_sweep().map_err(|e| e.to_string())?;
        if as_json {
            println!("{}", json_line(&report_json(&report))?);
        } else {
            OutputFormatter::sweep_report(&report);
        }
    }

    if !as_json {
        OutputFormatter::info(&format!(
            "Watching {} ({}). Press Ctrl-C to stop.",
            root.display(),
            strategy
        ));
    }

    for outcome in outcomes {
        if as_json {
            println!("{}", json_line(&outcome_json(&outcome))?);
        } else {
            OutputFormatter::outcome(&root, &outcome);
        }
    }
    Ok(())
}

fn outcome_json(outcome: &FileOutcome) -> Value {
    match outcome {
        FileOutcome::Moved {
            source,
            destination,
            folder,
        } => json!({
            "status": "moved",
            "path": source.to_string_lossy(),
            "destination": destination.to_string_lossy(),
            "folder": folder,
        }),
        FileOutcome::Ignored { path, reason } => json!({
            "status": "ignored",
            "path": path.to_string_lossy(),
            "reason": reason,
        }),
        FileOutcome::Failed { path, error } => json!({
            "status": "failed",
            "path": path.to_string_lossy(),
            "error": error.to_string(),
        }),
    }
}

fn report_json(report: &SweepReport) -> Value {
    json!({
        "root": report.root.to_string_lossy(),
        "strategy": report.strategy,
        "moved": report.moved(),
        "ignored": report.ignored(),
        "failed": report.failed(),
        "folders": report.folder_counts(),
        "files": report.outcomes.iter().map(outcome_json).collect::<Vec<_>>(),
    })
}

fn preview_json(entries: &[PreviewEntry]) -> Value {
    json!(entries)
}

fn to_pretty(value: &Value) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {}", e))
}

fn json_line(value: &Value) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("JSON serialization failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mover::MoveError;
    use crate::organizer::IgnoreReason;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_strategy_and_command() {
        let cli = Cli::parse_from(["autosort", "--strategy", "date", "sweep", "/tmp/dl"]);
        assert_eq!(cli.strategy, Some(Strategy::ByCreationDate));
        assert!(matches!(cli.command, OrganizeCommand::Sweep { ref dir } if dir == Path::new("/tmp/dl")));

        let cli = Cli::parse_from(["autosort", "watch", "/tmp/dl", "--no-initial-sweep", "--json"]);
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            OrganizeCommand::Watch {
                no_initial_sweep: true,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_strategy() {
        assert!(Cli::try_parse_from(["autosort", "-s", "by-size", "sweep", "."]).is_err());
    }

    #[test]
    fn test_outcome_json() {
        let moved = outcome_json(&FileOutcome::Moved {
            source: PathBuf::from("/d/a.pdf"),
            destination: PathBuf::from("/d/Documents/a.pdf"),
            folder: "Documents".to_string(),
        });
        assert_eq!(moved["status"], "moved");
        assert_eq!(moved["folder"], "Documents");

        let ignored = outcome_json(&FileOutcome::Ignored {
            path: PathBuf::from("/d/a.crdownload"),
            reason: IgnoreReason::InProgressDownload,
        });
        assert_eq!(ignored["reason"], "in-progress-download");

        let failed = outcome_json(&FileOutcome::Failed {
            path: PathBuf::from("/d/gone.txt"),
            error: MoveError::SourceMissing {
                path: PathBuf::from("/d/gone.txt"),
            },
        });
        assert_eq!(failed["status"], "failed");
        assert_eq!(failed["error"], "/d/gone.txt no longer exists");
    }

    #[test]
    fn test_preview_json() {
        let value = preview_json(&[PreviewEntry {
            file_name: "song.mp3".to_string(),
            target_folder: "Audio".to_string(),
        }]);
        assert_eq!(value[0]["file_name"], "song.mp3");
        assert_eq!(value[0]["target_folder"], "Audio");
    }
}
