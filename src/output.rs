use std::path::Path;

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
    Minimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Active,
    Completed,
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Active => "active",
            Self::Completed => "completed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: String,
    pub bucket: Bucket,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    pub tasks: usize,
    pub notes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub dry_run: bool,
    pub source: String,
    pub files: Vec<FileReport>,
    pub skipped: usize,
    pub orphaned: usize,
    pub issues: Vec<String>,
}

impl Report {
    pub fn new(source: &Path, dry_run: bool) -> Self {
        Self {
            dry_run,
            source: source.display().to_string(),
            files: Vec::new(),
            skipped: 0,
            orphaned: 0,
            issues: Vec::new(),
        }
    }

    pub fn task_count(&self) -> usize {
        self.files.iter().map(|f| f.tasks).sum()
    }
}

/// Fits a path into `width` columns by dropping its head, so the file name stays
/// readable.
pub fn shorten_path(path: &str, width: usize) -> String {
    let len = path.chars().count();
    if len <= width {
        return path.to_string();
    }
    let tail: String = path.chars().skip(len - width.saturating_sub(3)).collect();
    format!("...{tail}")
}

pub fn print_report(report: &Report, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(report)?),
        Format::Pretty => {
            let verb = if report.dry_run { "Would write" } else { "Wrote" };
            println!(
                "{}",
                format!(
                    "{} {} tasks from {} into {} files",
                    verb,
                    report.task_count(),
                    report.source,
                    report.files.len()
                )
                .bold()
            );
            for file in &report.files {
                let list = file
                    .list
                    .as_deref()
                    .map(|name| format!(" ({})", name))
                    .unwrap_or_default();
                println!(
                    "  {:9} {}{}: {} tasks, {} notes",
                    file.bucket, file.path, list, file.tasks, file.notes
                );
            }
            for issue in &report.issues {
                println!("  {}", issue.yellow());
            }
            if report.orphaned > 0 {
                let warning = format!(
                    "{} active tasks belong to no list and were not written",
                    report.orphaned
                );
                println!("  {}", warning.yellow());
            }
        }
        Format::Minimal => {
            println!("{:>5} {:>5} {:9} PATH", "TASKS", "NOTES", "BUCKET");
            println!("{}", "-".repeat(50));
            for file in &report.files {
                println!(
                    "{:>5} {:>5} {:9} {}",
                    file.tasks,
                    file.notes,
                    file.bucket,
                    shorten_path(&file.path, 40)
                );
            }
        }
    }
    Ok(())
}
