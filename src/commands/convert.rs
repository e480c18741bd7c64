use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use crate::collection::{self, ListGroup};
use crate::config::ConvertOptions;
use crate::error::{ConvertError, Diagnostics, Result};
use crate::model::{Export, Task};
use crate::normalize::Normalizer;
use crate::output::{self, Bucket, FileReport, Format, Report};
use crate::sink::{Counted, CsvSink, RecordSink, Tally};

pub fn run(options: &ConvertOptions, format: Format) -> Result<()> {
    let (export, diagnostics) = load(&options.source)?;
    let report = convert(export, diagnostics, options)?;
    output::print_report(&report, format)
}

/// Read and parse the export. Missing file and invalid JSON are the only fatal cases.
pub fn load(path: &Path) -> Result<(Export, Diagnostics)> {
    let raw = fs::read_to_string(path).map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Export::from_json(&raw).map_err(|source| ConvertError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Order and dedupe the tasks, then write one file per list of active tasks and a
/// single file of completed tasks.
pub fn convert(
    mut export: Export,
    mut diagnostics: Diagnostics,
    options: &ConvertOptions,
) -> Result<Report> {
    let mut tasks = std::mem::take(&mut export.tasks);
    collection::sort_tasks(&mut tasks);
    let mut tasks = collection::deduplicate(tasks);
    if options.indent_repeats {
        collection::indent_repeats(&mut tasks);
    }
    let (active, completed) = collection::split_by_status(tasks);
    tracing::debug!(
        active = active.len(),
        completed = completed.len(),
        "tasks after deduplication"
    );

    let normalizer = Normalizer::new(&export, options.line_break);
    let mut report = Report::new(&options.source, options.dry_run);

    let (groups, orphans) = collection::group_by_list(&active, &export.lists);
    if !orphans.is_empty() {
        tracing::warn!(
            count = orphans.len(),
            "active tasks reference no known list and will not be written"
        );
    }
    report.orphaned = orphans.len();

    let mut claimed: HashSet<PathBuf> = HashSet::new();
    for ListGroup { list, label, tasks } in &groups {
        let path = options.list_path(label);
        if !claimed.insert(path.clone()) {
            tracing::warn!(
                path = %path.display(),
                "two lists share this file name; the later list overwrites it"
            );
        }
        let list_name = list.name.clone().unwrap_or_default();
        tracing::info!(
            list = %list_name,
            path = %path.display(),
            tasks = tasks.len(),
            "writing active tasks"
        );
        let tally = emit(&path, tasks, &normalizer, &mut diagnostics, options.dry_run)?;
        report.files.push(file_report(&path, Bucket::Active, Some(list_name), tally));
    }

    let done: Vec<&Task> = completed.iter().collect();
    let path = &options.completed_path;
    tracing::info!(path = %path.display(), tasks = done.len(), "writing completed tasks");
    let tally = emit(path, &done, &normalizer, &mut diagnostics, options.dry_run)?;
    report.files.push(file_report(path, Bucket::Completed, None, tally));

    report.skipped = diagnostics.skipped();
    report.issues = diagnostics.issues().iter().map(ToString::to_string).collect();
    Ok(report)
}

fn emit(
    path: &Path,
    tasks: &[&Task],
    normalizer: &Normalizer<'_>,
    diagnostics: &mut Diagnostics,
    dry_run: bool,
) -> Result<Tally> {
    let write_error = |source| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    };
    if dry_run {
        let mut tally = Tally::default();
        write_tasks(&mut tally, tasks, normalizer, diagnostics).map_err(write_error)?;
        return Ok(tally);
    }
    let file = File::create(path).map_err(write_error)?;
    let mut sink = Counted::new(CsvSink::new(BufWriter::new(file)));
    write_tasks(&mut sink, tasks, normalizer, diagnostics).map_err(write_error)?;
    Ok(sink.tally)
}

fn write_tasks<S: RecordSink>(
    sink: &mut S,
    tasks: &[&Task],
    normalizer: &Normalizer<'_>,
    diagnostics: &mut Diagnostics,
) -> io::Result<()> {
    sink.write_header()?;
    for task in tasks {
        for record in normalizer.normalize(task, diagnostics).into_records() {
            sink.write_record(&record)?;
        }
    }
    sink.finish()
}

fn file_report(path: &Path, bucket: Bucket, list: Option<String>, tally: Tally) -> FileReport {
    FileReport {
        path: path.display().to_string(),
        bucket,
        list,
        tasks: tally.tasks,
        notes: tally.notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const EXPORT: &str = r#"{
        "tasks": [
            {"name": "Buy milk", "series_id": "1", "list_id": "10", "date_created": 1629892800000},
            {"name": "Buy milk", "series_id": "1", "list_id": "10", "date_due": 1},
            {"name": "Fix bike", "series_id": "2", "list_id": "10"},
            {"name": "Filed taxes", "series_id": "3", "list_id": "10", "date_completed": 1629892800000},
            {"name": "Lost", "list_id": "99"},
            {"name": ["bad"]}
        ],
        "lists": [
            {"id": "10", "name": "Home 🏠"},
            {"id": "11", "name": "Empty"}
        ]
    }"#;

    fn options(dir: &Path) -> ConvertOptions {
        ConvertOptions {
            incomplete_base: dir.join("out.csv").display().to_string(),
            completed_path: dir.join("completed.csv"),
            ..ConvertOptions::new(dir.join("rtm.json"))
        }
    }

    #[test]
    fn writes_list_and_completed_files() {
        let dir = tempdir().unwrap();
        let opts = options(dir.path());
        let (export, diags) = Export::from_json(EXPORT).unwrap();

        let report = convert(export, diags, &opts).unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.orphaned, 1);

        let active = fs::read_to_string(dir.path().join("out.csv_Home.csv")).unwrap();
        let rows: Vec<&str> = active.lines().collect();
        assert!(rows[0].starts_with("TYPE,CONTENT"));
        let task_rows: Vec<&&str> = rows.iter().filter(|r| r.starts_with("task,")).collect();
        assert_eq!(task_rows.len(), 2);
        assert!(!dir.path().join("out.csv_Empty.csv").exists());

        let completed = fs::read_to_string(dir.path().join("completed.csv")).unwrap();
        assert_eq!(completed.lines().count(), 2);
        assert!(completed.contains("task,Filed taxes @Home,"));
    }

    #[test]
    fn dry_run_counts_without_writing() {
        let dir = tempdir().unwrap();
        let opts = ConvertOptions {
            dry_run: true,
            ..options(dir.path())
        };
        let (export, diags) = Export::from_json(EXPORT).unwrap();

        let report = convert(export, diags, &opts).unwrap();

        assert!(report.dry_run);
        assert_eq!(report.files[0].tasks, 2);
        assert_eq!(report.files[1].tasks, 1);
        assert!(!dir.path().join("completed.csv").exists());
    }

    #[test]
    fn load_reports_missing_and_invalid_input() {
        let dir = tempdir().unwrap();
        let missing = load(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(missing.code(), "read_error");

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ tasks: ").unwrap();
        assert_eq!(load(&bad).unwrap_err().code(), "parse_error");
    }

    #[test]
    fn unwritable_output_is_fatal() {
        let dir = tempdir().unwrap();
        let opts = ConvertOptions {
            completed_path: dir.path().join("missing-dir").join("completed.csv"),
            ..options(dir.path())
        };
        let (export, diags) = Export::from_json(EXPORT).unwrap();
        let err = convert(export, diags, &opts).unwrap_err();
        assert_eq!(err.code(), "write_error");
    }
}
