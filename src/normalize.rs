use crate::config::{DATE_LANG, LineBreak, ROW_NOTE, ROW_TASK};
use crate::error::{Collection, Diagnostics, TaskIssue};
use crate::fields::{self, Duration};
use crate::lookup::{self, Lookup};
use crate::model::{Export, Note, Task};
use crate::recurrence;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub content: String,
    pub description: String,
    pub priority: Option<u8>,
    pub indent: i64,
    pub date: Option<String>,
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Task(TaskRow),
    Note(NoteRow),
}

impl Record {
    /// Cells in `CSV_HEADER` column order.
    pub fn cells(&self) -> [String; 12] {
        match self {
            Self::Task(row) => {
                let (duration, unit) = match row.duration {
                    Some(d) => (d.minutes.to_string(), d.unit.to_string()),
                    None => (String::new(), String::new()),
                };
                [
                    ROW_TASK.to_string(),
                    row.content.clone(),
                    row.description.clone(),
                    row.priority.map(|p| p.to_string()).unwrap_or_default(),
                    row.indent.to_string(),
                    String::new(),
                    String::new(),
                    row.date.clone().unwrap_or_default(),
                    row.date
                        .as_ref()
                        .map(|_| DATE_LANG.to_string())
                        .unwrap_or_default(),
                    String::new(),
                    duration,
                    unit,
                ]
            }
            Self::Note(row) => {
                let mut cells: [String; 12] = Default::default();
                cells[0] = ROW_NOTE.to_string();
                cells[1] = row.content.clone();
                cells
            }
        }
    }
}

/// The rows produced for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub task: TaskRow,
    pub note: Option<NoteRow>,
}

impl Normalized {
    pub fn into_records(self) -> impl Iterator<Item = Record> {
        std::iter::once(Record::Task(self.task)).chain(self.note.map(Record::Note))
    }
}

pub struct Normalizer<'a> {
    export: &'a Export,
    line_break: LineBreak,
}

impl<'a> Normalizer<'a> {
    pub fn new(export: &'a Export, line_break: LineBreak) -> Self {
        Self { export, line_break }
    }

    pub fn normalize(&self, task: &Task, diagnostics: &mut Diagnostics) -> Normalized {
        let name = task.display_name();

        let location = self.named(
            lookup::resolve_location(task, &self.export.locations),
            name,
            Collection::Locations,
            diagnostics,
        );
        let list = self.named(
            lookup::resolve_list(task, &self.export.lists),
            name,
            Collection::Lists,
            diagnostics,
        );
        let mut tags = Vec::new();
        for tag in lookup::resolve_tags(task, &self.export.tags) {
            match tag.name.as_deref() {
                Some(tag_name) => tags.push(tag_name),
                None => diagnostics.push(TaskIssue::UnnamedReference {
                    task: name.to_string(),
                    collection: Collection::Tags,
                    id: tag.tag_id.clone().unwrap_or_default(),
                }),
            }
        }

        let (date, recurrence) = due_and_recurrence(task, diagnostics);

        let content = annotate(name, location, list, recurrence.as_deref(), &tags);
        let notes = notes_for(task, &self.export.notes);
        let description = self.description(task.url.as_deref(), &notes);

        let row = TaskRow {
            content,
            description,
            priority: fields::priority_rank(task.priority.as_deref()),
            indent: task.indent(),
            date,
            duration: fields::duration_minutes(task.estimate.as_deref()),
        };

        let metadata = self.metadata(task);
        Normalized {
            task: row,
            note: (!metadata.is_empty()).then_some(NoteRow { content: metadata }),
        }
    }

    fn named<'b>(
        &self,
        found: Lookup<'b>,
        task: &str,
        collection: Collection,
        diagnostics: &mut Diagnostics,
    ) -> Option<&'b str> {
        if let Lookup::Unnamed(id) = found {
            diagnostics.push(TaskIssue::UnnamedReference {
                task: task.to_string(),
                collection,
                id: id.to_string(),
            });
        }
        found.name()
    }

    /// URL line, then every note body, with bare links turned into markdown.
    fn description(&self, url: Option<&str>, notes: &[&Note]) -> String {
        let mut text = String::new();
        if let Some(url) = url {
            text.push_str(url);
            text.push('\n');
        }
        let bodies: Vec<String> = notes
            .iter()
            .map(|note| unify_line_breaks(note.content.as_deref().unwrap_or_default()))
            .collect();
        text.push_str(&bodies.join("\n"));
        self.break_lines(&fields::linkify(&text))
    }

    fn metadata(&self, task: &Task) -> String {
        let stamps = [("created", task.date_created), ("modified", task.date_modified)];
        let lines: Vec<String> = stamps
            .into_iter()
            .filter_map(|(label, millis)| {
                let date = fields::epoch_millis_to_date(millis?);
                (!date.is_empty()).then(|| format!("{label}: {date}"))
            })
            .collect();
        lines.join(self.line_break.as_str())
    }

    fn break_lines(&self, text: &str) -> String {
        match self.line_break {
            LineBreak::Literal => text.to_string(),
            LineBreak::Escaped => text.replace('\n', LineBreak::Escaped.as_str()),
        }
    }
}

fn unify_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Due date for the DATE column, plus the recurrence phrase when the task repeats.
/// Recurrence is only considered for tasks with a due stamp.
fn due_and_recurrence(
    task: &Task,
    diagnostics: &mut Diagnostics,
) -> (Option<String>, Option<String>) {
    let Some(millis) = task.due() else {
        return (None, None);
    };
    let date = Some(fields::epoch_millis_to_date(millis)).filter(|d| !d.is_empty());
    let Some(rule) = task.repeat.as_deref() else {
        return (date, None);
    };
    match recurrence::translate(rule, date.as_deref()) {
        Ok(phrase) => (date, phrase),
        Err(_) => {
            diagnostics.push(TaskIssue::BadRecurrence {
                task: task.display_name().to_string(),
                rule: rule.to_string(),
            });
            (date, None)
        }
    }
}

/// Notes sharing the task's series, in export order. A task without a series has none.
fn notes_for<'a>(task: &Task, notes: &'a [Note]) -> Vec<&'a Note> {
    let Some(series) = task.series_id.as_deref() else {
        return Vec::new();
    };
    notes
        .iter()
        .filter(|note| note.series_id.as_deref() == Some(series))
        .collect()
}

/// `name @location @list recurrence #tag ...`, skipping whatever is absent.
fn annotate(
    name: &str,
    location: Option<&str>,
    list: Option<&str>,
    recurrence: Option<&str>,
    tags: &[&str],
) -> String {
    let mut parts = vec![name.to_string()];
    parts.extend(location.map(|l| format!("@{}", fields::sanitize_label(l))));
    parts.extend(list.map(|l| format!("@{}", fields::sanitize_label(l))));
    parts.extend(recurrence.map(str::to_string));
    parts.extend(tags.iter().map(|t| format!("#{}", fields::sanitize_label(t))));
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
