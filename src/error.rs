use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("cannot read export {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("export {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "read_error",
            Self::Parse { .. } => "parse_error",
            Self::Write { .. } => "write_error",
            Self::Json(_) => "json_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Which reference collection an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Tasks,
    Notes,
    Locations,
    Lists,
    Tags,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tasks => write!(f, "tasks"),
            Self::Notes => write!(f, "notes"),
            Self::Locations => write!(f, "locations"),
            Self::Lists => write!(f, "lists"),
            Self::Tags => write!(f, "tags"),
        }
    }
}

/// A recoverable problem with one entry of the export. Never aborts the run.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskIssue {
    /// The entry could not be read; it is dropped.
    MalformedEntry {
        collection: Collection,
        message: String,
        payload: Value,
    },
    /// The task's recurrence rule could not be parsed; the task keeps its due date only.
    BadRecurrence { task: String, rule: String },
    /// A reference matched by id has no usable name; treated as no match.
    UnnamedReference {
        task: String,
        collection: Collection,
        id: String,
    },
}

impl TaskIssue {
    /// Whether the issue caused an entry to be dropped from the output.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::MalformedEntry { .. })
    }

    /// Emit the issue at warn level with its context.
    pub fn log(&self) {
        match self {
            Self::MalformedEntry {
                collection,
                message,
                payload,
            } => {
                tracing::warn!(%collection, error = %message, %payload, "skipping malformed entry")
            }
            Self::BadRecurrence { task, rule } => {
                tracing::warn!(task = %task, rule = %rule, "ignoring unparseable recurrence rule")
            }
            Self::UnnamedReference {
                task,
                collection,
                id,
            } => tracing::warn!(task = %task, %collection, id = %id, "reference has no name"),
        }
    }
}

impl std::fmt::Display for TaskIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedEntry {
                collection,
                message,
                ..
            } => write!(f, "malformed entry in {collection}: {message}"),
            Self::BadRecurrence { task, rule } => {
                write!(f, "task '{task}': unparseable recurrence rule '{rule}'")
            }
            Self::UnnamedReference {
                task,
                collection,
                id,
            } => write!(f, "task '{task}': {collection} entry {id} has no name"),
        }
    }
}

/// Issues gathered over one run, in the order they were found.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Diagnostics {
    issues: Vec<TaskIssue>,
}

impl Diagnostics {
    pub fn push(&mut self, issue: TaskIssue) {
        issue.log();
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[TaskIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.issues.iter().filter(|i| i.is_skip()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn codes_are_stable() {
        let err = ConvertError::Read {
            path: "rtm.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.code(), "read_error");
        assert!(err.to_string().contains("rtm.json"));
    }

    #[test]
    fn skipped_counts_only_dropped_entries() {
        let mut diags = Diagnostics::default();
        diags.push(TaskIssue::MalformedEntry {
            collection: Collection::Tasks,
            message: "invalid type".into(),
            payload: json!({"name": 3}),
        });
        diags.push(TaskIssue::BadRecurrence {
            task: "water plants".into(),
            rule: "FREQ".into(),
        });
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.skipped(), 1);
    }
}
