use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Collection, Diagnostics, TaskIssue};

/// One task instance from the export. Recurring tasks appear once per occurrence,
/// linked by `series_id`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Task {
    #[serde(default, deserialize_with = "non_empty_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub series_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub list_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub location_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_ids")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "non_empty_text")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub date_due: Option<i64>,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub date_created: Option<i64>,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub date_modified: Option<i64>,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub date_completed: Option<i64>,
    /// Carried for completeness; the target DATE column is date-only.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub date_due_has_time: bool,
    #[serde(default, deserialize_with = "non_empty_text")]
    pub repeat: Option<String>,
    #[serde(default, deserialize_with = "lenient_indent")]
    pub indent: Option<i64>,
    #[serde(default, deserialize_with = "non_empty_text")]
    pub estimate: Option<String>,
    #[serde(default, deserialize_with = "non_empty_text")]
    pub url: Option<String>,
}

impl Task {
    pub const UNTITLED: &'static str = "untitled";
    pub const DEFAULT_INDENT: i64 = 1;

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(Self::UNTITLED)
    }

    /// A zero completion stamp counts as "not completed".
    pub fn is_completed(&self) -> bool {
        self.date_completed.is_some_and(|ms| ms != 0)
    }

    pub fn due(&self) -> Option<i64> {
        self.date_due.filter(|ms| *ms != 0)
    }

    pub fn indent(&self) -> i64 {
        self.indent.unwrap_or(Self::DEFAULT_INDENT)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Note {
    #[serde(default, deserialize_with = "lenient_id")]
    pub series_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct List {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Tag {
    #[serde(default, deserialize_with = "lenient_id")]
    pub tag_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Top-level keys we read; everything else in the export is ignored.
#[derive(Debug, Default, Deserialize)]
struct RawExport {
    #[serde(default)]
    tasks: Vec<Value>,
    #[serde(default)]
    notes: Vec<Value>,
    #[serde(default)]
    locations: Vec<Value>,
    #[serde(default)]
    lists: Vec<Value>,
    #[serde(default)]
    tags: Vec<Value>,
}

/// The parsed export. Entries that failed to parse were dropped and reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Export {
    pub tasks: Vec<Task>,
    pub notes: Vec<Note>,
    pub locations: Vec<Location>,
    pub lists: Vec<List>,
    pub tags: Vec<Tag>,
}

impl Export {
    /// Parse the document. Only a document that is not a JSON object with array
    /// collections is an error; malformed entries land in the returned diagnostics.
    pub fn from_json(raw: &str) -> serde_json::Result<(Self, Diagnostics)> {
        let raw: RawExport = serde_json::from_str(raw)?;
        let mut diagnostics = Diagnostics::default();
        let export = Self {
            tasks: entries(raw.tasks, Collection::Tasks, &mut diagnostics),
            notes: entries(raw.notes, Collection::Notes, &mut diagnostics),
            locations: entries(raw.locations, Collection::Locations, &mut diagnostics),
            lists: entries(raw.lists, Collection::Lists, &mut diagnostics),
            tags: entries(raw.tags, Collection::Tags, &mut diagnostics),
        };
        Ok((export, diagnostics))
    }
}

fn entries<T: DeserializeOwned>(
    values: Vec<Value>,
    collection: Collection,
    diagnostics: &mut Diagnostics,
) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match T::deserialize(&value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                diagnostics.push(TaskIssue::MalformedEntry {
                    collection,
                    message: e.to_string(),
                    payload: value,
                });
                None
            }
        })
        .collect()
}

/// Ids show up both as strings and as bare numbers; empty strings mean "unset".
fn id_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.and_then(id_from_value))
}

fn lenient_ids<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => items.into_iter().filter_map(id_from_value).collect(),
        _ => Vec::new(),
    })
}

fn lenient_millis<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_indent<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.and_then(|v| v.as_i64()))
}

fn lenient_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .and_then(|v| v.as_bool())
        .unwrap_or(false))
}

/// Strict about type (a numeric task name is a malformed task), lenient about emptiness.
fn non_empty_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(d)?.filter(|s| !s.is_empty()))
}
