use std::path::PathBuf;

/// Header row of the Todoist CSV import template.
pub const CSV_HEADER: [&str; 12] = [
    "TYPE",
    "CONTENT",
    "DESCRIPTION",
    "PRIORITY",
    "INDENT",
    "AUTHOR",
    "RESPONSIBLE",
    "DATE",
    "DATE_LANG",
    "TIMEZONE",
    "DURATION",
    "DURATION_UNIT",
];

pub const ROW_TASK: &str = "task";
pub const ROW_NOTE: &str = "note";

/// Written to DATE_LANG whenever DATE is filled.
pub const DATE_LANG: &str = "en";

pub const DURATION_UNIT: &str = "minute";

/// Terminates every CSV record.
pub const RECORD_TERMINATOR: &str = "\r\n";

pub const DEFAULT_INCOMPLETE: &str = "out.csv";
pub const DEFAULT_COMPLETED: &str = "completed.csv";

/// How a line break inside a cell (note bodies, metadata) is written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LineBreak {
    /// A real newline; the cell gets quoted.
    #[default]
    Literal,
    /// The two characters `\n`, for importers that mangle multi-line cells.
    Escaped,
}

impl LineBreak {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Literal => "\n",
            Self::Escaped => "\\n",
        }
    }
}

/// Resolved options for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub source: PathBuf,
    /// Base path; each list's active tasks go to `{base}_{label}.csv`.
    pub incomplete_base: String,
    pub completed_path: PathBuf,
    pub line_break: LineBreak,
    pub indent_repeats: bool,
    pub dry_run: bool,
}

impl ConvertOptions {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            incomplete_base: DEFAULT_INCOMPLETE.to_string(),
            completed_path: PathBuf::from(DEFAULT_COMPLETED),
            line_break: LineBreak::default(),
            indent_repeats: false,
            dry_run: false,
        }
    }

    pub fn list_path(&self, label: &str) -> PathBuf {
        PathBuf::from(format!("{}_{}.csv", self.incomplete_base, label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_path_appends_label_to_base() {
        let opts = ConvertOptions::new("rtm.json");
        assert_eq!(opts.list_path("Work"), PathBuf::from("out.csv_Work.csv"));
    }

    #[test]
    fn header_has_twelve_columns() {
        assert_eq!(CSV_HEADER.len(), 12);
        assert_eq!(
            CSV_HEADER.join(","),
            "TYPE,CONTENT,DESCRIPTION,PRIORITY,INDENT,AUTHOR,RESPONSIBLE,\
             DATE,DATE_LANG,TIMEZONE,DURATION,DURATION_UNIT"
        );
    }
}
