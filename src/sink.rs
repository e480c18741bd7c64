use std::io::{self, Write};

use crate::config::{CSV_HEADER, RECORD_TERMINATOR};
use crate::normalize::Record;

pub trait RecordSink {
    fn write_header(&mut self) -> io::Result<()>;
    fn write_record(&mut self, record: &Record) -> io::Result<()>;
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Comma-separated, minimally quoted, CRLF-terminated rows.
pub struct CsvSink<W: Write> {
    out: W,
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_row<S: AsRef<str>>(&mut self, cells: &[S]) -> io::Result<()> {
        let line = cells
            .iter()
            .map(|c| escape(c.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(RECORD_TERMINATOR.as_bytes())
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write_header(&mut self) -> io::Result<()> {
        self.write_row(&CSV_HEADER)
    }

    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        self.write_row(&record.cells())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

fn escape(cell: &str) -> std::borrow::Cow<'_, str> {
    if cell.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\"")).into()
    } else {
        cell.into()
    }
}

/// Counts rows instead of writing them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub tasks: usize,
    pub notes: usize,
}

impl RecordSink for Tally {
    fn write_header(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        match record {
            Record::Task(_) => self.tasks += 1,
            Record::Note(_) => self.notes += 1,
        }
        Ok(())
    }
}

/// Passes rows on to another sink, counting them on the way.
pub struct Counted<S> {
    pub inner: S,
    pub tally: Tally,
}

impl<S: RecordSink> Counted<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            tally: Tally::default(),
        }
    }
}

impl<S: RecordSink> RecordSink for Counted<S> {
    fn write_header(&mut self) -> io::Result<()> {
        self.inner.write_header()
    }

    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        self.tally.write_record(record)?;
        self.inner.write_record(record)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.inner.finish()
    }
}
