//! CSV report writer.
//!
//! The report is plain comma-joined text: fields are written as-is, without
//! quoting or escaping. A summary containing a comma therefore shifts the
//! columns of its row.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::Path;

use calexport_core::CalendarEvent;
use tracing::debug;

use crate::error::{ExportError, ExportResult};

/// Header line of every report.
pub const HEADER: &str = "Id,Event,DateTime";

/// Streams report rows into any writer.
#[derive(Debug)]
pub struct CsvWriter<W: Write> {
    inner: W,
    rows: usize,
}

impl<W: Write> CsvWriter<W> {
    /// Wraps `inner` and writes the header line.
    pub fn new(mut inner: W) -> io::Result<Self> {
        writeln!(inner, "{HEADER}")?;
        Ok(Self { inner, rows: 0 })
    }

    /// Writes `calendarId,summary,start` for one event.
    pub fn write_event(&mut self, event: &CalendarEvent) -> io::Result<()> {
        writeln!(
            self.inner,
            "{},{},{}",
            event.calendar_id,
            event.summary_or_empty(),
            event.start
        )?;
        self.rows += 1;
        Ok(())
    }

    /// Number of event rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Creates the report file, refusing to overwrite an existing one.
pub fn create_report(path: &Path) -> ExportResult<CsvWriter<BufWriter<File>>> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ExportError::OutputExists(path.to_path_buf()),
            _ => ExportError::write(path, e),
        })?;

    debug!(path = %path.display(), "created report");
    CsvWriter::new(BufWriter::new(file)).map_err(|e| ExportError::write(path, e))
}
