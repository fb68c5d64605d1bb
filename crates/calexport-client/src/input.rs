//! Loading the calendar id and exclusion keyword files.

use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::error::{ExportError, ExportResult};

/// Reads the lines of a text file in order.
///
/// A missing file, an empty file and a directory all yield no lines. Other
/// read failures are returned.
pub fn read_lines(path: &Path) -> ExportResult<Vec<String>> {
    if path.is_dir() {
        debug!(path = %path.display(), "input path is a directory, treating as empty");
        return Ok(Vec::new());
    }

    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content.lines().map(str::to_string).collect()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "input file not found, treating as empty");
            Ok(Vec::new())
        }
        Err(e) => Err(ExportError::read(path, e)),
    }
}

/// Loads calendar ids: trimmed, blank lines skipped, order kept.
///
/// Fails when nothing is left, since there would be nothing to export.
pub fn load_calendar_ids(path: &Path) -> ExportResult<Vec<String>> {
    let ids: Vec<String> = read_lines(path)?
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    if ids.is_empty() {
        return Err(ExportError::CalendarIdsMissing(path.to_path_buf()));
    }
    debug!(count = ids.len(), "loaded calendar ids");
    Ok(ids)
}

/// Loads exclusion keywords verbatim; a missing or empty file means none.
pub fn load_exclusions(path: &Path) -> ExportResult<Vec<String>> {
    let keywords = read_lines(path)?;
    debug!(count = keywords.len(), "loaded exclusion keywords");
    Ok(keywords)
}
