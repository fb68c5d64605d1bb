//! Client error types.

use std::path::PathBuf;

use calexport_core::DateParseError;
use calexport_providers::ProviderError;
use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Every way an export run can fail. All of them end the run.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A date argument was malformed or the range is inverted.
    #[error(transparent)]
    Date(#[from] DateParseError),

    /// Authentication or calendar API failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The calendar id file is missing or has no usable lines.
    #[error("Calendar Ids file not found or is empty: {}", .0.display())]
    CalendarIdsMissing(PathBuf),

    /// The report for this date range was already written.
    #[error("File already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// An input file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the report failed; the partial file is left on disk.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ExportError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_file() {
        let err = ExportError::CalendarIdsMissing(PathBuf::from("calendar-ids.txt"));
        assert_eq!(
            err.to_string(),
            "Calendar Ids file not found or is empty: calendar-ids.txt"
        );

        let err = ExportError::OutputExists(PathBuf::from("2024-03-01_2024-03-31.csv"));
        assert_eq!(
            err.to_string(),
            "File already exists: 2024-03-01_2024-03-31.csv"
        );
    }

    #[test]
    fn provider_errors_pass_through() {
        let err: ExportError = ProviderError::authentication("token expired")
            .with_provider("google")
            .into();
        assert_eq!(err.to_string(), "[google] authentication_failed: token expired");
    }
}
