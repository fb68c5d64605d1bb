//! The export pipeline: fetch, filter and write each calendar in turn.

use std::io::Write;
use std::path::PathBuf;

use calexport_core::{DateRange, Verdict};
use calexport_providers::EventSource;
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::error::{ExportError, ExportResult};
use crate::input::{load_calendar_ids, load_exclusions};
use crate::report::create_report;

/// Per-calendar tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCount {
    pub calendar_id: String,
    /// Items the API listed, including events that started before the range.
    pub listed: usize,
    /// Events starting in the range.
    pub fetched: usize,
    /// Events that passed the filter and were written.
    pub exported: usize,
}

/// Outcome of a completed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub output_path: PathBuf,
    pub calendars: Vec<CalendarCount>,
}

impl ExportSummary {
    /// Total rows written to the report.
    pub fn rows(&self) -> usize {
        self.calendars.iter().map(|c| c.exported).sum()
    }
}

/// Runs one export.
///
/// Inputs are loaded before the report file is created, so a missing
/// calendar id file leaves no file behind. A fetch failure aborts the run
/// and leaves the partially written report on disk. Progress lines go to
/// `out`.
pub async fn run_export<S, O>(
    config: &ExportConfig,
    range: &DateRange,
    source: &S,
    out: &mut O,
) -> ExportResult<ExportSummary>
where
    S: EventSource + ?Sized,
    O: Write,
{
    let calendar_ids = load_calendar_ids(&config.calendar_ids_path)?;
    let exclusions = load_exclusions(&config.exclude_events_path)?;
    let filter = config.event_filter(&exclusions);

    let output_path = config.output_path(&range.report_file_name());
    let mut writer = create_report(&output_path)?;
    let mut calendars = Vec::with_capacity(calendar_ids.len());

    for calendar_id in calendar_ids {
        let result = source.fetch_events(&calendar_id, range).await?;
        let fetched = result.events.len();
        let mut exported = 0;

        for event in &result.events {
            match filter.check(event.summary_or_empty()) {
                Verdict::Accepted => {
                    writer
                        .write_event(event)
                        .map_err(|e| ExportError::write(&output_path, e))?;
                    exported += 1;
                }
                Verdict::Blocklisted(keyword) => {
                    debug!(calendar = %calendar_id, summary = event.summary_or_empty(), keyword, "blocklisted");
                }
                Verdict::Excluded(keyword) => {
                    debug!(calendar = %calendar_id, summary = event.summary_or_empty(), keyword, "excluded");
                }
            }
        }

        let line = if result.is_empty_listing() {
            "No upcoming events found.".to_string()
        } else {
            format!("{},{}", calendar_id, exported)
        };
        writeln!(out, "{line}").map_err(|e| ExportError::write("<stdout>", e))?;
        info!(calendar = %calendar_id, listed = result.listed, fetched, exported, "calendar done");

        calendars.push(CalendarCount {
            calendar_id,
            listed: result.listed,
            fetched,
            exported,
        });
    }

    writer
        .finish()
        .map_err(|e| ExportError::write(&output_path, e))?;
    writeln!(out, "\nOutputfile: {}", output_path.display())
        .map_err(|e| ExportError::write("<stdout>", e))?;

    Ok(ExportSummary {
        output_path,
        calendars,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;

    use calexport_core::{CalendarEvent, EventStart};
    use calexport_providers::{BoxFuture, FetchResult, ProviderError, ProviderResult};
    use chrono::{DateTime, Utc};

    /// In-memory event source keyed by calendar id.
    #[derive(Default)]
    struct FakeSource {
        events: HashMap<String, FetchResult>,
        failing: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with(mut self, calendar: &str, events: &[(&str, &str)]) -> Self {
            let events = events
                .iter()
                .map(|(summary, start)| {
                    let start = EventStart::from_datetime(DateTime::parse_from_rfc3339(start).unwrap());
                    CalendarEvent::new(calendar, start).with_summary(*summary)
                })
                .collect();
            self.events
                .insert(calendar.to_string(), FetchResult::with_events(events));
            self
        }

        /// Adds `count` listed items that started before the range.
        fn with_earlier(mut self, calendar: &str, count: usize) -> Self {
            let result = self.events.entry(calendar.to_string()).or_default();
            result.listed += count;
            self
        }

        fn failing_on(mut self, calendar: &str) -> Self {
            self.failing = Some(calendar.to_string());
            self
        }
    }

    impl EventSource for FakeSource {
        fn fetch_events<'a>(
            &'a self,
            calendar_id: &'a str,
            _range: &'a DateRange,
        ) -> BoxFuture<'a, ProviderResult<FetchResult>> {
            self.calls.lock().unwrap().push(calendar_id.to_string());
            let result = if self.failing.as_deref() == Some(calendar_id) {
                Err(ProviderError::authorization(format!(
                    "access denied to calendar {calendar_id}"
                )))
            } else {
                Ok(self.events.get(calendar_id).cloned().unwrap_or_default())
            };
            Box::pin(async move { result })
        }
    }

    fn setup(dir: &Path, ids: &str, exclusions: Option<&str>) -> ExportConfig {
        std::fs::write(dir.join("calendar-ids.txt"), ids).unwrap();
        if let Some(exclusions) = exclusions {
            std::fs::write(dir.join("exclude-events.txt"), exclusions).unwrap();
        }
        ExportConfig {
            calendar_ids_path: dir.join("calendar-ids.txt"),
            exclude_events_path: dir.join("exclude-events.txt"),
            output_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    fn range() -> DateRange {
        DateRange::parse_in("2024-03-01", "2024-03-31", &Utc).unwrap()
    }

    #[tokio::test]
    async fn exports_accepted_events_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path(), "team@example.com\nops@example.com\n", Some("hiring\n"));
        let source = FakeSource::default()
            .with(
                "team@example.com",
                &[
                    ("Design review", "2024-03-05T10:00:00-05:00"),
                    ("Weekly sync", "2024-03-05T11:00:00-05:00"),
                    ("Hiring committee", "2024-03-06T09:00:00-05:00"),
                    ("Customer demo", "2024-03-07T14:00:00Z"),
                ],
            )
            .with("ops@example.com", &[("Incident postmortem", "2024-03-08T16:00:00Z")]);

        let mut out = Vec::new();
        let summary = run_export(&config, &range(), &source, &mut out).await.unwrap();

        assert_eq!(summary.rows(), 3);
        assert_eq!(
            summary.calendars[0],
            CalendarCount {
                calendar_id: "team@example.com".to_string(),
                listed: 4,
                fetched: 4,
                exported: 2,
            }
        );

        let report = std::fs::read_to_string(&summary.output_path).unwrap();
        insta::assert_snapshot!(report, @r"
        Id,Event,DateTime
        team@example.com,Design review,2024-03-05T10:00:00.000-05:00
        team@example.com,Customer demo,2024-03-07T14:00:00.000Z
        ops@example.com,Incident postmortem,2024-03-08T16:00:00.000Z
        ");

        let stdout = String::from_utf8(out).unwrap();
        assert_eq!(
            stdout,
            format!(
                "team@example.com,2\nops@example.com,1\n\nOutputfile: {}\n",
                summary.output_path.display()
            )
        );
        assert_eq!(
            summary.output_path,
            dir.path().join("2024-03-01_2024-03-31.csv")
        );
    }

    #[tokio::test]
    async fn empty_calendar_reports_no_events() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path(), "quiet@example.com\n", None);
        let source = FakeSource::default();

        let mut out = Vec::new();
        let summary = run_export(&config, &range(), &source, &mut out).await.unwrap();

        assert_eq!(summary.rows(), 0);
        let stdout = String::from_utf8(out).unwrap();
        assert!(stdout.starts_with("No upcoming events found.\n"));
        assert_eq!(
            std::fs::read_to_string(&summary.output_path).unwrap(),
            "Id,Event,DateTime\n"
        );
    }

    #[tokio::test]
    async fn listing_with_only_earlier_starts_reports_zero_rows() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path(), "offsite@example.com
quiet@example.com
", None);
        let source = FakeSource::default().with_earlier("offsite@example.com", 1);

        let mut out = Vec::new();
        let summary = run_export(&config, &range(), &source, &mut out).await.unwrap();

        assert_eq!(summary.calendars[0].listed, 1);
        assert_eq!(summary.calendars[0].fetched, 0);
        let stdout = String::from_utf8(out).unwrap();
        assert!(
            stdout.starts_with("offsite@example.com,0\nNo upcoming events found.\n"),
            "{stdout}"
        );
    }

    #[tokio::test]
    async fn second_run_fails_on_existing_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path(), "primary\n", None);
        let source = FakeSource::default().with("primary", &[("Design review", "2024-03-05T10:00:00Z")]);

        let first = run_export(&config, &range(), &source, &mut Vec::new())
            .await
            .unwrap();
        let before = std::fs::read_to_string(&first.output_path).unwrap();

        let err = run_export(&config, &range(), &source, &mut Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::OutputExists(ref p) if *p == first.output_path));
        assert_eq!(std::fs::read_to_string(&first.output_path).unwrap(), before);
        assert_eq!(source.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_calendar_ids_leaves_no_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            calendar_ids_path: dir.path().join("calendar-ids.txt"),
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let err = run_export(&config, &range(), &FakeSource::default(), &mut Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::CalendarIdsMissing(_)));
        assert!(!dir.path().join("2024-03-01_2024-03-31.csv").exists());
    }

    #[tokio::test]
    async fn fetch_failure_keeps_partial_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path(), "team@example.com\nsecret@example.com\nlast@example.com\n", None);
        let source = FakeSource::default()
            .with("team@example.com", &[("Design review", "2024-03-05T10:00:00Z")])
            .with("last@example.com", &[("Retro", "2024-03-09T10:00:00Z")])
            .failing_on("secret@example.com");

        let err = run_export(&config, &range(), &source, &mut Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Provider(_)));
        assert_eq!(
            *source.calls.lock().unwrap(),
            ["team@example.com", "secret@example.com"]
        );

        let partial = dir.path().join("2024-03-01_2024-03-31.csv");
        let content = std::fs::read_to_string(partial).unwrap();
        assert!(content.starts_with("Id,Event,DateTime\n"));
    }
}
