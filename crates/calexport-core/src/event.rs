//! Calendar events as they flow through an export.
//!
//! Events are transient: fetched from the calendar API, filtered, and written
//! to the report in a single run.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};

/// When an event starts.
///
/// Timed events keep the UTC offset the API reported so the report shows
/// the same wall-clock time the calendar does. All-day events only carry a
/// date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventStart {
    /// A specific instant with its original offset.
    DateTime(DateTime<FixedOffset>),
    /// An all-day event date (no time of day).
    AllDay(NaiveDate),
}

impl EventStart {
    /// Creates a timed start.
    pub fn from_datetime(dt: DateTime<FixedOffset>) -> Self {
        Self::DateTime(dt)
    }

    /// Creates an all-day start.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// Returns `true` for all-day events.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Converts to UTC for comparisons; all-day events map to midnight UTC.
    pub fn to_utc_datetime(&self) -> DateTime<Utc> {
        match self {
            Self::DateTime(dt) => dt.with_timezone(&Utc),
            Self::AllDay(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }
}

/// Renders the value written to the `DateTime` column.
///
/// Timed: RFC 3339 with milliseconds (`2024-03-05T10:00:00.000-05:00`).
/// All-day: `2024-03-05`.
impl fmt::Display for EventStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateTime(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Self::AllDay(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// A single event instance fetched from one calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// The calendar the event was fetched from.
    pub calendar_id: String,
    /// The event title; the API omits it for untitled events.
    pub summary: Option<String>,
    /// When the event starts.
    pub start: EventStart,
}

impl CalendarEvent {
    pub fn new(calendar_id: impl Into<String>, start: EventStart) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            summary: None,
            start,
        }
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// The summary, or an empty string for untitled events.
    pub fn summary_or_empty(&self) -> &str {
        self.summary.as_deref().unwrap_or_default()
    }
}
