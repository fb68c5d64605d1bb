//! Date range for an export run.
//!
//! A [`DateRange`] is built from the two `yyyy-mm-dd` strings given on the
//! command line. The start boundary is pinned to `00:00:00` and the end
//! boundary to `23:00:00` of its day, both interpreted in a local time zone.
//!
//! The end boundary is 23:00, not the end of the day: an event that
//! starts between 23:00 and midnight on the end date is outside the range.

use std::fmt;

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

use crate::event::EventStart;

/// Layout the date parts are reassembled into before parsing.
const STAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Which end of the range a date string describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// First day of the range, pinned to 00:00:00.
    Start,
    /// Last day of the range, pinned to 23:00:00.
    End,
}

impl Boundary {
    /// Fixed time of day applied to this boundary.
    pub fn clock(&self) -> &'static str {
        match self {
            Self::Start => "00:00:00",
            Self::End => "23:00:00",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while turning date arguments into a [`DateRange`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    /// The argument is not three `-` separated parts of width 4, 2 and 2.
    #[error("{boundary} date must be in yyyy-mm-dd form, got {input:?}")]
    Format { boundary: Boundary, input: String },

    /// The parts do not form a valid calendar date.
    #[error("invalid {boundary} date {input:?}: {source}")]
    Invalid {
        boundary: Boundary,
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The time zone reports the wall-clock time as skipped by a DST change.
    #[error("{boundary} time {local} does not exist in the local time zone")]
    NonexistentLocalTime {
        boundary: Boundary,
        local: NaiveDateTime,
    },

    /// The start boundary lies after the end boundary.
    #[error("start date {start} is after end date {end}")]
    Inverted { start: String, end: String },
}

/// Parses one date argument for the given boundary in the given time zone.
///
/// The instant is returned in UTC; `timestamp_millis()` gives the epoch
/// milliseconds the calendar API is queried with.
pub fn parse_date_in<Tz: TimeZone>(
    boundary: Boundary,
    input: &str,
    tz: &Tz,
) -> Result<DateTime<Utc>, DateParseError> {
    resolve(boundary, parse_local(boundary, input)?, tz)
}

/// Reassembles `yyyy-mm-dd` with the boundary's clock time.
fn parse_local(boundary: Boundary, input: &str) -> Result<NaiveDateTime, DateParseError> {
    let format_error = || DateParseError::Format {
        boundary,
        input: input.to_string(),
    };

    let parts: Vec<&str> = input.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return Err(format_error());
    };
    if year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return Err(format_error());
    }

    let stamp = format!("{year}/{month}/{day} {}", boundary.clock());
    NaiveDateTime::parse_from_str(&stamp, STAMP_FORMAT).map_err(|source| {
        DateParseError::Invalid {
            boundary,
            input: input.to_string(),
            source,
        }
    })
}

fn resolve<Tz: TimeZone>(
    boundary: Boundary,
    local: NaiveDateTime,
    tz: &Tz,
) -> Result<DateTime<Utc>, DateParseError> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(DateParseError::NonexistentLocalTime { boundary, local }),
    }
}

/// Parses one date argument in the system's local time zone.
pub fn parse_date(boundary: Boundary, input: &str) -> Result<DateTime<Utc>, DateParseError> {
    parse_date_in(boundary, input, &Local)
}

/// The window of event start times an export covers.
///
/// Half-open: `[start, end)`. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    start_date: String,
    end_date: String,
    first_day: NaiveDate,
    last_day: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Builds a range from `yyyy-mm-dd` arguments in the local time zone.
    pub fn parse(start_date: &str, end_date: &str) -> Result<Self, DateParseError> {
        Self::parse_in(start_date, end_date, &Local)
    }

    /// Builds a range from `yyyy-mm-dd` arguments in an explicit time zone.
    pub fn parse_in<Tz: TimeZone>(
        start_date: &str,
        end_date: &str,
        tz: &Tz,
    ) -> Result<Self, DateParseError> {
        let first = parse_local(Boundary::Start, start_date)?;
        let last = parse_local(Boundary::End, end_date)?;
        let start = resolve(Boundary::Start, first, tz)?;
        let end = resolve(Boundary::End, last, tz)?;

        if start > end {
            return Err(DateParseError::Inverted {
                start: start_date.to_string(),
                end: end_date.to_string(),
            });
        }

        Ok(Self {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            first_day: first.date(),
            last_day: last.date(),
            start,
            end,
        })
    }

    /// Start of the range (inclusive).
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// End of the range (exclusive).
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// The start argument as given.
    pub fn start_date(&self) -> &str {
        &self.start_date
    }

    /// The end argument as given.
    pub fn end_date(&self) -> &str {
        &self.end_date
    }

    /// Checks whether an instant falls inside `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Checks whether an event start falls inside the range.
    ///
    /// All-day events count when their date is one of the range's days.
    pub fn contains_start(&self, start: &EventStart) -> bool {
        match start {
            EventStart::DateTime(dt) => self.contains(dt.with_timezone(&Utc)),
            EventStart::AllDay(date) => (self.first_day..=self.last_day).contains(date),
        }
    }

    /// File name of the report for this range, e.g. `2024-03-01_2024-03-31.csv`.
    pub fn report_file_name(&self) -> String {
        format!("{}_{}.csv", self.start_date, self.end_date)
    }
}
