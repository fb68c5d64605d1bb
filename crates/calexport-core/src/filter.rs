//! Keyword filter deciding which events make it into the report.
//!
//! Two lists of case-insensitive substrings reject an event:
//!
//! - the **blocklist**, a fixed set of recurring-meeting noise
//!   ([`DEFAULT_BLOCKLIST`]), checked first;
//! - the **exclusion list**, loaded from the user's exclusion file once per run.
//!
//! Anything matching neither list is exported.

use crate::event::CalendarEvent;

/// Built-in summary substrings that always reject an event.
pub const DEFAULT_BLOCKLIST: &[&str] = &[
    "scrum",
    "bi-weekly",
    "biweekly",
    "battle buddies",
    "pm/em/se",
    "talkto",
    "weekly",
    "international team",
    "1:1",
    "lunch",
    "out of office",
];

/// Outcome of checking a summary against the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<'a> {
    /// No rule matched; the event is exported.
    Accepted,
    /// Rejected by a blocklist entry.
    Blocklisted(&'a str),
    /// Rejected by a user exclusion keyword.
    Excluded(&'a str),
}

impl Verdict<'_> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Immutable keyword filter for one export run.
///
/// All keywords are stored lower-cased; blank keywords are dropped since an
/// empty substring would match every summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    blocklist: Vec<String>,
    exclusions: Vec<String>,
}

impl EventFilter {
    /// Creates a filter with the given blocklist and no exclusions.
    pub fn new<I, S>(blocklist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            blocklist: normalize(blocklist),
            exclusions: Vec::new(),
        }
    }

    /// Creates a filter with [`DEFAULT_BLOCKLIST`].
    pub fn with_default_blocklist() -> Self {
        Self::new(DEFAULT_BLOCKLIST)
    }

    /// Builder method to set the user exclusion keywords.
    pub fn with_exclusions<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclusions = normalize(keywords);
        self
    }

    /// Returns the lower-cased blocklist.
    pub fn blocklist(&self) -> &[String] {
        &self.blocklist
    }

    /// Returns the lower-cased, non-blank exclusion keywords.
    pub fn exclusions(&self) -> &[String] {
        &self.exclusions
    }

    /// Checks a summary and reports which rule, if any, rejected it.
    pub fn check(&self, summary: &str) -> Verdict<'_> {
        let summary = summary.to_lowercase();

        if let Some(hit) = self.blocklist.iter().find(|k| summary.contains(k.as_str())) {
            return Verdict::Blocklisted(hit.as_str());
        }
        if let Some(hit) = self.exclusions.iter().find(|k| summary.contains(k.as_str())) {
            return Verdict::Excluded(hit.as_str());
        }
        Verdict::Accepted
    }

    /// Returns `true` when an event with this summary should be exported.
    pub fn should_export(&self, summary: &str) -> bool {
        self.check(summary).is_accepted()
    }

    /// Checks an event; untitled events are matched as the empty string.
    pub fn accepts(&self, event: &CalendarEvent) -> bool {
        self.should_export(event.summary_or_empty())
    }
}

fn normalize<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().to_lowercase())
        .filter(|k| !k.trim().is_empty())
        .collect()
}
