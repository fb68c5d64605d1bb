//! Seams between the export pipeline and the calendar backend.
//!
//! [`CredentialProvider`] yields bearer tokens; [`EventSource`] lists the
//! events of one calendar within a [`DateRange`]. The export loop only sees
//! these traits, so tests drive it with in-memory fakes.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use calexport_core::{CalendarEvent, DateRange};
use chrono::{DateTime, Utc};

use crate::error::ProviderResult;

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A bearer token for the calendar API.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expires_at: None,
        }
    }

    /// Builder method to set the expiry instant.
    pub fn with_expires_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// The raw token, sent as `Authorization: Bearer <secret>`.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// A token without an expiry never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

// Keep the secret out of logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Something that can hand out a valid access token.
///
/// Implementations may block on user interaction (a browser consent flow) or
/// read a cached token from disk. A failure here aborts the run before any
/// report file is created.
pub trait CredentialProvider: Send + Sync {
    /// Short name used in logs and error prefixes.
    fn name(&self) -> &str;

    /// Returns a token that is valid for the configured scopes.
    fn access_token(&self) -> BoxFuture<'_, ProviderResult<AccessToken>>;
}

/// Result from listing one calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResult {
    /// Events starting inside the range, ordered by start time.
    pub events: Vec<CalendarEvent>,
    /// Items the backend listed before anything was dropped. Events that
    /// began before the range but overlap it are counted here only.
    pub listed: usize,
}

impl FetchResult {
    /// Creates a result where nothing was dropped.
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            listed: events.len(),
            events,
        }
    }

    /// Builder method to set the listed count.
    pub fn with_listed(mut self, listed: usize) -> Self {
        self.listed = listed;
        self
    }

    /// Returns `true` when the backend listed nothing at all.
    pub fn is_empty_listing(&self) -> bool {
        self.listed == 0
    }
}

/// A backend that lists calendar events.
pub trait EventSource: Send + Sync {
    /// Lists the events of `calendar_id` whose start lies in `range`.
    ///
    /// Recurring events are expanded into instances and the result is
    /// ordered by start time. Pagination is handled internally.
    fn fetch_events<'a>(
        &'a self,
        calendar_id: &'a str,
        range: &'a DateRange,
    ) -> BoxFuture<'a, ProviderResult<FetchResult>>;
}
