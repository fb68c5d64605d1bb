//! Google Calendar API client.
//!
//! Lists the event instances of one calendar for a date range, following
//! `nextPageToken` until the listing is complete.

use calexport_core::{CalendarEvent, DateRange, EventStart};
use chrono::{DateTime, NaiveDate, SecondsFormat};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::google::GoogleConfig;
use crate::provider::{AccessToken, BoxFuture, EventSource, FetchResult};

/// Google Calendar API client bound to one access token.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    access_token: AccessToken,
    api_base: String,
}

impl GoogleCalendarClient {
    /// Creates a client using the user agent, timeout and API base from
    /// `config`.
    pub fn new(config: &GoogleConfig, access_token: AccessToken) -> ProviderResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| {
            ProviderError::configuration("failed to create HTTP client").with_source(e)
        })?;

        Ok(Self {
            http_client,
            access_token,
            api_base: config.api_base.clone(),
        })
    }

    /// Lists every event instance of `calendar_id` starting within `range`,
    /// ordered by start time.
    pub async fn list_events(
        &self,
        calendar_id: &str,
        range: &DateRange,
    ) -> ProviderResult<FetchResult> {
        let mut events = Vec::new();
        let mut listed = 0usize;
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .list_events_page(calendar_id, range, page_token.as_deref())
                .await?;
            pages += 1;
            listed += page.items.len();

            events.extend(
                page.items
                    .into_iter()
                    .filter_map(|event| convert_event(event, calendar_id))
                    .filter(|event| range.contains_start(&event.start)),
            );

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(
            calendar = calendar_id,
            events = events.len(),
            listed,
            pages,
            "fetched events"
        );
        Ok(FetchResult { events, listed })
    }

    async fn list_events_page(
        &self,
        calendar_id: &str,
        range: &DateRange,
        page_token: Option<&str>,
    ) -> ProviderResult<EventListResponse> {
        let url = format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(calendar_id)
        );

        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(self.access_token.secret())
            .query(&[
                (
                    "timeMin",
                    range.start().to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                (
                    "timeMax",
                    range.end().to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "request timeout".to_string()
            } else if e.is_connect() {
                format!("connection failed: {}", e)
            } else {
                format!("request failed: {}", e)
            };
            ProviderError::network(message)
                .with_source(e)
                .with_provider("google")
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, calendar_id, &body).with_provider("google"));
        }

        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e))
                .with_source(e)
                .with_provider("google")
        })?;

        parse_event_list(&body).map_err(|e| e.with_provider("google"))
    }
}

impl EventSource for GoogleCalendarClient {
    fn fetch_events<'a>(
        &'a self,
        calendar_id: &'a str,
        range: &'a DateRange,
    ) -> BoxFuture<'a, ProviderResult<FetchResult>> {
        Box::pin(self.list_events(calendar_id, range))
    }
}

/// Maps a non-success status to an error; nothing is retried.
fn error_for_status(status: reqwest::StatusCode, calendar_id: &str, body: &str) -> ProviderError {
    use reqwest::StatusCode;

    match status {
        StatusCode::UNAUTHORIZED => {
            ProviderError::authentication("access token expired or invalid")
        }
        StatusCode::FORBIDDEN => {
            ProviderError::authorization(format!("access denied to calendar {}", calendar_id))
        }
        StatusCode::NOT_FOUND => {
            ProviderError::not_found(format!("calendar {} not found", calendar_id))
        }
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited("rate limit exceeded"),
        _ => ProviderError::server(format!("API error ({}): {}", status, body.trim())),
    }
}

fn parse_event_list(body: &str) -> ProviderResult<EventListResponse> {
    serde_json::from_str(body).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse response: {}", e)).with_source(e)
    })
}

/// Converts an API event; `None` for cancelled instances and unusable starts.
fn convert_event(event: ApiEvent, calendar_id: &str) -> Option<CalendarEvent> {
    if event.status.as_deref() == Some("cancelled") {
        return None;
    }

    let id = event.id.as_deref().unwrap_or("<no id>");
    let time = event.start.unwrap_or_default();
    let start = match (time.date_time, time.date) {
        (Some(dt), _) => DateTime::parse_from_rfc3339(&dt)
            .map(EventStart::from_datetime)
            .map_err(|e| warn!(event = id, "failed to parse start time {:?}: {}", dt, e))
            .ok()?,
        (None, Some(date)) => NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map(EventStart::from_date)
            .map_err(|e| warn!(event = id, "failed to parse start date {:?}: {}", date, e))
            .ok()?,
        (None, None) => {
            warn!(event = id, "event has no start time");
            return None;
        }
    };

    let mut converted = CalendarEvent::new(calendar_id, start);
    converted.summary = event.summary;
    Some(converted)
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

/// The fields of an API event the export reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: Option<String>,
    summary: Option<String>,
    status: Option<String>,
    start: Option<ApiEventTime>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date_time: Option<String>,
    date: Option<String>,
}
