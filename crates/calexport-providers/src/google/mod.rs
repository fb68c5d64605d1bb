//! Google Calendar backend.
//!
//! - [`InstalledFlowProvider`]: browser consent via `yup-oauth2`, tokens
//!   cached under the configured tokens directory.
//! - [`CachedTokenProvider`]: reuses the access token stored by an earlier
//!   interactive run; never prompts.
//! - [`GoogleCalendarClient`]: the [`EventSource`](crate::EventSource) that
//!   lists event instances over the Calendar v3 REST API.
//!
//! ```ignore
//! use calexport_providers::google::{GoogleCalendarClient, GoogleConfig, InstalledFlowProvider};
//!
//! let config = GoogleConfig::new("credentials.json", "tokens");
//! let token = InstalledFlowProvider::new(config.clone())?.access_token().await?;
//! let client = GoogleCalendarClient::new(&config, token)?;
//! let events = client.list_events("primary", &range).await?;
//! ```

mod client;
mod config;
mod installed;
mod tokens;

pub use client::GoogleCalendarClient;
pub use config::GoogleConfig;
pub use installed::InstalledFlowProvider;
pub use tokens::{CachedTokenProvider, TokenInfo, TokenStorage};
