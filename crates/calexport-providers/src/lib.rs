//! Credential providers and event sources.
//!
//! - [`CredentialProvider`] - yields an access token for the calendar API
//! - [`EventSource`] - lists the events of one calendar inside a [`DateRange`]
//! - [`google`] - Google Calendar implementations of both
//! - [`ProviderError`] - error type shared by all of the above
//!
//! ```text
//! ┌──────────────────────┐   token   ┌──────────────────────┐
//! │ InstalledFlowProvider├──────────►│ GoogleCalendarClient │
//! │ CachedTokenProvider  │           │    (EventSource)     │
//! └──────────────────────┘           └──────────┬───────────┘
//!                                               │ FetchResult
//!                                               ▼
//!                                        export pipeline
//! ```
//!
//! [`DateRange`]: calexport_core::DateRange

pub mod error;
pub mod google;
pub mod provider;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use provider::{AccessToken, BoxFuture, CredentialProvider, EventSource, FetchResult};
