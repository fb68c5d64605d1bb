//! Core types: date ranges, events, keyword filter, tracing

pub mod event;
pub mod filter;
pub mod time;
pub mod tracing;

pub use event::{CalendarEvent, EventStart};
pub use filter::{DEFAULT_BLOCKLIST, EventFilter, Verdict};
pub use time::{Boundary, DateParseError, DateRange};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
