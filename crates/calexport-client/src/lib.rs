//! CLI, input loading, CSV report and the export pipeline
//!
//! This crate provides the `calexport` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod input;
pub mod report;

pub use cli::Cli;
pub use config::ExportConfig;
pub use error::{ExportError, ExportResult};
pub use export::{CalendarCount, ExportSummary, run_export};
