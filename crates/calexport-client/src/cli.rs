//! Command-line interface definition.

use std::path::PathBuf;

use calexport_core::TracingOutputFormat;
use clap::{Parser, Subcommand};

use crate::config::ExportConfig;

/// calexport - export Google Calendar events over a date range to CSV
#[derive(Debug, Parser)]
#[command(name = "calexport")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct Cli {
    /// First day of the range (yyyy-mm-dd), from 00:00 local time
    #[arg(value_name = "START", required = true)]
    pub start: Option<String>,

    /// Last day of the range (yyyy-mm-dd), up to 23:00 local time
    #[arg(value_name = "END", required = true)]
    pub end: Option<String>,

    /// Path to configuration file
    #[arg(long, short, global = true, env = "CALEXPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Log output format on stderr: compact, pretty or json
    #[arg(long, global = true, default_value_t = TracingOutputFormat::Compact)]
    pub log_format: TracingOutputFormat,

    /// File listing one calendar id per line
    #[arg(long)]
    pub calendar_ids: Option<PathBuf>,

    /// File listing one exclusion keyword per line
    #[arg(long)]
    pub exclude_events: Option<PathBuf>,

    /// OAuth client secret file from the Google Cloud Console
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Directory for the OAuth token cache
    #[arg(long, global = true)]
    pub tokens_dir: Option<PathBuf>,

    /// Directory to write the report into
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Only use a previously stored token; never open a browser
    #[arg(long)]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Applies path flags on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut ExportConfig) {
        let overrides = [
            (&self.calendar_ids, &mut config.calendar_ids_path),
            (&self.exclude_events, &mut config.exclude_events_path),
            (&self.credentials, &mut config.credentials_path),
            (&self.tokens_dir, &mut config.tokens_dir),
            (&self.output_dir, &mut config.output_dir),
        ];
        for (flag, slot) in overrides {
            if let Some(path) = flag {
                *slot = path.clone();
            }
        }
    }

    /// The positional dates; both are present unless a subcommand was given.
    pub fn date_args(&self) -> Option<(&str, &str)> {
        Some((self.start.as_deref()?, self.end.as_deref()?))
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authorize calexport and store the token for later runs
    Auth {
        /// Discard stored tokens and run the consent flow again
        #[arg(long, short)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn parses_date_range() {
        let cli = Cli::try_parse_from(["calexport", "2024-03-01", "2024-03-31"]).unwrap();
        assert_eq!(cli.date_args(), Some(("2024-03-01", "2024-03-31")));
        assert!(cli.command.is_none());
        assert!(!cli.non_interactive);
    }

    #[test]
    fn missing_dates_are_a_usage_error() {
        let err = Cli::try_parse_from(["calexport", "2024-03-01"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);

        let err = Cli::try_parse_from(["calexport"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn auth_subcommand_needs_no_dates() {
        let cli = Cli::try_parse_from(["calexport", "auth", "--force"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Auth { force: true })));
        assert_eq!(cli.date_args(), None);
    }

    #[test]
    fn log_format_flag() {
        let cli = Cli::try_parse_from(["calexport", "2024-03-01", "2024-03-31"]).unwrap();
        assert_eq!(cli.log_format, TracingOutputFormat::Compact);

        let cli = Cli::try_parse_from(["calexport", "auth", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log_format, TracingOutputFormat::Json);

        let err = Cli::try_parse_from([
            "calexport",
            "2024-03-01",
            "2024-03-31",
            "--log-format",
            "xml",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn flags_override_config_paths() {
        let cli = Cli::try_parse_from([
            "calexport",
            "2024-03-01",
            "2024-03-31",
            "--calendar-ids",
            "/etc/calexport/ids.txt",
            "--output-dir",
            "reports",
            "--non-interactive",
        ])
        .unwrap();

        let mut config = ExportConfig::default();
        cli.apply_to(&mut config);
        assert_eq!(config.calendar_ids_path, PathBuf::from("/etc/calexport/ids.txt"));
        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert_eq!(config.tokens_dir, PathBuf::from("tokens"));
        assert!(cli.non_interactive);
    }
}
