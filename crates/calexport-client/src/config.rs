//! Export configuration.
//!
//! Every setting has a default matching the historic layout: all files sit
//! in the working directory. A TOML file given with `--config` (or
//! `CALEXPORT_CONFIG`) overrides the defaults, and CLI flags override both.
//!
//! Paths are used as written; `~` is not expanded.
//!
//! ```toml
//! calendar_ids_path = "inputs/calendar-ids.txt"
//! output_dir = "reports"
//! request_timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use calexport_core::{DEFAULT_BLOCKLIST, EventFilter};
use calexport_providers::google::GoogleConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};

/// Everything one export run needs besides the date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// OAuth client secret downloaded from the Google Cloud Console.
    pub credentials_path: PathBuf,

    /// Directory holding the OAuth token cache.
    pub tokens_dir: PathBuf,

    /// One calendar id per line. Mandatory.
    pub calendar_ids_path: PathBuf,

    /// One exclusion keyword per line. Optional.
    pub exclude_events_path: PathBuf,

    /// Directory the `{start}_{end}.csv` report is created in.
    pub output_dir: PathBuf,

    /// Summary substrings that always reject an event.
    pub blocklist: Vec<String>,

    pub scopes: Vec<String>,

    /// Loopback port for the OAuth redirect.
    pub callback_port: u16,

    pub user_agent: Option<String>,

    /// Per-request timeout; unset keeps the HTTP client default.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::from("credentials.json"),
            tokens_dir: PathBuf::from("tokens"),
            calendar_ids_path: PathBuf::from("calendar-ids.txt"),
            exclude_events_path: PathBuf::from("exclude-events.txt"),
            output_dir: PathBuf::from("."),
            blocklist: DEFAULT_BLOCKLIST.iter().map(|s| s.to_string()).collect(),
            scopes: vec![GoogleConfig::DEFAULT_SCOPE.to_string()],
            callback_port: GoogleConfig::DEFAULT_CALLBACK_PORT,
            user_agent: None,
            request_timeout_secs: None,
        }
    }
}

impl ExportConfig {
    /// Loads configuration from a TOML file; unset keys keep their defaults.
    pub fn load_from(path: &Path) -> ExportResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExportError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| ExportError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Builds the keyword filter with this blocklist and the given exclusions.
    pub fn event_filter<I, S>(&self, exclusions: I) -> EventFilter
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        EventFilter::new(&self.blocklist).with_exclusions(exclusions)
    }

    /// Full path of the report file for a given file name.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Converts to provider configuration.
    pub fn to_provider_config(&self) -> GoogleConfig {
        let mut config = GoogleConfig::new(&self.credentials_path, &self.tokens_dir)
            .with_scopes(self.scopes.clone())
            .with_callback_port(self.callback_port)
            .with_timeout(self.request_timeout_secs.map(Duration::from_secs));
        if let Some(ref user_agent) = self.user_agent {
            config = config.with_user_agent(user_agent);
        }
        config
    }
}
