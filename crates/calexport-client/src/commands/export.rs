//! Default command: export a date range to CSV.

use calexport_core::DateRange;
use calexport_providers::CredentialProvider;
use calexport_providers::google::{CachedTokenProvider, GoogleCalendarClient, InstalledFlowProvider};
use tracing::debug;

use crate::config::ExportConfig;
use crate::error::ExportResult;
use crate::export::{ExportSummary, run_export};

/// Picks the credential provider for this run.
pub fn credential_provider(
    config: &ExportConfig,
    non_interactive: bool,
) -> ExportResult<Box<dyn CredentialProvider>> {
    let google_config = config.to_provider_config();
    if non_interactive {
        Ok(Box::new(CachedTokenProvider::new(&google_config)))
    } else {
        Ok(Box::new(InstalledFlowProvider::new(google_config)?))
    }
}

/// Authorizes, then exports `range` with progress on stdout.
pub async fn run(
    config: &ExportConfig,
    range: &DateRange,
    non_interactive: bool,
) -> ExportResult<ExportSummary> {
    let provider = credential_provider(config, non_interactive)?;
    debug!(provider = provider.name(), "obtaining access token");
    let token = provider.access_token().await?;

    let client = GoogleCalendarClient::new(&config.to_provider_config(), token)?;
    let mut stdout = std::io::stdout().lock();
    run_export(config, range, &client, &mut stdout).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_follows_interactivity_flag() {
        let config = ExportConfig::default();
        assert_eq!(
            credential_provider(&config, true).unwrap().name(),
            "cached-token"
        );
        assert_eq!(
            credential_provider(&config, false).unwrap().name(),
            "installed-flow"
        );
    }

    #[tokio::test]
    async fn non_interactive_run_without_token_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("calendar-ids.txt"), "primary\n").unwrap();
        let config = ExportConfig {
            tokens_dir: dir.path().join("tokens"),
            calendar_ids_path: dir.path().join("calendar-ids.txt"),
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let range = DateRange::parse("2024-03-01", "2024-03-31").unwrap();

        let err = run(&config, &range, true).await.unwrap_err();
        assert!(err.to_string().contains("authentication_failed"));
        assert!(!dir.path().join("2024-03-01_2024-03-31.csv").exists());
    }
}
