//! Authorization command.

use calexport_providers::CredentialProvider;
use calexport_providers::google::{CachedTokenProvider, InstalledFlowProvider};
use tracing::info;

use crate::config::ExportConfig;
use crate::error::ExportResult;

/// Runs the browser consent flow and stores the token for later runs.
///
/// A still-valid stored token is kept unless `force` is set.
pub async fn run(config: &ExportConfig, force: bool) -> ExportResult<()> {
    let google_config = config.to_provider_config();

    if !force && CachedTokenProvider::new(&google_config).access_token().await.is_ok() {
        println!("Already authorized with Google Calendar.");
        println!("Use --force to authorize again.");
        return Ok(());
    }

    let provider = InstalledFlowProvider::new(google_config)?;
    if force {
        provider.forget()?;
    }

    println!("Starting Google Calendar authorization...");
    println!("A browser window will open for you to grant read-only calendar access.");
    println!();

    let token = provider.access_token().await?;

    info!(expires_at = ?token.expires_at(), "authorization successful");
    println!("Authorization successful!");
    println!(
        "Token saved to {}",
        provider.config().access_token_path().display()
    );
    Ok(())
}
