//! Interactive credential provider using the installed-app OAuth flow.
//!
//! The token exchange, refresh and cache format belong to `yup-oauth2`. This
//! module wires it to our configuration, opens the consent page in a browser
//! and mirrors the resulting access token for non-interactive runs.

use std::future::Future;
use std::pin::Pin;

use chrono::DateTime;
use tracing::{debug, info, warn};
use yup_oauth2::authenticator_delegate::InstalledFlowDelegate;
use yup_oauth2::{InstalledFlowAuthenticator, InstalledFlowReturnMethod};

use crate::error::{ProviderError, ProviderResult};
use crate::google::GoogleConfig;
use crate::google::tokens::{TokenInfo, TokenStorage};
use crate::provider::{AccessToken, BoxFuture, CredentialProvider};

/// Opens the authorization URL in the default browser.
///
/// The redirect is caught by the loopback listener, so no code is read from
/// the terminal.
struct BrowserDelegate;

impl InstalledFlowDelegate for BrowserDelegate {
    fn present_user_url<'a>(
        &'a self,
        url: &'a str,
        _need_code: bool,
    ) -> Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'a>> {
        Box::pin(async move {
            if let Err(e) = open::that(url) {
                warn!("failed to open browser: {}", e);
            }
            eprintln!("Please open the following URL to authorize calexport:\n\n  {url}\n");
            Ok(String::new())
        })
    }
}

/// Credential provider running the browser consent flow when needed.
///
/// A refreshable token cached by an earlier run is reused silently; the
/// browser only opens when there is none.
#[derive(Debug, Clone)]
pub struct InstalledFlowProvider {
    config: GoogleConfig,
}

impl InstalledFlowProvider {
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    /// Removes both the library token cache and the mirrored access token,
    /// so the next call runs the full consent flow.
    pub fn forget(&self) -> ProviderResult<()> {
        TokenStorage::new(self.config.access_token_path()).clear()?;
        let cache = self.config.token_cache_path();
        match std::fs::remove_file(&cache) {
            Ok(()) => info!(path = %cache.display(), "cleared token cache"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ProviderError::configuration(format!(
                    "failed to remove token cache {}",
                    cache.display()
                ))
                .with_source(e));
            }
        }
        Ok(())
    }

    async fn authorize(&self) -> ProviderResult<AccessToken> {
        let secrets_path = self.config.require_secrets()?;
        let secret = yup_oauth2::read_application_secret(secrets_path)
            .await
            .map_err(|e| {
                ProviderError::configuration(format!(
                    "failed to read OAuth client secret {}",
                    secrets_path.display()
                ))
                .with_source(e)
            })?;

        std::fs::create_dir_all(&self.config.tokens_dir).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to create token directory {}",
                self.config.tokens_dir.display()
            ))
            .with_source(e)
        })?;

        debug!(
            port = self.config.callback_port,
            cache = %self.config.token_cache_path().display(),
            "building installed-flow authenticator"
        );
        let auth = InstalledFlowAuthenticator::builder(
            secret,
            InstalledFlowReturnMethod::HTTPPortRedirect(self.config.callback_port),
        )
        .persist_tokens_to_disk(self.config.token_cache_path())
        .flow_delegate(Box::new(BrowserDelegate))
        .build()
        .await
        .map_err(|e| {
            ProviderError::configuration("failed to build OAuth authenticator").with_source(e)
        })?;

        let token = auth
            .token(self.config.scopes.as_slice())
            .await
            .map_err(|e| ProviderError::authentication("authorization failed").with_source(e))?;

        let secret = token
            .token()
            .ok_or_else(|| ProviderError::authentication("authorization returned no access token"))?;
        let expires_at = token
            .expiration_time()
            .and_then(|t| DateTime::from_timestamp(t.unix_timestamp(), 0));

        let info = TokenInfo::new(secret, expires_at, self.config.scopes.clone());
        TokenStorage::new(self.config.access_token_path()).save(&info)?;

        Ok(info.to_access_token())
    }
}

impl CredentialProvider for InstalledFlowProvider {
    fn name(&self) -> &str {
        "installed-flow"
    }

    fn access_token(&self) -> BoxFuture<'_, ProviderResult<AccessToken>> {
        Box::pin(async move { self.authorize().await.map_err(|e| e.with_provider("google")) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = GoogleConfig::new("credentials.json", "tokens").with_scopes(vec![]);
        let err = InstalledFlowProvider::new(config).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }

    #[tokio::test]
    async fn missing_secrets_fail_before_any_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let config = GoogleConfig::new(dir.path().join("credentials.json"), dir.path().join("t"));
        let provider = InstalledFlowProvider::new(config).unwrap();

        let err = provider.access_token().await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert_eq!(err.provider(), Some("google"));
        assert!(!dir.path().join("t").exists());
    }

    #[test]
    fn forget_removes_both_token_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = GoogleConfig::new(dir.path().join("credentials.json"), dir.path());
        std::fs::write(config.token_cache_path(), "[]").unwrap();
        TokenStorage::new(config.access_token_path())
            .save(&TokenInfo::new("ya29.x", None, vec![]))
            .unwrap();

        let provider = InstalledFlowProvider::new(config.clone()).unwrap();
        provider.forget().unwrap();
        assert!(!config.token_cache_path().exists());
        assert!(!config.access_token_path().exists());

        provider.forget().unwrap();
    }
}
