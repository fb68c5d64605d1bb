//! Google Calendar provider configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ProviderError, ProviderResult};

/// Configuration shared by the Google credential providers and API client.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client secret JSON downloaded from the Google Cloud Console.
    pub secrets_path: PathBuf,

    /// Directory holding the token cache and the mirrored access token.
    pub tokens_dir: PathBuf,

    /// OAuth scopes to request.
    ///
    /// Defaults to `["https://www.googleapis.com/auth/calendar.readonly"]`.
    pub scopes: Vec<String>,

    /// Port of the loopback listener receiving the authorization redirect.
    pub callback_port: u16,

    /// User agent string for API requests.
    pub user_agent: String,

    /// Request timeout; `None` keeps the HTTP client default.
    pub timeout: Option<Duration>,

    /// Base URL of the Calendar API, without a trailing slash.
    pub api_base: String,
}

impl GoogleConfig {
    /// Default OAuth scope for read-only calendar access.
    pub const DEFAULT_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar.readonly";

    pub const DEFAULT_CALLBACK_PORT: u16 = 8888;

    pub const DEFAULT_API_BASE: &'static str = "https://www.googleapis.com/calendar/v3";

    /// File name of the library-managed token cache inside `tokens_dir`.
    pub const TOKEN_CACHE_FILE: &'static str = "tokencache.json";

    /// File name of the mirrored access token inside `tokens_dir`.
    pub const ACCESS_TOKEN_FILE: &'static str = "access-token.json";

    /// Creates a configuration reading secrets from `secrets_path` and
    /// caching tokens under `tokens_dir`.
    pub fn new(secrets_path: impl Into<PathBuf>, tokens_dir: impl Into<PathBuf>) -> Self {
        Self {
            secrets_path: secrets_path.into(),
            tokens_dir: tokens_dir.into(),
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
            callback_port: Self::DEFAULT_CALLBACK_PORT,
            user_agent: format!("calexport/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
            api_base: Self::DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_callback_port(mut self, port: u16) -> Self {
        self.callback_port = port;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Path of the library-managed token cache.
    pub fn token_cache_path(&self) -> PathBuf {
        self.tokens_dir.join(Self::TOKEN_CACHE_FILE)
    }

    /// Path of the mirrored access token.
    pub fn access_token_path(&self) -> PathBuf {
        self.tokens_dir.join(Self::ACCESS_TOKEN_FILE)
    }

    /// Checks settings that would otherwise only fail deep inside a request.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.scopes.is_empty() {
            return Err(ProviderError::configuration(
                "at least one OAuth scope is required",
            ));
        }
        if self.callback_port == 0 {
            return Err(ProviderError::configuration(
                "callback port must be non-zero",
            ));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ProviderError::configuration(
                "request timeout must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Checks that the client secret file is present.
    pub fn require_secrets(&self) -> ProviderResult<&Path> {
        if self.secrets_path.is_file() {
            Ok(&self.secrets_path)
        } else {
            Err(ProviderError::configuration(format!(
                "Resource not found: {}",
                self.secrets_path.display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = GoogleConfig::new("credentials.json", "tokens");
        assert_eq!(config.scopes, vec![GoogleConfig::DEFAULT_SCOPE.to_string()]);
        assert_eq!(config.callback_port, 8888);
        assert!(config.timeout.is_none());
        assert!(config.user_agent.starts_with("calexport/"));
        assert_eq!(
            config.access_token_path(),
            PathBuf::from("tokens").join("access-token.json")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_methods() {
        let config = GoogleConfig::new("secret.json", "/tmp/tok")
            .with_callback_port(9000)
            .with_timeout(Some(Duration::from_secs(10)))
            .with_user_agent("test-agent")
            .with_api_base("http://localhost:1234/v3/");

        assert_eq!(config.callback_port, 9000);
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.api_base, "http://localhost:1234/v3");
        assert_eq!(
            config.token_cache_path(),
            PathBuf::from("/tmp/tok/tokencache.json")
        );
    }

    #[test]
    fn config_validation() {
        let bad = GoogleConfig::new("c.json", "t").with_scopes(vec![]);
        assert!(bad.validate().is_err());

        let bad = GoogleConfig::new("c.json", "t").with_callback_port(0);
        assert!(bad.validate().is_err());

        let bad = GoogleConfig::new("c.json", "t").with_timeout(Some(Duration::ZERO));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn missing_secrets_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = GoogleConfig::new(dir.path().join("credentials.json"), dir.path());
        let err = config.require_secrets().unwrap_err();
        assert_eq!(
            err.code(),
            crate::error::ProviderErrorCode::ConfigurationError
        );
        assert!(err.message().starts_with("Resource not found:"));

        std::fs::write(dir.path().join("credentials.json"), "{}").unwrap();
        assert!(config.require_secrets().is_ok());
    }
}
