//! Mirrored access token and the non-interactive credential provider.
//!
//! The OAuth library keeps its own refreshable cache. After each interactive
//! authorization the current access token is also written to
//! `access-token.json` so later runs can proceed without a browser.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::google::GoogleConfig;
use crate::provider::{AccessToken, BoxFuture, CredentialProvider};

/// A persisted access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,

    /// When the access token expires, if the server said so.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,

    /// The OAuth scopes the token was requested for.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// When the token was written.
    pub saved_at: DateTime<Utc>,
}

impl TokenInfo {
    pub fn new(
        access_token: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
            scopes,
            saved_at: Utc::now(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    /// Returns true if the token covers every required scope.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    pub fn to_access_token(&self) -> AccessToken {
        AccessToken::new(self.access_token.clone()).with_expires_at(self.expires_at)
    }
}

/// JSON file holding one [`TokenInfo`].
#[derive(Debug, Clone)]
pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored token; `Ok(None)` when no file exists.
    pub fn load(&self) -> ProviderResult<Option<TokenInfo>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no stored access token");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to read token file {}",
                self.path.display()
            ))
            .with_source(e)
        })?;
        let token: TokenInfo = serde_json::from_str(&content).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to parse token file {}",
                self.path.display()
            ))
            .with_source(e)
        })?;

        debug!(path = %self.path.display(), "loaded stored access token");
        Ok(Some(token))
    }

    /// Writes the token, creating the parent directory when needed.
    pub fn save(&self, token: &TokenInfo) -> ProviderResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ProviderError::configuration(format!(
                    "failed to create token directory {}",
                    parent.display()
                ))
                .with_source(e)
            })?;
        }

        let content = serde_json::to_string_pretty(token).map_err(|e| {
            ProviderError::internal("failed to serialize access token").with_source(e)
        })?;

        // temp file then rename; the secret is never readable by others
        let temp_path = self.path.with_extension("json.tmp");
        let write_error = |e: std::io::Error| {
            ProviderError::configuration(format!(
                "failed to write token file {}",
                temp_path.display()
            ))
            .with_source(e)
        };

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&temp_path).map_err(write_error)?;

        // mode() only applies on creation; fix up a leftover temp file
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(write_error)?;
        }

        file.write_all(content.as_bytes()).map_err(write_error)?;
        file.sync_all().map_err(write_error)?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to move token file into {}",
                self.path.display()
            ))
            .with_source(e)
        })?;

        info!(path = %self.path.display(), "stored access token");
        Ok(())
    }

    /// Removes the stored token; a missing file is not an error.
    pub fn clear(&self) -> ProviderResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "cleared stored access token");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ProviderError::configuration(format!(
                "failed to remove token file {}",
                self.path.display()
            ))
            .with_source(e)),
        }
    }
}

/// Credential provider that only reuses a previously stored token.
///
/// Never prompts. Fails with an authentication error when the token is
/// missing, expired, or was granted for different scopes.
#[derive(Debug, Clone)]
pub struct CachedTokenProvider {
    storage: TokenStorage,
    scopes: Vec<String>,
}

impl CachedTokenProvider {
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            storage: TokenStorage::new(config.access_token_path()),
            scopes: config.scopes.clone(),
        }
    }

    fn load_valid(&self) -> ProviderResult<AccessToken> {
        let path = self.storage.path().display().to_string();
        let token = self.storage.load()?.ok_or_else(|| {
            ProviderError::authentication(format!(
                "no stored access token at {path}; run `calexport auth` first"
            ))
        })?;

        if token.is_expired_at(Utc::now()) {
            return Err(ProviderError::authentication(format!(
                "stored access token at {path} has expired; run `calexport auth` again"
            )));
        }
        if !token.has_scopes(&self.scopes) {
            return Err(ProviderError::authentication(format!(
                "stored access token at {path} lacks the required scopes"
            )));
        }
        Ok(token.to_access_token())
    }
}

impl CredentialProvider for CachedTokenProvider {
    fn name(&self) -> &str {
        "cached-token"
    }

    fn access_token(&self) -> BoxFuture<'_, ProviderResult<AccessToken>> {
        let result = self.load_valid().map_err(|e| e.with_provider("google"));
        Box::pin(async move { result })
    }
}
