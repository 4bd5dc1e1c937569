//! Client configuration: credential, base URL, timeouts, signing policy.
//!
//! Configuration is an explicit struct passed to constructors; there is no
//! ambient global client. The bearer token is read once at construction
//! (from the environment or supplied directly) and never mutated afterwards.

use thiserror::Error;

/// Environment variable holding the Raindrop.io bearer token.
pub const RAINDROP_TOKEN_VAR: &str = "RAINDROP_TOKEN";

/// Production REST API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.raindrop.io/rest/v1";

/// Connect timeout for authenticated API calls, in seconds.
pub(crate) const API_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Read timeout for authenticated API calls, in seconds.
pub(crate) const API_READ_TIMEOUT_SECS: u64 = 30;

/// Connect timeout for signed-URL content fetches, in seconds.
pub(crate) const CONTENT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Read timeout for signed-URL content fetches, in seconds.
///
/// Signed URLs can point at large binary objects, so this is much longer
/// than the API read timeout.
pub(crate) const CONTENT_READ_TIMEOUT_SECS: u64 = 300;

/// Storage-signing domain the file endpoint is expected to redirect to.
const DEFAULT_FILE_SIGNING_HOST: &str = "amazonaws.com";

/// Errors that can occur while building a client configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// No bearer token was supplied and the environment variable is unset.
    #[error(
        "Raindrop API token is required. Set the {RAINDROP_TOKEN_VAR} environment variable or pass a token to the constructor."
    )]
    MissingToken,
}

/// Configuration for [`crate::ApiClient`] and [`crate::ArchiveClient`].
///
/// The token is required; everything else has production defaults. The
/// signing-host lists control which hosts a 307 `location` target may point
/// at per resource kind; an empty list accepts any host.
#[derive(Clone)]
pub struct ClientConfig {
    token: String,
    base_url: String,
    /// Hosts a file-endpoint redirect may point at (suffix match).
    pub file_signing_hosts: Vec<String>,
    /// Hosts a cache-endpoint redirect may point at (suffix match, empty = any).
    pub cache_signing_hosts: Vec<String>,
}

impl ClientConfig {
    /// Creates a configuration with an explicit bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(Self {
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
            file_signing_hosts: vec![DEFAULT_FILE_SIGNING_HOST.to_string()],
            cache_signing_hosts: Vec::new(),
        })
    }

    /// Creates a configuration from the [`RAINDROP_TOKEN_VAR`] environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] if the variable is unset or empty.
    /// Token absence is a construction-time failure, not a per-call one.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = std::env::var(RAINDROP_TOKEN_VAR).map_err(|_| ConfigError::MissingToken)?;
        Self::new(token)
    }

    /// Replaces the API base URL (no trailing slash). Intended for tests.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replaces the file-endpoint signing-host allow-list.
    #[must_use]
    pub fn with_file_signing_hosts(mut self, hosts: Vec<String>) -> Self {
        self.file_signing_hosts = hosts;
        self
    }

    /// Replaces the cache-endpoint signing-host allow-list.
    #[must_use]
    pub fn with_cache_signing_hosts(mut self, hosts: Vec<String>) -> Self {
        self.cache_signing_hosts = hosts;
        self
    }

    /// Returns the bearer token.
    #[must_use]
    pub(crate) fn token(&self) -> &str {
        &self.token
    }

    /// Returns the API base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the token with the middle elided, safe for logs and errors.
    #[must_use]
    pub fn masked_token(&self) -> String {
        if self.token.len() <= 8 {
            return "***".to_string();
        }
        format!("{}...{}", &self.token[..4], &self.token[self.token.len() - 4..])
    }
}

// The token is secret-bearing; Debug must never reveal it whole.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &self.masked_token())
            .field("base_url", &self.base_url)
            .field("file_signing_hosts", &self.file_signing_hosts)
            .field("cache_signing_hosts", &self.cache_signing_hosts)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new_rejects_empty_token() {
        let result = ClientConfig::new("");
        assert!(matches!(result, Err(ConfigError::MissingToken)));
        let result = ClientConfig::new("   ");
        assert!(matches!(result, Err(ConfigError::MissingToken)));
    }

    #[test]
    fn test_config_missing_token_message_names_env_var() {
        let msg = ConfigError::MissingToken.to_string();
        assert!(msg.contains(RAINDROP_TOKEN_VAR), "Expected env var in: {msg}");
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new("secret-token-value").unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.file_signing_hosts, vec!["amazonaws.com".to_string()]);
        assert!(config.cache_signing_hosts.is_empty());
    }

    #[test]
    fn test_config_with_base_url_strips_trailing_slash() {
        let config = ClientConfig::new("secret-token-value")
            .unwrap()
            .with_base_url("http://127.0.0.1:9000/rest/v1/");
        assert_eq!(config.base_url(), "http://127.0.0.1:9000/rest/v1");
    }

    #[test]
    fn test_config_masked_token_short() {
        let config = ClientConfig::new("abcdefgh").unwrap();
        assert_eq!(config.masked_token(), "***");
    }

    #[test]
    fn test_config_masked_token_long() {
        let config = ClientConfig::new("abcd-0123456789-wxyz").unwrap();
        assert_eq!(config.masked_token(), "abcd...wxyz");
    }

    #[test]
    fn test_config_debug_never_shows_full_token() {
        let config = ClientConfig::new("super-secret-bearer-token").unwrap();
        let debug = format!("{config:?}");
        assert!(
            !debug.contains("super-secret-bearer-token"),
            "Debug must mask the token: {debug}"
        );
        assert!(debug.contains("supe...oken"), "Debug shows masked form: {debug}");
    }
}
