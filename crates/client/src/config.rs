//! Client configuration with builder pattern.
//!
//! Provides type-safe configuration for the directory client including:
//! - Backend base URL and auth endpoint URL
//! - API shape selection (plain REST vs. Firebase-flavored)
//! - Request timeout

use std::time::Duration;

use snafu::ensure;
use url::Url;

use crate::error::{ConfigSnafu, InvalidUrlSnafu, Result};

/// Default request timeout (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which request/response shape the backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiMode {
    /// Plain JSON REST: bearer-token header, arrays for collections.
    #[default]
    Rest,
    /// Firebase-flavored: `.json` path suffix, `auth` query parameter,
    /// id-keyed objects for collections.
    Firebase,
}

/// Configuration for the directory client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL for entity endpoints.
    pub(crate) base_url: Url,

    /// Base URL for token-issuing auth endpoints.
    pub(crate) auth_url: Url,

    /// Request/response shape of the backend.
    pub(crate) api_mode: ApiMode,

    /// API key appended to auth requests in Firebase mode.
    pub(crate) api_key: Option<String>,

    /// Request timeout.
    pub(crate) timeout: Duration,
}

impl ClientConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Returns the backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the auth endpoint base URL.
    #[must_use]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    /// Returns the configured API shape.
    #[must_use]
    pub fn api_mode(&self) -> ApiMode {
        self.api_mode
    }

    /// Returns the Firebase API key, if configured.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    auth_url: Option<String>,
    api_mode: ApiMode,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Sets the backend base URL (e.g. `http://localhost:4000/api/`).
    #[must_use]
    pub fn with_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the auth endpoint base URL.
    ///
    /// Default: same as the base URL. Firebase deployments typically point
    /// this at the token service host.
    #[must_use]
    pub fn with_auth_url<S: Into<String>>(mut self, url: S) -> Self {
        self.auth_url = Some(url.into());
        self
    }

    /// Selects the backend API shape.
    ///
    /// Default: [`ApiMode::Rest`].
    #[must_use]
    pub fn with_api_mode(mut self, mode: ApiMode) -> Self {
        self.api_mode = mode;
        self
    }

    /// Sets the API key sent with auth requests in Firebase mode.
    #[must_use]
    pub fn with_api_key<S: Into<String>>(mut self, key: S) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the request timeout.
    ///
    /// Default: 30 seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No base URL provided, or any URL is invalid
    /// - Timeout is zero
    /// - Firebase mode is selected without an API key
    pub fn build(self) -> Result<ClientConfig> {
        let base_url = self
            .base_url
            .ok_or_else(|| ConfigSnafu { message: "base_url is required" }.build())?;
        let base_url = parse_base_url(&base_url)?;

        let auth_url = match self.auth_url {
            Some(raw) => parse_base_url(&raw)?,
            None => base_url.clone(),
        };

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        ensure!(!timeout.is_zero(), ConfigSnafu { message: "timeout cannot be zero" });

        if self.api_mode == ApiMode::Firebase {
            ensure!(
                self.api_key.as_deref().is_some_and(|k| !k.is_empty()),
                ConfigSnafu { message: "api_key is required in Firebase mode" }
            );
        }

        Ok(ClientConfig {
            base_url,
            auth_url,
            api_mode: self.api_mode,
            api_key: self.api_key,
            timeout,
        })
    }
}

/// Parses a base URL, normalizing the path to end with a slash so that
/// relative endpoint paths join under it rather than replacing it.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| InvalidUrlSnafu { url: raw, message: e.to_string() }.build())?;
    ensure!(
        matches!(url.scheme(), "http" | "https"),
        InvalidUrlSnafu { url: raw, message: "scheme must be http or https" }
    );
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    #[test]
    fn test_minimal_config_defaults() {
        let config =
            ClientConfig::builder().with_base_url("http://localhost:4000/api").build().unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:4000/api/");
        assert_eq!(config.auth_url().as_str(), "http://localhost:4000/api/");
        assert_eq!(config.api_mode(), ApiMode::Rest);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_missing_base_url_rejected() {
        let err = ClientConfig::builder().build().unwrap_err();
        assert!(matches!(err, ClientError::Config { .. }));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = ClientConfig::builder().with_base_url("not a url").build().unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl { .. }));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let err = ClientConfig::builder().with_base_url("ftp://host/api").build().unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl { .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ClientConfig::builder()
            .with_base_url("http://localhost/")
            .with_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::Config { .. }));
    }

    #[test]
    fn test_firebase_requires_api_key() {
        let err = ClientConfig::builder()
            .with_base_url("https://db.example.com/")
            .with_api_mode(ApiMode::Firebase)
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::Config { .. }));

        let config = ClientConfig::builder()
            .with_base_url("https://db.example.com/")
            .with_api_mode(ApiMode::Firebase)
            .with_api_key("key-123")
            .build()
            .unwrap();
        assert_eq!(config.api_key(), Some("key-123"));
    }

    #[test]
    fn test_separate_auth_url() {
        let config = ClientConfig::builder()
            .with_base_url("https://db.example.com/app")
            .with_auth_url("https://auth.example.com/v1")
            .build()
            .unwrap();
        assert_eq!(config.auth_url().as_str(), "https://auth.example.com/v1/");
    }
}
