//! Token-issuing auth endpoints.
//!
//! Sign-in, registration, and refresh against either backend shape. REST
//! mode posts to `auth/*` routes on the configured auth URL; Firebase mode
//! posts to `accounts:*` / `token` with the API key as a query parameter.
//! Both response shapes are normalized into a [`TokenGrant`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::Url;

use crate::{
    config::{ApiMode, ClientConfig},
    error::{DecodeSnafu, InvalidUrlSnafu, Result},
    http::{GENERIC_FAILURE_MESSAGE, read_json_or_error},
    notify::Notifier,
};
use roster_types::{TokenGrant, UserId};

/// Registration payload: credentials plus any initial profile fields.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    /// Login email.
    pub email: String,
    /// Plaintext password, sent over the wire as-is.
    pub password: String,
    /// Initial profile fields forwarded verbatim.
    #[serde(flatten)]
    pub profile: serde_json::Map<String, Value>,
}

impl SignUpRequest {
    /// Creates a credentials-only registration payload.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into(), profile: Default::default() }
    }
}

/// Client for the token-issuing auth endpoints.
///
/// Unlike [`Http`](crate::http::Http), auth calls never attach a session
/// token and never trigger a refresh; the refresh endpoint itself lives here.
pub struct AuthService {
    client: reqwest::Client,
    config: ClientConfig,
    notifier: Arc<dyn Notifier>,
}

impl AuthService {
    pub(crate) fn new(
        client: reqwest::Client,
        config: ClientConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { client, config, notifier }
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// Credential problems surface as `ClientError::Auth` with the backend's
    /// `{code, message}` payload.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<TokenGrant> {
        match self.config.api_mode() {
            ApiMode::Rest => {
                let body = json!({ "email": email, "password": password });
                let value = self.post("auth/signInWithPassword", &body).await?;
                decode_rest_grant(value)
            }
            ApiMode::Firebase => {
                let body = json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                });
                let value = self.post("accounts:signInWithPassword", &body).await?;
                decode_firebase_grant(value)
            }
        }
    }

    /// Registers a new account.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<TokenGrant> {
        match self.config.api_mode() {
            ApiMode::Rest => {
                let value = self.post("auth/signUp", request).await?;
                decode_rest_grant(value)
            }
            ApiMode::Firebase => {
                let body = json!({
                    "email": request.email,
                    "password": request.password,
                    "returnSecureToken": true,
                });
                let value = self.post("accounts:signUp", &body).await?;
                decode_firebase_grant(value)
            }
        }
    }

    /// Exchanges a refresh token for a new token set.
    ///
    /// This is the single refresh attempt the pipeline makes for an expired
    /// session; a failure here rejects the original request.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant> {
        match self.config.api_mode() {
            ApiMode::Rest => {
                let body = json!({ "refreshToken": refresh_token });
                let value = self.post("auth/token", &body).await?;
                decode_rest_grant(value)
            }
            ApiMode::Firebase => {
                let body = json!({
                    "grant_type": "refresh_token",
                    "refresh_token": refresh_token,
                });
                let value = self.post("token", &body).await?;
                decode_firebase_refresh(value)
            }
        }
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let url = join_endpoint(self.config.auth_url(), path)?;

        let mut request = self.client.post(url).json(body);
        if self.config.api_mode() == ApiMode::Firebase {
            if let Some(key) = self.config.api_key() {
                request = request.query(&[("key", key)]);
            }
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => {
                self.notifier.error(GENERIC_FAILURE_MESSAGE);
                return Err(source.into());
            }
        };
        read_json_or_error(response, self.notifier.as_ref()).await
    }
}

/// Joins an endpoint path onto the auth base URL.
///
/// Paths whose first segment contains a colon (`accounts:signUp`) would
/// otherwise parse as an absolute URL with that segment as the scheme, so
/// they are joined as `./`-relative references.
fn join_endpoint(base: &Url, path: &str) -> Result<Url> {
    let relative =
        if path.contains(':') { format!("./{path}") } else { path.to_owned() };
    base.join(&relative)
        .map_err(|e| InvalidUrlSnafu { url: relative, message: e.to_string() }.build())
}

// ============================================================================
// Wire shapes
// ============================================================================

/// Plain REST token response: camelCase, numeric expiry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestTokenResponse {
    access_token: String,
    refresh_token: String,
    user_id: String,
    expires_in: u64,
}

/// Firebase sign-in/sign-up response: camelCase, string expiry, `localId`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirebaseAuthResponse {
    id_token: String,
    refresh_token: String,
    local_id: String,
    expires_in: String,
}

/// Firebase token-refresh response: snake_case, string expiry, `user_id`.
#[derive(Debug, Deserialize)]
struct FirebaseRefreshResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
    expires_in: String,
}

fn decode_rest_grant(value: Value) -> Result<TokenGrant> {
    let raw: RestTokenResponse = serde_json::from_value(value)
        .map_err(|e| DecodeSnafu { message: format!("token response: {e}") }.build())?;
    Ok(TokenGrant {
        access_token: raw.access_token,
        refresh_token: raw.refresh_token,
        expires_in_secs: raw.expires_in,
        user_id: UserId::new(raw.user_id),
    })
}

fn decode_firebase_grant(value: Value) -> Result<TokenGrant> {
    let raw: FirebaseAuthResponse = serde_json::from_value(value)
        .map_err(|e| DecodeSnafu { message: format!("auth response: {e}") }.build())?;
    Ok(TokenGrant {
        access_token: raw.id_token,
        refresh_token: raw.refresh_token,
        expires_in_secs: parse_expires(&raw.expires_in)?,
        user_id: UserId::new(raw.local_id),
    })
}

fn decode_firebase_refresh(value: Value) -> Result<TokenGrant> {
    let raw: FirebaseRefreshResponse = serde_json::from_value(value)
        .map_err(|e| DecodeSnafu { message: format!("refresh response: {e}") }.build())?;
    Ok(TokenGrant {
        access_token: raw.id_token,
        refresh_token: raw.refresh_token,
        expires_in_secs: parse_expires(&raw.expires_in)?,
        user_id: UserId::new(raw.user_id),
    })
}

/// Firebase reports expiry as a decimal string ("3600").
fn parse_expires(raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| DecodeSnafu { message: format!("invalid expiresIn '{raw}'") }.build())
}
