//! Authenticated HTTP pipeline.
//!
//! Every outgoing request passes through three steps, mirroring the classic
//! interceptor chain:
//!
//! 1. **Request**: if the stored access token has expired, perform exactly one
//!    blocking refresh call and persist the new token set, then attach the
//!    token (bearer header in REST mode, `auth` query parameter in Firebase
//!    mode, where the path also gains a `.json` suffix).
//! 2. **Response**: successful payloads are normalized into an
//!    [`Envelope`]`{ content }`; Firebase-mode id-keyed collections are first
//!    flattened into an ordered list.
//! 3. **Error**: HTTP 4xx surfaces to the caller unmodified; 5xx and
//!    transport failures notify the user generically and reject.

use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use crate::{
    auth::AuthService,
    config::{ApiMode, ClientConfig},
    error::{
        ApiSnafu, AuthSnafu, DecodeSnafu, InvalidUrlSnafu, Result, ServerSnafu, TransportSnafu,
    },
    notify::Notifier,
    session::SessionStore,
};
use roster_types::{AuthApiError, Session};
use snafu::ResultExt;

/// Notification shown for unexpected (non-4xx) failures.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Try again later";

/// Current wall-clock time as epoch milliseconds.
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Uniform envelope wrapping every successful response payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    /// The normalized payload.
    pub content: T,
}

/// Authenticated HTTP client for directory endpoints.
pub struct Http {
    client: reqwest::Client,
    config: ClientConfig,
    session: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    auth: AuthService,
}

impl Http {
    /// Creates the pipeline over a fresh connection pool.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(
        config: ClientConfig,
        session: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let client =
            reqwest::Client::builder().timeout(config.timeout()).build().context(TransportSnafu)?;
        let auth = AuthService::new(client.clone(), config.clone(), notifier.clone());
        Ok(Self { client, config, session, notifier, auth })
    }

    /// Returns the token-issuing auth service sharing this pipeline's
    /// connection pool and notifier.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// `GET` a resource.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>> {
        self.request(Method::GET, path, None).await
    }

    /// `POST` a resource.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(to_body(body)?)).await
    }

    /// `PUT` a resource.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(to_body(body)?)).await
    }

    /// `PATCH` a resource.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(to_body(body)?)).await
    }

    /// `DELETE` a resource.
    pub async fn delete(&self, path: &str) -> Result<Envelope<Value>> {
        self.request(Method::DELETE, path, None).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Envelope<T>> {
        let value = self.send(method, path, body).await?;
        let content = serde_json::from_value(value)
            .map_err(|e| DecodeSnafu { message: e.to_string() }.build())?;
        Ok(Envelope { content })
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let session = self.fresh_session().await?;
        let url = self.endpoint_url(path)?;

        tracing::debug!(%method, %url, authenticated = session.is_some(), "sending request");

        let mut request = self.client.request(method, url);
        if let Some(session) = &session {
            request = match self.config.api_mode() {
                ApiMode::Rest => request.bearer_auth(&session.access_token),
                ApiMode::Firebase => request.query(&[("auth", session.access_token.as_str())]),
            };
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => {
                self.notifier.error(GENERIC_FAILURE_MESSAGE);
                return Err(source.into());
            }
        };

        let value = read_json_or_error(response, self.notifier.as_ref()).await?;
        Ok(match self.config.api_mode() {
            ApiMode::Firebase => flatten_keyed_collection(value),
            ApiMode::Rest => value,
        })
    }

    /// Loads the stored session, refreshing it first if the access token has
    /// expired. At most one refresh call is made; a refresh failure rejects
    /// the whole request.
    async fn fresh_session(&self) -> Result<Option<Session>> {
        let Some(session) = self.session.load().await? else {
            return Ok(None);
        };
        if session.refresh_token.is_empty() || !session.is_expired(now_ms()) {
            return Ok(Some(session));
        }

        tracing::debug!(user_id = %session.user_id, "access token expired, refreshing");
        let grant = self.auth.refresh(&session.refresh_token).await?;
        let renewed = Session::from_grant(&grant, now_ms());
        self.session.store(&renewed).await?;
        Ok(Some(renewed))
    }

    fn endpoint_url(&self, path: &str) -> Result<Url> {
        let effective = match self.config.api_mode() {
            ApiMode::Rest => path.to_owned(),
            ApiMode::Firebase => firebase_path(path),
        };
        self.config
            .base_url()
            .join(&effective)
            .map_err(|e| InvalidUrlSnafu { url: effective, message: e.to_string() }.build())
    }
}

/// Rewrites an endpoint path for Firebase mode: trailing slash stripped,
/// `.json` suffix appended.
fn firebase_path(path: &str) -> String {
    format!("{}.json", path.trim_end_matches('/'))
}

/// Flattens a Firebase id-keyed collection into an ordered list of values.
///
/// A payload is treated as a collection only when it is a non-empty JSON
/// object with no `id` field whose values are all objects. Single entities
/// (which carry `id`), arrays, and scalars pass through unchanged.
fn flatten_keyed_collection(value: Value) -> Value {
    match value {
        Value::Object(map)
            if !map.is_empty()
                && !map.contains_key("id")
                && map.values().all(Value::is_object) =>
        {
            Value::Array(map.into_iter().map(|(_, entry)| entry).collect())
        }
        other => other,
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| DecodeSnafu { message: e.to_string() }.build())
}

/// Decodes a successful response body, or classifies the failure.
///
/// 4xx responses surface to the caller: a structured `{error: {code,
/// message}}` body becomes [`ClientError::Auth`], anything else
/// [`ClientError::Api`]. All other failures notify the user generically.
///
/// [`ClientError::Auth`]: crate::error::ClientError::Auth
/// [`ClientError::Api`]: crate::error::ClientError::Api
pub(crate) async fn read_json_or_error(
    response: reqwest::Response,
    notifier: &dyn Notifier,
) -> Result<Value> {
    let status = response.status();

    if status.is_success() {
        return match response.json().await {
            Ok(value) => Ok(value),
            Err(source) => {
                notifier.error(GENERIC_FAILURE_MESSAGE);
                Err(source.into())
            }
        };
    }

    let code = status.as_u16();
    if status.is_client_error() {
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if let Some(parsed) = body
            .get("error")
            .and_then(|e| serde_json::from_value::<AuthApiError>(e.clone()).ok())
        {
            return AuthSnafu { code: parsed.code, message: parsed.message }.fail();
        }
        let message = match body {
            Value::Null => status.canonical_reason().unwrap_or("client error").to_owned(),
            Value::String(text) => text,
            other => other.to_string(),
        };
        return ApiSnafu { status: code, message }.fail();
    }

    tracing::error!(status = code, "unexpected server error");
    notifier.error(GENERIC_FAILURE_MESSAGE);
    ServerSnafu { status: code }.fail()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_firebase_path_strips_slash_and_appends_suffix() {
        assert_eq!(firebase_path("user/"), "user.json");
        assert_eq!(firebase_path("user/abc"), "user/abc.json");
        assert_eq!(firebase_path("quality/"), "quality.json");
    }

    #[test]
    fn test_flatten_keyed_collection_preserves_order() {
        let value = json!({
            "b": {"id": "b", "name": "second"},
            "a": {"id": "a", "name": "first"}
        });
        let flat = flatten_keyed_collection(value);
        // serde_json preserves insertion order, so "b" stays first.
        assert_eq!(
            flat,
            json!([{"id": "b", "name": "second"}, {"id": "a", "name": "first"}])
        );
    }

    #[test]
    fn test_flatten_passes_entity_with_id_through() {
        let entity = json!({"id": "u1", "name": "John", "settings": {"theme": "dark"}});
        assert_eq!(flatten_keyed_collection(entity.clone()), entity);
    }

    #[test]
    fn test_flatten_passes_entity_with_scalar_fields_through() {
        // An entity without `id` is still not a collection as soon as any
        // value is a non-object.
        let entity = json!({"name": "John", "settings": {"theme": "dark"}});
        assert_eq!(flatten_keyed_collection(entity.clone()), entity);
    }

    #[test]
    fn test_flatten_passes_arrays_and_scalars_through() {
        let array = json!([{"id": "a"}]);
        assert_eq!(flatten_keyed_collection(array.clone()), array);
        assert_eq!(flatten_keyed_collection(json!(null)), json!(null));
        assert_eq!(flatten_keyed_collection(json!("ok")), json!("ok"));
    }

    #[test]
    fn test_flatten_passes_empty_object_through() {
        assert_eq!(flatten_keyed_collection(json!({})), json!({}));
    }
}
