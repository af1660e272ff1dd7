//! Mock directory server for client integration testing.
//!
//! This module provides a controllable HTTP implementation of both backend
//! shapes (plain REST and Firebase-flavored) for testing the pipeline
//! without a real deployment.
//!
//! # Features
//!
//! - **Entity storage**: seed users and qualities for read tests
//! - **Accounts**: sign-in/sign-up with realistic `{code, message}` failures
//! - **Token issuance**: configurable `expiresIn`, refresh endpoint
//! - **Failure injection**: inject 500s for resilience tests
//! - **Request counting**: per-endpoint counters for verification
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> std::io::Result<()> {
//! use roster_client::mock::MockDirectoryServer;
//!
//! let server = MockDirectoryServer::start().await?;
//! server.set_user(serde_json::json!({"id": "u1", "name": "John", "email": "j@d.e"}));
//!
//! // point a DirectoryClient at server.endpoint() ...
//! assert_eq!(server.users_count(), 0);
//! # Ok(())
//! # }
//! ```

use std::{
    collections::{HashMap, HashSet},
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::{Value, json};
use tokio::sync::oneshot;

/// How the request carried its access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCarrier {
    /// `Authorization: Bearer <token>` header (REST mode).
    Bearer(String),
    /// `auth=<token>` query parameter (Firebase mode).
    Query(String),
    /// No token attached.
    None,
}

/// A registered account.
#[derive(Debug, Clone)]
struct Account {
    password: String,
    user_id: String,
}

/// Shared state for the mock server.
#[derive(Debug, Default)]
struct MockState {
    /// User entities keyed by id, in insertion order.
    users: RwLock<IndexMap<String, Value>>,

    /// Quality entities keyed by id, in insertion order.
    qualities: RwLock<IndexMap<String, Value>>,

    /// Accounts keyed by email.
    accounts: RwLock<HashMap<String, Account>>,

    /// Access tokens the server considers valid.
    access_tokens: RwLock<HashSet<String>>,

    /// Refresh tokens the server will exchange.
    refresh_tokens: RwLock<HashSet<String>>,

    /// Expiry (seconds) stamped onto issued grants.
    expires_in: AtomicU64,

    /// Monotonic counter for token and id generation.
    serial: AtomicU64,

    /// Number of 500 responses to inject before serving normally.
    server_errors: AtomicUsize,

    /// Structured auth failure returned by the next auth request.
    auth_error: RwLock<Option<(u16, String)>>,

    /// Reject unauthenticated data requests when set.
    require_auth: AtomicBool,

    /// Total refresh requests received.
    refresh_count: AtomicUsize,

    /// Total user-list requests received.
    users_count: AtomicUsize,

    /// Total quality-list requests received.
    qualities_count: AtomicUsize,

    /// How the most recent data request carried its token.
    last_auth: RwLock<Option<AuthCarrier>>,
}

impl MockState {
    fn next_serial(&self) -> u64 {
        self.serial.fetch_add(1, Ordering::SeqCst)
    }

    fn issue_grant(&self) -> (String, String, u64) {
        let serial = self.next_serial();
        let access = format!("tok-{serial}");
        let refresh = format!("ref-{serial}");
        self.access_tokens.write().insert(access.clone());
        self.refresh_tokens.write().insert(refresh.clone());
        (access, refresh, self.expires_in.load(Ordering::SeqCst))
    }
}

/// Controllable mock server speaking both backend shapes on one port.
pub struct MockDirectoryServer {
    state: Arc<MockState>,
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockDirectoryServer {
    /// Starts the server on an ephemeral local port.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = Arc::new(MockState {
            expires_in: AtomicU64::new(3600),
            ..MockState::default()
        });

        let router = Router::new()
            // REST-shaped routes
            .route("/auth/signInWithPassword", post(rest_sign_in))
            .route("/auth/signUp", post(rest_sign_up))
            .route("/auth/token", post(rest_refresh))
            .route("/user/", get(rest_list_users))
            .route("/quality/", get(rest_list_qualities))
            // Firebase-shaped routes
            .route("/accounts:signInWithPassword", post(firebase_sign_in))
            .route("/accounts:signUp", post(firebase_sign_up))
            .route("/token", post(firebase_refresh))
            .route("/user.json", get(firebase_list_users))
            .route("/quality.json", get(firebase_list_qualities))
            // Item routes shared by both shapes (".json" stripped in handler)
            .route(
                "/user/{id}",
                get(get_user).put(put_user).patch(patch_user).delete(delete_user),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = serve.await {
                tracing::error!(error = %e, "mock server terminated");
            }
        });

        Ok(Self { state, addr, shutdown: Some(shutdown_tx) })
    }

    /// Base URL of the server, with trailing slash.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Seeds (or replaces) a user entity; keyed by its `id` field.
    ///
    /// # Panics
    ///
    /// Panics if the value has no string `id` field.
    pub fn set_user(&self, user: Value) {
        let id = user["id"].as_str().expect("user requires an id").to_owned();
        self.state.users.write().insert(id, user);
    }

    /// Seeds (or replaces) a quality entity; keyed by its `id` field.
    ///
    /// # Panics
    ///
    /// Panics if the value has no string `id` field.
    pub fn set_quality(&self, quality: Value) {
        let id = quality["id"].as_str().expect("quality requires an id").to_owned();
        self.state.qualities.write().insert(id, quality);
    }

    /// Registers an account for sign-in.
    pub fn add_account(&self, email: &str, password: &str, user_id: &str) {
        self.state.accounts.write().insert(
            email.to_owned(),
            Account { password: password.to_owned(), user_id: user_id.to_owned() },
        );
    }

    /// Marks an externally chosen token pair as valid, for tests that seed
    /// a session directly into storage.
    pub fn register_tokens(&self, access: &str, refresh: &str) {
        self.state.access_tokens.write().insert(access.to_owned());
        self.state.refresh_tokens.write().insert(refresh.to_owned());
    }

    /// Sets the expiry (seconds) stamped onto issued grants.
    pub fn set_expires_in(&self, secs: u64) {
        self.state.expires_in.store(secs, Ordering::SeqCst);
    }

    /// Injects `n` 500 responses before the server behaves normally again.
    pub fn inject_server_errors(&self, n: usize) {
        self.state.server_errors.store(n, Ordering::SeqCst);
    }

    /// Makes the next auth request fail with the given `{code, message}`
    /// payload, regardless of credentials.
    pub fn inject_auth_error(&self, code: u16, message: &str) {
        *self.state.auth_error.write() = Some((code, message.to_owned()));
    }

    /// Rejects data requests without a valid token when enabled.
    pub fn set_require_auth(&self, enabled: bool) {
        self.state.require_auth.store(enabled, Ordering::SeqCst);
    }

    /// Total refresh requests received.
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.state.refresh_count.load(Ordering::SeqCst)
    }

    /// Total user-list requests received.
    #[must_use]
    pub fn users_count(&self) -> usize {
        self.state.users_count.load(Ordering::SeqCst)
    }

    /// Total quality-list requests received.
    #[must_use]
    pub fn qualities_count(&self) -> usize {
        self.state.qualities_count.load(Ordering::SeqCst)
    }

    /// How the most recent data request carried its token.
    #[must_use]
    pub fn last_auth(&self) -> Option<AuthCarrier> {
        self.state.last_auth.read().clone()
    }
}

impl Drop for MockDirectoryServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

// ============================================================================
// Response helpers
// ============================================================================

/// Firebase-style structured auth failure.
fn auth_failure(code: u16, message: &str) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(json!({ "error": { "code": code, "message": message } }))).into_response()
}

fn injected_error(state: &MockState) -> Option<Response> {
    let remaining = state.server_errors.load(Ordering::SeqCst);
    if remaining > 0 {
        state.server_errors.store(remaining - 1, Ordering::SeqCst);
        return Some(
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "injected" })))
                .into_response(),
        );
    }
    None
}

/// Records how the request carried its token and enforces `require_auth`.
fn check_auth(
    state: &MockState,
    headers: &HeaderMap,
    query: &HashMap<String, String>,
) -> Result<(), Response> {
    let carrier = if let Some(raw) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        AuthCarrier::Bearer(raw.trim_start_matches("Bearer ").to_owned())
    } else if let Some(token) = query.get("auth") {
        AuthCarrier::Query(token.clone())
    } else {
        AuthCarrier::None
    };
    *state.last_auth.write() = Some(carrier.clone());

    if !state.require_auth.load(Ordering::SeqCst) {
        return Ok(());
    }
    let valid = match &carrier {
        AuthCarrier::Bearer(token) | AuthCarrier::Query(token) => {
            state.access_tokens.read().contains(token)
        }
        AuthCarrier::None => false,
    };
    if valid { Ok(()) } else { Err(auth_failure(401, "CREDENTIAL_MISMATCH")) }
}

// ============================================================================
// Auth handlers
// ============================================================================

fn injected_auth_error(state: &MockState) -> Option<Response> {
    let (code, message) = state.auth_error.write().take()?;
    Some(auth_failure(code, &message))
}

fn read_credentials(body: &Value) -> (String, String) {
    (
        body["email"].as_str().unwrap_or_default().to_owned(),
        body["password"].as_str().unwrap_or_default().to_owned(),
    )
}

fn sign_in_grant(state: &MockState, body: &Value) -> Result<(String, String, u64, String), Response> {
    if let Some(response) = injected_auth_error(state) {
        return Err(response);
    }
    let (email, password) = read_credentials(body);
    let accounts = state.accounts.read();
    let Some(account) = accounts.get(&email) else {
        return Err(auth_failure(400, "EMAIL_NOT_FOUND"));
    };
    if account.password != password {
        return Err(auth_failure(400, "INVALID_PASSWORD"));
    }
    let user_id = account.user_id.clone();
    drop(accounts);
    let (access, refresh, expires) = state.issue_grant();
    Ok((access, refresh, expires, user_id))
}

fn sign_up_grant(state: &MockState, body: &Value) -> Result<(String, String, u64, String), Response> {
    if let Some(response) = injected_auth_error(state) {
        return Err(response);
    }
    let (email, password) = read_credentials(body);
    {
        let accounts = state.accounts.read();
        if accounts.contains_key(&email) {
            return Err(auth_failure(400, "EMAIL_EXISTS"));
        }
    }
    let user_id = format!("u-{}", state.next_serial());
    state
        .accounts
        .write()
        .insert(email, Account { password, user_id: user_id.clone() });
    let (access, refresh, expires) = state.issue_grant();
    Ok((access, refresh, expires, user_id))
}

async fn rest_sign_in(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if let Some(response) = injected_error(&state) {
        return response;
    }
    match sign_in_grant(&state, &body) {
        Ok((access, refresh, expires, user_id)) => Json(json!({
            "accessToken": access,
            "refreshToken": refresh,
            "userId": user_id,
            "expiresIn": expires,
        }))
        .into_response(),
        Err(response) => response,
    }
}

async fn rest_sign_up(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if let Some(response) = injected_error(&state) {
        return response;
    }
    match sign_up_grant(&state, &body) {
        Ok((access, refresh, expires, user_id)) => Json(json!({
            "accessToken": access,
            "refreshToken": refresh,
            "userId": user_id,
            "expiresIn": expires,
        }))
        .into_response(),
        Err(response) => response,
    }
}

async fn firebase_sign_in(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(response) = injected_error(&state) {
        return response;
    }
    match sign_in_grant(&state, &body) {
        Ok((access, refresh, expires, user_id)) => Json(json!({
            "idToken": access,
            "refreshToken": refresh,
            "localId": user_id,
            "expiresIn": expires.to_string(),
        }))
        .into_response(),
        Err(response) => response,
    }
}

async fn firebase_sign_up(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(response) = injected_error(&state) {
        return response;
    }
    match sign_up_grant(&state, &body) {
        Ok((access, refresh, expires, user_id)) => Json(json!({
            "idToken": access,
            "refreshToken": refresh,
            "localId": user_id,
            "expiresIn": expires.to_string(),
        }))
        .into_response(),
        Err(response) => response,
    }
}

fn exchange_refresh(state: &MockState, refresh_token: &str) -> Option<(String, String, u64)> {
    state.refresh_count.fetch_add(1, Ordering::SeqCst);
    if !state.refresh_tokens.read().contains(refresh_token) {
        return None;
    }
    let serial = state.next_serial();
    let access = format!("tok-{serial}");
    let refresh = format!("ref-{serial}");
    state.access_tokens.write().insert(access.clone());
    state.refresh_tokens.write().insert(refresh.clone());
    Some((access, refresh, state.expires_in.load(Ordering::SeqCst)))
}

async fn rest_refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if let Some(response) = injected_error(&state) {
        return response;
    }
    let raw = body["refreshToken"].as_str().unwrap_or_default();
    match exchange_refresh(&state, raw) {
        Some((access, refresh, expires)) => Json(json!({
            "accessToken": access,
            "refreshToken": refresh,
            "userId": "u-refresh",
            "expiresIn": expires,
        }))
        .into_response(),
        None => auth_failure(400, "INVALID_REFRESH_TOKEN"),
    }
}

async fn firebase_refresh(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(response) = injected_error(&state) {
        return response;
    }
    let raw = body["refresh_token"].as_str().unwrap_or_default();
    match exchange_refresh(&state, raw) {
        Some((access, refresh, expires)) => Json(json!({
            "id_token": access,
            "refresh_token": refresh,
            "user_id": "u-refresh",
            "expires_in": expires.to_string(),
        }))
        .into_response(),
        None => auth_failure(400, "INVALID_REFRESH_TOKEN"),
    }
}

// ============================================================================
// Entity handlers
// ============================================================================

async fn rest_list_users(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    list_users(&state, &headers, &query, false)
}

async fn firebase_list_users(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    list_users(&state, &headers, &query, true)
}

fn list_users(
    state: &MockState,
    headers: &HeaderMap,
    query: &HashMap<String, String>,
    keyed: bool,
) -> Response {
    state.users_count.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = injected_error(state) {
        return response;
    }
    if let Err(response) = check_auth(state, headers, query) {
        return response;
    }
    let users = state.users.read();
    if keyed {
        let map: serde_json::Map<String, Value> =
            users.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Json(Value::Object(map)).into_response()
    } else {
        Json(Value::Array(users.values().cloned().collect())).into_response()
    }
}

async fn rest_list_qualities(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    list_qualities(&state, &headers, &query, false)
}

async fn firebase_list_qualities(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    list_qualities(&state, &headers, &query, true)
}

fn list_qualities(
    state: &MockState,
    headers: &HeaderMap,
    query: &HashMap<String, String>,
    keyed: bool,
) -> Response {
    state.qualities_count.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = injected_error(state) {
        return response;
    }
    if let Err(response) = check_auth(state, headers, query) {
        return response;
    }
    let qualities = state.qualities.read();
    if keyed {
        let map: serde_json::Map<String, Value> =
            qualities.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Json(Value::Object(map)).into_response()
    } else {
        Json(Value::Array(qualities.values().cloned().collect())).into_response()
    }
}

/// Item ids arrive as `u1` (REST) or `u1.json` (Firebase).
fn entity_id(raw: &str) -> &str {
    raw.strip_suffix(".json").unwrap_or(raw)
}

async fn get_user(
    State(state): State<Arc<MockState>>,
    Path(raw_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Some(response) = injected_error(&state) {
        return response;
    }
    if let Err(response) = check_auth(&state, &headers, &query) {
        return response;
    }
    match state.users.read().get(entity_id(&raw_id)) {
        Some(user) => Json(user.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "user not found" })))
            .into_response(),
    }
}

async fn put_user(
    State(state): State<Arc<MockState>>,
    Path(raw_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(response) = injected_error(&state) {
        return response;
    }
    if let Err(response) = check_auth(&state, &headers, &query) {
        return response;
    }
    state.users.write().insert(entity_id(&raw_id).to_owned(), body.clone());
    Json(body).into_response()
}

async fn patch_user(
    State(state): State<Arc<MockState>>,
    Path(raw_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Response {
    if let Some(response) = injected_error(&state) {
        return response;
    }
    if let Err(response) = check_auth(&state, &headers, &query) {
        return response;
    }
    let id = entity_id(&raw_id).to_owned();
    let mut users = state.users.write();
    let Some(existing) = users.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "user not found" })))
            .into_response();
    };
    if let (Some(target), Some(changes)) = (existing.as_object_mut(), patch.as_object()) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(existing.clone()).into_response()
}

async fn delete_user(
    State(state): State<Arc<MockState>>,
    Path(raw_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Some(response) = injected_error(&state) {
        return response;
    }
    if let Err(response) = check_auth(&state, &headers, &query) {
        return response;
    }
    state.users.write().shift_remove(entity_id(&raw_id));
    Json(Value::Null).into_response()
}
