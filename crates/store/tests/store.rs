//! Integration tests for the store thunks against the mock directory server.
//!
//! Each test builds a real [`Store`] wired to a [`MockDirectoryServer`]
//! through the client crate, with recording doubles for session storage,
//! notifications, and navigation.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{sync::Arc, time::Duration};

use roster_client::{
    ApiMode, ClientConfig, DirectoryClient, MemorySessionStore, RecordingNotifier, Session,
    SessionStore, mock::MockDirectoryServer, now_ms,
};
use roster_store::{
    QualityId, RecordingNavigator, SignUpRequest, Store, StoreConfig, UserId,
};
use serde_json::json;

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    server: MockDirectoryServer,
    store: Store,
    session: Arc<MemorySessionStore>,
    navigator: Arc<RecordingNavigator>,
}

async fn harness_with(config: StoreConfig, seeded: Option<Session>) -> Harness {
    let _ = tracing_subscriber::fmt().with_env_filter("info").with_test_writer().try_init();

    let server = MockDirectoryServer::start().await.expect("mock server");
    let client_config = ClientConfig::builder()
        .with_base_url(server.endpoint())
        .with_api_mode(ApiMode::Rest)
        .with_timeout(Duration::from_secs(5))
        .build()
        .expect("valid config");

    let session = Arc::new(MemorySessionStore::new());
    if let Some(seed) = seeded {
        server.register_tokens(&seed.access_token, &seed.refresh_token);
        session.store(&seed).await.unwrap();
    }

    let notifier = Arc::new(RecordingNotifier::new());
    let client = Arc::new(
        DirectoryClient::new(client_config, session.clone(), notifier).expect("client creation"),
    );
    let navigator = Arc::new(RecordingNavigator::new());
    let store = Store::hydrate(client, navigator.clone(), config).await.expect("hydration");

    Harness { server, store, session, navigator }
}

async fn harness() -> Harness {
    harness_with(StoreConfig::default(), None).await
}

fn valid_session(user_id: &str) -> Session {
    Session {
        access_token: "tok-seed".to_owned(),
        refresh_token: "ref-seed".to_owned(),
        expires_at: now_ms() + 60_000,
        user_id: UserId::new(user_id),
    }
}

fn sample_user(id: &str, name: &str) -> serde_json::Value {
    json!({ "id": id, "name": name, "email": format!("{id}@example.com") })
}

// ============================================================================
// Hydration
// ============================================================================

#[tokio::test]
async fn test_hydrates_logged_in_from_persisted_session() {
    let h = harness_with(StoreConfig::default(), Some(valid_session("u1"))).await;

    let state = h.store.state();
    assert!(state.is_logged_in());
    assert_eq!(state.current_user_id().map(UserId::as_str), Some("u1"));
    // The profile itself is not loaded until the users thunk runs.
    assert!(state.current_user().is_none());
}

#[tokio::test]
async fn test_hydrates_anonymous_without_session() {
    let h = harness().await;

    let state = h.store.state();
    assert!(!state.is_logged_in());
    assert!(state.current_user_id().is_none());
}

// ============================================================================
// Auth thunks
// ============================================================================

#[tokio::test]
async fn test_log_in_persists_session_and_navigates() {
    let h = harness().await;
    h.server.add_account("john@example.com", "secret", "u1");

    h.store.log_in("john@example.com", "secret", "/dashboard").await;

    let state = h.store.state();
    assert!(state.is_logged_in());
    assert_eq!(state.current_user_id().map(UserId::as_str), Some("u1"));
    assert!(state.auth_error().is_none());

    let stored = h.session.load().await.unwrap().expect("session persisted");
    assert_eq!(stored.user_id.as_str(), "u1");
    assert!(!stored.is_expired(now_ms()));

    assert_eq!(h.navigator.paths(), vec!["/dashboard".to_owned()]);
}

#[tokio::test]
async fn test_log_in_wrong_password_stores_friendly_message() {
    let h = harness().await;
    h.server.add_account("john@example.com", "secret", "u1");

    h.store.log_in("john@example.com", "wrong", "/dashboard").await;

    let state = h.store.state();
    assert!(!state.is_logged_in());
    assert_eq!(state.auth_error(), Some("Email or password is incorrect"));
    assert!(h.session.load().await.unwrap().is_none());
    assert!(h.navigator.paths().is_empty());
}

#[tokio::test]
async fn test_sign_up_duplicate_email_stores_friendly_message() {
    let h = harness().await;
    h.server.add_account("taken@example.com", "secret", "u1");

    h.store.sign_up(SignUpRequest::new("taken@example.com", "other")).await;

    let state = h.store.state();
    assert!(!state.is_logged_in());
    assert_eq!(state.auth_error(), Some("A user with this email already exists"));
}

#[tokio::test]
async fn test_sign_up_success_navigates_to_users() {
    let h = harness().await;

    h.store.sign_up(SignUpRequest::new("new@example.com", "secret")).await;

    let state = h.store.state();
    assert!(state.is_logged_in());
    assert!(h.session.load().await.unwrap().is_some());
    assert_eq!(h.navigator.paths(), vec!["/users".to_owned()]);
}

#[tokio::test]
async fn test_log_out_clears_session_and_state() {
    let h = harness_with(StoreConfig::default(), Some(valid_session("u1"))).await;
    h.server.set_user(sample_user("u1", "John"));
    h.store.load_users().await;
    assert!(h.store.state().users().is_some());

    h.store.log_out().await;

    let state = h.store.state();
    assert!(!state.is_logged_in());
    assert!(state.current_user_id().is_none());
    assert!(state.users().is_none());
    assert!(h.session.load().await.unwrap().is_none());
    assert_eq!(h.navigator.paths(), vec!["/".to_owned()]);
}

// ============================================================================
// Users thunks
// ============================================================================

#[tokio::test]
async fn test_load_users_populates_entities() {
    let h = harness_with(StoreConfig::default(), Some(valid_session("u2"))).await;
    h.server.set_user(sample_user("u1", "John"));
    h.server.set_user(sample_user("u2", "Jane"));

    h.store.load_users().await;

    let state = h.store.state();
    assert!(state.users_loaded());
    assert!(!state.users_loading());
    assert_eq!(state.users().unwrap().len(), 2);
    assert_eq!(state.current_user().unwrap().name, "Jane");
    assert_eq!(state.user_by_id(&UserId::new("u1")).unwrap().name, "John");
}

#[tokio::test]
async fn test_load_users_failure_records_error() {
    let h = harness().await;
    h.server.inject_server_errors(1);

    h.store.load_users().await;

    let state = h.store.state();
    assert!(!state.users_loading());
    assert!(!state.users_loaded());
    assert!(state.users.error.is_some());
}

#[tokio::test]
async fn test_update_user_patches_entity_and_navigates() {
    let h = harness_with(StoreConfig::default(), Some(valid_session("u1"))).await;
    h.server.set_user(sample_user("u1", "John"));
    h.store.load_users().await;

    h.store.update_user(json!({ "name": "Johnny" })).await;

    let state = h.store.state();
    let user = state.current_user().expect("current user loaded");
    assert_eq!(user.name, "Johnny");
    assert_eq!(user.email, "u1@example.com");
    assert_eq!(h.navigator.paths(), vec!["/users/u1".to_owned()]);
}

#[tokio::test]
async fn test_update_user_without_auth_fails_locally() {
    let h = harness().await;

    h.store.update_user(json!({ "name": "Nobody" })).await;

    let state = h.store.state();
    assert_eq!(state.users.error.as_deref(), Some("not authenticated"));
    assert_eq!(h.server.users_count(), 0);
    assert!(h.navigator.paths().is_empty());
}

// ============================================================================
// Qualities thunks
// ============================================================================

#[tokio::test]
async fn test_load_qualities_populates_entities() {
    let h = harness().await;
    h.server.set_quality(json!({ "id": "q1", "name": "Honest", "color": "primary" }));

    h.store.load_qualities().await;

    let state = h.store.state();
    assert!(!state.qualities_loading());
    let loaded = state.qualities().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(state.quality_by_id(&QualityId::new("q1")).unwrap().name, "Honest");
}

#[tokio::test]
async fn test_load_qualities_skips_fetch_inside_freshness_window() {
    let config = StoreConfig::new().with_freshness_window(Duration::from_millis(300));
    let h = harness_with(config, None).await;
    h.server.set_quality(json!({ "id": "q1", "name": "Honest", "color": "primary" }));

    h.store.load_qualities().await;
    h.store.load_qualities().await;
    assert_eq!(h.server.qualities_count(), 1);

    tokio::time::sleep(Duration::from_millis(350)).await;
    h.store.load_qualities().await;
    assert_eq!(h.server.qualities_count(), 2);
}

#[tokio::test]
async fn test_load_qualities_failure_leaves_cache_stale() {
    let h = harness().await;
    h.server.inject_server_errors(1);

    h.store.load_qualities().await;
    let state = h.store.state();
    assert!(state.qualities.error.is_some());
    assert!(state.qualities().is_none());

    // A failed fetch never counts as fresh, so the next load retries.
    h.server.set_quality(json!({ "id": "q1", "name": "Honest", "color": "primary" }));
    h.store.load_qualities().await;
    assert_eq!(h.store.state().qualities().unwrap().len(), 1);
}
