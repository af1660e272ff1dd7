//! The store container and its async action creators (thunks).
//!
//! Each thunk follows the same shape: dispatch the "requested" action
//! strictly before the network call, await it, then dispatch the terminal
//! "received"/"failed" action strictly after it resolves. Errors are stored
//! in state, never rethrown; in-flight calls cannot be cancelled.

use std::sync::Arc;

use parking_lot::RwLock;
use roster_client::{ClientError, DirectoryClient, SignUpRequest, now_ms};
use roster_types::{Session, User, friendly_auth_message};
use serde_json::Value;

use crate::{
    action::{Action, QualitiesAction, UsersAction},
    config::StoreConfig,
    navigate::Navigator,
    state::{State, reduce},
    users::UsersState,
};

/// Explicit state container over the directory client.
///
/// Holds the current immutable [`State`] snapshot; [`dispatch`](Self::dispatch)
/// derives the next snapshot through the pure root reducer. All side effects
/// (network, session storage, navigation) live in the thunks.
pub struct Store {
    state: RwLock<Arc<State>>,
    client: Arc<DirectoryClient>,
    navigator: Arc<dyn Navigator>,
    config: StoreConfig,
}

impl Store {
    /// Builds the store, hydrating auth state from session storage.
    ///
    /// A persisted session implies `is_logged_in` in the initial snapshot;
    /// absence implies anonymous state.
    ///
    /// # Errors
    ///
    /// Returns an error if session storage cannot be read.
    pub async fn hydrate(
        client: Arc<DirectoryClient>,
        navigator: Arc<dyn Navigator>,
        config: StoreConfig,
    ) -> roster_client::Result<Self> {
        let users = match client.session_store().load().await? {
            Some(session) => UsersState::hydrated(session.user_id),
            None => UsersState::default(),
        };
        let state = State { users, ..State::default() };
        Ok(Self { state: RwLock::new(Arc::new(state)), client, navigator, config })
    }

    /// Returns the current state snapshot.
    #[must_use]
    pub fn state(&self) -> Arc<State> {
        self.state.read().clone()
    }

    /// Applies an action through the root reducer.
    pub fn dispatch(&self, action: Action) {
        let mut guard = self.state.write();
        let next = reduce(guard.as_ref(), action);
        *guard = Arc::new(next);
    }

    // ========================================================================
    // Users thunks
    // ========================================================================

    /// Signs in and, on success, persists the session and navigates to
    /// `redirect`.
    ///
    /// Credential failures (backend code 400) are stored as human-readable
    /// text; other failures store their display string.
    pub async fn log_in(&self, email: &str, password: &str, redirect: &str) {
        self.dispatch(Action::Users(UsersAction::AuthRequested));
        match self.client.auth().sign_in(email, password).await {
            Ok(grant) => {
                let session = Session::from_grant(&grant, now_ms());
                if let Err(err) = self.client.session_store().store(&session).await {
                    self.dispatch(Action::Users(UsersAction::AuthFailed {
                        message: err.to_string(),
                    }));
                    return;
                }
                self.dispatch(Action::Users(UsersAction::AuthSucceeded {
                    user_id: session.user_id,
                }));
                self.navigator.push(redirect);
            }
            Err(err) => {
                self.dispatch(Action::Users(UsersAction::AuthFailed {
                    message: auth_failure_message(&err),
                }));
            }
        }
    }

    /// Registers a new account and, on success, persists the session and
    /// navigates to `/users`.
    pub async fn sign_up(&self, request: SignUpRequest) {
        self.dispatch(Action::Users(UsersAction::AuthRequested));
        match self.client.auth().sign_up(&request).await {
            Ok(grant) => {
                let session = Session::from_grant(&grant, now_ms());
                if let Err(err) = self.client.session_store().store(&session).await {
                    self.dispatch(Action::Users(UsersAction::AuthFailed {
                        message: err.to_string(),
                    }));
                    return;
                }
                self.dispatch(Action::Users(UsersAction::AuthSucceeded {
                    user_id: session.user_id,
                }));
                self.navigator.push("/users");
            }
            Err(err) => {
                self.dispatch(Action::Users(UsersAction::AuthFailed {
                    message: auth_failure_message(&err),
                }));
            }
        }
    }

    /// Ends the session: clears storage, resets auth state, navigates to `/`.
    pub async fn log_out(&self) {
        if let Err(err) = self.client.session_store().clear().await {
            tracing::warn!(error = %err, "failed to clear session storage");
        }
        self.dispatch(Action::Users(UsersAction::LoggedOut));
        self.navigator.push("/");
    }

    /// Fetches the user list, replacing the stored map wholesale.
    pub async fn load_users(&self) {
        self.dispatch(Action::Users(UsersAction::Requested));
        match self.client.users().fetch_all().await {
            Ok(users) => {
                self.dispatch(Action::Users(UsersAction::Received { users }));
            }
            Err(err) => {
                self.dispatch(Action::Users(UsersAction::RequestFailed {
                    message: err.to_string(),
                }));
            }
        }
    }

    /// Creates a user record and patches it into state.
    pub async fn create_user(&self, user: User) {
        match self.client.users().create(&user).await {
            Ok(created) => {
                self.dispatch(Action::Users(UsersAction::Created { user: created }));
            }
            Err(err) => {
                self.dispatch(Action::Users(UsersAction::RequestFailed {
                    message: err.to_string(),
                }));
            }
        }
    }

    /// Applies a partial update to the authenticated user's profile and, on
    /// success, navigates to the profile page.
    pub async fn update_user(&self, patch: Value) {
        let Some(user_id) = self.state().current_user_id().cloned() else {
            self.dispatch(Action::Users(UsersAction::UpdateFailed {
                message: "not authenticated".to_owned(),
            }));
            return;
        };
        self.dispatch(Action::Users(UsersAction::UpdateRequested));
        match self.client.users().update(&user_id, &patch).await {
            Ok(user) => {
                let path = format!("/users/{}", user.id.as_str());
                self.dispatch(Action::Users(UsersAction::Updated { user }));
                self.navigator.push(&path);
            }
            Err(err) => {
                self.dispatch(Action::Users(UsersAction::UpdateFailed {
                    message: err.to_string(),
                }));
            }
        }
    }

    // ========================================================================
    // Qualities thunks
    // ========================================================================

    /// Fetches the quality list unless the cache is still inside the
    /// freshness window, in which case nothing is dispatched and no network
    /// call is made.
    pub async fn load_qualities(&self) {
        if self.state().qualities.is_fresh(now_ms(), self.config.freshness_window()) {
            tracing::debug!("qualities cache fresh, skipping fetch");
            return;
        }
        self.dispatch(Action::Qualities(QualitiesAction::Requested));
        match self.client.qualities().fetch_all().await {
            Ok(qualities) => {
                self.dispatch(Action::Qualities(QualitiesAction::Received {
                    qualities,
                    fetched_at: now_ms(),
                }));
            }
            Err(err) => {
                self.dispatch(Action::Qualities(QualitiesAction::RequestFailed {
                    message: err.to_string(),
                }));
            }
        }
    }
}

/// Maps an auth failure to the message stored in state: backend code 400
/// becomes human-readable text, everything else keeps its display string.
fn auth_failure_message(err: &ClientError) -> String {
    match err {
        ClientError::Auth { code: 400, message } => friendly_auth_message(message),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_400_maps_to_friendly_text() {
        let err = ClientError::Auth { code: 400, message: "INVALID_PASSWORD".to_owned() };
        assert_eq!(auth_failure_message(&err), "Email or password is incorrect");
    }

    #[test]
    fn test_other_codes_keep_display_string() {
        let err = ClientError::Auth { code: 403, message: "USER_DISABLED".to_owned() };
        assert_eq!(auth_failure_message(&err), err.to_string());

        let err = ClientError::Server { status: 503 };
        assert_eq!(auth_failure_message(&err), err.to_string());
    }
}
