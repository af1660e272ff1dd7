//! Users slice: state, reducer, and selectors.

use indexmap::IndexMap;
use roster_types::{User, UserId};

use crate::{action::UsersAction, state::State};

/// State of the users slice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UsersState {
    /// Loaded users keyed by id, in server order. `None` until the first
    /// successful fetch.
    pub entities: Option<IndexMap<UserId, User>>,

    /// A fetch or update is in flight.
    pub is_loading: bool,

    /// Last failure message, if any.
    pub error: Option<String>,

    /// Id of the authenticated user.
    pub auth_user_id: Option<UserId>,

    /// Whether a session is active.
    pub is_logged_in: bool,

    /// Whether the user list has been loaded at least once.
    pub data_loaded: bool,
}

impl UsersState {
    /// Initial state when a persisted session was found: logged in, with the
    /// user list load already pending.
    #[must_use]
    pub fn hydrated(user_id: UserId) -> Self {
        Self {
            is_loading: true,
            auth_user_id: Some(user_id),
            is_logged_in: true,
            ..Self::default()
        }
    }
}

/// Users reducer.
#[must_use]
pub fn reduce_users(state: &UsersState, action: UsersAction) -> UsersState {
    let mut next = state.clone();
    match action {
        UsersAction::AuthRequested => {
            next.error = None;
        }
        UsersAction::AuthSucceeded { user_id } => {
            next.auth_user_id = Some(user_id);
            next.is_logged_in = true;
        }
        UsersAction::AuthFailed { message } => {
            next.error = Some(message);
        }
        UsersAction::Requested => {
            next.is_loading = true;
        }
        UsersAction::Received { users } => {
            next.entities = Some(index_users(users));
            next.is_loading = false;
            next.data_loaded = true;
        }
        UsersAction::RequestFailed { message } => {
            next.error = Some(message);
            next.is_loading = false;
        }
        UsersAction::Created { user } => {
            next.entities
                .get_or_insert_with(IndexMap::new)
                .insert(user.id.clone(), user);
        }
        UsersAction::UpdateRequested => {
            next.is_loading = true;
        }
        UsersAction::Updated { user } => {
            if let Some(entities) = &mut next.entities {
                if let Some(entry) = entities.get_mut(&user.id) {
                    *entry = user;
                }
            }
            next.is_loading = false;
        }
        UsersAction::UpdateFailed { message } => {
            next.is_loading = false;
            next.error = Some(message);
        }
        UsersAction::LoggedOut => {
            next.entities = None;
            next.auth_user_id = None;
            next.is_logged_in = false;
            next.data_loaded = false;
        }
    }
    next
}

fn index_users(users: Vec<User>) -> IndexMap<UserId, User> {
    users.into_iter().map(|user| (user.id.clone(), user)).collect()
}

// ============================================================================
// Selectors
// ============================================================================

impl State {
    /// Loaded users in server order, if the list has been fetched.
    #[must_use]
    pub fn users(&self) -> Option<&IndexMap<UserId, User>> {
        self.users.entities.as_ref()
    }

    /// Looks up a user by id.
    #[must_use]
    pub fn user_by_id(&self, id: &UserId) -> Option<&User> {
        self.users.entities.as_ref()?.get(id)
    }

    /// The authenticated user's entity, once the list containing it loads.
    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.user_by_id(self.users.auth_user_id.as_ref()?)
    }

    /// Id of the authenticated user.
    #[must_use]
    pub fn current_user_id(&self) -> Option<&UserId> {
        self.users.auth_user_id.as_ref()
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.users.is_logged_in
    }

    /// Whether a users fetch or update is in flight.
    #[must_use]
    pub fn users_loading(&self) -> bool {
        self.users.is_loading
    }

    /// Whether the user list has loaded at least once.
    #[must_use]
    pub fn users_loaded(&self) -> bool {
        self.users.data_loaded
    }

    /// Last auth or fetch failure message.
    #[must_use]
    pub fn auth_error(&self) -> Option<&str> {
        self.users.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn user(id: &str, name: &str) -> User {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "email": format!("{id}@example.com"),
        }))
        .unwrap()
    }

    #[test]
    fn test_received_replaces_wholesale_and_marks_loaded() {
        let loading = reduce_users(&UsersState::default(), UsersAction::Requested);
        assert!(loading.is_loading);

        let state = reduce_users(
            &loading,
            UsersAction::Received { users: vec![user("u1", "A"), user("u2", "B")] },
        );
        assert!(!state.is_loading);
        assert!(state.data_loaded);
        let entities = state.entities.as_ref().unwrap();
        assert_eq!(entities.len(), 2);
        // Server order preserved.
        assert_eq!(entities.keys().next().unwrap().as_str(), "u1");

        let replaced =
            reduce_users(&state, UsersAction::Received { users: vec![user("u3", "C")] });
        assert_eq!(replaced.entities.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_auth_requested_clears_previous_error() {
        let failed = reduce_users(
            &UsersState::default(),
            UsersAction::AuthFailed { message: "bad".to_owned() },
        );
        assert_eq!(failed.error.as_deref(), Some("bad"));

        let retried = reduce_users(&failed, UsersAction::AuthRequested);
        assert_eq!(retried.error, None);
    }

    #[test]
    fn test_auth_succeeded_sets_login_state() {
        let state = reduce_users(
            &UsersState::default(),
            UsersAction::AuthSucceeded { user_id: UserId::new("u1") },
        );
        assert!(state.is_logged_in);
        assert_eq!(state.auth_user_id.as_ref().unwrap().as_str(), "u1");
    }

    #[test]
    fn test_created_inserts_even_before_first_fetch() {
        let state =
            reduce_users(&UsersState::default(), UsersAction::Created { user: user("u9", "N") });
        assert_eq!(state.entities.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_updated_patches_single_entry() {
        let base = reduce_users(
            &UsersState::default(),
            UsersAction::Received { users: vec![user("u1", "A"), user("u2", "B")] },
        );
        let state = reduce_users(&base, UsersAction::Updated { user: user("u2", "B2") });
        let entities = state.entities.as_ref().unwrap();
        assert_eq!(entities[&UserId::new("u2")].name, "B2");
        assert_eq!(entities[&UserId::new("u1")].name, "A");
        assert!(!state.is_loading);
    }

    #[test]
    fn test_logged_out_resets_everything() {
        let mut base = UsersState::hydrated(UserId::new("u1"));
        base.entities = Some(IndexMap::from([(UserId::new("u1"), user("u1", "A"))]));
        base.data_loaded = true;

        let state = reduce_users(&base, UsersAction::LoggedOut);
        assert_eq!(state.entities, None);
        assert_eq!(state.auth_user_id, None);
        assert!(!state.is_logged_in);
        assert!(!state.data_loaded);
    }

    #[test]
    fn test_current_user_selector() {
        let mut state = State::default();
        state.users = reduce_users(
            &UsersState::hydrated(UserId::new("u2")),
            UsersAction::Received { users: vec![user("u1", "A"), user("u2", "B")] },
        );
        assert_eq!(state.current_user().unwrap().name, "B");
        assert!(state.is_logged_in());
    }

    #[test]
    fn test_current_user_none_before_load() {
        let mut state = State::default();
        state.users = UsersState::hydrated(UserId::new("u2"));
        assert_eq!(state.current_user(), None);
    }
}
