//! The state snapshot and root reducer.

use crate::{
    action::Action,
    qualities::{QualitiesState, reduce_qualities},
    users::{UsersState, reduce_users},
};

/// Immutable snapshot of the whole store.
///
/// Reducers never mutate a snapshot in place; [`reduce`] derives the next
/// snapshot from the previous one, and consumers hold cheap `Arc` clones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct State {
    /// Users slice.
    pub users: UsersState,
    /// Qualities slice.
    pub qualities: QualitiesState,
}

/// Root reducer: pure derivation of the next snapshot.
#[must_use]
pub fn reduce(state: &State, action: Action) -> State {
    match action {
        Action::Users(action) => State {
            users: reduce_users(&state.users, action),
            qualities: state.qualities.clone(),
        },
        Action::Qualities(action) => State {
            users: state.users.clone(),
            qualities: reduce_qualities(&state.qualities, action),
        },
    }
}
