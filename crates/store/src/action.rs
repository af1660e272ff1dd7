//! Store actions.
//!
//! Every state transition is described by one variant of this tagged union;
//! the reducers match it exhaustively, so adding a variant is a compile
//! error until every slice has decided how to handle it.

use roster_types::{Quality, User, UserId};

/// Top-level action, routed to the owning slice.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Users slice actions.
    Users(UsersAction),
    /// Qualities slice actions.
    Qualities(QualitiesAction),
}

/// Users slice actions: auth lifecycle, list fetch, and entity mutations.
#[derive(Debug, Clone, PartialEq)]
pub enum UsersAction {
    /// A login or registration attempt has started.
    AuthRequested,
    /// A login or registration attempt succeeded.
    AuthSucceeded {
        /// Id of the now-authenticated user.
        user_id: UserId,
    },
    /// A login or registration attempt failed.
    AuthFailed {
        /// User-presentable failure message.
        message: String,
    },
    /// A user-list fetch has started.
    Requested,
    /// A user-list fetch succeeded; the list replaces the stored map
    /// wholesale.
    Received {
        /// Users in server order.
        users: Vec<User>,
    },
    /// A user-list fetch failed.
    RequestFailed {
        /// Failure message.
        message: String,
    },
    /// A user record was created.
    Created {
        /// The created entity.
        user: User,
    },
    /// A profile update has started.
    UpdateRequested,
    /// A profile update succeeded.
    Updated {
        /// The patched entity.
        user: User,
    },
    /// A profile update failed.
    UpdateFailed {
        /// Failure message.
        message: String,
    },
    /// The session ended; auth state and entities reset.
    LoggedOut,
}

/// Qualities slice actions.
#[derive(Debug, Clone, PartialEq)]
pub enum QualitiesAction {
    /// A qualities fetch has started.
    Requested,
    /// A qualities fetch succeeded.
    Received {
        /// Qualities in server order.
        qualities: Vec<Quality>,
        /// When the fetch completed, epoch milliseconds. Drives the
        /// freshness window.
        fetched_at: u64,
    },
    /// A qualities fetch failed.
    RequestFailed {
        /// Failure message.
        message: String,
    },
}
