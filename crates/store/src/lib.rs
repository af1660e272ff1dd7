//! Redux-style state store for the Roster user-directory client.
//!
//! The store holds an immutable [`State`] snapshot per slice (users,
//! qualities), derives the next snapshot through pure reducers over a
//! tagged union of [`Action`]s, and exposes async thunks that talk to the
//! backend through [`roster_client`] and record outcomes back into state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Store (thunks)                       │
//! │  .log_in() │ .load_users() │ .load_qualities() │ ...    │
//! ├─────────────────────────────────────────────────────────┤
//! │           dispatch → reduce(State, Action)              │
//! │        pure reducers, immutable Arc snapshots           │
//! ├─────────────────────────────────────────────────────────┤
//! │   DirectoryClient │ SessionStore │ Navigator            │
//! │   network         │ persistence  │ redirects            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Thunks run on a single event loop and await their steps sequentially:
//! the "requested" dispatch happens strictly before the network call and
//! the terminal dispatch strictly after it resolves. There is no
//! cancellation; a superseding call does not abort a prior one.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod action;
mod config;
mod navigate;
mod qualities;
mod state;
mod store;
mod users;

// Public API exports
pub use action::{Action, QualitiesAction, UsersAction};
pub use config::StoreConfig;
pub use navigate::{Navigator, RecordingNavigator, TracingNavigator};
pub use qualities::QualitiesState;
pub use state::{State, reduce};
pub use store::Store;
pub use users::UsersState;

// Re-export commonly used types from the client layer
pub use roster_client::{DirectoryClient, SignUpRequest};
pub use roster_types::{Quality, QualityId, User, UserId};
