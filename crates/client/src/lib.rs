//! Authenticated HTTP client for the Roster user-directory service.
//!
//! This crate wraps a REST or Firebase-flavored backend behind a typed API
//! with automatic one-shot token refresh, uniform response envelopes, and
//! injected capabilities for session storage and user notifications.
//!
//! # Features
//!
//! - **Authenticated pipeline**: expired access tokens are refreshed exactly
//!   once before the request proceeds; the new token set is persisted
//! - **Dual API shape**: bearer-header REST or Firebase-style `.json` paths
//!   with `auth` query parameters and id-keyed collection flattening
//! - **Expected vs. unexpected errors**: 4xx surfaces to callers, everything
//!   else becomes a generic user notification
//! - **Test support**: in-memory session store, recording notifier, and a
//!   controllable [`mock`] server speaking both backend shapes
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use roster_client::{ClientConfig, DirectoryClient, MemorySessionStore, TracingNotifier};
//!
//! #[tokio::main]
//! async fn main() -> roster_client::Result<()> {
//!     let config = ClientConfig::builder()
//!         .with_base_url("http://localhost:4000/api/")
//!         .build()?;
//!     let client = DirectoryClient::new(
//!         config,
//!         Arc::new(MemorySessionStore::new()),
//!         Arc::new(TracingNotifier),
//!     )?;
//!
//!     let grant = client.auth().sign_in("john@example.com", "secret").await?;
//!     let users = client.users().fetch_all().await?;
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod client;
mod config;
mod error;
mod http;
pub mod mock;
mod notify;
mod qualities;
mod session;
mod users;

// Public API exports
pub use auth::{AuthService, SignUpRequest};
pub use client::DirectoryClient;
pub use config::{ApiMode, ClientConfig, ClientConfigBuilder};
pub use error::{ClientError, Result};
pub use http::{Envelope, GENERIC_FAILURE_MESSAGE, Http, now_ms};
pub use notify::{Notifier, RecordingNotifier, TracingNotifier};
pub use qualities::QualityService;
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use users::UserService;

// Re-export commonly used types from roster-types
pub use roster_types::{Quality, QualityId, Session, TokenGrant, User, UserId};
