//! Core domain types for the Roster user-directory client.
//!
//! This crate provides the foundational types shared by the HTTP client and
//! the state store:
//! - Opaque string identifiers (`UserId`, `QualityId`)
//! - Directory entities (`User`, `Quality`)
//! - The authentication session model (`Session`, `TokenGrant`)
//! - Backend auth-error payloads and their human-readable mapping

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod session;
pub mod types;

// Re-export commonly used types at crate root
pub use auth::{AuthApiError, friendly_auth_message};
pub use session::{Session, TokenGrant};
pub use types::{Quality, QualityId, User, UserId};
