//! Authentication session model.
//!
//! A [`Session`] is the persisted result of a login, registration, or token
//! refresh: the access/refresh token pair, the absolute expiry instant, and
//! the authenticated user's id. It is created from a [`TokenGrant`], the
//! normalized response of any token-issuing endpoint.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Normalized response of a token-issuing auth endpoint.
///
/// Both backend shapes (plain REST and Firebase-flavored) are decoded into
/// this struct by the client; `expires_in_secs` is relative and is resolved
/// to an absolute timestamp when the grant becomes a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    /// Short-lived access token attached to outgoing requests.
    pub access_token: String,

    /// Long-lived token exchanged for a new access token on expiry.
    pub refresh_token: String,

    /// Seconds until `access_token` expires, relative to issuance.
    pub expires_in_secs: u64,

    /// Id of the authenticated user.
    pub user_id: UserId,
}

/// A persisted authentication session.
///
/// Exactly four fields are stored: access token, refresh token, expiry
/// (epoch milliseconds), and user id. Presence of a stored session implies
/// the logged-in state after hydration; absence implies anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Access token attached to outgoing requests.
    pub access_token: String,

    /// Refresh token used for the one-shot refresh on expiry.
    pub refresh_token: String,

    /// Expiry of `access_token` as epoch milliseconds.
    pub expires_at: u64,

    /// Id of the authenticated user.
    pub user_id: UserId,
}

impl Session {
    /// Resolves a [`TokenGrant`] into a session, anchoring the relative
    /// expiry to `now_ms` (epoch milliseconds).
    #[must_use]
    pub fn from_grant(grant: &TokenGrant, now_ms: u64) -> Self {
        Self {
            access_token: grant.access_token.clone(),
            refresh_token: grant.refresh_token.clone(),
            expires_at: now_ms + grant.expires_in_secs * 1000,
            user_id: grant.user_id.clone(),
        }
    }

    /// Returns true if the access token has expired as of `now_ms`.
    #[must_use]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at < now_ms
    }
}
