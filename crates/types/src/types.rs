//! Entity definitions for the user directory.
//!
//! - Identifier newtypes (`UserId`, `QualityId`)
//! - The `User` profile entity
//! - The `Quality` reference entity

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Identifier Types
// ============================================================================

/// Generates a newtype wrapper around an owned string for opaque identifiers.
///
/// Each generated type provides:
/// - Standard derives: Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord
/// - Serde with `#[serde(transparent)]` for wire format compatibility
/// - `From<String>` / `From<&str>` conversions
/// - `Display` printing the raw value
/// - `new()` constructor and `as_str()` accessor
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from a raw value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the raw identifier string.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<$name> for String {
            #[inline]
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

define_id! {
    /// Opaque identifier for a directory user.
    UserId
}

define_id! {
    /// Opaque identifier for a quality reference record.
    QualityId
}

// ============================================================================
// Entities
// ============================================================================

/// A directory user profile.
///
/// Only the fields the client derives behavior from are typed; any other
/// profile fields the backend returns are preserved in `extra` and round-trip
/// unchanged on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned identifier.
    pub id: UserId,

    /// Display name.
    pub name: String,

    /// Login email.
    pub email: String,

    /// Free-form profession label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,

    /// Aggregate rating, if the backend has computed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,

    /// Number of completed meetings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_meetings: Option<u64>,

    /// Qualities attached to this profile, by id.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualities: Vec<QualityId>,

    /// Any profile fields this client does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A small reference record describing a user quality (e.g. "Honest").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality {
    /// Server-assigned identifier.
    pub id: QualityId,

    /// Display label.
    pub name: String,

    /// Badge color name.
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_display_is_raw_value() {
        let id = UserId::new("67a8d");
        assert_eq!(id.to_string(), "67a8d");
        assert_eq!(id.as_str(), "67a8d");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = QualityId::new("q1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"q1\"");
        let back: QualityId = serde_json::from_str("\"q1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_user_preserves_unknown_fields() {
        let raw = serde_json::json!({
            "id": "u1",
            "name": "John Doe",
            "email": "john@example.com",
            "profession": "Engineer",
            "rate": 2.5,
            "completedMeetings": 14,
            "qualities": ["q1", "q2"],
            "sex": "male",
            "bookmark": false
        });
        let user: User = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(user.id.as_str(), "u1");
        assert_eq!(user.completed_meetings, Some(14));
        assert_eq!(user.qualities.len(), 2);
        assert_eq!(user.extra["sex"], "male");
        assert_eq!(user.extra["bookmark"], false);

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_user_optional_fields_absent() {
        let raw = serde_json::json!({
            "id": "u2",
            "name": "Jane",
            "email": "jane@example.com"
        });
        let user: User = serde_json::from_value(raw).unwrap();
        assert_eq!(user.profession, None);
        assert_eq!(user.rate, None);
        assert!(user.qualities.is_empty());
        assert!(user.extra.is_empty());
    }
}
