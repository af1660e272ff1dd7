//! Backend authentication error payloads.
//!
//! Auth endpoints report failures as a structured `{ code, message }` object.
//! Code-400 messages are machine keys (`EMAIL_NOT_FOUND`, `INVALID_PASSWORD`,
//! `EMAIL_EXISTS`) that must be translated before reaching a user.

use serde::{Deserialize, Serialize};

/// Structured error body returned by auth endpoints.
///
/// Wire shape: `{ "error": { "code": 400, "message": "EMAIL_NOT_FOUND" } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthApiError {
    /// Numeric error code; 400 marks credential problems.
    pub code: u16,

    /// Machine-readable message key.
    pub message: String,
}

/// Maps a code-400 auth message key to human-readable text.
///
/// Unknown keys pass through unchanged so a novel backend message is still
/// visible to the user rather than swallowed.
#[must_use]
pub fn friendly_auth_message(message: &str) -> String {
    match message {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" => {
            "Email or password is incorrect".to_owned()
        }
        "EMAIL_EXISTS" => "A user with this email already exists".to_owned(),
        other => other.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_keys_map_to_one_message() {
        assert_eq!(
            friendly_auth_message("EMAIL_NOT_FOUND"),
            friendly_auth_message("INVALID_PASSWORD")
        );
        assert!(!friendly_auth_message("INVALID_PASSWORD").contains("INVALID"));
    }

    #[test]
    fn test_email_exists_maps() {
        assert_eq!(
            friendly_auth_message("EMAIL_EXISTS"),
            "A user with this email already exists"
        );
    }

    #[test]
    fn test_unknown_key_passes_through() {
        assert_eq!(friendly_auth_message("TOO_MANY_ATTEMPTS"), "TOO_MANY_ATTEMPTS");
    }

    #[test]
    fn test_error_body_decodes() {
        let err: AuthApiError =
            serde_json::from_str(r#"{"code":400,"message":"EMAIL_EXISTS"}"#).unwrap();
        assert_eq!(err.code, 400);
        assert_eq!(err.message, "EMAIL_EXISTS");
    }
}
