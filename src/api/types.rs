//! Request and response types for the auth endpoints. Password payloads borrow
//! the exposed secret only for the duration of serialization and must never be
//! logged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Code lifetime assumed when the server omits `expires_in`.
pub const DEFAULT_CODE_TTL_SECONDS: u64 = 120;

#[derive(Clone, Debug, Serialize)]
pub struct SendCodeRequest<'a> {
    pub email: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SendCodeResponse {
    pub ok: bool,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub error: Option<ErrorCode>,
}

impl SendCodeResponse {
    #[must_use]
    pub fn ttl_seconds(&self) -> u64 {
        self.expires_in.unwrap_or(DEFAULT_CODE_TTL_SECONDS)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct VerifyCodeRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

#[derive(Serialize)]
pub struct ResetPasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `{ok, error?}` envelope shared by the verification endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct Ack {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<ErrorCode>,
}

/// Business error codes returned in the `error` field.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    EmailVerificationExpired,
    PasswordTooShort,
    Other(String),
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::EmailVerificationExpired => "EMAIL_VERIFICATION_EXPIRED",
            Self::PasswordTooShort => "PASSWORD_TOO_SHORT",
            Self::Other(raw) => raw,
        }
    }

    /// Extracts the `error` code from a JSON error body, if it carries one.
    #[must_use]
    pub fn from_body(body: &str) -> Option<Self> {
        #[derive(Deserialize)]
        struct ErrorBody {
            #[serde(default)]
            error: Option<ErrorCode>,
        }

        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.error)
    }
}

impl From<String> for ErrorCode {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "EMAIL_VERIFICATION_EXPIRED" => Self::EmailVerificationExpired,
            "PASSWORD_TOO_SHORT" => Self::PasswordTooShort,
            _ => Self::Other(raw),
        }
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn error_code_parses_known_and_unknown_values() {
        let ack: Ack =
            serde_json::from_str(r#"{"ok":false,"error":"EMAIL_VERIFICATION_EXPIRED"}"#).unwrap();
        assert_eq!(ack.error, Some(ErrorCode::EmailVerificationExpired));

        let ack: Ack = serde_json::from_str(r#"{"ok":false,"error":"USER_NOT_FOUND"}"#).unwrap();
        assert_eq!(ack.error, Some(ErrorCode::Other("USER_NOT_FOUND".to_string())));
        assert_eq!(ack.error.unwrap().to_string(), "USER_NOT_FOUND");
    }

    #[test]
    fn ack_without_error_field() {
        let ack: Ack = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert!(ack.ok);
        assert!(ack.error.is_none());
    }

    #[test]
    fn send_code_response_defaults_ttl() {
        let response: SendCodeResponse = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert_eq!(response.ttl_seconds(), DEFAULT_CODE_TTL_SECONDS);

        let response: SendCodeResponse =
            serde_json::from_str(r#"{"ok":true,"expires_in":300}"#).unwrap();
        assert_eq!(response.ttl_seconds(), 300);
    }

    #[test]
    fn from_body_reads_structured_errors_only() {
        assert_eq!(
            ErrorCode::from_body(r#"{"ok":false,"error":"PASSWORD_TOO_SHORT"}"#),
            Some(ErrorCode::PasswordTooShort)
        );
        assert_eq!(ErrorCode::from_body(r#"{"ok":false}"#), None);
        assert_eq!(ErrorCode::from_body("<html>Bad Gateway</html>"), None);
    }

    #[test]
    fn error_code_serializes_as_wire_string() {
        let json = serde_json::to_string(&ErrorCode::PasswordTooShort).unwrap();
        assert_eq!(json, r#""PASSWORD_TOO_SHORT""#);
    }
}
