//! Wrappers for the auth endpoints used by the password reset wizard and the
//! admin login. Passwords are exposed only while the request body is encoded and
//! must never be logged.

use super::{
    client::ApiClient,
    errors::ApiError,
    types::{
        Ack, LoginRequest, ResetPasswordRequest, SendCodeRequest, SendCodeResponse,
        VerifyCodeRequest,
    },
};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

pub const SEND_CODE_PATH: &str = "/api/auth/password/send-code";
pub const VERIFY_CODE_PATH: &str = "/api/auth/email/verify";
pub const RESET_PASSWORD_PATH: &str = "/api/auth/password/reset";
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Requests a one-time code for `email`.
///
/// # Errors
/// Returns `ApiError` on transport failures or non-2xx responses.
#[instrument(skip_all)]
pub async fn send_password_code(
    client: &ApiClient,
    email: &str,
) -> Result<SendCodeResponse, ApiError> {
    client
        .post_json(SEND_CODE_PATH, &SendCodeRequest { email })
        .await
}

/// Confirms the one-time code sent to `email`.
///
/// # Errors
/// Returns `ApiError` on transport failures or non-2xx responses.
#[instrument(skip_all)]
pub async fn verify_email_code(
    client: &ApiClient,
    email: &str,
    code: &str,
) -> Result<Ack, ApiError> {
    client
        .post_json(VERIFY_CODE_PATH, &VerifyCodeRequest { email, code })
        .await
}

/// Sets a new password for a verified `email`.
///
/// # Errors
/// Returns `ApiError` on transport failures or non-2xx responses.
#[instrument(skip_all)]
pub async fn reset_password(
    client: &ApiClient,
    email: &str,
    password: &SecretString,
) -> Result<Ack, ApiError> {
    let request = ResetPasswordRequest {
        email,
        password: password.expose_secret(),
    };
    client.post_json(RESET_PASSWORD_PATH, &request).await
}

/// Opens a session; the session cookie lands in the client's cookie store.
///
/// # Errors
/// Returns `ApiError` on transport failures or non-2xx responses.
#[instrument(skip_all)]
pub async fn login(
    client: &ApiClient,
    email: &str,
    password: &SecretString,
) -> Result<(), ApiError> {
    let request = LoginRequest {
        email,
        password: password.expose_secret(),
    };
    client
        .request_empty(
            reqwest::Method::POST,
            LOGIN_PATH,
            super::client::Payload::json(&request)?,
        )
        .await
}
