use super::Step;
use crate::api::ApiError;
use thiserror::Error;

/// Why a wizard operation did not advance.
///
/// The `Display` text is what the wizard shows as its message.
#[derive(Debug, Error)]
pub enum ResetError {
    #[error("Only school email addresses ({suffix}) can be used.")]
    EmailDomain { suffix: String },
    #[error("A code was already sent. Try again in {remaining} seconds.")]
    CountdownActive { remaining: u64 },
    #[error("Enter the verification code.")]
    CodeRequired,
    #[error("Password must be at least {min} characters long.")]
    PasswordTooShort { min: usize },
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("A request is already in progress.")]
    Busy,
    #[error("This action is not available in the {actual} step.")]
    WrongStep { actual: Step },
    #[error("Failed to send the verification code.")]
    SendCodeRejected,
    #[error("Verification failed: the code is wrong or has expired.")]
    CodeRejected,
    #[error("Verification has expired. Please start over.")]
    VerificationExpired,
    #[error("Password change failed: {code}")]
    ResetRejected { code: String },
    #[error("Request failed (server error): {0}")]
    Transport(#[from] ApiError),
}

impl ResetError {
    /// Local validation errors never reach the network.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::EmailDomain { .. }
                | Self::CountdownActive { .. }
                | Self::CodeRequired
                | Self::PasswordTooShort { .. }
                | Self::PasswordMismatch
                | Self::Busy
                | Self::WrongStep { .. }
        )
    }
}
