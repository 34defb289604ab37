//! # Recruit (recruiting site client)
//!
//! `recruit` talks to the recruiting site's session-authenticated JSON API.
//!
//! ## Session bootstrap
//!
//! Every request goes through [`api::ApiClient`], which owns a single cookie store.
//! Before the first mutating request the client makes sure a `csrftoken` cookie
//! exists, priming it with `POST /api/auth/csrf` when it does not, and echoes the
//! token back in the `X-CSRFToken` header.
//!
//! ## Password reset
//!
//! [`reset::ResetWorkflow`] drives the four-step wizard:
//!
//! 1. **Email:** an institutional address requests a one-time code.
//! 2. **Verify:** the code is confirmed while a countdown shows its remaining lifetime.
//! 3. **Reset:** the new password is submitted with its confirmation.
//! 4. **Done:** terminal.
//!
//! An `EMAIL_VERIFICATION_EXPIRED` answer from the server sends the wizard back to
//! step 1 with every secret field cleared.
//!
//! ## Roadmap
//!
//! [`roadmap`] wraps the public and admin roadmap endpoints and arranges items on
//! the half-year grid.

pub mod api;
pub mod cli;
pub mod reset;
pub mod roadmap;
pub mod sanitize;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
