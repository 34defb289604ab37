//! HTTP access to the recruiting site API: the session bootstrap client, its error
//! type, and the auth endpoint wrappers.

pub mod auth;
pub mod client;
pub mod errors;
pub mod types;

pub use client::{ApiClient, ClientConfig, Payload};
pub use errors::ApiError;
pub use types::ErrorCode;
